//! Static file resolution for the dashboard server
//!
//! Request handling is a pure function of the root directory, the method
//! and the URL, so it can be tested without a socket.

use std::path::{Component, Path, PathBuf};

use tiny_http::Method;

/// What to send back for one request (CORS headers are added by the caller)
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Reply {
    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: message.as_bytes().to_vec(),
        }
    }
}

pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Map a request path onto a file below `root`
///
/// `None` means the path tries to leave the root.
fn resolve(root: &Path, url: &str) -> Option<PathBuf> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let relative = Path::new(path.trim_start_matches('/'));

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }

    let mut candidate = root.join(relative);
    if candidate.is_dir() {
        candidate.push("index.html");
    }
    Some(candidate)
}

/// Build the reply for one request against `root` (already canonical)
pub fn respond_to(root: &Path, method: &Method, url: &str) -> Reply {
    match method {
        Method::Options => return Reply::empty(200),
        Method::Get | Method::Head => {}
        _ => return Reply::text(405, "method not allowed"),
    }

    let Some(candidate) = resolve(root, url) else {
        return Reply::text(403, "forbidden");
    };

    // Symlinks may still point outside the root
    let file = match candidate.canonicalize() {
        Ok(file) if file.starts_with(root) => file,
        Ok(_) => return Reply::text(403, "forbidden"),
        Err(_) => return Reply::text(404, "not found"),
    };

    match std::fs::read(&file) {
        Ok(body) => Reply {
            status: 200,
            content_type: Some(content_type(&file)),
            body,
        },
        Err(_) => Reply::text(404, "not found"),
    }
}
