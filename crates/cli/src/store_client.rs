//! HTTP client for the graph store's export endpoint
//!
//! One blocking `GET <base>/export` per run, bounded by a timeout and never
//! retried. Failures are classified so the caller can print a distinct
//! diagnostic for each.

use std::time::Duration;

use graph_analyzer_core::{ExportPayload, Graph, PayloadError};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned a malformed payload")]
    Payload {
        url: String,
        #[source]
        source: PayloadError,
    },
}

impl FetchError {
    fn from_transport(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        // A connect timeout reports both; treat it as a timeout.
        if source.is_timeout() {
            FetchError::Timeout { url, source }
        } else if source.is_connect() {
            FetchError::Connect { url, source }
        } else {
            FetchError::Request { url, source }
        }
    }
}

pub struct StoreClient {
    base_url: String,
    http: Client,
}

impl StoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn export_url(&self) -> String {
        format!("{}/export", self.base_url)
    }

    /// Download and decode the export payload
    pub fn fetch_export(&self) -> Result<ExportPayload, FetchError> {
        let url = self.export_url();
        debug!(%url, "fetching graph export");

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| FetchError::from_transport(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let body = response
            .bytes()
            .map_err(|e| FetchError::from_transport(&url, e))?;
        debug!(bytes = body.len(), "export body received");

        ExportPayload::from_slice(&body).map_err(|source| FetchError::Payload { url, source })
    }

    /// Download the export and build the graph from it
    pub fn fetch_graph(&self) -> Result<Graph, FetchError> {
        let payload = self.fetch_export()?;
        let graph = Graph::from_payload(&payload).map_err(|source| FetchError::Payload {
            url: self.export_url(),
            source,
        })?;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph loaded from store"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one request on an ephemeral port
    fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let path = request.url().to_string();
            let response = tiny_http::Response::from_string(body).with_status_code(status);
            request.respond(response).unwrap();
            path
        });
        (format!("http://127.0.0.1:{port}"), handle)
    }

    #[test]
    fn test_fetch_graph_success() {
        let (url, handle) = serve_once(
            200,
            r#"{"nodes": {"a": {"props": {"k": "v"}}}, "edges": [{"From": "a", "To": "b", "Label": "rel"}]}"#,
        );
        let client = StoreClient::new(&url, Duration::from_secs(5)).unwrap();
        let graph = client.fetch_graph().unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(handle.join().unwrap(), "/export");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = StoreClient::new("http://store:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.export_url(), "http://store:8080/export");
    }

    #[test]
    fn test_non_success_status() {
        let (url, handle) = serve_once(503, "unavailable");
        let client = StoreClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.fetch_export().unwrap_err();

        assert!(
            matches!(err, FetchError::Status { status, .. } if status.as_u16() == 503),
            "unexpected error: {err:?}"
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_invalid_json_body() {
        let (url, handle) = serve_once(200, "<html>not json</html>");
        let client = StoreClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.fetch_export().unwrap_err();

        assert!(matches!(err, FetchError::Payload { .. }), "unexpected error: {err:?}");
        handle.join().unwrap();
    }

    #[test]
    fn test_missing_edges_key() {
        let (url, handle) = serve_once(200, r#"{"nodes": {}}"#);
        let client = StoreClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.fetch_graph().unwrap_err();

        assert!(matches!(err, FetchError::Payload { .. }), "unexpected error: {err:?}");
        handle.join().unwrap();
    }

    #[test]
    fn test_invalid_node_entry() {
        let (url, handle) = serve_once(200, r#"{"nodes": {"a": []}, "edges": []}"#);
        let client = StoreClient::new(&url, Duration::from_secs(5)).unwrap();
        let err = client.fetch_graph().unwrap_err();

        assert!(
            matches!(err, FetchError::Payload { source: PayloadError::InvalidNode { .. }, .. }),
            "unexpected error: {err:?}"
        );
        handle.join().unwrap();
    }

    #[test]
    fn test_connection_refused() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client =
            StoreClient::new(&format!("http://127.0.0.1:{port}"), Duration::from_secs(5)).unwrap();
        let err = client.fetch_export().unwrap_err();

        let expected = format!("http://127.0.0.1:{port}/export");
        assert!(
            matches!(err, FetchError::Connect { ref url, .. } if *url == expected),
            "unexpected error: {err:?}"
        );
        assert!(err.to_string().ends_with("/export"));
    }

    #[test]
    fn test_timeout() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        thread::spawn(move || {
            // Hold the request without answering
            if let Ok(request) = server.recv() {
                thread::sleep(Duration::from_secs(3));
                drop(request);
            }
        });

        let client = StoreClient::new(
            &format!("http://127.0.0.1:{port}"),
            Duration::from_millis(300),
        )
        .unwrap();
        let err = client.fetch_export().unwrap_err();

        let expected = format!("http://127.0.0.1:{port}/export");
        assert!(
            matches!(err, FetchError::Timeout { ref url, .. } if *url == expected),
            "unexpected error: {err:?}"
        );
    }
}
