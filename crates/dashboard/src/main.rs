use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tiny_http::{Header, Response, Server};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod static_files;

/// Graph Dashboard - serves the analysis dashboard with permissive CORS
#[derive(Parser)]
#[command(name = "graph-dashboard")]
#[command(version)]
#[command(about = "Serve the graph analysis dashboard", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Directory holding dashboard.html and the exported analysis
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|_| anyhow!("invalid header {name}: {value}"))
}

fn cors_headers() -> Result<Vec<Header>> {
    Ok(vec![
        header("Access-Control-Allow-Origin", "*")?,
        header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")?,
        header("Access-Control-Allow-Headers", "Content-Type")?,
    ])
}

/// `RUST_LOG` when it is set and valid, `warn` otherwise
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli
        .root
        .canonicalize()
        .with_context(|| format!("dashboard root {} is not accessible", cli.root.display()))?;

    let server = Server::http(("0.0.0.0", cli.port))
        .map_err(|e| anyhow!("failed to listen on port {}: {e}", cli.port))?;
    let cors = cors_headers()?;

    println!();
    println!("🌐 Dashboard server running!");
    println!();
    println!("📊 Open your browser and go to:");
    println!("   http://localhost:{}/dashboard.html", cli.port);
    println!();
    println!("Press Ctrl+C to stop the server");
    println!();

    for request in server.incoming_requests() {
        let reply = static_files::respond_to(&root, request.method(), request.url());
        debug!(method = %request.method(), url = request.url(), status = reply.status, "request");

        let mut response = Response::from_data(reply.body).with_status_code(reply.status);
        for h in &cors {
            response.add_header(h.clone());
        }
        if let Some(content_type) = reply.content_type {
            response.add_header(header("Content-Type", &content_type)?);
        }

        if let Err(err) = request.respond(response) {
            warn!(error = %err, "failed to send response");
        }
    }

    Ok(())
}
