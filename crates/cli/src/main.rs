use clap::Parser;
use graph_analyzer_core::AnalysisReport;
use tracing_subscriber::EnvFilter;

mod settings;
mod store_client;

use settings::Settings;
use store_client::{FetchError, StoreClient};

/// Graph Analyzer - structural analysis of a graph store export
#[derive(Parser)]
#[command(name = "graph-analyzer")]
#[command(version)] // Auto-pull version from Cargo.toml
#[command(about = "Fetch a graph export and report statistics, centrality and communities", long_about = None)]
struct Cli {
    /// Base URL of the graph store
    #[arg(value_name = "STORE_URL", default_value = "http://store:8080")]
    store_url: String,
}

/// User-facing diagnostic for a failed fetch
fn fetch_error_message(store_url: &str, err: &FetchError) -> String {
    match err {
        FetchError::Connect { .. } => format!(
            "✗ Error: Cannot connect to {store_url}\n  Make sure the graph store service is running"
        ),
        FetchError::Timeout { .. } => format!("✗ Error: Request to {store_url} timed out"),
        FetchError::Payload { source, .. } => {
            format!("✗ Error: Malformed graph payload from {store_url}: {source}")
        }
        FetchError::Status { .. } | FetchError::Request { .. } => {
            format!("✗ Error fetching graph: {err}")
        }
    }
}

/// Report a failed fetch once: the diagnostic on stderr, details at debug
fn report_fetch_error(store_url: &str, err: &FetchError) {
    tracing::debug!(error = ?err, "graph fetch failed");
    eprintln!("{}", fetch_error_message(store_url, err));
}

/// `RUST_LOG` when it is set and valid, `warn` otherwise
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn main() -> anyhow::Result<()> {
    // Debug logs are hidden unless RUST_LOG asks for them
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    let client = StoreClient::new(&cli.store_url, settings.timeout)?;
    let graph = match client.fetch_graph() {
        Ok(graph) => graph,
        Err(err) => {
            report_fetch_error(&cli.store_url, &err);
            std::process::exit(1);
        }
    };
    println!("✓ Successfully loaded graph from {}", cli.store_url);

    let report = AnalysisReport::analyze(&graph, &settings.analysis);
    print!("{}", report.render_text());

    report.write_export(&settings.output)?;
    println!("✓ Analysis exported to {}", settings.output.display());

    Ok(())
}
