//! PolicySage: insurance policy comparison server.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

use policysage_compare::Comparator;
use policysage_core::{ServiceConfig, UserPreferences};
use policysage_ingest::{DocumentExtractor, Normalizer, UploadedDocument};
use policysage_llm::{GeminiClient, GeminiConfig, GenerativeService};
use state::AppState;

/// Wire up the extractor, model client and pipeline from configuration.
fn build_state(config: ServiceConfig) -> AppState {
    let llm_config_path = std::env::var_os("POLICYSAGE_LLM_CONFIG").map(PathBuf::from);
    let llm_config = GeminiConfig::load(llm_config_path.as_deref());
    let llm_configured = llm_config.is_configured();

    let service: Arc<dyn GenerativeService> = Arc::new(GeminiClient::new(llm_config));
    let normalizer = Normalizer::new(Arc::new(DocumentExtractor::new()));

    AppState::new(config, normalizer, Comparator::new(service), llm_configured)
}

/// `policysage compare <file> <file>... [--preferences <json>]`
async fn run_compare(args: &[String]) -> anyhow::Result<()> {
    let mut files = Vec::new();
    let mut preferences: Option<String> = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--preferences" | "-p" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--preferences needs a JSON value"))?;
                preferences = Some(value.clone());
            }
            path => files.push(PathBuf::from(path)),
        }
    }

    let state = build_state(ServiceConfig::from_env()?);

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        documents.push(UploadedDocument::from_bytes(
            &state.config.upload_dir,
            display_name(path),
            &bytes,
        )?);
    }

    let fragments = state.normalizer.normalize(documents)?;
    let preferences = UserPreferences::parse(preferences.as_deref());
    let result = state.comparator.compare(&fragments, &preferences).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn display_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "compare" => {
                if args.len() < 4 {
                    eprintln!("Usage: policysage compare <file> <file>... [--preferences <json>]");
                    std::process::exit(1);
                }
                return run_compare(&args[2..]).await;
            }
            "--help" | "-h" | "help" => {
                println!("PolicySage — insurance policy comparison server");
                println!();
                println!("Usage: policysage [command]");
                println!();
                println!("Commands:");
                println!("  (none)                          Start the server");
                println!("  compare <file> <file>... [-p J] Compare policy files once and print JSON");
                println!("  help                            Show this help message");
                println!();
                println!("Environment:");
                println!("  PORT, GEMINI_API_KEY, GEMINI_MODEL, GEMINI_BASE_URL,");
                println!("  POLICYSAGE_LLM_CONFIG, POLICYSAGE_UPLOAD_DIR,");
                println!("  POLICYSAGE_MAX_FILE_MB, POLICYSAGE_MAX_REQUEST_MB, RUST_LOG");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'policysage help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    // Normal server startup
    let config = ServiceConfig::from_env()?;
    let port = config.port;
    info!("Staging uploads in {}", config.upload_dir.display());

    let state = Arc::new(build_state(config));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("PolicySage server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
