//! Corpus API server entry point.
//!
//! Parses CLI flags over the JSON config file, loads the master schema
//! and seed corpus, opens the state directory and reconciles counters
//! from the logs, then serves the HTTP API until `ctrl_c`.

use clap::Parser;
use corpus_api::{router, AppState, Cli, CoordinatorState};
use corpus_scheduler::Scheduler;
use corpus_schema::SchemaIndex;
use corpus_storage::Store;
use corpus_validator::SimilarityWindow;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(StartupError::Config(e)) => {
            tracing::error!(%e, "failed to resolve configuration");
            ExitCode::from(2)
        }
        Err(StartupError::Schema(e)) => {
            tracing::error!(%e, "failed to load master schema");
            ExitCode::from(3)
        }
        Err(StartupError::Storage(e)) => {
            tracing::error!(%e, "failed to open state directory");
            ExitCode::from(4)
        }
        Err(StartupError::Bind(e)) => {
            tracing::error!(%e, "failed to bind listener");
            ExitCode::from(5)
        }
        Err(StartupError::Serve(e)) => {
            tracing::error!(%e, "server error");
            ExitCode::from(6)
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] corpus_core::ConfigError),
    #[error(transparent)]
    Schema(#[from] corpus_schema::SchemaError),
    #[error(transparent)]
    Storage(#[from] corpus_storage::StorageError),
    #[error("{0}")]
    Bind(std::io::Error),
    #[error("{0}")]
    Serve(std::io::Error),
}

async fn run() -> Result<(), StartupError> {
    let cli = Cli::parse();
    let config = cli.resolve()?;

    let schema = SchemaIndex::load(&config.master_schema_path)?;

    let store = Store::open(&config.state_dir)?;
    store.delete_stale_legacy_files()?;

    let seed_rows = match &config.seed_corpus_path {
        Some(path) => store.load_seed_corpus(path)?,
        None => Vec::new(),
    };

    let counters = store.reconcile_counters(seed_rows.len() as u64)?;
    let instructions: std::collections::HashMap<_, _> = store
        .load_instruction_table()?
        .into_iter()
        .map(|record| (record.instruction_id, record))
        .collect();
    let next_id = instructions
        .keys()
        .max()
        .map(|id| id.next())
        .unwrap_or_else(corpus_core::InstructionId::first);

    let scheduler = Scheduler::new(config.axis_shares.clone(), config.signature_fifo_size);
    let codec = corpus_codec::ToonCodec::new(
        config.codec_command.clone(),
        Duration::from_millis(config.codec_timeout_ms),
    );
    let similarity_window = SimilarityWindow::new(config.similarity_window, config.similarity_threshold);

    let host = config.host.clone();
    let port = config.port;

    let coordinator = CoordinatorState {
        config,
        schema: Arc::new(schema),
        codec,
        scheduler,
        store,
        counters,
        similarity_window,
        instructions,
        next_id,
        seed_rows,
    };

    let state = AppState {
        coordinator: Arc::new(tokio::sync::Mutex::new(coordinator)),
    };

    let cors = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers(Any)
        .allow_origin(Any);

    let app = router(state).layer(TraceLayer::new_for_http()).layer(cors);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| StartupError::Bind(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(StartupError::Bind)?;

    tracing::info!(%addr, "corpus-api listening");

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(StartupError::Serve)?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}
