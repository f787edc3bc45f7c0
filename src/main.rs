//! CiviBot entry point.
//!
//! Initialises logging and configuration, verifies the vector index is
//! reachable, then serves the Turn API. Startup failures are fatal: the
//! process must not accept requests without its retrieval index or a valid
//! generation backend configuration.

mod classifier;
mod composer;
mod config;
mod error;
mod generation;
mod retrieval;
mod server;
mod session;
mod taxonomy;
mod types;

use config::load_config;
use generation::{Generator, GroqClient};
use retrieval::{HttpRetriever, Retriever};
use server::{start_server, AppState};
use session::DialogueSession;

#[tokio::main]
async fn main() {
    // Structured logging — default level INFO, overridable via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load configuration from .env / system environment.
    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Please check your .env file. See .env.example for required variables.");
            std::process::exit(1);
        }
    };

    tracing::info!(
        model = %config.groq_model,
        retriever = %config.retriever_base_url,
        "civibot starting"
    );

    let retriever = match HttpRetriever::new(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Initialisation error: {}", e);
            std::process::exit(1);
        }
    };

    // Fail fast when the vector index is down.
    if let Err(e) = retriever.heartbeat().await {
        eprintln!("Initialisation error: {}", e);
        std::process::exit(1);
    }

    let generator = match GroqClient::new(&config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Initialisation error: {}", e);
            std::process::exit(1);
        }
    };

    let session = DialogueSession::new(
        Box::new(retriever) as Box<dyn Retriever>,
        Box::new(generator) as Box<dyn Generator>,
    );
    let state = AppState::new(session);

    if let Err(e) = start_server(&config, state).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
