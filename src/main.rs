use figgie_engine::config::Config;
use figgie_engine::engine::Engine;
use figgie_engine::{gateway, logging};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config);
    tracing::info!(?config, "starting figgie engine");

    let engine = Arc::new(Engine::new(config.round_config()));
    gateway::run_server(config.port, engine).await;
}
