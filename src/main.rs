use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod ssi;

use server::{create_reusable_listener, start_server_loop, start_signal_handler, SignalHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path (extension optional)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Create the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg));
    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(start_server_loop(listener, state, Arc::clone(&signals)))
        .await;

    if signals.is_shutdown_requested() {
        logger::log_info("Server stopped");
    }
    Ok(())
}
