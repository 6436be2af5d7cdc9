use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod store;
mod views;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing the thread pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(cfg));

    // A failed initial store connection is fatal
    if let Err(e) = state.store.connect().await {
        logger::log_error(&format!("Store connection failed: {e}"));
        return Err(Box::new(e));
    }
    logger::log_store_connected();

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    logger::log_server_start(&addr, &state.config);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::run(listener, state, signals))
        .await
}
