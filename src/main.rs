use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod state;
mod storage;

use storage::ObjectStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Size the Tokio runtime from server.workers
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
    let store = storage::open(&cfg.storage)?;

    let local_root = Path::new(&cfg.storage.root);
    if cfg.storage.backend == config::BackendKind::Local && !local_root.is_dir() {
        logger::log_warning(&format!(
            "Bucket directory '{}' does not exist; every lookup will miss",
            cfg.storage.root
        ));
    }

    let listener = server::create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &cfg, &store.describe());

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(state::AppState::new(cfg, store));
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            shutdown,
        ))
        .await;

    logger::log_info("Server stopped");
    Ok(())
}
