// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::logger;
use crate::state::AppState;
use crate::storage::ObjectStore;

/// Accept loop; must run inside a `LocalSet` since connections are local tasks
///
/// Returns once `shutdown` is notified. Connections already accepted keep
/// running on their own tasks.
pub async fn start_server_loop<S: ObjectStore + 'static>(
    listener: TcpListener,
    state: Arc<AppState<S>>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = shutdown.notified() => {
                logger::log_info(&format!(
                    "Stopped accepting connections ({} still active)",
                    active_connections.load(Ordering::SeqCst)
                ));
                break;
            }
        }
    }
}
