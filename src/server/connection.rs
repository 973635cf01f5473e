// 连接处理模块
// 处理单个 TCP 连接的接受和服务

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::handler;
use crate::logger;
use crate::state::AppState;
use crate::storage::ObjectStore;

/// Reserve a connection slot, or `false` when `max_connections` is reached
///
/// The counter is incremented first and rolled back on rejection, so two
/// racing accepts can never both take the last slot.
pub fn try_reserve_slot(conn_counter: &AtomicUsize, max_connections: Option<u64>) -> bool {
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
            ));
            return false;
        }
    }
    true
}

/// Accept a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection<S: ObjectStore + 'static>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState<S>>,
    conn_counter: &Arc<AtomicUsize>,
) {
    if !try_reserve_slot(conn_counter, state.config.performance.max_connections) {
        drop(stream);
        return;
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection on a local task.
///
/// Only the wait for each request head is bounded, by `performance.read_timeout`.
/// hyper starts that timer as soon as the connection is ready for the next
/// request, so it also closes idle keep-alive connections. Store lookups and
/// response bodies run without a deadline. The connection counter is released
/// when the task ends.
fn handle_connection<S: ObjectStore + 'static>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState<S>>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(performance.read_timeout))
            .keep_alive(performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );

        if let Err(err) = conn.await {
            if err.is_timeout() {
                logger::log_debug(&format!(
                    "[Connection] {peer_addr} sent no request head within {}s",
                    performance.read_timeout
                ));
            } else {
                logger::log_connection_error(&err);
            }
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
