// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::AppState;
use crate::logger;

/// Longest wait for in-flight connections after shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop on the current `LocalSet`.
///
/// Returns once shutdown has been requested and active connections have
/// finished or the drain timeout has passed.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = signals.shutdown.notified() => break,
        }
    }

    drop(listener);
    drain_connections(&state).await;
}

/// Wait for active connections to finish, bounded by `DRAIN_TIMEOUT`
async fn drain_connections(state: &AppState) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;

    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 {
            logger::log_info("All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown drain timed out with {active} connection(s) still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
