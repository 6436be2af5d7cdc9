// Server module entry point
// Accept loop, connection handling, and shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_listener;
pub use signal::{start_signal_handler, SignalHandler};

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Run the accept loop until a shutdown signal arrives, then close the
/// store connection and return.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = signals.shutdown.notified() => {
                break;
            }
        }
    }

    // Stop accepting, then flush and drop the store connection
    drop(listener);
    state.store.close().await?;
    logger::log_store_closed();
    Ok(())
}
