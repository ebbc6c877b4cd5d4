//! Management controller listener
//!
//! The controller binds its own listener, independent of whatever
//! serving stack the embedding application wraps with the middleware.
//! A `unix:` prefix selects a Unix domain socket instead of TCP.

use std::sync::Arc;

use application::ChaosRegistry;
use tracing::info;

use crate::{routes, state::AppState};

/// Default network address and port for the management controller
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8666";

/// Serve the management controller until the task is cancelled.
///
/// An empty `bind_addr` falls back to [`DEFAULT_BIND_ADDR`]. An
/// address of the form `unix:/path/to.sock` binds a Unix domain
/// socket at that path.
pub async fn serve_controller(
    bind_addr: &str,
    registry: Arc<ChaosRegistry>,
) -> std::io::Result<()> {
    let bind_addr = if bind_addr.is_empty() {
        DEFAULT_BIND_ADDR
    } else {
        bind_addr
    };
    let app = routes::create_router(AppState::new(registry));

    if let Some(path) = bind_addr.strip_prefix("unix:") {
        let listener = tokio::net::UnixListener::bind(path)?;
        info!(socket = path, "chaos controller listening");
        axum::serve(listener, app).await
    } else {
        let listener = tokio::net::TcpListener::bind(bind_addr).await?;
        info!(addr = bind_addr, "chaos controller listening");
        axum::serve(listener, app).await
    }
}
