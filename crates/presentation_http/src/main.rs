//! Chaos reverse proxy
//!
//! Demo binary composing the two entry points: all traffic is
//! forwarded to an upstream target with the chaos middleware wrapped
//! around the proxy handler, while the management controller listens
//! on its own endpoint.

use std::sync::Arc;

use application::ChaosRegistry;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};
use clap::Parser;
use presentation_http::{ChaosLayer, DEFAULT_BIND_ADDR, serve_controller};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest request/response body the proxy will buffer
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Hop-by-hop headers that must not be forwarded
const HOP_HEADERS: [HeaderName; 5] = [
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
];

#[derive(Debug, Parser)]
#[command(name = "chaos-proxy")]
#[command(author, version, about = "Reverse proxy with on-the-fly chaos injection")]
struct Args {
    /// URL of the upstream target
    #[arg(long)]
    url: String,

    /// Network address:port to bind the proxy to
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind_addr: String,

    /// Network endpoint to bind the chaos controller to
    /// (prefix with "unix:" for a filesystem socket)
    #[arg(long, default_value = DEFAULT_BIND_ADDR)]
    controller_bind_addr: String,
}

#[derive(Debug, Clone)]
struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chaos_proxy=debug,presentation_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let upstream = reqwest::Url::parse(&args.url)
        .map_err(|e| anyhow::anyhow!("invalid upstream URL: {e}"))?;

    let registry = Arc::new(ChaosRegistry::new());

    // The controller runs for the process lifetime on its own listener.
    let controller_registry = Arc::clone(&registry);
    let controller_bind = args.controller_bind_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = serve_controller(&controller_bind, controller_registry).await {
            error!("chaos controller failed: {e}");
        }
    });

    let state = ProxyState {
        client: reqwest::Client::new(),
        upstream: upstream.as_str().trim_end_matches('/').to_string(),
    };

    let app = Router::new()
        .fallback(forward)
        .with_state(state)
        .layer(ChaosLayer::new(registry))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&args.bind_addr).await?;
    info!(addr = %args.bind_addr, upstream = %args.url, "chaos proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("proxy shutdown complete");
    Ok(())
}

/// Forward one request to the upstream target, buffering the body.
async fn forward(State(state): State<ProxyState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (StatusCode::BAD_GATEWAY, format!("error reading request body: {e}"))
                .into_response();
        },
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    let url = format!("{}{path_and_query}", state.upstream);

    let upstream_response = match state
        .client
        .request(parts.method, url)
        .headers(forwardable_headers(&parts.headers))
        .body(body)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            return (StatusCode::BAD_GATEWAY, format!("upstream error: {e}")).into_response();
        },
    };

    let status = upstream_response.status();
    let headers = forwardable_headers(upstream_response.headers());
    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            return (StatusCode::BAD_GATEWAY, format!("error reading upstream body: {e}"))
                .into_response();
        },
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Copy a header map, dropping hop-by-hop headers plus `Host` and
/// `Content-Length` (both are re-derived for the forwarded message).
fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for (name, value) in headers {
        if HOP_HEADERS.contains(name) || *name == header::HOST || *name == header::CONTENT_LENGTH {
            continue;
        }
        forwarded.append(name.clone(), value.clone());
    }
    forwarded
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
