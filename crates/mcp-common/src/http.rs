/// Streamable HTTP transport for MCP servers.
///
/// Routes:
/// - `POST /mcp` — MCP JSON-RPC over the streamable HTTP transport (stateless mode,
///   every request is handled by a fresh clone of the server handler)
/// - any other verb on `/mcp` — 405 with a JSON-RPC error body
/// - `GET /health` — static JSON status payload
use std::net::SocketAddr;

use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post_service},
};
use rmcp::ServerHandler;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::info;

use crate::error::CommonError;

pub const MCP_PATH: &str = "/mcp";
pub const HEALTH_PATH: &str = "/health";

/// JSON-RPC error code used for transport-level rejections.
const TRANSPORT_ERROR_CODE: i64 = -32000;

/// Build the HTTP router exposing `handler` on [`MCP_PATH`] plus a health endpoint.
pub fn router<S>(service_name: &'static str, handler: S) -> Router
where
    S: ServerHandler + Clone,
{
    let mcp = StreamableHttpService::new(
        move || Ok(handler.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            stateful_mode: false,
            ..Default::default()
        },
    );

    Router::new()
        .route(MCP_PATH, post_service(mcp).fallback(method_not_allowed))
        .route(HEALTH_PATH, get(move || health(service_name)))
}

/// Bind `addr` and serve `router` until Ctrl-C.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<(), CommonError> {
    let listener = TcpListener::bind(addr).await?;
    info!(listen_addr = %addr, "MCP server ready, serving on HTTP");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("MCP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn health(service_name: &'static str) -> Json<Value> {
    Json(json!({ "status": "ok", "service": service_name }))
}

async fn method_not_allowed() -> (StatusCode, Json<Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "jsonrpc": "2.0",
            "error": {
                "code": TRANSPORT_ERROR_CODE,
                "message": "Method not allowed."
            },
            "id": null
        })),
    )
}
