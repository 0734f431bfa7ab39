//! ThinkFast · Explanation Practice Backend
//!
//! - Axum HTTP + WebSocket API
//! - Optional scoring oracle integration (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   ORACLE_API_KEY    : enables the scoring oracle if present
//!   ORACLE_BASE_URL    : default "https://api.openai.com/v1"
//!   ORACLE_MODEL    : default "gpt-4o-mini"
//!   PRACTICE_CONFIG_PATH : path to TOML config (extra topics + concept pools)
//!   STORE_PATH      : attempt-store directory (default "./data")
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod catalog;
mod config;
mod persona;
mod prompt_gen;
mod scoring;
mod oracle;
mod timer;
mod session;
mod store;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (attempt store, oracle client, topic bank).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "thinkfast_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
