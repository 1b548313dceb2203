//! REST API over priced billing cycles.
//!
//! Provides two GET endpoints:
//! - `/bills`: summary of every cycle
//! - `/bills/{key}`: full breakdown of the `MM-YYYY` cycle

mod handlers;
mod types;

pub use types::{BillDetailResponse, BillSummaryRecord, CellRecord, ErrorResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::billing::segment::BillingCycles;
use crate::billing::tariff::Tariff;

/// Immutable application state shared across all request handlers.
///
/// Built once after every cycle is priced and wrapped in `Arc`; handlers
/// only read it.
pub struct AppState {
    /// Tariff the cycles were priced with.
    pub tariff: Tariff,
    /// Priced billing cycles.
    pub cycles: BillingCycles,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/bills", get(handlers::list_bills))
        .route("/bills/{key}", get(handlers::get_bill))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind to `addr` or the
/// server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
