//! REST API over the planner.
//!
//! Provides three GET endpoints:
//! - `/status`: current peak/off-peak status
//! - `/windows`: off-peak windows that have not ended yet
//! - `/plan?appliance=<name>&program=<name>`: candidate runs and the optimum

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::config::PlannerConfig;
use crate::error::Result;
use crate::schedule::clock::Clock;
use crate::schedule::{Calendar, Period};

pub use types::{
    CandidateRecord, ErrorResponse, OptimumRecord, PlanQuery, PlanResponse, StatusResponse,
    WindowRecord,
};

/// Application state shared across all request handlers.
///
/// Configuration is resolved once at startup; only the clock moves.
pub struct AppState {
    /// Configuration the periods and appliances come from.
    pub config: PlannerConfig,
    /// Calendar for the configured time zone.
    pub calendar: Calendar,
    /// Periods with resolved identifiers.
    pub periods: Vec<Period>,
    /// Source of "now" for every request.
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl AppState {
    /// Resolves the calendar and periods of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown time zone or an out-of-range period.
    pub fn from_config(config: PlannerConfig, clock: Arc<dyn Clock + Send + Sync>) -> Result<Self> {
        let calendar = config.calendar()?;
        let periods = config.periods(&mut config.id_generator())?;
        Ok(Self {
            config,
            calendar,
            periods,
            clock,
        })
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/windows", get(handlers::get_windows))
        .route("/plan", get(handlers::get_plan))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
