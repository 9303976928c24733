//! REST API handlers
//!
//! This module defines the API routes and handlers for the reachability service.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ReachableErrorTrait;
use crate::metrics;
use crate::models::GetServersResponse;

use super::AppState;

// ============================================================================
// API Types
// ============================================================================

/// Query string of `GET /servers`
#[derive(Debug, Default, Deserialize)]
pub struct GetServersQuery {
    /// Priority tier to keep; absent or empty means every tier
    pub priority: Option<String>,
}

/// Simple error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub timestamp: String,
}

/// Priority tier requested by the `priority` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityQuery {
    /// No filter
    Any,
    /// Keep servers of exactly this tier
    Tier(i64),
    /// A number no integer priority can equal, e.g. `1.5`
    Unmatched,
}

/// Parse the `priority` query parameter
///
/// Absent or blank means no filter. Anything else must be a decimal number
/// (`[+-]digits[.digits]`), and `0` is a real tier. An integral value selects
/// that tier. A fractional or out-of-range one is valid but matches nothing.
pub fn parse_priority(raw: Option<&str>) -> Result<PriorityQuery, String> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(PriorityQuery::Any),
        Some(value) => value,
    };

    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, "")) => (whole, "."),
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(format!("priority must be a number, got {value:?}"));
    }

    if fraction.bytes().any(|b| b != b'0') {
        return Ok(PriorityQuery::Unmatched);
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let signed = if value.starts_with('-') {
        format!("-{whole}")
    } else {
        whole.to_string()
    };
    Ok(signed
        .parse::<i64>()
        .map(PriorityQuery::Tier)
        .unwrap_or(PriorityQuery::Unmatched))
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Reachability endpoints
        .route("/servers", get(get_servers))
        .route("/v1/servers", get(get_servers))
        // Operational endpoints
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

// ============================================================================
// Reachability Handlers
// ============================================================================

/// List reachable servers, optionally limited to one priority tier
async fn get_servers(
    State(state): State<AppState>,
    Query(query): Query<GetServersQuery>,
) -> Response {
    let started = Instant::now();

    let response = match parse_priority(query.priority.as_deref()) {
        Err(reason) => {
            tracing::debug!(reason = %reason, "Rejected servers request");
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(reason))).into_response()
        }
        Ok(PriorityQuery::Unmatched) => {
            tracing::debug!(priority = ?query.priority, "No server has this priority");
            (StatusCode::OK, Json(GetServersResponse::empty())).into_response()
        }
        Ok(PriorityQuery::Any) => reachable_servers(&state, None).await,
        Ok(PriorityQuery::Tier(tier)) => reachable_servers(&state, Some(tier)).await,
    };

    metrics::record_api_request(
        "/servers",
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

async fn reachable_servers(state: &AppState, priority: Option<i64>) -> Response {
    match state.service.get_reachable_servers(priority).await {
        Ok(servers) => (StatusCode::OK, Json(servers)).into_response(),
        Err(e) => {
            let category = e.category().as_str();
            if e.is_recoverable() {
                tracing::warn!(category, error = %e, "Server list unavailable");
            } else {
                tracing::error!(category, error = %e, "Failed to check server availability");
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load server list")),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Operational Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Prometheus scrape endpoint
async fn metrics_handler() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(format!("Failed to encode metrics: {e}"))),
        )
            .into_response(),
    }
}

// ============================================================================
// Tests
// ============================================================================
