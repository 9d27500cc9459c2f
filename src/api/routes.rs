use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::affordability::{
    AffordabilityService, MaxLoanQuote, MaxLoanRequest, RatioAssessment, RatioRequest,
    RepaymentQuote, RepaymentRequest, ScheduleCatalog,
};
use crate::api::infra::AppState;
use crate::engine::{LevyAssessment, Money};
use crate::error::AppError;
use crate::regulatory::RegulatoryConfigProvider;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevyRequest {
    pub base_value: Money,
}

/// Router builder exposing the calculation endpoints.
pub fn finance_router<P>(service: Arc<AffordabilityService<P>>) -> Router
where
    P: RegulatoryConfigProvider + 'static,
{
    Router::new()
        .route("/api/v1/finance/max-loan", post(max_loan_handler::<P>))
        .route("/api/v1/finance/ratios", post(ratios_handler::<P>))
        .route("/api/v1/finance/repayment", post(repayment_handler::<P>))
        .route(
            "/api/v1/finance/levies/:schedule",
            post(levy_handler::<P>),
        )
        .route("/api/v1/finance/schedules", get(schedules_handler::<P>))
        .with_state(service)
}

/// Calculation endpoints plus health, readiness, and metrics.
///
/// `/ready` and `/metrics` expect an [`AppState`] extension layered on by the caller.
pub fn with_finance_routes<P>(service: Arc<AffordabilityService<P>>) -> Router
where
    P: RegulatoryConfigProvider + 'static,
{
    finance_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn max_loan_handler<P>(
    State(service): State<Arc<AffordabilityService<P>>>,
    payload: Result<Json<MaxLoanRequest>, JsonRejection>,
) -> Result<Json<MaxLoanQuote>, AppError>
where
    P: RegulatoryConfigProvider + 'static,
{
    let Json(request) = payload?;
    Ok(Json(service.max_loan(&request)?))
}

pub(crate) async fn ratios_handler<P>(
    State(service): State<Arc<AffordabilityService<P>>>,
    payload: Result<Json<RatioRequest>, JsonRejection>,
) -> Result<Json<RatioAssessment>, AppError>
where
    P: RegulatoryConfigProvider + 'static,
{
    let Json(request) = payload?;
    Ok(Json(service.ratios(&request)?))
}

pub(crate) async fn repayment_handler<P>(
    State(service): State<Arc<AffordabilityService<P>>>,
    payload: Result<Json<RepaymentRequest>, JsonRejection>,
) -> Result<Json<RepaymentQuote>, AppError>
where
    P: RegulatoryConfigProvider + 'static,
{
    let Json(request) = payload?;
    Ok(Json(service.repayment(&request)?))
}

pub(crate) async fn levy_handler<P>(
    State(service): State<Arc<AffordabilityService<P>>>,
    Path(schedule): Path<String>,
    payload: Result<Json<LevyRequest>, JsonRejection>,
) -> Result<Json<LevyAssessment>, AppError>
where
    P: RegulatoryConfigProvider + 'static,
{
    let Json(request) = payload?;
    Ok(Json(service.levy(&schedule, request.base_value)?))
}

pub(crate) async fn schedules_handler<P>(
    State(service): State<Arc<AffordabilityService<P>>>,
) -> Json<ScheduleCatalog>
where
    P: RegulatoryConfigProvider + 'static,
{
    Json(service.catalog())
}
