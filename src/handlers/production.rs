use super::common::success_response;
use crate::{errors::ApiError, handlers::AppState, planning::ProductionPlan};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

/// Creates the router for production planning endpoints
pub fn production_routes() -> Router<AppState> {
    Router::new().route("/calculate", get(calculate_production))
}

/// Suggest what to manufacture from current stock
///
/// Products are served by unit value, highest first. Stock is only deducted in
/// memory; calling this endpoint never changes the catalog.
#[utoipa::path(
    get,
    path = "/api/v1/production/calculate",
    responses(
        (status = 200, description = "Production plan", body = ProductionPlan),
        (status = 500, description = "Catalog is inconsistent", body = crate::errors::ErrorResponse),
        (status = 503, description = "Catalog could not be read", body = crate::errors::ErrorResponse)
    ),
    tag = "production"
)]
pub async fn calculate_production(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = state.services.production.calculate_production().await?;
    Ok(success_response(plan))
}
