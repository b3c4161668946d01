use super::common::{
    created_response, json_body, no_content_response, positive_id, success_response,
};
use crate::{
    entities::raw_material, errors::ApiError, handlers::AppState,
    services::raw_materials::RawMaterialRequest,
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for raw material endpoints
pub fn raw_materials_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_raw_materials).post(create_raw_material))
        .route(
            "/:id",
            get(get_raw_material)
                .put(update_raw_material)
                .delete(delete_raw_material),
        )
        .route("/code/:code", get(get_raw_material_by_code))
}

#[utoipa::path(
    get,
    path = "/api/v1/raw-materials",
    responses(
        (status = 200, description = "All raw materials ordered by name", body = [raw_material::Model]),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn list_raw_materials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_materials = state.services.raw_materials.list().await?;
    Ok(success_response(raw_materials))
}

#[utoipa::path(
    get,
    path = "/api/v1/raw-materials/{id}",
    params(("id" = i64, Path, description = "Raw material id")),
    responses(
        (status = 200, description = "Raw material found", body = raw_material::Model),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Raw material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn get_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_material = state.services.raw_materials.get(positive_id(id)?).await?;
    Ok(success_response(raw_material))
}

#[utoipa::path(
    get,
    path = "/api/v1/raw-materials/code/{code}",
    params(("code" = String, Path, description = "Raw material code")),
    responses(
        (status = 200, description = "Raw material found", body = raw_material::Model),
        (status = 404, description = "Raw material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn get_raw_material_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let raw_material = state.services.raw_materials.get_by_code(&code).await?;
    Ok(success_response(raw_material))
}

#[utoipa::path(
    post,
    path = "/api/v1/raw-materials",
    request_body = RawMaterialRequest,
    responses(
        (status = 201, description = "Raw material created", body = raw_material::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn create_raw_material(
    State(state): State<AppState>,
    payload: Result<Json<RawMaterialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;

    let created = state.services.raw_materials.create(request).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    put,
    path = "/api/v1/raw-materials/{id}",
    params(("id" = i64, Path, description = "Raw material id")),
    request_body = RawMaterialRequest,
    responses(
        (status = 200, description = "Raw material updated", body = raw_material::Model),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Raw material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Code already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn update_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<RawMaterialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = positive_id(id)?;
    let request = json_body(payload)?;

    let updated = state.services.raw_materials.update(id, request).await?;
    Ok(success_response(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/raw-materials/{id}",
    params(("id" = i64, Path, description = "Raw material id")),
    responses(
        (status = 204, description = "Raw material deleted"),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Raw material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Raw material still required by a product", body = crate::errors::ErrorResponse)
    ),
    tag = "raw-materials"
)]
pub async fn delete_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .raw_materials
        .delete(positive_id(id)?)
        .await?;
    Ok(no_content_response())
}
