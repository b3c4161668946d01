use super::common::{
    created_response, json_body, no_content_response, positive_id, success_response,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::product_raw_materials::{ProductRawMaterialRequest, ProductRawMaterialView},
};
use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

/// Creates the router for product/raw material association endpoints
pub fn product_raw_materials_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_product_raw_materials).post(create_product_raw_material),
        )
        .route(
            "/:id",
            get(get_product_raw_material)
                .put(update_product_raw_material)
                .delete(delete_product_raw_material),
        )
        .route("/product/:product_id", get(list_by_product))
        .route("/raw-material/:raw_material_id", get(list_by_raw_material))
}

#[utoipa::path(
    get,
    path = "/api/v1/product-raw-materials",
    responses(
        (status = 200, description = "All associations", body = [ProductRawMaterialView])
    ),
    tag = "product-raw-materials"
)]
pub async fn list_product_raw_materials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state.services.product_raw_materials.list().await?;
    Ok(success_response(views))
}

#[utoipa::path(
    get,
    path = "/api/v1/product-raw-materials/{id}",
    params(("id" = i64, Path, description = "Association id")),
    responses(
        (status = 200, description = "Association found", body = ProductRawMaterialView),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Association not found", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn get_product_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .services
        .product_raw_materials
        .get(positive_id(id)?)
        .await?;
    Ok(success_response(view))
}

#[utoipa::path(
    get,
    path = "/api/v1/product-raw-materials/product/{product_id}",
    params(("product_id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Raw materials required by the product", body = [ProductRawMaterialView]),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn list_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state
        .services
        .product_raw_materials
        .list_by_product(positive_id(product_id)?)
        .await?;
    Ok(success_response(views))
}

#[utoipa::path(
    get,
    path = "/api/v1/product-raw-materials/raw-material/{raw_material_id}",
    params(("raw_material_id" = i64, Path, description = "Raw material id")),
    responses(
        (status = 200, description = "Products requiring the raw material", body = [ProductRawMaterialView]),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn list_by_raw_material(
    State(state): State<AppState>,
    Path(raw_material_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let views = state
        .services
        .product_raw_materials
        .list_by_raw_material(positive_id(raw_material_id)?)
        .await?;
    Ok(success_response(views))
}

#[utoipa::path(
    post,
    path = "/api/v1/product-raw-materials",
    request_body = ProductRawMaterialRequest,
    responses(
        (status = 201, description = "Association created", body = ProductRawMaterialView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product or raw material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Pair already associated", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn create_product_raw_material(
    State(state): State<AppState>,
    payload: Result<Json<ProductRawMaterialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(payload)?;

    let created = state.services.product_raw_materials.create(request).await?;
    Ok(created_response(created))
}

#[utoipa::path(
    put,
    path = "/api/v1/product-raw-materials/{id}",
    params(("id" = i64, Path, description = "Association id")),
    request_body = ProductRawMaterialRequest,
    responses(
        (status = 200, description = "Association updated", body = ProductRawMaterialView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Association, product or raw material not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Pair already associated", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn update_product_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ProductRawMaterialRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = positive_id(id)?;
    let request = json_body(payload)?;

    let updated = state
        .services
        .product_raw_materials
        .update(id, request)
        .await?;
    Ok(success_response(updated))
}

#[utoipa::path(
    delete,
    path = "/api/v1/product-raw-materials/{id}",
    params(("id" = i64, Path, description = "Association id")),
    responses(
        (status = 204, description = "Association deleted"),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Association not found", body = crate::errors::ErrorResponse)
    ),
    tag = "product-raw-materials"
)]
pub async fn delete_product_raw_material(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .product_raw_materials
        .delete(positive_id(id)?)
        .await?;
    Ok(no_content_response())
}
