use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Production Planner API",
        version = "1.0.0",
        description = r#"
# Production Planner API

Catalog of products and raw materials, the quantity of each raw material a
product consumes, and a production plan computed from current stock.

## Production plan

`GET /api/v1/production/calculate` serves products greedily by unit value,
highest first. Each product takes the largest quantity its scarcest raw
material allows from the stock left by more valuable products. Quantities are
truncated to three decimal places; values are rounded to two.

## Decimals

Decimal fields are returned as strings (`"12.50"`). Requests accept strings
or JSON numbers.

## Error Handling

```json
{
  "error": "Conflict",
  "message": "Conflict: Product with code P001 already exists",
  "request_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "products", description = "Finished goods catalog"),
        (name = "raw-materials", description = "Raw materials and stock"),
        (name = "product-raw-materials", description = "Raw materials each product consumes"),
        (name = "production", description = "Production planning")
    ),
    paths(
        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::get_product_by_code,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Raw materials
        crate::handlers::raw_materials::list_raw_materials,
        crate::handlers::raw_materials::get_raw_material,
        crate::handlers::raw_materials::get_raw_material_by_code,
        crate::handlers::raw_materials::create_raw_material,
        crate::handlers::raw_materials::update_raw_material,
        crate::handlers::raw_materials::delete_raw_material,

        // Associations
        crate::handlers::product_raw_materials::list_product_raw_materials,
        crate::handlers::product_raw_materials::get_product_raw_material,
        crate::handlers::product_raw_materials::list_by_product,
        crate::handlers::product_raw_materials::list_by_raw_material,
        crate::handlers::product_raw_materials::create_product_raw_material,
        crate::handlers::product_raw_materials::update_product_raw_material,
        crate::handlers::product_raw_materials::delete_product_raw_material,

        // Production
        crate::handlers::production::calculate_production,
    ),
    components(
        schemas(
            crate::entities::product::Model,
            crate::entities::raw_material::Model,
            crate::services::products::ProductRequest,
            crate::services::raw_materials::RawMaterialRequest,
            crate::services::product_raw_materials::ProductRawMaterialRequest,
            crate::services::product_raw_materials::ProductRawMaterialView,
            crate::planning::ProductionPlan,
            crate::planning::ProductionPlanItem,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}
