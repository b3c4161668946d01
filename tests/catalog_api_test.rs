mod common;

use axum::http::StatusCode;
use common::{decimal, id_of, response_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn product_crud_lifecycle() {
    let app = TestApp::new().await;

    let created = app.create_product("P-TEST-001", "150.50").await;
    let id = id_of(&created);
    assert_eq!(created["code"], "P-TEST-001");
    assert_eq!(created["name"], "Product P-TEST-001");
    assert_eq!(decimal(&created["value"]), dec!(150.50));

    let fetched = response_json(app.get(&format!("/api/v1/products/{id}")).await).await;
    assert_eq!(fetched["code"], "P-TEST-001");

    let by_code = app.get("/api/v1/products/code/P-TEST-001").await;
    assert_eq!(by_code.status(), StatusCode::OK);
    assert_eq!(id_of(&response_json(by_code).await), id);

    let updated = app
        .put(
            &format!("/api/v1/products/{id}"),
            json!({ "code": "P-TEST-002", "name": "Renamed", "value": 99.9 }),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated = response_json(updated).await;
    assert_eq!(updated["code"], "P-TEST-002");
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(decimal(&updated["value"]), dec!(99.9));

    let listed = response_json(app.get("/api/v1/products").await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let deleted = app.delete(&format!("/api/v1/products/{id}")).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app.get(&format!("/api/v1/products/{id}")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_validation_failures_are_bad_requests() {
    let app = TestApp::new().await;

    let blank_code = app
        .post(
            "/api/v1/products",
            json!({ "code": "  ", "name": "Nameless", "value": "10.00" }),
        )
        .await;
    assert_eq!(blank_code.status(), StatusCode::BAD_REQUEST);
    let body = response_json(blank_code).await;
    assert_eq!(body["message"], "Validation failed");
    assert!(body["details"].as_str().unwrap().contains("code"));

    let negative_value = app
        .post(
            "/api/v1/products",
            json!({ "code": "P1", "name": "Negative", "value": "-1" }),
        )
        .await;
    assert_eq!(negative_value.status(), StatusCode::BAD_REQUEST);

    let too_precise = app
        .post(
            "/api/v1/products",
            json!({ "code": "P1", "name": "Precise", "value": "1.005" }),
        )
        .await;
    assert_eq!(too_precise.status(), StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/api/v1/products", json!({ "code": "P1", "name": "No value" }))
        .await;
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_payloads_are_rejected_before_any_lookup() {
    let app = TestApp::new().await;

    let update_unknown = app
        .put(
            "/api/v1/products/999",
            json!({ "code": "", "name": "Ghost", "value": "1.00" }),
        )
        .await;
    assert_eq!(update_unknown.status(), StatusCode::BAD_REQUEST);
    let body = response_json(update_unknown).await;
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Validation failed");

    let association = app
        .post(
            "/api/v1/product-raw-materials",
            json!({ "productId": 999, "rawMaterialId": 999, "requiredQuantity": "-2" }),
        )
        .await;
    assert_eq!(association.status(), StatusCode::BAD_REQUEST);
    let body = response_json(association).await;
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("required_quantity"));
}

#[tokio::test]
async fn duplicate_product_code_is_a_conflict() {
    let app = TestApp::new().await;
    app.create_product("DUP", "10.00").await;

    let duplicate = app
        .post(
            "/api/v1/products",
            json!({ "code": "DUP", "name": "Again", "value": "12.00" }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    let body = response_json(duplicate).await;
    assert_eq!(body["error"], "Conflict");
    assert!(body["message"].as_str().unwrap().contains("already exists"));

    // renaming another product onto the taken code conflicts too
    let other = app.create_product("OTHER", "5.00").await;
    let rename = app
        .put(
            &format!("/api/v1/products/{}", id_of(&other)),
            json!({ "code": "DUP", "name": "Other", "value": "5.00" }),
        )
        .await;
    assert_eq!(rename.status(), StatusCode::CONFLICT);

    // keeping its own code is fine
    let same_code = app
        .put(
            &format!("/api/v1/products/{}", id_of(&other)),
            json!({ "code": "OTHER", "name": "Other renamed", "value": "6.00" }),
        )
        .await;
    assert_eq!(same_code.status(), StatusCode::OK);
}

#[tokio::test]
async fn invalid_and_unknown_ids() {
    let app = TestApp::new().await;

    assert_eq!(
        app.get("/api/v1/products/0").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/api/v1/raw-materials/-4").await.status(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        app.get("/api/v1/products/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/v1/raw-materials/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/v1/product-raw-materials/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.delete("/api/v1/products/999").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get("/api/v1/raw-materials/code/NOPE").await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn raw_materials_are_listed_by_name() {
    let app = TestApp::new().await;
    for (code, name) in [("RM-C", "Copper"), ("RM-A", "Aluminium"), ("RM-B", "Brass")] {
        let response = app
            .post(
                "/api/v1/raw-materials",
                json!({ "code": code, "name": name, "stockQuantity": "1.000" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let listed = response_json(app.get("/api/v1/raw-materials").await).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|rm| rm["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Aluminium", "Brass", "Copper"]);
}

#[tokio::test]
async fn raw_material_stock_rules() {
    let app = TestApp::new().await;

    let negative = app
        .post(
            "/api/v1/raw-materials",
            json!({ "code": "RM1", "name": "Steel", "stockQuantity": "-0.5" }),
        )
        .await;
    assert_eq!(negative.status(), StatusCode::BAD_REQUEST);

    let zero = app.create_raw_material("RM1", "0").await;
    assert_eq!(decimal(&zero["stockQuantity"]), dec!(0));

    let restocked = app
        .put(
            &format!("/api/v1/raw-materials/{}", id_of(&zero)),
            json!({ "code": "RM1", "name": "Steel", "stockQuantity": "12.345" }),
        )
        .await;
    assert_eq!(restocked.status(), StatusCode::OK);
    assert_eq!(
        decimal(&response_json(restocked).await["stockQuantity"]),
        dec!(12.345)
    );

    let duplicate = app
        .post(
            "/api/v1/raw-materials",
            json!({ "code": "RM1", "name": "Again", "stockQuantity": "1" }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn association_lifecycle_with_display_names() {
    let app = TestApp::new().await;
    let product = app.create_product("P1", "10.00").await;
    let steel = app.create_raw_material("RM1", "100").await;
    let paint = app.create_raw_material("RM2", "50").await;

    let created = app.associate(id_of(&product), id_of(&steel), "2.5").await;
    assert_eq!(created["productId"], id_of(&product));
    assert_eq!(created["rawMaterialId"], id_of(&steel));
    assert_eq!(created["productName"], "Product P1");
    assert_eq!(created["rawMaterialName"], "Material RM1");
    assert_eq!(decimal(&created["requiredQuantity"]), dec!(2.5));
    let association_id = id_of(&created);

    let by_product = response_json(
        app.get(&format!(
            "/api/v1/product-raw-materials/product/{}",
            id_of(&product)
        ))
        .await,
    )
    .await;
    assert_eq!(by_product.as_array().unwrap().len(), 1);

    let by_material = response_json(
        app.get(&format!(
            "/api/v1/product-raw-materials/raw-material/{}",
            id_of(&paint)
        ))
        .await,
    )
    .await;
    assert!(by_material.as_array().unwrap().is_empty());

    let moved = app
        .put(
            &format!("/api/v1/product-raw-materials/{association_id}"),
            json!({
                "productId": id_of(&product),
                "rawMaterialId": id_of(&paint),
                "requiredQuantity": "0.75"
            }),
        )
        .await;
    assert_eq!(moved.status(), StatusCode::OK);
    let moved = response_json(moved).await;
    assert_eq!(moved["rawMaterialName"], "Material RM2");
    assert_eq!(decimal(&moved["requiredQuantity"]), dec!(0.75));

    let fetched = response_json(
        app.get(&format!("/api/v1/product-raw-materials/{association_id}"))
            .await,
    )
    .await;
    assert_eq!(fetched["rawMaterialId"], id_of(&paint));

    let deleted = app
        .delete(&format!("/api/v1/product-raw-materials/{association_id}"))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let all = response_json(app.get("/api/v1/product-raw-materials").await).await;
    assert!(all.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn association_rules() {
    let app = TestApp::new().await;
    let product = app.create_product("P1", "10.00").await;
    let steel = app.create_raw_material("RM1", "100").await;
    app.associate(id_of(&product), id_of(&steel), "1").await;

    let duplicate = app
        .post(
            "/api/v1/product-raw-materials",
            json!({
                "productId": id_of(&product),
                "rawMaterialId": id_of(&steel),
                "requiredQuantity": "3"
            }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let unknown_product = app
        .post(
            "/api/v1/product-raw-materials",
            json!({ "productId": 999, "rawMaterialId": id_of(&steel), "requiredQuantity": "1" }),
        )
        .await;
    assert_eq!(unknown_product.status(), StatusCode::NOT_FOUND);

    let unknown_material = app
        .post(
            "/api/v1/product-raw-materials",
            json!({ "productId": id_of(&product), "rawMaterialId": 999, "requiredQuantity": "1" }),
        )
        .await;
    assert_eq!(unknown_material.status(), StatusCode::NOT_FOUND);

    let zero_quantity = app
        .post(
            "/api/v1/product-raw-materials",
            json!({ "productId": id_of(&product), "rawMaterialId": id_of(&steel), "requiredQuantity": "0" }),
        )
        .await;
    assert_eq!(zero_quantity.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn raw_material_in_use_cannot_be_deleted() {
    let app = TestApp::new().await;
    let product = app.create_product("P1", "10.00").await;
    let steel = app.create_raw_material("RM1", "100").await;
    let association = app.associate(id_of(&product), id_of(&steel), "1").await;

    let blocked = app
        .delete(&format!("/api/v1/raw-materials/{}", id_of(&steel)))
        .await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    app.delete(&format!(
        "/api/v1/product-raw-materials/{}",
        id_of(&association)
    ))
    .await;

    let allowed = app
        .delete(&format!("/api/v1/raw-materials/{}", id_of(&steel)))
        .await;
    assert_eq!(allowed.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn deleting_a_product_removes_its_requirements() {
    let app = TestApp::new().await;
    let product = app.create_product("P1", "10.00").await;
    let steel = app.create_raw_material("RM1", "100").await;
    app.associate(id_of(&product), id_of(&steel), "1").await;

    let deleted = app
        .delete(&format!("/api/v1/products/{}", id_of(&product)))
        .await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let remaining = response_json(
        app.get(&format!(
            "/api/v1/product-raw-materials/raw-material/{}",
            id_of(&steel)
        ))
        .await,
    )
    .await;
    assert!(remaining.as_array().unwrap().is_empty());

    // the raw material is free again
    let freed = app
        .delete(&format!("/api/v1/raw-materials/{}", id_of(&steel)))
        .await;
    assert_eq!(freed.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn error_bodies_carry_the_request_id() {
    let app = TestApp::new().await;

    let response = app.get("/api/v1/products/12345").await;
    let header = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("request id header");

    let body = response_json(response).await;
    assert_eq!(body["request_id"], header.as_str());
    assert!(body["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn health_reports_database_status() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["details"]["database"], "up");
}
