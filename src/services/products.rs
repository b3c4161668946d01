use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        product_raw_material::{self, Entity as ProductRawMaterialEntity},
    },
    errors::ServiceError,
};

use super::{validate_not_blank, validate_product_value, write_error};

/// Payload for creating or replacing a product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(
        custom = "validate_not_blank",
        length(max = 50, message = "must be at most 50 characters")
    )]
    #[schema(example = "P001")]
    pub code: String,
    #[validate(
        custom = "validate_not_blank",
        length(max = 200, message = "must be at most 200 characters")
    )]
    #[schema(example = "Steel cabinet")]
    pub name: String,
    #[validate(custom = "validate_product_value")]
    #[schema(value_type = String, example = "100.00")]
    pub value: Decimal,
}

/// Product catalog maintenance
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        ProductEntity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list products: {}", e);
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product not found with id: {}", id)))
    }

    #[instrument(skip(self))]
    pub async fn get_by_code(&self, code: &str) -> Result<product::Model, ServiceError> {
        self.find_by_code(code).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Product not found with code: {}", code))
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<product::Model>, ServiceError> {
        ProductEntity::find()
            .filter(product::Column::Code.eq(code))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: ProductRequest) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let code = request.code.trim().to_string();

        if self.find_by_code(&code).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product with code {} already exists",
                code
            )));
        }

        let created = product::ActiveModel {
            code: Set(code),
            name: Set(request.name.trim().to_string()),
            value: Set(request.value),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| write_error("create product", e))?;

        info!(id = created.id, code = %created.code, "Product created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        request: ProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;
        let code = request.code.trim().to_string();

        if existing.code != code {
            if let Some(other) = self.find_by_code(&code).await? {
                if other.id != id {
                    return Err(ServiceError::Conflict(format!(
                        "Product with code {} already exists",
                        code
                    )));
                }
            }
        }

        let mut active: product::ActiveModel = existing.into();
        active.code = Set(code);
        active.name = Set(request.name.trim().to_string());
        active.value = Set(request.value);

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| write_error("update product", e))?;

        info!(id = updated.id, code = %updated.code, "Product updated");
        Ok(updated)
    }

    /// Deletes a product together with its raw material requirements.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let removed = ProductRawMaterialEntity::delete_many()
            .filter(product_raw_material::Column::ProductId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| write_error("delete product requirements", e))?;

        existing
            .delete(&txn)
            .await
            .map_err(|e| write_error("delete product", e))?;

        txn.commit().await.map_err(ServiceError::db_error)?;

        info!(
            id,
            requirements_removed = removed.rows_affected,
            "Product deleted"
        );
        Ok(())
    }
}
