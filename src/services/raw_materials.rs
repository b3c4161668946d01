use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        product_raw_material::{self, Entity as ProductRawMaterialEntity},
        raw_material::{self, Entity as RawMaterialEntity},
    },
    errors::ServiceError,
};

use super::{validate_not_blank, validate_stock_quantity, write_error};

/// Payload for creating or replacing a raw material
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialRequest {
    #[validate(
        custom = "validate_not_blank",
        length(max = 50, message = "must be at most 50 characters")
    )]
    #[schema(example = "RM001")]
    pub code: String,
    #[validate(
        custom = "validate_not_blank",
        length(max = 200, message = "must be at most 200 characters")
    )]
    #[schema(example = "Steel sheet")]
    pub name: String,
    #[validate(custom = "validate_stock_quantity")]
    #[schema(value_type = String, example = "125.500")]
    pub stock_quantity: Decimal,
}

/// Raw material catalog and stock maintenance
#[derive(Clone)]
pub struct RawMaterialService {
    db: Arc<DatabaseConnection>,
}

impl RawMaterialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Lists raw materials ordered by name
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<raw_material::Model>, ServiceError> {
        RawMaterialEntity::find()
            .order_by_asc(raw_material::Column::Name)
            .order_by_asc(raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list raw materials: {}", e);
                ServiceError::db_error(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<raw_material::Model, ServiceError> {
        RawMaterialEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Raw material not found with id: {}", id))
            })
    }

    #[instrument(skip(self))]
    pub async fn get_by_code(&self, code: &str) -> Result<raw_material::Model, ServiceError> {
        self.find_by_code(code).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Raw material not found with code: {}", code))
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<raw_material::Model>, ServiceError> {
        RawMaterialEntity::find()
            .filter(raw_material::Column::Code.eq(code))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        request: RawMaterialRequest,
    ) -> Result<raw_material::Model, ServiceError> {
        request.validate()?;
        let code = request.code.trim().to_string();

        if self.find_by_code(&code).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Raw material with code {} already exists",
                code
            )));
        }

        let created = raw_material::ActiveModel {
            code: Set(code),
            name: Set(request.name.trim().to_string()),
            stock_quantity: Set(request.stock_quantity),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| write_error("create raw material", e))?;

        info!(id = created.id, code = %created.code, stock = %created.stock_quantity, "Raw material created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        request: RawMaterialRequest,
    ) -> Result<raw_material::Model, ServiceError> {
        request.validate()?;
        let existing = self.get(id).await?;
        let code = request.code.trim().to_string();

        if existing.code != code {
            if let Some(other) = self.find_by_code(&code).await? {
                if other.id != id {
                    return Err(ServiceError::Conflict(format!(
                        "Raw material with code {} already exists",
                        code
                    )));
                }
            }
        }

        let previous_stock = existing.stock_quantity;
        let mut active: raw_material::ActiveModel = existing.into();
        active.code = Set(code);
        active.name = Set(request.name.trim().to_string());
        active.stock_quantity = Set(request.stock_quantity);

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| write_error("update raw material", e))?;

        info!(
            id = updated.id,
            code = %updated.code,
            previous_stock = %previous_stock,
            stock = %updated.stock_quantity,
            "Raw material updated"
        );
        Ok(updated)
    }

    /// Deletes a raw material that no product requires any more.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let references = ProductRawMaterialEntity::find()
            .filter(product_raw_material::Column::RawMaterialId.eq(id))
            .count(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        if references > 0 {
            warn!(id, references, "Refusing to delete raw material still in use");
            return Err(ServiceError::Conflict(format!(
                "Raw material {} is required by {} product(s); remove those associations first",
                existing.code, references
            )));
        }

        existing
            .delete(&*self.db)
            .await
            .map_err(|e| write_error("delete raw material", e))?;

        info!(id, "Raw material deleted");
        Ok(())
    }
}
