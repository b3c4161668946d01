use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    entities::{
        product::{self, Entity as ProductEntity},
        product_raw_material::{self, Entity as ProductRawMaterialEntity},
        raw_material::{self, Entity as RawMaterialEntity},
    },
    errors::ServiceError,
};

use super::{validate_required_quantity, write_error};

/// Payload for creating or replacing a product/raw material association
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRawMaterialRequest {
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub product_id: i64,
    #[validate(range(min = 1, message = "must be a positive id"))]
    pub raw_material_id: i64,
    #[validate(custom = "validate_required_quantity")]
    #[schema(value_type = String, example = "2.000")]
    pub required_quantity: Decimal,
}

/// Association as shown to clients, with display names resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRawMaterialView {
    pub id: i64,
    pub product_id: i64,
    pub raw_material_id: i64,
    #[schema(value_type = String, example = "2.000")]
    pub required_quantity: Decimal,
    pub product_name: Option<String>,
    pub raw_material_name: Option<String>,
}

impl ProductRawMaterialView {
    fn new(
        row: product_raw_material::Model,
        product_name: Option<String>,
        raw_material_name: Option<String>,
    ) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            raw_material_id: row.raw_material_id,
            required_quantity: row.required_quantity,
            product_name,
            raw_material_name,
        }
    }
}

/// Maintenance of the product bill of raw materials
#[derive(Clone)]
pub struct ProductRawMaterialService {
    db: Arc<DatabaseConnection>,
}

impl ProductRawMaterialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ProductRawMaterialView>, ServiceError> {
        let rows = ProductRawMaterialEntity::find()
            .order_by_asc(product_raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list product raw materials: {}", e);
                ServiceError::db_error(e)
            })?;
        self.with_names(rows).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<ProductRawMaterialView, ServiceError> {
        let row = self.find(id).await?;
        let mut views = self.with_names(vec![row]).await?;
        views
            .pop()
            .ok_or_else(|| ServiceError::InternalError("association lookup lost its row".into()))
    }

    #[instrument(skip(self))]
    pub async fn list_by_product(
        &self,
        product_id: i64,
    ) -> Result<Vec<ProductRawMaterialView>, ServiceError> {
        let rows = ProductRawMaterialEntity::find()
            .filter(product_raw_material::Column::ProductId.eq(product_id))
            .order_by_asc(product_raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        self.with_names(rows).await
    }

    #[instrument(skip(self))]
    pub async fn list_by_raw_material(
        &self,
        raw_material_id: i64,
    ) -> Result<Vec<ProductRawMaterialView>, ServiceError> {
        let rows = ProductRawMaterialEntity::find()
            .filter(product_raw_material::Column::RawMaterialId.eq(raw_material_id))
            .order_by_asc(product_raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        self.with_names(rows).await
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        request: ProductRawMaterialRequest,
    ) -> Result<ProductRawMaterialView, ServiceError> {
        request.validate()?;
        let product = self.product(request.product_id).await?;
        let raw_material = self.raw_material(request.raw_material_id).await?;
        self.ensure_pair_free(request.product_id, request.raw_material_id, None)
            .await?;

        let created = product_raw_material::ActiveModel {
            product_id: Set(request.product_id),
            raw_material_id: Set(request.raw_material_id),
            required_quantity: Set(request.required_quantity),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| write_error("create product raw material", e))?;

        info!(
            id = created.id,
            product = %product.code,
            raw_material = %raw_material.code,
            required = %created.required_quantity,
            "Raw material associated with product"
        );
        Ok(ProductRawMaterialView::new(
            created,
            Some(product.name),
            Some(raw_material.name),
        ))
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i64,
        request: ProductRawMaterialRequest,
    ) -> Result<ProductRawMaterialView, ServiceError> {
        request.validate()?;
        let existing = self.find(id).await?;
        let product = self.product(request.product_id).await?;
        let raw_material = self.raw_material(request.raw_material_id).await?;

        if existing.product_id != request.product_id
            || existing.raw_material_id != request.raw_material_id
        {
            self.ensure_pair_free(request.product_id, request.raw_material_id, Some(id))
                .await?;
        }

        let mut active: product_raw_material::ActiveModel = existing.into();
        active.product_id = Set(request.product_id);
        active.raw_material_id = Set(request.raw_material_id);
        active.required_quantity = Set(request.required_quantity);

        let updated = active
            .update(&*self.db)
            .await
            .map_err(|e| write_error("update product raw material", e))?;

        info!(id, required = %updated.required_quantity, "Product raw material updated");
        Ok(ProductRawMaterialView::new(
            updated,
            Some(product.name),
            Some(raw_material.name),
        ))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;
        existing
            .delete(&*self.db)
            .await
            .map_err(|e| write_error("delete product raw material", e))?;

        info!(id, "Product raw material deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> Result<product_raw_material::Model, ServiceError> {
        ProductRawMaterialEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Product-RawMaterial association not found with id: {}",
                    id
                ))
            })
    }

    async fn product(&self, id: i64) -> Result<product::Model, ServiceError> {
        ProductEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product not found with id: {}", id)))
    }

    async fn raw_material(&self, id: i64) -> Result<raw_material::Model, ServiceError> {
        RawMaterialEntity::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Raw material not found with id: {}", id))
            })
    }

    async fn ensure_pair_free(
        &self,
        product_id: i64,
        raw_material_id: i64,
        ignore_id: Option<i64>,
    ) -> Result<(), ServiceError> {
        let mut query = ProductRawMaterialEntity::find()
            .filter(product_raw_material::Column::ProductId.eq(product_id))
            .filter(product_raw_material::Column::RawMaterialId.eq(raw_material_id));
        if let Some(id) = ignore_id {
            query = query.filter(product_raw_material::Column::Id.ne(id));
        }

        match query.one(&*self.db).await.map_err(ServiceError::db_error)? {
            Some(_) => Err(ServiceError::Conflict(format!(
                "Product {} is already associated with raw material {}",
                product_id, raw_material_id
            ))),
            None => Ok(()),
        }
    }

    async fn with_names(
        &self,
        rows: Vec<product_raw_material::Model>,
    ) -> Result<Vec<ProductRawMaterialView>, ServiceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: HashSet<i64> = rows.iter().map(|r| r.product_id).collect();
        let raw_material_ids: HashSet<i64> = rows.iter().map(|r| r.raw_material_id).collect();

        let product_names: HashMap<i64, String> = ProductEntity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let raw_material_names: HashMap<i64, String> = RawMaterialEntity::find()
            .filter(raw_material::Column::Id.is_in(raw_material_ids))
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|rm| (rm.id, rm.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_name = product_names.get(&row.product_id).cloned();
                let raw_material_name = raw_material_names.get(&row.raw_material_id).cloned();
                ProductRawMaterialView::new(row, product_name, raw_material_name)
            })
            .collect())
    }
}
