//! Read side of the catalog as consumed by production planning.
//!
//! [`CatalogReader`] is the seam between the planner and storage. The database
//! implementation reads products, requirements and stock inside a single
//! transaction so the planner never sees a half-applied catalog update.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, IsolationLevel,
    QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::{
    entities::{product, product_raw_material, raw_material},
    errors::ServiceError,
    planning::{PlanProduct, RequirementsByProduct, StockLevels},
};

/// Requirement rows grouped by product id
pub type RequirementRows = HashMap<i64, Vec<product_raw_material::Model>>;

/// Point-in-time view of everything the planner needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSnapshot {
    pub products: Vec<product::Model>,
    pub requirements: RequirementRows,
    pub raw_materials: Vec<raw_material::Model>,
}

impl CatalogSnapshot {
    pub fn plan_products(&self) -> Vec<PlanProduct> {
        self.products
            .iter()
            .map(|p| PlanProduct {
                id: p.id,
                code: p.code.clone(),
                name: p.name.clone(),
                unit_value: p.value,
            })
            .collect()
    }

    pub fn plan_requirements(&self) -> RequirementsByProduct {
        self.requirements
            .iter()
            .map(|(product_id, rows)| {
                (
                    *product_id,
                    rows.iter()
                        .map(product_raw_material::Model::requirement)
                        .collect(),
                )
            })
            .collect()
    }

    pub fn stock_levels(&self) -> StockLevels {
        self.raw_materials
            .iter()
            .map(|rm| (rm.id, rm.stock_quantity))
            .collect()
    }
}

fn group_by_product(rows: Vec<product_raw_material::Model>) -> RequirementRows {
    let mut grouped = RequirementRows::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row);
    }
    grouped
}

/// Read contract the production planner depends on.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError>;

    async fn list_all_requirements(&self) -> Result<RequirementRows, ServiceError>;

    async fn list_raw_materials(&self) -> Result<Vec<raw_material::Model>, ServiceError>;

    /// All three reads against one consistent view.
    ///
    /// The default runs them one after another; implementations backed by a
    /// live store should override it.
    async fn snapshot(&self) -> Result<CatalogSnapshot, ServiceError> {
        Ok(CatalogSnapshot {
            products: self.list_products().await?,
            requirements: self.list_all_requirements().await?,
            raw_materials: self.list_raw_materials().await?,
        })
    }
}

#[async_trait]
impl CatalogReader for CatalogSnapshot {
    async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        Ok(self.products.clone())
    }

    async fn list_all_requirements(&self) -> Result<RequirementRows, ServiceError> {
        Ok(self.requirements.clone())
    }

    async fn list_raw_materials(&self) -> Result<Vec<raw_material::Model>, ServiceError> {
        Ok(self.raw_materials.clone())
    }

    async fn snapshot(&self) -> Result<CatalogSnapshot, ServiceError> {
        Ok(self.clone())
    }
}

/// Catalog reader backed by the relational store.
#[derive(Clone)]
pub struct DbCatalog {
    db: Arc<DatabaseConnection>,
}

impl DbCatalog {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn unavailable(what: &str, err: sea_orm::DbErr) -> ServiceError {
    error!(error = %err, "Failed to read {}", what);
    ServiceError::unavailable(format!("failed to read {}: {}", what, err))
}

#[async_trait]
impl CatalogReader for DbCatalog {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| unavailable("products", e))
    }

    #[instrument(skip(self))]
    async fn list_all_requirements(&self) -> Result<RequirementRows, ServiceError> {
        let rows = product_raw_material::Entity::find()
            .order_by_asc(product_raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| unavailable("requirements", e))?;
        Ok(group_by_product(rows))
    }

    #[instrument(skip(self))]
    async fn list_raw_materials(&self) -> Result<Vec<raw_material::Model>, ServiceError> {
        raw_material::Entity::find()
            .order_by_asc(raw_material::Column::Id)
            .all(&*self.db)
            .await
            .map_err(|e| unavailable("raw materials", e))
    }

    #[instrument(skip(self))]
    async fn snapshot(&self) -> Result<CatalogSnapshot, ServiceError> {
        // SQLite transactions are serializable and do not accept these options
        let (isolation, access) = match self.db.get_database_backend() {
            DbBackend::Sqlite => (None, None),
            _ => (
                Some(IsolationLevel::RepeatableRead),
                Some(AccessMode::ReadOnly),
            ),
        };

        let txn = self
            .db
            .begin_with_config(isolation, access)
            .await
            .map_err(|e| unavailable("catalog snapshot", e))?;

        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&txn)
            .await
            .map_err(|e| unavailable("products", e))?;

        let requirement_rows = product_raw_material::Entity::find()
            .order_by_asc(product_raw_material::Column::Id)
            .all(&txn)
            .await
            .map_err(|e| unavailable("requirements", e))?;

        let raw_materials = raw_material::Entity::find()
            .order_by_asc(raw_material::Column::Id)
            .all(&txn)
            .await
            .map_err(|e| unavailable("raw materials", e))?;

        txn.commit()
            .await
            .map_err(|e| unavailable("catalog snapshot", e))?;

        debug!(
            products = products.len(),
            requirements = requirement_rows.len(),
            raw_materials = raw_materials.len(),
            "Catalog snapshot loaded"
        );

        Ok(CatalogSnapshot {
            products,
            requirements: group_by_product(requirement_rows),
            raw_materials,
        })
    }
}
