pub mod common;
pub mod product_raw_materials;
pub mod production;
pub mod products;
pub mod raw_materials;

use std::sync::Arc;

use crate::{
    catalog::{CatalogReader, DbCatalog},
    db::DbPool,
    planning::{AllocationEngine, PlanPolicy},
    services::{
        product_raw_materials::ProductRawMaterialService, production::ProductionService,
        products::ProductService, raw_materials::RawMaterialService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub raw_materials: Arc<RawMaterialService>,
    pub product_raw_materials: Arc<ProductRawMaterialService>,
    pub production: Arc<ProductionService>,
}

impl AppServices {
    /// Wires every service against one pool, planning from the live catalog.
    pub fn new(db_pool: Arc<DbPool>, policy: PlanPolicy) -> Self {
        let reader: Arc<dyn CatalogReader> = Arc::new(DbCatalog::new(db_pool.clone()));
        Self::with_reader(db_pool, reader, policy)
    }

    /// Same as [`AppServices::new`] with a caller-supplied catalog reader.
    pub fn with_reader(
        db_pool: Arc<DbPool>,
        reader: Arc<dyn CatalogReader>,
        policy: PlanPolicy,
    ) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone())),
            raw_materials: Arc::new(RawMaterialService::new(db_pool.clone())),
            product_raw_materials: Arc::new(ProductRawMaterialService::new(db_pool)),
            production: Arc::new(ProductionService::new(
                reader,
                AllocationEngine::new(policy),
            )),
        }
    }
}
