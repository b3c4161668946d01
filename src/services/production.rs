use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::{
    catalog::CatalogReader,
    errors::ServiceError,
    planning::{AllocationEngine, ProductionPlan},
};

/// Computes production suggestions from the current catalog.
///
/// Reads never write back: the engine deducts stock from its own working
/// copy only.
#[derive(Clone)]
pub struct ProductionService {
    reader: Arc<dyn CatalogReader>,
    engine: AllocationEngine,
}

impl ProductionService {
    pub fn new(reader: Arc<dyn CatalogReader>, engine: AllocationEngine) -> Self {
        Self { reader, engine }
    }

    pub fn engine(&self) -> &AllocationEngine {
        &self.engine
    }

    #[instrument(skip(self))]
    pub async fn calculate_production(&self) -> Result<ProductionPlan, ServiceError> {
        let start = Instant::now();
        let result = self.plan_from_snapshot().await;
        histogram!("production_planner.plan.duration", start.elapsed());

        match &result {
            Ok(plan) => {
                counter!("production_planner.plan.computed", 1);
                info!(
                    items = plan.items.len(),
                    total_value = %plan.total_value,
                    "Production plan computed"
                );
            }
            Err(e) => {
                counter!("production_planner.plan.failed", 1);
                warn!(error = %e, "Production plan could not be computed");
            }
        }

        result
    }

    async fn plan_from_snapshot(&self) -> Result<ProductionPlan, ServiceError> {
        let snapshot = self.reader.snapshot().await?;

        let products = snapshot.plan_products();
        let requirements = snapshot.plan_requirements();
        let stock = snapshot.stock_levels();

        Ok(self.engine.compute_plan(&products, &requirements, &stock)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSnapshot;
    use crate::entities::{product, product_raw_material, raw_material};
    use crate::planning::PlanPolicy;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn product(id: i64, code: &str, value: Decimal) -> product::Model {
        product::Model {
            id,
            code: code.into(),
            name: format!("Product {}", code),
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn raw_material(id: i64, stock: Decimal) -> raw_material::Model {
        raw_material::Model {
            id,
            code: format!("RM{}", id),
            name: format!("Raw material {}", id),
            stock_quantity: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn requirement(
        id: i64,
        product_id: i64,
        raw_material_id: i64,
        quantity: Decimal,
    ) -> product_raw_material::Model {
        product_raw_material::Model {
            id,
            product_id,
            raw_material_id,
            required_quantity: quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn service(snapshot: CatalogSnapshot) -> ProductionService {
        ProductionService::new(
            Arc::new(snapshot),
            AllocationEngine::new(PlanPolicy::default()),
        )
    }

    #[tokio::test]
    async fn calculates_plan_from_snapshot() {
        let mut snapshot = CatalogSnapshot {
            products: vec![product(1, "P1", dec!(10)), product(2, "P2", dec!(5))],
            raw_materials: vec![raw_material(1, dec!(5))],
            ..Default::default()
        };
        snapshot
            .requirements
            .insert(1, vec![requirement(1, 1, 1, dec!(2))]);
        snapshot
            .requirements
            .insert(2, vec![requirement(2, 2, 1, dec!(1))]);

        let plan = service(snapshot.clone()).calculate_production().await.unwrap();

        assert_eq!(plan.items.len(), 1);
        assert_eq!(plan.items[0].product_code, "P1");
        assert_eq!(plan.items[0].quantity, dec!(2.500));
        assert_eq!(plan.total_value.to_string(), "25.00");
        // stock in the snapshot is untouched
        assert_eq!(snapshot.raw_materials[0].stock_quantity, dec!(5));
    }

    #[tokio::test]
    async fn dangling_requirement_is_an_integrity_error() {
        let mut snapshot = CatalogSnapshot {
            products: vec![product(1, "P1", dec!(10))],
            raw_materials: vec![raw_material(1, dec!(5))],
            ..Default::default()
        };
        snapshot
            .requirements
            .insert(1, vec![requirement(1, 1, 42, dec!(1))]);

        let err = service(snapshot).calculate_production().await.unwrap_err();
        assert_matches!(err, ServiceError::DataIntegrity(_));
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_plan() {
        let plan = service(CatalogSnapshot::default())
            .calculate_production()
            .await
            .unwrap();

        assert!(plan.is_empty());
        assert_eq!(plan.total_value.to_string(), "0.00");
    }

    #[tokio::test]
    async fn configured_policy_drives_rounding() {
        let policy = PlanPolicy {
            quantity_scale: 4,
            value_scale: 1,
        };
        let mut snapshot = CatalogSnapshot {
            products: vec![product(1, "P1", dec!(1))],
            raw_materials: vec![raw_material(1, dec!(1))],
            ..Default::default()
        };
        snapshot
            .requirements
            .insert(1, vec![requirement(1, 1, 1, dec!(3))]);
        let service = ProductionService::new(Arc::new(snapshot), AllocationEngine::new(policy));

        assert_eq!(service.engine().policy(), policy);

        let plan = service.calculate_production().await.unwrap();
        assert_eq!(plan.items[0].quantity.to_string(), "0.3333");
        assert_eq!(plan.total_value.to_string(), "0.3");
    }
}
