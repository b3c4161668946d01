//! Property-based tests for the production allocation engine.
//!
//! These tests use proptest to verify planning invariants across randomly
//! generated catalogs.

use proptest::prelude::*;
use std::collections::HashMap;

use production_planner::planning::{
    AllocationEngine, MaterialRequirement, PlanPolicy, PlanProduct, RequirementsByProduct,
    StockLevels,
};
use rust_decimal::{Decimal, RoundingStrategy};

const MATERIALS: i64 = 4;

// Strategies for generating test data
fn value_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn stock_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|thousandths| Decimal::new(thousandths, 3))
}

fn required_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000).prop_map(|thousandths| Decimal::new(thousandths, 3))
}

#[derive(Debug, Clone)]
struct Catalog {
    products: Vec<PlanProduct>,
    requirements: RequirementsByProduct,
    stock: StockLevels,
}

fn catalog_strategy() -> impl Strategy<Value = Catalog> {
    let product = (
        value_strategy(),
        prop::collection::vec((0..MATERIALS, required_strategy()), 0..4),
    );

    (
        prop::collection::vec(product, 0..8),
        prop::collection::vec(stock_strategy(), MATERIALS as usize),
    )
        .prop_map(|(products, stock)| {
            let mut requirements = RequirementsByProduct::new();
            let products = products
                .into_iter()
                .enumerate()
                .map(|(index, (unit_value, lines))| {
                    let id = index as i64 + 1;
                    requirements.insert(
                        id,
                        lines
                            .into_iter()
                            .map(|(rm, qty)| MaterialRequirement::new(rm, qty))
                            .collect(),
                    );
                    PlanProduct {
                        id,
                        code: format!("P{:03}", id),
                        name: format!("Product {}", id),
                        unit_value,
                    }
                })
                .collect();
            let stock = stock
                .into_iter()
                .enumerate()
                .map(|(rm, qty)| (rm as i64, qty))
                .collect();

            Catalog {
                products,
                requirements,
                stock,
            }
        })
}

fn engine() -> AllocationEngine {
    AllocationEngine::new(PlanPolicy::default())
}

// Property: a lone product gets exactly its truncated bottleneck
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn single_material_quantity_is_truncated_ratio(
        value in value_strategy(),
        available in stock_strategy(),
        required in required_strategy(),
    ) {
        let products = vec![PlanProduct {
            id: 1,
            code: "P1".to_string(),
            name: "Only".to_string(),
            unit_value: value,
        }];
        let requirements: RequirementsByProduct =
            HashMap::from([(1, vec![MaterialRequirement::new(7, required)])]);
        let stock: StockLevels = HashMap::from([(7, available)]);

        let plan = engine().compute_plan(&products, &requirements, &stock).unwrap();
        let expected = (available / required)
            .round_dp_with_strategy(3, RoundingStrategy::ToZero);

        if expected.is_zero() {
            prop_assert!(plan.is_empty());
        } else {
            prop_assert_eq!(plan.items.len(), 1);
            prop_assert_eq!(plan.items[0].quantity, expected);
        }
    }
}

// Property: allocation never exceeds stock and the plan is well formed
proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn consumption_never_exceeds_initial_stock(catalog in catalog_strategy()) {
        let plan = engine()
            .compute_plan(&catalog.products, &catalog.requirements, &catalog.stock)
            .unwrap();

        let mut consumed: HashMap<i64, Decimal> = HashMap::new();
        for item in &plan.items {
            for line in &catalog.requirements[&item.product_id] {
                *consumed.entry(line.raw_material_id).or_default() +=
                    line.required_quantity * item.quantity;
            }
        }

        for (raw_material_id, used) in consumed {
            prop_assert!(
                used <= catalog.stock[&raw_material_id],
                "raw material {} over-allocated: {} > {}",
                raw_material_id,
                used,
                catalog.stock[&raw_material_id]
            );
        }
    }

    #[test]
    fn items_are_positive_and_ordered_by_value(catalog in catalog_strategy()) {
        let plan = engine()
            .compute_plan(&catalog.products, &catalog.requirements, &catalog.stock)
            .unwrap();

        for item in &plan.items {
            prop_assert!(item.quantity > Decimal::ZERO);
            prop_assert!(item.quantity.scale() == 3);
            prop_assert!(item.total_value.scale() == 2);
        }
        for pair in plan.items.windows(2) {
            prop_assert!(
                pair[0].unit_value > pair[1].unit_value
                    || (pair[0].unit_value == pair[1].unit_value
                        && pair[0].product_code < pair[1].product_code)
            );
        }

        let sum: Decimal = plan.items.iter().map(|item| item.total_value).sum();
        prop_assert_eq!(plan.total_value, sum);
    }

    #[test]
    fn planning_is_repeatable(catalog in catalog_strategy()) {
        let engine = engine();
        let first = engine
            .compute_plan(&catalog.products, &catalog.requirements, &catalog.stock)
            .unwrap();
        let second = engine
            .compute_plan(&catalog.products, &catalog.requirements, &catalog.stock)
            .unwrap();

        prop_assert_eq!(first, second);
    }

    #[test]
    fn input_order_does_not_matter(catalog in catalog_strategy()) {
        let mut reversed = catalog.products.clone();
        reversed.reverse();

        let forward = engine()
            .compute_plan(&catalog.products, &catalog.requirements, &catalog.stock)
            .unwrap();
        let backward = engine()
            .compute_plan(&reversed, &catalog.requirements, &catalog.stock)
            .unwrap();

        prop_assert_eq!(forward, backward);
    }
}
