//! Production allocation.
//!
//! Given a snapshot of products, their raw material requirements and the
//! current stock of every raw material, [`AllocationEngine`] computes which
//! products to manufacture and in what quantity. Products are served greedily
//! in descending unit value; each one takes the maximum quantity its
//! bottleneck raw material allows from whatever stock the higher-valued
//! products left behind.
//!
//! The engine is pure: it never touches the catalog, never mutates the stock
//! map it is given and holds no state between calls.

mod engine;

pub use engine::AllocationEngine;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use utoipa::ToSchema;

/// Fractional digits kept on producible quantities unless configured otherwise.
pub const DEFAULT_QUANTITY_SCALE: u32 = 3;
/// Fractional digits kept on monetary totals unless configured otherwise.
pub const DEFAULT_VALUE_SCALE: u32 = 2;

/// Requirement lists keyed by product id.
pub type RequirementsByProduct = HashMap<i64, Vec<MaterialRequirement>>;

/// Available quantity keyed by raw material id.
pub type StockLevels = HashMap<i64, Decimal>;

/// A product as seen by the allocation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProduct {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub unit_value: Decimal,
}

/// Quantity of one raw material consumed by one unit of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub raw_material_id: i64,
    pub required_quantity: Decimal,
}

impl MaterialRequirement {
    pub fn new(raw_material_id: i64, required_quantity: Decimal) -> Self {
        Self {
            raw_material_id,
            required_quantity,
        }
    }
}

/// Rounding rules applied while planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Producible quantities are truncated toward zero to this many digits.
    pub quantity_scale: u32,
    /// Item totals are rounded half away from zero to this many digits.
    pub value_scale: u32,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            quantity_scale: DEFAULT_QUANTITY_SCALE,
            value_scale: DEFAULT_VALUE_SCALE,
        }
    }
}

/// One product the plan suggests manufacturing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlanItem {
    pub product_id: i64,
    pub product_code: String,
    pub product_name: String,
    #[schema(value_type = String, example = "10.00")]
    pub unit_value: Decimal,
    #[schema(value_type = String, example = "2.500")]
    pub quantity: Decimal,
    #[schema(value_type = String, example = "25.00")]
    pub total_value: Decimal,
}

/// Ordered production suggestion plus its aggregate value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionPlan {
    pub items: Vec<ProductionPlanItem>,
    #[schema(value_type = String, example = "25.00")]
    pub total_value: Decimal,
}

impl ProductionPlan {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, product_code: &str) -> Option<&ProductionPlanItem> {
        self.items
            .iter()
            .find(|item| item.product_code == product_code)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("product {product_id} requires raw material {raw_material_id}, which is missing from the stock snapshot")]
    DataIntegrity {
        product_id: i64,
        raw_material_id: i64,
    },

    #[error("arithmetic overflow while planning product {product_id}: {operation}")]
    Arithmetic {
        product_id: i64,
        operation: &'static str,
    },
}
