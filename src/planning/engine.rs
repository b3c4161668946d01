use rust_decimal::{Decimal, RoundingStrategy};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::{
    MaterialRequirement, PlanError, PlanPolicy, PlanProduct, ProductionPlan, ProductionPlanItem,
    RequirementsByProduct, StockLevels,
};

/// Greedy, value-first production allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocationEngine {
    policy: PlanPolicy,
}

impl AllocationEngine {
    pub fn new(policy: PlanPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PlanPolicy {
        self.policy
    }

    /// Computes the production plan for one catalog snapshot.
    ///
    /// Products are visited by unit value descending, then code ascending.
    /// Each visited product takes the largest quantity the remaining stock
    /// allows and that quantity's raw materials are deducted from a working
    /// copy of `stock` before the next product is considered. `stock` itself
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::DataIntegrity`] if any requirement points at a raw
    /// material that is absent from `stock`. No partial plan is produced.
    pub fn compute_plan(
        &self,
        products: &[PlanProduct],
        requirements: &RequirementsByProduct,
        stock: &StockLevels,
    ) -> Result<ProductionPlan, PlanError> {
        let mut ordered: Vec<&PlanProduct> = products.iter().collect();
        ordered.sort_by(|a, b| priority_order(a, b));

        for product in &ordered {
            ensure_stock_listed(product.id, requirements, stock)?;
        }

        let mut working: StockLevels = stock
            .iter()
            .map(|(id, quantity)| (*id, (*quantity).max(Decimal::ZERO)))
            .collect();

        let mut items = Vec::new();
        let mut total_value = Decimal::ZERO;

        for product in ordered {
            if product.unit_value <= Decimal::ZERO {
                warn!(
                    product_id = product.id,
                    code = %product.code,
                    unit_value = %product.unit_value,
                    "Skipping product with non-positive unit value"
                );
                continue;
            }

            let needs = consolidated_requirements(product, requirements)?;
            if needs.is_empty() {
                debug!(code = %product.code, "Product has no raw materials configured");
                continue;
            }

            let quantity = self.producible_quantity(product.id, &needs, &working)?;
            if quantity <= Decimal::ZERO {
                debug!(code = %product.code, "Product cannot be produced from remaining stock");
                continue;
            }

            consume(product.id, &needs, quantity, &mut working)?;

            let mut item_value = quantity
                .checked_mul(product.unit_value)
                .ok_or(PlanError::Arithmetic {
                    product_id: product.id,
                    operation: "quantity x unit value",
                })?
                .round_dp_with_strategy(
                    self.policy.value_scale,
                    RoundingStrategy::MidpointAwayFromZero,
                );
            item_value.rescale(self.policy.value_scale);

            total_value = total_value
                .checked_add(item_value)
                .ok_or(PlanError::Arithmetic {
                    product_id: product.id,
                    operation: "plan total",
                })?;

            debug!(
                code = %product.code,
                quantity = %quantity,
                value = %item_value,
                "Product allocated"
            );

            items.push(ProductionPlanItem {
                product_id: product.id,
                product_code: product.code.clone(),
                product_name: product.name.clone(),
                unit_value: product.unit_value,
                quantity,
                total_value: item_value,
            });
        }

        total_value.rescale(self.policy.value_scale);

        Ok(ProductionPlan { items, total_value })
    }

    /// Bottleneck rule: the smallest `available / required` ratio across the
    /// product's raw materials, truncated to the quantity scale.
    fn producible_quantity(
        &self,
        product_id: i64,
        needs: &BTreeMap<i64, Decimal>,
        working: &StockLevels,
    ) -> Result<Decimal, PlanError> {
        let mut bottleneck: Option<Decimal> = None;

        for (raw_material_id, required) in needs {
            let available = working
                .get(raw_material_id)
                .copied()
                .ok_or(PlanError::DataIntegrity {
                    product_id,
                    raw_material_id: *raw_material_id,
                })?;

            let ratio = available
                .checked_div(*required)
                .ok_or(PlanError::Arithmetic {
                    product_id,
                    operation: "available / required",
                })?;

            bottleneck = Some(match bottleneck {
                Some(current) if current <= ratio => current,
                _ => ratio,
            });
        }

        let mut quantity = bottleneck
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(self.policy.quantity_scale, RoundingStrategy::ToZero);
        quantity.rescale(self.policy.quantity_scale);
        Ok(quantity)
    }
}

fn priority_order(a: &PlanProduct, b: &PlanProduct) -> Ordering {
    b.unit_value
        .cmp(&a.unit_value)
        .then_with(|| a.code.cmp(&b.code))
        .then_with(|| a.id.cmp(&b.id))
}

fn ensure_stock_listed(
    product_id: i64,
    requirements: &RequirementsByProduct,
    stock: &StockLevels,
) -> Result<(), PlanError> {
    let Some(lines) = requirements.get(&product_id) else {
        return Ok(());
    };

    match lines
        .iter()
        .find(|line| !stock.contains_key(&line.raw_material_id))
    {
        Some(line) => Err(PlanError::DataIntegrity {
            product_id,
            raw_material_id: line.raw_material_id,
        }),
        None => Ok(()),
    }
}

/// Positive requirements for one product, summed per raw material.
fn consolidated_requirements(
    product: &PlanProduct,
    requirements: &RequirementsByProduct,
) -> Result<BTreeMap<i64, Decimal>, PlanError> {
    let mut needs = BTreeMap::new();

    for MaterialRequirement {
        raw_material_id,
        required_quantity,
    } in requirements.get(&product.id).into_iter().flatten()
    {
        if *required_quantity <= Decimal::ZERO {
            warn!(
                code = %product.code,
                raw_material_id,
                required = %required_quantity,
                "Ignoring non-positive raw material requirement"
            );
            continue;
        }
        let total = needs.entry(*raw_material_id).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(*required_quantity)
            .ok_or(PlanError::Arithmetic {
                product_id: product.id,
                operation: "summing duplicate requirements",
            })?;
    }

    Ok(needs)
}

fn consume(
    product_id: i64,
    needs: &BTreeMap<i64, Decimal>,
    quantity: Decimal,
    working: &mut StockLevels,
) -> Result<(), PlanError> {
    for (raw_material_id, required) in needs {
        let consumed = required
            .checked_mul(quantity)
            .ok_or(PlanError::Arithmetic {
                product_id,
                operation: "required x quantity",
            })?;

        let available = working
            .get_mut(raw_material_id)
            .ok_or(PlanError::DataIntegrity {
                product_id,
                raw_material_id: *raw_material_id,
            })?;

        *available = (*available - consumed).max(Decimal::ZERO);
    }

    Ok(())
}
