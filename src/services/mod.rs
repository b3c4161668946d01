// Catalog maintenance
pub mod product_raw_materials;
pub mod products;
pub mod raw_materials;

// Planning
pub mod production;

use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use tracing::error;
use validator::ValidationError;

use crate::errors::ServiceError;

/// Fractional digits stored for product values
pub const VALUE_SCALE: u32 = 2;
/// Fractional digits stored for stock and required quantities
pub const QUANTITY_SCALE: u32 = 3;

const VALUE_PRECISION: u32 = 10;
const QUANTITY_PRECISION: u32 = 10;

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(validation_error("blank", "must not be blank"));
    }
    Ok(())
}

fn fits_column(value: &Decimal, precision: u32, scale: u32) -> bool {
    let normalized = value.normalize();
    if normalized.scale() > scale {
        return false;
    }
    let integer_digits = normalized.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    integer_digits <= precision - scale
}

pub(crate) fn validate_product_value(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(validation_error("positive", "must be greater than zero"));
    }
    if !fits_column(value, VALUE_PRECISION, VALUE_SCALE) {
        return Err(validation_error(
            "precision",
            "must have at most 8 integer digits and 2 decimal places",
        ));
    }
    Ok(())
}

pub(crate) fn validate_required_quantity(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(validation_error("positive", "must be greater than zero"));
    }
    if !fits_column(value, QUANTITY_PRECISION, QUANTITY_SCALE) {
        return Err(validation_error(
            "precision",
            "must have at most 7 integer digits and 3 decimal places",
        ));
    }
    Ok(())
}

pub(crate) fn validate_stock_quantity(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(validation_error("non_negative", "must not be negative"));
    }
    if !fits_column(value, QUANTITY_PRECISION, QUANTITY_SCALE) {
        return Err(validation_error(
            "precision",
            "must have at most 7 integer digits and 3 decimal places",
        ));
    }
    Ok(())
}

/// Maps a failed write, turning constraint violations into client errors.
pub(crate) fn write_error(action: &str, err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            ServiceError::Conflict(format!("{} violates a uniqueness rule: {}", action, detail))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            ServiceError::Conflict(format!("{} violates a reference rule: {}", action, detail))
        }
        _ => {
            error!("Failed to {}: {}", action, err);
            ServiceError::db_error(err)
        }
    }
}
