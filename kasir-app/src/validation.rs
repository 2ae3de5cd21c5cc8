//! Input validation helpers
//!
//! Text length limits and settings checks applied before anything is
//! persisted. Limits follow the receipt line width: 80mm paper prints
//! 48 columns, longer values simply wrap.

use chrono_tz::Tz;
use shared::models::AppSettings;

use crate::error::{StoreError, StoreResult};

// ── Text length limits ──────────────────────────────────────────────

/// Names: stock items, staff, restaurant
pub const MAX_NAME_LEN: usize = 200;

/// Notes, footer text
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, unit, currency, category
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Numeric limits ──────────────────────────────────────────────────

/// Receipt copies printed per order
pub const MAX_PRINT_COPIES: u8 = 5;

pub const MAX_TABLES: usize = 200;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(format!("{field} must not be empty")));
    }
    validate_len(value, field, max_len)
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> StoreResult<()> {
    if let Some(v) = value {
        validate_len(v, field, max_len)?;
    }
    Ok(())
}

fn validate_len(value: &str, field: &str, max_len: usize) -> StoreResult<()> {
    let len = value.chars().count();
    if len > max_len {
        return Err(StoreError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

/// Validate a full settings record.
pub fn validate_settings(settings: &AppSettings) -> StoreResult<()> {
    validate_required_text(&settings.restaurant_name, "restaurant_name", MAX_NAME_LEN)?;
    validate_len(&settings.address, "address", MAX_ADDRESS_LEN)?;
    validate_len(&settings.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_len(&settings.currency, "currency", MAX_SHORT_TEXT_LEN)?;
    validate_len(&settings.receipt_footer, "receipt_footer", MAX_NOTE_LEN)?;
    validate_len(&settings.default_staff_name, "default_staff_name", MAX_NAME_LEN)?;

    if !(1..=MAX_PRINT_COPIES).contains(&settings.print_copies) {
        return Err(StoreError::validation(format!(
            "print_copies must be between 1 and {MAX_PRINT_COPIES}"
        )));
    }
    if !(1..=MAX_TABLES).contains(&settings.number_of_tables) {
        return Err(StoreError::validation(format!(
            "number_of_tables must be between 1 and {MAX_TABLES}"
        )));
    }
    if settings.timezone.parse::<Tz>().is_err() {
        return Err(StoreError::validation(format!(
            "unknown timezone: {}",
            settings.timezone
        )));
    }
    Ok(())
}
