//! Input validation for order placement
//!
//! Placement input is validated before it ever reaches the order store, so
//! a malformed submission can never create a persisted order that violates
//! the model invariants (in particular: no empty item list, no zero
//! quantity, no negative price).

use crate::core::order::NewOrder;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a placement submission.
///
/// Returns every issue at once so the form can show them all, rather than
/// failing on the first.
pub fn validate_new_order(input: &NewOrder) -> Result<(), Vec<FieldIssue>> {
    let mut issues = Vec::new();

    if input.customer.name.trim().is_empty() {
        issues.push(FieldIssue::new("customer.name", "name is required"));
    }

    if input.customer.phone.trim().is_empty() {
        issues.push(FieldIssue::new("customer.phone", "phone is required"));
    } else if !is_valid_phone(&input.customer.phone) {
        issues.push(FieldIssue::new(
            "customer.phone",
            "not a recognizable phone number",
        ));
    }

    if let Some(email) = &input.customer.email {
        if !is_valid_email(email) {
            issues.push(FieldIssue::new("customer.email", "not a valid email"));
        }
    }

    if input.items.is_empty() {
        issues.push(FieldIssue::new("items", "an order needs at least one item"));
    }

    for (index, item) in input.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            issues.push(FieldIssue::new(
                format!("items[{}].name", index),
                "item name is required",
            ));
        }
        if item.quantity == 0 {
            issues.push(FieldIssue::new(
                format!("items[{}].quantity", index),
                "quantity must be at least 1",
            ));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            issues.push(FieldIssue::new(
                format!("items[{}].unit_price", index),
                "unit price must be zero or positive",
            ));
        }
    }

    if issues.is_empty() { Ok(()) } else { Err(issues) }
}

/// Phone check loose enough for the formats customers actually type
/// (`555-1234`, `+33 6 12 34 56 78`, `(555) 123-4567`).
pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^\+?[0-9][0-9\-\s().]{5,18}$").unwrap());
    regex.is_match(phone.trim())
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());
    regex.is_match(email.trim())
}
