//! # Field Validator
//!
//! Checks the mandatory technical attributes of every piece and the basic
//! shape of every line item.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      When Validation Runs                               │
//! │                                                                         │
//! │  Every keystroke ──► validate_quote() ──► inline hints next to fields  │
//! │                          │                                              │
//! │                          │  (pricing keeps running; a half-filled       │
//! │                          │   form still shows a live total)             │
//! │                          ▼                                              │
//! │  Save / export ────► QuoteResult::ensure_valid() blocks until           │
//! │                      `valid == true`                                    │
//! │                                                                         │
//! │  All problems are collected, never just the first one.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{ChannelMode, LayerSubtype, LineItem, Measurement};

/// Result type for single-field checks.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Field Issue
// =============================================================================

/// A validation problem located in the quote.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    /// Line item location label.
    pub location: String,
    /// 1-based physical piece index, when the problem belongs to a piece.
    pub piece: Option<usize>,
    pub subtype: Option<LayerSubtype>,
    pub error: ValidationError,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.piece, self.subtype) {
            (Some(piece), Some(subtype)) => write!(
                f,
                "{} - piece {} ({}): {}",
                self.location,
                piece,
                subtype.as_str(),
                self.error
            ),
            (Some(piece), None) => write!(f, "{} - piece {}: {}", self.location, piece, self.error),
            _ => write!(f, "{}: {}", self.location, self.error),
        }
    }
}

/// Outcome of validating a whole quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

// =============================================================================
// Single-Field Checks
// =============================================================================

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Fails with `Required` when the text is missing or whitespace.
pub fn require_text(field: &str, value: Option<&str>) -> ValidationResult<()> {
    if is_blank(value) {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Fails with `MustBePositive` unless the value is greater than zero.
pub fn require_positive(field: &str, value: f64) -> ValidationResult<()> {
    if !(value > 0.0) {
        return Err(ValidationError::must_be_positive(field));
    }
    Ok(())
}

/// Validates a UUID string format.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;
    Ok(())
}

/// Label used to prefix messages for a line item.
pub fn location_label(item: &LineItem) -> String {
    let location = item.location.trim();
    if location.is_empty() {
        "(no location)".to_string()
    } else {
        location.to_string()
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// Checks one physical piece.
///
/// `piece` is the 1-based index of the piece within its line item.
///
/// ## Rules
/// - width and height > 0
/// - at least one system option
/// - control side, installation type, fixation type, gallery, operation mode
/// - orientation or fall (either one)
/// - motorized pieces need a motor model on the line item
pub fn validate_measurement(
    measurement: &Measurement,
    piece: usize,
    item: &LineItem,
) -> Vec<FieldIssue> {
    let attrs = &measurement.attributes;

    let has_system = attrs.system.iter().any(|s| !s.trim().is_empty());
    let has_orientation =
        !is_blank(attrs.orientation.as_deref()) || !is_blank(attrs.fall.as_deref());

    let checks = [
        require_positive("width", measurement.width),
        require_positive("height", measurement.height),
        if has_system {
            Ok(())
        } else {
            Err(ValidationError::required("system"))
        },
        require_text("control side", attrs.control_side.as_deref()),
        require_text("installation type", attrs.installation_type.as_deref()),
        require_text("fixation type", attrs.fixation_type.as_deref()),
        if has_orientation {
            Ok(())
        } else {
            Err(ValidationError::required("orientation or fall"))
        },
        require_text("gallery", attrs.gallery.as_deref()),
        match attrs.operation_mode {
            Some(_) => Ok(()),
            None => Err(ValidationError::required("operation mode")),
        },
        if attrs.is_motorized() {
            require_text("motor model", item.motorization.motor_model.as_deref())
        } else {
            Ok(())
        },
    ];

    let location = location_label(item);
    checks
        .into_iter()
        .filter_map(Result::err)
        .map(|error| FieldIssue {
            location: location.clone(),
            piece: Some(piece),
            subtype: measurement.subtype,
            error,
        })
        .collect()
}

// =============================================================================
// Line Item
// =============================================================================

/// Checks a line item and every piece in it.
pub fn validate_line_item(item: &LineItem) -> Vec<FieldIssue> {
    let location = location_label(item);
    let line_issue = |error| FieldIssue {
        location: location.clone(),
        piece: None,
        subtype: None,
        error,
    };

    let mut issues = Vec::new();

    if let Some(id) = item.id.as_deref() {
        if let Err(error) = validate_uuid(id) {
            issues.push(line_issue(error));
        }
    }

    if let Err(error) = require_text("location", Some(item.location.as_str())) {
        issues.push(line_issue(error));
    }

    if item.quantity == 0 {
        issues.push(line_issue(ValidationError::must_be_positive("quantity")));
    }

    if item.measurements.is_empty() {
        issues.push(line_issue(ValidationError::required("measurements")));
    } else if item.quantity > 0 && item.quantity as usize != item.opening_count() {
        issues.push(line_issue(ValidationError::QuantityMismatch {
            declared: item.quantity,
            captured: item.opening_count(),
        }));
    }

    let motor = &item.motorization;
    let multi_channel = motor.enabled && motor.channel_mode == ChannelMode::MultiChannel;
    if multi_channel && motor.pieces_per_control == 0 {
        issues.push(line_issue(ValidationError::must_be_positive("pieces per control")));
    }

    for (i, measurement) in item.measurements.iter().enumerate() {
        issues.extend(validate_measurement(measurement, i + 1, item));
    }

    issues
}

// =============================================================================
// Quote
// =============================================================================

/// Validates every line item of a quote.
///
/// ## Example
/// ```rust
/// use cotiza_core::validation::validate_quote;
///
/// let outcome = validate_quote(&[]);
/// assert!(!outcome.valid);
/// assert_eq!(outcome.errors, vec!["quote must contain at least one line item"]);
/// ```
pub fn validate_quote(items: &[LineItem]) -> QuoteValidation {
    let mut errors = Vec::new();

    if items.is_empty() {
        errors.push(ValidationError::NoLineItems.to_string());
    }

    errors.extend(
        items
            .iter()
            .flat_map(validate_line_item)
            .map(|issue| issue.to_string()),
    );

    QuoteValidation {
        valid: errors.is_empty(),
        errors,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
