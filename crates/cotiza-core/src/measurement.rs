//! # Measurement Normalizer
//!
//! Converts raw dimension input into canonical meters and computes the real
//! and billable area of a piece.
//!
//! ## Billable Area Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each side is floored to 1.00 m INDEPENDENTLY:                          │
//! │                                                                         │
//! │    width 0.72 ──► max(0.72, 1.0) = 1.00                                 │
//! │    height 2.34 ─► max(2.34, 1.0) = 2.34                                 │
//! │                                                                         │
//! │    real area     = 0.72 × 2.34 = 1.6848 m²   (display only)             │
//! │    billable area = 1.00 × 2.34 = 2.3400 m²   (used for pricing)         │
//! │                                                                         │
//! │  The floor is never applied to the area itself:                         │
//! │    0.5 × 3.0 = 1.5 m² real, but billed as 1.0 × 3.0 = 3.0 m²            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lenient Input
//! The editor sends whatever is in the text box. Anything that is not a
//! number becomes 0 here; the validator reports it later as "must be
//! greater than zero". A live preview can always render.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DISPLAY_PRECISION, INTERNAL_PRECISION, MIN_BILLABLE_DIMENSION_M};

// =============================================================================
// Dimension Unit
// =============================================================================

/// Unit the dimensions were captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    /// Meters (canonical).
    #[default]
    M,
    /// Centimeters.
    Cm,
}

impl DimensionUnit {
    /// Converts a value in this unit to meters.
    #[inline]
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            DimensionUnit::M => value,
            DimensionUnit::Cm => value / 100.0,
        }
    }

    /// Parses "m" / "cm" (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "m" => Some(DimensionUnit::M),
            "cm" => Some(DimensionUnit::Cm),
            _ => None,
        }
    }
}

// =============================================================================
// Normalization
// =============================================================================

/// Width and height in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Rounds to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Coerces free text into a number. Non-numeric input is 0.
///
/// Accepts a comma as decimal separator when no dot is present
/// (`"0,72"` is 0.72).
///
/// ## Example
/// ```rust
/// use cotiza_core::measurement::coerce_number;
///
/// assert_eq!(coerce_number(" 2.34 "), 2.34);
/// assert_eq!(coerce_number("0,72"), 0.72);
/// assert_eq!(coerce_number("abc"), 0.0);
/// assert_eq!(coerce_number(""), 0.0);
/// ```
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let parsed = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse::<f64>()
    } else {
        trimmed.parse::<f64>()
    };

    parsed.ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Converts one numeric dimension into meters at internal precision.
pub fn normalize_value(value: f64, unit: DimensionUnit) -> f64 {
    let value = if value.is_finite() { value } else { 0.0 };
    round_to(unit.to_meters(value), INTERNAL_PRECISION)
}

/// Converts raw width/height text in the given unit into meters.
///
/// ## Example
/// ```rust
/// use cotiza_core::measurement::{normalize, DimensionUnit};
///
/// let dims = normalize("72", "234", DimensionUnit::Cm);
/// assert_eq!(dims.width, 0.72);
/// assert_eq!(dims.height, 2.34);
///
/// let junk = normalize("wide", "", DimensionUnit::M);
/// assert_eq!(junk.width, 0.0);
/// assert_eq!(junk.height, 0.0);
/// ```
pub fn normalize(raw_width: &str, raw_height: &str, unit: DimensionUnit) -> Dimensions {
    Dimensions {
        width: normalize_value(coerce_number(raw_width), unit),
        height: normalize_value(coerce_number(raw_height), unit),
    }
}

// =============================================================================
// Area
// =============================================================================

/// Real vs. billable area of one piece.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AreaBreakdown {
    /// Geometric area from the captured dimensions.
    pub real_area: f64,
    /// Area after the per-dimension minimum; this is what gets priced.
    pub billable_area: f64,
    pub adjusted_width: f64,
    pub adjusted_height: f64,
    /// True when at least one side was below the minimum.
    pub was_adjusted: bool,
}

impl AreaBreakdown {
    /// Same breakdown rounded to display precision.
    pub fn for_display(&self) -> AreaBreakdown {
        AreaBreakdown {
            real_area: round_to(self.real_area, DISPLAY_PRECISION),
            billable_area: round_to(self.billable_area, DISPLAY_PRECISION),
            adjusted_width: round_to(self.adjusted_width, DISPLAY_PRECISION),
            adjusted_height: round_to(self.adjusted_height, DISPLAY_PRECISION),
            was_adjusted: self.was_adjusted,
        }
    }
}

/// Computes real and billable area for a piece measured in meters.
///
/// `billable_area >= real_area` always holds, with equality exactly when both
/// sides are at least [`MIN_BILLABLE_DIMENSION_M`].
pub fn compute_area(width: f64, height: f64) -> AreaBreakdown {
    let width = normalize_value(width, DimensionUnit::M);
    let height = normalize_value(height, DimensionUnit::M);

    let adjusted_width = width.max(MIN_BILLABLE_DIMENSION_M);
    let adjusted_height = height.max(MIN_BILLABLE_DIMENSION_M);

    AreaBreakdown {
        real_area: round_to(width * height, INTERNAL_PRECISION),
        billable_area: round_to(adjusted_width * adjusted_height, INTERNAL_PRECISION),
        adjusted_width,
        adjusted_height,
        was_adjusted: adjusted_width != width || adjusted_height != height,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
