//! # Line Item Calculator
//!
//! Cost breakdown for one line item: fabric/product by billable area, plus
//! the motorization and installation add-ons.
//!
//! ## Price Resolution Per Piece
//! ```text
//! piece.unitPrice ──(none)──► lineItem.unitPrice ──(none)──► generalUnitPrice
//! ```
//!
//! Everything here is unrounded. Rounding happens once, when quote totals are
//! converted to [`crate::Money`] for display.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{InstallationConfig, LineItem, Measurement, MotorizationConfig};

/// Unrounded cost breakdown of one line item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemTotals {
    /// Physical pieces after expansion.
    pub pieces: usize,
    pub real_area: f64,
    pub billable_area: f64,
    pub products_subtotal: f64,
    pub motorization_subtotal: f64,
    pub installation_subtotal: f64,
    pub line_total: f64,
}

/// Price per billable m² that applies to one piece.
#[inline]
pub fn effective_unit_price(
    measurement: &Measurement,
    item: &LineItem,
    general_unit_price: f64,
) -> f64 {
    measurement
        .unit_price
        .or(item.unit_price)
        .unwrap_or(general_unit_price)
}

/// Motors plus one control. Zero when disabled or pricing is off.
pub fn motorization_subtotal(motorization: &MotorizationConfig, pricing_enabled: bool) -> f64 {
    if !(motorization.enabled && pricing_enabled) {
        return 0.0;
    }
    motorization.motor_unit_price * motorization.motor_count as f64
        + motorization.control_unit_price
}

/// Installation labor for `pieces` physical pieces. Zero when disabled or
/// pricing is off.
pub fn installation_subtotal(
    installation: &InstallationConfig,
    pieces: usize,
    pricing_enabled: bool,
) -> f64 {
    if !(installation.enabled && pricing_enabled) {
        return 0.0;
    }
    installation.pricing.charge(pieces)
}

/// Computes the cost breakdown of a line item.
///
/// Pure: the same item and arguments always give the same totals.
///
/// ## Example
/// ```rust
/// use cotiza_core::pricing::compute_totals;
/// # use cotiza_core::{LineItem, Measurement, ProductFamily, TechnicalAttributes};
/// # let item = LineItem {
/// #     id: None, location: "Hall".into(), quantity: 1,
/// #     product_code: "roller_screen".into(), product_label: "Roller".into(),
/// #     family: ProductFamily::RollerScreen, default_color: None, unit_price: Some(100.0),
/// #     measurements: vec![Measurement {
/// #         width: 0.72, height: 2.34, product_code: "roller_screen".into(), color: None,
/// #         attributes: TechnicalAttributes::default(), subtype: None, source_index: None,
/// #         unit_price: None,
/// #     }],
/// #     motorization: Default::default(), installation: Default::default(), notes: None,
/// # };
///
/// // 0.72 × 2.34 billed as 1.00 × 2.34 at 100 per m²
/// let totals = compute_totals(&item, 0.0, true);
/// assert!((totals.products_subtotal - 234.0).abs() < 1e-9);
/// ```
pub fn compute_totals(
    item: &LineItem,
    general_unit_price: f64,
    pricing_enabled: bool,
) -> LineItemTotals {
    let mut real_area = 0.0;
    let mut billable_area = 0.0;
    let mut products_subtotal = 0.0;

    for measurement in &item.measurements {
        let area = measurement.area();
        real_area += area.real_area;
        billable_area += area.billable_area;
        if pricing_enabled {
            products_subtotal +=
                area.billable_area * effective_unit_price(measurement, item, general_unit_price);
        }
    }

    let pieces = item.piece_count();
    let motorization_subtotal = motorization_subtotal(&item.motorization, pricing_enabled);
    let installation_subtotal = installation_subtotal(&item.installation, pieces, pricing_enabled);

    LineItemTotals {
        pieces,
        real_area,
        billable_area,
        products_subtotal,
        motorization_subtotal,
        installation_subtotal,
        line_total: products_subtotal + motorization_subtotal + installation_subtotal,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductFamily;
    use crate::expansion::expand_for_family;
    use crate::types::{InstallationMode, TechnicalAttributes};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn piece(width: f64, height: f64, unit_price: Option<f64>) -> Measurement {
        Measurement {
            width,
            height,
            product_code: "roller_blackout".to_string(),
            color: None,
            attributes: TechnicalAttributes::default(),
            subtype: None,
            source_index: None,
            unit_price,
        }
    }

    fn line(measurements: Vec<Measurement>, unit_price: Option<f64>) -> LineItem {
        LineItem {
            id: None,
            location: "Living room".to_string(),
            quantity: measurements.len() as u32,
            product_code: "roller_blackout".to_string(),
            product_label: "Roller shade (blackout)".to_string(),
            family: ProductFamily::Blackout,
            default_color: None,
            unit_price,
            measurements,
            motorization: MotorizationConfig::default(),
            installation: InstallationConfig::default(),
            notes: None,
        }
    }

    #[test]
    fn test_narrow_piece_billed_at_minimum_width() {
        let item = line(vec![piece(0.72, 2.34, None)], Some(100.0));
        let totals = compute_totals(&item, 0.0, true);

        assert!(close(totals.real_area, 1.6848));
        assert!(close(totals.billable_area, 2.34));
        assert!(close(totals.products_subtotal, 234.0));
        assert!(close(totals.line_total, 234.0));
    }

    #[test]
    fn test_unit_price_fallback_chain() {
        let item = line(
            vec![piece(1.0, 1.0, Some(300.0)), piece(1.0, 1.0, None)],
            Some(200.0),
        );
        assert!(close(compute_totals(&item, 100.0, true).products_subtotal, 500.0));

        let item = line(vec![piece(1.0, 1.0, None)], None);
        assert!(close(compute_totals(&item, 100.0, true).products_subtotal, 100.0));
    }

    #[test]
    fn test_motorization_subtotal() {
        let mut item = line(vec![piece(1.5, 2.0, None)], Some(0.0));
        item.motorization = MotorizationConfig {
            enabled: true,
            motor_model: Some("Somfy Sonesse 40".to_string()),
            motor_unit_price: 9500.0,
            motor_count: 2,
            control_unit_price: 2500.0,
            ..Default::default()
        };

        let totals = compute_totals(&item, 0.0, true);
        assert!(close(totals.motorization_subtotal, 21500.0));

        item.motorization.enabled = false;
        assert_eq!(compute_totals(&item, 0.0, true).motorization_subtotal, 0.0);
    }

    #[test]
    fn test_installation_base_plus_extra_uses_piece_count() {
        let mut item = line(
            vec![
                piece(1.0, 1.0, None),
                piece(1.0, 1.0, None),
                piece(1.0, 1.0, None),
                piece(1.0, 1.0, None),
            ],
            Some(0.0),
        );
        item.installation = InstallationConfig {
            enabled: true,
            pricing: InstallationMode::BasePlusExtra {
                base_price: 5000.0,
                extra_piece_price: 500.0,
            },
        };

        let totals = compute_totals(&item, 0.0, true);
        assert_eq!(totals.pieces, 4);
        assert!(close(totals.installation_subtotal, 6500.0));
    }

    #[test]
    fn test_per_piece_installation_counts_expanded_layers() {
        let openings = vec![piece(1.2, 1.6, None), piece(0.9, 1.6, None)];
        let pieces = expand_for_family(&openings, ProductFamily::DayNight);
        let mut item = line(pieces, Some(0.0));
        item.family = ProductFamily::DayNight;
        item.quantity = 2;
        item.installation = InstallationConfig {
            enabled: true,
            pricing: InstallationMode::PerPiece { base_price: 350.0 },
        };

        let totals = compute_totals(&item, 0.0, true);
        assert_eq!(totals.pieces, 4);
        assert!(close(totals.installation_subtotal, 1400.0));
    }

    #[test]
    fn test_pricing_disabled_zeroes_money_but_keeps_area() {
        let mut item = line(vec![piece(0.5, 0.8, None)], Some(100.0));
        item.motorization.enabled = true;
        item.motorization.motor_unit_price = 9500.0;
        item.installation = InstallationConfig {
            enabled: true,
            pricing: InstallationMode::Fixed { base_price: 800.0 },
        };

        let totals = compute_totals(&item, 100.0, false);
        assert!(close(totals.billable_area, 1.0));
        assert_eq!(totals.products_subtotal, 0.0);
        assert_eq!(totals.motorization_subtotal, 0.0);
        assert_eq!(totals.installation_subtotal, 0.0);
        assert_eq!(totals.line_total, 0.0);
    }

    #[test]
    fn test_unrecognized_installation_mode_contributes_nothing() {
        let mut item = line(vec![piece(1.0, 1.0, None)], Some(100.0));
        item.installation = InstallationConfig {
            enabled: true,
            pricing: InstallationMode::Unrecognized,
        };
        let totals = compute_totals(&item, 0.0, true);
        assert_eq!(totals.installation_subtotal, 0.0);
        assert!(close(totals.line_total, 100.0));
    }

    #[test]
    fn test_compute_totals_is_idempotent() {
        let mut item = line(
            vec![piece(0.72, 2.34, Some(187.5)), piece(1.35, 0.6, None)],
            Some(150.0),
        );
        item.installation = InstallationConfig {
            enabled: true,
            pricing: InstallationMode::PerPiece { base_price: 275.0 },
        };
        let snapshot = item.clone();

        let first = compute_totals(&item, 90.0, true);
        let second = compute_totals(&item, 90.0, true);
        assert_eq!(first, second);
        assert_eq!(item, snapshot);
    }
}
