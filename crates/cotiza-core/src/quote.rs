//! # Quote Aggregator
//!
//! Rolls line item totals up into the figures printed at the bottom of a
//! quote, and runs the whole recalculation pipeline for a draft.
//!
//! ## Totals Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Σ line totals                            subtotal          10,000.00   │
//! │  − discount (10% or fixed, ≤ subtotal)    discount          −1,000.00   │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │                                           after discount     9,000.00   │
//! │  + IVA 16% (only if invoice required)     tax                1,440.00   │
//! │  ═════════════════════════════════════════════════════════════════════  │
//! │                                           grand total       10,440.00   │
//! │                                                                         │
//! │  Computed unrounded (TotalsBreakdown), converted to cents once         │
//! │  (QuoteTotals).                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};
use ts_rs::TS;

use crate::catalog::{self, ProductFamily};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::expansion::expand_for_family;
use crate::measurement::{normalize_value, round_to, DimensionUnit};
use crate::money::Money;
use crate::pricing::{compute_totals, LineItemTotals};
use crate::types::{
    DiscountConfig, DiscountKind, LineItem, LineItemDraft, Measurement, QuoteDraft,
};
use crate::validation::{validate_quote, QuoteValidation};
use crate::{DISPLAY_PRECISION, TAX_RATE};

// =============================================================================
// Totals
// =============================================================================

/// Unrounded quote figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TotalsBreakdown {
    pub billable_area: f64,
    pub products_subtotal: f64,
    pub motorization_subtotal: f64,
    pub installation_subtotal: f64,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub subtotal_after_discount: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
}

/// Quote figures for display: money in cents, area at 2 decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteTotals {
    pub billable_area: f64,
    pub products_subtotal: Money,
    pub motorization_subtotal: Money,
    pub installation_subtotal: Money,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub subtotal_after_discount: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
}

impl From<&TotalsBreakdown> for QuoteTotals {
    fn from(raw: &TotalsBreakdown) -> Self {
        QuoteTotals {
            billable_area: round_to(raw.billable_area, DISPLAY_PRECISION),
            products_subtotal: Money::from_amount(raw.products_subtotal),
            motorization_subtotal: Money::from_amount(raw.motorization_subtotal),
            installation_subtotal: Money::from_amount(raw.installation_subtotal),
            subtotal: Money::from_amount(raw.subtotal),
            discount_amount: Money::from_amount(raw.discount_amount),
            subtotal_after_discount: Money::from_amount(raw.subtotal_after_discount),
            tax_amount: Money::from_amount(raw.tax_amount),
            grand_total: Money::from_amount(raw.grand_total),
        }
    }
}

// =============================================================================
// Discount
// =============================================================================

impl DiscountConfig {
    /// Discount taken off `subtotal`, clamped to `[0, subtotal]`.
    ///
    /// A discount larger than the subtotal would make the quote negative;
    /// it is capped so the grand total bottoms out at zero.
    pub fn amount(&self, subtotal: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }

        let requested = match self.kind {
            DiscountKind::Percentage => subtotal * self.value / 100.0,
            DiscountKind::Fixed => self.value,
            DiscountKind::Unrecognized => {
                warn!("unrecognized discount type, discounting 0");
                return 0.0;
            }
        };

        let ceiling = subtotal.max(0.0);
        let clamped = requested.clamp(0.0, ceiling);
        if clamped != requested {
            warn!(requested, applied = clamped, "discount clamped to subtotal");
        }
        clamped
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Computes the unrounded quote figures.
pub fn breakdown(
    line_totals: &[LineItemTotals],
    discount: &DiscountConfig,
    invoice_required: bool,
) -> TotalsBreakdown {
    let mut raw = TotalsBreakdown::default();
    for totals in line_totals {
        raw.billable_area += totals.billable_area;
        raw.products_subtotal += totals.products_subtotal;
        raw.motorization_subtotal += totals.motorization_subtotal;
        raw.installation_subtotal += totals.installation_subtotal;
        raw.subtotal += totals.line_total;
    }

    raw.discount_amount = discount.amount(raw.subtotal);
    raw.subtotal_after_discount = raw.subtotal - raw.discount_amount;
    raw.tax_amount = if invoice_required {
        TAX_RATE.apply(raw.subtotal_after_discount)
    } else {
        0.0
    };
    raw.grand_total = raw.subtotal_after_discount + raw.tax_amount;
    raw
}

/// Quote totals rounded for display.
///
/// ## Example
/// ```rust
/// use cotiza_core::pricing::LineItemTotals;
/// use cotiza_core::quote::aggregate;
/// use cotiza_core::{DiscountConfig, DiscountKind, Money};
///
/// let lines = [LineItemTotals { line_total: 10_000.0, ..Default::default() }];
/// let discount = DiscountConfig { enabled: true, kind: DiscountKind::Percentage, value: 10.0 };
///
/// let totals = aggregate(&lines, &discount, true);
/// assert_eq!(totals.discount_amount, Money::from_cents(100_000));
/// assert_eq!(totals.tax_amount, Money::from_cents(144_000));
/// assert_eq!(totals.grand_total, Money::from_cents(1_044_000));
/// ```
pub fn aggregate(
    line_totals: &[LineItemTotals],
    discount: &DiscountConfig,
    invoice_required: bool,
) -> QuoteTotals {
    QuoteTotals::from(&breakdown(line_totals, discount, invoice_required))
}

// =============================================================================
// Pipeline
// =============================================================================

/// A line item with its computed totals, as handed back to the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    #[serde(flatten)]
    pub item: LineItem,
    pub computed: LineItemTotals,
}

/// Everything the editor shows after an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub line_items: Vec<PricedLineItem>,
    pub totals: QuoteTotals,
    pub unrounded: TotalsBreakdown,
    pub validation: QuoteValidation,
    #[ts(as = "Option<String>")]
    pub issued_on: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,
}

impl QuoteResult {
    /// Gate for save/export: fails with every outstanding message.
    pub fn ensure_valid(&self) -> EngineResult<()> {
        if self.validation.valid {
            return Ok(());
        }
        Err(EngineError::InvalidQuote {
            errors: self.validation.errors.clone(),
        })
    }

    /// Serializes the result for the persistence/export collaborator.
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }
}

/// Normalizes and expands one draft line item.
///
/// Unit resolution: measurement, then line item, then `fallback_unit`.
pub fn prepare_line_item(draft: &LineItemDraft, fallback_unit: DimensionUnit) -> LineItem {
    let family = ProductFamily::resolve(&draft.product_code);
    let line_unit = draft.unit.unwrap_or(fallback_unit);

    let openings: Vec<Measurement> = draft
        .measurements
        .iter()
        .map(|m| {
            let unit = m.unit.unwrap_or(line_unit);
            Measurement {
                width: normalize_value(m.width, unit),
                height: normalize_value(m.height, unit),
                product_code: draft.product_code.clone(),
                color: m.color.clone().or_else(|| draft.default_color.clone()),
                attributes: m.attributes.clone(),
                subtype: None,
                source_index: None,
                unit_price: m.unit_price,
            }
        })
        .collect();

    let product_label = draft
        .product_label
        .clone()
        .filter(|label| !label.trim().is_empty())
        .or_else(|| catalog::lookup(&draft.product_code).map(|entry| entry.label.to_string()))
        .unwrap_or_else(|| draft.product_code.clone());

    LineItem {
        id: draft.id.clone(),
        location: draft.location.clone(),
        quantity: draft.quantity,
        product_code: draft.product_code.clone(),
        product_label,
        family,
        default_color: draft.default_color.clone(),
        unit_price: draft.default_unit_price,
        measurements: expand_for_family(&openings, family),
        motorization: draft.motorization.clone(),
        installation: draft.installation,
        notes: draft.notes.clone(),
    }
}

/// Runs normalize → expand → validate → price → aggregate for a draft.
///
/// Validation never stops pricing: a draft with missing fields still gets a
/// live total, and `validation.valid` tells the caller whether it may save.
pub fn compute_quote(draft: &QuoteDraft, config: &EngineConfig) -> QuoteResult {
    let span = debug_span!("compute_quote", line_items = draft.line_items.len());
    let _guard = span.enter();

    let pricing_enabled = draft.pricing_enabled.unwrap_or(config.pricing_enabled);
    let general_unit_price = draft.general_unit_price.unwrap_or(config.general_unit_price);
    let unit = draft.unit.unwrap_or(config.dimension_unit);

    let items: Vec<LineItem> = draft
        .line_items
        .iter()
        .map(|line| prepare_line_item(line, unit))
        .collect();

    let validation = validate_quote(&items);

    let line_items: Vec<PricedLineItem> = items
        .into_iter()
        .map(|item| {
            let computed = compute_totals(&item, general_unit_price, pricing_enabled);
            trace!(
                location = %item.location,
                pieces = computed.pieces,
                line_total = computed.line_total,
                "priced line item"
            );
            PricedLineItem { item, computed }
        })
        .collect();

    let line_totals: Vec<LineItemTotals> = line_items.iter().map(|l| l.computed).collect();
    let unrounded = breakdown(&line_totals, &draft.discount, draft.invoice_required);
    let totals = QuoteTotals::from(&unrounded);

    let validity_days = draft.validity_days.unwrap_or(config.validity_days);
    let valid_until = draft
        .issued_on
        .and_then(|issued| issued.checked_add_signed(Duration::days(i64::from(validity_days))));

    debug!(
        grand_total = %totals.grand_total,
        valid = validation.valid,
        errors = validation.errors.len(),
        "quote recomputed"
    );

    QuoteResult {
        line_items,
        totals,
        unrounded,
        validation,
        issued_on: draft.issued_on,
        valid_until,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LayerSubtype, MeasurementDraft};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn line_total(amount: f64) -> LineItemTotals {
        LineItemTotals {
            line_total: amount,
            products_subtotal: amount,
            ..Default::default()
        }
    }

    fn percentage(value: f64) -> DiscountConfig {
        DiscountConfig {
            enabled: true,
            kind: DiscountKind::Percentage,
            value,
        }
    }

    fn fixed(value: f64) -> DiscountConfig {
        DiscountConfig {
            enabled: true,
            kind: DiscountKind::Fixed,
            value,
        }
    }

    #[test]
    fn test_percentage_discount_with_invoice() {
        let raw = breakdown(&[line_total(6000.0), line_total(4000.0)], &percentage(10.0), true);
        assert!(close(raw.subtotal, 10_000.0));
        assert!(close(raw.discount_amount, 1000.0));
        assert!(close(raw.subtotal_after_discount, 9000.0));
        assert!(close(raw.tax_amount, 1440.0));
        assert!(close(raw.grand_total, 10_440.0));
    }

    #[test]
    fn test_no_invoice_no_tax() {
        let raw = breakdown(&[line_total(10_000.0)], &percentage(10.0), false);
        assert_eq!(raw.tax_amount, 0.0);
        assert!(close(raw.grand_total, 9000.0));
    }

    #[test]
    fn test_disabled_discount_ignores_value() {
        let mut discount = fixed(500.0);
        discount.enabled = false;
        let raw = breakdown(&[line_total(2000.0)], &discount, false);
        assert_eq!(raw.discount_amount, 0.0);
    }

    #[test]
    fn test_fixed_discount_is_clamped_to_subtotal() {
        let raw = breakdown(&[line_total(800.0)], &fixed(1000.0), true);
        assert!(close(raw.discount_amount, 800.0));
        assert_eq!(raw.subtotal_after_discount, 0.0);
        assert_eq!(raw.grand_total, 0.0);

        let raw = breakdown(&[line_total(800.0)], &fixed(-50.0), false);
        assert_eq!(raw.discount_amount, 0.0);
    }

    #[test]
    fn test_unrecognized_discount_type_discounts_nothing() {
        let discount = DiscountConfig {
            enabled: true,
            kind: DiscountKind::Unrecognized,
            value: 50.0,
        };
        let raw = breakdown(&[line_total(1000.0)], &discount, false);
        assert_eq!(raw.discount_amount, 0.0);
        assert!(close(raw.grand_total, 1000.0));
    }

    #[test]
    fn test_grand_total_identity() {
        let lines = [line_total(1234.56), line_total(789.01), line_total(0.333)];
        for discount in [percentage(7.5), fixed(120.0), DiscountConfig::default()] {
            for invoice in [true, false] {
                let raw = breakdown(&lines, &discount, invoice);
                let factor = if invoice { 1.16 } else { 1.0 };
                let expected = (raw.subtotal - raw.discount_amount) * factor;
                assert!(close(raw.grand_total, expected));
            }
        }
    }

    #[test]
    fn test_display_rounding_happens_once() {
        // three lines of 0.333… would lose a cent if rounded per line
        let lines = [line_total(1.0 / 3.0), line_total(1.0 / 3.0), line_total(1.0 / 3.0)];
        let totals = aggregate(&lines, &DiscountConfig::default(), false);
        assert_eq!(totals.subtotal, Money::from_cents(100));
    }

    #[test]
    fn test_prepare_line_item_normalizes_and_expands() {
        let mut draft = LineItemDraft::new("Bedroom", "day_night");
        draft.default_color = Some("Sand".to_string());
        draft.unit = Some(DimensionUnit::Cm);
        draft.push_measurement(MeasurementDraft::new(120.0, 160.0));
        draft.push_measurement(MeasurementDraft {
            unit: Some(DimensionUnit::M),
            color: Some("Graphite".to_string()),
            ..MeasurementDraft::new(0.9, 1.6)
        });

        let item = prepare_line_item(&draft, DimensionUnit::M);

        assert_eq!(item.family, ProductFamily::DayNight);
        assert_eq!(item.product_label, "Day/Night system");
        assert_eq!(item.quantity, 2);
        assert_eq!(item.piece_count(), 4);
        assert_eq!(item.opening_count(), 2);

        assert!(close(item.measurements[0].width, 1.2));
        assert_eq!(item.measurements[0].color.as_deref(), Some("Sand"));
        assert_eq!(item.measurements[0].subtype, Some(LayerSubtype::Blackout));
        assert_eq!(item.measurements[1].subtype, Some(LayerSubtype::Mesh));
        assert!(close(item.measurements[3].width, 0.9));
        assert_eq!(item.measurements[3].color.as_deref(), Some("Graphite"));
        assert_eq!(item.measurements[3].source_index, Some(2));
    }

    #[test]
    fn test_unknown_product_keeps_its_code_as_label() {
        let mut draft = LineItemDraft::new("Hall", "special_order_77");
        draft.push_measurement(MeasurementDraft::new(1.0, 1.0));
        let item = prepare_line_item(&draft, DimensionUnit::M);
        assert_eq!(item.family, ProductFamily::Custom);
        assert_eq!(item.product_label, "special_order_77");
        assert_eq!(item.piece_count(), 1);
    }

    #[test]
    fn test_empty_draft_prices_to_zero_and_is_invalid() {
        let result = compute_quote(&QuoteDraft::default(), &EngineConfig::default());
        assert_eq!(result.totals, QuoteTotals::default());
        assert!(!result.validation.valid);
        assert!(matches!(
            result.ensure_valid(),
            Err(EngineError::InvalidQuote { .. })
        ));
    }

    #[test]
    fn test_valid_until_uses_validity_days() {
        let draft = QuoteDraft {
            issued_on: NaiveDate::from_ymd_opt(2026, 3, 20),
            validity_days: Some(15),
            ..Default::default()
        };
        let result = compute_quote(&draft, &EngineConfig::default());
        assert_eq!(result.valid_until, NaiveDate::from_ymd_opt(2026, 4, 4));

        let undated = compute_quote(&QuoteDraft::default(), &EngineConfig::default());
        assert_eq!(undated.valid_until, None);
    }
}
