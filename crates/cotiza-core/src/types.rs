//! # Domain Types
//!
//! Core domain types used throughout cotiza.
//!
//! ## Draft vs. Normalized
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  FROM THE EDITOR (raw)              AFTER THE PIPELINE (normalized)     │
//! │  ─────────────────────              ───────────────────────────────     │
//! │  QuoteDraft                                                             │
//! │   └─ LineItemDraft ───────────────► LineItem                            │
//! │       │  quantity (openings)          quantity (openings, unchanged)    │
//! │       │  unit: m | cm                 family: ProductFamily             │
//! │       └─ MeasurementDraft ────────► Measurement (meters, 4 decimals)    │
//! │           width "0,72"                width 0.72                        │
//! │                                       subtype: blackout | mesh          │
//! │                                       sourceIndex: 1-based opening      │
//! │                                                                         │
//! │  Shared by both: TechnicalAttributes, MotorizationConfig,               │
//! │                  InstallationConfig, DiscountConfig                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every numeric field on a draft deserializes leniently: numbers, numeric
//! strings and junk are all accepted, junk becoming 0.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::ProductFamily;
use crate::error::EngineResult;
use crate::lenient::{
    lenient_choice, lenient_choice_or_default, lenient_count, lenient_date, lenient_flag,
    lenient_number, lenient_optional_count, lenient_optional_flag, lenient_optional_number,
    lenient_optional_text, lenient_string_list, lenient_text, null_as_default,
};
use crate::measurement::{compute_area, AreaBreakdown, DimensionUnit};

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1600 bps = 16%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Tax on an unrounded amount, itself unrounded.
    #[inline]
    pub fn apply(&self, amount: f64) -> f64 {
        amount * self.0 as f64 / 10_000.0
    }
}

// =============================================================================
// Piece Attributes
// =============================================================================

/// Which layer of a dual-layer system a piece is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LayerSubtype {
    Blackout,
    Mesh,
}

impl LayerSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerSubtype::Blackout => "blackout",
            LayerSubtype::Mesh => "mesh",
        }
    }
}

/// How a piece is operated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    Manual,
    Motorized,
}

/// Technical attributes captured per piece in the field.
///
/// All free-text fields are optional on input; the validator decides which
/// ones are mandatory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct TechnicalAttributes {
    /// Mechanism options (e.g. "chain", "spring", "cassette"). At least one.
    #[serde(deserialize_with = "lenient_string_list")]
    pub system: Vec<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub control_side: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub installation_type: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub fixation_type: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub orientation: Option<String>,
    /// Fabric fall, interchangeable with orientation for validation.
    #[serde(deserialize_with = "lenient_optional_text")]
    pub fall: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub gallery: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub base_table_size: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub fabric_brand: Option<String>,
    /// Blank or unknown values read as "not chosen yet".
    #[serde(deserialize_with = "lenient_choice")]
    pub operation_mode: Option<OperationMode>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub detail: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub overlap: Option<String>,
}

impl TechnicalAttributes {
    #[inline]
    pub fn is_motorized(&self) -> bool {
        self.operation_mode == Some(OperationMode::Motorized)
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// One piece as typed into the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct MeasurementDraft {
    #[serde(deserialize_with = "lenient_number")]
    #[ts(type = "number | string")]
    pub width: f64,

    #[serde(deserialize_with = "lenient_number")]
    #[ts(type = "number | string")]
    pub height: f64,

    /// Overrides the line item's unit for this piece.
    #[serde(deserialize_with = "lenient_choice")]
    pub unit: Option<DimensionUnit>,

    /// Falls back to the line item's default color.
    #[serde(deserialize_with = "lenient_optional_text")]
    pub color: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub attributes: TechnicalAttributes,

    /// Per-piece price override (per billable m²). Blank means no override.
    #[serde(deserialize_with = "lenient_optional_number")]
    #[ts(type = "number | string | null")]
    pub unit_price: Option<f64>,
}

impl MeasurementDraft {
    pub fn new(width: f64, height: f64) -> Self {
        MeasurementDraft {
            width,
            height,
            ..Default::default()
        }
    }
}

/// One physical piece, in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub width: f64,
    pub height: f64,
    pub product_code: String,
    pub color: Option<String>,
    pub attributes: TechnicalAttributes,
    /// Set only by dual-layer expansion.
    pub subtype: Option<LayerSubtype>,
    /// 1-based index of the captured opening this piece came from. Set only
    /// by dual-layer expansion.
    pub source_index: Option<usize>,
    pub unit_price: Option<f64>,
}

impl Measurement {
    /// Real and billable area of this piece.
    #[inline]
    pub fn area(&self) -> AreaBreakdown {
        compute_area(self.width, self.height)
    }
}

// =============================================================================
// Motorization
// =============================================================================

/// How motors are paired with remote controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelMode {
    /// One control per motor.
    #[default]
    Individual,
    /// One control drives several pieces on separate channels.
    MultiChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct MotorizationConfig {
    #[serde(deserialize_with = "lenient_flag")]
    pub enabled: bool,

    #[serde(deserialize_with = "lenient_optional_text")]
    pub motor_model: Option<String>,

    #[serde(deserialize_with = "lenient_number")]
    #[ts(type = "number | string")]
    pub motor_unit_price: f64,

    #[serde(deserialize_with = "lenient_count")]
    #[ts(type = "number | string")]
    pub motor_count: u32,

    #[serde(deserialize_with = "lenient_optional_text")]
    pub control_model: Option<String>,

    #[serde(deserialize_with = "lenient_number")]
    #[ts(type = "number | string")]
    pub control_unit_price: f64,

    #[serde(deserialize_with = "lenient_choice_or_default")]
    pub channel_mode: ChannelMode,

    #[serde(deserialize_with = "lenient_count")]
    #[ts(type = "number | string")]
    pub pieces_per_control: u32,
}

impl Default for MotorizationConfig {
    fn default() -> Self {
        MotorizationConfig {
            enabled: false,
            motor_model: None,
            motor_unit_price: 0.0,
            motor_count: 1,
            control_model: None,
            control_unit_price: 0.0,
            channel_mode: ChannelMode::Individual,
            pieces_per_control: 1,
        }
    }
}

// =============================================================================
// Installation
// =============================================================================

/// How installation labor is billed for a line item.
///
/// ```text
/// fixed            basePrice                                  (whole line)
/// per-piece        pieces × basePrice
/// base-plus-extra  basePrice + (pieces − 1) × extraPiecePrice (first piece at base)
/// ```
///
/// `pieces` is always the physical count after dual-layer expansion.
/// A missing or unknown `mode` is `Unrecognized`, which bills 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum InstallationMode {
    Fixed {
        #[serde(rename = "basePrice")]
        base_price: f64,
    },
    PerPiece {
        #[serde(rename = "basePrice")]
        base_price: f64,
    },
    BasePlusExtra {
        #[serde(rename = "basePrice")]
        base_price: f64,
        #[serde(rename = "extraPiecePrice")]
        extra_piece_price: f64,
    },
    Unrecognized,
}

impl InstallationMode {
    /// Resolves the mode keyword sent by the editor. Prices that the chosen
    /// mode does not use are dropped.
    pub fn from_parts(mode: Option<&str>, base_price: f64, extra_piece_price: f64) -> Self {
        let mode = mode.map(|m| m.trim().to_ascii_lowercase());
        match mode.as_deref() {
            Some("fixed") => InstallationMode::Fixed { base_price },
            Some("per-piece") => InstallationMode::PerPiece { base_price },
            Some("base-plus-extra") => InstallationMode::BasePlusExtra {
                base_price,
                extra_piece_price,
            },
            _ => InstallationMode::Unrecognized,
        }
    }

    /// Installation charge for a number of physical pieces.
    pub fn charge(&self, pieces: usize) -> f64 {
        match *self {
            InstallationMode::Fixed { base_price } => base_price,
            InstallationMode::PerPiece { base_price } => pieces as f64 * base_price,
            InstallationMode::BasePlusExtra {
                base_price,
                extra_piece_price,
            } => base_price + pieces.saturating_sub(1) as f64 * extra_piece_price,
            InstallationMode::Unrecognized => {
                warn!("unrecognized installation billing mode, billing 0");
                0.0
            }
        }
    }
}

impl Default for InstallationMode {
    fn default() -> Self {
        InstallationMode::Fixed { base_price: 0.0 }
    }
}

/// Installation add-on of a line item.
///
/// On the wire it is one flat record:
/// `{ "enabled": true, "mode": "per-piece", "basePrice": 300 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct InstallationConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub pricing: InstallationMode,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InstallationWire {
    #[serde(deserialize_with = "lenient_flag")]
    enabled: bool,
    #[serde(deserialize_with = "lenient_optional_text")]
    mode: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    base_price: f64,
    #[serde(deserialize_with = "lenient_number")]
    extra_piece_price: f64,
}

impl<'de> Deserialize<'de> for InstallationConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = InstallationWire::deserialize(deserializer)?;
        Ok(InstallationConfig {
            enabled: wire.enabled,
            pricing: InstallationMode::from_parts(
                wire.mode.as_deref(),
                wire.base_price,
                wire.extra_piece_price,
            ),
        })
    }
}

// =============================================================================
// Discount
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// `value` is a percentage of the subtotal.
    #[default]
    Percentage,
    /// `value` is an amount in currency.
    Fixed,
    /// Anything else the editor sent. Discounts 0.
    #[serde(other)]
    Unrecognized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscountConfig {
    #[serde(deserialize_with = "lenient_flag")]
    pub enabled: bool,

    #[serde(rename = "type", deserialize_with = "lenient_choice_or_default")]
    pub kind: DiscountKind,

    #[serde(deserialize_with = "lenient_number")]
    #[ts(type = "number | string")]
    pub value: f64,
}

// =============================================================================
// Line Item
// =============================================================================

/// One line item (partida) as typed into the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct LineItemDraft {
    /// UUID v4 assigned when the row was created.
    #[serde(deserialize_with = "lenient_optional_text")]
    pub id: Option<String>,

    /// Where the pieces go ("Master bedroom", "Living room west").
    #[serde(deserialize_with = "lenient_text")]
    pub location: String,

    /// Number of openings ordered (before dual-layer expansion).
    #[serde(deserialize_with = "lenient_count")]
    #[ts(type = "number | string")]
    pub quantity: u32,

    #[serde(deserialize_with = "lenient_text")]
    pub product_code: String,

    /// Shown on the quote. Defaults to the catalog label.
    #[serde(deserialize_with = "lenient_optional_text")]
    pub product_label: Option<String>,

    #[serde(deserialize_with = "lenient_optional_text")]
    pub default_color: Option<String>,

    /// Price per billable m² for pieces without an override.
    #[serde(deserialize_with = "lenient_optional_number")]
    #[ts(type = "number | string | null")]
    pub default_unit_price: Option<f64>,

    /// Unit for this line's measurements. Falls back to the quote's unit.
    #[serde(deserialize_with = "lenient_choice")]
    pub unit: Option<DimensionUnit>,

    #[serde(deserialize_with = "null_as_default")]
    pub measurements: Vec<MeasurementDraft>,

    #[serde(deserialize_with = "null_as_default")]
    pub motorization: MotorizationConfig,

    #[serde(deserialize_with = "null_as_default")]
    pub installation: InstallationConfig,

    #[serde(deserialize_with = "lenient_optional_text")]
    pub notes: Option<String>,
}

impl LineItemDraft {
    /// Starts a new empty row with a fresh id.
    pub fn new(location: impl Into<String>, product_code: impl Into<String>) -> Self {
        LineItemDraft {
            id: Some(Uuid::new_v4().to_string()),
            location: location.into(),
            product_code: product_code.into(),
            ..Default::default()
        }
    }

    /// Adds a captured opening and keeps `quantity` in step.
    pub fn push_measurement(&mut self, measurement: MeasurementDraft) {
        self.measurements.push(measurement);
        self.quantity = self.measurements.len() as u32;
    }
}

/// A normalized, expanded line item ready for validation and pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Option<String>,
    pub location: String,
    /// Openings ordered, as declared on the draft.
    pub quantity: u32,
    pub product_code: String,
    pub product_label: String,
    pub family: ProductFamily,
    pub default_color: Option<String>,
    pub unit_price: Option<f64>,
    /// Physical pieces, after expansion.
    pub measurements: Vec<Measurement>,
    pub motorization: MotorizationConfig,
    pub installation: InstallationConfig,
    pub notes: Option<String>,
}

impl LineItem {
    /// Physical pieces to build and install.
    #[inline]
    pub fn piece_count(&self) -> usize {
        self.measurements.len()
    }

    /// Captured openings (each dual-layer opening counts once).
    pub fn opening_count(&self) -> usize {
        self.measurements
            .iter()
            .filter(|m| m.subtype != Some(LayerSubtype::Mesh))
            .count()
    }
}

// =============================================================================
// Quote
// =============================================================================

/// The whole editing session's form, sent on every edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteDraft {
    #[serde(deserialize_with = "null_as_default")]
    pub line_items: Vec<LineItemDraft>,

    #[serde(deserialize_with = "null_as_default")]
    pub discount: DiscountConfig,

    /// Customer requires a tax invoice (adds IVA).
    #[serde(deserialize_with = "lenient_flag")]
    pub invoice_required: bool,

    /// Overrides [`crate::EngineConfig::pricing_enabled`].
    #[serde(deserialize_with = "lenient_optional_flag")]
    pub pricing_enabled: Option<bool>,

    /// Price per billable m² used when neither piece nor line has one.
    #[serde(deserialize_with = "lenient_optional_number")]
    #[ts(type = "number | string | null")]
    pub general_unit_price: Option<f64>,

    #[serde(deserialize_with = "lenient_choice")]
    pub unit: Option<DimensionUnit>,

    #[serde(deserialize_with = "lenient_date")]
    #[ts(as = "Option<String>")]
    pub issued_on: Option<NaiveDate>,

    #[serde(deserialize_with = "lenient_optional_count")]
    #[ts(type = "number | string | null")]
    pub validity_days: Option<u32>,
}

impl QuoteDraft {
    /// Parses the editor's JSON payload.
    ///
    /// Blank, null and mistyped form values never fail to parse; only a
    /// structurally wrong payload returns
    /// [`crate::EngineError::MalformedPayload`].
    pub fn from_json(raw: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
