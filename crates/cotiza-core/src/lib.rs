//! # cotiza-core: Pure Quotation Engine
//!
//! Turns raw field measurements for made-to-measure window coverings into
//! validated, priced line items and quote-level totals. Every function is
//! pure: the editor sends a whole draft, the engine returns a whole result.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quote Recalculation                              │
//! │                                                                         │
//! │  QuoteDraft (raw form values, any unit, possibly non-numeric)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  measurement::normalize ──► meters, 4 decimals, junk coerced to 0      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  expansion::expand ───────► day/night → blackout + mesh pieces         │
//! │       │                                                                 │
//! │       ├──────────────────────────────┐                                  │
//! │       ▼                              ▼                                  │
//! │  pricing::compute_totals        validation::validate_quote             │
//! │       │                              │                                  │
//! │       ▼                              │                                  │
//! │  quote::aggregate ──► discount, IVA  │                                  │
//! │       │                              │                                  │
//! │       └──────────────┬───────────────┘                                  │
//! │                      ▼                                                  │
//! │               QuoteResult (totals + validation, reported together)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Drafts, normalized entities, tax rate
//! - [`catalog`] - Product families and the static product catalog
//! - [`measurement`] - Unit normalization and billable area
//! - [`expansion`] - Dual-layer piece expansion
//! - [`validation`] - Mandatory field checks
//! - [`pricing`] - Per line item cost breakdown
//! - [`quote`] - Quote totals and the full pipeline
//! - [`money`] - Integer-cent money for display totals
//! - [`config`] - Engine defaults with environment overrides
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cotiza_core::measurement::compute_area;
//!
//! // 0.72 m wide is billed as 1.00 m wide
//! let area = compute_area(0.72, 2.34);
//! assert_eq!(area.adjusted_width, 1.0);
//! assert_eq!(area.billable_area, 2.34);
//! assert!(area.was_adjusted);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod expansion;
mod lenient;
pub mod measurement;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::ProductFamily;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, ValidationError};
pub use money::Money;
pub use quote::{compute_quote, QuoteResult, QuoteTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// IVA applied when the customer requires an invoice (16%).
///
/// ## Business Reason
/// Single national rate today. Kept as one named constant so a per-region
/// rate can replace it without touching the aggregation code.
pub const TAX_RATE: TaxRate = TaxRate::from_bps(1600);

/// Minimum billable length of each side of a piece, in meters.
///
/// ## Business Reason
/// Fabric, tube and labor cost do not shrink below one meter, so a
/// 0.50 m wide blind is billed as if it were 1.00 m wide. Applied to each
/// dimension independently, never to the resulting area.
pub const MIN_BILLABLE_DIMENSION_M: f64 = 1.0;

/// Decimal places kept for dimensions and areas during calculation.
pub const INTERNAL_PRECISION: u32 = 4;

/// Decimal places shown to the user.
pub const DISPLAY_PRECISION: u32 = 2;
