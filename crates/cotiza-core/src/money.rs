//! # Money Module
//!
//! Provides the `Money` type used for the totals the user sees.
//!
//! ## Where Rounding Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices × billable areas produce fractions of a cent:                   │
//! │    2.3456 m² × $187.50 = $439.80                                        │
//! │                                                                         │
//! │  Rounding every stage compounds the error across                        │
//! │    line items → subtotal → discount → tax → grand total                 │
//! │                                                                         │
//! │  OUR SOLUTION: compute the whole chain unrounded (f64), then convert    │
//! │  each displayed figure ONCE into integer cents with Money::from_amount  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cotiza_core::money::Money;
//!
//! let total = Money::from_amount(10440.0);
//! assert_eq!(total.cents(), 1_044_000);
//! assert_eq!(total.to_string(), "$10440.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// Signed, so a clamped-to-zero discount or a credit line can still be
/// represented without a separate type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an unrounded currency amount into cents, rounding half away
    /// from zero. Non-finite amounts become zero; amounts beyond the `i64`
    /// cent range are clamped to it.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(234.000000001).cents(), 23400);
    /// assert_eq!(Money::from_amount(0.005).cents(), 1);
    /// assert_eq!(Money::from_amount(f64::NAN).cents(), 0);
    /// assert_eq!(Money::from_amount(1e300).cents(), i64::MAX);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // 1e-9 nudge absorbs binary representation error (0.005 is stored as 0.00499…)
        let scaled = amount * 100.0;
        let rounded = (scaled + scaled.signum() * 1e-9).round();

        // i64::MAX as f64 rounds up to 2^63, so both bounds are exclusive
        if rounded >= i64::MAX as f64 || rounded <= i64::MIN as f64 {
            warn!(amount, "amount outside the representable range, clamping");
            return if rounded > 0.0 {
                Money(i64::MAX)
            } else {
                Money(i64::MIN)
            };
        }
        Money(rounded as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pesos/dollars) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly rendering. The editor formats with its own locale; see
/// [`crate::config::EngineConfig::format_currency`] for the configured symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_amount_rounds_to_cents() {
        assert_eq!(Money::from_amount(10.994).cents(), 1099);
        assert_eq!(Money::from_amount(10.995).cents(), 1100);
        assert_eq!(Money::from_amount(-5.5).cents(), -550);
        assert_eq!(Money::from_amount(0.0).cents(), 0);
    }

    #[test]
    fn test_from_amount_absorbs_float_noise() {
        // 2.34 * 100.0 is 233.99999999999997 in binary floating point
        assert_eq!(Money::from_amount(2.34 * 100.0).cents(), 23400);
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert!(Money::from_amount(f64::INFINITY).is_zero());
        assert!(Money::from_amount(f64::NAN).is_zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_out_of_range_amount_is_clamped() {
        assert_eq!(Money::from_amount(1e300).cents(), i64::MAX);
        assert_eq!(Money::from_amount(-1e300).cents(), i64::MIN);
        assert_eq!(Money::from_amount(9.0e16).cents(), 9_000_000_000_000_000_000);
    }

    #[test]
    fn test_sign_helpers() {
        assert!(Money::from_cents(-1).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(Money::default().is_zero());
    }
}
