//! # Engine Configuration
//!
//! Defaults the host application sets once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. The quote draft itself (`pricingEnabled`, `generalUnitPrice`, `unit`,
//!    `validityDays`)
//! 2. Environment variables (`COTIZA_*`)
//! 3. Defaults (this file)
//!
//! The tax rate and the 1.0 m minimum are crate constants, not configuration.
//!
//! ## Thread Safety
//! Read-only after initialization; share it by reference.

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::measurement::DimensionUnit;
use crate::money::Money;

/// Engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Currency symbol for display strings.
    pub currency_symbol: String,

    /// Price per billable m² when neither piece nor line item sets one.
    pub general_unit_price: f64,

    /// When false every monetary figure is 0 (measurement-only surveys).
    pub pricing_enabled: bool,

    /// Unit assumed for measurements that do not state one.
    pub dimension_unit: DimensionUnit,

    /// Days a quote stays valid after its issue date.
    pub validity_days: u32,
}

impl Default for EngineConfig {
    /// ## Default Values
    /// - Currency: "$"
    /// - General unit price: 0
    /// - Pricing: enabled
    /// - Unit: meters
    /// - Validity: 15 days
    fn default() -> Self {
        EngineConfig {
            currency_symbol: "$".to_string(),
            general_unit_price: 0.0,
            pricing_enabled: true,
            dimension_unit: DimensionUnit::M,
            validity_days: 15,
        }
    }
}

impl EngineConfig {
    /// Creates a config from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `COTIZA_CURRENCY_SYMBOL`
    /// - `COTIZA_GENERAL_UNIT_PRICE` (e.g. "450.00")
    /// - `COTIZA_PRICING_ENABLED` ("true" / "false" / "1" / "0")
    /// - `COTIZA_DIMENSION_UNIT` ("m" / "cm")
    /// - `COTIZA_VALIDITY_DAYS`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = EngineConfig::default();

        if let Some(symbol) = lookup("COTIZA_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("COTIZA_GENERAL_UNIT_PRICE") {
            match raw.trim().parse::<f64>() {
                Ok(price) if price.is_finite() && price >= 0.0 => config.general_unit_price = price,
                _ => warn!(value = %raw, "ignoring invalid COTIZA_GENERAL_UNIT_PRICE"),
            }
        }

        if let Some(raw) = lookup("COTIZA_PRICING_ENABLED") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => config.pricing_enabled = true,
                "false" | "0" | "no" => config.pricing_enabled = false,
                _ => warn!(value = %raw, "ignoring invalid COTIZA_PRICING_ENABLED"),
            }
        }

        if let Some(raw) = lookup("COTIZA_DIMENSION_UNIT") {
            match DimensionUnit::parse(&raw) {
                Some(unit) => config.dimension_unit = unit,
                None => warn!(value = %raw, "ignoring invalid COTIZA_DIMENSION_UNIT"),
            }
        }

        if let Some(raw) = lookup("COTIZA_VALIDITY_DAYS") {
            match raw.trim().parse::<u32>() {
                Ok(days) => config.validity_days = days,
                Err(_) => warn!(value = %raw, "ignoring invalid COTIZA_VALIDITY_DAYS"),
            }
        }

        config
    }

    /// Formats money with the configured symbol and thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::{EngineConfig, Money};
    ///
    /// let config = EngineConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1_044_000)), "$10,440.00");
    /// assert_eq!(config.format_currency(Money::from_cents(-550)), "-$5.50");
    /// ```
    pub fn format_currency(&self, money: Money) -> String {
        let digits = money.major().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!(
            "{}{}{}.{:02}",
            if money.is_negative() { "-" } else { "" },
            self.currency_symbol,
            grouped,
            money.minor()
        )
    }
}
