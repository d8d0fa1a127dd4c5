//! # Lenient Deserializers
//!
//! The editor posts the whole form on every keystroke, including rows the
//! user has only half filled in. None of these helpers ever fail on a blank,
//! null or mistyped value; they fall back so the preview still renders and
//! the validator reports what is missing.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  wire value            number      text        choice      flag         │
//! │  ─────────────────     ────────    ────────    ────────    ─────        │
//! │  2.34                  2.34        "2.34"      None        true         │
//! │  "0,72"                0.72        "0,72"      None        -            │
//! │  "" / "   "            0           ""          None        false        │
//! │  null                  0           ""          None        false        │
//! │  "Motorized"           0           "Motor…"    Motorized   false        │
//! │  "hydraulic"           0           "hydr…"     None        false        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only structural mismatches (a list where an object belongs, a number where
//! a list of pieces belongs) still surface as a malformed payload.

use chrono::NaiveDate;
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::measurement::coerce_number;

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientValue {
    Flag(bool),
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientList {
    Many(Vec<LenientValue>),
    One(LenientValue),
}

impl LenientValue {
    fn into_text(self) -> Option<String> {
        match self {
            LenientValue::Text(s) => Some(s),
            LenientValue::Number(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }
}

// =============================================================================
// Numbers
// =============================================================================

/// Deserializes a number that may arrive as a string, null or garbage.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientValue::deserialize(deserializer)? {
        LenientValue::Number(v) if v.is_finite() => v,
        LenientValue::Text(s) => coerce_number(&s),
        _ => 0.0,
    })
}

/// Like [`lenient_number`], but blank or null means "not set".
pub(crate) fn lenient_optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientValue::deserialize(deserializer)? {
        LenientValue::Number(v) if v.is_finite() => Some(v),
        LenientValue::Number(_) => Some(0.0),
        LenientValue::Text(s) if s.trim().is_empty() => None,
        LenientValue::Text(s) => Some(coerce_number(&s)),
        _ => None,
    })
}

fn to_count(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else {
        value.trunc().min(u32::MAX as f64) as u32
    }
}

/// Deserializes a whole count; negatives and fractions are truncated toward 0.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_number(deserializer).map(to_count)
}

pub(crate) fn lenient_optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_number(deserializer).map(|value| value.map(to_count))
}

// =============================================================================
// Text
// =============================================================================

/// Free text; null or non-text becomes empty.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LenientValue::deserialize(deserializer)?
        .into_text()
        .unwrap_or_default())
}

/// Optional free text; null or non-text is `None`. Blank text is kept and
/// left for the validator to judge.
pub(crate) fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LenientValue::deserialize(deserializer)?.into_text())
}

/// A list of options. Accepts a single string, drops blank entries.
pub(crate) fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match LenientList::deserialize(deserializer)? {
        LenientList::Many(values) => values,
        LenientList::One(value) => vec![value],
    };
    Ok(values
        .into_iter()
        .filter_map(LenientValue::into_text)
        .filter(|s| !s.trim().is_empty())
        .collect())
}

// =============================================================================
// Choices
// =============================================================================

/// One value of a closed set (e.g. `"motorized"`, `"cm"`).
///
/// Matching is trimmed and case-insensitive. Blank, null and unknown values
/// are `None`, which the validator reports as missing.
pub(crate) fn lenient_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = match LenientValue::deserialize(deserializer)? {
        LenientValue::Text(s) => s,
        _ => return Ok(None),
    };
    let choice = raw.trim().to_ascii_lowercase();
    if choice.is_empty() {
        return Ok(None);
    }

    let parsed: Result<T, serde::de::value::Error> =
        T::deserialize(choice.as_str().into_deserializer());
    if parsed.is_err() {
        debug!(value = %raw, "ignoring unknown choice");
    }
    Ok(parsed.ok())
}

/// Like [`lenient_choice`], falling back to the type's default.
pub(crate) fn lenient_choice_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient_choice(deserializer).map(Option::unwrap_or_default)
}

/// An ISO `YYYY-MM-DD` date; anything else is `None`.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(LenientValue::deserialize(deserializer)?
        .into_text()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

// =============================================================================
// Flags and Objects
// =============================================================================

/// Checkbox value: `true`, `"true"`, `"1"`, `"on"`, `"yes"` or a non-zero
/// number. Blank means "not set".
pub(crate) fn lenient_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LenientValue::deserialize(deserializer)? {
        LenientValue::Flag(b) => Some(b),
        LenientValue::Number(v) => Some(v != 0.0),
        LenientValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "true" | "1" | "on" | "yes" => Some(true),
            _ => Some(false),
        },
        LenientValue::Other(_) => None,
    })
}

pub(crate) fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_flag(deserializer).map(|flag| flag.unwrap_or(false))
}

/// Null stands for "nothing entered yet" and becomes the default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::DimensionUnit;
    use crate::types::{ChannelMode, OperationMode};

    #[derive(Deserialize)]
    struct Numbers {
        #[serde(deserialize_with = "lenient_number")]
        a: f64,
        #[serde(deserialize_with = "lenient_number")]
        b: f64,
        #[serde(deserialize_with = "lenient_number")]
        c: f64,
        #[serde(default, deserialize_with = "lenient_optional_number")]
        d: Option<f64>,
        #[serde(default, deserialize_with = "lenient_optional_number")]
        e: Option<f64>,
        #[serde(deserialize_with = "lenient_count")]
        f: u32,
        #[serde(default, deserialize_with = "lenient_optional_count")]
        g: Option<u32>,
    }

    #[test]
    fn test_numbers() {
        let n: Numbers = serde_json::from_str(
            r#"{"a": "1,5", "b": null, "c": [1], "d": "", "e": "x", "f": "-3", "g": "15"}"#,
        )
        .unwrap();
        assert!((n.a - 1.5).abs() < 1e-9);
        assert_eq!(n.b, 0.0);
        assert_eq!(n.c, 0.0);
        assert_eq!(n.d, None);
        assert_eq!(n.e, Some(0.0));
        assert_eq!(n.f, 0);
        assert_eq!(n.g, Some(15));
    }

    #[derive(Deserialize)]
    struct Texts {
        #[serde(deserialize_with = "lenient_text")]
        location: String,
        #[serde(default, deserialize_with = "lenient_optional_text")]
        side: Option<String>,
        #[serde(default, deserialize_with = "lenient_string_list")]
        system: Vec<String>,
    }

    #[test]
    fn test_text_and_lists() {
        let t: Texts =
            serde_json::from_str(r#"{"location": null, "side": 12, "system": null}"#).unwrap();
        assert_eq!(t.location, "");
        assert_eq!(t.side.as_deref(), Some("12"));
        assert!(t.system.is_empty());

        let t: Texts = serde_json::from_str(
            r#"{"location": "Hall", "side": {}, "system": ["chain", "", " ", 3]}"#,
        )
        .unwrap();
        assert_eq!(t.location, "Hall");
        assert_eq!(t.side, None);
        assert_eq!(t.system, vec!["chain", "3"]);

        let t: Texts = serde_json::from_str(r#"{"location": "", "system": "spring"}"#).unwrap();
        assert_eq!(t.system, vec!["spring"]);
    }

    #[derive(Deserialize)]
    struct Choices {
        #[serde(default, deserialize_with = "lenient_choice")]
        mode: Option<OperationMode>,
        #[serde(default, deserialize_with = "lenient_choice")]
        unit: Option<DimensionUnit>,
        #[serde(default, deserialize_with = "lenient_choice_or_default")]
        channel: ChannelMode,
        #[serde(default, deserialize_with = "lenient_date")]
        date: Option<NaiveDate>,
    }

    #[test]
    fn test_choices() {
        let c: Choices =
            serde_json::from_str(r#"{"mode": "", "unit": null, "channel": "", "date": ""}"#)
                .unwrap();
        assert_eq!(c.mode, None);
        assert_eq!(c.unit, None);
        assert_eq!(c.channel, ChannelMode::Individual);
        assert_eq!(c.date, None);

        let c: Choices = serde_json::from_str(
            r#"{"mode": " Motorized ", "unit": "CM", "channel": "multi-channel", "date": "2026-10-19"}"#,
        )
        .unwrap();
        assert_eq!(c.mode, Some(OperationMode::Motorized));
        assert_eq!(c.unit, Some(DimensionUnit::Cm));
        assert_eq!(c.channel, ChannelMode::MultiChannel);
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2026, 10, 19));

        let c: Choices = serde_json::from_str(r#"{"mode": "hydraulic", "unit": 5}"#).unwrap();
        assert_eq!(c.mode, None);
        assert_eq!(c.unit, None);
    }

    #[derive(Deserialize)]
    struct Flags {
        #[serde(default, deserialize_with = "lenient_flag")]
        enabled: bool,
        #[serde(default, deserialize_with = "lenient_optional_flag")]
        pricing: Option<bool>,
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<u32>,
    }

    #[test]
    fn test_flags_and_null_objects() {
        let f: Flags =
            serde_json::from_str(r#"{"enabled": "on", "pricing": "", "items": null}"#).unwrap();
        assert!(f.enabled);
        assert_eq!(f.pricing, None);
        assert!(f.items.is_empty());

        let f: Flags = serde_json::from_str(r#"{"enabled": null, "pricing": 0}"#).unwrap();
        assert!(!f.enabled);
        assert_eq!(f.pricing, Some(false));

        // a list of pieces that is not a list is still malformed
        assert!(serde_json::from_str::<Flags>(r#"{"items": 5}"#).is_err());
    }
}
