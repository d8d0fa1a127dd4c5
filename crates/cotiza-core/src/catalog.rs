//! # Product Catalog
//!
//! Closed set of products the editor offers, each resolved once to a
//! [`ProductFamily`]. Expansion and labeling branch on the family, never on
//! the text of the product code.
//!
//! ```text
//! ┌──────────────────────────┬──────────────────────┬──────────────────┐
//! │ code                     │ family               │ physical layers  │
//! ├──────────────────────────┼──────────────────────┼──────────────────┤
//! │ roller_screen            │ RollerScreen         │ 1                │
//! │ roller_blackout          │ Blackout             │ 1                │
//! │ roller_sheer             │ Sheer                │ 1                │
//! │ day_night                │ DayNight             │ 2 (blackout+mesh)│
//! │ dual_blackout_sheer      │ DayNight             │ 2 (blackout+mesh)│
//! │ vertical                 │ Vertical             │ 1                │
//! │ roman                    │ Roman                │ 1                │
//! │ panel_track              │ PanelTrack           │ 1                │
//! │ (anything else)          │ Custom               │ 1                │
//! └──────────────────────────┴──────────────────────┴──────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::LayerSubtype;

// =============================================================================
// Product Family
// =============================================================================

/// Family a product belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductFamily {
    RollerScreen,
    Blackout,
    Sheer,
    /// Blackout and sheer mounted together; one opening, two pieces.
    DayNight,
    Vertical,
    Roman,
    PanelTrack,
    /// Not in the catalog (special orders). Treated as single-layer.
    #[default]
    Custom,
}

static DUAL_LAYERS: [LayerSubtype; 2] = [LayerSubtype::Blackout, LayerSubtype::Mesh];

impl ProductFamily {
    /// Resolves a product code through the catalog.
    pub fn resolve(product_code: &str) -> Self {
        lookup(product_code)
            .map(|entry| entry.family)
            .unwrap_or(ProductFamily::Custom)
    }

    #[inline]
    pub const fn is_dual_layer(self) -> bool {
        matches!(self, ProductFamily::DayNight)
    }

    /// Layers each opening is built from. Empty for single-layer families.
    pub fn layers(self) -> &'static [LayerSubtype] {
        if self.is_dual_layer() {
            &DUAL_LAYERS[..]
        } else {
            &[]
        }
    }

    /// Physical pieces produced per captured opening.
    #[inline]
    pub fn pieces_per_opening(self) -> usize {
        self.layers().len().max(1)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// One product the editor can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub code: &'static str,
    pub label: &'static str,
    pub family: ProductFamily,
}

pub const PRODUCT_CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        code: "roller_screen",
        label: "Roller shade (screen)",
        family: ProductFamily::RollerScreen,
    },
    CatalogEntry {
        code: "roller_blackout",
        label: "Roller shade (blackout)",
        family: ProductFamily::Blackout,
    },
    CatalogEntry {
        code: "roller_sheer",
        label: "Roller shade (sheer)",
        family: ProductFamily::Sheer,
    },
    CatalogEntry {
        code: "day_night",
        label: "Day/Night system",
        family: ProductFamily::DayNight,
    },
    CatalogEntry {
        code: "dual_blackout_sheer",
        label: "Dual system blackout + sheer",
        family: ProductFamily::DayNight,
    },
    CatalogEntry {
        code: "vertical",
        label: "Vertical blind",
        family: ProductFamily::Vertical,
    },
    CatalogEntry {
        code: "roman",
        label: "Roman shade",
        family: ProductFamily::Roman,
    },
    CatalogEntry {
        code: "panel_track",
        label: "Panel track",
        family: ProductFamily::PanelTrack,
    },
];

/// Finds a catalog entry by code (trimmed, case-insensitive).
pub fn lookup(product_code: &str) -> Option<&'static CatalogEntry> {
    let code = product_code.trim();
    PRODUCT_CATALOG
        .iter()
        .find(|entry| entry.code.eq_ignore_ascii_case(code))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_codes() {
        assert_eq!(ProductFamily::resolve("day_night"), ProductFamily::DayNight);
        assert_eq!(
            ProductFamily::resolve(" DUAL_BLACKOUT_SHEER "),
            ProductFamily::DayNight
        );
        assert_eq!(ProductFamily::resolve("roman"), ProductFamily::Roman);
    }

    #[test]
    fn test_unknown_code_is_custom_single_layer() {
        let family = ProductFamily::resolve("day_night_special");
        assert_eq!(family, ProductFamily::Custom);
        assert!(!family.is_dual_layer());
        assert_eq!(family.pieces_per_opening(), 1);
    }

    #[test]
    fn test_only_day_night_is_dual_layer() {
        let dual: Vec<_> = PRODUCT_CATALOG
            .iter()
            .filter(|entry| entry.family.is_dual_layer())
            .map(|entry| entry.code)
            .collect();
        assert_eq!(dual, vec!["day_night", "dual_blackout_sheer"]);
        assert_eq!(ProductFamily::DayNight.pieces_per_opening(), 2);
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        for (i, a) in PRODUCT_CATALOG.iter().enumerate() {
            for b in &PRODUCT_CATALOG[i + 1..] {
                assert_ne!(a.code, b.code);
            }
        }
    }
}
