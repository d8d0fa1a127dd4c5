//! # System Expander
//!
//! Day/night systems are ordered per opening but built as two physical
//! pieces: a blackout layer and a mesh (sheer) layer. Each captured opening
//! becomes two pieces that both remember which opening they came from.
//!
//! ```text
//! captured (day_night)            expanded
//! ────────────────────            ─────────────────────────────
//! #1  1.20 × 1.60         ──►     1.20 × 1.60  blackout  source 1
//!                                 1.20 × 1.60  mesh      source 1
//! #2  0.90 × 1.60         ──►     0.90 × 1.60  blackout  source 2
//!                                 0.90 × 1.60  mesh      source 2
//! ```
//!
//! Piece counts, per-piece installation and per-piece validation all use the
//! expanded list; the declared quantity on the line item stays the opening
//! count.

use tracing::trace;

use crate::catalog::ProductFamily;
use crate::types::Measurement;

/// True when the product is built as two physical layers per opening.
///
/// ## Example
/// ```rust
/// use cotiza_core::expansion::is_dual_layer_product;
///
/// assert!(is_dual_layer_product("day_night"));
/// assert!(!is_dual_layer_product("roller_blackout"));
/// ```
pub fn is_dual_layer_product(product_code: &str) -> bool {
    ProductFamily::resolve(product_code).is_dual_layer()
}

/// Expands measurements for a product code. Identity for single-layer
/// products.
pub fn expand(measurements: &[Measurement], product_code: &str) -> Vec<Measurement> {
    expand_for_family(measurements, ProductFamily::resolve(product_code))
}

/// Expands measurements for an already resolved product family.
///
/// Pieces are emitted opening by opening, one per layer, so the output is
/// always `layers × input` long with layers split evenly.
pub fn expand_for_family(measurements: &[Measurement], family: ProductFamily) -> Vec<Measurement> {
    let layers = family.layers();
    if layers.is_empty() {
        return measurements.to_vec();
    }

    let mut pieces = Vec::with_capacity(measurements.len() * layers.len());
    for (i, measurement) in measurements.iter().enumerate() {
        for &layer in layers {
            pieces.push(Measurement {
                subtype: Some(layer),
                source_index: Some(i + 1),
                ..measurement.clone()
            });
        }
    }

    trace!(
        family = ?family,
        openings = measurements.len(),
        pieces = pieces.len(),
        "expanded dual-layer measurements"
    );
    pieces
}

// =============================================================================
// Unit Tests
// =============================================================================
