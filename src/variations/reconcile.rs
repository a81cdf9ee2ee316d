//! Matrix reconciliation
//!
//! Rebuilds a product's full variation set from its attribute matrix while
//! preserving unsaved edits and keeping track of rows that must still be
//! deleted in the durable store.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use thiserror::Error;

use crate::{
    attributes::{Attribute, AttributeKey, variation_attributes},
    matrix::attribute_combinations,
    variations::{Variation, VariationKey, VariationStatus},
};

/// Errors that can occur when generating the variation matrix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// No attribute is marked for variations, or all of them have empty
    /// option lists. Nothing is mutated.
    #[error("no attributes are marked as used for variations")]
    NoVariationAttributes,
}

/// Counts reported back to the caller after a matrix generation, for user
/// feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    /// Combinations that did not exist before and were created as `New`.
    pub created: usize,

    /// Existing variations matched by the new matrix and kept untouched.
    pub kept: usize,

    /// Synced or modified variations whose combination disappeared and which
    /// were marked `Deleted` in place.
    pub orphaned: usize,
}

impl GenerationReport {
    /// Whether the generation was a no-op ("nothing to do").
    #[must_use]
    pub fn unchanged(&self) -> bool {
        self.created == 0 && self.orphaned == 0
    }
}

/// Recompute the variation list against the attribute matrix.
///
/// Matched combinations keep their existing variation untouched (identity,
/// status and edited fields included); unmatched combinations are synthesized
/// as `New`; synced/modified variations whose combination vanished are marked
/// `Deleted` in place; `New` orphans are dropped outright. Variations already
/// marked `Deleted` are carried through unchanged so pending storefront
/// deletions are never lost.
pub(crate) fn regenerate(
    variations: &mut SlotMap<VariationKey, Variation>,
    order: &mut Vec<VariationKey>,
    attributes: &[Attribute],
) -> Result<GenerationReport, GenerateError> {
    let qualifying = variation_attributes(attributes);

    if qualifying.is_empty() {
        return Err(GenerateError::NoVariationAttributes);
    }

    let targets = attribute_combinations(&qualifying);

    // Non-deleted variations, addressable by combination identity. Consumed
    // entries are matched combinations; leftovers are orphans.
    let mut existing: FxHashMap<AttributeKey, VariationKey> = order
        .iter()
        .copied()
        .filter_map(|key| {
            variations
                .get(key)
                .filter(|variation| variation.is_active())
                .map(|variation| (variation.key(), key))
        })
        .collect();

    let pending_deletion: Vec<VariationKey> = order
        .iter()
        .copied()
        .filter(|key| variations.get(*key).is_some_and(|v| !v.is_active()))
        .collect();

    let mut report = GenerationReport::default();
    let mut next_order = Vec::with_capacity(targets.len());

    for pairs in targets {
        let identity = AttributeKey::new(&pairs);

        if let Some(key) = existing.remove(&identity) {
            report.kept += 1;
            next_order.push(key);
        } else {
            report.created += 1;
            next_order.push(variations.insert(Variation::new(pairs)));
        }
    }

    // Leftovers no longer have a combination in the matrix. Durable ones must
    // still be deleted remotely; local-only ones just vanish.
    let mut orphans: Vec<VariationKey> = existing.into_values().collect();
    orphans.sort_by_key(|key| order.iter().position(|o| o == key));

    for key in orphans {
        let Some(variation) = variations.get_mut(key) else {
            continue;
        };

        match variation.status() {
            VariationStatus::New => {
                variations.remove(key);
            }
            VariationStatus::Synced | VariationStatus::Modified => {
                variation.set_status(VariationStatus::Deleted);
                report.orphaned += 1;
                next_order.push(key);
            }
            VariationStatus::Deleted => {}
        }
    }

    next_order.extend(pending_deletion);
    *order = next_order;

    Ok(report)
}
