//! Editable variation set

use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::{
    attributes::Attribute,
    storefront::records::VariationRecord,
    variations::{
        FieldUpdate, Variation, VariationKey, VariationStatus,
        reconcile::{GenerateError, GenerationReport, regenerate},
    },
};

/// The canonical in-memory variation list of one variable product, with
/// display order, dirty-tracking and a selection for bulk edits.
///
/// The set is exclusively owned by one editing session; all operations are
/// synchronous in-memory transformations. Among non-deleted variations no two
/// share the same attribute key.
#[derive(Debug, Default)]
pub struct VariationSet {
    variations: SlotMap<VariationKey, Variation>,
    order: Vec<VariationKey>,
    selection: FxHashSet<VariationKey>,
}

impl VariationSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from durable-store rows, all `Synced`.
    #[must_use]
    pub fn from_records(records: Vec<VariationRecord>) -> Self {
        let mut set = Self::new();

        for record in records {
            set.push(Variation::synced(record.pairs, record.id, record.fields));
        }

        set
    }

    /// Append a variation, returning its local key.
    pub fn push(&mut self, variation: Variation) -> VariationKey {
        let key = self.variations.insert(variation);
        self.order.push(key);
        key
    }

    /// Number of variations, deleted ones included.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set holds no variations at all.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up one variation.
    pub fn get(&self, key: VariationKey) -> Option<&Variation> {
        self.variations.get(key)
    }

    /// All variations in display order.
    pub fn iter(&self) -> impl Iterator<Item = (VariationKey, &Variation)> {
        self.order
            .iter()
            .filter_map(|key| self.variations.get(*key).map(|variation| (*key, variation)))
    }

    /// Non-deleted variations in display order.
    pub fn active(&self) -> impl Iterator<Item = (VariationKey, &Variation)> {
        self.iter().filter(|(_, variation)| variation.is_active())
    }

    /// Recompute the full set from the product's attributes.
    ///
    /// See [`regenerate`](crate::variations::reconcile) for the matching
    /// rules. Clears the selection.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::NoVariationAttributes`] when no attribute
    /// qualifies for matrix generation; the set is left untouched.
    pub fn generate(&mut self, attributes: &[Attribute]) -> Result<GenerationReport, GenerateError> {
        let report = regenerate(&mut self.variations, &mut self.order, attributes)?;
        self.selection.clear();

        Ok(report)
    }

    /// Update one field of one variation.
    ///
    /// `New` stays `New`; any other status becomes `Modified`. Unknown keys
    /// are a no-op.
    pub fn update_field(&mut self, key: VariationKey, update: FieldUpdate) {
        if let Some(variation) = self.variations.get_mut(key) {
            variation.apply(update);
            variation.set_status(variation.status().edited());
        }
    }

    /// Delete one variation.
    ///
    /// `New` variations are removed outright (they never existed durably);
    /// anything else is marked `Deleted` until persisted. Either way the key
    /// leaves the selection.
    pub fn remove(&mut self, key: VariationKey) {
        self.selection.remove(&key);

        let Some(variation) = self.variations.get_mut(key) else {
            return;
        };

        if variation.status() == VariationStatus::New {
            self.variations.remove(key);
            self.order.retain(|existing| *existing != key);
        } else {
            variation.set_status(VariationStatus::Deleted);
        }
    }

    /// Apply one field update to every selected, non-deleted variation.
    pub fn bulk_update_field(&mut self, update: &FieldUpdate) {
        for key in self.selected_active() {
            self.update_field(key, update.clone());
        }
    }

    /// Delete every selected, non-deleted variation.
    pub fn remove_selected(&mut self) {
        for key in self.selected_active() {
            self.remove(key);
        }
    }

    /// Toggle one variation in or out of the selection. Unknown or deleted
    /// keys are a no-op.
    pub fn toggle(&mut self, key: VariationKey) {
        if !self.variations.get(key).is_some_and(Variation::is_active) {
            return;
        }

        if !self.selection.remove(&key) {
            self.selection.insert(key);
        }
    }

    /// Select every active variation, or clear the selection if all of them
    /// are already selected.
    pub fn toggle_all(&mut self) {
        let active: FxHashSet<VariationKey> = self.active().map(|(key, _)| key).collect();

        if self.selection == active {
            self.selection.clear();
        } else {
            self.selection = active;
        }
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Whether the variation is currently selected.
    pub fn is_selected(&self, key: VariationKey) -> bool {
        self.selection.contains(&key)
    }

    /// Number of selected variations.
    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Selected, non-deleted keys in display order.
    fn selected_active(&self) -> Vec<VariationKey> {
        self.active()
            .map(|(key, _)| key)
            .filter(|key| self.selection.contains(key))
            .collect()
    }
}
