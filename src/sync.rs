//! Storefront synchronization
//!
//! Diffs an in-memory [`VariationSet`] against the storefront by status and
//! applies the difference: inserts, then updates, then delete-marks, issued
//! serially as one logical operation.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    attributes::AttributeKey,
    ids::{ProductId, RemoteVariationId, StoreId},
    storefront::{
        StorefrontError, VariationsRepository,
        records::{NewVariationRow, VariationRowUpdate},
    },
    variations::{Variation, VariationStatus, set::VariationSet},
};

/// Errors that can occur while loading or persisting a variation set.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A non-empty SKU in the batch is already taken by another product or
    /// another product's variation. Nothing was written.
    #[error("SKU {sku:?} is already used by {owner}")]
    DuplicateSku {
        /// The contested SKU
        sku: String,

        /// Display name of the record already holding the SKU
        owner: String,
    },

    /// A storefront call failed. Local edits are left as they were so the
    /// caller can retry.
    #[error(transparent)]
    Storefront(#[from] StorefrontError),
}

/// Per-category counts of a completed persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncOutcome {
    /// Rows inserted
    pub created: usize,

    /// Rows updated in place
    pub updated: usize,

    /// Rows marked for deletion
    pub deleted: usize,
}

/// Synchronizes one product's variation set with the storefront it belongs
/// to.
#[derive(Debug, Clone)]
pub struct SyncService<R> {
    store: StoreId,
    repository: R,
}

impl<R: VariationsRepository> SyncService<R> {
    /// Create a service bound to one storefront connection.
    #[must_use]
    pub fn new(store: StoreId, repository: R) -> Self {
        Self { store, repository }
    }

    /// The storefront connection this service writes to.
    pub fn store(&self) -> StoreId {
        self.store
    }

    /// The underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Load a product's persisted variations into a fresh set, all `Synced`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Storefront`] when the storefront call fails.
    pub async fn load(&self, parent: ProductId) -> Result<VariationSet, SyncError> {
        let records = self.repository.list_variations(self.store, parent).await?;

        debug!(%parent, rows = records.len(), "loaded variation rows");

        Ok(VariationSet::from_records(records))
    }

    /// Persist the set: SKU preflight, then inserts, updates and delete-marks
    /// in that order, then a refresh from the storefront so local state picks
    /// up the durably-assigned ids.
    ///
    /// The write phases are not atomic. A failure mid-way (say, during the
    /// update phase after inserts committed) leaves the storefront partially
    /// migrated; the in-memory set keeps its edits so the caller can inspect
    /// and retry.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::DuplicateSku`] before any write when a non-empty
    /// SKU collides within the batch or with another product in the catalog,
    /// and [`SyncError::Storefront`] when a storefront call fails.
    pub async fn persist(
        &self,
        parent: ProductId,
        set: &mut VariationSet,
    ) -> Result<SyncOutcome, SyncError> {
        self.check_skus(parent, set).await?;

        let mut inserts: Vec<NewVariationRow> = Vec::new();
        let mut updates: Vec<(RemoteVariationId, VariationRowUpdate)> = Vec::new();
        let mut deletions: Vec<RemoteVariationId> = Vec::new();

        for (_, variation) in set.iter() {
            match (variation.status(), variation.remote_id()) {
                (VariationStatus::Deleted, Some(id)) => deletions.push(id),
                // A deleted row without a durable id never existed remotely.
                (VariationStatus::Deleted, None) => {}
                (VariationStatus::Modified, Some(id)) => {
                    updates.push((id, row_update(variation)));
                }
                // New rows, and first-time migration of rows that predate the
                // durable store, regardless of status.
                (_, None) => inserts.push(NewVariationRow {
                    pairs: variation.pairs().into(),
                    fields: variation.fields().clone(),
                }),
                (VariationStatus::Synced | VariationStatus::New, Some(_)) => {}
            }
        }

        let outcome = SyncOutcome {
            created: inserts.len(),
            updated: updates.len(),
            deleted: deletions.len(),
        };

        if !inserts.is_empty() {
            self.repository
                .insert_variations(self.store, parent, inserts)
                .await?;
            debug!(%parent, count = outcome.created, "inserted variation rows");
        }

        for (id, update) in updates {
            self.repository
                .update_variation(self.store, parent, id, update)
                .await?;
        }

        if outcome.updated > 0 {
            debug!(%parent, count = outcome.updated, "updated variation rows");
        }

        if !deletions.is_empty() {
            self.repository
                .mark_deleted(self.store, parent, deletions)
                .await?;
            debug!(%parent, count = outcome.deleted, "marked variation rows deleted");
        }

        *set = self.load(parent).await?;

        Ok(outcome)
    }

    /// Reject the batch when a non-empty SKU is duplicated locally or already
    /// taken elsewhere in the catalog.
    async fn check_skus(&self, parent: ProductId, set: &VariationSet) -> Result<(), SyncError> {
        let mut seen: FxHashMap<&str, AttributeKey> = FxHashMap::default();

        for (_, variation) in set.active() {
            let sku = variation.fields().sku.as_str();

            if sku.is_empty() {
                continue;
            }

            if let Some(holder) = seen.insert(sku, variation.key()) {
                return Err(SyncError::DuplicateSku {
                    sku: sku.to_string(),
                    owner: format!("variation {holder} in the same batch"),
                });
            }
        }

        for (sku, _) in seen {
            let conflict = self
                .repository
                .find_sku_conflict(self.store, parent, sku.to_string())
                .await?;

            if let Some(conflict) = conflict {
                return Err(SyncError::DuplicateSku {
                    sku: conflict.sku,
                    owner: conflict.owner,
                });
            }
        }

        Ok(())
    }
}

fn row_update(variation: &Variation) -> VariationRowUpdate {
    VariationRowUpdate {
        pairs: variation.pairs().into(),
        fields: variation.fields().clone(),
    }
}
