//! In-memory storefront
//!
//! A self-contained [`VariationsRepository`] backed by process memory.
//! Integration tests run against it, and embedders can use it to drive the
//! whole edit/generate/persist cycle without a connected storefront.

use std::sync::{Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use crate::{
    ids::{ProductId, RemoteVariationId, StoreId},
    storefront::{
        errors::StorefrontError,
        records::{NewVariationRow, SkuConflict, VariationRecord, VariationRowUpdate},
        repository::VariationsRepository,
    },
};

use async_trait::async_trait;

#[derive(Debug)]
struct StoredRow {
    id: RemoteVariationId,
    row: VariationRowUpdate,
    deleted: bool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    rows: FxHashMap<(StoreId, ProductId), Vec<StoredRow>>,
    catalog_skus: Vec<SkuConflict>,
    writes: usize,
}

/// An in-process storefront holding variation rows and catalog SKUs.
#[derive(Debug, Default)]
pub struct InMemoryStorefront {
    inner: Mutex<Inner>,
}

impl InMemoryStorefront {
    /// Create an empty storefront.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a SKU owned by another product (or one of its variations) so
    /// the uniqueness check has something to collide with.
    pub fn seed_catalog_sku(&self, product: ProductId, owner: &str, sku: &str) {
        self.lock().catalog_skus.push(SkuConflict {
            sku: sku.to_string(),
            product,
            owner: owner.to_string(),
        });
    }

    /// Insert a pre-existing variation row, returning its durable id.
    pub fn seed_variation(
        &self,
        store: StoreId,
        parent: ProductId,
        row: NewVariationRow,
    ) -> RemoteVariationId {
        let mut inner = self.lock();
        let id = inner.assign_id();

        inner.rows.entry((store, parent)).or_default().push(StoredRow {
            id,
            row: VariationRowUpdate {
                pairs: row.pairs,
                fields: row.fields,
            },
            deleted: false,
        });

        id
    }

    /// Number of write calls (inserts, updates, delete-marks) served so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Number of rows marked deleted for one product.
    pub fn deleted_count(&self, store: StoreId, parent: ProductId) -> usize {
        self.lock()
            .rows
            .get(&(store, parent))
            .map_or(0, |rows| rows.iter().filter(|row| row.deleted).count())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Inner {
    fn assign_id(&mut self) -> RemoteVariationId {
        self.next_id += 1;
        RemoteVariationId(self.next_id)
    }
}

#[async_trait]
impl VariationsRepository for InMemoryStorefront {
    async fn list_variations(
        &self,
        store: StoreId,
        parent: ProductId,
    ) -> Result<Vec<VariationRecord>, StorefrontError> {
        let inner = self.lock();

        Ok(inner
            .rows
            .get(&(store, parent))
            .into_iter()
            .flatten()
            .filter(|stored| !stored.deleted)
            .map(|stored| VariationRecord {
                id: stored.id,
                parent,
                pairs: stored.row.pairs.clone(),
                fields: stored.row.fields.clone(),
            })
            .collect())
    }

    async fn insert_variations(
        &self,
        store: StoreId,
        parent: ProductId,
        rows: Vec<NewVariationRow>,
    ) -> Result<Vec<RemoteVariationId>, StorefrontError> {
        let mut inner = self.lock();
        inner.writes += 1;

        let mut assigned = Vec::with_capacity(rows.len());

        for row in rows {
            let id = inner.assign_id();
            assigned.push(id);

            inner.rows.entry((store, parent)).or_default().push(StoredRow {
                id,
                row: VariationRowUpdate {
                    pairs: row.pairs,
                    fields: row.fields,
                },
                deleted: false,
            });
        }

        Ok(assigned)
    }

    async fn update_variation(
        &self,
        store: StoreId,
        parent: ProductId,
        id: RemoteVariationId,
        update: VariationRowUpdate,
    ) -> Result<(), StorefrontError> {
        let mut inner = self.lock();
        inner.writes += 1;

        let stored = inner
            .rows
            .get_mut(&(store, parent))
            .and_then(|rows| rows.iter_mut().find(|stored| stored.id == id))
            .ok_or(StorefrontError::VariationNotFound(id))?;

        stored.row = update;

        Ok(())
    }

    async fn mark_deleted(
        &self,
        store: StoreId,
        parent: ProductId,
        ids: Vec<RemoteVariationId>,
    ) -> Result<(), StorefrontError> {
        let mut inner = self.lock();
        inner.writes += 1;

        let rows = inner
            .rows
            .get_mut(&(store, parent))
            .ok_or(StorefrontError::ProductNotFound(parent))?;

        for id in ids {
            let stored = rows
                .iter_mut()
                .find(|stored| stored.id == id)
                .ok_or(StorefrontError::VariationNotFound(id))?;

            stored.deleted = true;
        }

        Ok(())
    }

    async fn find_sku_conflict(
        &self,
        store: StoreId,
        own_parent: ProductId,
        sku: String,
    ) -> Result<Option<SkuConflict>, StorefrontError> {
        let inner = self.lock();

        if let Some(conflict) = inner
            .catalog_skus
            .iter()
            .find(|entry| entry.sku == sku && entry.product != own_parent)
        {
            return Ok(Some(conflict.clone()));
        }

        // Variations of other products in the same store count as well.
        for ((row_store, parent), rows) in &inner.rows {
            if *row_store != store || *parent == own_parent {
                continue;
            }

            for stored in rows.iter().filter(|stored| !stored.deleted) {
                if stored.row.fields.sku == sku {
                    return Ok(Some(SkuConflict {
                        sku,
                        product: *parent,
                        owner: format!("variation {}", stored.id),
                    }));
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::{attributes::AttributePair, variations::VariationFields};

    fn row(color: &str, sku: &str) -> NewVariationRow {
        NewVariationRow {
            pairs: smallvec![AttributePair::new("Color", color)],
            fields: VariationFields {
                sku: sku.to_string(),
                ..VariationFields::default()
            },
        }
    }

    #[tokio::test]
    async fn listed_rows_exclude_deleted_ones() -> anyhow::Result<()> {
        let storefront = InMemoryStorefront::new();
        let store = StoreId::new();
        let parent = ProductId(7);

        let kept = storefront.seed_variation(store, parent, row("Red", "R-1"));
        let dropped = storefront.seed_variation(store, parent, row("Blue", "B-1"));

        storefront.mark_deleted(store, parent, vec![dropped]).await?;

        let listed = storefront.list_variations(store, parent).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().map(|record| record.id), Some(kept));

        Ok(())
    }

    #[tokio::test]
    async fn inserted_rows_get_fresh_sequential_ids() -> anyhow::Result<()> {
        let storefront = InMemoryStorefront::new();
        let store = StoreId::new();
        let parent = ProductId(7);

        let ids = storefront
            .insert_variations(store, parent, vec![row("Red", ""), row("Blue", "")])
            .await?;

        assert_eq!(ids, vec![RemoteVariationId(1), RemoteVariationId(2)]);

        Ok(())
    }

    #[tokio::test]
    async fn updating_an_unknown_row_fails() {
        let storefront = InMemoryStorefront::new();
        let store = StoreId::new();
        let parent = ProductId(7);

        let result = storefront
            .update_variation(
                store,
                parent,
                RemoteVariationId(42),
                VariationRowUpdate {
                    pairs: smallvec![],
                    fields: VariationFields::default(),
                },
            )
            .await;

        assert!(
            matches!(result, Err(StorefrontError::VariationNotFound(_))),
            "expected a not-found error"
        );
    }

    #[tokio::test]
    async fn sku_conflicts_ignore_the_own_parent() -> anyhow::Result<()> {
        let storefront = InMemoryStorefront::new();
        let store = StoreId::new();

        storefront.seed_catalog_sku(ProductId(7), "Basic Tee", "TEE-1");

        let own = storefront
            .find_sku_conflict(store, ProductId(7), "TEE-1".to_string())
            .await?;
        assert!(own.is_none(), "own-parent SKU reuse is allowed");

        let other = storefront
            .find_sku_conflict(store, ProductId(8), "TEE-1".to_string())
            .await?;
        assert_eq!(other.map(|conflict| conflict.owner), Some("Basic Tee".to_string()));

        Ok(())
    }

    #[tokio::test]
    async fn sku_conflicts_cover_other_products_variations() -> anyhow::Result<()> {
        let storefront = InMemoryStorefront::new();
        let store = StoreId::new();

        storefront.seed_variation(store, ProductId(7), row("Red", "SHARED"));

        let conflict = storefront
            .find_sku_conflict(store, ProductId(8), "SHARED".to_string())
            .await?;

        assert_eq!(conflict.map(|c| c.product), Some(ProductId(7)));

        Ok(())
    }
}
