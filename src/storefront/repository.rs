//! Variations repository.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    ids::{ProductId, RemoteVariationId, StoreId},
    storefront::{
        errors::StorefrontError,
        records::{NewVariationRow, SkuConflict, VariationRecord, VariationRowUpdate},
    },
};

/// Record-oriented access to a storefront's variation rows.
///
/// Rows are addressed by `(store, parent product, durable id)`. Deletion is a
/// soft mark; marked rows no longer appear in [`list_variations`] results.
///
/// [`list_variations`]: VariationsRepository::list_variations
#[automock]
#[async_trait]
pub trait VariationsRepository: Send + Sync {
    /// Retrieves all live variation rows of one parent product.
    async fn list_variations(
        &self,
        store: StoreId,
        parent: ProductId,
    ) -> Result<Vec<VariationRecord>, StorefrontError>;

    /// Inserts rows, returning the assigned durable ids in input order.
    async fn insert_variations(
        &self,
        store: StoreId,
        parent: ProductId,
        rows: Vec<NewVariationRow>,
    ) -> Result<Vec<RemoteVariationId>, StorefrontError>;

    /// Overwrites one row in place.
    async fn update_variation(
        &self,
        store: StoreId,
        parent: ProductId,
        id: RemoteVariationId,
        update: VariationRowUpdate,
    ) -> Result<(), StorefrontError>;

    /// Marks rows for deletion.
    async fn mark_deleted(
        &self,
        store: StoreId,
        parent: ProductId,
        ids: Vec<RemoteVariationId>,
    ) -> Result<(), StorefrontError>;

    /// Looks for a product or variation already using `sku`, ignoring
    /// `own_parent` and its variations (a variation sharing its own parent's
    /// SKU is allowed).
    async fn find_sku_conflict(
        &self,
        store: StoreId,
        own_parent: ProductId,
        sku: String,
    ) -> Result<Option<SkuConflict>, StorefrontError>;
}
