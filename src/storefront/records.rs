//! Storefront records

use smallvec::SmallVec;

use crate::{
    attributes::AttributePair,
    ids::{ProductId, RemoteVariationId},
    variations::VariationFields,
};

/// One persisted variation row, as the storefront returns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationRecord {
    /// Durable identifier
    pub id: RemoteVariationId,

    /// Parent product
    pub parent: ProductId,

    /// Attribute combination
    pub pairs: SmallVec<[AttributePair; 4]>,

    /// Commercial fields
    pub fields: VariationFields,
}

/// Payload for inserting one variation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariationRow {
    /// Attribute combination
    pub pairs: SmallVec<[AttributePair; 4]>,

    /// Commercial fields
    pub fields: VariationFields,
}

/// Payload for updating one variation row in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationRowUpdate {
    /// Attribute combination
    pub pairs: SmallVec<[AttributePair; 4]>,

    /// Commercial fields
    pub fields: VariationFields,
}

/// A SKU uniqueness violation found by the pre-persist check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkuConflict {
    /// The contested SKU
    pub sku: String,

    /// Product owning the conflicting record
    pub product: ProductId,

    /// Display name of the conflicting product or variation
    pub owner: String,
}
