//! Variations

use rust_decimal::Decimal;
use slotmap::new_key_type;
use smallvec::SmallVec;

use crate::{
    attributes::{AttributeKey, AttributePair},
    ids::RemoteVariationId,
};

pub mod reconcile;
pub mod set;

new_key_type! {
    /// Client-local variation identity, scoped to one [`set::VariationSet`].
    pub struct VariationKey;
}

/// A variation's relationship to the durable store since last persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariationStatus {
    /// Matches the durable store row.
    #[default]
    Synced,

    /// Created locally; no durable row exists yet.
    New,

    /// Durable row exists but local fields have diverged.
    Modified,

    /// Scheduled for deletion in the durable store.
    Deleted,
}

impl VariationStatus {
    /// Whether the variation is still part of the active set.
    #[must_use]
    pub fn is_active(self) -> bool {
        self != Self::Deleted
    }

    /// The status after a field edit: `New` stays `New`, everything else
    /// becomes `Modified`.
    #[must_use]
    pub fn edited(self) -> Self {
        match self {
            Self::New => Self::New,
            Self::Synced | Self::Modified | Self::Deleted => Self::Modified,
        }
    }
}

/// Stock availability of one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockStatus {
    /// Available for purchase.
    #[default]
    InStock,

    /// Sold out.
    OutOfStock,

    /// Purchasable, shipped once restocked.
    OnBackorder,
}

/// Tax treatment of one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaxStatus {
    /// Price and shipping are taxed.
    #[default]
    Taxable,

    /// Only shipping is taxed.
    ShippingOnly,

    /// Not taxed at all.
    Exempt,
}

/// Parcel dimensions, in the storefront's configured unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dimensions {
    /// Length
    pub length: Option<Decimal>,

    /// Width
    pub width: Option<Decimal>,

    /// Height
    pub height: Option<Decimal>,
}

/// The editable commercial fields of a variation.
///
/// Prices are minor currency units (pence, cents); `None` means the field has
/// not been filled in yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariationFields {
    /// Regular price in minor units
    pub regular_price: Option<u64>,

    /// Sale price in minor units
    pub sale_price: Option<u64>,

    /// Stock-keeping unit; empty means unset
    pub sku: String,

    /// Managed stock quantity
    pub stock_quantity: Option<i64>,

    /// Stock availability
    pub stock_status: StockStatus,

    /// Shipping weight
    pub weight: Option<Decimal>,

    /// Parcel dimensions
    pub dimensions: Dimensions,

    /// Tax treatment
    pub tax_status: TaxStatus,

    /// Storefront tax class slug; empty means the standard class
    pub tax_class: String,

    /// Variation description
    pub description: String,

    /// Whether the variation is purchasable on the storefront
    pub published: bool,

    /// Reference to an uploaded image
    pub image: Option<String>,
}

impl Default for VariationFields {
    fn default() -> Self {
        Self {
            regular_price: None,
            sale_price: None,
            sku: String::new(),
            stock_quantity: None,
            stock_status: StockStatus::default(),
            weight: None,
            dimensions: Dimensions::default(),
            tax_status: TaxStatus::default(),
            tax_class: String::new(),
            description: String::new(),
            published: true,
            image: None,
        }
    }
}

/// One editable field together with its new value.
///
/// One variant per field keeps updates exhaustively matched instead of going
/// through stringly-typed field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Set the regular price (minor units).
    RegularPrice(Option<u64>),

    /// Set the sale price (minor units).
    SalePrice(Option<u64>),

    /// Set the SKU.
    Sku(String),

    /// Set the managed stock quantity.
    StockQuantity(Option<i64>),

    /// Set the stock availability.
    StockStatus(StockStatus),

    /// Set the shipping weight.
    Weight(Option<Decimal>),

    /// Set the parcel dimensions.
    Dimensions(Dimensions),

    /// Set the tax treatment.
    TaxStatus(TaxStatus),

    /// Set the tax class slug.
    TaxClass(String),

    /// Set the description.
    Description(String),

    /// Publish or unpublish the variation.
    Published(bool),

    /// Set or clear the image reference.
    Image(Option<String>),
}

/// One concrete combination of attribute values: a sellable sub-item of a
/// variable product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variation {
    pairs: SmallVec<[AttributePair; 4]>,
    remote_id: Option<RemoteVariationId>,
    status: VariationStatus,
    fields: VariationFields,
}

impl Variation {
    /// Create a freshly generated variation with default fields and status
    /// [`VariationStatus::New`].
    #[must_use]
    pub fn new(pairs: SmallVec<[AttributePair; 4]>) -> Self {
        Self {
            pairs,
            remote_id: None,
            status: VariationStatus::New,
            fields: VariationFields::default(),
        }
    }

    /// Create a variation loaded from the durable store.
    #[must_use]
    pub fn synced(
        pairs: SmallVec<[AttributePair; 4]>,
        remote_id: RemoteVariationId,
        fields: VariationFields,
    ) -> Self {
        Self {
            pairs,
            remote_id: Some(remote_id),
            status: VariationStatus::Synced,
            fields,
        }
    }

    /// The attribute pairs making up this combination, in display order.
    pub fn pairs(&self) -> &[AttributePair] {
        &self.pairs
    }

    /// The canonical identity of this combination.
    #[must_use]
    pub fn key(&self) -> AttributeKey {
        AttributeKey::new(&self.pairs)
    }

    /// The durable-store identifier, if the variation has been persisted.
    pub fn remote_id(&self) -> Option<RemoteVariationId> {
        self.remote_id
    }

    /// The lifecycle status.
    pub fn status(&self) -> VariationStatus {
        self.status
    }

    /// The commercial fields.
    pub fn fields(&self) -> &VariationFields {
        &self.fields
    }

    /// Whether the variation is not scheduled for deletion.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub(crate) fn set_status(&mut self, status: VariationStatus) {
        self.status = status;
    }

    /// Apply one field update without touching the status.
    pub(crate) fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::RegularPrice(value) => self.fields.regular_price = value,
            FieldUpdate::SalePrice(value) => self.fields.sale_price = value,
            FieldUpdate::Sku(value) => self.fields.sku = value,
            FieldUpdate::StockQuantity(value) => self.fields.stock_quantity = value,
            FieldUpdate::StockStatus(value) => self.fields.stock_status = value,
            FieldUpdate::Weight(value) => self.fields.weight = value,
            FieldUpdate::Dimensions(value) => self.fields.dimensions = value,
            FieldUpdate::TaxStatus(value) => self.fields.tax_status = value,
            FieldUpdate::TaxClass(value) => self.fields.tax_class = value,
            FieldUpdate::Description(value) => self.fields.description = value,
            FieldUpdate::Published(value) => self.fields.published = value,
            FieldUpdate::Image(value) => self.fields.image = value,
        }
    }
}
