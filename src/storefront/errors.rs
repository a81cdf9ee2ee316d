//! Storefront errors.

use thiserror::Error;

use crate::ids::{ProductId, RemoteVariationId};

/// Errors returned by a storefront repository.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The parent product does not exist in the storefront catalog.
    #[error("product {0} not found in the storefront")]
    ProductNotFound(ProductId),

    /// A variation row addressed by durable id does not exist.
    #[error("variation {0} not found in the storefront")]
    VariationNotFound(RemoteVariationId),

    /// The storefront rejected or failed the request.
    #[error("storefront request failed: {0}")]
    Backend(String),
}
