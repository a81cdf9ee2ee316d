//! Storefront persistence boundary
//!
//! The durable store behind the dashboard: a record-oriented service holding
//! the persisted variation rows of each variable product. The concrete
//! protocol is out of scope; everything the reconciliation core needs is the
//! [`repository::VariationsRepository`] trait.

pub mod errors;
pub mod memory;
pub mod records;
mod repository;

pub use errors::StorefrontError;
pub use repository::*;
