//! FLOWZ Variation Engine
//!
//! Reconciles a variable product's variation matrix (Color × Size × …)
//! against its attribute list while preserving unsaved edits, and
//! synchronizes the result with the storefront the product lives in.

pub mod attributes;
pub mod fixtures;
pub mod ids;
pub mod matrix;
pub mod storefront;
pub mod sync;
pub mod variations;
