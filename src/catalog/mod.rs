//! Catalog module - the read-mostly list of airdrop records.
//!
//! The catalog is loaded from a single document into an immutable snapshot.
//! Readers always see one whole snapshot; a reload swaps in a new one.

pub mod seed;
pub mod store;

pub use seed::{sample_airdrops, seed_banners, seed_catalog_if_absent};
pub use store::{CatalogSnapshot, CatalogStore};
