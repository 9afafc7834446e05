//! Metadata catalog
//!
//! The [`Catalog`] trait is the only collaborator the scan pipeline writes
//! to. Two backends are provided:
//!
//! - [`InMemoryCatalog`] for one-shot scans and tests
//! - [`crate::adapters::postgresql::PostgresCatalog`] for catalogs that
//!   persist between runs
//!
//! [`create_catalog`] picks the backend from configuration.

pub mod clock;
pub mod factory;
pub mod memory;
pub mod traits;

pub use clock::MonotonicClock;
pub use factory::create_catalog;
pub use memory::InMemoryCatalog;
pub use traits::{like_escape, like_match, Catalog};
