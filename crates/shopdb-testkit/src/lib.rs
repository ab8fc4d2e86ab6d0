//! # shopdb testkit
//!
//! Testing utilities for shopdb.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Product stores on either engine, with seeding helpers
//! - **Generators**: Proptest strategies for products and patches
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use shopdb_testkit::generators::{product_from_params, ProductParams};
//!
//! proptest! {
//!     #[test]
//!     fn product_keeps_its_name(params: ProductParams) {
//!         prop_assert_eq!(product_from_params(&params).name, params.name);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use shopdb_testkit::TestFixture;
//!
//! let fixture = TestFixture::memory().await;
//! let ids = fixture.seed_catalog().await;
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::TestFixture;
pub use generators::{product_from_params, ProductParams};
