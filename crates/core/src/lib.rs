//! Orfarm Core - catalog and customer domain types.
//!
//! This crate holds the types shared by the storefront and its tests:
//! categories, products, banners, customer profiles and the small
//! validated newtypes they are built from.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no templates. Wire formats of the remote e-commerce API are
//! decoded in the storefront crate and converted into these types.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails, the category tree and catalog entities

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
