//! Core types for the Orfarm storefront.
//!
//! This module provides type-safe wrappers for common domain concepts
//! and the catalog entities fetched from the remote API.

pub mod banner;
pub mod category;
pub mod customer;
pub mod email;
pub mod id;
pub mod price;
pub mod product;

pub use banner::Banner;
pub use category::{Category, CategoryTree, TreeError};
pub use customer::UserProfile;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use product::{Product, Review, Variation};
