//! Cache types for catalog API responses.

use std::sync::Arc;

use orfarm_core::{Banner, Category, CategoryTree, Product, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categories,
    CategoryTree,
    Products,
    Product(ProductId),
    Banners,
}

/// Cached value types. Only successful responses are ever stored.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categories(Arc<Vec<Category>>),
    CategoryTree(Arc<CategoryTree>),
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Banners(Arc<Vec<Banner>>),
}
