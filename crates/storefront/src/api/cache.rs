//! Cache types for catalog listings.

use super::types::{Brand, Model, Product};

/// Cache key for catalog listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Brands,
    Models,
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Brands(Vec<Brand>),
    Models(Vec<Model>),
    Products(Vec<Product>),
}
