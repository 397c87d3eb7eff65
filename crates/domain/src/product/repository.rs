//! Product storage.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::Product;

const DEFAULT_LIMIT: u32 = 10;

/// Search and pagination parameters for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    /// 1-based page; zero or absent means the first page.
    pub fn page(&self) -> u32 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Page size; zero or absent means the default of 10.
    pub fn limit(&self) -> u32 {
        self.limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Trimmed search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
}

impl ProductPage {
    pub fn new(items: Vec<Product>, total: u64, query: &ProductQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            pages: total.div_ceil(u64::from(query.limit())),
        }
    }
}

/// Storage for catalog products.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores a product; fails with [`StorageError::DuplicateKey`] if its
    /// SKU or ASIN is taken.
    async fn insert(&self, product: Product) -> Result<Product, StorageError>;

    /// Returns true if any product has this SKU or this ASIN.
    async fn exists(&self, sku: &str, asin: &str) -> Result<bool, StorageError>;

    /// Returns one page of matching products, newest first.
    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, StorageError>;
}

#[async_trait]
impl<T: ProductRepository + ?Sized> ProductRepository for Arc<T> {
    async fn insert(&self, product: Product) -> Result<Product, StorageError> {
        (**self).insert(product).await
    }

    async fn exists(&self, sku: &str, asin: &str) -> Result<bool, StorageError> {
        (**self).exists(sku, asin).await
    }

    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, StorageError> {
        (**self).list(query).await
    }
}

/// In-memory product repository.
#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: Product) -> Result<Product, StorageError> {
        let mut products = self.products.write().await;
        if products
            .iter()
            .any(|p| p.sku == product.sku || p.asin == product.asin)
        {
            return Err(StorageError::DuplicateKey(product.sku));
        }
        products.push(product.clone());
        Ok(product)
    }

    async fn exists(&self, sku: &str, asin: &str) -> Result<bool, StorageError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .any(|p| p.sku == sku || p.asin == asin))
    }

    async fn list(&self, query: &ProductQuery) -> Result<ProductPage, StorageError> {
        let products = self.products.read().await;
        let mut matching: Vec<_> = products
            .iter()
            .rev()
            .filter(|p| query.search().is_none_or(|s| p.matches(s)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok(ProductPage::new(items, total, query))
    }
}
