//! Product catalog service.

use chrono::Utc;

use crate::error::{DomainError, StorageError};

use super::{NewProduct, Product, ProductPage, ProductQuery, ProductRepository};

const DUPLICATE_PRODUCT: &str = "Product with this SKU or ASIN already exists";

/// Service for creating and browsing catalog products.
#[derive(Clone)]
pub struct ProductCatalog<P> {
    repository: P,
}

impl<P: ProductRepository> ProductCatalog<P> {
    pub fn new(repository: P) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &P {
        &self.repository
    }

    /// Validates and stores a new product.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, DomainError> {
        let product = input.into_product(Utc::now())?;

        if self.repository.exists(&product.sku, &product.asin).await? {
            return Err(DomainError::Conflict(DUPLICATE_PRODUCT.to_string()));
        }

        let product = self.repository.insert(product).await.map_err(|e| match e {
            StorageError::DuplicateKey(_) => DomainError::Conflict(DUPLICATE_PRODUCT.to_string()),
            other => other.into(),
        })?;

        metrics::counter!("products_created_total").increment(1);
        tracing::info!(sku = %product.sku, asin = %product.asin, "product created");

        Ok(product)
    }

    /// Returns one page of products, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, DomainError> {
        Ok(self.repository.list(&query).await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ErrorKind;
    use crate::product::InMemoryProductRepository;

    fn new_product(sku: &str, asin: &str, name: &str) -> NewProduct {
        serde_json::from_value(json!({
            "sku": sku,
            "asin": asin,
            "productName": name,
            "description": format!("{name} description"),
            "productWeight": 1.5,
            "length": 1.0,
            "width": 2.0,
            "height": 3.0
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_reject_duplicates() {
        let catalog = ProductCatalog::new(InMemoryProductRepository::new());
        catalog
            .create_product(new_product("S1", "A1", "Widget"))
            .await
            .unwrap();

        for (sku, asin) in [("S1", "A2"), ("S2", "A1")] {
            let err = catalog
                .create_product(new_product(sku, asin, "Other"))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(err.to_string(), DUPLICATE_PRODUCT);
        }
    }

    #[tokio::test]
    async fn test_missing_fields_is_validation() {
        let catalog = ProductCatalog::new(InMemoryProductRepository::new());
        let err = catalog
            .create_product(NewProduct::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().starts_with("Missing required fields: sku, asin"));
    }

    #[tokio::test]
    async fn test_list_search_and_pages() {
        let catalog = ProductCatalog::new(InMemoryProductRepository::new());
        for i in 0..12 {
            catalog
                .create_product(new_product(&format!("S{i}"), &format!("A{i}"), "Widget"))
                .await
                .unwrap();
        }
        catalog
            .create_product(new_product("G1", "AG1", "Gadget"))
            .await
            .unwrap();

        let first = catalog.list_products(ProductQuery::default()).await.unwrap();
        assert_eq!(first.total, 13);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.pages, 2);
        assert_eq!(first.page, 1);

        let second = catalog
            .list_products(ProductQuery {
                page: Some(2),
                ..ProductQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(second.items.len(), 3);

        let search = catalog
            .list_products(ProductQuery {
                search: Some("GADGET".into()),
                ..ProductQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(search.total, 1);
        assert_eq!(search.items[0].sku, "G1");
    }
}
