//! Product catalog.

mod catalog;
mod model;
mod postgres;
mod repository;

pub use catalog::ProductCatalog;
pub use model::{
    DescriptionInput, DimensionUnit, NewProduct, Product, ProductDescription, ProductDimensions,
    WeightUnit,
};
pub use postgres::PostgresProductRepository;
pub use repository::{InMemoryProductRepository, ProductPage, ProductQuery, ProductRepository};

use thiserror::Error;

/// Maximum length of a product's short description, in characters.
pub const SHORT_DESCRIPTION_MAX: usize = 160;

/// Errors produced when validating a new product.
#[derive(Debug, Error)]
pub enum ProductError {
    /// One or more required fields are absent or blank.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Short description must be at most 160 characters (got {length})")]
    ShortDescriptionTooLong { length: usize },

    /// A weight or dimension is negative or not a number.
    #[error("{field} must be a non-negative number")]
    InvalidMeasurement { field: &'static str },
}
