//! The item entity: schema, request validation and list filters.

mod filters;
mod model;
mod validation;

pub use filters::ItemFilters;
pub use model::{Item, ItemCreate, ItemDetail, ItemId, ValidItemCreate};
pub use validation::{FieldError, ValidationError};

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
