use super::model::Item;
use super::validation::{FieldError, ValidationError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Optional filters for listing items. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemFilters {
    /// Name prefix
    #[serde(default)]
    pub name_startswith: Option<String>,
    #[serde(default)]
    pub is_offer: Option<bool>,
    /// Inclusive lower price bound
    #[serde(default)]
    pub min_price: Option<f64>,
    /// Exclusive upper price bound
    #[serde(default)]
    pub max_price: Option<f64>,
}

impl ItemFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers priced in `[min_price, max_price)`.
    #[must_use]
    pub fn offers(min_price: Option<f64>, max_price: Option<f64>) -> Self {
        Self {
            name_startswith: None,
            is_offer: Some(true),
            min_price,
            max_price,
        }
    }

    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_startswith = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_offer(mut self, is_offer: bool) -> Self {
        self.is_offer = Some(is_offer);
        self
    }

    #[must_use]
    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = Some(min_price);
        self
    }

    #[must_use]
    pub fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Reject price bounds that are NaN or infinite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let errors: Vec<FieldError> = [("min_price", self.min_price), ("max_price", self.max_price)]
            .into_iter()
            .filter(|(_, bound)| bound.is_some_and(|b| !b.is_finite()))
            .map(|(field, _)| FieldError::new(field, "must be a finite number"))
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }

    /// Whether `item` passes every filter that is set.
    ///
    /// An item with no `is_offer` value never matches an `is_offer` filter.
    #[must_use]
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(prefix) = &self.name_startswith {
            if !item.name.starts_with(prefix.as_str()) {
                return false;
            }
        }
        if let Some(is_offer) = self.is_offer {
            if item.is_offer != Some(is_offer) {
                return false;
            }
        }
        // Unordered comparisons (NaN) never match.
        if let Some(min_price) = self.min_price {
            if !matches!(
                item.price.partial_cmp(&min_price),
                Some(Ordering::Greater | Ordering::Equal)
            ) {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if item.price.partial_cmp(&max_price) != Some(Ordering::Less) {
                return false;
            }
        }
        true
    }
}
