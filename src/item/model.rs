use super::validation::{FieldError, ValidationError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an item: a random (v4) UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub is_offer: Option<bool>,
    /// Set once, when the item is first stored.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Build a new item from validated fields, stamping `created_at` with now.
    #[must_use]
    pub fn new(id: ItemId, fields: ValidItemCreate) -> Self {
        Self {
            id,
            name: fields.name,
            price: fields.price,
            is_offer: fields.is_offer,
            created_at: Utc::now(),
        }
    }

    /// Flat record of the item, used for mirror documents and CSV rows.
    ///
    /// Keys keep the order `id, name, price, is_offer, created_at`.
    #[must_use]
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = Map::new();
        record.insert("id".to_string(), Value::String(self.id.to_string()));
        record.insert("name".to_string(), Value::String(self.name.clone()));
        record.insert("price".to_string(), Value::from(self.price));
        record.insert(
            "is_offer".to_string(),
            self.is_offer.map_or(Value::Null, Value::Bool),
        );
        record.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        record
    }
}

fn default_is_offer() -> Option<bool> {
    Some(false)
}

/// Body of a create request.
///
/// Required fields are optional here so that a missing field is reported as
/// a field error by [`ItemCreate::validate`] rather than a parse failure.
/// An absent `is_offer` defaults to `false`; an explicit `null` stays unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_is_offer")]
    pub is_offer: Option<bool>,
}

impl ItemCreate {
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            price: Some(price),
            is_offer: default_is_offer(),
        }
    }

    #[must_use]
    pub fn with_offer(mut self, is_offer: bool) -> Self {
        self.is_offer = Some(is_offer);
        self
    }

    /// Check required fields and that `price` is a positive finite number.
    pub fn validate(self) -> Result<ValidItemCreate, ValidationError> {
        let mut errors = Vec::new();

        if self.name.is_none() {
            errors.push(FieldError::new("name", "field required"));
        }

        match self.price {
            None => errors.push(FieldError::new("price", "field required")),
            Some(price) if !price.is_finite() => {
                errors.push(FieldError::new("price", "value is not a finite number"));
            }
            Some(price) if price <= 0.0 => {
                errors.push(FieldError::new("price", "ensure this value is greater than 0"));
            }
            Some(_) => {}
        }

        match (self.name, self.price) {
            (Some(name), Some(price)) if errors.is_empty() => Ok(ValidItemCreate {
                name,
                price,
                is_offer: self.is_offer,
            }),
            _ => Err(ValidationError::new(errors)),
        }
    }
}

/// Create request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidItemCreate {
    pub name: String,
    pub price: f64,
    pub is_offer: Option<bool>,
}

/// Item as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub is_offer: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl From<&Item> for ItemDetail {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            is_offer: item.is_offer,
            created_at: item.created_at,
        }
    }
}

impl From<Item> for ItemDetail {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            price: item.price,
            is_offer: item.is_offer,
            created_at: item.created_at,
        }
    }
}
