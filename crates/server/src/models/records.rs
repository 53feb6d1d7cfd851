//! Opaque collection records.
//!
//! Products, orders, and settings are pass-through data as far as the
//! synchronization layer is concerned: only the primary key matters for
//! upsert correctness. Every other column rides along in a flattened map.

use comanda_core::{OrderId, ProductId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A menu product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A guest order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The house settings record.
///
/// Logically a singleton: the remote collection holds at most one row,
/// conventionally with primary key 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_settings_id")]
    pub id: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const fn default_settings_id() -> i64 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: default_settings_id(),
            extra: Map::new(),
        }
    }
}
