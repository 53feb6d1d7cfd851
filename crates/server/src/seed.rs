//! First-run seed payloads.
//!
//! Used in exactly two situations: to populate an empty remote
//! collection on first run, and as the in-memory fallback when the
//! remote store cannot be read at all. Orders always start empty.

use comanda_core::{Email, ProductId, UserId, UserRole};
use serde_json::{Map, Value, json};

use crate::models::{Product, Settings, Snapshot, User};

/// Default datasets for the seedable collections.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub settings: Settings,
}

impl SeedData {
    /// The all-default snapshot served when the remote store is
    /// unreachable: seed products and users, no orders, seed settings.
    #[must_use]
    pub fn default_snapshot(&self) -> Snapshot {
        Snapshot {
            products: self.products.clone(),
            users: self.users.clone(),
            orders: Vec::new(),
            settings: self.settings.clone(),
        }
    }
}

impl Default for SeedData {
    fn default() -> Self {
        Self {
            products: vec![
                product(1, "Café americano", 2.5, "bebidas"),
                product(2, "Arepa rellena", 4.0, "platos"),
                product(3, "Jugo natural", 3.0, "bebidas"),
            ],
            users: vec![bootstrap_admin()],
            settings: Settings {
                id: 1,
                extra: fields(&[
                    ("restaurantName", json!("Comanda")),
                    ("currency", json!("COP")),
                    ("taxRate", json!(0.08)),
                    ("tableCount", json!(12)),
                ]),
            },
        }
    }
}

fn fields(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_owned(), value.clone()))
        .collect()
}

fn product(id: i64, name: &str, price: f64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        extra: fields(&[
            ("name", json!(name)),
            ("price", json!(price)),
            ("category", json!(category)),
            ("available", json!(true)),
        ]),
    }
}

/// The initial administrator.
///
/// Ships with a well-known password flagged as temporary so the first
/// login forces a reset.
fn bootstrap_admin() -> User {
    User {
        id: UserId::new(1),
        name: "Administrador".to_owned(),
        email: Email::parse("admin@comanda.app").expect("bootstrap admin email is valid"),
        phone: None,
        password: Some("cambiame1".to_owned()),
        role: UserRole::Admin,
        temporary_password: true,
        cedula: None,
        birth_date: None,
        address: None,
        emergency_contact: None,
        comment_category: None,
        comment: None,
    }
}
