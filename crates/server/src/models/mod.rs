//! Domain models for the Comanda server.
//!
//! Records mirror the rows of the remote collection store. [`User`] is
//! fully typed; products, orders, and settings carry their primary key
//! plus an opaque remainder so unknown columns survive a round-trip.

pub mod records;
pub mod user;

pub use records::{Order, Product, Settings};
pub use user::User;

use serde::{Deserialize, Serialize};

/// The full in-memory value of all four collections at one instant.
///
/// This is the unit of state held by the
/// [`StateContainer`](crate::container::StateContainer) and the body shape
/// of `GET /data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub users: Vec<User>,
    pub orders: Vec<Order>,
    pub settings: Settings,
}
