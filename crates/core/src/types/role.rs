//! User role and guest comment category enums.

use serde::{Deserialize, Serialize};

/// Role of a user account.
///
/// The role drives the password-assignment policy: clients have no
/// password at all, waiters use their national ID (cedula), and admins
/// receive a generated temporary password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Waiter,
    Client,
}

impl UserRole {
    /// Whether accounts with this role authenticate with a password.
    #[must_use]
    pub const fn requires_password(self) -> bool {
        !matches!(self, Self::Client)
    }
}

/// Category of a guest comment left on a client profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentCategory {
    Queja,
    Solicitud,
    Felicitacion,
    ObjetoPerdido,
}
