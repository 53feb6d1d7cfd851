//! User record.

use comanda_core::{CommentCategory, Email, UserId, UserRole};
use serde::{Deserialize, Serialize};

/// A user account.
///
/// Covers staff (admins, waiters) and restaurant clients alike. Field
/// names on the wire are camelCase to match the remote store's columns.
///
/// `password` and `temporary_password` are managed exclusively by the
/// [`UserDirectory`](crate::services::users::UserDirectory): clients have
/// no password, waiters use their cedula, and everyone else gets a
/// generated temporary password that must be reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub temporary_password: bool,
    /// National ID. Required for waiters, doubles as their password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cedula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_category: Option<CommentCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId::new(3),
            name: "Marta".to_owned(),
            email: Email::parse("marta@example.com").unwrap(),
            phone: None,
            password: Some("12345678".to_owned()),
            role: UserRole::Waiter,
            temporary_password: false,
            cedula: Some("12345678".to_owned()),
            birth_date: None,
            address: None,
            emergency_contact: None,
            comment_category: None,
            comment: None,
        }
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json.get("temporaryPassword"), Some(&false.into()));
        assert_eq!(json.get("role"), Some(&"waiter".into()));
        assert!(json.get("temporary_password").is_none());
        // Unset optionals are omitted entirely
        assert!(json.get("birthDate").is_none());
    }

    #[test]
    fn test_deserializes_sparse_rows() {
        // Remote rows may omit every optional column
        let user: User = serde_json::from_str(
            r#"{"id": 1, "name": "Ana", "email": "ana@example.com", "role": "client"}"#,
        )
        .unwrap();
        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.role, UserRole::Client);
        assert!(user.password.is_none());
        assert!(!user.temporary_password);
    }
}
