//! User directory.
//!
//! All user lifecycle rules live here: identity lookup by email
//! (case-insensitive), id assignment, the role-based password policy,
//! and credential validation. Every mutation goes through the
//! [`StateContainer`]'s update primitive; this service never touches
//! the remote store.

use comanda_core::{CommentCategory, Email, UserId, UserRole};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::container::StateContainer;
use crate::models::User;

/// Length of generated temporary passwords.
const TEMP_PASSWORD_LENGTH: usize = 8;

/// Failure creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    /// Another user already owns this email (compared case-insensitively).
    #[error("a user with email {0} already exists")]
    EmailTaken(String),
}

/// Expected business outcomes of a credential check.
///
/// These are results, not faults: a wrong password is a normal answer,
/// so the variants are returned rather than logged or captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("user not found")]
    UserNotFound,
    #[error("user does not have the required role")]
    RoleMismatch,
    #[error("incorrect password")]
    BadCredentials,
}

/// Input for [`UserDirectory::add_user`]: a user without an id or any
/// credential fields, which the directory assigns itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub cedula: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub comment_category: Option<CommentCategory>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Partial update for [`UserDirectory::update_user`].
///
/// Deliberately has no id, password, or temporary-password members:
/// credentials change only through the password policy and
/// [`UserDirectory::reset_password`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub cedula: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub comment_category: Option<CommentCategory>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A freshly created user, with the one-time plaintext of a generated
/// temporary password when the policy produced one.
#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub user: User,
    /// Returned exactly once, for out-of-band delivery. Never readable
    /// again through the directory.
    pub temp_password: Option<String>,
}

/// A successfully validated user.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUser {
    pub user: User,
    /// Whether the password used is still a generated temporary one.
    pub temporary_password: bool,
}

/// User lifecycle operations over the shared state container.
#[derive(Clone)]
pub struct UserDirectory {
    container: StateContainer,
}

impl UserDirectory {
    #[must_use]
    pub const fn new(container: StateContainer) -> Self {
        Self { container }
    }

    /// Look up a user by email, ignoring case.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        if email.is_empty() {
            return None;
        }
        self.container
            .snapshot()
            .users
            .into_iter()
            .find(|user| user.email.matches(email))
    }

    /// Create a user.
    ///
    /// Assigns `id = max(existing ids) + 1` (ids are never reused) and
    /// applies the password policy in order:
    ///
    /// 1. clients get no password at all;
    /// 2. waiters with a cedula use the cedula as their password;
    /// 3. everyone else (admins, waiters without a cedula) gets a
    ///    generated temporary password, returned once in plaintext.
    ///
    /// The user collection stays sorted by id.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::EmailTaken`] if another user already has
    /// the email, compared case-insensitively.
    pub fn add_user(&self, data: NewUser) -> Result<CreatedUser, UserError> {
        let mut created = None;
        self.container.try_update(|mut snapshot| {
            if snapshot
                .users
                .iter()
                .any(|user| user.email.matches(data.email.as_str()))
            {
                return Err(UserError::EmailTaken(data.email.to_string()));
            }

            let next_id = snapshot
                .users
                .iter()
                .map(|user| user.id.as_i64())
                .max()
                .unwrap_or(0)
                + 1;

            let (password, temporary_password, temp_password) =
                assign_password(data.role, data.cedula.as_deref());

            let user = User {
                id: UserId::new(next_id),
                name: data.name.clone(),
                email: data.email.clone(),
                phone: data.phone.clone(),
                password,
                role: data.role,
                temporary_password,
                cedula: data.cedula.clone(),
                birth_date: data.birth_date.clone(),
                address: data.address.clone(),
                emergency_contact: data.emergency_contact.clone(),
                comment_category: data.comment_category,
                comment: data.comment.clone(),
            };

            snapshot.users.push(user.clone());
            snapshot.users.sort_by_key(|user| user.id);
            created = Some(CreatedUser {
                user,
                temp_password,
            });
            Ok(snapshot)
        })?;

        Ok(created.expect("committed transform recorded the new user"))
    }

    /// Merge `patch` into the user with `id`.
    ///
    /// If the resulting role is waiter and the patch carried a cedula,
    /// the password is forced to the new cedula and the temporary flag
    /// cleared, keeping staff passwords in sync with their identity
    /// document.
    ///
    /// Returns `false` (and changes nothing) if no user has `id`.
    pub fn update_user(&self, id: UserId, patch: UserPatch) -> bool {
        let mut updated = false;
        self.container.update(|mut snapshot| {
            let cedula_changed = matches!(patch.cedula.as_deref(), Some(c) if !c.is_empty());
            if let Some(user) = snapshot.users.iter_mut().find(|user| user.id == id) {
                apply_patch(user, &patch);
                if user.role == UserRole::Waiter && cedula_changed {
                    user.password.clone_from(&user.cedula);
                    user.temporary_password = false;
                }
                updated = true;
            }
            snapshot
        });
        updated
    }

    /// Remove the user with `id`. Returns `false` if not found.
    pub fn delete_user(&self, id: UserId) -> bool {
        let mut removed = false;
        self.container.update(|mut snapshot| {
            let before = snapshot.users.len();
            snapshot.users.retain(|user| user.id != id);
            removed = snapshot.users.len() != before;
            snapshot
        });
        removed
    }

    /// Check an email/password pair, optionally requiring a role.
    ///
    /// Clients always pass the password check; every other role must
    /// match the stored password exactly.
    ///
    /// # Errors
    ///
    /// [`CredentialError::UserNotFound`] if no user matches the email,
    /// [`CredentialError::RoleMismatch`] if `required_role` differs from
    /// the user's, [`CredentialError::BadCredentials`] on a wrong
    /// password.
    pub fn validate_credentials(
        &self,
        email: &str,
        password: &str,
        required_role: Option<UserRole>,
    ) -> Result<ValidatedUser, CredentialError> {
        let user = self
            .find_by_email(email)
            .ok_or(CredentialError::UserNotFound)?;

        if let Some(required) = required_role
            && user.role != required
        {
            return Err(CredentialError::RoleMismatch);
        }

        if user.role.requires_password() && !password_matches(user.password.as_deref(), password) {
            return Err(CredentialError::BadCredentials);
        }

        Ok(ValidatedUser {
            temporary_password: user.temporary_password,
            user,
        })
    }

    /// Set a new password for the user with `email` and clear the
    /// temporary flag. Returns `false` if the email is unknown.
    pub fn reset_password(&self, email: &str, new_password: &str) -> bool {
        let mut updated = false;
        self.container.update(|mut snapshot| {
            if let Some(user) = snapshot
                .users
                .iter_mut()
                .find(|user| user.email.matches(email))
            {
                user.password = Some(new_password.to_owned());
                user.temporary_password = false;
                updated = true;
            }
            snapshot
        });
        updated
    }
}

/// Role-based password assignment: `(password, temporary flag,
/// plaintext to hand back once)`.
fn assign_password(
    role: UserRole,
    cedula: Option<&str>,
) -> (Option<String>, bool, Option<String>) {
    match (role, cedula) {
        (UserRole::Client, _) => (None, false, None),
        (UserRole::Waiter, Some(cedula)) if !cedula.is_empty() => {
            (Some(cedula.to_owned()), false, None)
        }
        _ => {
            let generated = generate_temp_password();
            (Some(generated.clone()), true, Some(generated))
        }
    }
}

fn apply_patch(user: &mut User, patch: &UserPatch) {
    if let Some(name) = &patch.name {
        user.name.clone_from(name);
    }
    if let Some(email) = &patch.email {
        user.email = email.clone();
    }
    if let Some(phone) = &patch.phone {
        user.phone = Some(phone.clone());
    }
    if let Some(role) = patch.role {
        user.role = role;
    }
    if let Some(cedula) = &patch.cedula {
        user.cedula = Some(cedula.clone());
    }
    if let Some(birth_date) = &patch.birth_date {
        user.birth_date = Some(birth_date.clone());
    }
    if let Some(address) = &patch.address {
        user.address = Some(address.clone());
    }
    if let Some(emergency_contact) = &patch.emergency_contact {
        user.emergency_contact = Some(emergency_contact.clone());
    }
    if let Some(comment_category) = patch.comment_category {
        user.comment_category = Some(comment_category);
    }
    if let Some(comment) = &patch.comment {
        user.comment = Some(comment.clone());
    }
}

/// The single seam for credential comparison.
///
/// Plaintext equality mirrors the simulation-grade credential model of
/// the data it synchronizes; swap this for a hash verification without
/// touching any call site.
fn password_matches(stored: Option<&str>, supplied: &str) -> bool {
    stored == Some(supplied)
}

/// Generate a random alphanumeric temporary password.
fn generate_temp_password() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..TEMP_PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}
