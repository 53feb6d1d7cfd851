//! Domain services built on the state container.

pub mod users;

pub use users::{CreatedUser, CredentialError, NewUser, UserDirectory, UserError, UserPatch};
