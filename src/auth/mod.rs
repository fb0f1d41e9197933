//! Authentication module for ManageMe.
//!
//! This module provides credential decoding, session storage, the
//! permission model, and form validation.

mod credential;
mod permission;
mod session;
pub mod validation;

pub use credential::{decode_claims, Claims};
pub use permission::{has_permission, role_name, Permission, Role};
pub use session::{
    MemoryStorage, Session, SessionStorage, SessionStore, CREDENTIAL_KEY, HIDE_INTRO_KEY,
    USER_KEY,
};
pub use validation::ValidationError;
