//! ManageMe - task and time tracking client core
//!
//! Session handling, role-based permissions, screen navigation and the
//! workflow controllers of the ManageMe client. Rendering and transport
//! are supplied by the embedding application through the traits in
//! [`app::views`], [`app::navigation`] and [`api`].

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod conflict;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod model;

pub use api::{ApiClient, ApiError, HttpApiClient, LoginResponse};
pub use app::{Application, MenuItem, Navigator, Screen, ScreenHost, TaskScope};
pub use auth::{
    decode_claims, has_permission, role_name, Claims, MemoryStorage, Permission, Role, Session,
    SessionStorage, SessionStore, ValidationError,
};
pub use config::Config;
pub use conflict::has_conflict;
pub use error::{ManageMeError, Result};
pub use model::{Task, TimeWindow, User};
