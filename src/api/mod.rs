//! ManageMe API client interface.
//!
//! Controllers talk to the server only through [`ApiClient`]. Each method
//! issues one logical request and resolves with the decoded response body
//! or an [`ApiError`]. The HTTP implementation lives in [`http`].

pub mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Deleted, NewUser, Task, TaskDraft, TaskQuery, User, UserPatch};
use crate::ManageMeError;

pub use http::HttpApiClient;

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Bearer credential for subsequent calls.
    pub credential: String,
    /// The signed-in user.
    pub user: User,
}

/// API call failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered 401.
    #[error("{0}")]
    Unauthorized(String),

    /// The server answered with another non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether the server rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl From<ApiError> for ManageMeError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized(message) => ManageMeError::AuthorizationDenied(message),
            other => ManageMeError::RequestFailed(other.to_string()),
        }
    }
}

/// Result type for API calls.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Remote ManageMe API.
///
/// Authenticated calls carry the current credential as a bearer token;
/// without a credential they are sent anonymously.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Exchange a username and password for a credential.
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse>;

    /// Create an account.
    async fn register_user(&self, user: &NewUser) -> ApiResult<User>;

    /// List every visible user.
    async fn list_users(&self) -> ApiResult<Vec<User>>;

    /// Every visible user, keyed by ID.
    async fn list_users_by_id(&self) -> ApiResult<HashMap<String, User>>;

    /// Fetch one user.
    async fn get_user(&self, id: &str) -> ApiResult<User>;

    /// Partially update a user.
    async fn patch_user(&self, id: &str, patch: &UserPatch) -> ApiResult<User>;

    /// Delete a user and their tasks.
    async fn delete_user(&self, id: &str) -> ApiResult<Deleted>;

    /// List tasks matching `query`.
    async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<Vec<Task>>;

    /// Create a task.
    async fn create_task(&self, task: &TaskDraft) -> ApiResult<Task>;

    /// Fetch one task.
    async fn get_task(&self, id: &str) -> ApiResult<Task>;

    /// Update a task.
    async fn patch_task(&self, id: &str, task: &TaskDraft) -> ApiResult<Task>;

    /// Delete a task.
    async fn delete_task(&self, id: &str) -> ApiResult<Deleted>;
}
