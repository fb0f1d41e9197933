//! HTTP implementation of [`ApiClient`] on top of `reqwest`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{ApiClient, ApiError, ApiResult, LoginResponse};
use crate::auth::{decode_claims, SessionStore};
use crate::config::ApiConfig;
use crate::model::{Deleted, NewUser, Task, TaskDraft, TaskQuery, User, UserPatch};
use crate::{ManageMeError, Result};

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Sign-in body. Older servers answer with the credential only.
#[derive(Debug, Deserialize)]
struct LoginBody {
    session: String,
    #[serde(default)]
    user: Option<User>,
}

/// [`ApiClient`] speaking JSON over HTTP.
///
/// The bearer credential is read from the shared [`SessionStore`] on every
/// request, so signing in or out takes effect immediately.
pub struct HttpApiClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpApiClient {
    /// Create a client for the server configured in `config`.
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ManageMeError::Config(format!("invalid API base URL {}: {e}", config.base_url))
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .read_timeout(Duration::from_secs(config.read_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ManageMeError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "API request");
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match self.session.credential() {
            Some(credential) => builder.bearer_auth(credential),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(status = status.as_u16(), %message, "API request failed");
            return Err(if status == StatusCode::UNAUTHORIZED {
                ApiError::Unauthorized(message)
            } else {
                ApiError::Status {
                    status: status.as_u16(),
                    message,
                }
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Message to show for a failed response.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

fn user_path(id: &str) -> String {
    format!("/api/users/{}", urlencoding::encode(id))
}

fn task_path(id: &str) -> String {
    format!("/api/tasks/{}", urlencoding::encode(id))
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        debug!(username, "API request: login");
        let builder = self
            .client
            .get(format!("{}/api/login", self.base_url))
            .basic_auth(username, Some(password));
        let body: LoginBody = self.send(builder).await?;

        let user = match body.user {
            Some(user) => user,
            None => {
                let claims =
                    decode_claims(&body.session).map_err(|e| ApiError::Decode(e.to_string()))?;
                let builder = self
                    .client
                    .get(format!("{}{}", self.base_url, user_path(&claims.subject)))
                    .bearer_auth(&body.session);
                self.send(builder).await?
            }
        };

        Ok(LoginResponse {
            credential: body.session,
            user,
        })
    }

    async fn register_user(&self, user: &NewUser) -> ApiResult<User> {
        self.send(self.request(Method::POST, "/api/users").json(user))
            .await
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.send(self.request(Method::GET, "/api/users")).await
    }

    async fn list_users_by_id(&self) -> ApiResult<HashMap<String, User>> {
        self.send(
            self.request(Method::GET, "/api/users")
                .query(&[("mapped", "true")]),
        )
        .await
    }

    async fn get_user(&self, id: &str) -> ApiResult<User> {
        self.send(self.request(Method::GET, &user_path(id))).await
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> ApiResult<User> {
        self.send(self.request(Method::PATCH, &user_path(id)).json(patch))
            .await
    }

    async fn delete_user(&self, id: &str) -> ApiResult<Deleted> {
        self.send(self.request(Method::DELETE, &user_path(id)))
            .await
    }

    async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<Vec<Task>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(owner) = &query.owner {
            params.push(("userID", owner.clone()));
        }
        if let Some(from) = query.from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = query.to {
            params.push(("to", to.to_string()));
        }
        self.send(self.request(Method::GET, "/api/tasks").query(&params))
            .await
    }

    async fn create_task(&self, task: &TaskDraft) -> ApiResult<Task> {
        self.send(self.request(Method::POST, "/api/tasks").json(task))
            .await
    }

    async fn get_task(&self, id: &str) -> ApiResult<Task> {
        self.send(self.request(Method::GET, &task_path(id))).await
    }

    async fn patch_task(&self, id: &str, task: &TaskDraft) -> ApiResult<Task> {
        self.send(self.request(Method::PATCH, &task_path(id)).json(task))
            .await
    }

    async fn delete_task(&self, id: &str) -> ApiResult<Deleted> {
        self.send(self.request(Method::DELETE, &task_path(id)))
            .await
    }
}
