//! User model.

use serde::{Deserialize, Serialize};

use crate::auth::validation::ValidationError;
use crate::datetime::SECONDS_PER_DAY;

/// A recurring daily window, in seconds since midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Window start, seconds since midnight.
    pub start: u32,
    /// Window finish, seconds since midnight.
    pub finish: u32,
}

impl TimeWindow {
    /// Create a validated window.
    ///
    /// Both ends must be times of day and `start` must come before `finish`.
    ///
    /// # Examples
    ///
    /// ```
    /// use manageme::model::TimeWindow;
    ///
    /// assert!(TimeWindow::new(8 * 3600, 17 * 3600).is_ok());
    /// assert!(TimeWindow::new(17 * 3600, 8 * 3600).is_err());
    /// ```
    pub fn new(start: u32, finish: u32) -> Result<Self, ValidationError> {
        let day = SECONDS_PER_DAY as u32;
        if start >= day || finish >= day {
            return Err(ValidationError::PreferredHoursRange);
        }
        if start >= finish {
            return Err(ValidationError::PreferredHoursOrder);
        }
        Ok(Self { start, finish })
    }

    /// Window length in seconds.
    pub fn len_secs(&self) -> u32 {
        self.finish.saturating_sub(self.start)
    }
}

/// A ManageMe account as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Permission mask (see [`crate::auth::Permission`]).
    #[serde(default)]
    pub role: u32,
    /// Preferred daily working hours.
    #[serde(
        rename = "preferredHours",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub preferred_hours: Option<TimeWindow>,
}

/// Registration request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    /// Desired login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Preferred daily working hours.
    #[serde(rename = "preferredHours", skip_serializing_if = "Option::is_none")]
    pub preferred_hours: Option<TimeWindow>,
}

/// Partial user update. Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    /// New login name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// New email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Current password, required alongside `password`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_password: Option<String>,
    /// New password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New permission mask.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<u32>,
    /// New preferred hours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_hours: Option<TimeWindow>,
}
