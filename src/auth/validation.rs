//! Input validation for ManageMe forms.
//!
//! Every form read from a view is validated here before any request is
//! issued. A failed validation blocks the action and its message is shown
//! to the user as-is.

use thiserror::Error;
use validator::ValidateEmail;

use crate::auth::permission::Role;
use crate::model::{NewUser, TimeWindow, UserPatch};

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username is empty.
    #[error("Must specify a username")]
    UsernameEmpty,

    /// Password is empty.
    #[error("Must specify a password")]
    PasswordEmpty,

    /// Email is empty or malformed.
    #[error("Invalid email")]
    EmailInvalid,

    /// Password and its confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Preferred hours start is not before finish.
    #[error("Preferred Hours start time must be less than finish")]
    PreferredHoursOrder,

    /// Preferred hours fall outside a single day.
    #[error("Preferred Hours must be times of day")]
    PreferredHoursRange,

    /// Role name is not one of the canonical roles.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// Task title is empty.
    #[error("Task title must not be empty")]
    TitleEmpty,

    /// Task starts after it finishes.
    #[error("Task start must not be after finish")]
    TaskWindowOrder,

    /// Task has no owner.
    #[error("Task must have an owner")]
    OwnerMissing,

    /// Filter range is reversed.
    #[error("Filter start must not be after its end")]
    FilterRangeOrder,

    /// Delete confirmation did not match the task title.
    #[error("Wrong title, please try again")]
    TitleMismatch,

    /// Message reported by the view itself (e.g. an unparsable time field).
    #[error("{0}")]
    View(String),
}

/// Validate that a username is present.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameEmpty);
    }
    Ok(())
}

/// Validate that a password is present.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordEmpty);
    }
    Ok(())
}

/// Validate an email address.
///
/// # Examples
///
/// ```
/// use manageme::auth::validation::validate_email;
///
/// assert!(validate_email("jane@example.com").is_ok());
/// assert!(validate_email("jane").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || !email.validate_email() {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

/// Validate that a password was typed the same way twice.
pub fn validate_confirmation(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Build a preferred-hours window from optional form fields.
///
/// Preferred hours are optional: unless both ends are filled in, no window
/// is produced. When both are present they must form a valid window.
pub fn preferred_hours(
    start: Option<u32>,
    finish: Option<u32>,
) -> Result<Option<TimeWindow>, ValidationError> {
    match (start, finish) {
        (Some(start), Some(finish)) => TimeWindow::new(start, finish).map(Some),
        _ => Ok(None),
    }
}

/// Sign-in form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl LoginForm {
    /// Create a new login form.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Validate that both fields are filled in.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
    /// Password typed a second time.
    pub confirm_password: String,
    /// Preferred hours start, seconds since midnight.
    pub preferred_start: Option<u32>,
    /// Preferred hours finish, seconds since midnight.
    pub preferred_finish: Option<u32>,
}

impl RegisterForm {
    /// Validate the form and turn it into a registration request.
    pub fn into_new_user(self) -> Result<NewUser, ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_confirmation(&self.password, &self.confirm_password)?;
        let preferred_hours = preferred_hours(self.preferred_start, self.preferred_finish)?;

        Ok(NewUser {
            username: self.username,
            email: self.email,
            password: self.password,
            preferred_hours,
        })
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Selected role name, if the role field was shown.
    pub role: Option<String>,
    /// Current password (required by the server when changing it).
    pub old_password: String,
    /// New password; empty keeps the current one.
    pub new_password: String,
    /// New password typed a second time.
    pub confirm_password: String,
    /// Preferred hours start, seconds since midnight.
    pub preferred_start: Option<u32>,
    /// Preferred hours finish, seconds since midnight.
    pub preferred_finish: Option<u32>,
}

impl ProfileForm {
    /// Validate the form and shape it into a user patch.
    ///
    /// Password fields are only sent when a new password was entered. The
    /// role is only sent when `may_change_role` is set; otherwise the field
    /// is ignored even if the view supplied one.
    pub fn into_patch(self, may_change_role: bool) -> Result<UserPatch, ValidationError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        if !self.new_password.is_empty() {
            validate_confirmation(&self.new_password, &self.confirm_password)?;
        }
        let preferred_hours = preferred_hours(self.preferred_start, self.preferred_finish)?;

        let role = match self.role.as_deref().map(str::trim) {
            Some(name) if may_change_role && !name.is_empty() => {
                let role: Role = name
                    .parse()
                    .map_err(|_| ValidationError::UnknownRole(name.to_string()))?;
                Some(role.mask_bits())
            }
            _ => None,
        };

        let (old_password, password) = if self.new_password.is_empty() {
            (None, None)
        } else {
            (Some(self.old_password), Some(self.new_password))
        };

        Ok(UserPatch {
            username: Some(self.username),
            email: Some(self.email),
            old_password,
            password,
            role,
            preferred_hours,
        })
    }
}
