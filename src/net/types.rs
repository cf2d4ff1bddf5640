//! Wire schema for the portal API plus the session's user projection.
//!
//! DESIGN
//! ======
//! Records mirror the server's JSON shapes field for field. Relations the
//! server only includes on request (`?users=true`, `?projects=true`) are
//! `Option`s so one type covers every variant of a response.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Manager,
    Engineer,
    Customer,
    /// Any role this client does not know about yet.
    #[serde(other)]
    Other,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Engineer => "ENGINEER",
            Self::Customer => "CUSTOMER",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MANAGER" => Ok(Self::Manager),
            "ENGINEER" => Ok(Self::Engineer),
            "CUSTOMER" => Ok(Self::Customer),
            other => Err(format!("Role must be either \"MANAGER\", \"ENGINEER\" or \"CUSTOMER\", got {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Pending,
    Design,
    Build,
    Complete,
}

impl ProjectStatus {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Design, Self::Build, Self::Complete];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Design => "DESIGN",
            Self::Build => "BUILD",
            Self::Complete => "COMPLETE",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == upper)
            .ok_or_else(|| format!("unknown project status {s:?}"))
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A user as returned by `/api/users/me`, `/api/users` and `/api/user/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub admin: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub details: Option<String>,
    pub customer_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRecord>>,
}

fn default_active() -> bool {
    true
}

// =============================================================================
// SESSION USER
// =============================================================================

/// The session's view of the signed-in user, rebuilt from the remote record
/// on every identity fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub admin: bool,
    pub active: bool,
    pub project_id: Option<Uuid>,
    pub project: Option<Project>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.user_name,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            role: record.role,
            admin: record.admin,
            active: record.active,
            project_id: record.project_id,
            project: record.project,
        }
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// Login form, sent as `application/x-www-form-urlencoded`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInput {
    pub name: String,
    pub status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub customer_id: Uuid,
}

/// Body of `PATCH /api/user` (a user editing their own profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

// =============================================================================
// FORM CHECKS
// =============================================================================

/// One failing form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Default)]
struct Checks(Vec<FieldError>);

impl Checks {
    fn require(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.0.push(FieldError { field, message: message.to_owned() });
        }
    }

    fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() { Ok(()) } else { Err(self.0) }
    }
}

fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn looks_like_email(s: &str) -> bool {
    let mut parts = s.trim().split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
        && !s.contains(char::is_whitespace)
}

fn starts_with_letter(s: &str) -> bool {
    s.trim().chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn details_fit(details: Option<&String>) -> bool {
    details.map_or(true, |d| char_len(d) <= 100)
}

impl Credentials {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        checks.require(char_len(&self.username) == 8, "username", "Please enter valid username");
        checks.require(self.password.chars().count() >= 8, "password", "Password must be at least 8 characters long.");
        checks.finish()
    }
}

impl Registration {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        checks.require(looks_like_email(&self.email), "email", "Please enter a valid email");
        checks.require(char_len(&self.user_name) == 8, "user_name", "Username must be 8 characters");
        checks.require(char_len(&self.first_name) >= 1, "first_name", "Please enter your first name");
        checks.require(char_len(&self.last_name) >= 1, "last_name", "Please enter your last name");
        checks.require(
            matches!(self.role, Role::Manager | Role::Engineer | Role::Customer),
            "role",
            "Role must be either \"MANAGER\", \"ENGINEER\" or \"CUSTOMER\"",
        );
        checks.require(self.password.chars().count() >= 8, "password", "Password must be at least 8 characters long.");
        checks.require(self.password == self.confirm_password, "confirm_password", "Passwords must match!");
        checks.finish()
    }
}

impl CustomerInput {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        checks.require(char_len(&self.name) >= 3, "name", "Customer name must be at least 3 characters");
        checks.require(
            details_fit(self.details.as_ref()),
            "details",
            "Customer details must be a maximum of 100 characters",
        );
        checks.finish()
    }
}

impl ProjectInput {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        let len = char_len(&self.name);
        checks.require((3..=50).contains(&len), "name", "Project name must be between 3 and 50 characters");
        checks.require(starts_with_letter(&self.name), "name", "Project name must start with a letter");
        checks.require(
            details_fit(self.details.as_ref()),
            "details",
            "Project details must be a maximum of 100 characters",
        );
        checks.finish()
    }
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        checks.require((1..=128).contains(&char_len(&self.first_name)), "first_name", "Please enter your first name");
        checks.require((1..=128).contains(&char_len(&self.last_name)), "last_name", "Please enter your last name");
        checks.require(looks_like_email(&self.email), "email", "Please enter a valid email");
        checks.finish()
    }
}
