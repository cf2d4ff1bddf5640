//! REST API client for the portal server.
//!
//! SYSTEM CONTEXT
//! ==============
//! Everything the session manager and views know about the server goes
//! through [`PortalApi`]. [`HttpApi`] is the reqwest implementation; tests
//! inject scripted implementations through the same trait.
//!
//! ERROR HANDLING
//! ==============
//! Non-2xx responses become [`ApiError`] with the status and raw body kept,
//! so callers can show the server's explanation. Nothing here retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::types::{Credentials, Customer, CustomerInput, ProfileUpdate, Project, ProjectInput, Registration, UserRecord};
use crate::config::PortalConfig;
use crate::error::{ApiError, ConfigError};

// =============================================================================
// ENDPOINTS
// =============================================================================

pub const ME_ENDPOINT: &str = "/api/users/me";
pub const LOGIN_ENDPOINT: &str = "/api/login";
pub const LOGOUT_ENDPOINT: &str = "/api/logout";
pub const USER_ENDPOINT: &str = "/api/user";
pub const USERS_ENDPOINT: &str = "/api/users";
pub const CUSTOMER_ENDPOINT: &str = "/api/customer";
pub const CUSTOMERS_ENDPOINT: &str = "/api/customers";
pub const PROJECT_ENDPOINT: &str = "/api/project";
pub const PROJECTS_ENDPOINT: &str = "/api/projects";

fn user_endpoint(user_id: Uuid) -> String {
    format!("{USER_ENDPOINT}/{user_id}")
}

fn assign_project_endpoint(user_id: Uuid, project_id: Uuid) -> String {
    format!("{USER_ENDPOINT}/{user_id}/project/{project_id}")
}

fn unassign_project_endpoint(user_id: Uuid) -> String {
    format!("{USER_ENDPOINT}/{user_id}/unassign_project")
}

fn customer_endpoint(customer_id: Uuid) -> String {
    format!("{CUSTOMER_ENDPOINT}/{customer_id}")
}

fn project_endpoint(project_id: Uuid) -> String {
    format!("{PROJECT_ENDPOINT}/{project_id}")
}

// =============================================================================
// TRAIT
// =============================================================================

/// Typed request/response pairs for every endpoint the portal uses.
#[async_trait::async_trait]
pub trait PortalApi: Send + Sync {
    /// `GET /api/users/me`
    async fn who_am_i(&self) -> Result<UserRecord, ApiError>;

    /// `POST /api/login` (form-encoded). The server answers with a session cookie.
    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError>;

    /// `POST /api/logout`
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /api/user`
    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;

    /// `PATCH /api/user`
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError>;

    /// `GET /api/users?projects=`
    async fn list_users(&self, with_projects: bool) -> Result<Vec<UserRecord>, ApiError>;

    /// `GET /api/user/{id}?project=`
    async fn get_user(&self, user_id: Uuid, with_project: bool) -> Result<UserRecord, ApiError>;

    /// `DELETE /api/user/{id}`
    async fn delete_user(&self, user_id: Uuid) -> Result<(), ApiError>;

    /// `PATCH /api/user/{id}/project/{project_id}`
    async fn assign_project(&self, user_id: Uuid, project_id: Uuid) -> Result<UserRecord, ApiError>;

    /// `PATCH /api/user/{id}/unassign_project`
    async fn unassign_project(&self, user_id: Uuid) -> Result<UserRecord, ApiError>;

    /// `GET /api/customers`
    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError>;

    /// `GET /api/customer?customer_id=`
    async fn get_customer(&self, customer_id: Uuid) -> Result<Customer, ApiError>;

    /// `POST /api/customer`
    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, ApiError>;

    /// `PUT /api/customer/{id}`
    async fn update_customer(&self, customer_id: Uuid, input: &CustomerInput) -> Result<Customer, ApiError>;

    /// `DELETE /api/customer/{id}`
    async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ApiError>;

    /// `GET /api/projects?users=`
    async fn list_projects(&self, with_users: bool) -> Result<Vec<Project>, ApiError>;

    /// `GET /api/project?project_id=`
    async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError>;

    /// `POST /api/project`
    async fn create_project(&self, input: &ProjectInput) -> Result<Project, ApiError>;

    /// `PUT /api/project/{id}`
    async fn update_project(&self, project_id: Uuid, input: &ProjectInput) -> Result<Project, ApiError>;

    /// `DELETE /api/project/{id}`
    async fn delete_project(&self, project_id: Uuid) -> Result<(), ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// reqwest-backed [`PortalApi`]. Keeps a cookie store so the session cookie
/// set by `/api/login` rides along on later calls.
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientBuild`] if reqwest cannot build a client.
    pub fn new(config: &PortalConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        tracing::debug!(%method, path, "portal api request");
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let path = response.url().path().to_owned();
        let body = response.text().await.map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            tracing::warn!(status, path = %path, "portal api request failed");
            return Err(ApiError::from_status(status, body));
        }
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        decode(&body)
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl PortalApi for HttpApi {
    async fn who_am_i(&self) -> Result<UserRecord, ApiError> {
        self.fetch(self.request(Method::GET, ME_ENDPOINT)).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, LOGIN_ENDPOINT).form(credentials))
            .await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, LOGOUT_ENDPOINT)).await
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, USER_ENDPOINT).json(registration))
            .await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        self.fetch(self.request(Method::PATCH, USER_ENDPOINT).json(update))
            .await
    }

    async fn list_users(&self, with_projects: bool) -> Result<Vec<UserRecord>, ApiError> {
        let request = self
            .request(Method::GET, USERS_ENDPOINT)
            .query(&[("projects", with_projects)]);
        self.fetch(request).await
    }

    async fn get_user(&self, user_id: Uuid, with_project: bool) -> Result<UserRecord, ApiError> {
        let request = self
            .request(Method::GET, &user_endpoint(user_id))
            .query(&[("project", with_project)]);
        self.fetch(request).await
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &user_endpoint(user_id)))
            .await
    }

    async fn assign_project(&self, user_id: Uuid, project_id: Uuid) -> Result<UserRecord, ApiError> {
        self.fetch(self.request(Method::PATCH, &assign_project_endpoint(user_id, project_id)))
            .await
    }

    async fn unassign_project(&self, user_id: Uuid) -> Result<UserRecord, ApiError> {
        self.fetch(self.request(Method::PATCH, &unassign_project_endpoint(user_id)))
            .await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.fetch(self.request(Method::GET, CUSTOMERS_ENDPOINT)).await
    }

    async fn get_customer(&self, customer_id: Uuid) -> Result<Customer, ApiError> {
        let request = self
            .request(Method::GET, CUSTOMER_ENDPOINT)
            .query(&[("customer_id", customer_id)]);
        self.fetch(request).await
    }

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, ApiError> {
        self.fetch(self.request(Method::POST, CUSTOMER_ENDPOINT).json(input))
            .await
    }

    async fn update_customer(&self, customer_id: Uuid, input: &CustomerInput) -> Result<Customer, ApiError> {
        self.fetch(self.request(Method::PUT, &customer_endpoint(customer_id)).json(input))
            .await
    }

    async fn delete_customer(&self, customer_id: Uuid) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &customer_endpoint(customer_id)))
            .await
    }

    async fn list_projects(&self, with_users: bool) -> Result<Vec<Project>, ApiError> {
        let request = self
            .request(Method::GET, PROJECTS_ENDPOINT)
            .query(&[("users", with_users)]);
        self.fetch(request).await
    }

    async fn get_project(&self, project_id: Uuid) -> Result<Project, ApiError> {
        let request = self
            .request(Method::GET, PROJECT_ENDPOINT)
            .query(&[("project_id", project_id)]);
        self.fetch(request).await
    }

    async fn create_project(&self, input: &ProjectInput) -> Result<Project, ApiError> {
        self.fetch(self.request(Method::POST, PROJECT_ENDPOINT).json(input))
            .await
    }

    async fn update_project(&self, project_id: Uuid, input: &ProjectInput) -> Result<Project, ApiError> {
        self.fetch(self.request(Method::PUT, &project_endpoint(project_id)).json(input))
            .await
    }

    async fn delete_project(&self, project_id: Uuid) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &project_endpoint(project_id)))
            .await
    }
}
