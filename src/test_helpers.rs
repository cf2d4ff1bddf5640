//! Fixtures and scripted collaborators shared by unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Notify;
use uuid::Uuid;

use crate::error::ApiError;
use crate::nav::{Navigator, Route};
use crate::net::api::PortalApi;
use crate::net::types::{
    Credentials, Customer, CustomerInput, ProfileUpdate, Project, ProjectInput, Registration, User, UserRecord,
};
use crate::session::SessionManager;
use crate::toast::{Notifier, Toast};
use crate::views::ViewContext;

// =============================================================================
// FIXTURES
// =============================================================================

pub const ALICE_ID: Uuid = Uuid::from_u128(0xa11ce);
pub const BOB_ID: Uuid = Uuid::from_u128(0xb0b);

pub fn user_json(id: Uuid, user_name: &str, admin: bool) -> Value {
    json!({
        "id": id,
        "user_name": user_name,
        "first_name": "Test",
        "last_name": "User",
        "email": format!("{user_name}@example.com"),
        "role": if admin { "MANAGER" } else { "ENGINEER" },
        "admin": admin,
        "active": true,
        "project_id": null,
        "project": null
    })
}

pub fn alice_json(admin: bool) -> Value {
    user_json(ALICE_ID, "alice123", admin)
}

pub fn user_record(id: Uuid, user_name: &str, admin: bool) -> UserRecord {
    serde_json::from_value(user_json(id, user_name, admin)).unwrap()
}

pub fn sample_user(admin: bool) -> User {
    User::from(user_record(ALICE_ID, "alice123", admin))
}

pub fn customer_json(n: u128, name: &str) -> Value {
    json!({ "id": Uuid::from_u128(n), "name": name, "details": null, "active": true })
}

pub fn project_json(n: u128, name: &str, status: &str, users: &[Value]) -> Value {
    json!({
        "id": Uuid::from_u128(n),
        "name": name,
        "status": status,
        "details": null,
        "customer_id": Uuid::from_u128(1),
        "users": users
    })
}

pub fn credentials() -> Credentials {
    Credentials { username: "alice123".into(), password: "goodpass".into() }
}

pub fn unauthorized() -> ApiError {
    ApiError::Unauthorized { body: r#"{"detail":"Not authenticated"}"#.into() }
}

// =============================================================================
// MOCK API
// =============================================================================

/// [`PortalApi`] that replays scripted responses per operation name.
///
/// Unscripted calls to unit-returning operations succeed; anything else
/// fails with a 500 so a missing script is loud.
#[derive(Default)]
pub struct MockApi {
    responses: Mutex<HashMap<&'static str, VecDeque<Result<Value, ApiError>>>>,
    calls: Mutex<Vec<&'static str>>,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, op: &'static str, value: Value) {
        self.responses.lock().unwrap().entry(op).or_default().push_back(Ok(value));
    }

    pub fn push_err(&self, op: &'static str, err: ApiError) {
        self.responses.lock().unwrap().entry(op).or_default().push_back(Err(err));
    }

    /// Make every subsequent call wait until the returned handle is notified.
    pub fn hold_responses(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    async fn respond<T: DeserializeOwned>(&self, op: &'static str) -> Result<T, ApiError> {
        self.calls.lock().unwrap().push(op);
        let hold = self.hold.lock().unwrap().clone();
        if let Some(notify) = hold {
            notify.notified().await;
        }
        let next = self.responses.lock().unwrap().get_mut(op).and_then(VecDeque::pop_front);
        match next {
            Some(Ok(value)) => serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string())),
            Some(Err(err)) => Err(err),
            None => serde_json::from_value(Value::Null)
                .map_err(|_| ApiError::Status { status: 500, body: format!("no scripted response for {op}") }),
        }
    }
}

#[async_trait::async_trait]
impl PortalApi for MockApi {
    async fn who_am_i(&self) -> Result<UserRecord, ApiError> {
        self.respond("who_am_i").await
    }

    async fn login(&self, _credentials: &Credentials) -> Result<(), ApiError> {
        self.respond("login").await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.respond("logout").await
    }

    async fn register(&self, _registration: &Registration) -> Result<(), ApiError> {
        self.respond("register").await
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<UserRecord, ApiError> {
        self.respond("update_profile").await
    }

    async fn list_users(&self, _with_projects: bool) -> Result<Vec<UserRecord>, ApiError> {
        self.respond("list_users").await
    }

    async fn get_user(&self, _user_id: Uuid, _with_project: bool) -> Result<UserRecord, ApiError> {
        self.respond("get_user").await
    }

    async fn delete_user(&self, _user_id: Uuid) -> Result<(), ApiError> {
        self.respond("delete_user").await
    }

    async fn assign_project(&self, _user_id: Uuid, _project_id: Uuid) -> Result<UserRecord, ApiError> {
        self.respond("assign_project").await
    }

    async fn unassign_project(&self, _user_id: Uuid) -> Result<UserRecord, ApiError> {
        self.respond("unassign_project").await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.respond("list_customers").await
    }

    async fn get_customer(&self, _customer_id: Uuid) -> Result<Customer, ApiError> {
        self.respond("get_customer").await
    }

    async fn create_customer(&self, _input: &CustomerInput) -> Result<Customer, ApiError> {
        self.respond("create_customer").await
    }

    async fn update_customer(&self, _customer_id: Uuid, _input: &CustomerInput) -> Result<Customer, ApiError> {
        self.respond("update_customer").await
    }

    async fn delete_customer(&self, _customer_id: Uuid) -> Result<(), ApiError> {
        self.respond("delete_customer").await
    }

    async fn list_projects(&self, _with_users: bool) -> Result<Vec<Project>, ApiError> {
        self.respond("list_projects").await
    }

    async fn get_project(&self, _project_id: Uuid) -> Result<Project, ApiError> {
        self.respond("get_project").await
    }

    async fn create_project(&self, _input: &ProjectInput) -> Result<Project, ApiError> {
        self.respond("create_project").await
    }

    async fn update_project(&self, _project_id: Uuid, _input: &ProjectInput) -> Result<Project, ApiError> {
        self.respond("update_project").await
    }

    async fn delete_project(&self, _project_id: Uuid) -> Result<(), ApiError> {
        self.respond("delete_project").await
    }
}

// =============================================================================
// RECORDERS
// =============================================================================

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes.lock().unwrap().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.toasts.lock().unwrap().iter().map(|t| t.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

// =============================================================================
// HARNESS
// =============================================================================

pub const LOGOUT_DELAY: Duration = Duration::from_millis(2000);

/// A mounted session for alice plus recorders, ready for view-model tests.
pub struct Harness {
    pub ctx: ViewContext,
    pub api: Arc<MockApi>,
    pub nav: Arc<RecordingNavigator>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub async fn signed_in(admin: bool) -> Self {
        let api = MockApi::new();
        let nav = RecordingNavigator::new();
        let notifier = RecordingNotifier::new();
        api.push_ok("who_am_i", alice_json(admin));
        let session = Arc::new(SessionManager::new(api.clone(), nav.clone()));
        session.mount().await;
        let ctx = ViewContext::new(api.clone(), session, notifier.clone(), LOGOUT_DELAY);
        Self { ctx, api, nav, notifier }
    }
}
