//! Generic resource list: fetch, tri-state, failure handling, stale guard.
//!
//! DESIGN
//! ======
//! Customers, projects and users share one list implementation. A
//! [`Resource`] only says what it is called, whether it needs admin rights,
//! and how to fetch it; [`ResourceList`] owns the loading state and the
//! failure policy.
//!
//! Each `load` takes a generation from the list's [`ViewScope`]. A response
//! is applied only if the list is still mounted and no newer load has
//! started, so a screen that unmounts or refreshes mid-request never sees a
//! stale result.

#[cfg(test)]
#[path = "resource_test.rs"]
mod resource_test;

use tokio::sync::watch;

use super::context::ViewContext;
use super::policy::Failure;
use super::scope::ViewScope;
use crate::error::ApiError;
use crate::net::api::PortalApi;
use crate::net::types::{Customer, Project, UserRecord};

// =============================================================================
// RESOURCE
// =============================================================================

#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    /// Plural label, e.g. `"Customers"`.
    fn label(&self) -> &'static str;

    /// Singular record name, e.g. `"Customer"`.
    fn subject(&self) -> &'static str;

    fn requires_admin(&self) -> bool {
        false
    }

    async fn fetch(&self, api: &dyn PortalApi) -> Result<Vec<Self::Item>, ApiError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Customers;

#[derive(Debug, Default, Clone, Copy)]
pub struct Projects;

#[derive(Debug, Default, Clone, Copy)]
pub struct Users;

#[async_trait::async_trait]
impl Resource for Customers {
    type Item = Customer;

    fn label(&self) -> &'static str {
        "Customers"
    }

    fn subject(&self) -> &'static str {
        "Customer"
    }

    async fn fetch(&self, api: &dyn PortalApi) -> Result<Vec<Customer>, ApiError> {
        api.list_customers().await
    }
}

#[async_trait::async_trait]
impl Resource for Projects {
    type Item = Project;

    fn label(&self) -> &'static str {
        "Projects"
    }

    fn subject(&self) -> &'static str {
        "Project"
    }

    async fn fetch(&self, api: &dyn PortalApi) -> Result<Vec<Project>, ApiError> {
        api.list_projects(true).await
    }
}

#[async_trait::async_trait]
impl Resource for Users {
    type Item = UserRecord;

    fn label(&self) -> &'static str {
        "Users"
    }

    fn subject(&self) -> &'static str {
        "User"
    }

    fn requires_admin(&self) -> bool {
        true
    }

    async fn fetch(&self, api: &dyn PortalApi) -> Result<Vec<UserRecord>, ApiError> {
        api.list_users(true).await
    }
}

// =============================================================================
// LOAD STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Ready(Vec<T>),
    Failed(ApiError),
}

impl<T> LoadState<T> {
    #[must_use]
    pub fn items(&self) -> Option<&[T]> {
        match self {
            Self::Ready(items) => Some(items),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

// =============================================================================
// LIST
// =============================================================================

pub struct ResourceList<R: Resource> {
    resource: R,
    ctx: ViewContext,
    state: watch::Sender<LoadState<R::Item>>,
    scope: ViewScope,
}

impl<R: Resource> ResourceList<R> {
    #[must_use]
    pub fn new(resource: R, ctx: ViewContext) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self { resource, ctx, state, scope: ViewScope::new() }
    }

    #[must_use]
    pub fn state(&self) -> LoadState<R::Item> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoadState<R::Item>> {
        self.state.subscribe()
    }

    /// Detach the list from its screen. Responses still in flight are dropped.
    pub fn unmount(&self) {
        self.scope.unmount();
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.scope.is_mounted()
    }

    /// Fetch the items and publish the outcome.
    ///
    /// Returns the state this load settled on, or `None` when the response
    /// was discarded because the list unmounted or a newer load started.
    pub async fn load(&self) -> Option<LoadState<R::Item>> {
        let generation = self.scope.begin();
        let failure = Failure::new(format!("Error Fetching {}", self.resource.label()), self.resource.subject());

        if self.resource.requires_admin() {
            if let Err(err) = self.ctx.require_admin(&failure) {
                return self.settle(generation, LoadState::Failed(err));
            }
        }

        self.settle(generation, LoadState::Loading)?;
        let result = self.resource.fetch(self.ctx.api.as_ref()).await;

        if !self.scope.is_current(generation) {
            tracing::debug!(resource = self.resource.label(), "discarding stale response");
            return None;
        }

        let next = match result {
            Ok(items) => {
                tracing::debug!(resource = self.resource.label(), count = items.len(), "resource loaded");
                LoadState::Ready(items)
            }
            Err(err) => {
                self.ctx.report(&failure, &err);
                LoadState::Failed(err)
            }
        };
        self.settle(generation, next)
    }

    /// Drop the current items and load again.
    pub async fn refresh(&self) -> Option<LoadState<R::Item>> {
        self.load().await
    }

    fn settle(&self, generation: u64, next: LoadState<R::Item>) -> Option<LoadState<R::Item>> {
        if !self.scope.is_current(generation) {
            return None;
        }
        self.state.send_replace(next.clone());
        Some(next)
    }
}
