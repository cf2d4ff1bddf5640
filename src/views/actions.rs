//! Mutations behind the portal's cards and forms.
//!
//! DESIGN
//! ======
//! Every action except profile editing is admin-only and is refused locally
//! (notice, no request) when the session user lacks the flag. Success emits a
//! toast; failure goes through the shared error policy, so a 401 here expires
//! the session exactly as it does for a list fetch.

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use std::future::Future;

use tokio::task::JoinHandle;

use super::context::ViewContext;
use super::policy::Failure;
use crate::error::ApiError;
use crate::net::types::{Customer, CustomerInput, ProfileUpdate, Project, ProjectInput, User, UserRecord};
use crate::toast::Toast;

const SUCCESS_TITLE: &str = "Success";

/// How a user deletion ended for the person who requested it.
#[derive(Debug)]
pub enum UserDeletion {
    Deleted,
    /// The caller deleted their own account; the handle resolves once the
    /// forced logout has run.
    DeletedSelf(JoinHandle<()>),
}

pub struct Actions {
    ctx: ViewContext,
}

impl Actions {
    #[must_use]
    pub fn new(ctx: ViewContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // CUSTOMERS
    // =========================================================================

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, ApiError> {
        let failure = Failure::new("Error - Cannot Create Customer!", "Customer");
        let customer = self.admin(&failure, || self.ctx.api.create_customer(input)).await?;
        self.success("Customer successfully created");
        Ok(customer)
    }

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn update_customer(&self, customer: &Customer, input: &CustomerInput) -> Result<Customer, ApiError> {
        let failure = Failure::new("Error - Cannot Update Customer!", "Customer");
        let updated = self
            .admin(&failure, || self.ctx.api.update_customer(customer.id, input))
            .await?;
        self.success("Customer successfully updated");
        Ok(updated)
    }

    /// Deleting a customer removes its projects too.
    ///
    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn delete_customer(&self, customer: &Customer) -> Result<(), ApiError> {
        let failure = Failure::new("Error - Cannot Delete Customer!", "Customer");
        self.admin(&failure, || self.ctx.api.delete_customer(customer.id))
            .await?;
        self.success(format!("{} and associated projects successfully deleted", customer.name));
        Ok(())
    }

    // =========================================================================
    // PROJECTS
    // =========================================================================

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn create_project(&self, input: &ProjectInput) -> Result<Project, ApiError> {
        let failure = Failure::new("Error - Cannot Create Project!", "Project");
        let project = self.admin(&failure, || self.ctx.api.create_project(input)).await?;
        self.success("Project successfully created");
        Ok(project)
    }

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn update_project(&self, project: &Project, input: &ProjectInput) -> Result<Project, ApiError> {
        let failure = Failure::new("Error - Cannot Update Project!", "Project");
        let updated = self
            .admin(&failure, || self.ctx.api.update_project(project.id, input))
            .await?;
        self.success("Project successfully updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn delete_project(&self, project: &Project) -> Result<(), ApiError> {
        let failure = Failure::new("Error Deleting Project", "Project");
        self.admin(&failure, || self.ctx.api.delete_project(project.id))
            .await?;
        self.success(format!("{} deleted", project.name));
        Ok(())
    }

    // =========================================================================
    // USERS
    // =========================================================================

    /// Delete a member. Deleting the signed-in account schedules a logout
    /// after the notice delay.
    ///
    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn delete_user(&self, member: &UserRecord) -> Result<UserDeletion, ApiError> {
        let failure = Failure::new("Error Deleting User", "User");
        self.admin(&failure, || self.ctx.api.delete_user(member.id))
            .await?;

        let is_self = self
            .ctx
            .session
            .current_user()
            .is_some_and(|user| user.id == member.id);
        if !is_self {
            self.success(format!("{} deleted", member.user_name));
            return Ok(UserDeletion::Deleted);
        }

        tracing::info!(user_name = %member.user_name, "signed-in account deleted; logging out");
        self.success(format!("{} deleted. You will now be logged out.", member.user_name));
        Ok(UserDeletion::DeletedSelf(self.ctx.session.logout_after(self.ctx.logout_delay)))
    }

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn assign_project(&self, member: &UserRecord, project: &Project) -> Result<UserRecord, ApiError> {
        let failure = Failure::new("Error Assigning Project", "User");
        let updated = self
            .admin(&failure, || self.ctx.api.assign_project(member.id, project.id))
            .await?;
        self.success(format!("{} assigned to {}", member.user_name, project.name));
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns the local admin refusal or the remote failure, already reported.
    pub async fn unassign_project(&self, member: &UserRecord) -> Result<UserRecord, ApiError> {
        let failure = Failure::new("Error Unassigning Project", "User");
        let updated = self
            .admin(&failure, || self.ctx.api.unassign_project(member.id))
            .await?;
        self.success(format!("{} removed from project", member.user_name));
        Ok(updated)
    }

    /// Edit the signed-in user's own profile, then refresh the session so
    /// every screen sees the new values.
    ///
    /// # Errors
    ///
    /// Returns the remote failure (already reported), or the identity refresh
    /// failure after the session manager has cleared the session.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let failure = Failure::new("Error Updating User", "User");
        let result = self.ctx.api.update_profile(update).await;
        self.reported(&failure, result)?;
        let user = self.ctx.session.fetch_user().await?;
        self.success("User updated successfully");
        Ok(user)
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn admin<T, F, Fut>(&self, failure: &Failure, call: F) -> Result<T, ApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        self.ctx.require_admin(failure)?;
        let result = call().await;
        self.reported(failure, result)
    }

    fn reported<T>(&self, failure: &Failure, result: Result<T, ApiError>) -> Result<T, ApiError> {
        result.inspect_err(|err| {
            // A 401 schedules its own logout; the handle is not needed here.
            drop(self.ctx.report(failure, err));
        })
    }

    fn success(&self, description: impl Into<String>) {
        self.ctx.notify(Toast::success(SUCCESS_TITLE, description));
    }
}
