//! Dashboard summary: totals, status breakdown, engineering effort.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use serde::Serialize;
use uuid::Uuid;

use super::context::ViewContext;
use super::policy::Failure;
use super::scope::ViewScope;
use crate::error::ApiError;
use crate::net::types::{Customer, Project, ProjectStatus, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub count: usize,
}

/// Engineers currently assigned to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEffort {
    pub project_id: Uuid,
    pub name: String,
    pub engineers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub customers: usize,
    pub active_customers: usize,
    pub projects: usize,
    /// One entry per status, in lifecycle order, zeros included.
    pub projects_by_status: Vec<StatusCount>,
    /// Only projects whose member list was loaded.
    pub engineering_effort: Vec<ProjectEffort>,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_records(customers: &[Customer], projects: &[Project]) -> Self {
        let projects_by_status = ProjectStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                count: projects.iter().filter(|p| p.status == status).count(),
            })
            .collect();

        let engineering_effort = projects
            .iter()
            .filter_map(|project| {
                let users = project.users.as_ref()?;
                Some(ProjectEffort {
                    project_id: project.id,
                    name: project.name.clone(),
                    engineers: users.iter().filter(|u| u.role == Role::Engineer).count(),
                })
            })
            .collect();

        Self {
            customers: customers.len(),
            active_customers: customers.iter().filter(|c| c.active).count(),
            projects: projects.len(),
            projects_by_status,
            engineering_effort,
        }
    }
}

/// Fetch customers and projects side by side and summarize them.
///
/// Returns `None` when the result was discarded because `scope` unmounted or
/// started a newer load while the fetch was in flight; nothing is reported
/// in that case.
pub async fn load_summary(ctx: &ViewContext, scope: &ViewScope) -> Option<Result<DashboardSummary, ApiError>> {
    let generation = scope.begin();
    let (customers, projects) = tokio::join!(ctx.api.list_customers(), ctx.api.list_projects(true));

    if !scope.is_current(generation) {
        tracing::debug!("discarding stale dashboard response");
        return None;
    }

    match customers.and_then(|c| projects.map(|p| (c, p))) {
        Ok((customers, projects)) => {
            let summary = DashboardSummary::from_records(&customers, &projects);
            tracing::debug!(customers = summary.customers, projects = summary.projects, "dashboard loaded");
            Some(Ok(summary))
        }
        Err(err) => {
            ctx.report(&Failure::new("Error Loading Dashboard", "Dashboard"), &err);
            Some(Err(err))
        }
    }
}
