use serde_json::json;

use super::*;
use crate::error::ErrorKind;
use crate::nav::Route;
use crate::net::types::ProjectStatus;
use crate::session::state::Phase;
use crate::test_helpers::{
    ALICE_ID, BOB_ID, Harness, alice_json, customer_json, project_json, unauthorized, user_json, user_record,
};

fn acme() -> Customer {
    serde_json::from_value(customer_json(1, "Acme")).unwrap()
}

fn bridge() -> Project {
    serde_json::from_value(project_json(10, "Bridge", "DESIGN", &[])).unwrap()
}

fn customer_input() -> CustomerInput {
    CustomerInput { name: "Acme".into(), details: None }
}

// =============================================================================
// admin gate
// =============================================================================

#[tokio::test]
async fn members_are_refused_without_a_request() {
    let h = Harness::signed_in(false).await;
    let actions = Actions::new(h.ctx.clone());

    let err = actions.delete_customer(&acme()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert_eq!(h.api.call_count("delete_customer"), 0);
    let toasts = h.notifier.toasts();
    assert_eq!(toasts[0].title, "Error - Cannot Delete Customer!");
    assert_eq!(toasts[0].description, "You must have admin rights to perform this action");
}

#[tokio::test]
async fn server_forbidden_gets_same_notice() {
    let h = Harness::signed_in(true).await;
    h.api.push_err("delete_project", ApiError::Forbidden { body: String::new() });
    let actions = Actions::new(h.ctx.clone());

    assert!(actions.delete_project(&bridge()).await.is_err());

    assert_eq!(h.notifier.toasts()[0].description, "You must have admin rights to perform this action");
}

// =============================================================================
// customers and projects
// =============================================================================

#[tokio::test]
async fn create_customer_toasts_success() {
    let h = Harness::signed_in(true).await;
    h.api.push_ok("create_customer", customer_json(1, "Acme"));
    let actions = Actions::new(h.ctx.clone());

    let customer = actions.create_customer(&customer_input()).await.unwrap();

    assert_eq!(customer.name, "Acme");
    let toasts = h.notifier.toasts();
    assert_eq!(toasts[0].title, "Success");
    assert_eq!(toasts[0].description, "Customer successfully created");
}

#[tokio::test]
async fn update_customer_conflict_shows_server_detail() {
    let h = Harness::signed_in(true).await;
    h.api.push_err("update_customer", ApiError::Conflict { body: r#"{"detail":"Customer already exists!"}"#.into() });
    let actions = Actions::new(h.ctx.clone());

    let err = actions.update_customer(&acme(), &customer_input()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    let toasts = h.notifier.toasts();
    assert_eq!(toasts[0].title, "Error - Cannot Update Customer!");
    assert_eq!(toasts[0].description, "Customer already exists!");
}

#[tokio::test]
async fn delete_customer_mentions_projects() {
    let h = Harness::signed_in(true).await;
    let actions = Actions::new(h.ctx.clone());

    actions.delete_customer(&acme()).await.unwrap();

    assert_eq!(h.notifier.toasts()[0].description, "Acme and associated projects successfully deleted");
}

#[tokio::test]
async fn delete_missing_customer_reports_not_found() {
    let h = Harness::signed_in(true).await;
    h.api.push_err("delete_customer", ApiError::NotFound { body: String::new() });
    let actions = Actions::new(h.ctx.clone());

    assert!(actions.delete_customer(&acme()).await.is_err());

    assert_eq!(h.notifier.toasts()[0].description, "Customer not found!");
}

#[tokio::test]
async fn create_and_update_project() {
    let h = Harness::signed_in(true).await;
    h.api.push_ok("create_project", project_json(10, "Bridge", "PENDING", &[]));
    h.api.push_ok("update_project", project_json(10, "Bridge", "BUILD", &[]));
    let actions = Actions::new(h.ctx.clone());
    let mut input = ProjectInput {
        name: "Bridge".into(),
        status: ProjectStatus::Pending,
        details: None,
        customer_id: acme().id,
    };

    let created = actions.create_project(&input).await.unwrap();
    input.status = ProjectStatus::Build;
    let updated = actions.update_project(&created, &input).await.unwrap();

    assert_eq!(updated.status, ProjectStatus::Build);
    assert_eq!(
        h.notifier.titles(),
        vec!["Success".to_owned(), "Success".to_owned()]
    );
}

#[tokio::test(start_paused = true)]
async fn unauthorized_mutation_expires_session() {
    let h = Harness::signed_in(true).await;
    h.api.push_err("delete_project", unauthorized());
    let actions = Actions::new(h.ctx.clone());

    assert!(actions.delete_project(&bridge()).await.is_err());
    assert_eq!(h.notifier.titles(), vec!["Session Expired".to_owned()]);

    tokio::time::sleep(h.ctx.logout_delay * 2).await;

    assert_eq!(h.ctx.session.session().phase, Phase::Unauthenticated);
    assert_eq!(h.nav.last(), Some(Route::Login));
}

// =============================================================================
// users
// =============================================================================

#[tokio::test]
async fn delete_other_user_keeps_session() {
    let h = Harness::signed_in(true).await;
    let actions = Actions::new(h.ctx.clone());

    let outcome = actions.delete_user(&user_record(BOB_ID, "bob", false)).await.unwrap();

    assert!(matches!(outcome, UserDeletion::Deleted));
    assert_eq!(h.notifier.toasts()[0].description, "bob deleted");
    assert!(h.ctx.session.session().is_authenticated());
}

#[tokio::test(start_paused = true)]
async fn delete_self_forces_logout_after_delay() {
    let h = Harness::signed_in(true).await;
    let actions = Actions::new(h.ctx.clone());
    let start = tokio::time::Instant::now();

    let outcome = actions.delete_user(&user_record(ALICE_ID, "alice123", true)).await.unwrap();

    assert_eq!(h.notifier.toasts()[0].description, "alice123 deleted. You will now be logged out.");
    assert!(h.ctx.session.session().is_authenticated());
    let UserDeletion::DeletedSelf(handle) = outcome else {
        panic!("expected a scheduled logout");
    };
    handle.await.unwrap();

    assert!(start.elapsed() >= h.ctx.logout_delay);
    assert!(h.ctx.session.session().user.is_none());
    assert_eq!(h.nav.last(), Some(Route::Login));
}

#[tokio::test]
async fn assign_and_unassign_project() {
    let h = Harness::signed_in(true).await;
    let mut assigned = user_json(BOB_ID, "bob", false);
    assigned["project_id"] = json!(bridge().id);
    h.api.push_ok("assign_project", assigned);
    h.api.push_ok("unassign_project", user_json(BOB_ID, "bob", false));
    let actions = Actions::new(h.ctx.clone());
    let bob = user_record(BOB_ID, "bob", false);

    let updated = actions.assign_project(&bob, &bridge()).await.unwrap();
    assert_eq!(updated.project_id, Some(bridge().id));

    let cleared = actions.unassign_project(&updated).await.unwrap();
    assert_eq!(cleared.project_id, None);

    let descriptions: Vec<_> = h.notifier.toasts().into_iter().map(|t| t.description).collect();
    assert_eq!(descriptions, vec!["bob assigned to Bridge", "bob removed from project"]);
}

#[tokio::test]
async fn update_profile_refreshes_session_for_members() {
    let h = Harness::signed_in(false).await;
    let mut renamed = alice_json(false);
    renamed["first_name"] = json!("Alicia");
    h.api.push_ok("update_profile", renamed.clone());
    h.api.push_ok("who_am_i", renamed);
    let actions = Actions::new(h.ctx.clone());
    let update = ProfileUpdate {
        first_name: "Alicia".into(),
        last_name: "User".into(),
        email: "alice123@example.com".into(),
    };

    let user = actions.update_profile(&update).await.unwrap();

    assert_eq!(user.first_name, "Alicia");
    assert_eq!(h.ctx.session.current_user().map(|u| u.first_name), Some("Alicia".to_owned()));
    assert_eq!(h.notifier.toasts()[0].description, "User updated successfully");
}

#[tokio::test]
async fn update_profile_failure_skips_refresh() {
    let h = Harness::signed_in(false).await;
    h.api.push_err("update_profile", ApiError::Conflict { body: String::new() });
    let actions = Actions::new(h.ctx.clone());
    let update = ProfileUpdate { first_name: "A".into(), last_name: "B".into(), email: "a@b.co".into() };

    assert!(actions.update_profile(&update).await.is_err());

    assert_eq!(h.api.call_count("who_am_i"), 1);
    assert_eq!(h.notifier.titles(), vec!["Error Updating User".to_owned()]);
}
