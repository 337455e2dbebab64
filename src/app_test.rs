use super::*;
use crate::net::types::{FilterState, User};
use crate::state::notify::NoticeLevel;
use crate::state::results::ListOutcome;
use crate::test_helpers::{MockApi, admin_user, ana, three_records};
use crate::util::storage::MemoryStorage;

use std::time::Duration;

fn app_with(api: &Arc<MockApi>, storage: &Arc<MemoryStorage>) -> App {
    let config = ClientConfig::new("http://127.0.0.1:8000").unwrap();
    App::new(config, api.clone(), storage.clone())
}

async fn signed_in(api: &Arc<MockApi>, user: &User) -> App {
    let storage = Arc::new(MemoryStorage::new());
    let app = app_with(api, &storage);
    app.start().await;
    app.session().login("tok1", user).await.unwrap();
    app
}

// =============================================================================
// Hydration & routing
// =============================================================================

#[tokio::test]
async fn navigation_before_hydration_renders_loading() {
    let api = MockApi::new();
    let app = app_with(&api, &Arc::new(MemoryStorage::new()));
    assert_eq!(app.navigate("/dashboard").await, (Route::Dashboard, View::Loading));
    assert!(!app.is_hydrated());
}

#[tokio::test]
async fn anonymous_start_lands_on_login() {
    let api = MockApi::new();
    let app = app_with(&api, &Arc::new(MemoryStorage::new()));
    assert_eq!(app.start().await, (Route::Login, View::Login));
    assert_eq!(app.navigator().current(), Route::Login);
    assert_eq!(app.navigate("/upload").await, (Route::Login, View::Login));
}

#[tokio::test]
async fn stored_session_survives_restart_and_skips_login() {
    let api = MockApi::new();
    let storage = Arc::new(MemoryStorage::new());
    let first = app_with(&api, &storage);
    first.session().login("tok1", &ana()).await.unwrap();

    let second = app_with(&api, &storage);
    assert_eq!(second.start().await, (Route::Dashboard, View::Dashboard));
    let session = second.session().current().await.unwrap();
    assert_eq!(session.token, "tok1");
    assert_eq!(session.user, ana());
    assert_eq!(second.navigate("/login").await, (Route::Dashboard, View::Dashboard));
}

#[tokio::test]
async fn non_admin_is_sent_from_admin_to_dashboard() {
    let api = MockApi::new();
    let app = signed_in(&api, &ana()).await;
    assert_eq!(app.navigate("/admin").await, (Route::Dashboard, View::Dashboard));

    let admin = signed_in(&api, &admin_user()).await;
    assert_eq!(admin.navigate("/admin").await, (Route::Admin, View::Admin));
}

#[tokio::test]
async fn unknown_path_renders_not_found() {
    let api = MockApi::new();
    let app = signed_in(&api, &ana()).await;
    let (route, view) = app.navigate("/nope").await;
    assert_eq!(route, Route::Unknown("/nope".to_owned()));
    assert_eq!(view, View::NotFound);
}

#[tokio::test]
async fn menu_lists_admin_only_for_admins() {
    let api = MockApi::new();
    let labels = |items: Vec<NavItem>| items.into_iter().map(|i| i.label).collect::<Vec<_>>();
    assert_eq!(labels(signed_in(&api, &ana()).await.menu().await), vec!["Dashboard", "Upload", "Analysis"]);
    assert_eq!(
        labels(signed_in(&api, &admin_user()).await.menu().await),
        vec!["Dashboard", "Upload", "Analysis", "Admin"]
    );
}

// =============================================================================
// Login / register / logout
// =============================================================================

#[tokio::test]
async fn login_persists_session_and_lands_on_dashboard() {
    let api = MockApi::new();
    let storage = Arc::new(MemoryStorage::new());
    let app = app_with(&api, &storage);
    app.start().await;

    let session = app.login("a@x.com", "secret").await.unwrap();
    assert_eq!(session.user.email, "a@x.com");
    assert_eq!(app.render().await, (Route::Dashboard, View::Dashboard));
    assert_eq!(app.notices().drain(), vec![Notice::success("Welcome back!")]);

    let restarted = app_with(&api, &storage);
    restarted.start().await;
    assert_eq!(restarted.session().current().await, Some(session));
}

#[tokio::test]
async fn rejected_login_shows_server_detail_and_stays_put() {
    let api = MockApi::new();
    api.fail("login", ApiError::Unauthorized(Some("Incorrect email or password".to_owned())));
    let app = app_with(&api, &Arc::new(MemoryStorage::new()));
    app.start().await;

    assert_eq!(app.login("a@x.com", "wrong").await, None);
    assert_eq!(app.render().await, (Route::Login, View::Login));
    assert_eq!(app.notices().drain(), vec![Notice::error("Incorrect email or password")]);
    assert!(!app.handle_expiry().await);
}

#[tokio::test]
async fn register_failure_without_detail_uses_generic_message() {
    let api = MockApi::new();
    api.fail("register", ApiError::Transport("refused".to_owned()));
    let app = app_with(&api, &Arc::new(MemoryStorage::new()));
    app.start().await;

    assert_eq!(app.register("Ana", "a@x.com", "pw").await, None);
    assert_eq!(app.notices().drain(), vec![Notice::error("Registration failed")]);
}

#[tokio::test]
async fn register_starts_session() {
    let api = MockApi::new();
    let app = app_with(&api, &Arc::new(MemoryStorage::new()));
    app.start().await;

    let session = app.register("Bea", "b@x.com", "pw").await.unwrap();
    assert_eq!(session.user.name, "Bea");
    assert_eq!(app.notices().drain(), vec![Notice::success("Account created successfully!")]);
    assert_eq!(app.navigator().current(), Route::Dashboard);
}

#[tokio::test]
async fn logout_clears_session_and_goes_to_login() {
    let api = MockApi::new();
    let app = signed_in(&api, &ana()).await;
    app.logout().await;
    assert_eq!(app.session().current().await, None);
    assert!(app.view_context().await.is_none());
    assert_eq!(app.render().await, (Route::Login, View::Login));
}

// =============================================================================
// Expiry
// =============================================================================

#[tokio::test]
async fn rejected_token_in_a_view_signs_the_user_out() {
    let api = MockApi::with_records(three_records());
    api.fail("list", ApiError::Unauthorized(Some("Could not validate credentials".to_owned())));
    let app = signed_in(&api, &ana()).await;
    app.navigate("/analysis").await;

    let results = app.results(app.view_context().await.unwrap());
    assert_eq!(results.list(FilterState::All).await, ListOutcome::Failed);
    assert_eq!(api.tokens_for("list"), vec![Some("tok1".to_owned())]);

    assert!(app.handle_expiry().await);
    assert_eq!(app.session().current().await, None);
    assert_eq!(app.render().await, (Route::Login, View::Login));
    let notices = app.notices().drain();
    assert_eq!(notices.last(), Some(&Notice::info(SESSION_EXPIRED)));
    assert!(!app.handle_expiry().await);
}

#[tokio::test]
async fn revalidate_rejection_logs_out_with_notice() {
    let api = MockApi::new();
    api.fail("me", ApiError::Unauthorized(None));
    let app = signed_in(&api, &ana()).await;

    assert_eq!(app.revalidate().await, None);
    assert_eq!(app.navigator().current(), Route::Login);
    let notices = app.notices().drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn revalidate_transport_failure_keeps_session() {
    let api = MockApi::new();
    api.fail("me", ApiError::Transport("offline".to_owned()));
    let app = signed_in(&api, &ana()).await;
    assert!(app.revalidate().await.is_some());
    assert!(app.notices().drain().is_empty());
}

// =============================================================================
// View wiring
// =============================================================================

#[tokio::test(start_paused = true)]
async fn text_ingestion_lands_on_analysis_view() {
    let api = MockApi::new();
    let app = signed_in(&api, &ana()).await;
    app.navigate("/upload").await;

    let ingest = app.ingestion(app.view_context().await.unwrap());
    ingest.set_text("lovely").await;
    ingest.submit_text().await.unwrap();
    assert_eq!(app.render().await, (Route::Upload, View::Upload));

    tokio::time::sleep(app.config().nav_delay + Duration::from_millis(1)).await;
    assert_eq!(app.render().await, (Route::Analysis, View::Analysis));
}

#[tokio::test]
async fn scheduled_navigation_cannot_bypass_the_guard() {
    let api = MockApi::new();
    let app = signed_in(&api, &ana()).await;
    app.navigator().schedule(Route::Admin, Duration::ZERO).await.unwrap();
    assert_eq!(app.render().await, (Route::Dashboard, View::Dashboard));
}
