//! Application shell: session, routing, and view wiring.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` is built once per process. `start()` hydrates the session; until it
//! returns, every navigation renders `View::Loading`. Authorized views get a
//! `ViewContext` snapshot from `view_context()` and raise the shared
//! `ExpirySignal` when the server rejects the token; the front end calls
//! `handle_expiry()` after each view action to turn that into a logout.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::config::ClientConfig;
use crate::net::api::SentimentApi;
use crate::net::error::ApiError;
use crate::net::types::{AuthResponse, LoginRequest, RegisterRequest, Session};
use crate::state::admin::AdminStatsView;
use crate::state::dashboard::DashboardAggregator;
use crate::state::ingest::IngestionController;
use crate::state::nav::Navigator;
use crate::state::notify::{Notice, NoticeLog, Notifier};
use crate::state::results::ResultsManager;
use crate::state::route::{NavItem, Route, View, nav_items, resolve};
use crate::state::session::SessionStore;
use crate::state::view::{ExpirySignal, ViewContext};
use crate::util::storage::DurableStorage;

pub const SESSION_EXPIRED: &str = "Session expired. Please sign in again.";

pub struct App {
    config: ClientConfig,
    api: Arc<dyn SentimentApi>,
    session: Arc<SessionStore>,
    navigator: Navigator,
    notices: Arc<NoticeLog>,
    expiry: ExpirySignal,
    hydrated: AtomicBool,
}

impl App {
    #[must_use]
    pub fn new(config: ClientConfig, api: Arc<dyn SentimentApi>, storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            config,
            api,
            session: Arc::new(SessionStore::new(storage)),
            navigator: Navigator::default(),
            notices: Arc::new(NoticeLog::new()),
            expiry: ExpirySignal::new(),
            hydrated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeLog {
        &self.notices
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::SeqCst)
    }

    /// Hydrate the session and render the current location.
    pub async fn start(&self) -> (Route, View) {
        let session = self.session.hydrate().await;
        self.hydrated.store(true, Ordering::SeqCst);
        info!(signed_in = session.is_some(), "app started");
        self.render().await
    }

    /// Apply the route guard to the current location, following redirects.
    pub async fn render(&self) -> (Route, View) {
        let session = self.session.current().await;
        let requested = self.navigator.current();
        let (route, view) = resolve(session.as_ref(), self.is_hydrated(), requested.clone());
        if route != requested {
            debug!(from = requested.path(), to = route.path(), "redirect");
            self.navigator.navigate(route.clone());
        }
        (route, view)
    }

    pub async fn navigate(&self, path: &str) -> (Route, View) {
        self.navigator.navigate(Route::parse(path));
        self.render().await
    }

    /// Sign in and land on the dashboard. Returns `None` on failure, after
    /// publishing a notice.
    pub async fn login(&self, email: &str, password: &str) -> Option<Session> {
        let request = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let response = self.api.login(&request).await;
        self.start_session("login", response, "Login failed", "Welcome back!").await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Option<Session> {
        let request = RegisterRequest { name: name.to_owned(), email: email.to_owned(), password: password.to_owned() };
        let response = self.api.register(&request).await;
        self.start_session("register", response, "Registration failed", "Account created successfully!")
            .await
    }

    async fn start_session(
        &self,
        op: &'static str,
        response: Result<AuthResponse, ApiError>,
        fallback: &str,
        welcome: &str,
    ) -> Option<Session> {
        let auth = match response {
            Ok(auth) => auth,
            Err(e) => {
                warn!(op, error = %e, "authentication rejected");
                self.notices.notify(Notice::error(e.user_message(fallback)));
                return None;
            }
        };
        match self.session.login(&auth.token, &auth.user).await {
            Ok(session) => {
                self.expiry.take();
                self.notices.notify(Notice::success(welcome));
                self.navigator.navigate(Route::Dashboard);
                Some(session)
            }
            Err(e) => {
                error!(op, error = %e, "session could not be stored");
                self.notices.notify(Notice::error(fallback));
                None
            }
        }
    }

    pub async fn logout(&self) {
        if let Err(e) = self.session.logout().await {
            error!(error = %e, "logout storage cleanup failed");
        }
        self.navigator.navigate(Route::Login);
    }

    /// Confirm the stored session with the server.
    pub async fn revalidate(&self) -> Option<Session> {
        let before = self.session.current().await;
        let after = self.session.revalidate(self.api.as_ref()).await;
        if before.is_some() && after.is_none() {
            self.notices.notify(Notice::info(SESSION_EXPIRED));
            self.navigator.navigate(Route::Login);
        }
        after
    }

    /// If a view saw the token rejected, end the session.
    ///
    /// Returns `true` if the session was ended.
    pub async fn handle_expiry(&self) -> bool {
        if !self.expiry.take() {
            return false;
        }
        warn!("bearer token rejected; signing out");
        self.logout().await;
        self.notices.notify(Notice::info(SESSION_EXPIRED));
        true
    }

    /// Dependencies for an authorized view, or `None` when signed out.
    pub async fn view_context(&self) -> Option<ViewContext> {
        let session = self.session.current().await?;
        let notifier: Arc<dyn Notifier> = self.notices.clone();
        Some(ViewContext::new(self.api.clone(), &session.token, notifier).with_expiry(self.expiry.clone()))
    }

    pub async fn menu(&self) -> Vec<NavItem> {
        self.session.current().await.map(|s| nav_items(&s.user)).unwrap_or_default()
    }

    #[must_use]
    pub fn dashboard(&self, ctx: ViewContext) -> DashboardAggregator {
        DashboardAggregator::new(ctx)
    }

    #[must_use]
    pub fn ingestion(&self, ctx: ViewContext) -> IngestionController {
        IngestionController::new(ctx, self.navigator.clone(), self.config.nav_delay)
    }

    #[must_use]
    pub fn results(&self, ctx: ViewContext) -> ResultsManager {
        ResultsManager::new(ctx)
    }

    #[must_use]
    pub fn admin(&self, ctx: ViewContext) -> AdminStatsView {
        AdminStatsView::new(ctx)
    }
}
