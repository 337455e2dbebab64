//! Route authorization.
//!
//! SYSTEM CONTEXT
//! ==============
//! `guard` is consulted on every navigation, including the first one after
//! session hydration. It is a pure function of the session snapshot and the
//! requested route; following its redirects is the navigator's job.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use crate::net::types::{Session, User};

/// Where an unauthenticated user lands.
pub const LOGIN_PATH: &str = "/login";
/// Where an authenticated user lands.
pub const DEFAULT_AUTHED_PATH: &str = "/dashboard";

const MAX_REDIRECTS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Login,
    Register,
    Dashboard,
    Upload,
    Analysis,
    Admin,
    Unknown(String),
}

impl Route {
    /// Parse a path, ignoring any query string, fragment, or trailing slash.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Root,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/dashboard" => Self::Dashboard,
            "/upload" => Self::Upload,
            "/analysis" => Self::Analysis,
            "/admin" => Self::Admin,
            other => Self::Unknown(other.to_owned()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Root => "/",
            Self::Login => LOGIN_PATH,
            Self::Register => "/register",
            Self::Dashboard => DEFAULT_AUTHED_PATH,
            Self::Upload => "/upload",
            Self::Analysis => "/analysis",
            Self::Admin => "/admin",
            Self::Unknown(path) => path,
        }
    }

    #[must_use]
    pub fn is_auth_view(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

/// What the front end should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Session hydration has not finished yet.
    Loading,
    Login,
    Register,
    Dashboard,
    Upload,
    Analysis,
    Admin,
    NotFound,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render(View),
    Redirect(Route),
}

/// Decide what a navigation to `route` yields.
///
/// `session` is `None` both before hydration and when logged out; `hydrated`
/// tells them apart.
#[must_use]
pub fn guard(session: Option<&Session>, hydrated: bool, route: &Route) -> GuardDecision {
    if !hydrated {
        return GuardDecision::Render(View::Loading);
    }
    let user = session.map(|s| &s.user);
    match (route, user) {
        (Route::Login, None) => GuardDecision::Render(View::Login),
        (Route::Register, None) => GuardDecision::Render(View::Register),
        (Route::Login | Route::Register, Some(_)) => GuardDecision::Redirect(Route::Dashboard),
        (Route::Admin, Some(u)) if u.is_admin => GuardDecision::Render(View::Admin),
        (Route::Admin, _) => GuardDecision::Redirect(Route::Dashboard),
        (Route::Dashboard, Some(_)) => GuardDecision::Render(View::Dashboard),
        (Route::Upload, Some(_)) => GuardDecision::Render(View::Upload),
        (Route::Analysis, Some(_)) => GuardDecision::Render(View::Analysis),
        (Route::Dashboard | Route::Upload | Route::Analysis, None) => GuardDecision::Redirect(Route::Login),
        (Route::Root, Some(_)) => GuardDecision::Redirect(Route::Dashboard),
        (Route::Root, None) => GuardDecision::Redirect(Route::Login),
        (Route::Unknown(_), _) => GuardDecision::Render(View::NotFound),
    }
}

/// Follow redirects from `route` until a view renders.
///
/// Returns the final route together with its view.
#[must_use]
pub fn resolve(session: Option<&Session>, hydrated: bool, route: Route) -> (Route, View) {
    let mut current = route;
    for _ in 0..MAX_REDIRECTS {
        match guard(session, hydrated, &current) {
            GuardDecision::Render(view) => return (current, view),
            GuardDecision::Redirect(next) => current = next,
        }
    }
    (current, View::NotFound)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    pub route: Route,
    pub label: &'static str,
}

/// Navigation menu entries for `user`; the admin entry is privileged.
#[must_use]
pub fn nav_items(user: &User) -> Vec<NavItem> {
    let mut items = vec![
        NavItem { route: Route::Dashboard, label: "Dashboard" },
        NavItem { route: Route::Upload, label: "Upload" },
        NavItem { route: Route::Analysis, label: "Analysis" },
    ];
    if user.is_admin {
        items.push(NavItem { route: Route::Admin, label: "Admin" });
    }
    items
}
