//! Client routes and the authentication guard.

use std::{fmt, str::FromStr};

use strum::{EnumIter, IntoEnumIterator};

/// The client routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Route {
    /// `/`, gated behind authentication.
    Dashboard,
    /// `/login`
    Login,
    /// `/register`
    Register,
}

impl Route {
    /// The path this route is served at.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Dashboard => "/",
            Self::Login => "/login",
            Self::Register => "/register",
        }
    }

    /// Looks a route up by path. A single trailing slash is ignored.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        let normalized = match path.strip_suffix('/') {
            Some("") | None => path,
            Some(stripped) => stripped,
        };
        Self::iter().find(|route| route.path() == normalized)
    }

    /// Whether only an authenticated session may see this route.
    #[must_use]
    pub fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_path(value).ok_or_else(|| format!("unknown route: {value}"))
    }
}

/// What a navigation request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The session is still loading; render nothing decisive yet.
    Pending,
    /// Render the requested route.
    Render(Route),
    /// Navigate elsewhere instead.
    Redirect(Route),
}

impl RouteDecision {
    /// Applies the guard: gated routes need authentication, and an
    /// authenticated session skips the login and register views.
    #[must_use]
    pub fn resolve(requested: Route, loading: bool, authenticated: bool) -> Self {
        if loading {
            return Self::Pending;
        }
        match (requested.requires_auth(), authenticated) {
            (true, false) => Self::Redirect(Route::Login),
            (false, true) => Self::Redirect(Route::Dashboard),
            _ => Self::Render(requested),
        }
    }
}
