//! Role-based routing
//!
//! [`resolve`] is a pure function of the path and the [`AuthState`]: the
//! root path branches on the session, every other path is looked up in
//! [`ROUTES`] and then checked by the view's guard.

use crate::models::Role;
use crate::session::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Landing,
    Dashboard,
    Login,
    Register,
    ForgotPassword,
    ResetPassword,
    Events,
    CreateEvent,
    EventDetail { id: String },
    Services,
    ServiceDetail { id: String },
    Venues,
    VenueDetail { id: String },
    Profile,
    Assistant,
    AdminDashboard,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(View),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(&'static [Role]),
}

impl Access {
    fn allows(&self, role: Role) -> bool {
        match self {
            Access::Public | Access::Authenticated => true,
            Access::Roles(roles) => roles.contains(&role),
        }
    }
}

const EVENT_MANAGERS: &[Role] = &[Role::Organizer, Role::Admin];
const ADMINS: &[Role] = &[Role::Admin];

pub struct Route {
    pub pattern: &'static str,
    build: fn(&[&str]) -> View,
}

/// Ordered; first match wins. Literal segments must precede parameter
/// segments at the same depth, and the catch-all comes last.
pub static ROUTES: &[Route] = &[
    Route::new("/login", |_| View::Login),
    Route::new("/register", |_| View::Register),
    Route::new("/forgot-password", |_| View::ForgotPassword),
    Route::new("/reset-password", |_| View::ResetPassword),
    Route::new("/events", |_| View::Events),
    Route::new("/events/create", |_| View::CreateEvent),
    Route::new("/events/:id", |p| View::EventDetail {
        id: p[0].to_string(),
    }),
    Route::new("/services", |_| View::Services),
    Route::new("/services/:id", |p| View::ServiceDetail {
        id: p[0].to_string(),
    }),
    Route::new("/venues", |_| View::Venues),
    Route::new("/venues/:id", |p| View::VenueDetail {
        id: p[0].to_string(),
    }),
    Route::new("/profile", |_| View::Profile),
    Route::new("/assistant", |_| View::Assistant),
    Route::new("/admin", |_| View::AdminDashboard),
    Route::new("*", |_| View::NotFound),
];

impl Route {
    const fn new(pattern: &'static str, build: fn(&[&str]) -> View) -> Self {
        Self { pattern, build }
    }

    /// Captured `:param` segments on match.
    fn matches<'p>(&self, segments: &[&'p str]) -> Option<Vec<&'p str>> {
        if self.pattern == "*" {
            return Some(Vec::new());
        }

        let pattern: Vec<&str> = split(self.pattern);
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = Vec::new();
        for (expected, actual) in pattern.iter().zip(segments) {
            if expected.starts_with(':') {
                params.push(*actual);
            } else if expected != actual {
                return None;
            }
        }
        Some(params)
    }
}

impl View {
    pub const fn access(&self) -> Access {
        match self {
            View::CreateEvent => Access::Roles(EVENT_MANAGERS),
            View::AdminDashboard => Access::Roles(ADMINS),
            View::Profile | View::Assistant | View::Dashboard => Access::Authenticated,
            _ => Access::Public,
        }
    }

    /// Page-level re-check run when a view mounts.
    pub fn guard(self, auth: &AuthState) -> Resolution {
        let access = self.access();
        if access == Access::Public || auth.is_loading {
            return Resolution::Render(self);
        }

        match &auth.user {
            None => Resolution::Redirect("/login"),
            Some(user) if access.allows(user.role) => Resolution::Render(self),
            Some(_) => Resolution::Render(View::NotFound),
        }
    }
}

pub fn resolve(path: &str, auth: &AuthState) -> Resolution {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments = split(path);

    if segments.is_empty() {
        return resolve_root(auth);
    }

    ROUTES
        .iter()
        .find_map(|route| route.matches(&segments).map(|params| (route.build)(&params)))
        .unwrap_or(View::NotFound)
        .guard(auth)
}

fn resolve_root(auth: &AuthState) -> Resolution {
    if auth.is_loading || !auth.is_authenticated {
        return Resolution::Render(View::Landing);
    }
    if auth.is_admin() {
        return Resolution::Redirect("/admin");
    }
    Resolution::Render(View::Dashboard)
}

fn split(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
