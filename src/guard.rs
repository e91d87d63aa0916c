//! Session guard run before every subcommand.

use crate::session::{Session, SessionStore};

pub const LOGIN_REQUIRED: &str = "token missing or expired, please log in first";

/// Console areas a subcommand belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Ping,
    DnsQuery,
    Zones,
    Records,
    Probes,
    Apis,
    Roles,
    Users,
    Audit,
}

impl Route {
    /// Path of the matching web console view. Zones and ping have no view
    /// there and follow the same naming.
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Ping => "/ping",
            Route::DnsQuery => "/dns_query",
            Route::Zones => "/dns_zones",
            Route::Records => "/dns_records",
            Route::Probes => "/dns_probes",
            Route::Apis => "/system_apis",
            Route::Roles => "/system_roles",
            Route::Users => "/system_users",
            Route::Audit => "/system_audit",
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login | Route::Ping)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(Route),
}

/// Decide whether `route` may run given the stored session.
pub fn before_each(route: Route, session: Option<&Session>) -> Navigation {
    let valid = session.is_some_and(Session::is_valid);
    match route {
        Route::Login if valid => Navigation::Redirect(Route::DnsQuery),
        r if r.is_public() => Navigation::Proceed,
        _ if valid => Navigation::Proceed,
        _ => Navigation::Redirect(Route::Login),
    }
}

/// [`before_each`] against a store. An unreadable session counts as absent.
pub fn check(route: Route, store: &dyn SessionStore) -> Navigation {
    let session = store.load().unwrap_or_else(|e| {
        log::warn!("Could not read stored session: {}", e);
        None
    });
    before_each(route, session.as_ref())
}
