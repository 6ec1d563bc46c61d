//! Shared-secret authentication.

use homesec_config::AuthWhitelist;

use super::request::Request;

/// Header carrying the client's shared secret.
pub const AUTH_HEADER: &str = "appPassword";

/// Checks requests against the process-wide token whitelist.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    whitelist: AuthWhitelist,
}

impl AuthGuard {
    /// Creates a guard over `whitelist`.
    #[must_use]
    pub const fn new(whitelist: AuthWhitelist) -> Self {
        Self { whitelist }
    }

    /// Whether the first `appPassword` header holds a whitelisted token.
    #[must_use]
    pub fn authenticate(&self, request: &Request) -> bool {
        request
            .header(AUTH_HEADER)
            .is_some_and(|token| self.whitelist.contains(token))
    }
}
