use std::collections::BTreeSet;
use std::time::Duration;

use crate::scope::Scope;

pub mod credential;
pub mod gate;
pub mod refresh;

pub use credential::{Credential, TokenResponse};
pub use gate::CredentialGate;
pub use refresh::{RefreshError, SpotifyTokenEndpoint, TokenManager, TokenRefresher};

/// The object that owns the credential the request pipeline authenticates with.
///
/// Implementations hold shared mutable state and must serialize concurrent
/// refreshes: callers that observe an expired token at the same time must
/// trigger at most one exchange of the refresh token, and all of them must
/// observe its result.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AuthorizationManager: Send + Sync {
    /// Refresh the access token. With `only_if_expired`, nothing happens unless
    /// the token expires within `tolerance`.
    async fn refresh_tokens(
        &self,
        only_if_expired: bool,
        tolerance: Duration,
    ) -> Result<(), RefreshError>;

    fn access_token(&self) -> Option<String>;

    /// The scopes the credential was granted, if known.
    fn scopes(&self) -> Option<BTreeSet<Scope>>;

    /// Whether an access token is present and was granted every scope in `scopes`.
    fn is_authorized_for(&self, scopes: &BTreeSet<Scope>) -> bool;

    fn access_token_is_expired(&self, tolerance: Duration) -> bool;
}
