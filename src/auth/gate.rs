use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthorizationManager;
use crate::auth::refresh::RefreshError;
use crate::error::SpotifyError;
use crate::scope::Scope;

/// Tokens expiring within this window are refreshed before a request.
pub const REFRESH_TOLERANCE: Duration = Duration::from_secs(60);

/// A token that just went through a refresh must be valid for at least this long.
pub const POST_REFRESH_TOLERANCE: Duration = Duration::from_secs(30);

/// Guarantees a valid, sufficiently scoped access token before every
/// authenticated call.
pub struct CredentialGate<A: ?Sized> {
    authorization_manager: Arc<A>,
}

impl<A: ?Sized> Clone for CredentialGate<A> {
    fn clone(&self) -> Self {
        Self {
            authorization_manager: Arc::clone(&self.authorization_manager),
        }
    }
}

impl<A: AuthorizationManager + ?Sized> CredentialGate<A> {
    pub fn new(authorization_manager: Arc<A>) -> Self {
        Self {
            authorization_manager,
        }
    }

    pub fn authorization_manager(&self) -> &Arc<A> {
        &self.authorization_manager
    }

    /// Refresh the token if it is about to expire, then check that it exists and
    /// covers `required_scopes`. Returns the access token.
    ///
    /// None of the failures are retried here.
    pub async fn ensure(&self, required_scopes: &BTreeSet<Scope>) -> Result<String, SpotifyError> {
        let manager = &self.authorization_manager;

        match manager.refresh_tokens(true, REFRESH_TOLERANCE).await {
            Ok(()) => {}
            // Nothing to refresh with: the user has to authorize again
            Err(RefreshError::MissingRefreshToken) => return Err(SpotifyError::Unauthorized),
            Err(error) => return Err(error.into()),
        }

        let access_token = manager.access_token().ok_or(SpotifyError::Unauthorized)?;

        if !manager.is_authorized_for(required_scopes) {
            return Err(SpotifyError::InsufficientScope {
                required: required_scopes.clone(),
                granted: manager.scopes().unwrap_or_default(),
            });
        }

        if manager.access_token_is_expired(POST_REFRESH_TOLERANCE) {
            tracing::error!(
                "Access token was expired after just refreshing it; the authorization manager \
                 did not honor its refresh contract"
            );
            return Err(SpotifyError::TokenExpiredAfterRefresh);
        }

        Ok(access_token)
    }
}
