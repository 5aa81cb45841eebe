use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::scope::{Scope, parse_scope_string};

/// Spotify OAuth token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Access and refresh token pair with its expiry and granted scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Option<BTreeSet<Scope>>,
}

impl Credential {
    /// Whether the access token is missing or expires within `tolerance`.
    pub fn is_expired(&self, tolerance: Duration) -> bool {
        self.is_expired_at(tolerance, Utc::now())
    }

    pub fn is_expired_at(&self, tolerance: Duration, now: DateTime<Utc>) -> bool {
        match (&self.access_token, self.expiration_date) {
            (Some(_), Some(expiration_date)) => {
                let tolerance =
                    chrono::Duration::from_std(tolerance).unwrap_or(chrono::TimeDelta::MAX);
                match now.checked_add_signed(tolerance) {
                    Some(deadline) => deadline >= expiration_date,
                    None => true,
                }
            }
            _ => true,
        }
    }

    pub fn is_authorized_for(&self, scopes: &BTreeSet<Scope>) -> bool {
        if self.access_token.is_none() {
            return false;
        }
        match &self.scopes {
            Some(granted) => scopes.is_subset(granted),
            None => scopes.is_empty(),
        }
    }

    /// Install a token freshly returned by the token endpoint.
    ///
    /// The accounts service may omit the refresh token and the scope when
    /// refreshing; the previous values are kept in that case.
    pub fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        let expires_in = i64::try_from(response.expires_in).unwrap_or(i64::MAX);
        self.access_token = Some(response.access_token);
        self.expiration_date = now.checked_add_signed(chrono::Duration::seconds(expires_in));
        if let Some(refresh_token) = response.refresh_token {
            self.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope {
            self.scopes = Some(parse_scope_string(&scope));
        }
    }

    /// Load a credential saved with [`Credential::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read credential file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse credential file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string_pretty(self).wrap_err("Failed to serialize credential")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write credential file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential_expiring_at(expiration_date: DateTime<Utc>) -> Credential {
        Credential {
            access_token: Some("at".into()),
            refresh_token: Some("rt".into()),
            expiration_date: Some(expiration_date),
            scopes: Some(BTreeSet::from([Scope::UserReadEmail])),
        }
    }

    #[test]
    fn test_is_expired_respects_tolerance() {
        let now = Utc::now();
        let credential = credential_expiring_at(now + chrono::Duration::seconds(45));
        assert!(!credential.is_expired_at(Duration::from_secs(30), now));
        assert!(credential.is_expired_at(Duration::from_secs(60), now));
    }

    #[test]
    fn test_missing_token_or_expiry_is_expired() {
        let now = Utc::now();
        assert!(Credential::default().is_expired_at(Duration::ZERO, now));

        let mut credential = credential_expiring_at(now + chrono::Duration::hours(1));
        credential.expiration_date = None;
        assert!(credential.is_expired_at(Duration::ZERO, now));
    }

    #[test]
    fn test_is_authorized_is_monotonic_in_scope_subset() {
        let mut credential = credential_expiring_at(Utc::now());
        credential.scopes = Some(BTreeSet::from([
            Scope::UserReadEmail,
            Scope::PlaylistReadPrivate,
            Scope::Streaming,
        ]));

        let larger = BTreeSet::from([Scope::UserReadEmail, Scope::PlaylistReadPrivate]);
        assert!(credential.is_authorized_for(&larger));
        for scope in &larger {
            assert!(credential.is_authorized_for(&BTreeSet::from([*scope])));
        }
        assert!(credential.is_authorized_for(&BTreeSet::new()));
        assert!(!credential.is_authorized_for(&BTreeSet::from([Scope::UserTopRead])));
    }

    #[test]
    fn test_not_authorized_without_token() {
        let mut credential = credential_expiring_at(Utc::now());
        credential.access_token = None;
        assert!(!credential.is_authorized_for(&BTreeSet::new()));
    }

    #[test]
    fn test_apply_keeps_refresh_token_and_scopes_when_omitted() {
        let now = Utc::now();
        let mut credential = credential_expiring_at(now);
        credential.apply(
            TokenResponse {
                access_token: "new".into(),
                token_type: "Bearer".into(),
                expires_in: 3600,
                refresh_token: None,
                scope: None,
            },
            now,
        );

        assert_eq!(credential.access_token.as_deref(), Some("new"));
        assert_eq!(credential.refresh_token.as_deref(), Some("rt"));
        assert_eq!(
            credential.expiration_date,
            Some(now + chrono::Duration::seconds(3600))
        );
        assert_eq!(
            credential.scopes,
            Some(BTreeSet::from([Scope::UserReadEmail]))
        );
    }

    #[test]
    fn test_apply_replaces_refresh_token_and_scopes() {
        let now = Utc::now();
        let mut credential = Credential::default();
        credential.apply(
            TokenResponse {
                access_token: "new".into(),
                token_type: "Bearer".into(),
                expires_in: 3600,
                refresh_token: Some("rt2".into()),
                scope: Some("streaming user-top-read".into()),
            },
            now,
        );

        assert_eq!(credential.refresh_token.as_deref(), Some("rt2"));
        assert_eq!(
            credential.scopes,
            Some(BTreeSet::from([Scope::Streaming, Scope::UserTopRead]))
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credential.json");
        let credential = credential_expiring_at(Utc::now());

        credential.save(&path).unwrap();
        assert_eq!(Credential::load(&path).unwrap(), credential);
    }
}
