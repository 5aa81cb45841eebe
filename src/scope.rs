use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// A Spotify authorization scope.
///
/// Each endpoint declares the set of scopes it requires and the request
/// pipeline refuses to call it unless the credential was granted all of them.
/// https://developer.spotify.com/documentation/web-api/concepts/scopes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
#[serde(into = "&'static str", try_from = "String")]
#[strum(serialize_all = "kebab-case")]
pub enum Scope {
    UgcImageUpload,
    UserReadPlaybackState,
    UserModifyPlaybackState,
    UserReadCurrentlyPlaying,
    AppRemoteControl,
    Streaming,
    PlaylistReadPrivate,
    PlaylistReadCollaborative,
    PlaylistModifyPrivate,
    PlaylistModifyPublic,
    UserFollowModify,
    UserFollowRead,
    UserReadPlaybackPosition,
    UserTopRead,
    UserReadRecentlyPlayed,
    UserLibraryModify,
    UserLibraryRead,
    UserReadEmail,
    UserReadPrivate,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

impl TryFrom<String> for Scope {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Parse the space separated `scope` field of a token response.
/// Scopes this crate does not know about are skipped.
pub fn parse_scope_string(scopes: &str) -> BTreeSet<Scope> {
    scopes
        .split_whitespace()
        .filter_map(|raw| match raw.parse::<Scope>() {
            Ok(scope) => Some(scope),
            Err(_) => {
                tracing::warn!("Ignoring unknown granted scope: {}", raw);
                None
            }
        })
        .collect()
}

/// Space separated form used by the authorization endpoints.
pub fn scope_string(scopes: &BTreeSet<Scope>) -> String {
    scopes
        .iter()
        .map(Scope::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `{a, b}` rendering for error messages.
pub(crate) fn display_scopes(scopes: &BTreeSet<Scope>) -> String {
    let joined = scopes
        .iter()
        .map(Scope::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", joined)
}
