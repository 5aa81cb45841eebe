//! Endpoint wrappers. Each one marshals its parameters into a [`RequestSpec`]
//! and declares the scopes the endpoint requires.

use std::borrow::Cow;
use std::collections::BTreeSet;

use reqwest::{Method, StatusCode};

use crate::api::SpotifyApi;
use crate::auth::AuthorizationManager;
use crate::decode::decode_json;
use crate::error::SpotifyError;
use crate::model::{
    BeforeOrAfterTimestamp, CurrentlyPlayingContext, CursorPage, Page, PlayHistory,
    PlaybackRequest, PlaylistItemContainer, SpotifyUser, Track,
};
use crate::query::QueryItems;
use crate::request::RequestSpec;
use crate::scope::Scope;
use crate::transport::Transport;

/// Accepts an id or a uri such as `spotify:track:1Ta1bHJ5k0ZvNIYtJNGRkt`.
fn bare_id(id_or_uri: &str) -> &str {
    id_or_uri.rsplit(':').next().unwrap_or(id_or_uri)
}

/// The id of `id_or_uri`, percent-encoded for use as one path segment.
fn id_segment(id_or_uri: &str) -> Cow<'_, str> {
    urlencoding::encode(bare_id(id_or_uri))
}

impl<A, T> SpotifyApi<A, T>
where
    A: AuthorizationManager + ?Sized,
    T: Transport,
{
    /// The profile of the user that authorized the application. The email is
    /// only included with [`Scope::UserReadEmail`].
    pub async fn current_user_profile(&self) -> Result<SpotifyUser, SpotifyError> {
        self.get_json("/me", QueryItems::new(), &BTreeSet::new())
            .await
    }

    pub async fn track(&self, id: &str, market: Option<&str>) -> Result<Track, SpotifyError> {
        let query = QueryItems::new().with("market", market);
        self.get_json(&format!("/tracks/{}", id_segment(id)), query, &BTreeSet::new())
            .await
    }

    /// One page of the tracks and episodes of a playlist. Private playlists
    /// require [`Scope::PlaylistReadPrivate`].
    ///
    /// Use [`SpotifyApi::pages`] to walk the following pages.
    pub async fn playlist_items(
        &self,
        playlist_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
        market: Option<&str>,
    ) -> Result<Page<PlaylistItemContainer>, SpotifyError> {
        let query = QueryItems::new()
            .with("limit", limit)
            .with("offset", offset)
            .with("market", market)
            .with("additional_types", Some("track,episode"));
        self.get_json(
            &format!("/playlists/{}/tracks", id_segment(playlist_id)),
            query,
            &BTreeSet::new(),
        )
        .await
    }

    pub async fn recently_played(
        &self,
        reference: Option<BeforeOrAfterTimestamp>,
        limit: Option<u32>,
    ) -> Result<CursorPage<PlayHistory>, SpotifyError> {
        let mut query = QueryItems::new();
        if let Some(reference) = reference {
            let (key, value) = reference.as_query_item();
            query.push(key, Some(value));
        }
        query.push("limit", limit);
        self.get_json(
            "/me/player/recently-played",
            query,
            &BTreeSet::from([Scope::UserReadRecentlyPlayed]),
        )
        .await
    }

    /// The playback state of the user. `None` when no device is active.
    pub async fn currently_playing(
        &self,
        market: Option<&str>,
    ) -> Result<Option<CurrentlyPlayingContext>, SpotifyError> {
        let query = QueryItems::new()
            .with("market", market)
            .with("additional_types", Some("track,episode"));
        let response = self
            .get(
                "/me/player",
                query,
                &BTreeSet::from([Scope::UserReadPlaybackState]),
            )
            .await?;
        if response.status == StatusCode::NO_CONTENT || response.body.is_empty() {
            return Ok(None);
        }
        Ok(Some(decode_json(&response.body, Some(response.status))?))
    }

    /// Start playback of `request` on `device_id`, or on the active device.
    pub async fn play(
        &self,
        request: &PlaybackRequest,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError> {
        let spec = RequestSpec::new(Method::PUT, "/me/player/play")
            .with_query(QueryItems::new().with("device_id", device_id))
            .with_scopes([Scope::UserModifyPlaybackState])
            .with_json_body(request);
        self.execute_no_content(&spec).await
    }
}
