use std::fmt;

use serde::{Deserialize, Serialize};

pub mod currently_playing;
pub mod episode;
pub mod offset;
pub mod paging;
pub mod play_history;
pub mod playback;
pub mod playlist_item;
pub(crate) mod shape;
pub mod time_reference;
pub mod track;
pub mod user;

pub use currently_playing::{
    CurrentlyPlayingContext, CurrentlyPlayingType, Device, DeviceType, PlaybackActions, RepeatState,
};
pub use episode::{Episode, Show};
pub use offset::PositionOrUriOffset;
pub use paging::{CursorPage, Cursors, Page, Paginated};
pub use play_history::{PlayHistory, PlaybackContextObject};
pub use playback::{PlaybackContext, PlaybackRequest};
pub use playlist_item::{PlaylistItemContainer, TrackOrEpisode};
pub use time_reference::BeforeOrAfterTimestamp;
pub use track::{Album, Artist, Track};
pub use user::SpotifyUser;

/// The value of the `type` field of Spotify objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdCategory {
    Artist,
    Album,
    Track,
    Playlist,
    Show,
    Episode,
    User,
}

impl IdCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdCategory::Artist => "artist",
            IdCategory::Album => "album",
            IdCategory::Track => "track",
            IdCategory::Playlist => "playlist",
            IdCategory::Show => "show",
            IdCategory::Episode => "episode",
            IdCategory::User => "user",
        }
    }
}

impl fmt::Display for IdCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cover art or a profile picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}
