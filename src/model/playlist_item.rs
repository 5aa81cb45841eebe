use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{Error as _, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::decode_variant;
use crate::model::{Episode, IdCategory, Track};

/// An item of a playlist or of the playback queue, discriminated by its `type`
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOrEpisode {
    Track(Box<Track>),
    Episode(Box<Episode>),
}

const VARIANTS: &[&str] = &["track", "episode"];

impl TrackOrEpisode {
    pub fn name(&self) -> &str {
        match self {
            TrackOrEpisode::Track(track) => &track.name,
            TrackOrEpisode::Episode(episode) => &episode.name,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            TrackOrEpisode::Track(track) => track.uri.as_deref(),
            TrackOrEpisode::Episode(episode) => episode.uri.as_deref(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            TrackOrEpisode::Track(track) => track.id.as_deref(),
            TrackOrEpisode::Episode(episode) => episode.id.as_deref(),
        }
    }

    pub fn duration_ms(&self) -> Option<u32> {
        match self {
            TrackOrEpisode::Track(track) => track.duration_ms,
            TrackOrEpisode::Episode(episode) => episode.duration_ms,
        }
    }

    pub fn is_explicit(&self) -> bool {
        match self {
            TrackOrEpisode::Track(track) => track.explicit,
            TrackOrEpisode::Episode(episode) => episode.explicit,
        }
    }

    pub fn external_urls(&self) -> Option<&HashMap<String, String>> {
        match self {
            TrackOrEpisode::Track(track) => track.external_urls.as_ref(),
            TrackOrEpisode::Episode(episode) => episode.external_urls.as_ref(),
        }
    }

    pub fn object_type(&self) -> IdCategory {
        match self {
            TrackOrEpisode::Track(_) => IdCategory::Track,
            TrackOrEpisode::Episode(_) => IdCategory::Episode,
        }
    }
}

impl<'de> Deserialize<'de> for TrackOrEpisode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;

        let tag = match value.get("type") {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(de::Error::custom(format!(
                    "expected `type` to be a string, found {}",
                    other
                )));
            }
            None => return Err(de::Error::missing_field("type")),
        };

        match tag.as_str() {
            "track" => decode_variant(value).map(|track| TrackOrEpisode::Track(Box::new(track))),
            "episode" => {
                decode_variant(value).map(|episode| TrackOrEpisode::Episode(Box::new(episode)))
            }
            other => Err(de::Error::unknown_variant(other, VARIANTS)),
        }
    }
}

impl Serialize for TrackOrEpisode {
    /// The `type` tag is always written from the variant, whatever the inner
    /// `object_type` says.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (encoded, tag) = match self {
            TrackOrEpisode::Track(track) => (serde_json::to_value(track), IdCategory::Track),
            TrackOrEpisode::Episode(episode) => {
                (serde_json::to_value(episode), IdCategory::Episode)
            }
        };
        let mut value = encoded.map_err(S::Error::custom)?;
        match &mut value {
            Value::Object(object) => {
                object.insert("type".to_string(), Value::String(tag.as_str().to_string()));
            }
            other => {
                return Err(S::Error::custom(format!(
                    "expected {} to encode as an object, found {}",
                    tag, other
                )));
            }
        }
        value.serialize(serializer)
    }
}

/// An entry of a playlist's items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemContainer {
    /// Missing for some very old playlists.
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_local: bool,
    /// `None` if the item is no longer available.
    #[serde(default)]
    pub track: Option<TrackOrEpisode>,
}
