use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{IdCategory, Track};

/// A track the user played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: DateTime<Utc>,
    /// `None` if the track was not played from a context.
    #[serde(default)]
    pub context: Option<PlaybackContextObject>,
}

/// The context a track was played from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackContextObject {
    pub uri: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub external_urls: Option<HashMap<String, String>>,
    #[serde(rename = "type")]
    pub context_type: IdCategory,
}
