use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::model::{PlaybackContextObject, TrackOrEpisode};

/// The user's playback state: the active device, what is playing, and which
/// player commands are currently available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentlyPlayingContext {
    pub device: Device,
    pub shuffle_state: bool,
    pub repeat_state: RepeatState,
    /// When this state was captured.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context: Option<PlaybackContextObject>,
    #[serde(default)]
    pub progress_ms: Option<u32>,
    /// `None` while an ad or an unknown item is playing.
    #[serde(default)]
    pub item: Option<TrackOrEpisode>,
    pub currently_playing_type: CurrentlyPlayingType,
    /// Sent as `{"disallows": {"<action>": true, ...}}`.
    #[serde(
        rename = "actions",
        serialize_with = "serialize_actions",
        deserialize_with = "deserialize_actions"
    )]
    pub disallowed_actions: BTreeSet<PlaybackActions>,
    pub is_playing: bool,
}

impl CurrentlyPlayingContext {
    /// Every action not listed as disallowed.
    pub fn allowed_actions(&self) -> BTreeSet<PlaybackActions> {
        PlaybackActions::iter()
            .filter(|action| !self.disallowed_actions.contains(action))
            .collect()
    }
}

/// A device that can play content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// `None` for some restricted devices.
    #[serde(default)]
    pub id: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub is_private_session: bool,
    /// Restricted devices accept no Web API commands.
    #[serde(default)]
    pub is_restricted: bool,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub volume_percent: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    Computer,
    Tablet,
    Smartphone,
    Speaker,
    #[serde(rename = "TV")]
    Tv,
    #[serde(rename = "AVR")]
    Avr,
    #[serde(rename = "STB")]
    Stb,
    AudioDongle,
    GameConsole,
    CastVideo,
    CastAudio,
    Automobile,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatState {
    Off,
    Track,
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrentlyPlayingType {
    Track,
    Episode,
    Ad,
    #[serde(other)]
    Unknown,
}

/// Player commands that may be unavailable, e.g. skipping while an ad plays.
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
pub enum PlaybackActions {
    #[strum(serialize = "interrupting_playback")]
    InterruptPlayback,
    #[strum(serialize = "pausing")]
    Pause,
    #[strum(serialize = "resuming")]
    Resume,
    #[strum(serialize = "seeking")]
    Seek,
    #[strum(serialize = "skipping_next")]
    SkipToNext,
    #[strum(serialize = "skipping_prev")]
    SkipToPrevious,
    #[strum(serialize = "toggling_repeat_context")]
    ToggleRepeatContext,
    #[strum(serialize = "toggling_repeat_track")]
    ToggleRepeatTrack,
    #[strum(serialize = "toggling_shuffle")]
    ToggleShuffle,
    #[strum(serialize = "transferring_playback")]
    TransferPlayback,
}

impl TryFrom<String> for PlaybackActions {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Serialize, Deserialize)]
struct ActionsObject<M> {
    #[serde(default)]
    disallows: M,
}

fn serialize_actions<S: Serializer>(
    disallowed: &BTreeSet<PlaybackActions>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let disallows: BTreeMap<&'static str, bool> = disallowed
        .iter()
        .map(|action| ((*action).into(), true))
        .collect();
    ActionsObject { disallows }.serialize(serializer)
}

/// Actions mapped to `false` are allowed. Actions this crate does not know
/// are skipped.
fn deserialize_actions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeSet<PlaybackActions>, D::Error> {
    let actions = ActionsObject::<HashMap<String, bool>>::deserialize(deserializer)?;
    Ok(actions
        .disallows
        .into_iter()
        .filter(|(_, disallowed)| *disallowed)
        .filter_map(|(raw, _)| match raw.parse::<PlaybackActions>() {
            Ok(action) => Some(action),
            Err(_) => {
                tracing::debug!("Ignoring unknown playback action: {}", raw);
                None
            }
        })
        .collect())
}
