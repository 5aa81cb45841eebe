use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::decode_field;
use crate::model::PositionOrUriOffset;
use crate::model::shape::{ShapeMatcher, deserialize_object, match_shape};

/// What to play: a context such as an album or playlist, or an explicit list
/// of track and episode uris.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaybackContext {
    ContextUri(String),
    Uris(Vec<String>),
}

fn context_uri(value: &Value) -> Option<PlaybackContext> {
    value
        .as_str()
        .map(|uri| PlaybackContext::ContextUri(uri.to_string()))
}

fn uris(value: &Value) -> Option<PlaybackContext> {
    value
        .as_array()?
        .iter()
        .map(|uri| uri.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .map(PlaybackContext::Uris)
}

const CONTEXT_SHAPES: [ShapeMatcher<PlaybackContext>; 2] = [
    ShapeMatcher {
        key: "context_uri",
        description: r#"{"context_uri": <string>}"#,
        extract: context_uri,
    },
    ShapeMatcher {
        key: "uris",
        description: r#"{"uris": [<string>]}"#,
        extract: uris,
    },
];

/// The body of the "start/resume playback" endpoint.
///
/// The context keys are flattened into the body next to `offset` and
/// `position_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackRequest {
    pub context: PlaybackContext,
    /// Only valid for album and playlist contexts or with `uris`.
    pub offset: Option<PositionOrUriOffset>,
    pub position_ms: Option<u32>,
}

impl PlaybackRequest {
    pub fn new(context: PlaybackContext) -> Self {
        Self {
            context,
            offset: None,
            position_ms: None,
        }
    }

    pub fn with_offset(mut self, offset: PositionOrUriOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_position_ms(mut self, position_ms: u32) -> Self {
        self.position_ms = Some(position_ms);
        self
    }
}

impl<'de> Deserialize<'de> for PlaybackRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut object = deserialize_object(deserializer)?;
        let context = match_shape(&object, &CONTEXT_SHAPES)?;

        let offset = match object.remove("offset") {
            None | Some(Value::Null) => None,
            Some(value) => Some(decode_field("offset", value)?),
        };
        let position_ms = match object.remove("position_ms") {
            None | Some(Value::Null) => None,
            Some(value) => Some(decode_field("position_ms", value)?),
        };

        Ok(Self {
            context,
            offset,
            position_ms,
        })
    }
}

impl Serialize for PlaybackRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + usize::from(self.offset.is_some()) + usize::from(self.position_ms.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        match &self.context {
            PlaybackContext::ContextUri(uri) => map.serialize_entry("context_uri", uri)?,
            PlaybackContext::Uris(uris) => map.serialize_entry("uris", uris)?,
        }
        if let Some(offset) = &self.offset {
            map.serialize_entry("offset", offset)?;
        }
        if let Some(position_ms) = &self.position_ms {
            map.serialize_entry("position_ms", position_ms)?;
        }
        map.end()
    }
}
