use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::shape::{ShapeMatcher, deserialize_object, match_shape};

/// Where playback should start within a context: the index of an item or the
/// uri of one.
///
/// On the wire this is `{"position": <integer>}` or `{"uri": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PositionOrUriOffset {
    Position(u32),
    Uri(String),
}

fn position(value: &Value) -> Option<PositionOrUriOffset> {
    value
        .as_u64()
        .and_then(|position| u32::try_from(position).ok())
        .map(PositionOrUriOffset::Position)
}

fn uri(value: &Value) -> Option<PositionOrUriOffset> {
    value
        .as_str()
        .map(|uri| PositionOrUriOffset::Uri(uri.to_string()))
}

const SHAPES: [ShapeMatcher<PositionOrUriOffset>; 2] = [
    ShapeMatcher {
        key: "position",
        description: r#"{"position": <integer>}"#,
        extract: position,
    },
    ShapeMatcher {
        key: "uri",
        description: r#"{"uri": <string>}"#,
        extract: uri,
    },
];

impl<'de> Deserialize<'de> for PositionOrUriOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = deserialize_object(deserializer)?;
        match_shape(&object, &SHAPES)
    }
}

impl Serialize for PositionOrUriOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            PositionOrUriOffset::Position(position) => map.serialize_entry("position", position)?,
            PositionOrUriOffset::Uri(uri) => map.serialize_entry("uri", uri)?,
        }
        map.end()
    }
}
