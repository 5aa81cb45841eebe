//! Decoding of structural unions: JSON objects whose variant is given by which
//! of several mutually exclusive keys is present rather than by a type tag.
//!
//! A union is described by an ordered list of [`ShapeMatcher`]s. Matching is
//! deterministic:
//! 1. if more than one candidate key is present the input is rejected;
//! 2. otherwise the first matcher whose key is present and whose extractor
//!    accepts the value wins;
//! 3. if none match, the error lists every shape that was tried.
//!
//! Keys that belong to none of the shapes are ignored.

use serde::de;
use serde_json::{Map, Value};

pub(crate) struct ShapeMatcher<T> {
    pub key: &'static str,
    /// Rendered in error messages, e.g. `{"position": <integer>}`.
    pub description: &'static str,
    pub extract: fn(&Value) -> Option<T>,
}

pub(crate) fn match_shape<T, E: de::Error>(
    object: &Map<String, Value>,
    shapes: &[ShapeMatcher<T>],
) -> Result<T, E> {
    let present: Vec<&str> = shapes
        .iter()
        .map(|shape| shape.key)
        .filter(|key| object.contains_key(*key))
        .collect();

    if present.len() > 1 {
        let keys = present
            .iter()
            .map(|key| format!("`{}`", key))
            .collect::<Vec<_>>()
            .join(" and ");
        return Err(E::custom(format!(
            "found conflicting keys {}; expected exactly one of them",
            keys
        )));
    }

    for shape in shapes {
        if let Some(value) = object.get(shape.key).and_then(shape.extract) {
            return Ok(value);
        }
    }

    let tried = shapes
        .iter()
        .enumerate()
        .map(|(index, shape)| format!("{}) {}", index + 1, shape.description))
        .collect::<Vec<_>>()
        .join(", ");
    Err(E::custom(format!(
        "expected one of the following shapes: {}",
        tried
    )))
}

/// Reads a JSON object, rejecting any other kind of value.
pub(crate) fn deserialize_object<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: de::Deserializer<'de>,
{
    de::Deserialize::deserialize(deserializer)
}
