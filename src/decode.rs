use std::cell::RefCell;
use std::fmt;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;

/// The data from the Web API could not be decoded into the expected type.
///
/// Carries everything needed to diagnose a change in the shape of a response
/// without re-running the request: the raw payload, the http status, the
/// underlying `serde_json` error and the path to the first offending field,
/// e.g. `items[27].track.album.release_date`.
#[derive(Debug)]
pub struct DecodeFailure {
    raw_data: Option<Vec<u8>>,
    data_string: Option<String>,
    expected_type: &'static str,
    status: Option<StatusCode>,
    underlying_error: serde_json::Error,
    field_path: Option<String>,
}

impl DecodeFailure {
    pub fn new(
        raw_data: Option<Vec<u8>>,
        expected_type: &'static str,
        status: Option<StatusCode>,
        underlying_error: serde_json::Error,
        field_path: Option<String>,
    ) -> Self {
        let data_string = raw_data
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(str::to_string);

        Self {
            raw_data,
            data_string,
            expected_type,
            status,
            underlying_error,
            field_path,
        }
    }

    pub fn raw_data(&self) -> Option<&[u8]> {
        self.raw_data.as_deref()
    }

    /// The raw data as UTF-8, or `None` if it is not valid UTF-8.
    pub fn data_string(&self) -> Option<&str> {
        self.data_string.as_deref()
    }

    pub fn expected_type(&self) -> &'static str {
        self.expected_type
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn underlying_error(&self) -> &serde_json::Error {
        &self.underlying_error
    }

    pub fn field_path(&self) -> Option<&str> {
        self.field_path.as_deref()
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "DecodeFailure: the data from the Spotify web API could not be decoded into '{}'",
            self.expected_type
        )?;
        match self.status {
            Some(status) => writeln!(f, "http status code: {}", status.as_u16())?,
            None => writeln!(f, "http status code: nil")?,
        }
        if let Some(path) = &self.field_path {
            writeln!(f, "formatted coding path: {}", path)?;
        }
        writeln!(f, "underlying error: {}", self.underlying_error)?;
        write!(
            f,
            "raw data:\n{}",
            self.data_string
                .as_deref()
                .unwrap_or("The data could not be decoded into a string")
        )
    }
}

impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.underlying_error)
    }
}

/// Decode `bytes` as JSON into `T`, recording the path to the first field that
/// failed to decode.
pub fn decode_json<T: DeserializeOwned>(
    bytes: &[u8],
    status: Option<StatusCode>,
) -> Result<T, Box<DecodeFailure>> {
    NESTED_PATH.with(|nested| nested.borrow_mut().take());
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let result = serde_path_to_error::deserialize::<_, T>(&mut deserializer)
        .map_err(|error| {
            let path = format_path(error.path(), error.inner());
            (error.into_inner(), path)
        })
        .and_then(|value| {
            deserializer
                .end()
                .map(|()| value)
                .map_err(|error| (error, None))
        });

    result.map_err(|(error, path)| {
        Box::new(DecodeFailure::new(
            Some(bytes.to_vec()),
            std::any::type_name::<T>(),
            status,
            error,
            path,
        ))
    })
}

/// Formats a path the way the field would be accessed in code, e.g.
/// `items[27].track.album.release_date`. A missing field is appended to the
/// path of its container.
fn format_path(path: &serde_path_to_error::Path, error: &serde_json::Error) -> Option<String> {
    let mut formatted = String::new();
    for segment in path.iter() {
        match segment {
            Segment::Seq { index } => formatted.push_str(&format!("[{}]", index)),
            Segment::Map { key } => push_key(&mut formatted, key),
            Segment::Enum { variant } => push_key(&mut formatted, variant),
            Segment::Unknown => push_key(&mut formatted, "?"),
        }
    }

    let message = error.to_string();
    if let Some(nested) = take_nested_path(&message) {
        push_segment(&mut formatted, &nested);
    }
    if let Some(field) = missing_field(error, &message) {
        push_key(&mut formatted, field);
    }

    if formatted.is_empty() {
        None
    } else {
        Some(formatted)
    }
}

fn push_key(formatted: &mut String, key: &str) {
    if !formatted.is_empty() {
        formatted.push('.');
    }
    formatted.push_str(key);
}

/// Appends a formatted path such as `album.release_date` or `[2].name`.
fn push_segment(formatted: &mut String, path: &str) {
    if path.starts_with('[') {
        formatted.push_str(path);
    } else {
        push_key(formatted, path);
    }
}

/// serde reports missing fields as "missing field `name`" without adding the
/// field to the path.
fn missing_field<'m>(error: &serde_json::Error, message: &'m str) -> Option<&'m str> {
    if !error.is_data() {
        return None;
    }
    let rest = message.strip_prefix("missing field `")?;
    let end = rest.find('`')?;
    Some(&rest[..end])
}

/// Where decoding failed inside a buffered union value, recorded next to the
/// message of the error it belongs to.
struct NestedPath {
    message: String,
    path: String,
}

thread_local! {
    // Deserialization is synchronous, so the union that failed and the
    // caller that formats the error run on the same thread.
    static NESTED_PATH: RefCell<Option<NestedPath>> = const { RefCell::new(None) };
}

/// The recorded path, if it belongs to the error rendered as `message`.
/// Outer deserializers may append a position, hence the prefix test.
fn take_nested_path(message: &str) -> Option<String> {
    NESTED_PATH
        .with(|nested| nested.borrow_mut().take())
        .filter(|nested| message.starts_with(&nested.message))
        .map(|nested| nested.path)
}

fn decode_buffered<T, E>(key: Option<&str>, value: serde_json::Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: serde::de::Error,
{
    serde_path_to_error::deserialize(value).map_err(|error| {
        let message = error.inner().to_string();
        let mut path = key.map(str::to_string).unwrap_or_default();
        let local = error.path().to_string();
        if local != "." {
            push_segment(&mut path, &local);
        }
        if let Some(nested) = take_nested_path(&message) {
            push_segment(&mut path, &nested);
        }
        if !path.is_empty() {
            NESTED_PATH.with(|nested| {
                *nested.borrow_mut() = Some(NestedPath {
                    message: message.clone(),
                    path,
                })
            });
        }
        E::custom(error.into_inner())
    })
}

/// Decode a buffered variant of a union. The path to the failing field is
/// kept aside so that [`decode_json`] can report it.
pub(crate) fn decode_variant<T, E>(value: serde_json::Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: serde::de::Error,
{
    decode_buffered(None, value)
}

/// Like [`decode_variant`] for the value of the field `key` of a buffered
/// object.
pub(crate) fn decode_field<T, E>(key: &str, value: serde_json::Value) -> Result<T, E>
where
    T: DeserializeOwned,
    E: serde::de::Error,
{
    decode_buffered(Some(key), value)
}
