//! Helpers for the backend's JSON conventions, shared by the storefront and
//! admin clients.
//!
//! The backend is inconsistent about envelopes: a list may arrive bare
//! (`[...]`) or wrapped (`{"products": [...]}`), a single record bare or as
//! `{"product": {...}}`, and a create acknowledgement names the new id
//! `insertedId`, `_id` or `orderId`. Everything here is pure; the clients do
//! the I/O.

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// Header used to correlate client and backend logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build `base/seg1/seg2...`, percent-encoding each segment and keeping any
/// path prefix on `base`. `None` if `base` cannot carry a path.
#[must_use]
pub fn endpoint(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

/// Human-readable message from an error body (`message`, then `error`).
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    first_string(body, &["message", "error"])
}

/// Id reported by a create call, if the acknowledgement carries one.
#[must_use]
pub fn inserted_id(body: &str) -> Option<String> {
    first_string(body, &["insertedId", "_id", "orderId"])
}

fn first_string(body: &str, keys: &[&str]) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

/// Decode a list that is either bare or wrapped under `key`.
///
/// # Errors
///
/// Returns the JSON error when the body is neither shape.
pub fn decode_list<T: DeserializeOwned>(body: &str, key: &str) -> Result<Vec<T>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Object(mut object) if object.contains_key(key) => {
            serde_json::from_value(object.remove(key).unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}

/// Decode a single record that is either bare or wrapped under `key`.
/// `null` (or a wrapped `null`) is `None`.
///
/// # Errors
///
/// Returns the JSON error when the record does not deserialize.
pub fn decode_one<T: DeserializeOwned>(body: &str, key: &str) -> Result<Option<T>, serde_json::Error> {
    let value: Value = serde_json::from_str(body)?;
    match value {
        Value::Object(mut object) if object.len() == 1 && object.contains_key(key) => {
            serde_json::from_value(object.remove(key).unwrap_or(Value::Null))
        }
        other => serde_json::from_value(other),
    }
}
