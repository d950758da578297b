//! Response normalization
//!
//! Unwraps named properties from server envelopes and post-processes
//! collections inside them. Extraction is lenient: a missing property is
//! logged and reported as [`Picked::Missing`] instead of failing, so chained
//! calls on partially-shaped responses keep working. Callers that need the
//! value use [`Picked::required`].

use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

/// Errors raised while normalizing a response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A raw string response could not be coerced into JSON.
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Missing property '{0}' in response")]
    MissingProperty(String),
}

/// Outcome of extracting a property from an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Picked {
    Found(Value),
    Missing,
}

impl Picked {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The value, if found.
    pub fn found(self) -> Option<Value> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing => None,
        }
    }

    /// The value, or [`NormalizeError::MissingProperty`].
    pub fn required(self, property: &str) -> Result<Value, NormalizeError> {
        self.found().ok_or_else(|| NormalizeError::MissingProperty(property.to_string()))
    }
}

/// Coerce a raw string response into JSON; structured values pass through.
pub fn coerce(response: Value) -> Result<Value, NormalizeError> {
    match response {
        Value::String(raw) => {
            serde_json::from_str(&raw).map_err(|e| NormalizeError::InvalidJson(e.to_string()))
        }
        other => Ok(other),
    }
}

/// Extract `property` from `response`.
///
/// A string response is parsed as JSON first. A present `null` counts as
/// found.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use wwsdk_common::normalize::{pick, Picked};
///
/// let picked = pick("message", json!({"message": {"id": "42"}})).unwrap();
/// assert_eq!(picked, Picked::Found(json!({"id": "42"})));
/// ```
pub fn pick(property: &str, response: Value) -> Result<Picked, NormalizeError> {
    let response = if response.is_string() {
        warn!(property, "Response is a raw string; converting to JSON");
        coerce(response)?
    } else {
        response
    };

    match response {
        Value::Object(mut map) => match map.remove(property) {
            Some(value) => Ok(Picked::Found(value)),
            None => {
                let rest = Value::Object(map);
                error!(property, response = %rest, "No property in response");
                Ok(Picked::Missing)
            }
        },
        other => {
            error!(property, response = %other, "Response is not an object; nothing to pick");
            Ok(Picked::Missing)
        }
    }
}

/// Apply `transform` to each element of the sequence under `property`,
/// replacing it in place.
///
/// A missing or non-sequence property leaves the envelope unchanged and
/// emits a warning.
pub fn map_collection<F, E>(property: &str, mut transform: F, mut response: Value) -> Result<Value, E>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    match response.get_mut(property) {
        Some(Value::Array(items)) => {
            let mapped = std::mem::take(items)
                .into_iter()
                .map(&mut transform)
                .collect::<Result<Vec<_>, E>>()?;
            *items = mapped;
        }
        Some(Value::Null) | None => {
            warn!(property, "Map requested on missing property");
        }
        Some(_) => {
            warn!(property, "Map requested on a property that is not a sequence");
        }
    }

    Ok(response)
}

/// Decode an element that arrives as an embedded JSON string.
///
/// Elements that are already structured pass through unchanged.
pub fn jsonify(value: Value) -> Result<Value, NormalizeError> {
    coerce(value)
}
