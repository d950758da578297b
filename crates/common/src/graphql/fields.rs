//! Field specifications for GraphQL selections.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProjectionError;

/// Field injected when a top-level accessor is asked for nothing, and
/// required by most accessors.
pub const DEFAULT_FIELD: &str = "id";

/// One entry of a [`FieldSpec`]: a bare field or a nested selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    Field(String),
    Nested { name: String, fields: FieldSpec },
}

impl Selection {
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    pub fn nested(name: impl Into<String>, fields: impl Into<FieldSpec>) -> Self {
        Self::Nested { name: name.into(), fields: fields.into() }
    }

    /// Parse one element of a JSON field list.
    fn from_value(value: &Value, path: &str) -> Result<Self, ProjectionError> {
        match value {
            Value::String(name) => Ok(Self::Field(name.clone())),
            Value::Object(map) => {
                let name = map.get("name").and_then(Value::as_str).ok_or_else(|| {
                    ProjectionError::InvalidFieldSpec(format!("{path}: nested selection has no name"))
                })?;
                let fields = map.get("fields").ok_or_else(|| {
                    ProjectionError::InvalidFieldSpec(format!(
                        "{path}: nested selection '{name}' has no fields"
                    ))
                })?;
                let fields = FieldSpec::parse(fields, &format!("{path}.{name}"))?;
                Ok(Self::Nested { name: name.to_string(), fields })
            }
            other => Err(ProjectionError::InvalidFieldSpec(format!(
                "{path}: expected a field name or {{name, fields}}, found {other}"
            ))),
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::Field(value.to_string())
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Self::Field(value)
    }
}

/// Ordered list of selections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpec(Vec<Selection>);

impl FieldSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push(Selection::field(name));
        self
    }

    /// Append a nested selection.
    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, fields: impl Into<FieldSpec>) -> Self {
        self.0.push(Selection::nested(name, fields));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Selection> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Selection] {
        &self.0
    }

    /// Whether a bare field with this name is present.
    pub fn contains_field(&self, name: &str) -> bool {
        self.0.iter().any(|s| matches!(s, Selection::Field(f) if f == name))
    }

    /// Parse a JSON array of strings and `{name, fields}` objects.
    pub fn from_value(value: &Value) -> Result<Self, ProjectionError> {
        Self::parse(value, "fields")
    }

    fn parse(value: &Value, path: &str) -> Result<Self, ProjectionError> {
        let items = value.as_array().ok_or_else(|| {
            ProjectionError::InvalidFieldSpec(format!("{path}: expected an array, found {value}"))
        })?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| Selection::from_value(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<Selection>> for FieldSpec {
    fn from(value: Vec<Selection>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for FieldSpec {
    fn from(value: Vec<&str>) -> Self {
        Self(value.into_iter().map(Selection::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldSpec {
    fn from(value: [&str; N]) -> Self {
        Self(value.into_iter().map(Selection::from).collect())
    }
}

impl FromIterator<Selection> for FieldSpec {
    fn from_iter<T: IntoIterator<Item = Selection>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldSpec {
    type Item = Selection;
    type IntoIter = std::vec::IntoIter<Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldSpec {
    type Item = &'a Selection;
    type IntoIter = std::slice::Iter<'a, Selection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Append `required` unless a bare field with that name is already present.
///
/// Idempotent; ordering of existing selections is preserved.
#[must_use]
pub fn ensure_required_field(mut fields: FieldSpec, required: &str) -> FieldSpec {
    if !fields.contains_field(required) {
        fields.0.push(Selection::field(required));
    }
    fields
}

/// What a top-level accessor does when the caller left out the required
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredFieldPolicy {
    /// Append the field silently.
    #[default]
    Inject,
    /// Refuse the request with [`ProjectionError::MissingRequiredField`].
    Reject,
}

impl RequiredFieldPolicy {
    pub fn apply(self, fields: FieldSpec, required: &str) -> Result<FieldSpec, ProjectionError> {
        match self {
            Self::Inject => Ok(ensure_required_field(fields, required)),
            Self::Reject if fields.contains_field(required) => Ok(fields),
            Self::Reject => Err(ProjectionError::MissingRequiredField(required.to_string())),
        }
    }
}
