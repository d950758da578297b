//! Field projection: serializes a [`FieldSpec`] into GraphQL selection
//! syntax.
//!
//! ```text
//! Selection := Field | Field '{' Selection+ '}'
//! ```
//!
//! Output order always matches input order.

use tracing::warn;

use super::fields::{FieldSpec, Selection, DEFAULT_FIELD};
use super::ProjectionError;

/// Project `fields` into a selection set body.
///
/// Absent or empty input yields the single default field `id` and emits a
/// warning; most accessors need at least one field to form a valid query.
///
/// # Examples
///
/// ```
/// use wwsdk_common::graphql::{project, FieldSpec};
///
/// let fields = FieldSpec::from(["id"]).nested("createdBy", ["id", "displayName"]);
/// assert_eq!(project(Some(&fields)).unwrap(), "id createdBy { id displayName }");
/// ```
pub fn project(fields: Option<&FieldSpec>) -> Result<String, ProjectionError> {
    match fields {
        Some(fields) if !fields.is_empty() => project_selections(fields),
        _ => {
            warn!("No GraphQL fields requested; only {DEFAULT_FIELD} will be returned");
            Ok(DEFAULT_FIELD.to_string())
        }
    }
}

fn project_selections(fields: &FieldSpec) -> Result<String, ProjectionError> {
    let mut parts = Vec::with_capacity(fields.len());

    for selection in fields {
        match selection {
            Selection::Field(name) => {
                parts.push(validated_name(name)?.to_string());
            }
            Selection::Nested { name, fields } => {
                let name = validated_name(name)?;
                if fields.is_empty() {
                    return Err(ProjectionError::InvalidFieldSpec(format!(
                        "nested selection '{name}' has no fields"
                    )));
                }
                parts.push(format!("{name} {{ {} }}", project_selections(fields)?));
            }
        }
    }

    Ok(parts.join(" "))
}

/// Names are emitted verbatim so arguments and aliases pass through. Only a
/// blank name is rejected.
fn validated_name(name: &str) -> Result<&str, ProjectionError> {
    if name.trim().is_empty() {
        return Err(ProjectionError::InvalidFieldSpec("blank field name".to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_are_space_joined_in_order() {
        let fields = FieldSpec::from(["id", "displayName", "email"]);
        assert_eq!(project(Some(&fields)).unwrap(), "id displayName email");
    }

    #[test]
    fn nested_selections_are_wrapped_in_braces() {
        let fields = FieldSpec::from(["id", "content"]).nested("createdBy", ["id", "displayName"]);
        let projected = project(Some(&fields)).unwrap();
        assert_eq!(projected, "id content createdBy { id displayName }");
    }

    #[test]
    fn deeply_nested_selections_recurse() {
        let members = FieldSpec::new().nested("items", ["id", "email"]);
        let fields = FieldSpec::from(["id"]).nested("members", members);
        assert_eq!(project(Some(&fields)).unwrap(), "id members { items { id email } }");
    }

    #[test]
    fn empty_and_absent_input_fall_back_to_id() {
        assert_eq!(project(None).unwrap(), "id");
        assert_eq!(project(Some(&FieldSpec::new())).unwrap(), "id");
    }

    #[test]
    fn empty_nested_selection_is_rejected() {
        let fields = FieldSpec::from(["id"]).nested("createdBy", FieldSpec::new());
        assert!(matches!(project(Some(&fields)), Err(ProjectionError::InvalidFieldSpec(_))));
    }

    #[test]
    fn strings_with_arguments_and_aliases_are_appended_verbatim() {
        let fields = FieldSpec::from([
            "id",
            "members(first: 5) { items { id } }",
            "owner: createdBy { id }",
        ]);
        assert_eq!(
            project(Some(&fields)).unwrap(),
            "id members(first: 5) { items { id } } owner: createdBy { id }"
        );

        let fields = FieldSpec::from(["id"]).nested("conversation(id: $cid)", ["title"]);
        assert_eq!(project(Some(&fields)).unwrap(), "id conversation(id: $cid) { title }");
    }

    #[test]
    fn blank_field_names_are_rejected() {
        for blank in ["", "  "] {
            let fields = FieldSpec::from(["id", blank]);
            assert!(matches!(project(Some(&fields)), Err(ProjectionError::InvalidFieldSpec(_))));
        }
    }

    #[test]
    fn projection_is_repeatable() {
        let fields = FieldSpec::from(["id"]).nested("space", ["title"]);
        assert_eq!(project(Some(&fields)).unwrap(), project(Some(&fields)).unwrap());
    }
}
