//! Query and mutation templates for the platform's GraphQL API.

use super::fields::{FieldSpec, RequiredFieldPolicy, DEFAULT_FIELD};
use super::projection::project;
use super::ProjectionError;

pub const ADD_MEMBER: &str = r"mutation addMembers($input: UpdateSpaceInput!) {
  updateSpace(input: $input) {
    memberIdsChanged
  }
}";

pub const ADD_MESSAGE_FOCUS: &str = r"mutation AddMessageFocus($input: AddFocusInput!) {
  addMessageFocus(input: $input) {
    message {
      id
      annotations
    }
  }
}";

pub const CREATE_SYNCHRONOUS_MESSAGE: &str = r"mutation createMessage($input: CreateMessageInput!) {
  createMessage(input: $input) {
    message {
      id
    }
  }
}";

pub const CREATE_TARGETED_MESSAGE: &str = r"mutation CreateTargetedMessage($input: CreateTargetedMessageInput!) {
  createTargetedMessage(input: $input) {
    successful
  }
}";

fn selection(fields: FieldSpec, policy: RequiredFieldPolicy) -> Result<String, ProjectionError> {
    let fields = policy.apply(fields, DEFAULT_FIELD)?;
    project(Some(&fields))
}

/// Query for the authenticated app or user.
pub fn get_me(fields: FieldSpec, policy: RequiredFieldPolicy) -> Result<String, ProjectionError> {
    Ok(format!("query GetMe {{\n  me {{\n    {}\n  }}\n}}", selection(fields, policy)?))
}

/// Query for a message by `$id`.
pub fn get_message(
    fields: FieldSpec,
    policy: RequiredFieldPolicy,
) -> Result<String, ProjectionError> {
    Ok(format!(
        "query GetMessage($id: ID!) {{\n  message(id: $id) {{\n    {}\n  }}\n}}",
        selection(fields, policy)?
    ))
}

/// Query for a space by `$id`.
pub fn get_space(fields: FieldSpec, policy: RequiredFieldPolicy) -> Result<String, ProjectionError> {
    Ok(format!(
        "query GetSpace($id: ID!) {{\n  space(id: $id) {{\n    {}\n  }}\n}}",
        selection(fields, policy)?
    ))
}
