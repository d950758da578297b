//! Message content, focus, and targeted-message inputs.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ui::{message, MessageAnnotation, UiPayload};
use crate::constants::{FOCUS_CONFIDENCE, FOCUS_VERSION};
use crate::errors::{Result, SdkError};

/// Content sent into a space as an app message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// Plain text, wrapped in a generic annotation.
    Text(String),
    Annotation(Value),
    Annotations(Vec<Value>),
}

impl MessageContent {
    pub fn into_annotations(self) -> Vec<Value> {
        match self {
            Self::Text(text) => vec![message(&text, None).into_value()],
            Self::Annotation(annotation) => vec![annotation],
            Self::Annotations(annotations) => annotations,
        }
    }
}

impl From<&str> for MessageContent {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MessageContent {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<MessageAnnotation> for MessageContent {
    fn from(value: MessageAnnotation) -> Self {
        Self::Annotation(value.into_value())
    }
}

/// Body of `POST v1/spaces/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: &'static str,
    pub annotations: Vec<Value>,
}

impl AppMessage {
    pub fn new(content: MessageContent) -> Self {
        Self { kind: "appMessage", version: "1", annotations: content.into_annotations() }
    }
}

/// Focus to attach to a phrase inside a message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FocusRequest {
    pub phrase: String,
    pub lens: String,
    pub category: String,
    pub actions: Vec<String>,
    /// Persisted with the focus and passed to receivers.
    pub payload: Option<Value>,
    /// Hide from Moments.
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageFocus {
    pub phrase: String,
    pub lens: String,
    pub category: String,
    pub actions: Vec<String>,
    pub confidence: f64,
    pub payload: String,
    pub start: i64,
    pub end: i64,
    pub version: u32,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFocusInput {
    pub message_id: String,
    pub message_focus: MessageFocus,
}

/// Id of a message from `getMessage` (`id`) or a webhook (`messageId`).
pub fn message_id(message: &Value) -> Option<&str> {
    message
        .get("id")
        .and_then(Value::as_str)
        .or_else(|| message.get("messageId").and_then(Value::as_str))
}

/// Character offset of `phrase` within the message text, `-1` when absent.
///
/// App-created messages carry their text in the first generic annotation;
/// user-created messages carry it in `content`.
pub fn locate_phrase(message: &Value, phrase: &str) -> i64 {
    let first_annotation = message.get("annotations").and_then(Value::as_array).and_then(|a| a.first());

    let text = match first_annotation {
        Some(annotation) if annotation.get("type").and_then(Value::as_str) == Some("generic") => {
            annotation.get("text").and_then(Value::as_str)
        }
        _ => message.get("content").and_then(Value::as_str),
    };

    text.and_then(|text| text.find(phrase).map(|byte| text[..byte].chars().count() as i64))
        .unwrap_or(-1)
}

impl AddFocusInput {
    /// Build the mutation input for focusing `request.phrase` in `message`.
    pub fn for_message(message: &Value, request: FocusRequest) -> Result<Self> {
        let id = message_id(message)
            .ok_or_else(|| SdkError::InvalidInput("message has neither id nor messageId".into()))?;

        let start = locate_phrase(message, &request.phrase);
        let end = start + request.phrase.chars().count() as i64;

        let payload = match request.payload {
            None | Some(Value::Null) => String::new(),
            Some(value) => value.to_string(),
        };

        Ok(Self {
            message_id: id.to_string(),
            message_focus: MessageFocus {
                phrase: request.phrase,
                lens: request.lens,
                category: request.category,
                actions: request.actions,
                confidence: FOCUS_CONFIDENCE,
                payload,
                start,
                end,
                version: FOCUS_VERSION,
                hidden: request.hidden,
            },
        })
    }
}

/// Conversation and dialog targeted by an `actionSelected` annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTarget {
    pub conversation_id: String,
    pub target_dialog_id: String,
}

impl ActionTarget {
    pub fn from_annotation(annotation: &Value) -> Result<Self> {
        Self::deserialize(annotation).map_err(|e| {
            SdkError::InvalidInput(format!("annotation is not an action target: {e}"))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetedMessageInput {
    pub conversation_id: String,
    pub target_user_id: String,
    pub target_dialog_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<UiPayload>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<UiPayload>,
}

impl TargetedMessageInput {
    /// Route each item by its tag: annotations and attachments travel in
    /// separate lists.
    pub fn new(user_id: &str, target: ActionTarget, items: Vec<UiPayload>) -> Self {
        let (annotations, attachments) =
            items.into_iter().partition(|item| matches!(item, UiPayload::Annotation(_)));

        Self {
            conversation_id: target.conversation_id,
            target_user_id: user_id.to_string(),
            target_dialog_id: target.target_dialog_id,
            annotations,
            attachments,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.attachments.is_empty()
    }
}

/// Variables for the add-member mutation.
pub fn add_member_input(space_id: &str, member_ids: &[String]) -> Value {
    json!({
        "input": {
            "id": space_id,
            "members": member_ids,
            "memberOperation": "ADD"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ui::{card, generic};

    #[test]
    fn text_content_becomes_generic_annotation() {
        let body = AppMessage::new("hello".into());
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["type"], "appMessage");
        assert_eq!(value["version"], "1");
        assert_eq!(value["annotations"][0]["type"], "generic");
        assert_eq!(value["annotations"][0]["text"], "hello");
    }

    #[test]
    fn single_annotation_is_wrapped_in_list() {
        let content = MessageContent::Annotation(json!({"type": "custom"}));
        assert_eq!(content.into_annotations(), vec![json!({"type": "custom"})]);
    }

    #[test]
    fn phrase_is_located_in_app_created_annotation() {
        let message = json!({
            "id": "m1",
            "annotations": [{"type": "generic", "text": "please commit the code"}],
            "content": "ignored"
        });
        assert_eq!(locate_phrase(&message, "commit"), 7);
    }

    #[test]
    fn phrase_is_located_in_user_content() {
        let message = json!({"messageId": "m2", "content": "ship it now"});
        assert_eq!(locate_phrase(&message, "it"), 5);
        assert_eq!(locate_phrase(&message, "absent"), -1);
    }

    #[test]
    fn focus_input_uses_platform_constants() {
        let message = json!({"messageId": "m2", "content": "ship it now"});
        let request = FocusRequest {
            phrase: "ship".into(),
            lens: "Deploy".into(),
            category: "devops".into(),
            actions: vec!["deploy".into()],
            payload: Some(json!({"env": "prod"})),
            hidden: false,
        };
        let input = AddFocusInput::for_message(&message, request).unwrap();
        let value = serde_json::to_value(&input).unwrap();

        assert_eq!(value["messageId"], "m2");
        assert_eq!(value["messageFocus"]["start"], 0);
        assert_eq!(value["messageFocus"]["end"], 4);
        assert_eq!(value["messageFocus"]["confidence"], 0.99);
        assert_eq!(value["messageFocus"]["version"], 1);
        assert_eq!(value["messageFocus"]["payload"], r#"{"env":"prod"}"#);
    }

    #[test]
    fn focus_requires_a_message_id() {
        let err = AddFocusInput::for_message(&json!({"content": "x"}), FocusRequest::default());
        assert!(matches!(err, Err(SdkError::InvalidInput(_))));
    }

    #[test]
    fn targeted_input_routes_items_by_tag() {
        let target = ActionTarget::from_annotation(&json!({
            "conversationId": "c1",
            "targetDialogId": "d1",
            "actionId": "ignored"
        }))
        .unwrap();
        let items = vec![generic("t", "x", vec![]), card("a", "b", "c", vec![], None).unwrap()];
        let input = TargetedMessageInput::new("u1", target, items);

        assert_eq!(input.annotations.len(), 1);
        assert_eq!(input.attachments.len(), 1);
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["targetUserId"], "u1");
        assert_eq!(value["conversationId"], "c1");
    }

    #[test]
    fn empty_item_lists_are_omitted() {
        let target = ActionTarget { conversation_id: "c".into(), target_dialog_id: "d".into() };
        let input = TargetedMessageInput::new("u", target, vec![generic("t", "x", vec![])]);
        let value = serde_json::to_value(&input).unwrap();
        assert!(value.get("attachments").is_none());
        assert!(!input.is_empty());
    }
}
