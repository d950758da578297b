//! UI payload builders for targeted messages and app messages.
//!
//! The shape of each payload is decided when it is built: dialogs are
//! [`UiPayload::Annotation`], cards are [`UiPayload::Attachment`]. Senders
//! route on the tag instead of inspecting fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, SdkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ButtonStyle {
    #[default]
    Primary,
    Secondary,
}

impl ButtonStyle {
    fn from_secondary(secondary: bool) -> Self {
        if secondary {
            Self::Secondary
        } else {
            Self::Primary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostbackButton {
    pub title: String,
    pub id: String,
    pub style: ButtonStyle,
}

/// Button shown in a generic (non-card) dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub postback_button: PostbackButton,
}

/// Button shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardButton {
    pub text: String,
    pub payload: String,
    pub style: ButtonStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericAnnotation {
    pub title: String,
    pub text: String,
    pub buttons: Vec<Button>,
}

/// Plain action-fulfillment dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub generic_annotation: GenericAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationCard {
    pub title: String,
    pub subtitle: String,
    pub text: String,
    /// Milliseconds since the UNIX epoch.
    pub date: i64,
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub information_card_input: InformationCard,
}

/// Card shown in an action-fulfillment dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub card_input: CardInput,
}

/// Item placed in a targeted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UiPayload {
    Annotation(Annotation),
    Attachment(Attachment),
}

impl From<Annotation> for UiPayload {
    fn from(value: Annotation) -> Self {
        Self::Annotation(value)
    }
}

impl From<Attachment> for UiPayload {
    fn from(value: Attachment) -> Self {
        Self::Attachment(value)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SdkError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Build a button for a generic dialog.
pub fn button(id: &str, title: &str, secondary: bool) -> Result<Button> {
    require("button id", id)?;
    require("button title", title)?;

    Ok(Button {
        postback_button: PostbackButton {
            title: title.to_string(),
            id: id.to_string(),
            style: ButtonStyle::from_secondary(secondary),
        },
    })
}

/// Build a card for an action-fulfillment dialog. `date` defaults to now.
pub fn card(
    title: &str,
    subtitle: &str,
    text: &str,
    buttons: Vec<CardButton>,
    date: Option<DateTime<Utc>>,
) -> Result<UiPayload> {
    require("card title", title)?;
    require("card subtitle", subtitle)?;
    require("card text", text)?;

    let date = date.unwrap_or_else(Utc::now).timestamp_millis();

    Ok(UiPayload::Attachment(Attachment {
        kind: "CARD".to_string(),
        card_input: CardInput {
            kind: "INFORMATION".to_string(),
            information_card_input: InformationCard {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                text: text.to_string(),
                date,
                buttons,
            },
        },
    }))
}

/// Build a card button. Structured payloads are JSON-encoded.
pub fn card_button(text: &str, payload: Option<&Value>, secondary: bool) -> Result<CardButton> {
    require("card button text", text)?;

    let payload = match payload {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => other.to_string(),
    };

    Ok(CardButton { text: text.to_string(), payload, style: ButtonStyle::from_secondary(secondary) })
}

/// Build a plain (non-card) action-fulfillment dialog.
pub fn generic(title: &str, text: &str, buttons: Vec<Button>) -> UiPayload {
    UiPayload::Annotation(Annotation {
        generic_annotation: GenericAnnotation {
            title: title.to_string(),
            text: text.to_string(),
            buttons,
        },
    })
}

/// Generic annotation carried by an app message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageAnnotation(Map<String, Value>);

impl MessageAnnotation {
    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Build a basic message annotation. `options` (e.g. color, actor) are
/// merged over the defaults.
pub fn message(text: &str, options: Option<Map<String, Value>>) -> MessageAnnotation {
    let mut annotation = Map::new();
    annotation.insert("type".to_string(), Value::from("generic"));
    annotation.insert("version".to_string(), Value::from("1"));
    annotation.insert("text".to_string(), Value::from(text));

    if let Some(options) = options {
        annotation.extend(options);
    }

    MessageAnnotation(annotation)
}
