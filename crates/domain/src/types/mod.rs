//! Domain types and models

pub mod message;
pub mod nlp;
pub mod ui;

pub use message::{
    add_member_input, locate_phrase, message_id, ActionTarget, AddFocusInput, AppMessage,
    FocusRequest, MessageContent, MessageFocus, TargetedMessageInput,
};
pub use nlp::{extract_information, NlpInformation};
pub use ui::{
    button, card, card_button, generic, message, Annotation, Attachment, Button, ButtonStyle,
    CardButton, MessageAnnotation, UiPayload,
};
