//! Wire-format message bodies.
//!
//! Each outbound message kind has a typed builder that validates its
//! arguments and produces a [`MessagePayload`], the JSON body POSTed to the
//! `{phone_number_id}/messages` endpoint. Builders never perform network
//! calls; sending is the client façade's job.

mod interactive;
mod media;
mod messages;

pub use interactive::{
    FlowActionParams, Footer, Interactive, InteractiveAction, InteractiveBody, InteractiveHeader,
    ListRow, ListSection, ReplyButton,
};
pub use media::{MediaObject, MediaRef};
pub use messages::{
    AudioMessage, ButtonsMessage, CatalogMessage, ContactsMessage, CtaUrlMessage, DocumentMessage,
    FlowMessage, FlowMode, ImageMessage, ListMessage, LocationMessage, LocationRequestMessage,
    ReactionMessage, StickerMessage, TemplateMessage, TextMessage, VideoMessage,
};

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Value of the `messaging_product` field on every outbound body.
pub const MESSAGING_PRODUCT: &str = "whatsapp";

/// Recipient addressing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[default]
    Individual,
    Group,
}

impl FromStr for RecipientType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(Self::Individual),
            "group" => Ok(Self::Group),
            other => Err(ValidationError::new(format!(
                "recipient_type must be 'individual' or 'group' (received: {other})"
            ))),
        }
    }
}

impl std::fmt::Display for RecipientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => f.write_str("individual"),
            Self::Group => f.write_str("group"),
        }
    }
}

/// Reply context pointing at a previous message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContext {
    pub message_id: String,
}

/// A complete outbound message body.
///
/// The `type` discriminator and the matching content key both come from
/// [`MessageContent`], so they cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePayload {
    pub messaging_product: &'static str,
    pub recipient_type: RecipientType,
    pub to: String,
    #[serde(flatten)]
    pub content: MessageContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biz_opaque_callback_data: Option<String>,
}

impl MessagePayload {
    pub(crate) fn new(to: String, content: MessageContent, base: BaseOptions) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT,
            recipient_type: base.recipient_type.unwrap_or_default(),
            to,
            content,
            context: base
                .context_message_id
                .map(|message_id| MessageContext { message_id }),
            biz_opaque_callback_data: base.biz_opaque_callback_data,
        }
    }

    /// The payload as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("message payload serializes")
    }
}

/// Kind-specific message content. Internally tagged so the serialized
/// `type` always matches the content key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextContent },
    Image { image: MediaObject },
    Audio { audio: MediaObject },
    Video { video: MediaObject },
    Document { document: MediaObject },
    Sticker { sticker: MediaObject },
    Location { location: Location },
    Contacts { contacts: Vec<Value> },
    Template { template: Template },
    Reaction { reaction: Reaction },
    Interactive { interactive: Interactive },
}

/// Body of a text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<bool>,
}

/// A geographic location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A template reference. Components are passed through structurally; the
/// remote API is authoritative for template structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateLanguage {
    pub code: String,
}

/// An emoji reaction to a previous message. A missing emoji removes the
/// reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Envelope extras shared by every message builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct BaseOptions {
    pub recipient_type: Option<RecipientType>,
    pub context_message_id: Option<String>,
    pub biz_opaque_callback_data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_type_parses_known_values_only() {
        assert_eq!("individual".parse::<RecipientType>().unwrap(), RecipientType::Individual);
        assert_eq!("group".parse::<RecipientType>().unwrap(), RecipientType::Group);
        let err = "broadcast".parse::<RecipientType>().unwrap_err();
        assert!(err.message().contains("broadcast"));
        assert!(err.message().contains("'individual' or 'group'"));
    }

    #[test]
    fn type_discriminator_matches_content_key() {
        let content = MessageContent::Image {
            image: MediaObject::from(MediaRef::id("12345")),
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(value["type"], "image");
        assert!(value.get("image").is_some());
    }
}
