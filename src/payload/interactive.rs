//! Interactive message building blocks: headers, buttons, list sections,
//! and the per-kind action objects.

use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

/// Maximum length of a header or footer text.
pub(crate) const HEADER_TEXT_MAX: usize = 60;

/// Optional header on an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InteractiveHeader {
    Text { text: String },
    Image { image: super::MediaRef },
    Video { video: super::MediaRef },
    Document { document: super::MediaRef },
}

impl InteractiveHeader {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(media: super::MediaRef) -> Self {
        Self::Image { image: media }
    }

    pub fn video(media: super::MediaRef) -> Self {
        Self::Video { video: media }
    }

    pub fn document(media: super::MediaRef) -> Self {
        Self::Document { document: media }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Document { .. } => "document",
        }
    }

    /// Validate header constraints. Media variants carry a well-formed
    /// [`MediaRef`](super::MediaRef) by construction; only text needs
    /// checking.
    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        if let Self::Text { text } = self {
            if text.trim().is_empty() {
                return Err(ValidationError::new("text header requires a text field"));
            }
            let len = text.chars().count();
            if len > HEADER_TEXT_MAX {
                return Err(ValidationError::too_long("header text", HEADER_TEXT_MAX, len));
            }
        }
        Ok(())
    }

    /// List messages accept text headers only.
    pub(crate) fn validate_text_only(&self) -> Result<(), ValidationError> {
        match self {
            Self::Text { .. } => self.validate(),
            other => Err(ValidationError::new(format!(
                "list messages only support text headers (received: {})",
                other.kind()
            ))),
        }
    }
}

/// Footer text on an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub text: String,
}

impl Footer {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidationError> {
        let len = self.text.chars().count();
        if len > HEADER_TEXT_MAX {
            return Err(ValidationError::too_long("footer_text", HEADER_TEXT_MAX, len));
        }
        Ok(())
    }
}

/// A quick-reply button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    kind: &'static str,
    reply: ReplyButtonInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ReplyButtonInner {
    id: String,
    title: String,
}

impl ReplyButton {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            kind: "reply",
            reply: ReplyButtonInner {
                id: id.into(),
                title: title.into(),
            },
        }
    }
}

/// One section of an interactive list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub rows: Vec<ListRow>,
}

impl ListSection {
    pub fn new(rows: Vec<ListRow>) -> Self {
        Self { title: None, rows }
    }

    #[must_use]
    pub fn titled(title: impl Into<String>, rows: Vec<ListRow>) -> Self {
        Self {
            title: Some(title.into()),
            rows,
        }
    }
}

/// One selectable row inside a list section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ListRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body text of an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractiveBody {
    pub text: String,
}

/// The `interactive` object of an outbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<InteractiveBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    pub action: InteractiveAction,
}

/// Per-kind action payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InteractiveAction {
    Buttons {
        buttons: Vec<ReplyButton>,
    },
    List {
        button: String,
        sections: Vec<ListSection>,
    },
    Named {
        name: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        parameters: Option<Value>,
    },
    Flow(FlowActionParams),
}

/// Action parameters of a flow message (flow message version 3).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowActionParams {
    pub flow_message_version: &'static str,
    pub flow_token: String,
    pub flow_id: String,
    pub flow_cta: String,
    pub flow_action: String,
    pub mode: super::FlowMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_action_payload: Option<Value>,
}
