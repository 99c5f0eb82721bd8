//! One builder per outbound message kind.
//!
//! Builders collect required arguments in `new` and optional ones through
//! chained setters; `build` validates and produces the wire body. All
//! validation happens here, before any network call.

use serde::Serialize;
use serde_json::Value;

use super::interactive::{
    FlowActionParams, Footer, Interactive, InteractiveAction, InteractiveBody, InteractiveHeader,
    ListSection, ReplyButton,
};
use super::media::{MediaObject, MediaRef};
use super::{
    BaseOptions, Location, MessageContent, MessagePayload, Reaction, RecipientType, Template,
    TemplateLanguage, TextContent,
};
use crate::error::ValidationError;

const BODY_TEXT_MAX: usize = 1024;
const LIST_BODY_TEXT_MAX: usize = 4096;
const DISPLAY_TEXT_MAX: usize = 20;
const MAX_BUTTONS: usize = 3;
const MAX_LIST_ROWS: usize = 10;

/// Envelope setters shared by every builder.
macro_rules! envelope_setters {
    () => {
        /// Mark this message as a reply to a previous message.
        #[must_use]
        pub fn in_reply_to(mut self, message_id: impl Into<String>) -> Self {
            self.base.context_message_id = Some(message_id.into());
            self
        }

        /// Attach opaque callback data echoed back in status webhooks.
        #[must_use]
        pub fn callback_data(mut self, data: impl Into<String>) -> Self {
            self.base.biz_opaque_callback_data = Some(data.into());
            self
        }
    };
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

fn limit_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(())
}

/// Plain text message.
#[derive(Debug, Clone)]
pub struct TextMessage {
    to: String,
    body: String,
    preview_url: Option<bool>,
    base: BaseOptions,
}

impl TextMessage {
    pub fn new(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body: body.into(),
            preview_url: None,
            base: BaseOptions::default(),
        }
    }

    /// Render link previews for URLs in the body.
    #[must_use]
    pub fn preview_url(mut self, on: bool) -> Self {
        self.preview_url = Some(on);
        self
    }

    #[must_use]
    pub fn recipient_type(mut self, recipient_type: RecipientType) -> Self {
        self.base.recipient_type = Some(recipient_type);
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("body", &self.body)?;
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Text {
                text: TextContent {
                    body: self.body,
                    preview_url: self.preview_url,
                },
            },
            self.base,
        ))
    }
}

/// Image message.
#[derive(Debug, Clone)]
pub struct ImageMessage {
    to: String,
    media: MediaRef,
    caption: Option<String>,
    base: BaseOptions,
}

impl ImageMessage {
    pub fn new(to: impl Into<String>, media: MediaRef) -> Self {
        Self {
            to: to.into(),
            media,
            caption: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn recipient_type(mut self, recipient_type: RecipientType) -> Self {
        self.base.recipient_type = Some(recipient_type);
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Image {
                image: MediaObject::from(self.media).with_caption(self.caption),
            },
            self.base,
        ))
    }
}

/// Audio message; set `voice` for voice notes (OGG/OPUS).
#[derive(Debug, Clone)]
pub struct AudioMessage {
    to: String,
    media: MediaRef,
    voice: bool,
    base: BaseOptions,
}

impl AudioMessage {
    pub fn new(to: impl Into<String>, media: MediaRef) -> Self {
        Self {
            to: to.into(),
            media,
            voice: false,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn voice(mut self, voice: bool) -> Self {
        self.voice = voice;
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Audio {
                audio: MediaObject::from(self.media).with_voice(self.voice),
            },
            self.base,
        ))
    }
}

/// Video message.
#[derive(Debug, Clone)]
pub struct VideoMessage {
    to: String,
    media: MediaRef,
    caption: Option<String>,
    base: BaseOptions,
}

impl VideoMessage {
    pub fn new(to: impl Into<String>, media: MediaRef) -> Self {
        Self {
            to: to.into(),
            media,
            caption: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn recipient_type(mut self, recipient_type: RecipientType) -> Self {
        self.base.recipient_type = Some(recipient_type);
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Video {
                video: MediaObject::from(self.media).with_caption(self.caption),
            },
            self.base,
        ))
    }
}

/// Document message.
#[derive(Debug, Clone)]
pub struct DocumentMessage {
    to: String,
    media: MediaRef,
    caption: Option<String>,
    filename: Option<String>,
    base: BaseOptions,
}

impl DocumentMessage {
    pub fn new(to: impl Into<String>, media: MediaRef) -> Self {
        Self {
            to: to.into(),
            media,
            caption: None,
            filename: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Document {
                document: MediaObject::from(self.media)
                    .with_caption(self.caption)
                    .with_filename(self.filename),
            },
            self.base,
        ))
    }
}

/// Sticker message.
#[derive(Debug, Clone)]
pub struct StickerMessage {
    to: String,
    media: MediaRef,
    base: BaseOptions,
}

impl StickerMessage {
    pub fn new(to: impl Into<String>, media: MediaRef) -> Self {
        Self {
            to: to.into(),
            media,
            base: BaseOptions::default(),
        }
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Sticker {
                sticker: MediaObject::from(self.media),
            },
            self.base,
        ))
    }
}

/// Location message.
#[derive(Debug, Clone)]
pub struct LocationMessage {
    to: String,
    latitude: f64,
    longitude: f64,
    name: Option<String>,
    address: Option<String>,
    base: BaseOptions,
}

impl LocationMessage {
    pub fn new(to: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            to: to.into(),
            latitude,
            longitude,
            name: None,
            address: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Location {
                location: Location {
                    latitude: self.latitude,
                    longitude: self.longitude,
                    name: self.name,
                    address: self.address,
                },
            },
            self.base,
        ))
    }
}

/// Contact-card message. Cards are passed through structurally; the remote
/// API validates their content.
#[derive(Debug, Clone)]
pub struct ContactsMessage {
    to: String,
    contacts: Vec<Value>,
    base: BaseOptions,
}

impl ContactsMessage {
    pub fn new(to: impl Into<String>, contacts: Vec<Value>) -> Self {
        Self {
            to: to.into(),
            contacts,
            base: BaseOptions::default(),
        }
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Contacts {
                contacts: self.contacts,
            },
            self.base,
        ))
    }
}

/// Template message.
#[derive(Debug, Clone)]
pub struct TemplateMessage {
    to: String,
    name: String,
    language: String,
    components: Option<Vec<Value>>,
    base: BaseOptions,
}

impl TemplateMessage {
    pub fn new(
        to: impl Into<String>,
        name: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            name: name.into(),
            language: language.into(),
            components: None,
            base: BaseOptions::default(),
        }
    }

    /// Template components, passed through without deep validation.
    #[must_use]
    pub fn components(mut self, components: Vec<Value>) -> Self {
        self.components = Some(components);
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("template name", &self.name)?;
        require_text("language code", &self.language)?;
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Template {
                template: Template {
                    name: self.name,
                    language: TemplateLanguage {
                        code: self.language,
                    },
                    components: self.components,
                },
            },
            self.base,
        ))
    }
}

/// Emoji reaction. Omitting the emoji removes a previous reaction.
#[derive(Debug, Clone)]
pub struct ReactionMessage {
    to: String,
    message_id: String,
    emoji: Option<String>,
    base: BaseOptions,
}

impl ReactionMessage {
    pub fn new(to: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            message_id: message_id.into(),
            emoji: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("message_id", &self.message_id)?;
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Reaction {
                reaction: Reaction {
                    message_id: self.message_id,
                    emoji: self.emoji,
                },
            },
            self.base,
        ))
    }
}

/// Interactive message with 1 to 3 quick-reply buttons.
#[derive(Debug, Clone)]
pub struct ButtonsMessage {
    to: String,
    body_text: String,
    buttons: Vec<ReplyButton>,
    header: Option<InteractiveHeader>,
    footer: Option<Footer>,
    base: BaseOptions,
}

impl ButtonsMessage {
    pub fn new(
        to: impl Into<String>,
        body_text: impl Into<String>,
        buttons: Vec<ReplyButton>,
    ) -> Self {
        Self {
            to: to.into(),
            body_text: body_text.into(),
            buttons,
            header: None,
            footer: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::text(footer));
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        if self.buttons.len() > MAX_BUTTONS {
            return Err(ValidationError::new(format!(
                "maximum {MAX_BUTTONS} buttons allowed (current: {})",
                self.buttons.len()
            )));
        }
        if self.buttons.is_empty() {
            return Err(ValidationError::new("at least 1 button is required"));
        }
        if let Some(header) = &self.header {
            header.validate()?;
        }
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "button",
                    header: self.header,
                    body: Some(InteractiveBody {
                        text: self.body_text,
                    }),
                    footer: self.footer,
                    action: InteractiveAction::Buttons {
                        buttons: self.buttons,
                    },
                },
            },
            self.base,
        ))
    }
}

/// Interactive list message.
#[derive(Debug, Clone)]
pub struct ListMessage {
    to: String,
    body_text: String,
    button_text: String,
    sections: Vec<ListSection>,
    header: Option<InteractiveHeader>,
    footer: Option<Footer>,
    base: BaseOptions,
}

impl ListMessage {
    pub fn new(
        to: impl Into<String>,
        body_text: impl Into<String>,
        button_text: impl Into<String>,
        sections: Vec<ListSection>,
    ) -> Self {
        Self {
            to: to.into(),
            body_text: body_text.into(),
            button_text: button_text.into(),
            sections,
            header: None,
            footer: None,
            base: BaseOptions::default(),
        }
    }

    /// Lists accept text headers only; media headers fail validation.
    #[must_use]
    pub fn header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::text(footer));
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        limit_text("body_text", &self.body_text, LIST_BODY_TEXT_MAX)?;
        let total_rows: usize = self.sections.iter().map(|s| s.rows.len()).sum();
        if total_rows > MAX_LIST_ROWS {
            return Err(ValidationError::new(format!(
                "maximum {MAX_LIST_ROWS} rows total across all sections (current: {total_rows})"
            )));
        }
        if total_rows == 0 {
            return Err(ValidationError::new("at least 1 row is required"));
        }
        if let Some(header) = &self.header {
            header.validate_text_only()?;
        }
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "list",
                    header: self.header,
                    body: Some(InteractiveBody {
                        text: self.body_text,
                    }),
                    footer: self.footer,
                    action: InteractiveAction::List {
                        button: self.button_text,
                        sections: self.sections,
                    },
                },
            },
            self.base,
        ))
    }
}

/// Interactive call-to-action URL message.
#[derive(Debug, Clone)]
pub struct CtaUrlMessage {
    to: String,
    body_text: String,
    display_text: String,
    url: String,
    header: Option<InteractiveHeader>,
    footer: Option<Footer>,
    base: BaseOptions,
}

impl CtaUrlMessage {
    pub fn new(
        to: impl Into<String>,
        body_text: impl Into<String>,
        display_text: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            body_text: body_text.into(),
            display_text: display_text.into(),
            url: url.into(),
            header: None,
            footer: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn footer_text(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::text(footer));
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("body_text", &self.body_text)?;
        limit_text("body_text", &self.body_text, BODY_TEXT_MAX)?;
        require_text("display_text", &self.display_text)?;
        limit_text("display_text", &self.display_text, DISPLAY_TEXT_MAX)?;
        require_text("url", &self.url)?;
        let lowered = self.url.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return Err(ValidationError::new(
                "url must start with http:// or https://",
            ));
        }
        if let Some(footer) = &self.footer {
            footer.validate()?;
        }
        if let Some(header) = &self.header {
            header.validate()?;
        }
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "cta_url",
                    header: self.header,
                    body: Some(InteractiveBody {
                        text: self.body_text,
                    }),
                    footer: self.footer,
                    action: InteractiveAction::Named {
                        name: "cta_url",
                        parameters: Some(serde_json::json!({
                            "display_text": self.display_text,
                            "url": self.url,
                        })),
                    },
                },
            },
            self.base,
        ))
    }
}

/// Interactive catalog message.
#[derive(Debug, Clone)]
pub struct CatalogMessage {
    to: String,
    body_text: String,
    thumbnail_product_retailer_id: String,
    footer: Option<Footer>,
    base: BaseOptions,
}

impl CatalogMessage {
    pub fn new(
        to: impl Into<String>,
        body_text: impl Into<String>,
        thumbnail_product_retailer_id: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            body_text: body_text.into(),
            thumbnail_product_retailer_id: thumbnail_product_retailer_id.into(),
            footer: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn footer_text(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::text(footer));
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("body_text", &self.body_text)?;
        limit_text("body_text", &self.body_text, BODY_TEXT_MAX)?;
        require_text(
            "thumbnail_product_retailer_id",
            &self.thumbnail_product_retailer_id,
        )?;
        if let Some(footer) = &self.footer {
            footer.validate()?;
        }
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "catalog_message",
                    header: None,
                    body: Some(InteractiveBody {
                        text: self.body_text,
                    }),
                    footer: self.footer,
                    action: InteractiveAction::Named {
                        name: "catalog_message",
                        parameters: Some(serde_json::json!({
                            "thumbnail_product_retailer_id": self.thumbnail_product_retailer_id,
                        })),
                    },
                },
            },
            self.base,
        ))
    }
}

/// Interactive location-request message.
#[derive(Debug, Clone)]
pub struct LocationRequestMessage {
    to: String,
    body_text: String,
    header: Option<InteractiveHeader>,
    footer: Option<Footer>,
    base: BaseOptions,
}

impl LocationRequestMessage {
    pub fn new(to: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            body_text: body_text.into(),
            header: None,
            footer: None,
            base: BaseOptions::default(),
        }
    }

    #[must_use]
    pub fn header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn footer_text(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(Footer::text(footer));
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        if let Some(header) = &self.header {
            header.validate()?;
        }
        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "location_request_message",
                    header: self.header,
                    body: Some(InteractiveBody {
                        text: self.body_text,
                    }),
                    footer: self.footer,
                    action: InteractiveAction::Named {
                        name: "send_location",
                        parameters: None,
                    },
                },
            },
            self.base,
        ))
    }
}

/// Whether a flow runs in its published or draft version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowMode {
    #[default]
    Published,
    Draft,
}

/// Flow message (multi-screen data collection inside a message).
#[derive(Debug, Clone)]
pub struct FlowMessage {
    to: String,
    flow_id: String,
    flow_cta: String,
    flow_token: String,
    flow_action: String,
    mode: FlowMode,
    screen: Option<String>,
    action_payload: Option<Value>,
    header: Option<InteractiveHeader>,
    body_text: Option<String>,
    footer_text: Option<String>,
    base: BaseOptions,
}

impl FlowMessage {
    /// The flow token is a caller-supplied opaque value; its uniqueness is
    /// the caller's responsibility.
    pub fn new(
        to: impl Into<String>,
        flow_id: impl Into<String>,
        flow_cta: impl Into<String>,
        flow_token: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            flow_id: flow_id.into(),
            flow_cta: flow_cta.into(),
            flow_token: flow_token.into(),
            flow_action: "navigate".to_string(),
            mode: FlowMode::default(),
            screen: None,
            action_payload: None,
            header: None,
            body_text: None,
            footer_text: None,
            base: BaseOptions::default(),
        }
    }

    /// The flow action; defaults to `navigate`.
    #[must_use]
    pub fn flow_action(mut self, action: impl Into<String>) -> Self {
        self.flow_action = action.into();
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: FlowMode) -> Self {
        self.mode = mode;
        self
    }

    /// Initial screen; only attached for the `navigate` action.
    #[must_use]
    pub fn screen(mut self, screen: impl Into<String>) -> Self {
        self.screen = Some(screen.into());
        self
    }

    #[must_use]
    pub fn action_payload(mut self, payload: Value) -> Self {
        self.action_payload = Some(payload);
        self
    }

    #[must_use]
    pub fn header(mut self, header: InteractiveHeader) -> Self {
        self.header = Some(header);
        self
    }

    #[must_use]
    pub fn body_text(mut self, body_text: impl Into<String>) -> Self {
        self.body_text = Some(body_text.into());
        self
    }

    #[must_use]
    pub fn footer_text(mut self, footer_text: impl Into<String>) -> Self {
        self.footer_text = Some(footer_text.into());
        self
    }

    envelope_setters!();

    pub fn build(self) -> Result<MessagePayload, ValidationError> {
        require_text("flow_id", &self.flow_id)?;
        require_text("flow_cta", &self.flow_cta)?;
        require_text("flow_token", &self.flow_token)?;
        if let Some(header) = &self.header {
            header.validate()?;
        }

        let mut action_payload = self.action_payload;
        if self.flow_action == "navigate" {
            if let Some(screen) = self.screen {
                action_payload = match action_payload {
                    Some(Value::Object(mut map)) => {
                        map.insert("screen".to_string(), Value::String(screen));
                        Some(Value::Object(map))
                    }
                    None => Some(serde_json::json!({ "screen": screen })),
                    // A non-object payload passes through untouched.
                    other => other,
                };
            }
        }

        Ok(MessagePayload::new(
            self.to,
            MessageContent::Interactive {
                interactive: Interactive {
                    kind: "flow",
                    header: self.header,
                    body: self.body_text.map(|text| InteractiveBody { text }),
                    footer: self.footer_text.map(Footer::text),
                    action: InteractiveAction::Flow(FlowActionParams {
                        flow_message_version: "3",
                        flow_token: self.flow_token,
                        flow_id: self.flow_id,
                        flow_cta: self.flow_cta,
                        flow_action: self.flow_action,
                        mode: self.mode,
                        flow_action_payload: action_payload,
                    }),
                },
            },
            self.base,
        ))
    }
}
