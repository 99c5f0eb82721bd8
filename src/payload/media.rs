//! Media references for outbound messages and interactive headers.

use serde::Serialize;

/// Reference to a media asset: a previously-uploaded id XOR a remote URL.
/// Exactly one is set by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
}

impl MediaRef {
    /// Reference an already-uploaded media asset.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            link: None,
        }
    }

    /// Reference a remote URL.
    pub fn link(link: impl Into<String>) -> Self {
        Self {
            id: None,
            link: Some(link.into()),
        }
    }

    /// Classify a bare string: a strictly alphanumeric/underscore value is
    /// a media id, anything else is treated as a link.
    pub fn parse(value: &str) -> Self {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
            Self::id(value)
        } else {
            Self::link(value)
        }
    }

    pub fn as_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn as_link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

/// A media reference plus the per-kind extras the wire format allows.
/// Builders only expose the extras their kind supports (captions for
/// image/video/document, filename for document, voice for audio).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaObject {
    #[serde(flatten)]
    media: MediaRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<bool>,
}

impl From<MediaRef> for MediaObject {
    fn from(media: MediaRef) -> Self {
        Self {
            media,
            caption: None,
            filename: None,
            voice: None,
        }
    }
}

impl MediaObject {
    pub(crate) fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    pub(crate) fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename;
        self
    }

    pub(crate) fn with_voice(mut self, voice: bool) -> Self {
        self.voice = voice.then_some(true);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_string_classification() {
        assert_eq!(MediaRef::parse("abc123_DEF"), MediaRef::id("abc123_DEF"));
        assert_eq!(
            MediaRef::parse("https://cdn.example.com/a.jpg"),
            MediaRef::link("https://cdn.example.com/a.jpg")
        );
        // A dash is not part of the id alphabet.
        assert_eq!(MediaRef::parse("abc-123"), MediaRef::link("abc-123"));
        assert_eq!(MediaRef::parse(""), MediaRef::link(""));
    }

    #[test]
    fn serializes_exactly_one_key() {
        let id = serde_json::to_value(MediaRef::id("555")).unwrap();
        assert_eq!(id, serde_json::json!({"id": "555"}));
        let link = serde_json::to_value(MediaRef::link("https://x/y")).unwrap();
        assert_eq!(link, serde_json::json!({"link": "https://x/y"}));
    }

    #[test]
    fn media_object_merges_extras() {
        let obj = MediaObject::from(MediaRef::id("1"))
            .with_caption(Some("hi".into()))
            .with_filename(Some("a.pdf".into()));
        let v = serde_json::to_value(&obj).unwrap();
        assert_eq!(
            v,
            serde_json::json!({"id": "1", "caption": "hi", "filename": "a.pdf"})
        );
    }

    #[test]
    fn voice_flag_omitted_when_false() {
        let v = serde_json::to_value(MediaObject::from(MediaRef::id("1")).with_voice(false)).unwrap();
        assert_eq!(v, serde_json::json!({"id": "1"}));
    }
}
