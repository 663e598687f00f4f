//! Message content elements.
//!
//! A message is an ordered list of typed elements. Inbound events carry the
//! elements produced by the platform client; the forwarder rewrites them into
//! elements every target platform can render.

use serde::{Deserialize, Serialize};

/// One typed unit of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    /// Plain text.
    Text { content: String },

    /// Bold text.
    Bold { content: String },

    /// Line break.
    Break,

    /// Platform emoji ("face").
    Face {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        animated: bool,
    },

    /// Emoji from a platform sticker pack, already hosted at a URL.
    MarketFace {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },

    /// Platform sticker.
    Sticker {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },

    /// Image by URL or data URI.
    Image {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Inline video by URL or data URI.
    Video {
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// File attachment.
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        /// Original file name.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        /// Platform file id, for retrieval through an auxiliary endpoint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Audio or voice message.
    Audio {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        src: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file: Option<String>,
    },

    /// Native voice recording element.
    Record { src: String },

    /// Mention of a user, role, or broadcast marker.
    Mention(Mention),

    /// Native quote reference to a message on the same platform.
    Quote { id: String },

    /// Impersonation wrapper: render the message under another name/avatar.
    Author {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        avatar: Option<String>,
    },
}

impl Element {
    /// Plain text element.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Bold text element.
    pub fn bold(content: impl Into<String>) -> Self {
        Self::Bold {
            content: content.into(),
        }
    }

    /// Image element.
    pub fn image(src: impl Into<String>, title: Option<String>) -> Self {
        Self::Image {
            src: src.into(),
            title,
        }
    }

    /// Audio element with a playable source.
    pub fn audio(src: impl Into<String>) -> Self {
        Self::Audio {
            src: Some(src.into()),
            file: None,
        }
    }

    /// Native quote reference.
    pub fn quote(id: impl Into<String>) -> Self {
        Self::Quote { id: id.into() }
    }

    /// Text content, if this is a text element.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { content } => Some(content),
            _ => None,
        }
    }

    /// Whether this is an impersonation wrapper.
    pub fn is_author(&self) -> bool {
        matches!(self, Self::Author { .. })
    }

    /// Short element kind name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Bold { .. } => "bold",
            Self::Break => "break",
            Self::Face { .. } => "face",
            Self::MarketFace { .. } => "market_face",
            Self::Sticker { .. } => "sticker",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::File { .. } => "file",
            Self::Audio { .. } => "audio",
            Self::Record { .. } => "record",
            Self::Mention(_) => "mention",
            Self::Quote { .. } => "quote",
            Self::Author { .. } => "author",
        }
    }
}

/// A mention element's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Mentioned user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name supplied by the platform client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Mentioned role id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Broadcast marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MentionKind>,
}

/// Broadcast mention markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionKind {
    /// Everyone currently online.
    Here,
    /// Everyone in the channel.
    All,
}
