use bytes::Bytes;

use crate::error::{EnvelopeError, Result};

/// How a decoded envelope delivers its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// Payload bytes exactly as stored.
    #[default]
    Raw,
    /// JSON payloads parsed into a value. Binary payloads stay raw.
    Parsed,
}

/// Payload encoding declared by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Json,
    Binary,
}

impl ContentType {
    /// Wire tag for this content type.
    pub fn tag(self) -> u8 {
        match self {
            ContentType::Json => 0,
            ContentType::Binary => 1,
        }
    }

    /// Parse a wire tag.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(ContentType::Json),
            1 => Ok(ContentType::Binary),
            other => Err(EnvelopeError::UnknownContentType(other)),
        }
    }
}

/// Message payload, raw or parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Raw(Bytes),
    Json(serde_json::Value),
}

impl Content {
    /// Serialized payload bytes.
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Content::Raw(bytes) => Ok(bytes.clone()),
            Content::Json(value) => Ok(Bytes::from(serde_json::to_vec(value)?)),
        }
    }

    /// Check that this content can be stored under `content_type` and read
    /// back in either mode.
    pub fn check_type(&self, content_type: ContentType) -> Result<()> {
        match (content_type, self) {
            (ContentType::Binary, Content::Json(_)) => Err(EnvelopeError::ContentTypeMismatch {
                declared: content_type,
                detail: "parsed JSON content under the binary tag",
            }),
            (ContentType::Json, Content::Raw(bytes)) => {
                serde_json::from_slice::<serde_json::Value>(bytes).map_err(|_| {
                    EnvelopeError::ContentTypeMismatch {
                        declared: content_type,
                        detail: "raw content is not valid JSON",
                    }
                })?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Build content from stored bytes, honoring the requested mode.
    pub(crate) fn decode(
        bytes: Bytes,
        content_type: ContentType,
        mode: ContentMode,
    ) -> Result<Self> {
        match (mode, content_type) {
            (ContentMode::Parsed, ContentType::Json) => {
                Ok(Content::Json(serde_json::from_slice(&bytes)?))
            }
            _ => Ok(Content::Raw(bytes)),
        }
    }

    /// Raw payload bytes, if the content was not parsed.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Content::Raw(bytes) => Some(bytes),
            Content::Json(_) => None,
        }
    }

    /// Parsed JSON value, if the content was parsed.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Content::Json(value) => Some(value),
            Content::Raw(_) => None,
        }
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Json(value)
    }
}

impl From<Bytes> for Content {
    fn from(bytes: Bytes) -> Self {
        Content::Raw(bytes)
    }
}
