/// Errors that can occur while serializing or decoding an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The envelope was written by a format version this build cannot read.
    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u8),

    /// The input ended before a field was complete.
    #[error("truncated envelope: {field} needs {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        needed: usize,
        available: usize,
    },

    /// Bytes remained after the content field.
    #[error("{0} trailing bytes after envelope")]
    TrailingBytes(usize),

    /// Stream ids are length-prefixed with a single byte.
    #[error("stream id too long ({len} bytes, max {max})")]
    StreamIdTooLong { len: usize, max: usize },

    /// The stream id bytes are not valid UTF-8.
    #[error("stream id is not valid UTF-8")]
    InvalidStreamId(#[from] std::str::Utf8Error),

    /// Unknown content type tag.
    #[error("unknown content type {0}")]
    UnknownContentType(u8),

    /// The content does not match the declared content type.
    #[error("content does not match declared type {declared:?}: {detail}")]
    ContentTypeMismatch {
        declared: crate::content::ContentType,
        detail: &'static str,
    },

    /// Content does not fit the 4-byte length field.
    #[error("content too large ({0} bytes)")]
    ContentTooLarge(usize),

    /// JSON content could not be parsed or serialized.
    #[error("invalid JSON content: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;
