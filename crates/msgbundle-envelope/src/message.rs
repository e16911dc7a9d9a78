use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::content::{Content, ContentMode, ContentType};
use crate::error::{EnvelopeError, Result};
use crate::traits::Envelope;

/// Current stored-message layout version.
pub const ENVELOPE_VERSION: u8 = 0;

/// Stream ids are prefixed with a one-byte length.
pub const MAX_STREAM_ID_LEN: usize = u8::MAX as usize;

// version + offset + has_previous + previous_offset + stream id length
const PREFIX_SIZE: usize = 1 + 8 + 1 + 8 + 1;
// partition + timestamp + ttl + content type + content length
const BODY_HEADER_SIZE: usize = 4 + 8 + 4 + 1 + 4;

/// A logical message published to a stream partition.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamMessage {
    pub stream_id: String,
    pub partition: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Retention hint in seconds. Zero means no expiry.
    pub ttl: u32,
    pub content_type: ContentType,
    pub content: Content,
}

impl StreamMessage {
    /// Create a JSON message with no TTL.
    pub fn json(
        stream_id: impl Into<String>,
        partition: u32,
        timestamp: i64,
        content: serde_json::Value,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            partition,
            timestamp,
            ttl: 0,
            content_type: ContentType::Json,
            content: Content::Json(content),
        }
    }

    /// Create a binary message with no TTL.
    pub fn binary(
        stream_id: impl Into<String>,
        partition: u32,
        timestamp: i64,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            partition,
            timestamp,
            ttl: 0,
            content_type: ContentType::Binary,
            content: Content::Raw(content.into()),
        }
    }

    /// Set the retention hint.
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A stream message as stored by the broker, with its log position.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub message: StreamMessage,
    pub offset: i64,
    /// Offset of the preceding message in the same partition, if known.
    pub previous_offset: Option<i64>,
}

impl StoredMessage {
    pub fn new(message: StreamMessage, offset: i64, previous_offset: Option<i64>) -> Self {
        Self {
            message,
            offset,
            previous_offset,
        }
    }

    /// Serialized size without re-encoding JSON content.
    pub fn encoded_len_hint(&self) -> usize {
        let content = self.message.content.as_bytes().map_or(0, Bytes::len);
        PREFIX_SIZE + self.message.stream_id.len() + BODY_HEADER_SIZE + content
    }

    /// Serialize into `dst`.
    ///
    /// Layout (big-endian):
    /// ```text
    /// version(1) offset(8) has_previous(1) previous_offset(8)
    /// stream_id_len(1) stream_id partition(4) timestamp(8) ttl(4)
    /// content_type(1) content_len(4) content
    /// ```
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let stream_id = self.message.stream_id.as_bytes();
        if stream_id.len() > MAX_STREAM_ID_LEN {
            return Err(EnvelopeError::StreamIdTooLong {
                len: stream_id.len(),
                max: MAX_STREAM_ID_LEN,
            });
        }
        self.message.content.check_type(self.message.content_type)?;
        let content = self.message.content.to_bytes()?;
        let content_len = u32::try_from(content.len())
            .map_err(|_| EnvelopeError::ContentTooLarge(content.len()))?;

        dst.reserve(PREFIX_SIZE + stream_id.len() + BODY_HEADER_SIZE + content.len());
        dst.put_u8(ENVELOPE_VERSION);
        dst.put_i64(self.offset);
        dst.put_u8(u8::from(self.previous_offset.is_some()));
        dst.put_i64(self.previous_offset.unwrap_or(0));
        dst.put_u8(stream_id.len() as u8);
        dst.put_slice(stream_id);
        dst.put_u32(self.message.partition);
        dst.put_i64(self.message.timestamp);
        dst.put_u32(self.message.ttl);
        dst.put_u8(self.message.content_type.tag());
        dst.put_u32(content_len);
        dst.put_slice(&content);
        Ok(())
    }

    /// Decode a serialized message. `src` must hold exactly one message.
    pub fn decode(mut src: Bytes, mode: ContentMode) -> Result<Self> {
        need(&src, 1, "version")?;
        let version = src.get_u8();
        if version != ENVELOPE_VERSION {
            return Err(EnvelopeError::UnsupportedVersion(version));
        }

        need(&src, PREFIX_SIZE - 1, "header")?;
        let offset = src.get_i64();
        let has_previous = src.get_u8() != 0;
        let previous_offset = src.get_i64();
        let stream_id_len = src.get_u8() as usize;

        need(&src, stream_id_len, "stream_id")?;
        let stream_id = std::str::from_utf8(&src[..stream_id_len])?.to_string();
        src.advance(stream_id_len);

        need(&src, BODY_HEADER_SIZE, "body header")?;
        let partition = src.get_u32();
        let timestamp = src.get_i64();
        let ttl = src.get_u32();
        let content_type = ContentType::from_tag(src.get_u8())?;
        let content_len = src.get_u32() as usize;

        need(&src, content_len, "content")?;
        let content = src.split_to(content_len);
        if src.has_remaining() {
            return Err(EnvelopeError::TrailingBytes(src.remaining()));
        }

        Ok(Self {
            message: StreamMessage {
                stream_id,
                partition,
                timestamp,
                ttl,
                content_type,
                content: Content::decode(content, content_type, mode)?,
            },
            offset,
            previous_offset: has_previous.then_some(previous_offset),
        })
    }
}

fn need(src: &Bytes, needed: usize, field: &'static str) -> Result<()> {
    if src.remaining() < needed {
        return Err(EnvelopeError::Truncated {
            field,
            needed,
            available: src.remaining(),
        });
    }
    Ok(())
}

impl Envelope for StoredMessage {
    type Error = EnvelopeError;

    fn stream_id(&self) -> &str {
        &self.message.stream_id
    }

    fn partition(&self) -> u32 {
        self.message.partition
    }

    fn timestamp(&self) -> i64 {
        self.message.timestamp
    }

    fn offset(&self) -> i64 {
        self.offset
    }

    fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len_hint());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    fn from_bytes(bytes: Bytes, mode: ContentMode) -> Result<Self> {
        Self::decode(bytes, mode)
    }
}
