//! Stream message envelopes with delivery metadata.
//!
//! An envelope is one logical stream message plus the metadata the broker
//! attaches when it stores it (offset, previous offset). Bundles treat
//! envelopes as opaque records and only use the [`Envelope`] trait:
//! serialize, decode, and the identity/ordering accessors.

pub mod content;
pub mod error;
pub mod message;
pub mod traits;

pub use content::{Content, ContentMode, ContentType};
pub use error::{EnvelopeError, Result};
pub use message::{StoredMessage, StreamMessage, ENVELOPE_VERSION, MAX_STREAM_ID_LEN};
pub use traits::Envelope;
