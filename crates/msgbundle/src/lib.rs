//! Versioned message bundles for pub/sub storage.
//!
//! msgbundle packs the stored messages of one stream partition into a
//! single length-prefixed buffer with offset and timestamp ranges attached,
//! and unpacks such buffers back into messages, keeping the valid prefix of
//! a bundle that was cut short.
//!
//! # Crate Structure
//!
//! - [`envelope`]: Stream messages with delivery metadata
//! - [`codec`]: Bundle encoder, decoder, streaming reader and summary types
//!
//! ```
//! use msgbundle::codec::{decode_bundle, BundleEncoder, ContentMode};
//! use msgbundle::envelope::{StoredMessage, StreamMessage};
//!
//! let mut encoder = BundleEncoder::new("sensors", 0).unwrap();
//! let message = StreamMessage::binary("sensors", 0, 1_000, vec![1u8, 2, 3]);
//! let msg = StoredMessage::new(message, 7, None);
//! encoder.append(&msg).unwrap();
//! let summary = encoder.finalize();
//! assert_eq!(summary.min_offset(), Some(7));
//!
//! let decoded = decode_bundle::<StoredMessage>(&summary.bytes, ContentMode::Raw).unwrap();
//! assert_eq!(decoded.envelopes, vec![msg]);
//! ```

/// Re-export envelope types.
pub mod envelope {
    pub use msgbundle_envelope::*;
}

/// Re-export codec types.
pub mod codec {
    pub use msgbundle_codec::*;
}
