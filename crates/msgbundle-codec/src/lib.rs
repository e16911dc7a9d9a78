//! Versioned, length-prefixed bundles of stream message envelopes.
//!
//! A bundle packs many serialized envelopes of one `(stream_id, partition)`
//! into a single buffer, which is the unit the storage layer persists:
//! - A 1-byte format version (currently 0)
//! - Then, per record, a 4-byte big-endian length and the envelope bytes
//!
//! The encoder keeps the offset and timestamp ranges of everything it
//! packed so storage can index a bundle without decoding it. The decoder
//! returns every complete record in order and stops quietly at the first
//! truncated or unreadable one.

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
#[cfg(feature = "async")]
pub mod framed;
pub mod summary;

pub use codec::{
    decode_record, encode_record, BundleConfig, DEFAULT_INITIAL_CAPACITY, FORMAT_VERSION,
    LENGTH_PREFIX_SIZE, MAX_RECORD_SIZE,
};
pub use decoder::{decode_bundle, decode_bundle_with_config, BundleReader, DecodedBundle};
pub use encoder::BundleEncoder;
pub use error::{BundleError, Result, TruncatedRecord, TruncationReason};
#[cfg(feature = "async")]
pub use framed::BundleCodec;
pub use summary::{BundleStats, BundleSummary, Span};

pub use msgbundle_envelope::{ContentMode, Envelope};
