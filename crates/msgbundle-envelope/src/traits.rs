use bytes::Bytes;

use crate::content::ContentMode;

/// A self-serializing record that can be packed into a bundle.
///
/// Bundles never look inside the serialized form. They only need the
/// stream identity (to enforce that one bundle holds one partition) and
/// the offset/timestamp (to maintain the bundle's index ranges).
pub trait Envelope: Sized {
    /// Error returned by serialization and decoding.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Logical stream this record belongs to.
    fn stream_id(&self) -> &str;

    /// Partition within the stream.
    fn partition(&self) -> u32;

    /// Message timestamp in milliseconds since the Unix epoch.
    fn timestamp(&self) -> i64;

    /// Storage position of the record within its partition log.
    fn offset(&self) -> i64;

    /// Serialize the record.
    fn to_bytes(&self) -> Result<Bytes, Self::Error>;

    /// Decode a record previously produced by [`Envelope::to_bytes`].
    fn from_bytes(bytes: Bytes, mode: ContentMode) -> Result<Self, Self::Error>;
}
