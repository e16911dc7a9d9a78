/// Errors that can occur during bundle encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// A required construction argument was missing or empty.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An envelope was appended to a bundle of another stream or partition.
    #[error(
        "envelope stream {actual_stream}/{actual_partition} does not match bundle \
         {expected_stream}/{expected_partition}"
    )]
    StreamMismatch {
        expected_stream: String,
        expected_partition: u32,
        actual_stream: String,
        actual_partition: u32,
    },

    /// The bundle starts with a version byte this build cannot read.
    #[error("unsupported bundle version {0}")]
    UnsupportedVersion(u8),

    /// The input is empty, so there is no version byte.
    #[error("bundle is empty (missing version byte)")]
    MissingVersion,

    /// A serialized envelope exceeds the maximum record size.
    #[error("record too large ({size} bytes, max {max})")]
    RecordTooLarge { size: usize, max: usize },

    /// The envelope could not be serialized.
    #[error("envelope error: {0}")]
    Envelope(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An I/O error occurred while reading a bundle stream.
    #[error("bundle I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BundleError>;

/// Why decoding stopped before the end of the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TruncationReason {
    /// Fewer than four bytes remained for a length prefix.
    #[error("incomplete length prefix ({available} of 4 bytes)")]
    IncompleteLengthPrefix { available: usize },

    /// The record payload is shorter than its declared length.
    #[error("incomplete record ({available} of {declared} bytes)")]
    IncompleteRecord { declared: usize, available: usize },

    /// The declared length exceeds the configured maximum.
    #[error("declared record length {declared} exceeds max {max}")]
    OversizedRecord { declared: usize, max: usize },

    /// The record bytes are complete but are not a valid envelope.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}

/// Diagnostic for a bundle whose tail could not be decoded.
///
/// Records before `record_index` were decoded; nothing at or after
/// `position` was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bundle truncated at record {record_index} (byte {position}): {reason}")]
pub struct TruncatedRecord {
    /// Zero-based index of the record that failed.
    pub record_index: usize,
    /// Byte position of that record's length prefix.
    pub position: usize,
    pub reason: TruncationReason,
}
