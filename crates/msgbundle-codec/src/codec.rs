use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BundleError, Result, TruncationReason};

/// Current bundle format version, written as the first byte.
pub const FORMAT_VERSION: u8 = 0;

/// Record length prefix: 4 bytes, big-endian.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Largest record the format allows: 2^31 - 1 bytes.
pub const MAX_RECORD_SIZE: usize = i32::MAX as usize;

/// Default initial encoder buffer capacity: 8 KiB.
pub const DEFAULT_INITIAL_CAPACITY: usize = 8 * 1024;

/// Configuration for bundle encoding and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleConfig {
    /// Maximum serialized envelope size in bytes. Values above
    /// [`MAX_RECORD_SIZE`] are clamped. Default: [`MAX_RECORD_SIZE`].
    pub max_record_size: usize,
    /// Bytes reserved up front by the encoder.
    pub initial_capacity: usize,
}

impl BundleConfig {
    /// The record size limit actually enforced.
    pub fn effective_max_record_size(&self) -> usize {
        self.max_record_size.min(MAX_RECORD_SIZE)
    }
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            max_record_size: MAX_RECORD_SIZE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Encode one record frame.
///
/// Wire format:
/// ```text
/// ┌────────────────┬─────────────────────┐
/// │ Length (4B BE) │ Envelope bytes      │
/// │                │ (Length bytes)      │
/// └────────────────┴─────────────────────┘
/// ```
pub fn encode_record(record: &[u8], dst: &mut BytesMut, max_record_size: usize) -> Result<()> {
    let max = max_record_size.min(MAX_RECORD_SIZE);
    if record.len() > max {
        return Err(BundleError::RecordTooLarge {
            size: record.len(),
            max,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + record.len());
    dst.put_u32(record.len() as u32);
    dst.put_slice(record);
    Ok(())
}

/// Decode one record frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_record(src: &mut BytesMut, max_record_size: usize) -> Result<Option<Bytes>> {
    let Some(declared) = peek_length(src) else {
        return Ok(None);
    };

    let max = max_record_size.min(MAX_RECORD_SIZE);
    if declared > max {
        return Err(BundleError::RecordTooLarge {
            size: declared,
            max,
        });
    }

    if src.len() < LENGTH_PREFIX_SIZE + declared {
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    Ok(Some(src.split_to(declared).freeze()))
}

/// Check a bundle version byte.
pub(crate) fn check_version(version: u8) -> Result<()> {
    if version != FORMAT_VERSION {
        return Err(BundleError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Describe why `src` does not hold a complete frame.
pub(crate) fn incomplete_reason(src: &[u8]) -> TruncationReason {
    match peek_length(src) {
        None => TruncationReason::IncompleteLengthPrefix {
            available: src.len(),
        },
        Some(declared) => TruncationReason::IncompleteRecord {
            declared,
            available: src.len() - LENGTH_PREFIX_SIZE,
        },
    }
}

fn peek_length(src: &[u8]) -> Option<usize> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = src.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(prefix) as usize)
}
