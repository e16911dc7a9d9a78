use std::io::{ErrorKind, Read};
use std::marker::PhantomData;

use bytes::{Buf, BytesMut};
use msgbundle_envelope::{ContentMode, Envelope};
use tracing::{debug, warn};

use crate::codec::{
    check_version, decode_record, incomplete_reason, BundleConfig, LENGTH_PREFIX_SIZE,
};
use crate::error::{BundleError, Result, TruncatedRecord, TruncationReason};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// The records recovered from a bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBundle<E> {
    /// Complete records, in bundle order.
    pub envelopes: Vec<E>,
    /// Set when decoding stopped before the end of the input.
    pub truncation: Option<TruncatedRecord>,
}

impl<E> DecodedBundle<E> {
    /// True when every byte of the input was decoded.
    pub fn is_complete(&self) -> bool {
        self.truncation.is_none()
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }
}

/// Decode a bundle held in memory with default configuration.
///
/// Fails only on structural problems: an empty input or an unknown
/// version byte. A truncated or corrupt record ends decoding; the records
/// before it are returned along with a [`TruncatedRecord`] diagnostic.
pub fn decode_bundle<E: Envelope>(buf: &[u8], mode: ContentMode) -> Result<DecodedBundle<E>> {
    decode_bundle_with_config(buf, mode, BundleConfig::default())
}

/// Decode a bundle held in memory with explicit configuration.
pub fn decode_bundle_with_config<E: Envelope>(
    buf: &[u8],
    mode: ContentMode,
    config: BundleConfig,
) -> Result<DecodedBundle<E>> {
    BundleReader::with_config(buf, mode, config).read_all()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Version,
    Records,
    Done,
}

/// Reads envelopes from a bundle on any `Read` stream.
///
/// Handles partial reads internally. Once a record cannot be decoded the
/// reader stops for good and [`BundleReader::truncation`] explains why.
pub struct BundleReader<R, E> {
    inner: R,
    buf: BytesMut,
    config: BundleConfig,
    mode: ContentMode,
    state: ReadState,
    position: usize,
    records: usize,
    truncation: Option<TruncatedRecord>,
    _envelope: PhantomData<fn() -> E>,
}

impl<R: Read, E: Envelope> BundleReader<R, E> {
    /// Create a bundle reader with default configuration.
    pub fn new(inner: R, mode: ContentMode) -> Self {
        Self::with_config(inner, mode, BundleConfig::default())
    }

    /// Create a bundle reader with explicit configuration.
    pub fn with_config(inner: R, mode: ContentMode, config: BundleConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            mode,
            state: ReadState::Version,
            position: 0,
            records: 0,
            truncation: None,
            _envelope: PhantomData,
        }
    }

    /// Read the next envelope (blocking).
    ///
    /// Returns `Ok(None)` at the end of the bundle, including when the
    /// remainder was truncated. Returns `Err` for a missing or unsupported
    /// version byte and for I/O errors.
    pub fn read_envelope(&mut self) -> Result<Option<E>> {
        loop {
            match self.state {
                ReadState::Done => return Ok(None),
                ReadState::Version => {
                    if !self.buf.is_empty() {
                        let version = self.buf.get_u8();
                        if let Err(err) = check_version(version) {
                            self.finish();
                            return Err(err);
                        }
                        self.position = 1;
                        self.state = ReadState::Records;
                        continue;
                    }
                }
                ReadState::Records => {
                    let start = self.position;
                    match decode_record(&mut self.buf, self.config.max_record_size) {
                        Ok(Some(record)) => {
                            self.position += LENGTH_PREFIX_SIZE + record.len();
                            return match E::from_bytes(record, self.mode) {
                                Ok(envelope) => {
                                    self.records += 1;
                                    Ok(Some(envelope))
                                }
                                Err(err) => {
                                    let reason = TruncationReason::InvalidEnvelope(err.to_string());
                                    self.truncate(start, reason);
                                    Ok(None)
                                }
                            };
                        }
                        Ok(None) => {}
                        Err(BundleError::RecordTooLarge { size, max }) => {
                            self.truncate(
                                start,
                                TruncationReason::OversizedRecord {
                                    declared: size,
                                    max,
                                },
                            );
                            return Ok(None);
                        }
                        Err(err) => return Err(err),
                    }
                }
            }

            if self.fill()? > 0 {
                continue;
            }

            // End of input.
            if self.state == ReadState::Version {
                self.finish();
                return Err(BundleError::MissingVersion);
            }
            if self.buf.is_empty() {
                debug!(records = self.records, bytes = self.position, "decoded bundle");
                self.finish();
            } else {
                let reason = incomplete_reason(&self.buf);
                self.truncate(self.position, reason);
            }
            return Ok(None);
        }
    }

    /// Read every remaining envelope.
    pub fn read_all(mut self) -> Result<DecodedBundle<E>> {
        let mut envelopes = Vec::new();
        while let Some(envelope) = self.read_envelope()? {
            envelopes.push(envelope);
        }
        Ok(DecodedBundle {
            envelopes,
            truncation: self.truncation,
        })
    }

    /// Why reading stopped early, if it did.
    pub fn truncation(&self) -> Option<&TruncatedRecord> {
        self.truncation.as_ref()
    }

    /// Number of envelopes returned so far.
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Bytes of the bundle consumed so far (version byte and complete frames).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current bundle reader configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    fn fill(&mut self) -> Result<usize> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(BundleError::Io(err)),
            }
        }
    }

    fn truncate(&mut self, position: usize, reason: TruncationReason) {
        warn!(
            record_index = self.records,
            position,
            reason = %reason,
            "bundle truncated, keeping decoded prefix"
        );
        self.truncation = Some(TruncatedRecord {
            record_index: self.records,
            position,
            reason,
        });
        self.finish();
    }

    fn finish(&mut self) {
        self.state = ReadState::Done;
        self.buf.clear();
    }
}

impl<R: Read, E: Envelope> Iterator for BundleReader<R, E> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_envelope().transpose()
    }
}
