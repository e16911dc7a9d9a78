//! `tokio_util::codec` adapter for bundles arriving over async streams.

use std::marker::PhantomData;

use bytes::{Buf, BufMut, BytesMut};
use msgbundle_envelope::{ContentMode, Envelope};
use tokio::io::AsyncWrite;
use tokio_util::codec::{Decoder, Encoder, FramedWrite};
use tracing::warn;

use crate::codec::{
    check_version, decode_record, encode_record, incomplete_reason, BundleConfig, FORMAT_VERSION,
    LENGTH_PREFIX_SIZE,
};
use crate::error::{BundleError, Result, TruncatedRecord, TruncationReason};

/// Bundle codec for `FramedRead` / `FramedWrite`.
///
/// Decoding yields envelopes and ends the stream at the first truncated or
/// corrupt record (see [`BundleCodec::truncation`]). Encoding writes the
/// version byte before the first record and pins the bundle to the first
/// envelope's stream and partition. A writer that may send no envelopes
/// should come from [`BundleCodec::writer`] or call [`BundleCodec::begin`],
/// so an empty bundle still carries its version byte.
pub struct BundleCodec<E> {
    mode: ContentMode,
    config: BundleConfig,
    version_read: bool,
    version_written: bool,
    done: bool,
    position: usize,
    records: usize,
    truncation: Option<TruncatedRecord>,
    identity: Option<(String, u32)>,
    _envelope: PhantomData<fn() -> E>,
}

impl<E> BundleCodec<E> {
    /// Create a codec with default configuration.
    pub fn new(mode: ContentMode) -> Self {
        Self::with_config(mode, BundleConfig::default())
    }

    /// Create a codec with explicit configuration.
    pub fn with_config(mode: ContentMode, config: BundleConfig) -> Self {
        Self {
            mode,
            config,
            version_read: false,
            version_written: false,
            done: false,
            position: 0,
            records: 0,
            truncation: None,
            identity: None,
            _envelope: PhantomData,
        }
    }

    /// Write the version byte into `dst` unless it was already written.
    pub fn begin(&mut self, dst: &mut BytesMut) {
        if !self.version_written {
            dst.put_u8(FORMAT_VERSION);
            self.version_written = true;
        }
    }

    /// Wrap `inner` in a `FramedWrite` whose buffer already holds the
    /// version byte. Flushing it without sending anything writes `[0]`.
    pub fn writer<W: AsyncWrite>(inner: W, config: BundleConfig) -> FramedWrite<W, Self> {
        let mut framed = FramedWrite::new(inner, Self::with_config(ContentMode::Raw, config));
        framed.write_buffer_mut().put_u8(FORMAT_VERSION);
        framed.encoder_mut().version_written = true;
        framed
    }

    /// Why decoding stopped early, if it did.
    pub fn truncation(&self) -> Option<&TruncatedRecord> {
        self.truncation.as_ref()
    }

    /// Number of envelopes decoded so far.
    pub fn records_decoded(&self) -> usize {
        self.records
    }

    fn truncate(&mut self, position: usize, reason: TruncationReason, src: &mut BytesMut) {
        warn!(
            record_index = self.records,
            position,
            reason = %reason,
            "bundle stream truncated, ending decode"
        );
        self.truncation = Some(TruncatedRecord {
            record_index: self.records,
            position,
            reason,
        });
        self.done = true;
        src.clear();
    }
}

impl<E: Envelope> Decoder for BundleCodec<E> {
    type Item = E;
    type Error = BundleError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<E>> {
        if self.done {
            src.clear();
            return Ok(None);
        }

        if !self.version_read {
            if src.is_empty() {
                return Ok(None);
            }
            if let Err(err) = check_version(src.get_u8()) {
                self.done = true;
                src.clear();
                return Err(err);
            }
            self.version_read = true;
            self.position = 1;
        }

        let start = self.position;
        match decode_record(src, self.config.max_record_size) {
            Ok(Some(record)) => {
                self.position += LENGTH_PREFIX_SIZE + record.len();
                match E::from_bytes(record, self.mode) {
                    Ok(envelope) => {
                        self.records += 1;
                        Ok(Some(envelope))
                    }
                    Err(err) => {
                        let reason = TruncationReason::InvalidEnvelope(err.to_string());
                        self.truncate(start, reason, src);
                        Ok(None)
                    }
                }
            }
            Ok(None) => Ok(None),
            Err(BundleError::RecordTooLarge { size, max }) => {
                let reason = TruncationReason::OversizedRecord {
                    declared: size,
                    max,
                };
                self.truncate(start, reason, src);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<E>> {
        if let Some(envelope) = self.decode(src)? {
            return Ok(Some(envelope));
        }
        if self.done {
            return Ok(None);
        }
        if !self.version_read {
            self.done = true;
            return Err(BundleError::MissingVersion);
        }
        if !src.is_empty() {
            let reason = incomplete_reason(src);
            self.truncate(self.position, reason, src);
        }
        self.done = true;
        Ok(None)
    }
}

impl<'a, E: Envelope> Encoder<&'a E> for BundleCodec<E> {
    type Error = BundleError;

    fn encode(&mut self, envelope: &'a E, dst: &mut BytesMut) -> Result<()> {
        if let Some((stream_id, partition)) = &self.identity {
            if envelope.stream_id() != stream_id.as_str() || envelope.partition() != *partition {
                return Err(BundleError::StreamMismatch {
                    expected_stream: stream_id.clone(),
                    expected_partition: *partition,
                    actual_stream: envelope.stream_id().to_string(),
                    actual_partition: envelope.partition(),
                });
            }
        }

        let bytes = envelope
            .to_bytes()
            .map_err(|err| BundleError::Envelope(Box::new(err)))?;

        let mut frame = BytesMut::new();
        if !self.version_written {
            frame.put_u8(FORMAT_VERSION);
        }
        encode_record(&bytes, &mut frame, self.config.max_record_size)?;
        dst.extend_from_slice(&frame);

        self.version_written = true;
        if self.identity.is_none() {
            self.identity = Some((envelope.stream_id().to_string(), envelope.partition()));
        }
        Ok(())
    }
}
