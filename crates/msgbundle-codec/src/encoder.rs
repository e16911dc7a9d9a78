use bytes::{BufMut, BytesMut};
use msgbundle_envelope::Envelope;
use tracing::{debug, trace};

use crate::codec::{encode_record, BundleConfig, FORMAT_VERSION};
use crate::error::{BundleError, Result};
use crate::summary::{BundleStats, BundleSummary};

/// Accumulates envelopes of one `(stream_id, partition)` into a bundle.
///
/// Appends mutate in place; [`BundleEncoder::finalize`] consumes the
/// encoder, so a finalized bundle cannot be extended.
#[derive(Debug)]
pub struct BundleEncoder {
    stream_id: String,
    partition: u32,
    buf: BytesMut,
    stats: BundleStats,
    config: BundleConfig,
}

impl BundleEncoder {
    /// Create an encoder with default configuration.
    pub fn new(stream_id: impl Into<String>, partition: u32) -> Result<Self> {
        Self::with_config(stream_id, partition, BundleConfig::default())
    }

    /// Create an encoder with explicit configuration.
    ///
    /// Fails with [`BundleError::InvalidArgument`] if `stream_id` is empty.
    pub fn with_config(
        stream_id: impl Into<String>,
        partition: u32,
        config: BundleConfig,
    ) -> Result<Self> {
        let stream_id = stream_id.into();
        if stream_id.is_empty() {
            return Err(BundleError::InvalidArgument(
                "stream_id must not be empty".to_string(),
            ));
        }

        let mut buf = BytesMut::with_capacity(config.initial_capacity.max(1));
        buf.put_u8(FORMAT_VERSION);

        Ok(Self {
            stream_id,
            partition,
            buf,
            stats: BundleStats::default(),
            config,
        })
    }

    /// Append one envelope.
    ///
    /// The envelope must belong to this bundle's stream and partition. On
    /// error the encoder is left exactly as it was.
    pub fn append<E: Envelope>(&mut self, envelope: &E) -> Result<()> {
        if envelope.stream_id() != self.stream_id || envelope.partition() != self.partition {
            return Err(BundleError::StreamMismatch {
                expected_stream: self.stream_id.clone(),
                expected_partition: self.partition,
                actual_stream: envelope.stream_id().to_string(),
                actual_partition: envelope.partition(),
            });
        }

        let bytes = envelope
            .to_bytes()
            .map_err(|err| BundleError::Envelope(Box::new(err)))?;
        encode_record(&bytes, &mut self.buf, self.config.max_record_size)?;

        self.stats.record(envelope.offset(), envelope.timestamp());
        trace!(
            stream_id = %self.stream_id,
            partition = self.partition,
            offset = envelope.offset(),
            size = bytes.len(),
            "appended record to bundle"
        );
        Ok(())
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn partition(&self) -> u32 {
        self.partition
    }

    /// Number of records appended so far.
    pub fn count(&self) -> usize {
        self.stats.count
    }

    /// Encoded size so far, including the version byte.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when no records were appended.
    pub fn is_empty(&self) -> bool {
        self.stats.count == 0
    }

    /// Current aggregates.
    pub fn stats(&self) -> &BundleStats {
        &self.stats
    }

    /// Current encoder configuration.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Freeze the buffer and return the bundle with its aggregates.
    pub fn finalize(self) -> BundleSummary {
        debug!(
            stream_id = %self.stream_id,
            partition = self.partition,
            count = self.stats.count,
            bytes = self.buf.len(),
            "finalized bundle"
        );
        BundleSummary {
            stream_id: self.stream_id,
            partition: self.partition,
            count: self.stats.count,
            bytes: self.buf.freeze(),
            offsets: self.stats.offsets,
            timestamps: self.stats.timestamps,
        }
    }
}
