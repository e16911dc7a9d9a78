use bytes::Bytes;
use msgbundle_envelope::Envelope;

/// An inclusive `[min, max]` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub min: i64,
    pub max: i64,
}

impl Span {
    /// A span covering a single value.
    pub fn of(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Widen the span to include `value`.
    pub fn extend(self, value: i64) -> Self {
        Self {
            min: self.min.min(value),
            max: self.max.max(value),
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

fn widen(span: Option<Span>, value: i64) -> Option<Span> {
    Some(span.map_or_else(|| Span::of(value), |span| span.extend(value)))
}

/// Running aggregates over the records of a bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BundleStats {
    pub count: usize,
    /// `None` until the first record.
    pub offsets: Option<Span>,
    /// `None` until the first record.
    pub timestamps: Option<Span>,
}

impl BundleStats {
    /// Account for one record.
    pub fn record(&mut self, offset: i64, timestamp: i64) {
        self.count += 1;
        self.offsets = widen(self.offsets, offset);
        self.timestamps = widen(self.timestamps, timestamp);
    }

    /// Aggregates over already-decoded envelopes.
    pub fn from_envelopes<E: Envelope>(envelopes: &[E]) -> Self {
        let mut stats = Self::default();
        for envelope in envelopes {
            stats.record(envelope.offset(), envelope.timestamp());
        }
        stats
    }
}

/// A finalized bundle: the encoded bytes plus the metadata storage
/// indexes it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleSummary {
    pub stream_id: String,
    pub partition: u32,
    pub count: usize,
    /// Version byte followed by every record frame.
    pub bytes: Bytes,
    pub offsets: Option<Span>,
    pub timestamps: Option<Span>,
}

impl BundleSummary {
    pub fn min_offset(&self) -> Option<i64> {
        self.offsets.map(|span| span.min)
    }

    pub fn max_offset(&self) -> Option<i64> {
        self.offsets.map(|span| span.max)
    }

    pub fn min_timestamp(&self) -> Option<i64> {
        self.timestamps.map(|span| span.min)
    }

    pub fn max_timestamp(&self) -> Option<i64> {
        self.timestamps.map(|span| span.max)
    }

    /// True when no records were appended.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Aggregates without the bytes.
    pub fn stats(&self) -> BundleStats {
        BundleStats {
            count: self.count,
            offsets: self.offsets,
            timestamps: self.timestamps,
        }
    }
}
