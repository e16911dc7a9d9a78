use bytes::Bytes;
use msgbundle_codec::{
    decode_bundle, BundleEncoder, BundleError, BundleReader, BundleStats, ContentMode,
    FORMAT_VERSION, LENGTH_PREFIX_SIZE,
};
use msgbundle_envelope::{Content, Envelope, StoredMessage, StreamMessage};
use serde_json::json;

fn json_message(stream: &str, partition: u32, offset: i64, timestamp: i64) -> StoredMessage {
    StoredMessage::new(
        StreamMessage::json(stream, partition, timestamp, json!({ "offset": offset, "tag": "x" })),
        offset,
        None,
    )
}

fn encode(messages: &[StoredMessage]) -> Bytes {
    let first = &messages[0];
    let mut encoder = BundleEncoder::new(first.stream_id(), first.partition()).unwrap();
    for msg in messages {
        encoder.append(msg).unwrap();
    }
    encoder.finalize().bytes
}

/// Byte offsets where each frame starts, plus the end of the bundle.
fn frame_boundaries(messages: &[StoredMessage]) -> Vec<usize> {
    let mut boundaries = vec![1];
    for msg in messages {
        let last = *boundaries.last().unwrap();
        boundaries.push(last + LENGTH_PREFIX_SIZE + msg.to_bytes().unwrap().len());
    }
    boundaries
}

#[test]
fn three_record_scenario() {
    let mut encoder = BundleEncoder::new("stream-a", 0).unwrap();
    for (offset, timestamp) in [(5, 100), (2, 50), (9, 300)] {
        encoder
            .append(&json_message("stream-a", 0, offset, timestamp))
            .unwrap();
    }
    let summary = encoder.finalize();

    assert_eq!(summary.stream_id, "stream-a");
    assert_eq!(summary.partition, 0);
    assert_eq!(summary.count, 3);
    assert_eq!(summary.min_offset(), Some(2));
    assert_eq!(summary.max_offset(), Some(9));
    assert_eq!(summary.min_timestamp(), Some(50));
    assert_eq!(summary.max_timestamp(), Some(300));

    let decoded = decode_bundle::<StoredMessage>(&summary.bytes, ContentMode::Raw).unwrap();
    assert!(decoded.is_complete());
    let offsets: Vec<i64> = decoded.envelopes.iter().map(|e| e.offset).collect();
    assert_eq!(offsets, vec![5, 2, 9]);
    for envelope in &decoded.envelopes {
        assert!(matches!(envelope.message.content, Content::Raw(_)));
    }
}

#[test]
fn roundtrip_preserves_order_and_content() {
    let messages: Vec<_> = (0..25)
        .map(|i| json_message("orders", 7, 1_000 - i * 3, 1_700_000_000_000 + (i % 4)))
        .collect();
    let bytes = encode(&messages);

    let decoded = decode_bundle::<StoredMessage>(&bytes, ContentMode::Parsed).unwrap();
    assert_eq!(decoded.envelopes, messages);
}

#[test]
fn summary_matches_stats_of_decoded_records() {
    let messages: Vec<_> = [(3, 30), (-1, 90), (12, -4), (0, 0)]
        .into_iter()
        .map(|(offset, ts)| json_message("s", 1, offset, ts))
        .collect();

    let mut encoder = BundleEncoder::new("s", 1).unwrap();
    for msg in &messages {
        encoder.append(msg).unwrap();
    }
    let summary = encoder.finalize();

    let decoded = decode_bundle::<StoredMessage>(&summary.bytes, ContentMode::Raw).unwrap();
    let stats = BundleStats::from_envelopes(&decoded.envelopes);
    assert_eq!(stats, summary.stats());
    assert_eq!(summary.min_offset(), Some(-1));
    assert_eq!(summary.max_offset(), Some(12));
    assert_eq!(summary.min_timestamp(), Some(-4));
    assert_eq!(summary.max_timestamp(), Some(90));
}

#[test]
fn every_cut_inside_a_frame_keeps_only_complete_records() {
    let messages: Vec<_> = (0..4).map(|i| json_message("s", 0, i, i)).collect();
    let bytes = encode(&messages);
    let boundaries = frame_boundaries(&messages);
    assert_eq!(*boundaries.last().unwrap(), bytes.len());

    for k in 1..=messages.len() {
        let (start, end) = (boundaries[k - 1], boundaries[k]);
        for cut in (start + 1)..end {
            let decoded = decode_bundle::<StoredMessage>(&bytes[..cut], ContentMode::Parsed)
                .unwrap_or_else(|err| panic!("cut at {cut} failed: {err}"));
            assert_eq!(decoded.envelopes, messages[..k - 1], "cut at {cut}");
            let truncation = decoded.truncation.expect("truncation expected");
            assert_eq!(truncation.record_index, k - 1);
            assert_eq!(truncation.position, start);
        }
    }
}

#[test]
fn cuts_on_frame_boundaries_are_clean() {
    let messages: Vec<_> = (0..3).map(|i| json_message("s", 0, i, i)).collect();
    let bytes = encode(&messages);

    for (k, &boundary) in frame_boundaries(&messages).iter().enumerate() {
        let decoded =
            decode_bundle::<StoredMessage>(&bytes[..boundary], ContentMode::Parsed).unwrap();
        assert_eq!(decoded.envelopes, messages[..k]);
        assert!(decoded.is_complete());
    }
}

#[test]
fn non_zero_version_rejects_everything() {
    let messages: Vec<_> = (0..3).map(|i| json_message("s", 0, i, i)).collect();
    let mut bytes = encode(&messages).to_vec();

    for version in [1u8, 2, 0x7F, 0xFF] {
        bytes[0] = version;
        let err = decode_bundle::<StoredMessage>(&bytes, ContentMode::Raw).unwrap_err();
        assert!(matches!(err, BundleError::UnsupportedVersion(v) if v == version));
    }
}

#[test]
fn empty_bundle_roundtrip() {
    let summary = BundleEncoder::new("empty", 4).unwrap().finalize();
    assert_eq!(summary.count, 0);
    assert_eq!(summary.bytes.as_ref(), &[FORMAT_VERSION]);
    assert_eq!(summary.min_offset(), None);
    assert_eq!(summary.max_offset(), None);
    assert_eq!(summary.min_timestamp(), None);
    assert_eq!(summary.max_timestamp(), None);

    let decoded = decode_bundle::<StoredMessage>(&summary.bytes, ContentMode::Raw).unwrap();
    assert!(decoded.is_empty());
    assert!(decoded.is_complete());
}

#[test]
fn mismatch_does_not_disturb_later_appends() {
    let mut encoder = BundleEncoder::new("s", 0).unwrap();
    encoder.append(&json_message("s", 0, 1, 10)).unwrap();
    assert!(encoder.append(&json_message("t", 0, 100, 1000)).is_err());
    assert!(encoder.append(&json_message("s", 1, 100, 1000)).is_err());
    encoder.append(&json_message("s", 0, 2, 20)).unwrap();

    let summary = encoder.finalize();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.max_offset(), Some(2));
    assert_eq!(summary.max_timestamp(), Some(20));

    let decoded = decode_bundle::<StoredMessage>(&summary.bytes, ContentMode::Raw).unwrap();
    assert_eq!(decoded.len(), 2);
}

#[test]
fn streaming_reader_agrees_with_in_memory_decode() {
    let messages: Vec<_> = (0..10).map(|i| json_message("s", 0, i, i * 2)).collect();
    let bytes = encode(&messages);
    let cut = &bytes[..bytes.len() - 7];

    let in_memory = decode_bundle::<StoredMessage>(cut, ContentMode::Parsed).unwrap();
    let reader = std::io::Cursor::new(cut.to_vec());
    let streamed = BundleReader::<_, StoredMessage>::new(reader, ContentMode::Parsed)
        .read_all()
        .unwrap();

    assert_eq!(in_memory, streamed);
    assert_eq!(streamed.len(), 9);
}
