use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use msgbundle_codec::{BundleStats, TruncatedRecord};
use msgbundle_envelope::{Content, StoredMessage};
use serde::Serialize;

const PREVIEW_LIMIT: usize = 64;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Bundle-level facts printed by `pack` and `inspect`.
#[derive(Debug, Serialize)]
pub struct BundleReport {
    pub stream_id: Option<String>,
    pub partition: Option<u32>,
    pub count: usize,
    pub size_bytes: usize,
    pub min_offset: Option<i64>,
    pub max_offset: Option<i64>,
    pub min_timestamp: Option<i64>,
    pub max_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncation: Option<TruncationReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordReport>,
}

impl BundleReport {
    pub fn new(
        stream_id: Option<String>,
        partition: Option<u32>,
        stats: &BundleStats,
        size_bytes: usize,
    ) -> Self {
        Self {
            stream_id,
            partition,
            count: stats.count,
            size_bytes,
            min_offset: stats.offsets.map(|span| span.min),
            max_offset: stats.offsets.map(|span| span.max),
            min_timestamp: stats.timestamps.map(|span| span.min),
            max_timestamp: stats.timestamps.map(|span| span.max),
            truncation: None,
            records: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TruncationReport {
    pub record_index: usize,
    pub position: usize,
    pub reason: String,
}

impl From<&TruncatedRecord> for TruncationReport {
    fn from(truncated: &TruncatedRecord) -> Self {
        Self {
            record_index: truncated.record_index,
            position: truncated.position,
            reason: truncated.reason.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordReport {
    pub offset: i64,
    pub previous_offset: Option<i64>,
    pub timestamp: i64,
    pub ttl: u32,
    pub content: serde_json::Value,
}

impl From<&StoredMessage> for RecordReport {
    fn from(msg: &StoredMessage) -> Self {
        let content = match &msg.message.content {
            Content::Json(value) => value.clone(),
            Content::Raw(bytes) => serde_json::Value::String(payload_preview(bytes)),
        };
        Self {
            offset: msg.offset,
            previous_offset: msg.previous_offset,
            timestamp: msg.message.timestamp,
            ttl: msg.message.ttl,
            content,
        }
    }
}

pub fn print_report(report: &BundleReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "STREAM",
                    "PARTITION",
                    "COUNT",
                    "BYTES",
                    "OFFSETS",
                    "TIMESTAMPS",
                ])
                .add_row(vec![
                    opt(report.stream_id.as_deref()),
                    opt(report.partition),
                    report.count.to_string(),
                    report.size_bytes.to_string(),
                    range(report.min_offset, report.max_offset),
                    range(report.min_timestamp, report.max_timestamp),
                ]);
            println!("{table}");

            if !report.records.is_empty() {
                let mut records = Table::new();
                records
                    .load_preset(UTF8_FULL)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(vec!["OFFSET", "PREVIOUS", "TIMESTAMP", "TTL", "CONTENT"]);
                for record in &report.records {
                    records.add_row(vec![
                        record.offset.to_string(),
                        opt(record.previous_offset),
                        record.timestamp.to_string(),
                        record.ttl.to_string(),
                        content_preview(&record.content),
                    ]);
                }
                println!("{records}");
            }
            print_truncation_note(report);
        }
        OutputFormat::Pretty => {
            println!(
                "stream={} partition={} count={} bytes={} offsets={} timestamps={}",
                opt(report.stream_id.as_deref()),
                opt(report.partition),
                report.count,
                report.size_bytes,
                range(report.min_offset, report.max_offset),
                range(report.min_timestamp, report.max_timestamp),
            );
            for record in &report.records {
                println!(
                    "  offset={} timestamp={} content={}",
                    record.offset,
                    record.timestamp,
                    content_preview(&record.content)
                );
            }
            print_truncation_note(report);
        }
    }
}

fn print_truncation_note(report: &BundleReport) {
    if let Some(truncation) = &report.truncation {
        println!(
            "truncated at record {} (byte {}): {}",
            truncation.record_index, truncation.position, truncation.reason
        );
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn range(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("{min}..={max}"),
        _ => "-".to_string(),
    }
}

fn content_preview(value: &serde_json::Value) -> String {
    let text = match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    truncate_chars(&text, PREVIEW_LIMIT)
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
