use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use msgbundle_codec::BundleEncoder;
use msgbundle_envelope::{StoredMessage, StreamMessage};
use serde::Deserialize;

use crate::cmd::{Context, PackArgs};
use crate::exit::{bundle_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_report, BundleReport};

/// One line of `pack` input.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InputRecord {
    offset: i64,
    timestamp: i64,
    content: serde_json::Value,
    #[serde(default)]
    previous_offset: Option<i64>,
    #[serde(default)]
    ttl: u32,
}

pub fn run(args: PackArgs, ctx: Context) -> CliResult<i32> {
    let input = open_input(&args.input)?;
    let mut encoder = BundleEncoder::with_config(&args.stream, args.partition, ctx.config)
        .map_err(|err| bundle_error("invalid bundle", err))?;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|err| io_error("failed reading input", err))?;
        let Some(msg) = parse_line(&line, &args.stream, args.partition)
            .map_err(|err| CliError::new(DATA_INVALID, format!("line {line_no}: {err}")))?
        else {
            continue;
        };
        encoder
            .append(&msg)
            .map_err(|err| bundle_error(&format!("line {line_no}"), err))?;
    }

    let summary = encoder.finalize();
    fs::write(&args.out, &summary.bytes)
        .map_err(|err| io_error(&format!("failed writing {}", args.out.display()), err))?;
    tracing::info!(
        path = %args.out.display(),
        count = summary.count,
        bytes = summary.bytes.len(),
        "wrote bundle"
    );

    let report = BundleReport::new(
        Some(summary.stream_id.clone()),
        Some(summary.partition),
        &summary.stats(),
        summary.bytes.len(),
    );
    print_report(&report, ctx.format);
    Ok(SUCCESS)
}

fn open_input(path: &Path) -> CliResult<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = fs::File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parse one input line. Blank lines yield `None`.
fn parse_line(
    line: &str,
    stream: &str,
    partition: u32,
) -> Result<Option<StoredMessage>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let record: InputRecord = serde_json::from_str(line)?;
    let message = StreamMessage::json(stream, partition, record.timestamp, record.content)
        .with_ttl(record.ttl);
    Ok(Some(StoredMessage::new(message, record.offset, record.previous_offset)))
}

#[cfg(test)]
mod tests {
    use msgbundle_envelope::Content;

    use super::*;

    #[test]
    fn parses_minimal_line() {
        let msg = parse_line(r#"{"offset":3,"timestamp":30,"content":{"a":1}}"#, "s", 2)
            .unwrap()
            .unwrap();
        assert_eq!(msg.offset, 3);
        assert_eq!(msg.previous_offset, None);
        assert_eq!(msg.message.stream_id, "s");
        assert_eq!(msg.message.partition, 2);
        assert_eq!(msg.message.timestamp, 30);
        assert_eq!(msg.message.content, Content::Json(serde_json::json!({"a": 1})));
    }

    #[test]
    fn parses_optional_fields() {
        let msg = parse_line(
            r#"{"offset":4,"timestamp":1,"content":"x","previous_offset":3,"ttl":60}"#,
            "s",
            0,
        )
        .unwrap()
        .unwrap();
        assert_eq!(msg.previous_offset, Some(3));
        assert_eq!(msg.message.ttl, 60);
    }

    #[test]
    fn skips_blank_lines() {
        assert!(parse_line("   ", "s", 0).unwrap().is_none());
    }

    #[test]
    fn rejects_unknown_fields_and_missing_offset() {
        assert!(parse_line(r#"{"timestamp":1,"content":1}"#, "s", 0).is_err());
        assert!(parse_line(r#"{"offset":1,"timestamp":1,"content":1,"x":2}"#, "s", 0).is_err());
    }
}
