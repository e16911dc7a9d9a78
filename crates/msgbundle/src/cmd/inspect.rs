use std::fs::File;

use msgbundle_codec::{BundleReader, BundleStats, DecodedBundle};
use msgbundle_envelope::{ContentMode, StoredMessage};

use crate::cmd::{Context, InspectArgs};
use crate::exit::{bundle_error, io_error, CliError, CliResult, DATA_TRUNCATED, SUCCESS};
use crate::output::{print_report, BundleReport, RecordReport, TruncationReport};

pub fn run(args: InspectArgs, ctx: Context) -> CliResult<i32> {
    let file = File::open(&args.path)
        .map_err(|err| io_error(&format!("failed opening {}", args.path.display()), err))?;
    let size_bytes = file
        .metadata()
        .map_err(|err| io_error(&format!("failed reading {}", args.path.display()), err))?
        .len() as usize;

    let mode = ContentMode::from(args.content);
    let decoded: DecodedBundle<StoredMessage> = BundleReader::with_config(file, mode, ctx.config)
        .read_all()
        .map_err(|err| bundle_error(&format!("failed decoding {}", args.path.display()), err))?;

    let report = build_report(&decoded, size_bytes, args.records);
    print_report(&report, ctx.format);

    match &decoded.truncation {
        Some(truncated) if args.strict => Err(CliError::new(
            DATA_TRUNCATED,
            format!("{} is truncated: {truncated}", args.path.display()),
        )),
        _ => Ok(SUCCESS),
    }
}

fn build_report(
    decoded: &DecodedBundle<StoredMessage>,
    size_bytes: usize,
    with_records: bool,
) -> BundleReport {
    let first = decoded.envelopes.first();
    let mut report = BundleReport::new(
        first.map(|msg| msg.message.stream_id.clone()),
        first.map(|msg| msg.message.partition),
        &BundleStats::from_envelopes(&decoded.envelopes),
        size_bytes,
    );
    report.truncation = decoded.truncation.as_ref().map(TruncationReport::from);
    if with_records {
        report.records = decoded.envelopes.iter().map(RecordReport::from).collect();
    }
    report
}
