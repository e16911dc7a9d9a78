use msgbundle_codec::{FORMAT_VERSION, MAX_RECORD_SIZE};
use msgbundle_envelope::ENVELOPE_VERSION;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("msgbundle {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: msgbundle");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("bundle_format: {FORMAT_VERSION}");
    println!("envelope_format: {ENVELOPE_VERSION}");
    println!("max_record_size: {MAX_RECORD_SIZE}");
    println!(
        "target: {}",
        option_env!("MSGBUNDLE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("MSGBUNDLE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("features: async={}, cli=true", cfg!(feature = "async"));

    Ok(SUCCESS)
}
