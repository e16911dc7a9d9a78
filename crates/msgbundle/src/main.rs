mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use msgbundle_codec::{BundleConfig, MAX_RECORD_SIZE};

use crate::cmd::{Command, Context};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "msgbundle", version, about = "Pack and inspect message bundles")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Largest serialized record accepted when packing or inspecting.
    #[arg(
        long,
        value_name = "BYTES",
        env = "MSGBUNDLE_MAX_RECORD_SIZE",
        default_value_t = MAX_RECORD_SIZE,
        global = true
    )]
    max_record_size: usize,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn context(&self) -> Context {
        Context {
            format: self.format.unwrap_or_else(OutputFormat::default_for_stdout),
            config: BundleConfig {
                max_record_size: self.max_record_size,
                ..BundleConfig::default()
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let ctx = cli.context();
    let result = cmd::run(cli.command, ctx);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
