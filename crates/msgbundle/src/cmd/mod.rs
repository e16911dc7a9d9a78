use clap::{Args, Subcommand, ValueEnum};
use msgbundle_codec::BundleConfig;
use msgbundle_envelope::ContentMode;
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod inspect;
pub mod pack;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack JSON-lines records into a bundle file.
    Pack(PackArgs),
    /// Decode a bundle file and print its summary.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub format: OutputFormat,
    pub config: BundleConfig,
}

pub fn run(command: Command, ctx: Context) -> CliResult<i32> {
    match command {
        Command::Pack(args) => pack::run(args, ctx),
        Command::Inspect(args) => inspect::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// JSON-lines input, one record per line. Use `-` for stdin.
    pub input: PathBuf,
    /// Stream id every record belongs to.
    #[arg(long, short = 's')]
    pub stream: String,
    /// Partition every record belongs to.
    #[arg(long, short = 'p', default_value = "0")]
    pub partition: u32,
    /// Bundle file to write.
    #[arg(long, short = 'o')]
    pub out: PathBuf,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum ContentArg {
    /// Payload bytes as stored.
    #[default]
    Raw,
    /// JSON payloads parsed.
    Parsed,
}

impl From<ContentArg> for ContentMode {
    fn from(arg: ContentArg) -> Self {
        match arg {
            ContentArg::Raw => ContentMode::Raw,
            ContentArg::Parsed => ContentMode::Parsed,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Bundle file to decode.
    pub path: PathBuf,
    /// How record payloads are decoded.
    #[arg(long, value_enum, default_value = "raw")]
    pub content: ContentArg,
    /// Include every record in the output.
    #[arg(long)]
    pub records: bool,
    /// Exit with a non-zero code if the bundle is truncated.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
