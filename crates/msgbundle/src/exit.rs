use std::fmt;
use std::io;

use msgbundle_codec::BundleError;

pub const SUCCESS: i32 = 0;
pub const PERMISSION_DENIED: i32 = 50;
pub const NOT_FOUND: i32 = 51;
pub const DATA_INVALID: i32 = 60;
pub const DATA_TRUNCATED: i32 = 61;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => NOT_FOUND,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn bundle_error(context: &str, err: BundleError) -> CliError {
    match err {
        BundleError::Io(source) => io_error(context, source),
        BundleError::InvalidArgument(_) | BundleError::StreamMismatch { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        BundleError::UnsupportedVersion(_)
        | BundleError::MissingVersion
        | BundleError::RecordTooLarge { .. }
        | BundleError::Envelope(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
    }
}
