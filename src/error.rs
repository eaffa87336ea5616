use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    InputNotFound(PathBuf),
    InputTooLarge { len: usize, max: usize },
    MalformedTimestamp(String),
    MalformedBlock(String),
    NoCaptionsFound,
    WriteFailure(PathBuf),
}

impl Error for ConvertError {}

impl fmt::Display for ConvertError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConvertError::InputNotFound(path) => {
                write!(fmt, "SRT file not found: '{}'", path.display())
            }
            ConvertError::InputTooLarge { len, max } => write!(
                fmt,
                "Input is {} bytes, which exceeds the limit of {} bytes",
                len, max
            ),
            ConvertError::MalformedTimestamp(ts) => write!(fmt, "Malformed timestamp: '{}'", ts),
            ConvertError::MalformedBlock(reason) => write!(fmt, "Malformed block: {}", reason),
            ConvertError::NoCaptionsFound => write!(fmt, "No valid captions found in SRT file"),
            ConvertError::WriteFailure(path) => {
                write!(fmt, "Failed to write output file: '{}'", path.display())
            }
        }
    }
}
