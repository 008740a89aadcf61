use serde::{Deserialize, Serialize};

/// Errors shared by every simulator. Failing to place a process or evicting a
/// page are normal outcomes and never show up here: only inputs the
/// simulators refuse to run on do.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Error {
    /// An argument violates a simulator's contract, e.g. a zero block
    /// capacity or a frame count of zero.
    InvalidInput(String),
    /// Textual input that could not be parsed, e.g. a non-numeric token in a
    /// reference string.
    InvalidData(String),
    /// Simulated time or size arithmetic overflowed.
    ArithmeticOverflow,
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::ArithmeticOverflow => write!(f, "arithmetic overflow"),
        }
    }
}

/// Constructs an Error::InvalidInput for the given format string.
#[macro_export]
macro_rules! errinput {
    ($($args:tt)*) => { $crate::Error::InvalidInput(format!($($args)*)).into() };
}

/// Constructs an Error::InvalidData for the given format string.
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { $crate::Error::InvalidData(format!($($args)*)).into() };
}

/// A result returning an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Lets `errinput!` and `errdata!` be returned directly as a `Result`.
impl<T> From<Error> for Result<T> {
    fn from(error: Error) -> Self {
        Err(error)
    }
}
