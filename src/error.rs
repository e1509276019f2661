use std::error::Error;
use std::fmt::Formatter;

/// Every way a plan can refuse work.
///
/// Validation happens before any buffer is touched, so an `Err` always means
/// the destination is exactly as the caller left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    /// Unsupported transform length (`N < 1`, or a length whose tables would
    /// not fit in memory).
    InvalidLength,
    /// A required buffer is absent: an empty slice, or the scratch of a
    /// closed pooled plan.
    NilBuffer,
    /// A buffer disagrees with `N`, or with `count`/`stride` for strided and
    /// batched calls.
    LengthMismatch,
    /// `stride < 1`, a batch distance shorter than `N`, or index arithmetic
    /// that would overflow.
    InvalidStride,
    /// Every kernel in the selected chain declined. This is an engine gap,
    /// not a caller error.
    NotImplemented,
}

impl Error for FftError {}

impl std::fmt::Display for FftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FftError::InvalidLength => f.write_str("transform length is not supported"),
            FftError::NilBuffer => f.write_str("required buffer is absent"),
            FftError::LengthMismatch => {
                f.write_str("buffer length does not match the plan length")
            }
            FftError::InvalidStride => f.write_str("stride is zero or overflows the buffer"),
            FftError::NotImplemented => f.write_str("no kernel accepted this transform"),
        }
    }
}

/// Failure to parse a textual wisdom entry or one of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    what: &'static str,
    input: String,
}

impl ParseError {
    pub(crate) fn new(what: &'static str, input: &str) -> Self {
        Self {
            what,
            input: input.to_owned(),
        }
    }

    /// The field that failed to parse (`"precision"`, `"strategy"`, ...).
    pub fn field(&self) -> &'static str {
        self.what
    }
}

impl Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("invalid {}: {:?}", self.what, self.input))
    }
}
