use std::fmt;

use thiserror::Error;

/// Why a single field's text failed to parse.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("field is empty")]
    EmptyField,
    #[error("not a valid unsigned integer")]
    BadNumber,
    #[error("value is outside the field's allowed range")]
    OutOfRange,
    #[error("range start is greater than range end")]
    BadRangeOrder,
    #[error("step must be at least 1")]
    StepZero,
    #[error("step does not fit in 32 bits")]
    StepTooLarge,
    #[error("field has more than 12 atoms")]
    TooManyAtoms,
    #[error("unexpected characters after a valid item")]
    TrailingGarbage,
    #[error("expected exactly 7 whitespace-separated fields")]
    FieldCountMismatch,
    #[error("schedule string exceeds 512 bytes")]
    ScheduleTooLong,
}

/// A schedule string failed to parse. `field` is the 0-based field index
/// (0 = nanosecond .. 6 = day-of-week), or `None` when the failure is not
/// attributable to one field (field count mismatch, schedule too long).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    pub field: Option<usize>,
    pub kind: ParseErrorKind,
}

impl std::error::Error for ParseError {}

impl ParseError {
    pub(crate) fn whole(kind: ParseErrorKind) -> Self {
        ParseError { field: None, kind }
    }

    pub(crate) fn at(field: usize, kind: ParseErrorKind) -> Self {
        ParseError {
            field: Some(field),
            kind,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(idx) => write!(f, "field {}: {}", idx, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
