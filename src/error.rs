use std::fmt;

/// Errors that can occur while sanitizing or interpreting code.
///
/// Every fault that comes from the program itself carries the 1-based
/// position of the offending instruction in the sanitized code.
#[derive(Debug, thiserror::Error)]
pub enum InterpreterError {
    /// Unended comments, unbalanced loops, or a character outside the instruction set.
    #[error("SyntaxError: at position {position} - {kind}")]
    Syntax { position: usize, kind: SyntaxErrorKind },

    /// The data pointer attempted to leave the tape.
    #[error("OutOfBoundsError: at position {position} - cannot move pointer out of {direction} bounds.")]
    OutOfBounds { position: usize, pointer: usize, direction: Direction },

    /// An increment would reach the integer limit.
    #[error("OverflowError: at position {position} - cannot increment memory block past integer limit of {limit}.")]
    Overflow { position: usize, limit: u32 },

    /// A decrement would take the cell below zero.
    #[error("SubZeroError: at position {position} - cannot decrement memory block past 0.")]
    SubZero { position: usize },

    /// Malformed input or an unprintable output value. Never softened by guard rails.
    #[error("InputError: at position {position} - {kind}")]
    Input { position: usize, kind: InputErrorKind },

    /// The input provider failed.
    #[error("I/O error at position {position}: {source}")]
    Io { position: usize, #[source] source: std::io::Error },

    /// Execution aborted due to step limit.
    #[error("Execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: usize },

    /// Execution aborted due to cooperative cancellation (e.g., timeout)
    #[error("Execution aborted: cancelled")]
    Canceled,
}

/// The fault family of an [`InterpreterError`], named the way diagnostics print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    SyntaxError,
    OutOfBoundsError,
    OverflowError,
    SubZeroError,
    InputError,
    IoError,
    Aborted,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FaultKind::SyntaxError => "SyntaxError",
            FaultKind::OutOfBoundsError => "OutOfBoundsError",
            FaultKind::OverflowError => "OverflowError",
            FaultKind::SubZeroError => "SubZeroError",
            FaultKind::InputError => "InputError",
            FaultKind::IoError => "IOError",
            FaultKind::Aborted => "Aborted",
        };
        f.write_str(name)
    }
}

impl InterpreterError {
    pub fn kind(&self) -> FaultKind {
        match self {
            InterpreterError::Syntax { .. } => FaultKind::SyntaxError,
            InterpreterError::OutOfBounds { .. } => FaultKind::OutOfBoundsError,
            InterpreterError::Overflow { .. } => FaultKind::OverflowError,
            InterpreterError::SubZero { .. } => FaultKind::SubZeroError,
            InterpreterError::Input { .. } => FaultKind::InputError,
            InterpreterError::Io { .. } => FaultKind::IoError,
            InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => FaultKind::Aborted,
        }
    }

    /// 1-based instruction position, when the fault is tied to one.
    pub fn position(&self) -> Option<usize> {
        match self {
            InterpreterError::Syntax { position, .. }
            | InterpreterError::OutOfBounds { position, .. }
            | InterpreterError::Overflow { position, .. }
            | InterpreterError::SubZero { position }
            | InterpreterError::Input { position, .. }
            | InterpreterError::Io { position, .. } => Some(*position),
            InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => None,
        }
    }

    /// The message without the "Kind: at position N - " prefix.
    pub fn detail(&self) -> String {
        match self {
            InterpreterError::Syntax { kind, .. } => kind.to_string(),
            InterpreterError::OutOfBounds { direction, .. } => {
                format!("cannot move pointer out of {direction} bounds.")
            }
            InterpreterError::Overflow { limit, .. } => {
                format!("cannot increment memory block past integer limit of {limit}.")
            }
            InterpreterError::SubZero { .. } => "cannot decrement memory block past 0.".to_string(),
            InterpreterError::Input { kind, .. } => kind.to_string(),
            InterpreterError::Io { source, .. } => source.to_string(),
            InterpreterError::StepLimitExceeded { .. } | InterpreterError::Canceled => self.to_string(),
        }
    }
}

/// Which way the pointer tried to leave the tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "leftward"),
            Direction::Right => write!(f, "rightward"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A `/*` or `*/` survived comment stripping.
    UnendedComment,
    /// `[` and `]` counts differ.
    UnterminatedLoops,
    /// A `]` was reached with no open loop.
    UnexpectedTerminator,
    /// The code ended inside a loop; `snippet` runs from the innermost open `[` to the end.
    MissingTerminator { snippet: String },
    InvalidCharacter(char),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxErrorKind::UnendedComment => write!(f, "cannot import code with unended comments."),
            SyntaxErrorKind::UnterminatedLoops => {
                write!(f, "cannot import code with unterminated while loops.")
            }
            SyntaxErrorKind::UnexpectedTerminator => {
                write!(f, "found while loop terminator ']' without a matching '['.")
            }
            SyntaxErrorKind::MissingTerminator { .. } => {
                write!(f, "expected while loop terminator ']' but terminator was not found.")
            }
            SyntaxErrorKind::InvalidCharacter(ch) => write!(f, "char '{ch}' could not be interpreted."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputErrorKind {
    /// The input token was not exactly one character long.
    WrongLength { received: String },
    /// The input character lies outside 0..=255.
    OutOfRange { ch: char },
    /// The input character does not fit under the configured integer limit.
    ExceedsLimit { ch: char, limit: u32 },
    /// `.` on a cell outside the printable range 32..=255.
    Unprintable { value: u32 },
}

impl fmt::Display for InputErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputErrorKind::WrongLength { received } => {
                write!(f, "received input \"{received}\" - char was not 1 in length.")
            }
            InputErrorKind::OutOfRange { ch } => {
                write!(f, "cannot input char '{ch}' with value that exceeds ASCII range of 255.")
            }
            InputErrorKind::ExceedsLimit { ch, limit } => {
                write!(f, "cannot input char '{ch}' with value that exceeds integer limit of {limit}.")
            }
            InputErrorKind::Unprintable { value } => write!(
                f,
                "cannot output char with value {value} that exceeds printable ASCII range of 32 to 255."
            ),
        }
    }
}

/// Invalid construction parameters for an interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("memory capacity must be at least 1 cell (got {0})")]
    ZeroCapacity(usize),

    #[error("integer limit must be greater than 1 (got {0})")]
    IntegerLimitTooSmall(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_kind_and_position() {
        let err = InterpreterError::SubZero { position: 4 };
        assert_eq!(err.to_string(), "SubZeroError: at position 4 - cannot decrement memory block past 0.");
        assert_eq!(err.kind(), FaultKind::SubZeroError);
        assert_eq!(err.position(), Some(4));
    }

    #[test]
    fn aborts_have_no_position() {
        let err = InterpreterError::StepLimitExceeded { limit: 50 };
        assert_eq!(err.position(), None);
        assert_eq!(err.kind(), FaultKind::Aborted);
        assert!(err.detail().contains("step limit exceeded (50)"));
    }

    #[test]
    fn detail_drops_prefix() {
        let err = InterpreterError::OutOfBounds { position: 1, pointer: 0, direction: Direction::Left };
        assert_eq!(err.detail(), "cannot move pointer out of leftward bounds.");
    }
}
