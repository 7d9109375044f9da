use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a response (connection refused, reset,
    /// DNS failure, etc.).
    Transport,
    /// The backend answered with a non-success status.
    Rejected,
    /// The backend answered, but the payload could not be understood.
    InvalidResponse,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::Rejected => write!(f, "Request rejected"),
            ErrorKind::InvalidResponse => write!(f, "Invalid response"),
        }
    }
}
