use std::error::Error;
use std::fmt::{self, Display};

use ai_builder_model::{BackendError, ErrorKind};

/// The notice shown when a failed request carries no server message.
pub const GENERIC_FAILURE: &str = "Failed. Please try again.";

const BUSY_NOTICE: &str = "A request is already in progress.";

/// Describes why a session operation failed.
///
/// No session error is fatal: the session stays usable after any of them.
#[derive(Debug)]
pub enum SessionError {
    /// Another send was still in flight.
    Busy,
    /// The backend failed or rejected the request.
    Backend(Box<dyn BackendError>),
}

impl SessionError {
    /// Returns the kind of the backend failure, if this is one.
    #[inline]
    pub fn backend_kind(&self) -> Option<ErrorKind> {
        match self {
            SessionError::Busy => None,
            SessionError::Backend(err) => Some(err.kind()),
        }
    }

    /// Returns the text to show to the user: the server's message if it
    /// sent one, otherwise a generic notice.
    pub fn user_message(&self) -> &str {
        match self {
            SessionError::Busy => BUSY_NOTICE,
            SessionError::Backend(err) => match err.server_message() {
                Some(message) if !message.is_empty() => message,
                _ => GENERIC_FAILURE,
            },
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => f.write_str(BUSY_NOTICE),
            SessionError::Backend(err) => write!(f, "{}: {err}", err.kind()),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Busy => None,
            SessionError::Backend(err) => Some(err.as_ref()),
        }
    }
}

impl From<Box<dyn BackendError>> for SessionError {
    #[inline]
    fn from(err: Box<dyn BackendError>) -> Self {
        SessionError::Backend(err)
    }
}
