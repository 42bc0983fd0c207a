//! Unified error type.

use std::fmt;

/// Boxed error used for failures coming from foreign body types.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by switchyard's fallible operations.
///
/// Unmatched routes are not errors: they are answered by the not-found
/// handler. This type surfaces transport-edge failures and route patterns the
/// matcher refuses.
#[derive(Debug)]
pub enum Error {
    /// Reading the request body failed before dispatch.
    Body(BoxError),
    /// The matcher rejected a route pattern at registration time.
    InvalidRoute {
        pattern: String,
        source: matchit::InsertError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(e) => write!(f, "body: {e}"),
            Self::InvalidRoute { pattern, source } => {
                write!(f, "invalid route `{pattern}`: {source}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Body(e) => Some(e.as_ref()),
            Self::InvalidRoute { source, .. } => Some(source),
        }
    }
}
