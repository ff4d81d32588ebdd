use std::{path::Path, sync::Arc};

/// Creates a new ad hoc error value from `format_args!`.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::adhoc_from_args(core::format_args!($($tt)*))
    }}
}

pub(crate) use err;

/// An error that can occur in this crate.
///
/// The most common sources of error are a time zone that could not be
/// loaded (an unknown name, or malformed zoneinfo data) and an input that
/// could not be parsed against a format string.
///
/// # Design
///
/// This crate uses a single error type for all of its operations. Errors
/// are cheap to clone and may carry a causal chain that is rendered by the
/// `Display` implementation, so `err.to_string()` tells the whole story.
#[derive(Clone, Debug)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

#[derive(Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    /// A free-form error message.
    Adhoc(String),
    /// A value was outside its allowed range.
    Range { what: &'static str, given: i64, min: i64, max: i64 },
    /// An I/O error, with the path that provoked it.
    Io { path: String, err: std::io::Error },
    /// A time zone name that could not be mapped to zone data.
    TimeZoneLookup(String),
}

impl Error {
    pub(crate) fn adhoc_from_args(message: core::fmt::Arguments<'_>) -> Error {
        Error::from_kind(ErrorKind::Adhoc(message.to_string()))
    }

    /// Creates a new error indicating that `given` fell outside of
    /// `min..=max`. `what` is a human readable label for the value, e.g.
    /// "seconds".
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: i64,
        min: i64,
        max: i64,
    ) -> Error {
        Error::from_kind(ErrorKind::Range { what, given, min, max })
    }

    #[inline(never)]
    #[cold]
    pub(crate) fn fs(path: &Path, err: std::io::Error) -> Error {
        Error::from_kind(ErrorKind::Io {
            path: path.display().to_string(),
            err,
        })
    }

    #[inline(never)]
    #[cold]
    pub(crate) fn time_zone_lookup(name: &str) -> Error {
        Error::from_kind(ErrorKind::TimeZoneLookup(name.to_string()))
    }

    fn from_kind(kind: ErrorKind) -> Error {
        Error { inner: Arc::new(ErrorInner { kind, cause: None }) }
    }

    /// Contextualizes the error `consequent` with this error as its cause.
    #[inline(never)]
    #[cold]
    pub(crate) fn context_impl(self, consequent: Error) -> Error {
        let kind = match consequent.inner.kind {
            ErrorKind::Adhoc(ref msg) => ErrorKind::Adhoc(msg.clone()),
            ErrorKind::Range { what, given, min, max } => {
                ErrorKind::Range { what, given, min, max }
            }
            // I/O errors aren't cloneable, so flatten to a message. This
            // only happens when an I/O error is used as *context*, which
            // the crate never does on a hot path.
            ErrorKind::Io { ref path, ref err } => {
                ErrorKind::Adhoc(format!("{path}: {err}"))
            }
            ErrorKind::TimeZoneLookup(ref name) => {
                ErrorKind::TimeZoneLookup(name.clone())
            }
        };
        Error { inner: Arc::new(ErrorInner { kind, cause: Some(self) }) }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.inner.kind {
            ErrorKind::Adhoc(ref msg) => write!(f, "{msg}")?,
            ErrorKind::Range { what, given, min, max } => {
                write!(
                    f,
                    "parameter '{what}' with value {given} is not \
                     in the required range of {min}..={max}",
                )?;
            }
            ErrorKind::Io { ref path, ref err } => {
                write!(f, "{path}: {err}")?;
            }
            ErrorKind::TimeZoneLookup(ref name) => {
                write!(f, "failed to find time zone '{name}'")?;
            }
        }
        if let Some(ref cause) = self.inner.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or
/// `Result<T, Error>` without sprinkling `map_err` at every call site.
/// The trick is borrowed from `anyhow`.
pub(crate) trait ErrorContext<T> {
    /// Contextualize with the given consequent error, keeping `self` (when
    /// it is an error) as the cause.
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but builds the consequent error lazily so the happy
    /// path doesn't pay for its construction.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T> ErrorContext<T> for Result<T, Error> {
    #[inline]
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| err.context_impl(consequent.into_error()))
    }

    #[inline]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| err.context_impl(consequent().into_error()))
    }
}

/// Conversion into `Error` for the `context` APIs. Implemented for `Error`
/// itself and for static strings, which cover every call site in the crate.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for &'static str {
    fn into_error(self) -> Error {
        Error::from_kind(ErrorKind::Adhoc(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_chain() {
        let err = err!("invalid format string");
        let err = Err::<(), Error>(err)
            .context("%Y failed")
            .unwrap_err();
        assert_eq!(err.to_string(), "%Y failed: invalid format string");
    }

    #[test]
    fn range_message() {
        let err = Error::range("day", 32, 1, 31);
        assert_eq!(
            err.to_string(),
            "parameter 'day' with value 32 is not in the \
             required range of 1..=31",
        );
    }
}
