/*!
Diagnostic output.

Everything this crate reports — a zone that failed to load, a malformed
POSIX-TZ footer, a fallback to UTC — goes through the macros below. They
forward to the `log` crate when the `logging` cargo feature is enabled
and expand to nothing otherwise, so call sites never carry their own
feature gates. Nothing is emitted unless the application installs a
`log` implementation.
*/

#[cfg(feature = "logging")]
macro_rules! diag {
    ($level:ident, $($args:tt)*) => { log::$level!($($args)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! diag {
    ($level:ident, $($args:tt)*) => {{}};
}

// Only the levels the crate actually emits are defined; add more here
// if a new call site needs them.

macro_rules! warn {
    ($($args:tt)*) => { diag!(warn, $($args)*) };
}

macro_rules! debug {
    ($($args:tt)*) => { diag!(debug, $($args)*) };
}
