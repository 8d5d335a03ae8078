// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Error plumbing and debug logging.
//!
//! Logging is still present when the `log` feature is disabled, but every
//! statement is redacted: the macros below expand to a closure that is never
//! called, so the arguments count as used but not even the format strings
//! reach the final binary.
//!
//! Code in this crate *should not* call into the [`log`] crate directly;
//! use the macros defined here instead.

use core::fmt;

#[cfg(doc)]
use __raw_log as log;

/// A wrapped `cryptorand` error.
///
/// This type should always be referred to as `cryptorand::Error`. It wraps
/// one of the per-module error enums, such as [`rng::Error`], and can only be
/// produced by this crate.
///
/// [`rng::Error`]: crate::rng::Error
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Error<E> {
    inner: E,
}

impl<E> Error<E> {
    /// Creates a new `Error`. This function is an implementation detail,
    /// and should not be called by users.
    #[doc(hidden)]
    pub fn __new(inner: E) -> Self {
        Self { inner }
    }

    /// Converts the wrapped error by way of an [`Into`] conversion.
    pub fn cast<F: From<E>>(self) -> Error<F> {
        Error {
            inner: self.inner.into(),
        }
    }

    /// Gets the wrapped error.
    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E> AsRef<E> for Error<E> {
    fn as_ref(&self) -> &E {
        &self.inner
    }
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cryptorand: {}", self.inner)
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for Error<E> {}

/// Generates `From` implementations between wrapped errors.
///
/// A blanket `impl<E1, E2: From<E1>> From<Error<E1>> for Error<E2>` would
/// overlap with the standard library's `impl<T> From<T> for T`, so every
/// pair of error types that converts gets its impl from this macro instead.
macro_rules! debug_from {
    ($e:ty => $($f:ty),+ $(,)?) => {$(
        impl From<$crate::Error<$f>> for $crate::Error<$e> {
            fn from(e: $crate::Error<$f>) -> Self {
                e.cast()
            }
        }
    )*};
}

/// Checks a condition, logging if it fails.
///
/// If the condition does not hold, constructs the given error, logs it, and
/// returns out of the current function with it.
macro_rules! check {
    ($cond:expr, $error:expr) => {
        if !$cond {
            let error = $error;
            fail!(
                error,
                "check failure: `{}`; returned {:?}",
                stringify!($cond),
                error,
            )?;
        }
    };
}

/// Logs a newly-created error value and returns it as an `Err`.
///
/// This macro is the only way errors should be generated in this crate.
/// Instead of writing `foo.ok_or(MyError)`, write
/// `foo.ok_or_else(|| fail!(MyError))`, or use `or_else` to replace an
/// existing error.
macro_rules! fail {
    ($error:expr, $($format:tt)+) => {{
        error!($($format)+);
        Err($crate::debug::Error::__new($error))
    }};
    ($error:expr) => {{
        let error = $error;
        error!("generated error: `{:?}`", error);
        Err($crate::debug::Error::__new(error))
    }};
}

/// Redactable version of [`log::trace!()`].
macro_rules! trace {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::trace!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = || {
            let _ = format_args!($($args)*);
        };
    }
}

/// Redactable version of [`log::info!()`].
macro_rules! info {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::info!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = || {
            let _ = format_args!($($args)*);
        };
    }
}

/// Redactable version of [`log::warn!()`].
macro_rules! warn {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::warn!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = || {
            let _ = format_args!($($args)*);
        };
    }
}

/// Redactable version of [`log::error!()`].
macro_rules! error {
    ($($args:tt)*) => {
        #[cfg(feature = "log")]
        let _ = __raw_log::error!($($args)*);
        #[cfg(not(feature = "log"))]
        let _ = || {
            let _ = format_args!($($args)*);
        };
    }
}

/// Installs a logger for the test binary before `main()` runs, since the
/// harness's `main()` cannot be overridden.
#[cfg(test)]
#[allow(unsafe_code)]
mod test_logger {
    #[ctor::ctor]
    fn init() {
        env_logger::builder()
            .format(move |_, record| {
                let thread = std::thread::current();
                let name = thread.name().unwrap_or("<unknown>");
                for line in record.args().to_string().trim().lines() {
                    // NOTE: printing to stderr lets the test harness swallow
                    // output from passing tests.
                    eprintln!(
                        "[{level}({thread}) {file}:{line}] {msg}",
                        level = record.level(),
                        thread = name,
                        file = record.file().unwrap_or("<unknown>"),
                        line = record.line().unwrap_or(0),
                        msg = line,
                    )
                }
                Ok(())
            })
            .init();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    #[deny(unused_variables)]
    fn redacted_macros_use_their_arguments() {
        let kind = "device";
        let status = 0xc000_000du32;
        trace!("probing {}", kind);
        info!("selected {}", kind);
        warn!("{} failed: {:#010x}", kind, status);
        error!("{}", kind);

        let code = 7u8;
        let e: Result<(), Error<u8>> = fail!(code, "failed: {}", kind);
        assert_eq!(e.unwrap_err().into_inner(), 7);
    }
}
