// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The secure random source.
//!
//! A [`Source`] owns at most one live handle to an OS random-generation
//! facility. It is always in exactly one of three states: uninitialized,
//! or holding a handle to one of the facilities named by [`Kind`].
//!
//! `Source` performs no internal locking. Every operation takes `&mut self`,
//! so sharing one source between threads requires the caller to provide
//! mutual exclusion; distinct sources own disjoint OS resources and may be
//! used concurrently.

use core::fmt;

use crate::backend;
use crate::backend::Backend;
use crate::backend::Kind;
use crate::backend::Os;
use crate::backend::Platform;
use crate::wipe::Wipe;

#[cfg(any(unix, windows))]
use crate::capability;

/// An error returned by a [`Source`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates an unspecified error in the OS facility: a backend could not
    /// be loaded, opened, or read from.
    Unspecified,
    /// Indicates a null destination was passed across the C ABI.
    InvalidArgs,
    /// Indicates an operation on a source that is not initialized.
    InvalidOperation,
    /// Indicates a request larger than the active backend can serve in a
    /// single call.
    TooLarge,
    /// Indicates that the host has no recognized secure random facility.
    NotImplemented,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            Self::Unspecified => "secure random facility failed",
            Self::InvalidArgs => "invalid arguments",
            Self::InvalidOperation => "source is not initialized",
            Self::TooLarge => "request too large for a single call",
            Self::NotImplemented => {
                "no secure random facility on this platform"
            }
        };
        f.write_str(msg)
    }
}

#[cfg(any(unix, windows))]
impl From<capability::Error> for Error {
    fn from(_: capability::Error) -> Self {
        Self::Unspecified
    }
}

#[cfg(any(unix, windows))]
debug_from!(Error => capability::Error);

/// A source of cryptographically secure random bytes, backed by the OS.
///
/// The type parameter selects where handles come from; outside of tests it
/// is always [`Os`].
pub struct Source<P: Platform = Os> {
    platform: P,
    backend: Backend<P>,
}

impl Source<Os> {
    /// Creates a new, uninitialized source for the host OS.
    pub fn new() -> Self {
        Self::with_platform(Os)
    }

    /// Creates a source for the host OS and initializes it.
    pub fn open() -> crate::Result<Self, Error> {
        let mut source = Self::new();
        source.init()?;
        Ok(source)
    }
}

impl Default for Source<Os> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Platform> Source<P> {
    /// Creates a new, uninitialized source that acquires handles from
    /// `platform`.
    pub fn with_platform(platform: P) -> Self {
        Self {
            platform,
            backend: Backend::Uninitialized,
        }
    }

    /// Initializes this source.
    ///
    /// Any handle this source already holds is released first. The platform's
    /// backends are then probed in priority order, and the first one that can
    /// be acquired becomes active. This call may block while the OS sets up
    /// the facility.
    ///
    /// On failure the source is left uninitialized; the error is
    /// [`Error::NotImplemented`] if the platform offers no facility at all and
    /// [`Error::Unspecified`] if every facility it offers failed.
    pub fn init(&mut self) -> crate::Result<(), Error> {
        self.release();
        self.backend = backend::probe(&self.platform)?;
        Ok(())
    }

    /// Fills `buf` with random bytes from the active backend.
    ///
    /// The whole buffer is filled by a single request; requests larger than
    /// the backend's per-call limit fail with [`Error::TooLarge`] rather than
    /// being split up. An empty buffer is a valid request.
    ///
    /// If this function returns an error, every byte of `buf` has been set to
    /// zero.
    pub fn generate(&mut self, buf: &mut [u8]) -> crate::Result<(), Error> {
        let mut out = Wipe::new(buf);
        let handle = match self.backend.as_handle_mut() {
            Some(handle) => handle,
            None => return fail!(Error::InvalidOperation),
        };

        check!(out.len() <= handle.max_request(), Error::TooLarge);
        handle.fill(&mut out)?;

        out.commit();
        Ok(())
    }

    /// Releases the active backend, if any, leaving this source
    /// uninitialized.
    ///
    /// This function may be called on a source in any state, any number of
    /// times.
    pub fn release(&mut self) {
        if let Some(kind) = self.backend.kind() {
            trace!("releasing {} backend", kind);
        }
        self.backend = Backend::Uninitialized;
    }

    /// Returns which backend is active, or `None` if this source is not
    /// initialized.
    pub fn backend(&self) -> Option<Kind> {
        self.backend.kind()
    }

    /// Returns whether this source holds a live backend handle.
    pub fn is_initialized(&self) -> bool {
        self.backend.kind().is_some()
    }
}

impl<P: Platform> Drop for Source<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: Platform> fmt::Debug for Source<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Source")
            .field("backend", &self.backend.kind())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::backend::fake;
    use crate::backend::fake::Behavior;
    use crate::backend::fake::Event;
    use pretty_assertions::assert_eq;

    const SENTINEL: u8 = 0xa5;

    fn source(platform: fake::Platform) -> Source<fake::Platform> {
        let mut source = Source::with_platform(platform);
        source.init().unwrap();
        source
    }

    fn assert_zeroed(buf: &[u8]) {
        assert!(buf.iter().all(|&b| b == 0), "buffer not zeroed: {:?}", buf);
    }

    #[test]
    fn first_working_backend_wins() {
        let platform =
            fake::Platform::new(&[Kind::Modern, Kind::Legacy, Kind::Device]);
        let events = platform.events();
        let source = source(platform);

        assert_eq!(source.backend(), Some(Kind::Modern));
        assert_eq!(events.take(), vec![Event::Opened(Kind::Modern)]);
    }

    #[test]
    fn falls_back_in_order() {
        let platform =
            fake::Platform::new(&[Kind::Modern, Kind::Legacy, Kind::Device])
                .with_broken(Kind::Modern);
        let events = platform.events();
        let source = source(platform);

        assert_eq!(source.backend(), Some(Kind::Legacy));
        assert_eq!(
            events.take(),
            vec![Event::Refused(Kind::Modern), Event::Opened(Kind::Legacy)]
        );
    }

    #[test]
    fn exhausted_backends_leave_source_empty() {
        let platform = fake::Platform::new(&[Kind::Modern, Kind::Legacy])
            .with_broken(Kind::Modern)
            .with_broken(Kind::Legacy);
        let mut source = Source::with_platform(platform);

        let err = source.init().unwrap_err();
        assert_eq!(err.into_inner(), Error::Unspecified);
        assert!(!source.is_initialized());
        assert!(matches!(source.backend, Backend::Uninitialized));
    }

    #[test]
    fn no_facility_is_not_implemented() {
        let mut source = Source::with_platform(fake::Platform::new(&[]));

        let err = source.init().unwrap_err();
        assert_eq!(err.into_inner(), Error::NotImplemented);
        assert!(matches!(source.backend, Backend::Uninitialized));
    }

    #[test]
    fn reinit_releases_previous_handle() {
        let platform = fake::Platform::new(&[Kind::Device]);
        let events = platform.events();
        let mut source = source(platform);
        source.init().unwrap();

        assert_eq!(events.live(), 1);
        assert_eq!(
            events.take(),
            vec![
                Event::Opened(Kind::Device),
                Event::Closed(Kind::Device),
                Event::Opened(Kind::Device),
            ]
        );
    }

    #[test]
    fn generate_fills_exactly_the_request() {
        let mut source = source(fake::Platform::new(&[Kind::Device]));

        for &len in &[0, 1, 31, 64, 200] {
            let mut buf = [SENTINEL; 256];
            source.generate(&mut buf[..len]).unwrap();
            assert!(buf[..len].iter().all(|&b| b == fake::FILL));
            assert!(buf[len..].iter().all(|&b| b == SENTINEL));
        }
    }

    #[test]
    fn uninitialized_generate_is_invalid_and_zeroes() {
        let mut source = Source::with_platform(fake::Platform::new(&[]));
        let mut buf = [SENTINEL; 64];

        let err = source.generate(&mut buf).unwrap_err();
        assert_eq!(err.into_inner(), Error::InvalidOperation);
        assert_zeroed(&buf);
    }

    #[test]
    fn oversized_request_is_too_large_and_zeroes() {
        let mut source = source(
            fake::Platform::new(&[Kind::Modern]).with_max_request(16),
        );

        let mut buf = [SENTINEL; 16];
        source.generate(&mut buf).unwrap();

        let mut buf = [SENTINEL; 17];
        let err = source.generate(&mut buf).unwrap_err();
        assert_eq!(err.into_inner(), Error::TooLarge);
        assert_zeroed(&buf);
    }

    #[test]
    fn backend_failure_zeroes() {
        let mut source = source(
            fake::Platform::new(&[Kind::Device]).with_behavior(Behavior::Fail),
        );
        let mut buf = [SENTINEL; 48];

        let err = source.generate(&mut buf).unwrap_err();
        assert_eq!(err.into_inner(), Error::Unspecified);
        assert_zeroed(&buf);
        // A failed generate does not tear down the backend.
        assert_eq!(source.backend(), Some(Kind::Device));
    }

    #[test]
    fn short_fill_is_an_error_and_zeroes() {
        let mut source = source(
            fake::Platform::new(&[Kind::Device])
                .with_behavior(Behavior::Short(10)),
        );
        let mut buf = [SENTINEL; 48];

        let err = source.generate(&mut buf).unwrap_err();
        assert_eq!(err.into_inner(), Error::Unspecified);
        assert_zeroed(&buf);
    }

    #[test]
    fn release_is_idempotent() {
        let platform = fake::Platform::new(&[Kind::Legacy]);
        let events = platform.events();
        let mut source = source(platform);

        source.release();
        source.release();
        assert!(matches!(source.backend, Backend::Uninitialized));
        assert_eq!(
            events.take(),
            vec![Event::Opened(Kind::Legacy), Event::Closed(Kind::Legacy)]
        );
    }

    #[test]
    fn release_after_failed_init() {
        let mut source = Source::with_platform(
            fake::Platform::new(&[Kind::Modern]).with_broken(Kind::Modern),
        );
        assert!(source.init().is_err());

        source.release();
        assert!(!source.is_initialized());
    }

    #[test]
    fn release_then_generate() {
        let mut source = source(fake::Platform::new(&[Kind::Modern]));
        let mut buf = [SENTINEL; 64];
        source.generate(&mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == fake::FILL));

        source.release();
        let mut buf = [SENTINEL; 64];
        let err = source.generate(&mut buf).unwrap_err();
        assert_eq!(err.into_inner(), Error::InvalidOperation);
        assert_zeroed(&buf);
    }

    #[test]
    fn drop_closes_backend() {
        let platform = fake::Platform::new(&[Kind::Device]);
        let events = platform.events();
        drop(source(platform));

        assert_eq!(events.live(), 0);
        assert_eq!(
            events.take(),
            vec![Event::Opened(Kind::Device), Event::Closed(Kind::Device)]
        );
    }

    #[test]
    fn os_source_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Source<Os>>();
    }

    #[cfg(unix)]
    mod os {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn init_generate_release() {
            let mut source = Source::open().unwrap();
            assert_eq!(source.backend(), Some(Kind::Device));

            let mut buf = [0; 64];
            source.generate(&mut buf).unwrap();

            source.release();
            let mut buf = [SENTINEL; 64];
            let err = source.generate(&mut buf).unwrap_err();
            assert_eq!(err.into_inner(), Error::InvalidOperation);
            assert_zeroed(&buf);
        }

        #[test]
        fn consecutive_outputs_differ() {
            let mut source = Source::open().unwrap();
            let mut a = [0; 32];
            let mut b = [0; 32];
            source.generate(&mut a).unwrap();
            source.generate(&mut b).unwrap();
            assert_ne!(a, b);
        }

        #[test]
        fn distinct_sources_on_distinct_threads() {
            let threads = (0..4)
                .map(|_| {
                    std::thread::spawn(|| {
                        let mut source = Source::open().unwrap();
                        let mut buf = [0; 32];
                        source.generate(&mut buf).unwrap();
                        buf
                    })
                })
                .collect::<Vec<_>>();

            let outputs = threads
                .into_iter()
                .map(|t| t.join().unwrap())
                .collect::<Vec<_>>();
            for (i, a) in outputs.iter().enumerate() {
                for b in &outputs[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
