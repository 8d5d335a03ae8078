// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! OS random-generation backends.
//!
//! A *backend* is one concrete OS facility that can produce secure random
//! bytes. This module defines the [`Handle`] trait that every acquired
//! facility implements, the [`Platform`] trait that knows how to acquire
//! them, and [`probe()`], which walks a platform's facilities in priority
//! order until one can be acquired.
//!
//! Three tiers of facility exist:
//! - [`Kind::Modern`]: a modern crypto service, such as
//!   `BCryptGenRandom()`.
//! - [`Kind::Legacy`]: an older crypto service, such as `CryptGenRandom()`.
//! - [`Kind::Device`]: an entropy device, such as `/dev/urandom`.
//!
//! All `#[cfg]` selection of facilities lives in [`Os`]; nothing else in the
//! crate needs to know which platform it is running on.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::rng::Error;

#[cfg(windows)]
pub mod advapi;
#[cfg(windows)]
pub mod bcrypt;
#[cfg(unix)]
pub mod urandom;

mod os;
pub use os::Os;

/// A tier of OS random-generation facility.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Kind {
    /// The platform's modern crypto service.
    Modern,
    /// The platform's legacy crypto service.
    Legacy,
    /// The platform's entropy device.
    Device,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Modern => "modern",
            Self::Legacy => "legacy",
            Self::Device => "device",
        };
        f.write_str(name)
    }
}

/// A live handle to an OS random-generation facility.
///
/// Dropping a handle releases it. Handles made of several parts, such as a
/// loaded library and a context opened from it, release them in reverse
/// order of acquisition.
pub trait Handle {
    /// Returns the largest number of bytes this handle can produce in one
    /// call.
    fn max_request(&self) -> usize;

    /// Fills all of `buf` with random bytes.
    ///
    /// Producing fewer bytes than requested is an error. Callers guarantee
    /// that `buf.len() <= self.max_request()`.
    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error>;
}
impl dyn Handle {} // Ensure object-safe.

/// A source of backend handles.
///
/// A platform names the facilities it offers, in priority order, and knows
/// how to acquire each of them. Acquisition failures are expected: they
/// cause [`probe()`] to move on to the next facility.
pub trait Platform {
    /// The handle type for [`Kind::Modern`].
    type Modern: Handle;
    /// The handle type for [`Kind::Legacy`].
    type Legacy: Handle;
    /// The handle type for [`Kind::Device`].
    type Device: Handle;

    /// Returns the facilities this platform offers, best first.
    ///
    /// An empty list means the platform has no recognized facility.
    fn probe_order(&self) -> &[Kind];

    /// Acquires the modern crypto service.
    fn open_modern(&self) -> crate::Result<Self::Modern, Error>;

    /// Acquires the legacy crypto service.
    fn open_legacy(&self) -> crate::Result<Self::Legacy, Error>;

    /// Acquires the entropy device.
    fn open_device(&self) -> crate::Result<Self::Device, Error>;
}

/// The handle type for a facility a platform does not offer.
///
/// This type has no values.
pub enum Unsupported {}

impl Handle for Unsupported {
    fn max_request(&self) -> usize {
        match *self {}
    }

    fn fill(&mut self, _: &mut [u8]) -> crate::Result<(), Error> {
        match *self {}
    }
}

/// The active backend of a [`Source`](crate::Source), if any.
pub enum Backend<P: Platform> {
    /// No backend is active.
    Uninitialized,
    /// The modern crypto service is active.
    Modern(P::Modern),
    /// The legacy crypto service is active.
    Legacy(P::Legacy),
    /// The entropy device is active.
    Device(P::Device),
}

impl<P: Platform> Backend<P> {
    /// Returns which backend this is, or `None` if uninitialized.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Uninitialized => None,
            Self::Modern(_) => Some(Kind::Modern),
            Self::Legacy(_) => Some(Kind::Legacy),
            Self::Device(_) => Some(Kind::Device),
        }
    }

    /// Returns the live handle, or `None` if uninitialized.
    pub fn as_handle_mut(&mut self) -> Option<&mut dyn Handle> {
        match self {
            Self::Uninitialized => None,
            Self::Modern(h) => Some(h),
            Self::Legacy(h) => Some(h),
            Self::Device(h) => Some(h),
        }
    }
}

/// Acquires the best backend `platform` has to offer.
///
/// Facilities are tried in [`Platform::probe_order()`]; a failure to acquire
/// one is logged and the next is tried. Only if every facility fails is an
/// error returned.
pub fn probe<P: Platform>(platform: &P) -> crate::Result<Backend<P>, Error> {
    let order = platform.probe_order();
    if order.is_empty() {
        return fail!(
            Error::NotImplemented,
            "no secure random facility is known for this platform"
        );
    }

    for &kind in order {
        trace!("probing {} backend", kind);
        let attempt = match kind {
            Kind::Modern => platform.open_modern().map(Backend::Modern),
            Kind::Legacy => platform.open_legacy().map(Backend::Legacy),
            Kind::Device => platform.open_device().map(Backend::Device),
        };

        match attempt {
            Ok(backend) => {
                info!("using {} backend", kind);
                return Ok(backend);
            }
            Err(e) => {
                warn!("{} backend unavailable: {}", kind, e.into_inner());
            }
        }
    }

    fail!(
        Error::Unspecified,
        "every secure random facility failed to initialize"
    )
}
