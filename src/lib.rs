// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `cryptorand` provides cryptographically secure random bytes sourced from
//! the operating system, behind a single interface that does not care which
//! OS facility is doing the work.
//!
//! The entry point is [`Source`]. A source starts out uninitialized;
//! [`Source::init()`] probes the host for the best available facility and
//! keeps a handle to it, [`Source::generate()`] relays bytes from that
//! facility into a caller buffer, and [`Source::release()`] gives the handle
//! back.
//!
//! ```no_run
//! # fn main() -> Result<(), cryptorand::Error<cryptorand::rng::Error>> {
//! let mut rng = cryptorand::Source::open()?;
//! let mut nonce = [0; 32];
//! rng.generate(&mut nonce)?;
//! # Ok(())
//! # }
//! ```
//!
//! `cryptorand` never synthesizes entropy of its own. Facilities are probed in
//! a fixed order (see the [`backend` module]):
//! - On Windows, `BCryptGenRandom()` is tried first, with `CryptGenRandom()`
//!   as a fallback. Both are discovered at runtime, so nothing extra needs to
//!   be linked.
//! - On Unix hosts, `/dev/urandom` is read.
//! - Anywhere else, initialization fails with
//!   [`rng::Error::NotImplemented`].
//!
//! Whenever generation fails, the output buffer is overwritten with zeroes, so
//! a caller that ignores the result never mistakes stale memory for random
//! data.
//!
//! [`backend` module]: backend/index.html

#![deny(missing_docs)]
#![deny(unsafe_code)]

#[cfg(feature = "log")]
extern crate log as __raw_log;

#[macro_use]
mod debug;
pub use debug::Error;

/// A [`core::result::Result`] whose error is wrapped in [`Error`].
pub type Result<T, E> = core::result::Result<T, Error<E>>;

pub mod backend;
#[cfg(any(unix, windows))]
pub mod capability;
pub mod csrng;
pub mod ffi;
pub mod rng;
mod wipe;

pub use rng::Source;
