// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Cryptographic random numbers, as a pluggable trait.

use crate::backend::Platform;
use crate::rng::Error;
use crate::Source;

/// A cryptographically-secure random number generator.
///
/// The sole purpose of this trait is to fill buffers with random bytes,
/// specifically for nonces, tokens, or key material. Code that only needs
/// random bytes should take a `&mut dyn Csrng` rather than a concrete
/// [`Source`], so that it can be handed a different generator in tests.
///
/// Implementations must leave `buf` zeroed when they return an error.
pub trait Csrng {
    /// Fills `buf` with random bytes.
    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error>;
}
impl dyn Csrng {} // Ensure object-safe.

impl<P: Platform> Csrng for Source<P> {
    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error> {
        self.generate(buf)
    }
}
