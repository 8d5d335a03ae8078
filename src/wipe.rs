// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Scoped zeroing of output buffers.

use core::ops::Deref;
use core::ops::DerefMut;

use zeroize::Zeroize as _;

/// A guard over an output buffer that zeroes it when dropped, unless
/// [`Wipe::commit()`] was called first.
///
/// Every path out of a generation call, including `?` and unwinding,
/// drops the guard; only the success path commits.
pub struct Wipe<'a> {
    buf: &'a mut [u8],
    armed: bool,
}

impl<'a> Wipe<'a> {
    /// Arms a guard over `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, armed: true }
    }

    /// Disarms the guard, leaving the buffer's contents in place.
    pub fn commit(mut self) {
        self.armed = false;
    }
}

impl Deref for Wipe<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.buf
    }
}

impl DerefMut for Wipe<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf
    }
}

impl Drop for Wipe<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.buf.zeroize();
        }
    }
}
