// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `BCryptGenRandom()`, from the Windows CNG API.

#![allow(unsafe_code)]

use core::convert::TryFrom as _;
use core::ffi::c_void;
use core::ptr;

use crate::backend::Handle;
use crate::capability::Capability;
use crate::rng::Error;

const LIBRARY: &str = "bcrypt.dll";

/// `BCRYPT_RNG_ALGORITHM`, as a NUL-terminated UTF-16 string.
const RNG_ALGORITHM: [u16; 4] = [b'R' as u16, b'N' as u16, b'G' as u16, 0];

type OpenAlgorithmProvider = unsafe extern "system" fn(
    algorithm: *mut *mut c_void,
    algorithm_id: *const u16,
    implementation: *const u16,
    flags: u32,
) -> i32;
type CloseAlgorithmProvider =
    unsafe extern "system" fn(algorithm: *mut c_void, flags: u32) -> i32;
type GenRandom = unsafe extern "system" fn(
    algorithm: *mut c_void,
    buf: *mut u8,
    len: u32,
    flags: u32,
) -> i32;

/// An open CNG RNG algorithm provider.
pub struct Provider {
    algorithm: *mut c_void,
    close: CloseAlgorithmProvider,
    gen_random: GenRandom,
    // Dropped after `Drop::drop()` has closed `algorithm`.
    library: Capability,
}

// SAFETY: CNG algorithm handles are not tied to the thread that opened them.
unsafe impl Send for Provider {}

impl Provider {
    /// Loads `bcrypt.dll` and opens its RNG algorithm provider.
    ///
    /// Anything acquired along the way is released again if a later step
    /// fails.
    pub fn open() -> crate::Result<Self, Error> {
        let library = Capability::load(LIBRARY)?;
        // SAFETY: the types above match the prototypes in bcrypt.h, and the
        // pointers are stored next to `library`, which outlives their use.
        let (open, close, gen_random) = unsafe {
            (
                library.resolve::<OpenAlgorithmProvider>(
                    "BCryptOpenAlgorithmProvider",
                )?,
                library.resolve::<CloseAlgorithmProvider>(
                    "BCryptCloseAlgorithmProvider",
                )?,
                library.resolve::<GenRandom>("BCryptGenRandom")?,
            )
        };

        let mut algorithm = ptr::null_mut();
        // SAFETY: `algorithm` is a valid out-pointer and `RNG_ALGORITHM` is
        // NUL-terminated.
        let status = unsafe {
            open(&mut algorithm, RNG_ALGORITHM.as_ptr(), ptr::null(), 0)
        };
        if status != 0 || algorithm.is_null() {
            return fail!(
                Error::Unspecified,
                "BCryptOpenAlgorithmProvider failed: {:#010x}",
                status
            );
        }

        trace!("opened RNG provider from {}", library.name());
        Ok(Self {
            algorithm,
            close,
            gen_random,
            library,
        })
    }
}

impl Handle for Provider {
    fn max_request(&self) -> usize {
        u32::MAX as usize
    }

    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error> {
        let len =
            u32::try_from(buf.len()).or_else(|_| fail!(Error::TooLarge))?;
        // SAFETY: `algorithm` is open, and `buf` is valid for `len` bytes.
        let status = unsafe {
            (self.gen_random)(self.algorithm, buf.as_mut_ptr(), len, 0)
        };
        check!(status == 0, Error::Unspecified);
        Ok(())
    }
}

impl Drop for Provider {
    fn drop(&mut self) {
        // SAFETY: `algorithm` was opened by `open()` and is closed only here.
        let status = unsafe { (self.close)(self.algorithm, 0) };
        if status != 0 {
            warn!(
                "BCryptCloseAlgorithmProvider({}) failed: {:#010x}",
                self.library.name(),
                status
            );
        }
    }
}
