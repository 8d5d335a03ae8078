// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `CryptGenRandom()`, from the legacy Windows CryptoAPI.
//!
//! This exists for systems that predate CNG.

#![allow(unsafe_code)]

use core::convert::TryFrom as _;
use core::ptr;

use crate::backend::Handle;
use crate::capability::Capability;
use crate::rng::Error;

const LIBRARY: &str = "advapi32.dll";

const PROV_RSA_FULL: u32 = 1;
/// Do not require a key container on disk.
const CRYPT_VERIFYCONTEXT: u32 = 0xf000_0000;
/// Never prompt the user.
const CRYPT_SILENT: u32 = 0x0000_0040;

/// `HCRYPTPROV`.
type Hprov = usize;

type AcquireContext = unsafe extern "system" fn(
    prov: *mut Hprov,
    container: *const u16,
    provider: *const u16,
    prov_type: u32,
    flags: u32,
) -> i32;
type ReleaseContext = unsafe extern "system" fn(prov: Hprov, flags: u32) -> i32;
type GenRandom =
    unsafe extern "system" fn(prov: Hprov, len: u32, buf: *mut u8) -> i32;

/// An acquired CryptoAPI context.
pub struct Context {
    prov: Hprov,
    release: ReleaseContext,
    gen_random: GenRandom,
    // Dropped after `Drop::drop()` has released `prov`.
    library: Capability,
}

impl Context {
    /// Loads `advapi32.dll` and acquires an ephemeral, silent context.
    ///
    /// Anything acquired along the way is released again if a later step
    /// fails.
    pub fn acquire() -> crate::Result<Self, Error> {
        let library = Capability::load(LIBRARY)?;
        // SAFETY: the types above match the prototypes in wincrypt.h, and the
        // pointers are stored next to `library`, which outlives their use.
        let (acquire, release, gen_random) = unsafe {
            (
                library.resolve::<AcquireContext>("CryptAcquireContextW")?,
                library.resolve::<ReleaseContext>("CryptReleaseContext")?,
                library.resolve::<GenRandom>("CryptGenRandom")?,
            )
        };

        let mut prov = 0;
        // SAFETY: `prov` is a valid out-pointer; null container and provider
        // names select the defaults.
        let ok = unsafe {
            acquire(
                &mut prov,
                ptr::null(),
                ptr::null(),
                PROV_RSA_FULL,
                CRYPT_VERIFYCONTEXT | CRYPT_SILENT,
            )
        };
        if ok == 0 {
            return fail!(Error::Unspecified, "CryptAcquireContextW failed");
        }

        trace!("acquired CryptoAPI context from {}", library.name());
        Ok(Self {
            prov,
            release,
            gen_random,
            library,
        })
    }
}

impl Handle for Context {
    fn max_request(&self) -> usize {
        u32::MAX as usize
    }

    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error> {
        let len =
            u32::try_from(buf.len()).or_else(|_| fail!(Error::TooLarge))?;
        // SAFETY: `prov` is acquired, and `buf` is valid for `len` bytes.
        let ok =
            unsafe { (self.gen_random)(self.prov, len, buf.as_mut_ptr()) };
        check!(ok != 0, Error::Unspecified);
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        // SAFETY: `prov` was acquired by `acquire()` and is released only here.
        let ok = unsafe { (self.release)(self.prov, 0) };
        if ok == 0 {
            warn!("CryptReleaseContext({}) failed", self.library.name());
        }
    }
}
