// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! A C ABI over [`Source`].
//!
//! Every function reports its outcome as one of the `CRYPTORAND_*` result
//! codes. Sources cross the boundary as opaque heap pointers:
//!
//! ```c
//! cryptorand* rng;
//! unsigned char key[32];
//! if (cryptorand_init(&rng) == CRYPTORAND_SUCCESS) {
//!     cryptorand_generate(rng, key, sizeof(key));
//!     cryptorand_uninit(&rng);
//! }
//! ```

#![allow(unsafe_code)]

use core::ptr;
use core::slice;
use std::os::raw::c_int;

use zeroize::Zeroize as _;

use crate::rng::Error;
use crate::Source;

/// The operation succeeded.
pub const CRYPTORAND_SUCCESS: c_int = 0;
/// See [`Error::Unspecified`].
pub const CRYPTORAND_ERROR: c_int = -1;
/// See [`Error::InvalidArgs`].
pub const CRYPTORAND_INVALID_ARGS: c_int = -2;
/// See [`Error::InvalidOperation`].
pub const CRYPTORAND_INVALID_OPERATION: c_int = -3;
/// See [`Error::TooLarge`].
pub const CRYPTORAND_TOO_BIG: c_int = -11;
/// See [`Error::NotImplemented`].
pub const CRYPTORAND_NOT_IMPLEMENTED: c_int = -29;

impl Error {
    /// Returns the C result code for this error.
    pub fn code(self) -> c_int {
        match self {
            Self::Unspecified => CRYPTORAND_ERROR,
            Self::InvalidArgs => CRYPTORAND_INVALID_ARGS,
            Self::InvalidOperation => CRYPTORAND_INVALID_OPERATION,
            Self::TooLarge => CRYPTORAND_TOO_BIG,
            Self::NotImplemented => CRYPTORAND_NOT_IMPLEMENTED,
        }
    }
}

fn status(result: crate::Result<(), Error>) -> c_int {
    match result {
        Ok(()) => CRYPTORAND_SUCCESS,
        Err(e) => e.into_inner().code(),
    }
}

/// Creates and initializes a source, storing it in `*out`.
///
/// On failure `*out` is set to null.
///
/// # Safety
///
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn cryptorand_init(out: *mut *mut Source) -> c_int {
    if out.is_null() {
        return status(fail!(Error::InvalidArgs));
    }
    *out = ptr::null_mut();

    match Source::open() {
        Ok(source) => {
            *out = Box::into_raw(Box::new(source));
            CRYPTORAND_SUCCESS
        }
        Err(e) => e.into_inner().code(),
    }
}

/// Fills `len` bytes at `buf` with random bytes from `rng`.
///
/// If this function fails, all `len` bytes at `buf` are set to zero.
///
/// # Safety
///
/// `rng` must be null or a pointer produced by [`cryptorand_init()`] that has
/// not been released. `buf` must be null or valid for writes of `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn cryptorand_generate(
    rng: *mut Source,
    buf: *mut u8,
    len: usize,
) -> c_int {
    if buf.is_null() {
        return status(fail!(Error::InvalidArgs));
    }
    let buf = slice::from_raw_parts_mut(buf, len);

    match rng.as_mut() {
        Some(rng) => status(rng.generate(buf)),
        None => {
            buf.zeroize();
            status(fail!(Error::InvalidArgs))
        }
    }
}

/// Releases the source at `*rng` and sets `*rng` to null.
///
/// Both `rng` and `*rng` may be null, so calling this function again on the
/// same location is harmless.
///
/// # Safety
///
/// `rng` must be null or valid for reads and writes, and `*rng` must be null
/// or a pointer produced by [`cryptorand_init()`].
#[no_mangle]
pub unsafe extern "C" fn cryptorand_uninit(rng: *mut *mut Source) {
    let rng = match rng.as_mut() {
        Some(rng) => rng,
        None => return,
    };
    if !rng.is_null() {
        drop(Box::from_raw(*rng));
    }
    *rng = ptr::null_mut();
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn null_arguments() {
        unsafe {
            assert_eq!(
                cryptorand_init(ptr::null_mut()),
                CRYPTORAND_INVALID_ARGS
            );

            let mut buf = [0xa5; 16];
            assert_eq!(
                cryptorand_generate(
                    ptr::null_mut(),
                    buf.as_mut_ptr(),
                    buf.len()
                ),
                CRYPTORAND_INVALID_ARGS
            );
            assert_eq!(buf, [0; 16]);

            assert_eq!(
                cryptorand_generate(ptr::null_mut(), ptr::null_mut(), 16),
                CRYPTORAND_INVALID_ARGS
            );

            cryptorand_uninit(ptr::null_mut());
        }
    }

    #[test]
    fn codes() {
        assert_eq!(Error::Unspecified.code(), -1);
        assert_eq!(Error::InvalidArgs.code(), -2);
        assert_eq!(Error::InvalidOperation.code(), -3);
        assert_eq!(Error::TooLarge.code(), -11);
        assert_eq!(Error::NotImplemented.code(), -29);
    }

    #[cfg(unix)]
    #[test]
    fn lifecycle() {
        unsafe {
            let mut rng = ptr::null_mut();
            assert_eq!(cryptorand_init(&mut rng), CRYPTORAND_SUCCESS);
            assert!(!rng.is_null());

            let mut buf = [0; 64];
            assert_eq!(
                cryptorand_generate(rng, buf.as_mut_ptr(), buf.len()),
                CRYPTORAND_SUCCESS
            );
            assert_eq!(
                cryptorand_generate(rng, ptr::null_mut(), 0),
                CRYPTORAND_INVALID_ARGS
            );

            cryptorand_uninit(&mut rng);
            assert!(rng.is_null());
            cryptorand_uninit(&mut rng);
            assert!(rng.is_null());
        }
    }
}
