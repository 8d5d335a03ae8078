// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! Runtime discovery of system capabilities.
//!
//! A *capability* is a system library that is loaded by name at runtime,
//! rather than linked at build time, together with the entry points resolved
//! from it. Both steps are expected to fail on systems that lack the
//! library; callers treat that as a reason to try something else.
//!
//! On Windows, libraries are only ever loaded from the system directory, so
//! a planted DLL next to the executable cannot stand in for the OS.

#![allow(unsafe_code)]

use libloading::Library;

/// An error returned while discovering a capability.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Error {
    /// Indicates the library could not be found or loaded.
    NotFound,
    /// Indicates the library lacks a required entry point.
    MissingEntryPoint,
}

/// A loaded system library.
///
/// The library is unloaded when this value is dropped. Entry points resolved
/// from it must not be called after that.
pub struct Capability {
    name: &'static str,
    library: Library,
}

impl Capability {
    /// Loads the system library called `name`.
    pub fn load(name: &'static str) -> crate::Result<Self, Error> {
        trace!("loading capability {}", name);
        // SAFETY: the libraries loaded through this function are OS
        // components whose initialization routines have no preconditions.
        match unsafe { open(name) } {
            Ok(library) => Ok(Self { name, library }),
            Err(e) => fail!(Error::NotFound, "could not load {}: {}", name, e),
        }
    }

    /// Resolves the entry point `symbol`, returning it as a `T`.
    ///
    /// # Safety
    ///
    /// `T` must be a function pointer type whose signature and ABI match the
    /// entry point's, and the returned value must not be used once `self` is
    /// dropped.
    pub unsafe fn resolve<T: Copy>(
        &self,
        symbol: &str,
    ) -> crate::Result<T, Error> {
        match self.library.get::<T>(symbol.as_bytes()) {
            Ok(entry) => Ok(*entry),
            Err(e) => fail!(
                Error::MissingEntryPoint,
                "{} has no entry point {}: {}",
                self.name,
                symbol,
                e
            ),
        }
    }

    /// Returns the name this capability was loaded by.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for Capability {
    fn drop(&mut self) {
        trace!("unloading capability {}", self.name);
    }
}

/// `ERROR_INVALID_PARAMETER`, which `LoadLibraryExW()` reports for the
/// search flags on systems without KB2533623.
#[cfg(any(windows, test))]
const ERROR_INVALID_PARAMETER: i32 = 87;

#[cfg(windows)]
unsafe fn open(name: &str) -> Result<Library, libloading::Error> {
    use libloading::os::windows;
    match windows::Library::load_with_flags(
        name,
        windows::LOAD_LIBRARY_SEARCH_SYSTEM32,
    ) {
        Ok(library) => Ok(library.into()),
        Err(e) if is_invalid_parameter(&e) => {
            // Everything loaded here is a KnownDLL, which the loader maps
            // from the system directory regardless of search order.
            warn!("{}: no restricted search ({}); retrying", name, e);
            windows::Library::new(name).map(Into::into)
        }
        Err(e) => Err(e),
    }
}

/// Walks `e`'s causes, looking for `ERROR_INVALID_PARAMETER`.
#[cfg(any(windows, test))]
fn is_invalid_parameter(e: &(dyn std::error::Error + 'static)) -> bool {
    let mut cause = Some(e);
    while let Some(e) = cause {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return io.raw_os_error() == Some(ERROR_INVALID_PARAMETER);
        }
        cause = e.source();
    }
    false
}

#[cfg(not(windows))]
unsafe fn open(name: &str) -> Result<Library, libloading::Error> {
    Library::new(name)
}
