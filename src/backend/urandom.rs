// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The `/dev/urandom` entropy device.

use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use crate::backend::Handle;
use crate::rng::Error;

/// Where the kernel exposes its CSPRNG.
const PATH: &str = "/dev/urandom";

/// An open entropy device.
pub struct Device {
    file: File,
}

impl Device {
    /// Opens `/dev/urandom` for reading.
    pub fn open() -> crate::Result<Self, Error> {
        Self::open_path(Path::new(PATH))
    }

    pub(crate) fn open_path(path: &Path) -> crate::Result<Self, Error> {
        match File::open(path) {
            Ok(file) => Ok(Self { file }),
            Err(e) => fail!(
                Error::Unspecified,
                "could not open {}: {}",
                path.display(),
                e
            ),
        }
    }
}

impl Handle for Device {
    fn max_request(&self) -> usize {
        usize::MAX
    }

    fn fill(&mut self, buf: &mut [u8]) -> crate::Result<(), Error> {
        // A short read means the device hit EOF; that is an error, never a
        // partial result.
        self.file.read_exact(buf).or_else(|e| {
            fail!(Error::Unspecified, "entropy device read failed: {}", e)
        })
    }
}
