// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The host operating system as a [`Platform`].

use crate::backend::Kind;
use crate::backend::Platform;
use crate::backend::Unsupported;
use crate::rng::Error;

#[cfg(unix)]
use crate::backend::urandom;
#[cfg(windows)]
use crate::backend::{advapi, bcrypt};

/// The facilities of the host operating system.
///
/// - Windows offers `BCryptGenRandom()`, falling back to `CryptGenRandom()`
///   on systems too old to have it.
/// - Unix hosts offer `/dev/urandom`.
/// - Other hosts offer nothing.
#[derive(Copy, Clone, Default, Debug)]
pub struct Os;

#[cfg(windows)]
impl Platform for Os {
    type Modern = bcrypt::Provider;
    type Legacy = advapi::Context;
    type Device = Unsupported;

    fn probe_order(&self) -> &[Kind] {
        &[Kind::Modern, Kind::Legacy]
    }

    fn open_modern(&self) -> crate::Result<bcrypt::Provider, Error> {
        bcrypt::Provider::open()
    }

    fn open_legacy(&self) -> crate::Result<advapi::Context, Error> {
        advapi::Context::acquire()
    }

    fn open_device(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }
}

#[cfg(unix)]
impl Platform for Os {
    type Modern = Unsupported;
    type Legacy = Unsupported;
    type Device = urandom::Device;

    fn probe_order(&self) -> &[Kind] {
        &[Kind::Device]
    }

    fn open_modern(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }

    fn open_legacy(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }

    fn open_device(&self) -> crate::Result<urandom::Device, Error> {
        urandom::Device::open()
    }
}

#[cfg(not(any(windows, unix)))]
impl Platform for Os {
    type Modern = Unsupported;
    type Legacy = Unsupported;
    type Device = Unsupported;

    fn probe_order(&self) -> &[Kind] {
        &[]
    }

    fn open_modern(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }

    fn open_legacy(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }

    fn open_device(&self) -> crate::Result<Unsupported, Error> {
        fail!(Error::NotImplemented)
    }
}
