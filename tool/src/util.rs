// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! I/O and logging utilities.

use std::fmt::Write as _;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

/// Like `?`, but crashes the binary with a nice error message.
macro_rules! check {
    ($result:expr, $fmt:literal $(, $args:expr)* $(,)?) => {
        match $result {
            Ok(x) => x,
            Err(e) => {
                eprintln!("error: {}: {}", format_args!($fmt, $($args,)*), e);
                std::process::exit(2)
            }
        }
    }
}

/// Opens the given output file, or stdout if there isn't one.
pub fn output(output_file: Option<impl AsRef<Path>>) -> Box<dyn Write> {
    match output_file {
        Some(path) => {
            let path = path.as_ref();
            let file = check!(
                File::create(path),
                "failed to open {}",
                path.display()
            );
            Box::new(file)
        }
        None => Box::new(io::stdout()),
    }
}

/// Installs a stderr logger.
///
/// `RUST_LOG` is honored; `verbose` additionally turns on every message.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Trace);
    }
    builder.init();
}

/// Formats `bytes` as lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hex_digits() {
        assert_eq!(hex(&[]), "");
        assert_eq!(hex(&[0x00, 0x0f, 0xa5, 0xff]), "000fa5ff");
    }
}
