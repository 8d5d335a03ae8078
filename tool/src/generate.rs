// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The `generate` command.

use std::io::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use cryptorand::backend::Kind;
use cryptorand::Source;

use crate::util;

/// How to write generated bytes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Format {
    /// Lowercase hex, followed by a newline.
    Hex,
    /// The bytes themselves.
    Raw,
    /// A JSON object naming the backend and carrying the bytes as hex.
    Json,
}

impl FromStr for Format {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "hex" => Ok(Self::Hex),
            "raw" | "bin" => Ok(Self::Raw),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown format `{}`", s)),
        }
    }
}

/// Generates random bytes from the OS and writes them out.
#[derive(structopt::StructOpt)]
pub struct Generate {
    /// The number of bytes to generate.
    #[structopt(short = "n", long, default_value = "64")]
    bytes: usize,

    /// Output format: `hex`, `raw`, or `json`.
    #[structopt(short = "f", long, default_value = "hex")]
    format: Format,

    /// Whether to pretty-print JSON output.
    #[structopt(long)]
    pretty: bool,

    /// Output file; defaults to stdout.
    #[structopt(short = "o", long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Log backend selection to stderr.
    #[structopt(short = "v", long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    backend: Option<Kind>,
    len: usize,
    hex: &'a str,
}

impl Generate {
    pub fn run(self) {
        util::init_logging(self.verbose);

        let mut rng = check!(Source::open(), "failed to initialize");
        let mut buf = vec![0; self.bytes];
        check!(
            rng.generate(&mut buf),
            "failed to generate {} bytes",
            self.bytes
        );
        let backend = rng.backend();
        rng.release();

        let mut w = util::output(self.output.as_ref());
        match self.format {
            Format::Raw => check!(w.write_all(&buf), "failed to write output"),
            Format::Hex => {
                check!(
                    writeln!(w, "{}", util::hex(&buf)),
                    "failed to write output"
                )
            }
            Format::Json => {
                let hex = util::hex(&buf);
                let report = Report {
                    backend,
                    len: buf.len(),
                    hex: &hex,
                };
                let r = match self.pretty {
                    true => serde_json::to_writer_pretty(&mut w, &report),
                    false => serde_json::to_writer(&mut w, &report),
                };
                check!(r, "failed to serialize output as JSON");
                check!(writeln!(w), "failed to write output");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_format() {
        assert_eq!("hex".parse::<Format>(), Ok(Format::Hex));
        assert_eq!("raw".parse::<Format>(), Ok(Format::Raw));
        assert_eq!("bin".parse::<Format>(), Ok(Format::Raw));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("base64".parse::<Format>().is_err());
    }
}
