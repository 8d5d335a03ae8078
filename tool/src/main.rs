// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! `cryptorand-tool` is a simple command-line tool for pulling random bytes
//! out of the operating system through `cryptorand`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

use structopt::StructOpt as _;

#[macro_use]
mod util;

mod generate;
mod probe;

/// A command-line tool for OS-backed secure random bytes.
#[allow(missing_docs)]
#[derive(structopt::StructOpt)]
#[structopt(author)]
enum CliCommand {
    /// Generates random bytes.
    #[structopt(name = "generate", alias = "gen")]
    Generate(generate::Generate),
    /// Reports which OS facility would serve random bytes.
    #[structopt(name = "probe")]
    Probe(probe::Probe),
}

fn main() {
    match CliCommand::from_args() {
        CliCommand::Generate(g) => g.run(),
        CliCommand::Probe(p) => p.run(),
    }
}
