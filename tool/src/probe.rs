// Copyright lowRISC contributors.
// Licensed under the Apache License, Version 2.0, see LICENSE for details.
// SPDX-License-Identifier: Apache-2.0

//! The `probe` command.

use serde::Serialize;

use cryptorand::backend::Kind;
use cryptorand::rng;
use cryptorand::Source;

/// Initializes a source and reports which backend it chose.
#[derive(structopt::StructOpt)]
pub struct Probe {
    /// Print the result as JSON.
    #[structopt(long)]
    json: bool,

    /// Log each probed backend to stderr.
    #[structopt(short = "v", long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report {
    backend: Option<Kind>,
    error: Option<String>,
}

impl Report {
    fn new(result: cryptorand::Result<Source, rng::Error>) -> Self {
        match result {
            Ok(rng) => Report {
                backend: rng.backend(),
                error: None,
            },
            Err(e) => Report {
                backend: None,
                error: Some(e.into_inner().to_string()),
            },
        }
    }

    /// Returns the line to print on success, or the message to fail with.
    fn line(&self) -> Result<String, String> {
        match (self.backend, &self.error) {
            (Some(kind), _) => Ok(kind.to_string()),
            (None, Some(error)) => {
                Err(format!("error: failed to initialize: {}", error))
            }
            (None, None) => Err("error: no backend selected".to_string()),
        }
    }
}

impl Probe {
    pub fn run(self) {
        crate::util::init_logging(self.verbose);

        let report = Report::new(Source::open());
        let line = report.line();

        if self.json {
            let json = check!(
                serde_json::to_string(&report),
                "failed to serialize output as JSON"
            );
            println!("{}", json);
        }

        match line {
            Ok(line) if !self.json => println!("{}", line),
            Ok(_) => {}
            Err(msg) => {
                eprintln!("{}", msg);
                std::process::exit(2);
            }
        }
    }
}
