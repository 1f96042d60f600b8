// Copyright (c) Asymptotic Labs
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;
use colored::Colorize;
use log::{debug, LevelFilter};
use lphy_beast::{driver::execute, Options};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = env!("CARGO_BIN_NAME"),
    about = "Takes an LPhy model specification, and some data, and produces a BEAST 2 XML file.",
    author,
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Args {
    /// File of the LPhy model specification
    #[clap(value_name = "LPhy")]
    pub infile: PathBuf,

    /// BEAST 2 XML output; defaults to `<stem>.xml` next to the input
    #[clap(long = "out", short = 'o')]
    pub outfile: Option<PathBuf>,

    /// Toml file with translation options
    #[clap(long = "config", short = 'c')]
    pub config: Option<PathBuf>,

    /// Number of MCMC steps
    #[clap(long = "chain-length")]
    pub chain_length: Option<u64>,

    /// Logging interval of every logger
    #[clap(long = "log-every")]
    pub log_every: Option<u64>,

    /// Print debug output
    #[clap(long = "verbose", short = 'v')]
    pub verbose: bool,
}

impl Args {
    fn options(&self) -> anyhow::Result<Options> {
        let mut options = match &self.config {
            Some(path) => Options::from_toml_file(path)?,
            None => Options::default(),
        };
        if let Some(chain_length) = self.chain_length {
            options.chain_length = chain_length;
        }
        if let Some(log_every) = self.log_every {
            options.log_every = log_every;
        }
        if self.verbose {
            options.verbosity_level = LevelFilter::Debug;
        }
        Ok(options)
    }
}

fn run(args: Args) -> anyhow::Result<PathBuf> {
    let options = args.options()?;
    let _ = TermLogger::init(
        options.verbosity_level,
        ConfigBuilder::new().set_time_level(LevelFilter::Off).build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
    debug!("lphybeast version: {}", env!("CARGO_PKG_VERSION"));
    execute(&args.infile, args.outfile.as_deref(), options)
}

fn main() {
    #[cfg(windows)]
    let _ = colored::control::set_virtual_terminal(true);

    match run(Args::parse()) {
        Ok(outfile) => println!("Created BEAST 2 XML : {}", outfile.display()),
        Err(err) => {
            let err = format!("{:?}", err);
            println!("{}", err.bold().red());
            std::process::exit(1);
        }
    }
}
