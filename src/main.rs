use anyhow::Result;
use clap::Parser;

use semwrap::logging::{LogConfig, init_logging};

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose));
    cli::run(cli)
}
