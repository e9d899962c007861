use std::{io, process::ExitCode};

use clap::Parser;
use pyflags::{
    cli::{self, CommonArgs},
    Result,
};

/// Print the resolved interpreter configuration as a `key=value` snapshot.
///
/// The output can be saved and passed back with `--config-file` or $PYFLAGS_CONFIG_FILE.
#[derive(Parser)]
#[command(name = "pyflags-print-config", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.common.resolve_config()?;
    config.to_writer(io::stdout().lock())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(cli.common.verbose);
    cli::exit(run(&cli))
}
