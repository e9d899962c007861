use std::process::ExitCode;

use clap::Parser;
use pyflags::{
    cli::{self, CommonArgs},
    include_flags, join_flags, Result,
};

/// Print the `-I` flags needed to compile against the Python interpreter's headers.
#[derive(Parser)]
#[command(name = "pyflags-include", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.common.resolve_config()?;
    cli::print_line(&join_flags(&include_flags(&config)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(cli.common.verbose);
    cli::exit(run(&cli))
}
