use std::process::ExitCode;

use clap::Parser;
use pyflags::{
    cli::{self, CommonArgs},
    framework_link_args, join_flags, ld_flags, Result,
};
use target_lexicon::Triple;

/// Print the linker flags needed to embed the Python interpreter's runtime library.
///
/// Exits with status 3 when the build is static and LIBPL is not configured.
#[derive(Parser)]
#[command(name = "pyflags-ldflags", version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// On macOS framework builds, also add `-Wl,-rpath,<PYTHONFRAMEWORKPREFIX>`
    #[arg(long)]
    framework_rpath: bool,
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.common.resolve_config()?;
    let mut flags = ld_flags(&config)?;
    if cli.framework_rpath {
        flags.extend(framework_link_args(&config, &Triple::host()));
    }
    cli::print_line(&join_flags(&flags))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(cli.common.verbose);
    cli::exit(run(&cli))
}
