//! Pieces shared by the `pyflags-*` executables.
//!
//! Please don't use these outside of this crate's binaries - they could change at any time.
#![doc(hidden)]

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Args;
use tracing_subscriber::EnvFilter;

use crate::{
    errors::{Context, Error, Result},
    sysconfig::{ResolveOptions, SysConfig},
};

/// Environment variable holding a `tracing` filter directive, e.g. `pyflags=debug`.
pub const LOG_ENV: &str = "PYFLAGS_LOG";

/// Options accepted by every `pyflags-*` executable.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Python interpreter to query (defaults to $PYFLAGS_PYTHON, the active environment, then
    /// `python`/`python3` on PATH)
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Read a configuration snapshot instead of running an interpreter (defaults to
    /// $PYFLAGS_CONFIG_FILE)
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            config_file: self.config_file.clone(),
            python: self.python.clone(),
        }
    }

    pub fn resolve_config(&self) -> Result<SysConfig> {
        SysConfig::resolve(&self.resolve_options())
    }
}

/// Installs a stderr `fmt` subscriber. `PYFLAGS_LOG` wins over `verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    // Ignore a subscriber that is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Writes `line` followed by a newline to stdout.
pub fn print_line(line: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{line}").context("failed to write to stdout")?;
    stdout.flush().context("failed to flush stdout")
}

/// Maps the outcome of an executable to its exit status, reporting errors on stderr.
pub fn exit(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e.report());
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &Error) -> ExitCode {
    match u8::try_from(error.kind().exit_code()) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn common_args_default_to_discovery() {
        let cli = TestCli::try_parse_from(["pyflags-test"]).unwrap();
        assert_eq!(cli.common.python, None);
        assert_eq!(cli.common.config_file, None);
        assert!(!cli.common.verbose);
    }

    #[test]
    fn common_args_parse() {
        let cli = TestCli::try_parse_from([
            "pyflags-test",
            "--python",
            "/opt/python/bin/python3",
            "--config-file",
            "snapshot.txt",
            "-v",
        ])
        .unwrap();
        let options = cli.common.resolve_options();
        assert_eq!(
            options.python,
            Some(PathBuf::from("/opt/python/bin/python3"))
        );
        assert_eq!(options.config_file, Some(PathBuf::from("snapshot.txt")));
        assert!(cli.common.verbose);
    }
}
