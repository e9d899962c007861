use target_lexicon::{OperatingSystem, Triple};
use tracing::debug;

use crate::{
    errors::{Error, Result},
    sysconfig::SysConfig,
};

/// Compiler flags for the interpreter's header directories.
///
/// Emits `-I<include>` then `-I<platinclude>`, skipping either path when it is unset or empty.
pub fn include_flags(config: &SysConfig) -> Vec<String> {
    [config.include.as_deref(), config.platinclude.as_deref()]
        .into_iter()
        .flatten()
        .filter(|include| !include.is_empty())
        .map(|include| format!("-I{include}"))
        .collect()
}

/// Linker flags for embedding the interpreter's runtime library.
///
/// The list is built in this order:
///   1. `-lpython<VERSION><abiflags>`
///   2. the tokens of `LIBS`, then of `SYSLIBS`
///   3. for non-shared builds, `-L<LIBPL>` inserted at the front
///   4. for non-framework builds, the tokens of `LINKFORSHARED`
///
/// Fails with [`ErrorKind::MissingConfigVar`](crate::ErrorKind::MissingConfigVar) when the build
/// is not shared and `LIBPL` is unset or empty.
pub fn ld_flags(config: &SysConfig) -> Result<Vec<String>> {
    let mut flags = vec![format!(
        "-lpython{}{}",
        config.version.as_deref().unwrap_or_default(),
        config.abiflags.as_deref().unwrap_or_default()
    )];

    flags.extend(split_tokens(config.libs.as_deref()));
    flags.extend(split_tokens(config.syslibs.as_deref()));

    if !config.shared {
        let libpl = config
            .libpl
            .as_deref()
            .filter(|libpl| !libpl.is_empty())
            .ok_or_else(|| Error::missing_config_var("LIBPL"))?;
        debug!(libpl, "static libpython, adding library search path");
        flags.insert(0, format!("-L{libpl}"));
    }

    if !config.is_framework() {
        debug!("not a framework build, adding LINKFORSHARED");
        flags.extend(split_tokens(config.linkforshared.as_deref()));
    }

    Ok(flags)
}

/// Extra linker flags for running against a macOS framework build.
///
/// Adds `-Wl,-rpath,<PYTHONFRAMEWORKPREFIX>` when `triple` is Darwin and the interpreter is a
/// framework build. All other platforms are no-ops.
pub fn framework_link_args(config: &SysConfig, triple: &Triple) -> Vec<String> {
    if !matches!(triple.operating_system, OperatingSystem::Darwin(_)) || !config.is_framework() {
        return Vec::new();
    }
    match config.framework_prefix.as_deref() {
        Some(prefix) if !prefix.is_empty() => vec![format!("-Wl,-rpath,{prefix}")],
        _ => Vec::new(),
    }
}

/// Formats flags as the single space-separated line consumed by build systems.
pub fn join_flags(flags: &[String]) -> String {
    flags.join(" ")
}

fn split_tokens(value: Option<&str>) -> impl Iterator<Item = String> + '_ {
    value
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_owned)
}
