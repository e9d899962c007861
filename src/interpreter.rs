use std::{
    env,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::Command,
};

use tracing::debug;

use crate::{errors::Result, warn};

/// Environment variable naming the interpreter to query.
pub const PYTHON_ENV: &str = "PYFLAGS_PYTHON";

/// An activated Python environment, found through its environment variable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PythonEnv {
    /// `VIRTUAL_ENV`
    Venv,
    /// `CONDA_PREFIX`
    Conda,
}

impl PythonEnv {
    /// Location of the environment's interpreter below `prefix`.
    fn interpreter(self, prefix: &OsStr, windows: bool) -> PathBuf {
        let prefix = Path::new(prefix);
        match (self, windows) {
            (PythonEnv::Venv, true) => prefix.join("Scripts").join("python.exe"),
            (PythonEnv::Conda, true) => prefix.join("python.exe"),
            (_, false) => prefix.join("bin").join("python"),
        }
    }
}

fn env_interpreter(
    virtual_env: Option<OsString>,
    conda_prefix: Option<OsString>,
) -> Option<PathBuf> {
    // Use cfg rather than the target triple because this affects where files are located on
    // the host
    match (virtual_env, conda_prefix) {
        (Some(dir), None) => Some(PythonEnv::Venv.interpreter(&dir, cfg!(windows))),
        (None, Some(dir)) => Some(PythonEnv::Conda.interpreter(&dir, cfg!(windows))),
        (Some(_), Some(_)) => {
            warn!(
                "Both VIRTUAL_ENV and CONDA_PREFIX are set. pyflags will ignore both of these for \
                 locating the Python interpreter until you unset one of them."
            );
            None
        }
        (None, None) => None,
    }
}

/// Attempts to locate a python interpreter.
///
/// Locations are checked in the order listed:
///   1. If `PYFLAGS_PYTHON` is set, this interpreter is used.
///   2. If in a virtualenv or conda environment, that environment's interpreter is used.
///   3. `python`, if this is functional a Python 3.x interpreter
///   4. `python3`, as above
pub fn find_interpreter() -> Result<PathBuf> {
    find_interpreter_with(|var| env::var_os(var), is_python3)
}

fn find_interpreter_with(
    env_var: impl Fn(&str) -> Option<OsString>,
    is_python3: impl Fn(&str) -> bool,
) -> Result<PathBuf> {
    if let Some(exe) = env_var(PYTHON_ENV).filter(|exe| !exe.is_empty()) {
        debug!("using interpreter from {PYTHON_ENV}");
        Ok(exe.into())
    } else if let Some(env_interpreter) =
        env_interpreter(env_var("VIRTUAL_ENV"), env_var("CONDA_PREFIX"))
    {
        debug!("using interpreter from the active environment");
        Ok(env_interpreter)
    } else {
        ["python", "python3"]
            .into_iter()
            .find(|&bin| is_python3(bin))
            .map(PathBuf::from)
            .ok_or_else(|| "no Python 3.x interpreter found".into())
    }
}

fn is_python3(bin: &str) -> bool {
    if let Ok(out) = Command::new(bin).arg("--version").output() {
        // begin with `Python 3.X.X :: additional info`
        out.stdout.starts_with(b"Python 3") || out.stderr.starts_with(b"Python 3")
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, iter::FromIterator};

    use super::*;

    fn lookup(vars: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: HashMap<&'static str, &'static str> = vars.iter().copied().collect();
        move |var: &str| vars.get(var).map(|value| OsString::from(*value))
    }

    #[test]
    fn test_venv_interpreter() {
        let base = OsStr::new("base");
        assert_eq!(
            PythonEnv::Venv.interpreter(base, true),
            PathBuf::from_iter(&["base", "Scripts", "python.exe"])
        );
        assert_eq!(
            PythonEnv::Venv.interpreter(base, false),
            PathBuf::from_iter(&["base", "bin", "python"])
        );
    }

    #[test]
    fn test_conda_env_interpreter() {
        let base = OsStr::new("base");
        assert_eq!(
            PythonEnv::Conda.interpreter(base, true),
            PathBuf::from_iter(&["base", "python.exe"])
        );
        assert_eq!(
            PythonEnv::Conda.interpreter(base, false),
            PathBuf::from_iter(&["base", "bin", "python"])
        );
    }

    #[test]
    fn test_env_interpreter_selection() {
        assert_eq!(env_interpreter(None, None), None);
        assert_eq!(
            env_interpreter(Some("venv".into()), None),
            Some(PythonEnv::Venv.interpreter(OsStr::new("venv"), cfg!(windows)))
        );
        assert_eq!(
            env_interpreter(None, Some("conda".into())),
            Some(PythonEnv::Conda.interpreter(OsStr::new("conda"), cfg!(windows)))
        );
        // Ambiguous environments are ignored
        assert_eq!(
            env_interpreter(Some("venv".into()), Some("conda".into())),
            None
        );
    }

    #[test]
    fn pyflags_python_wins() {
        let env_var = lookup(&[
            ("PYFLAGS_PYTHON", "/opt/python/bin/python3"),
            ("VIRTUAL_ENV", "venv"),
        ]);
        assert_eq!(
            find_interpreter_with(env_var, |_| true).unwrap(),
            PathBuf::from("/opt/python/bin/python3")
        );
    }

    #[test]
    fn active_environment_before_path() {
        let env_var = lookup(&[("PYFLAGS_PYTHON", ""), ("CONDA_PREFIX", "conda")]);
        assert_eq!(
            find_interpreter_with(env_var, |_| true).unwrap(),
            PythonEnv::Conda.interpreter(OsStr::new("conda"), cfg!(windows))
        );
    }

    #[test]
    fn path_fallback_order() {
        assert_eq!(
            find_interpreter_with(lookup(&[]), |_| true).unwrap(),
            PathBuf::from("python")
        );
        assert_eq!(
            find_interpreter_with(lookup(&[]), |bin| bin == "python3").unwrap(),
            PathBuf::from("python3")
        );
        // Both environments set means neither is used
        let env_var = lookup(&[("VIRTUAL_ENV", "venv"), ("CONDA_PREFIX", "conda")]);
        assert_eq!(
            find_interpreter_with(env_var, |bin| bin == "python3").unwrap(),
            PathBuf::from("python3")
        );
    }

    #[test]
    fn no_interpreter_found() {
        let error = find_interpreter_with(lookup(&[]), |_| false).unwrap_err();
        assert_eq!(error.to_string(), "no Python 3.x interpreter found");
    }

    #[test]
    fn is_python3_rejects_missing_binary() {
        assert!(!is_python3("definitely-not-a-python"));
    }
}
