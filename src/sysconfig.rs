use std::{
    collections::HashMap,
    env,
    ffi::OsString,
    io::{BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::debug;

use crate::{
    bail, ensure,
    errors::{Context, Result},
    interpreter::find_interpreter,
};

/// Environment variable naming a snapshot file to use instead of querying an interpreter.
pub const CONFIG_FILE_ENV: &str = "PYFLAGS_CONFIG_FILE";

/// The slice of an interpreter's build configuration needed to compile and link against it.
///
/// Usually this is queried directly from the Python interpreter, or read back from a snapshot
/// file (see [`SysConfig::from_reader`]) written by `pyflags-print-config`.
///
/// Values which are `None` in Python are `None` here. An empty string and `None` are treated
/// the same wherever a value is tested for truthiness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysConfig {
    /// `sysconfig.get_path("include")`
    ///
    /// Serialized to `include`.
    pub include: Option<String>,

    /// `sysconfig.get_path("platinclude")`
    ///
    /// Serialized to `platinclude`.
    pub platinclude: Option<String>,

    /// The `VERSION` config var, e.g. `3.11`.
    ///
    /// Serialized to `version`.
    pub version: Option<String>,

    /// `sys.abiflags`, e.g. `d` for debug builds. Missing on Windows.
    ///
    /// Serialized to `abiflags`.
    pub abiflags: Option<String>,

    /// The `LIBS` config var.
    ///
    /// Serialized to `libs`.
    pub libs: Option<String>,

    /// The `SYSLIBS` config var.
    ///
    /// Serialized to `syslibs`.
    pub syslibs: Option<String>,

    /// Whether `Py_ENABLE_SHARED` is truthy, i.e. libpython is a shared object.
    ///
    /// Serialized to `shared`.
    pub shared: bool,

    /// The `LIBPL` config var: the directory holding the static `libpython` archive.
    ///
    /// Serialized to `libpl`.
    pub libpl: Option<String>,

    /// The `PYTHONFRAMEWORK` config var. Non-empty only for macOS framework builds.
    ///
    /// Serialized to `framework`.
    pub framework: Option<String>,

    /// The `PYTHONFRAMEWORKPREFIX` config var.
    ///
    /// Serialized to `framework_prefix`.
    pub framework_prefix: Option<String>,

    /// The `LINKFORSHARED` config var.
    ///
    /// Serialized to `linkforshared`.
    pub linkforshared: Option<String>,
}

/// Where [`SysConfig::resolve`] should look for a configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Snapshot file given on the command line. Wins over everything else.
    pub config_file: Option<PathBuf>,
    /// Interpreter given on the command line. Wins over interpreter discovery.
    pub python: Option<PathBuf>,
}

impl SysConfig {
    /// Resolves the configuration from, in order:
    ///   1. `options.config_file`
    ///   2. the file named by `PYFLAGS_CONFIG_FILE`
    ///   3. the interpreter in `options.python`
    ///   4. the interpreter located by [`find_interpreter`]
    pub fn resolve(options: &ResolveOptions) -> Result<Self> {
        Self::resolve_with(options, env::var_os(CONFIG_FILE_ENV))
    }

    fn resolve_with(options: &ResolveOptions, env_config_file: Option<OsString>) -> Result<Self> {
        if let Some(path) = &options.config_file {
            debug!(path = %path.display(), "reading config snapshot from --config-file");
            return Self::from_path(path);
        }
        if let Some(path) = env_config_file.filter(|path| !path.is_empty()) {
            let path = PathBuf::from(path);
            debug!(path = %path.display(), "reading config snapshot from {CONFIG_FILE_ENV}");
            return Self::from_path(&path);
        }
        let interpreter = match &options.python {
            Some(python) => python.clone(),
            None => find_interpreter()?,
        };
        debug!(interpreter = %interpreter.display(), "querying interpreter sysconfig");
        Self::from_interpreter(&interpreter)
    }

    #[doc(hidden)]
    pub fn from_interpreter(interpreter: impl AsRef<Path>) -> Result<Self> {
        const SCRIPT: &str = r#"
import sys
import sysconfig
from sysconfig import get_config_var

def print_if_set(varname, value):
    if value is not None:
        print(varname, str(value).replace("\n", " "))

print_if_set("include", sysconfig.get_path("include"))
print_if_set("platinclude", sysconfig.get_path("platinclude"))
print_if_set("version", get_config_var("VERSION"))
print_if_set("abiflags", getattr(sys, "abiflags", None))
print_if_set("libs", get_config_var("LIBS"))
print_if_set("syslibs", get_config_var("SYSLIBS"))
print("shared", bool(get_config_var("Py_ENABLE_SHARED")))
print_if_set("libpl", get_config_var("LIBPL"))
print_if_set("framework", get_config_var("PYTHONFRAMEWORK"))
print_if_set("framework_prefix", get_config_var("PYTHONFRAMEWORKPREFIX"))
print_if_set("linkforshared", get_config_var("LINKFORSHARED"))
"#;
        let output = run_python_script(interpreter.as_ref(), SCRIPT)?;
        let map = parse_script_output(&output);
        let config = Self::from_script_map(map);
        debug!(?config, "parsed interpreter sysconfig");
        Ok(config)
    }

    fn from_script_map(mut map: HashMap<String, String>) -> Self {
        SysConfig {
            include: map.remove("include"),
            platinclude: map.remove("platinclude"),
            version: map.remove("version"),
            abiflags: map.remove("abiflags"),
            libs: map.remove("libs"),
            syslibs: map.remove("syslibs"),
            shared: map.get("shared").is_some_and(|shared| shared == "True"),
            libpl: map.remove("libpl"),
            framework: map.remove("framework"),
            framework_prefix: map.remove("framework_prefix"),
            linkforshared: map.remove("linkforshared"),
        }
    }

    #[doc(hidden)]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_file = std::fs::File::open(path)
            .with_context(|| format!("failed to open pyflags config file at {}", path.display()))?;
        let reader = std::io::BufReader::new(config_file);
        SysConfig::from_reader(reader)
            .with_context(|| format!("failed to parse pyflags config file at {}", path.display()))
    }

    /// Reads a `key=value` snapshot, one pair per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Unknown keys are an error.
    #[doc(hidden)]
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let reader = BufReader::new(reader);
        let lines = reader.lines();

        let mut config = SysConfig::default();

        for (i, line) in lines.enumerate() {
            let line = line.context("failed to read line from config")?;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("expected key=value pair on line {}", i + 1))?;
            let owned = || Some(value.to_string());
            match key {
                "include" => config.include = owned(),
                "platinclude" => config.platinclude = owned(),
                "version" => config.version = owned(),
                "abiflags" => config.abiflags = owned(),
                "libs" => config.libs = owned(),
                "syslibs" => config.syslibs = owned(),
                "shared" => {
                    config.shared = value.parse().context(format!(
                        "failed to parse shared from config value '{}'",
                        value
                    ))?
                }
                "libpl" => config.libpl = owned(),
                "framework" => config.framework = owned(),
                "framework_prefix" => config.framework_prefix = owned(),
                "linkforshared" => config.linkforshared = owned(),
                unknown => bail!("unknown config key `{}`", unknown),
            }
        }

        Ok(config)
    }

    /// Writes the snapshot read by [`SysConfig::from_reader`].
    #[doc(hidden)]
    pub fn to_writer(&self, mut writer: impl Write) -> Result<()> {
        macro_rules! write_line {
            ($value:ident) => {
                writeln!(writer, "{}={}", stringify!($value), self.$value).context(concat!(
                    "failed to write ",
                    stringify!($value),
                    " to config"
                ))
            };
        }

        macro_rules! write_option_line {
            ($value:ident) => {
                if let Some(value) = &self.$value {
                    ensure!(
                        !value.contains(['\n', '\r']),
                        concat!(
                            "cannot write ",
                            stringify!($value),
                            " to config: value {:?} contains a line break"
                        ),
                        value
                    );
                    writeln!(writer, "{}={}", stringify!($value), value).context(concat!(
                        "failed to write ",
                        stringify!($value),
                        " to config"
                    ))
                } else {
                    Ok(())
                }
            };
        }

        write_option_line!(include)?;
        write_option_line!(platinclude)?;
        write_option_line!(version)?;
        write_option_line!(abiflags)?;
        write_option_line!(libs)?;
        write_option_line!(syslibs)?;
        write_line!(shared)?;
        write_option_line!(libpl)?;
        write_option_line!(framework)?;
        write_option_line!(framework_prefix)?;
        write_option_line!(linkforshared)?;
        Ok(())
    }

    /// Whether this is a macOS framework build (`PYTHONFRAMEWORK` is non-empty).
    pub fn is_framework(&self) -> bool {
        is_set(self.framework.as_deref())
    }
}

/// Python truthiness for an optional string config var.
fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|value| !value.is_empty())
}

fn parse_script_output(output: &str) -> HashMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(' ')?;
            Some((key.into(), value.into()))
        })
        .collect()
}

/// Run a python script using the specified interpreter binary.
fn run_python_script(interpreter: &Path, script: &str) -> Result<String> {
    let out = Command::new(interpreter)
        .env("PYTHONIOENCODING", "utf-8")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .and_then(|mut child| {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(script.as_bytes())?;
            }
            child.wait_with_output()
        });

    match out {
        Err(err) => bail!(
            "failed to run the Python interpreter at {}: {}",
            interpreter.display(),
            err
        ),
        Ok(ok) if !ok.status.success() => bail!(
            "Python script failed when run with the interpreter at {}",
            interpreter.display()
        ),
        Ok(ok) => Ok(String::from_utf8(ok.stdout)
            .context("failed to parse Python script output as utf-8")?),
    }
}
