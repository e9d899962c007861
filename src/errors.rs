/// A simple macro for returning an error. Resembles anyhow::bail.
#[macro_export]
#[doc(hidden)]
macro_rules! bail {
    ($($args: tt)+) => { return Err(format!($($args)+).into()) };
}

/// A simple macro for checking a condition. Resembles anyhow::ensure.
#[macro_export]
#[doc(hidden)]
macro_rules! ensure {
    ($condition:expr, $($args: tt)+) => { if !($condition) { $crate::bail!($($args)+) } };
}

/// Show warning on stderr, stdout belongs to the printed flags.
#[macro_export]
#[doc(hidden)]
macro_rules! warn {
    ($($args: tt)+) => {
        ::tracing::warn!($($args)+)
    };
}

/// Broad classification of an [`Error`], used to pick the process exit code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration variable which the requested flags cannot do without was not set.
    MissingConfigVar,
    Other,
}

impl ErrorKind {
    /// Exit status reported to the invoking build system.
    ///
    /// `2` is left to `clap` for usage errors.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::MissingConfigVar => 3,
            ErrorKind::Other => 1,
        }
    }
}

/// A simple error implementation which allows chaining of errors, inspired somewhat by anyhow.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    value: String,
    source: Option<Box<dyn std::error::Error>>,
}

/// Error report inspired by
/// <https://blog.rust-lang.org/inside-rust/2021/07/01/What-the-error-handling-project-group-is-working-towards.html#2-error-reporter>
pub struct ErrorReport<'a>(&'a Error);

impl Error {
    /// `name` is the sysconfig variable name, e.g. `LIBPL`.
    pub fn missing_config_var(name: &str) -> Self {
        Error {
            kind: ErrorKind::MissingConfigVar,
            value: format!("{name} was not found"),
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn report(&self) -> ErrorReport<'_> {
        ErrorReport(self)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::error::Error;
        self.0.fmt(f)?;
        let mut source = self.0.source();
        if source.is_some() {
            writeln!(f, "\ncaused by:")?;
            let mut index = 0;
            while let Some(some_source) = source {
                writeln!(f, "  - {index}: {some_source}")?;
                source = some_source.source();
                index += 1;
            }
        }
        Ok(())
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Self {
            kind: ErrorKind::Other,
            value,
            source: None,
        }
    }
}

impl From<&'_ str> for Error {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub trait Context<T> {
    fn context(self, message: impl Into<String>) -> Result<T>;
    fn with_context(self, message: impl FnOnce() -> String) -> Result<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|error| Error {
            kind: ErrorKind::Other,
            value: message.into(),
            source: Some(Box::new(error)),
        })
    }

    fn with_context(self, message: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|error| Error {
            kind: ErrorKind::Other,
            value: message(),
            source: Some(Box::new(error)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_report() {
        let error: Result<()> = Err(Error::from("there was an internal error"))
            .with_context(|| format!("failed to do {}", "something difficult"))
            .context("some top-level task failed");

        assert_eq!(
            format!("{}", error.unwrap_err().report()),
            "some top-level task failed\n\
            caused by:\n  \
              - 0: failed to do something difficult\n  \
              - 1: there was an internal error\n"
        );
    }

    #[test]
    fn missing_config_var_kind() {
        let error = Error::missing_config_var("LIBPL");
        assert_eq!(error.kind(), ErrorKind::MissingConfigVar);
        assert_eq!(error.kind().exit_code(), 3);
        assert_eq!(error.to_string(), "LIBPL was not found");
        assert_eq!(format!("{}", error.report()), "LIBPL was not found");
    }

    #[test]
    fn plain_errors_are_other() {
        let error = Error::from(format!("unknown config key `{}`", "foo"));
        assert_eq!(error.kind(), ErrorKind::Other);
        assert_eq!(error.kind().exit_code(), 1);
    }
}
