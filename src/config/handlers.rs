//! Caller-supplied failure and warning strategies

use crate::error::{ConfigError, Halted};
use clap::error::ErrorKind;
use std::fmt;
use std::sync::Arc;

type FailFn = dyn Fn(ConfigError) + Send + Sync;
type WarnFn = dyn Fn(&str) + Send + Sync;

/// The two callbacks the resolver reports through.
///
/// `fail` receives every fatal error. It is expected not to return (panic, exit,
/// shutdown); if it does, the resolver stops anyway and returns [`Halted`].
/// `warn` receives non-fatal messages.
#[derive(Clone)]
pub struct Handlers {
    fail: Arc<FailFn>,
    warn: Arc<WarnFn>,
}

impl Handlers {
    pub fn new<F, W>(fail: F, warn: W) -> Self
    where
        F: Fn(ConfigError) + Send + Sync + 'static,
        W: Fn(&str) + Send + Sync + 'static,
    {
        Self { fail: Arc::new(fail), warn: Arc::new(warn) }
    }

    /// Panic with the error; warnings go to `tracing`.
    ///
    /// `--help` and `--version` still print and exit through clap.
    pub fn panicking() -> Self {
        Self::new(
            |err| match err {
                ConfigError::CommandLine(clap_err) if is_informational(&clap_err) => clap_err.exit(),
                other => panic!("{other}"),
            },
            log_warning,
        )
    }

    /// Print the error to stderr and exit with status 1.
    ///
    /// Command-line errors go through clap's own exit path, so `--help` still
    /// prints usage and exits successfully.
    pub fn exiting() -> Self {
        Self::new(
            |err| match err {
                ConfigError::CommandLine(clap_err) => clap_err.exit(),
                other => {
                    eprintln!("Error: {other}");
                    std::process::exit(1);
                }
            },
            log_warning,
        )
    }

    pub fn with_fail<F>(mut self, fail: F) -> Self
    where
        F: Fn(ConfigError) + Send + Sync + 'static,
    {
        self.fail = Arc::new(fail);
        self
    }

    pub fn with_warn<W>(mut self, warn: W) -> Self
    where
        W: Fn(&str) + Send + Sync + 'static,
    {
        self.warn = Arc::new(warn);
        self
    }

    /// Report a fatal error. Always yields `Halted` for the caller to propagate.
    pub(crate) fn fail(&self, err: ConfigError) -> Halted {
        (self.fail)(err);
        Halted
    }

    pub(crate) fn warn(&self, message: &str) {
        (self.warn)(message);
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::panicking()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

/// Help and version requests arrive as clap errors but are not failures.
fn is_informational(err: &clap::Error) -> bool {
    matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion)
}

fn log_warning(message: &str) {
    tracing::warn!("{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_fail_returns_halted_when_handler_returns() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handlers = Handlers::default().with_fail(move |err| {
            sink.lock().expect("lock").push(err.to_string());
        });

        let halted = handlers.fail(ConfigError::FlagBinding {
            key: "server.port".to_string(),
            flag: "port".to_string(),
        });

        assert_eq!(halted, Halted);
        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("server.port"));
    }

    #[test]
    #[should_panic(expected = "server.port")]
    fn test_panicking_handler_panics_with_error() {
        let _ = Handlers::panicking().fail(ConfigError::FlagBinding {
            key: "server.port".to_string(),
            flag: "server.port".to_string(),
        });
    }

    #[test]
    fn test_help_and_version_are_informational() {
        let help = clap::Error::new(ErrorKind::DisplayHelp);
        let version = clap::Error::new(ErrorKind::DisplayVersion);
        let bad = clap::Error::new(ErrorKind::InvalidValue);
        assert!(is_informational(&help));
        assert!(is_informational(&version));
        assert!(!is_informational(&bad));
    }

    #[test]
    #[should_panic(expected = "invalid command line")]
    fn test_panicking_handler_panics_on_bad_arguments() {
        let _ = Handlers::panicking().fail(ConfigError::CommandLine(clap::Error::new(
            ErrorKind::InvalidValue,
        )));
    }

    #[test]
    fn test_warn_forwards_message() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        let handlers = Handlers::default().with_warn(move |msg| {
            sink.lock().expect("lock").push(msg.to_string());
        });

        handlers.warn("careful");
        assert_eq!(*seen.lock().expect("lock"), vec!["careful".to_string()]);
    }
}
