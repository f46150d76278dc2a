//! Log level selection and subscriber setup for the command line tools

use std::env;
use std::fmt;
use std::sync::OnceLock;

/// Environment variable read when `--log-level` is absent. Accepts a level
/// name or a full `EnvFilter` directive such as `pipeline=debug`.
pub const LOG_ENV: &str = "JAC_LOG";

/// Logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Some(Self::Off),
            "error" | "err" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" | "verbose" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The filter directive to install. The command line wins over the
/// environment; without either only warnings and errors are logged.
pub fn directive(cli: Option<&str>, env_value: Option<&str>) -> String {
    if let Some(level) = cli.and_then(LogLevel::parse) {
        return level.to_string();
    }
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => LogLevel::Warn.to_string(),
    }
}

/// Install the global subscriber once. Events go to stderr so stdout stays
/// free for command output such as `jac parse`.
pub fn init(cli_level: Option<&str>) {
    use std::io::IsTerminal;
    use tracing_subscriber::{fmt, EnvFilter};

    static INITIALISED: OnceLock<()> = OnceLock::new();

    let _ = INITIALISED.get_or_init(|| {
        let env_value = env::var(LOG_ENV).ok();
        let directive = directive(cli_level, env_value.as_deref());
        let filter = EnvFilter::try_new(&directive)
            .unwrap_or_else(|_| EnvFilter::new(LogLevel::Warn.as_str()));
        let use_ansi = env::var_os("NO_COLOR").is_none() && std::io::stderr().is_terminal();

        let subscriber = fmt::fmt()
            .with_env_filter(filter)
            .with_ansi(use_ansi)
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .compact()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_cli_level_overrides_env() {
        assert_eq!(directive(Some("debug"), Some("error")), "debug");
    }

    #[test]
    fn test_env_directive_passes_through() {
        assert_eq!(directive(None, Some("pipeline=debug")), "pipeline=debug");
    }

    #[test]
    fn test_defaults_to_warn() {
        assert_eq!(directive(None, None), "warn");
        assert_eq!(directive(None, Some("  ")), "warn");
        assert_eq!(directive(Some("bogus"), None), "warn");
    }
}
