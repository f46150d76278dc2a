//! Formatter configuration loaded from `jacfmt.toml`

use std::fs;
use std::path::{Path, PathBuf};

use jac_ast::FormatStyle;
use thiserror::Error;
use tracing::debug;

/// File name searched for by [`Config::discover`]
pub const CONFIG_FILE_NAME: &str = "jacfmt.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings shared by every session of a [`Program`](crate::Program)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub style: FormatStyle,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl Config {
    /// Parse configuration text. Keys sit at the top level of the file;
    /// unknown keys are rejected.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        let style: FormatStyle = toml::from_str(text)?;
        Ok(Self {
            style: style.normalized(),
            source: None,
        })
    }

    /// Load a specific configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        debug!(target: "pipeline", stage = "config.loaded", path = %path.display());
        Ok(config)
    }

    /// Find the nearest `jacfmt.toml` in `start` or one of its parents
    pub fn find(start: impl AsRef<Path>) -> Option<PathBuf> {
        start
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the nearest configuration file, or defaults when there is none
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::find(start) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jac_ast::NewlineStyle;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("indent_width = 2\nnewline = \"crlf\"\n").unwrap();
        assert_eq!(config.style.indent_width, 2);
        assert_eq!(config.style.newline, NewlineStyle::Crlf);
        assert_eq!(config.style.max_line_length, 100);
        assert!(config.style.sort_imports);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Config::from_toml("indent = 2\n").is_err());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = Config::from_toml("max_line_length = 5\nindent_width = 0\n").unwrap();
        assert_eq!(config.style.max_line_length, 20);
        assert_eq!(config.style.indent_width, 1);
    }

    #[test]
    fn test_discover_walks_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "max_blank_lines = 2\n").unwrap();

        let config = Config::discover(&nested).unwrap();
        assert_eq!(config.style.max_blank_lines, 2);
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_load_reports_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "use_tabs = \"yes\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
