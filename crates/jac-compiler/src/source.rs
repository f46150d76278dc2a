//! Source units: the immutable input of one session

use std::fs;
use std::path::{Path, PathBuf};

use crate::SessionError;

const BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// UTF-8 with a byte order mark, stripped from `text`
    Utf8Bom,
}

/// A file's path and decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    encoding: Encoding,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let (text, encoding) = match text.strip_prefix(BOM) {
            Some(rest) => (rest.to_string(), Encoding::Utf8Bom),
            None => (text, Encoding::Utf8),
        };
        Self {
            path: path.into(),
            text,
            encoding,
        }
    }

    /// Decode raw bytes; anything but UTF-8 is rejected
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, SessionError> {
        let path = path.into();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(path, text)),
            Err(_) => Err(SessionError::Encoding { path }),
        }
    }

    /// Read a file from disk
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, bytes)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Source text without a byte order mark
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Put back the byte order mark the input had
    pub fn restore_encoding(&self, text: String) -> String {
        match self.encoding {
            Encoding::Utf8 => text,
            Encoding::Utf8Bom => format!("{}{}", BOM, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_is_stripped_and_restored() {
        let unit = SourceUnit::new("a.jac", "\u{feff}x = 1\n");
        assert_eq!(unit.text(), "x = 1\n");
        assert_eq!(unit.encoding(), Encoding::Utf8Bom);
        assert_eq!(unit.restore_encoding("y = 2\n".into()), "\u{feff}y = 2\n");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let err = SourceUnit::from_bytes("bad.jac", vec![0x78, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, SessionError::Encoding { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = SourceUnit::read("/definitely/not/here.jac").unwrap_err();
        assert!(matches!(err, SessionError::Io { .. }));
    }
}
