//! Canonical layout settings consumed by the printer and format passes

use serde::{Deserialize, Serialize};

/// Layout rules for canonical output. Every field has a default so a
/// partial `jacfmt.toml` only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatStyle {
    pub indent_width: u8,
    pub use_tabs: bool,
    pub max_line_length: usize,
    pub max_blank_lines: u32,
    pub trailing_newline: bool,
    pub newline: NewlineStyle,
    pub sort_imports: bool,
    pub normalize_comments: bool,
}

impl FormatStyle {
    /// Clamp out-of-range values instead of rejecting them
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.indent_width = self.indent_width.clamp(1, 16);
        self.max_line_length = self.max_line_length.max(20);
        self
    }

    /// Text of one indentation level
    pub fn indent_unit(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent_width as usize)
        }
    }

    /// Display width of `depth` indentation levels
    pub fn indent_columns(&self, depth: usize) -> usize {
        depth * self.indent_width as usize
    }
}

impl Default for FormatStyle {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
            max_line_length: 100,
            max_blank_lines: 1,
            trailing_newline: true,
            newline: NewlineStyle::Lf,
            sort_imports: true,
            normalize_comments: true,
        }
    }
}

/// Line terminator written by the printer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineStyle {
    #[default]
    Lf,
    Crlf,
}

impl NewlineStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NewlineStyle::Lf => "\n",
            NewlineStyle::Crlf => "\r\n",
        }
    }
}
