//! Format (normalization) passes
//!
//! Each pass is idempotent: running it on its own output changes nothing.

mod blank_lines;
mod comments;
mod imports;

pub use blank_lines::BlankLines;
pub use comments::{normalize_comment, NormalizeComments};
pub use imports::SortImports;
