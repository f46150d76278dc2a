//! Input discovery

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const JAC_EXTENSION: &str = "jac";

pub fn is_jac_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == JAC_EXTENSION)
}

/// Expand the command line inputs. Directories are walked for `.jac` files
/// in a stable order; files named explicitly are kept whatever their
/// extension.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_file() && is_jac_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Hook arguments: only `.jac` files are processed, the rest are ignored
pub fn hook_inputs(args: &[String]) -> Vec<PathBuf> {
    args.iter()
        .filter(|arg| arg.ends_with(".jac"))
        .map(PathBuf::from)
        .collect()
}
