//! Resolution of compiler-reported filenames to absolute paths.

use std::path::{Component, Path, PathBuf};

use crate::compiler::CompilerOptions;
use crate::lsp::error::LspError;

/// Makes `path` absolute against the working directory and removes `.` and
/// `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Finds the file a symbol came from.
///
/// Tries `filename` itself first, then each include directory in declared
/// order.
pub fn resolve(filename: &str, options: &CompilerOptions) -> Result<PathBuf, LspError> {
    let path = normalize(Path::new(filename));
    if path.exists() {
        return Ok(path);
    }

    options
        .include_dirs
        .iter()
        .map(|dir| normalize(&dir.join(filename)))
        .find(|candidate| candidate.exists())
        .ok_or_else(|| LspError::FileNotFound(filename.to_string()))
}
