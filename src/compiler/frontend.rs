//! FrontEnd trait for the compiler collaborator

use std::path::Path;

use crate::compiler::error::FrontEndError;
use crate::compiler::options::CompilerOptions;
use crate::compiler::types::{Issue, Symbol};

/// Semantic analysis entry points of the compiler front-end.
///
/// Calls are synchronous and may be slow; the server only makes them from
/// blocking worker threads.
#[cfg_attr(test, mockall::automock)]
pub trait FrontEnd: Send + Sync {
    /// Collects the problems in `text`, analyzed as if it were saved at `path`.
    fn show_errors(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Issue>, FrontEndError>;

    /// Finds the definitions of the name under the cursor in `options`.
    fn lookup_name(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError>;

    /// Finds every occurrence of the name under the cursor in `options`.
    fn get_all_occurrences(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError>;

    /// Lists the symbols of the document as a flat, parent-indexed list.
    fn get_symbols(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError>;

    /// Builds compiler options from a command line ending in the document path.
    fn parse_compiler_arguments(&self, argv: &[String]) -> Result<CompilerOptions, FrontEndError>;
}
