//! FrontEnd backed by a compiler executable.
//!
//! Each query runs `<compiler> <options> <mode> <path>` with the live buffer
//! piped on stdin, and reads a JSON array of records from stdout:
//!
//! - `--show-errors`: [`Issue`] records
//! - `--lookup-name`, `--rename-symbol`, `--show-document-symbols`:
//!   [`Symbol`] records
//!
//! Cursor queries carry `--line`/`--column` through the options.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::compiler::error::FrontEndError;
use crate::compiler::frontend::FrontEnd;
use crate::compiler::options::CompilerOptions;
use crate::compiler::types::{Issue, Symbol};

pub struct ProcessFrontEnd {
    compiler: PathBuf,
}

impl ProcessFrontEnd {
    pub fn new(compiler: impl Into<PathBuf>) -> Self {
        Self {
            compiler: compiler.into(),
        }
    }

    fn run<T: DeserializeOwned>(
        &self,
        mode: &str,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<T>, FrontEndError> {
        let args = options.to_args();
        debug!(compiler = ?self.compiler, mode, ?args, ?path, "Running compiler");

        let mut child = Command::new(&self.compiler)
            .args(&args)
            .arg(mode)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin is fed from its own thread while stdout and stderr drain
        let writer = child.stdin.take().map(|mut stdin| {
            let input = text.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&input))
        });

        let output = child.wait_with_output()?;

        if let Some(writer) = writer {
            let written = writer
                .join()
                .map_err(|_| io::Error::other("stdin writer panicked"))?;
            match written {
                Ok(()) => {}
                // The compiler may read the file from disk instead
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e.into()),
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        if stdout.trim().is_empty() {
            if output.status.success() {
                return Ok(Vec::new());
            }
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("Compiler {:?} failed in {} mode: {}", self.compiler, mode, stderr);
            return Err(FrontEndError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(serde_json::from_str(&stdout)?)
    }
}

impl FrontEnd for ProcessFrontEnd {
    fn show_errors(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Issue>, FrontEndError> {
        self.run("--show-errors", path, text, options)
    }

    fn lookup_name(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.run("--lookup-name", path, text, options)
    }

    fn get_all_occurrences(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.run("--rename-symbol", path, text, options)
    }

    fn get_symbols(
        &self,
        path: &Path,
        text: &str,
        options: &CompilerOptions,
    ) -> Result<Vec<Symbol>, FrontEndError> {
        self.run("--show-document-symbols", path, text, options)
    }

    fn parse_compiler_arguments(&self, argv: &[String]) -> Result<CompilerOptions, FrontEndError> {
        CompilerOptions::from_args(argv)
    }
}
