//! Compiler options derived from configured flags plus the document path.

use std::path::PathBuf;

use clap::Parser;

use crate::compiler::error::FrontEndError;

/// Resolved configuration needed to analyze one document.
///
/// Values held by the options cache are shared and never mutated. Cursor
/// queries work on a clone with `line`/`column` set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOptions {
    pub input: PathBuf,
    /// Search path for included files, in declared order
    pub include_dirs: Vec<PathBuf>,
    /// 1-based cursor line for position-sensitive queries
    pub line: Option<u32>,
    /// 1-based cursor column for position-sensitive queries
    pub column: Option<u32>,
    pub fixed_form: bool,
    pub implicit_typing: bool,
    pub implicit_interface: bool,
    pub standard: Option<String>,
    pub continue_compilation: bool,
}

#[derive(Debug, Parser)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct CompilerArgs {
    #[arg(short = 'I', long = "include-dir", value_name = "DIR")]
    include_dirs: Vec<PathBuf>,

    #[arg(long)]
    fixed_form: bool,

    #[arg(long)]
    implicit_typing: bool,

    #[arg(long)]
    implicit_interface: bool,

    #[arg(long = "std", value_name = "STANDARD")]
    standard: Option<String>,

    input: PathBuf,
}

impl CompilerOptions {
    /// Parses a compiler command line (without the program name).
    pub fn from_args(argv: &[String]) -> Result<Self, FrontEndError> {
        let args = CompilerArgs::try_parse_from(argv)
            .map_err(|e| FrontEndError::InvalidArguments(e.to_string().trim().to_string()))?;

        Ok(Self {
            input: args.input,
            include_dirs: args.include_dirs,
            line: None,
            column: None,
            fixed_form: args.fixed_form,
            implicit_typing: args.implicit_typing,
            implicit_interface: args.implicit_interface,
            standard: args.standard,
            continue_compilation: false,
        })
    }

    /// Returns a copy positioned at the given 1-based cursor.
    pub fn at_cursor(&self, line: u32, column: u32) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
            ..self.clone()
        }
    }

    /// Renders the flags back into command-line form, without the input path.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for dir in &self.include_dirs {
            args.push("-I".to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        if self.fixed_form {
            args.push("--fixed-form".to_string());
        }
        if self.implicit_typing {
            args.push("--implicit-typing".to_string());
        }
        if self.implicit_interface {
            args.push("--implicit-interface".to_string());
        }
        if let Some(standard) = &self.standard {
            args.push(format!("--std={}", standard));
        }
        if self.continue_compilation {
            args.push("--continue-compilation".to_string());
        }
        if let Some(line) = self.line {
            args.push("--line".to_string());
            args.push(line.to_string());
        }
        if let Some(column) = self.column {
            args.push("--column".to_string());
            args.push(column.to_string());
        }
        args
    }
}
