//! Compiler front-end collaborator
//! - types.rs: Native (1-based) records reported by the compiler
//! - options.rs: Compiler options and the argument parser that builds them
//! - frontend.rs: FrontEnd trait consumed by the server core
//! - process.rs: FrontEnd backed by a compiler executable
//! - error.rs: Front-end errors

pub mod error;
pub mod frontend;
pub mod options;
pub mod process;
pub mod types;

pub use error::FrontEndError;
pub use frontend::FrontEnd;
pub use options::CompilerOptions;
pub use process::ProcessFrontEnd;
pub use types::{Issue, Severity, Span, Symbol, SymbolType};
