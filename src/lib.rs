pub mod compiler;
pub mod config;
pub mod log;
pub mod lsp;
