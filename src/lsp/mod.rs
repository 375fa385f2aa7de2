// LSP protocol layer
// - server.rs: stdio server entry point
// - backend.rs: LanguageServer trait implementation
// - session.rs: per-session state shared by handlers
// - validation.rs: background diagnostics workers
// - symbols.rs / navigation.rs: documentSymbol, definition and rename results

pub mod backend;
pub mod cache;
pub mod capabilities;
pub mod documents;
pub mod error;
pub mod navigation;
pub mod pool;
pub mod position;
pub mod resolve;
pub mod server;
pub mod session;
pub mod settings;
pub mod symbols;
pub mod validation;
