use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontEndError {
    #[error("Invalid compiler arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to run compiler: {0}")]
    Io(#[from] std::io::Error),

    #[error("Compiler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Failed to parse compiler output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("Malformed symbol list: {0}")]
    MalformedSymbols(String),
}
