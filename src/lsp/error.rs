use thiserror::Error;
use tower_lsp::jsonrpc::{Error as RpcError, ErrorCode};
use tower_lsp::lsp_types::Url;

use crate::compiler::FrontEndError;

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Invalid compiler configuration for {uri}: {message}")]
    Configuration { uri: Url, message: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Document is not open: {0}")]
    DocumentNotOpen(Url),

    #[error("Unsupported document uri: {0}")]
    UnsupportedUri(Url),

    #[error(transparent)]
    FrontEnd(#[from] FrontEndError),

    #[error("Worker failed: {0}")]
    Worker(String),
}

impl LspError {
    /// Errors caused by user-controllable input (settings, paths, documents)
    pub fn is_invalid_params(&self) -> bool {
        matches!(
            self,
            LspError::Configuration { .. }
                | LspError::FileNotFound(_)
                | LspError::DocumentNotOpen(_)
                | LspError::UnsupportedUri(_)
        )
    }
}

impl From<LspError> for RpcError {
    fn from(err: LspError) -> Self {
        let code = if err.is_invalid_params() {
            ErrorCode::InvalidParams
        } else {
            ErrorCode::InternalError
        };
        RpcError {
            code,
            message: err.to_string().into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_map_to_invalid_params() {
        let uri = Url::parse("file:///a.f90").unwrap();
        let err: RpcError = LspError::Configuration {
            uri,
            message: "unexpected argument '--bogus'".to_string(),
        }
        .into();

        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("--bogus"));

        let err: RpcError = LspError::FileNotFound("mod.f90".to_string()).into();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert_eq!(err.message, "File not found: mod.f90");
    }

    #[test]
    fn compiler_failures_map_to_internal_error() {
        let err: RpcError = LspError::FrontEnd(FrontEndError::MalformedSymbols(
            "parent index 9 out of range".to_string(),
        ))
        .into();

        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
