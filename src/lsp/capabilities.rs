//! Client capability negotiation for the initialize handshake.

use tower_lsp::lsp_types::{
    ClientCapabilities, FileOperationFilter, FileOperationPattern, FileOperationRegistrationOptions,
    OneOf, ServerCapabilities, TextDocumentSyncCapability, TextDocumentSyncKind,
    TextDocumentSyncOptions, WorkspaceFileOperationsServerCapabilities,
    WorkspaceServerCapabilities,
};

/// Client features declared during initialize, fixed for the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientFlags {
    pub goto_definition: bool,
    pub definition_links: bool,
    pub document_symbols: bool,
    pub hierarchical_symbols: bool,
    pub configuration: bool,
}

/// Result shape of `textDocument/definition`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionShape {
    Links,
    Locations,
}

/// Result shape of `textDocument/documentSymbol`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolShape {
    Hierarchical,
    Flat,
}

impl ClientFlags {
    pub fn from_capabilities(capabilities: &ClientCapabilities) -> Self {
        let mut flags = Self::default();

        if let Some(text_document) = &capabilities.text_document {
            if let Some(definition) = &text_document.definition {
                flags.goto_definition = true;
                flags.definition_links = definition.link_support.unwrap_or(false);
            }
            if let Some(document_symbol) = &text_document.document_symbol {
                flags.document_symbols = true;
                flags.hierarchical_symbols = document_symbol
                    .hierarchical_document_symbol_support
                    .unwrap_or(false);
            }
        }

        flags.configuration = capabilities
            .workspace
            .as_ref()
            .and_then(|workspace| workspace.configuration)
            .unwrap_or(false);

        flags
    }

    pub fn definition_shape(&self) -> DefinitionShape {
        if self.definition_links {
            DefinitionShape::Links
        } else {
            DefinitionShape::Locations
        }
    }

    pub fn symbol_shape(&self) -> SymbolShape {
        if self.hierarchical_symbols {
            SymbolShape::Hierarchical
        } else {
            SymbolShape::Flat
        }
    }

    /// Capabilities advertised back to the client. Rename is always offered;
    /// definition and document symbols only when the client declared them.
    pub fn server_capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..Default::default()
                },
            )),
            definition_provider: self.goto_definition.then_some(OneOf::Left(true)),
            rename_provider: Some(OneOf::Left(true)),
            document_symbol_provider: self.document_symbols.then_some(OneOf::Left(true)),
            workspace: Some(WorkspaceServerCapabilities {
                workspace_folders: None,
                file_operations: Some(WorkspaceFileOperationsServerCapabilities {
                    did_delete: Some(FileOperationRegistrationOptions {
                        filters: vec![FileOperationFilter {
                            scheme: Some("file".to_string()),
                            pattern: FileOperationPattern {
                                glob: "**/*".to_string(),
                                matches: None,
                                options: None,
                            },
                        }],
                    }),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        }
    }
}
