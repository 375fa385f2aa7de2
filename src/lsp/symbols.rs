//! Outline construction from the compiler's flat, parent-indexed symbol list.
//!
//! The list is treated as an arena: the builder only derives a per-request
//! parent -> children index over it and never mutates it.

use std::collections::HashMap;
use std::path::Path;

use tower_lsp::lsp_types::{
    DocumentSymbol, DocumentSymbolResponse, Location, SymbolInformation, SymbolKind, Url,
};

use crate::compiler::{CompilerOptions, FrontEndError, Symbol, SymbolType};
use crate::lsp::capabilities::SymbolShape;
use crate::lsp::error::LspError;
use crate::lsp::position::symbol_range;
use crate::lsp::resolve::resolve;

pub fn symbol_kind(kind: SymbolType) -> SymbolKind {
    match kind {
        SymbolType::Module => SymbolKind::MODULE,
        SymbolType::Function | SymbolType::GenericProcedure => SymbolKind::FUNCTION,
        SymbolType::CustomOperator => SymbolKind::OPERATOR,
        SymbolType::Struct => SymbolKind::STRUCT,
        SymbolType::Enum => SymbolKind::ENUM,
        SymbolType::Variable => SymbolKind::VARIABLE,
        SymbolType::Class => SymbolKind::CLASS,
        SymbolType::ClassProcedure => SymbolKind::METHOD,
        SymbolType::Template => SymbolKind::TYPE_PARAMETER,
        SymbolType::Other => SymbolKind::FUNCTION,
    }
}

/// Builds the outline of the document at `document_path`.
///
/// Symbols that resolve to any other file are left out.
pub fn build(
    symbols: &[Symbol],
    document_path: &Path,
    options: &CompilerOptions,
    shape: SymbolShape,
) -> Result<DocumentSymbolResponse, LspError> {
    for (index, symbol) in symbols.iter().enumerate() {
        if let Some(parent) = symbol.parent_index.filter(|&parent| parent >= symbols.len()) {
            return Err(FrontEndError::MalformedSymbols(format!(
                "symbol {} ({}) has parent index {} but the list has {} entries",
                index,
                symbol.name,
                parent,
                symbols.len()
            ))
            .into());
        }
    }

    let mut kept = Vec::with_capacity(symbols.len());
    for (index, symbol) in symbols.iter().enumerate() {
        if resolve(&symbol.filename, options)? == document_path {
            kept.push(index);
        }
    }

    match shape {
        SymbolShape::Hierarchical => Ok(DocumentSymbolResponse::Nested(nested(symbols, &kept))),
        SymbolShape::Flat => flat(symbols, &kept, document_path).map(DocumentSymbolResponse::Flat),
    }
}

fn nested(symbols: &[Symbol], kept: &[usize]) -> Vec<DocumentSymbol> {
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for &index in kept {
        match symbols[index].parent_index {
            Some(parent) => children.entry(parent).or_default().push(index),
            None => roots.push(index),
        }
    }

    roots
        .into_iter()
        .map(|root| walk(symbols, root, &children))
        .collect()
}

// A node is only reachable through a chain of parents ending at a root, so
// the recursion always terminates even if the list contains cycles.
#[allow(deprecated)]
fn walk(symbols: &[Symbol], index: usize, children: &HashMap<usize, Vec<usize>>) -> DocumentSymbol {
    let symbol = &symbols[index];
    let range = symbol_range(&symbol.span);

    DocumentSymbol {
        name: symbol.name.clone(),
        detail: None,
        kind: symbol_kind(symbol.kind),
        tags: None,
        deprecated: None,
        range,
        selection_range: range,
        children: children.get(&index).map(|nodes| {
            nodes
                .iter()
                .map(|&child| walk(symbols, child, children))
                .collect()
        }),
    }
}

#[allow(deprecated)]
fn flat(
    symbols: &[Symbol],
    kept: &[usize],
    document_path: &Path,
) -> Result<Vec<SymbolInformation>, LspError> {
    let uri = Url::from_file_path(document_path)
        .map_err(|_| LspError::FileNotFound(document_path.display().to_string()))?;

    Ok(kept
        .iter()
        .map(|&index| {
            let symbol = &symbols[index];
            SymbolInformation {
                name: symbol.name.clone(),
                kind: symbol_kind(symbol.kind),
                tags: None,
                deprecated: None,
                location: Location::new(uri.clone(), symbol_range(&symbol.span)),
                container_name: symbol
                    .parent_index
                    .map(|parent| symbols[parent].name.clone()),
            }
        })
        .collect())
}
