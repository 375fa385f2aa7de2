//! Go-to-definition and rename results.
//!
//! Both use the closed-range convention of `position::closed_range`.

use std::collections::HashMap;
use std::path::Path;

use tower_lsp::lsp_types::{
    GotoDefinitionResponse, Location, LocationLink, TextEdit, Url, WorkspaceEdit,
};

use crate::compiler::{CompilerOptions, Symbol};
use crate::lsp::capabilities::DefinitionShape;
use crate::lsp::error::LspError;
use crate::lsp::position::closed_range;
use crate::lsp::resolve::{normalize, resolve};

fn target_uri(symbol: &Symbol, options: &CompilerOptions) -> Result<Url, LspError> {
    let path = resolve(&symbol.filename, options)?;
    Url::from_file_path(&path).map_err(|_| LspError::FileNotFound(path.display().to_string()))
}

/// Maps name-lookup results. No symbols means no result, not an empty list.
pub fn definition(
    symbols: &[Symbol],
    options: &CompilerOptions,
    shape: DefinitionShape,
) -> Result<Option<GotoDefinitionResponse>, LspError> {
    if symbols.is_empty() {
        return Ok(None);
    }

    let response = match shape {
        DefinitionShape::Links => GotoDefinitionResponse::Link(
            symbols
                .iter()
                .map(|symbol| {
                    let range = closed_range(&symbol.span);
                    Ok(LocationLink {
                        origin_selection_range: None,
                        target_uri: target_uri(symbol, options)?,
                        target_range: range,
                        target_selection_range: range,
                    })
                })
                .collect::<Result<_, LspError>>()?,
        ),
        DefinitionShape::Locations => GotoDefinitionResponse::Array(
            symbols
                .iter()
                .map(|symbol| {
                    Ok(Location::new(
                        target_uri(symbol, options)?,
                        closed_range(&symbol.span),
                    ))
                })
                .collect::<Result<_, LspError>>()?,
        ),
    };

    Ok(Some(response))
}

/// Builds the rename edit for the requesting document.
///
/// Only occurrences naming `document_path` are edited; the edit never
/// touches other files, even when the compiler reports occurrences there.
/// A filename matches when it normalizes to the document path, or when it
/// resolves there through the include directories. Occurrences in files
/// that cannot be found are skipped.
pub fn rename(
    uri: &Url,
    document_path: &Path,
    occurrences: &[Symbol],
    options: &CompilerOptions,
    new_name: &str,
) -> Option<WorkspaceEdit> {
    let edits: Vec<TextEdit> = occurrences
        .iter()
        .filter(|occurrence| names_document(&occurrence.filename, document_path, options))
        .map(|occurrence| TextEdit::new(closed_range(&occurrence.span), new_name.to_string()))
        .collect();

    if edits.is_empty() {
        return None;
    }

    Some(WorkspaceEdit {
        changes: Some(HashMap::from([(uri.clone(), edits)])),
        ..Default::default()
    })
}

fn names_document(filename: &str, document_path: &Path, options: &CompilerOptions) -> bool {
    normalize(Path::new(filename)) == document_path
        || resolve(filename, options).is_ok_and(|path| path == document_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Span, SymbolType};
    use tempfile::TempDir;
    use tower_lsp::lsp_types::{Position, Range};

    fn symbol(filename: &str, span: Span) -> Symbol {
        Symbol {
            name: "x".to_string(),
            kind: SymbolType::Variable,
            filename: filename.to_string(),
            span,
            parent_index: None,
        }
    }

    fn source_file(dir: &TempDir, name: &str) -> String {
        let path = normalize(&dir.path().join(name));
        std::fs::write(&path, "").unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn empty_lookup_is_no_result() {
        let result = definition(&[], &CompilerOptions::default(), DefinitionShape::Links).unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn locations_use_closed_ranges() {
        let dir = TempDir::new().unwrap();
        let file = source_file(&dir, "main.f90");

        let result = definition(
            &[symbol(&file, Span::new(4, 9, 4, 13))],
            &CompilerOptions::default(),
            DefinitionShape::Locations,
        )
        .unwrap();

        assert_eq!(
            result,
            Some(GotoDefinitionResponse::Array(vec![Location::new(
                Url::from_file_path(&file).unwrap(),
                Range::new(Position::new(3, 8), Position::new(3, 12)),
            )]))
        );
    }

    #[test]
    fn links_resolve_through_include_dirs() {
        let dir = TempDir::new().unwrap();
        let include = dir.path().join("include");
        std::fs::create_dir_all(&include).unwrap();
        std::fs::write(include.join("mod.f90"), "").unwrap();
        let options = CompilerOptions {
            include_dirs: vec![include.clone()],
            ..Default::default()
        };

        let Some(GotoDefinitionResponse::Link(links)) = definition(
            &[symbol("mod.f90", Span::new(1, 8, 1, 10))],
            &options,
            DefinitionShape::Links,
        )
        .unwrap() else {
            panic!("expected links");
        };

        let range = Range::new(Position::new(0, 7), Position::new(0, 9));
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].target_uri,
            Url::from_file_path(normalize(&include.join("mod.f90"))).unwrap()
        );
        assert_eq!(links[0].target_range, range);
        assert_eq!(links[0].target_selection_range, range);
    }

    #[test]
    fn unresolvable_definition_fails() {
        let err = definition(
            &[symbol("gone.f90", Span::new(1, 1, 1, 1))],
            &CompilerOptions::default(),
            DefinitionShape::Locations,
        )
        .unwrap_err();

        assert!(matches!(err, LspError::FileNotFound(_)));
    }

    #[test]
    fn rename_edits_only_the_requesting_document() {
        let dir = TempDir::new().unwrap();
        let main = source_file(&dir, "main.f90");
        let other = source_file(&dir, "other.f90");
        let uri = Url::from_file_path(&main).unwrap();
        let occurrences = vec![
            symbol(&main, Span::new(2, 5, 2, 7)),
            symbol(&other, Span::new(9, 1, 9, 3)),
            symbol(&main, Span::new(6, 12, 6, 14)),
        ];

        let edit = rename(
            &uri,
            Path::new(&main),
            &occurrences,
            &CompilerOptions::default(),
            "total",
        )
        .unwrap();

        let changes = edit.changes.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[&uri],
            vec![
                TextEdit::new(
                    Range::new(Position::new(1, 4), Position::new(1, 6)),
                    "total".to_string()
                ),
                TextEdit::new(
                    Range::new(Position::new(5, 11), Position::new(5, 13)),
                    "total".to_string()
                ),
            ]
        );
    }

    #[test]
    fn rename_without_local_occurrences_is_no_result() {
        let dir = TempDir::new().unwrap();
        let main = source_file(&dir, "main.f90");
        let other = source_file(&dir, "other.f90");
        let uri = Url::from_file_path(&main).unwrap();
        let options = CompilerOptions::default();

        assert_eq!(
            rename(&uri, Path::new(&main), &[], &options, "total"),
            None
        );
        assert_eq!(
            rename(
                &uri,
                Path::new(&main),
                &[symbol(&other, Span::new(1, 1, 1, 2))],
                &options,
                "total"
            ),
            None
        );
    }

    #[test]
    fn rename_in_a_document_not_yet_saved() {
        let dir = TempDir::new().unwrap();
        let main = normalize(&dir.path().join("scratch.f90"));
        let uri = Url::from_file_path(&main).unwrap();
        let filename = main.to_str().unwrap();

        let edit = rename(
            &uri,
            &main,
            &[
                symbol(filename, Span::new(1, 9, 1, 15)),
                symbol("missing.inc", Span::new(3, 1, 3, 2)),
            ],
            &CompilerOptions::default(),
            "total",
        )
        .unwrap();

        assert_eq!(
            edit.changes.unwrap()[&uri],
            vec![TextEdit::new(
                Range::new(Position::new(0, 8), Position::new(0, 14)),
                "total".to_string()
            )]
        );
    }

    #[test]
    fn rename_follows_include_relative_names() {
        let dir = TempDir::new().unwrap();
        let include = dir.path().join("include");
        std::fs::create_dir_all(&include).unwrap();
        let header = normalize(&include.join("consts.inc"));
        std::fs::write(&header, "").unwrap();
        let uri = Url::from_file_path(&header).unwrap();
        let options = CompilerOptions {
            include_dirs: vec![include],
            ..Default::default()
        };

        let edit = rename(
            &uri,
            &header,
            &[symbol("consts.inc", Span::new(2, 3, 2, 4))],
            &options,
            "total",
        )
        .unwrap();

        assert_eq!(edit.changes.unwrap()[&uri].len(), 1);
    }
}
