//! Records reported by the compiler front-end.
//!
//! Every line and column here is 1-based and inclusive at both ends.
//! Translation into protocol coordinates lives in `lsp::position`.

use serde::{Deserialize, Serialize};

/// An inclusive source region in compiler coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub first_line: u32,
    pub first_column: u32,
    pub last_line: u32,
    pub last_column: u32,
}

impl Span {
    pub fn new(first_line: u32, first_column: u32, last_line: u32, last_column: u32) -> Self {
        Self {
            first_line,
            first_column,
            last_line,
            last_column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
    #[serde(other)]
    Unknown,
}

/// One problem reported by `show_errors`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(flatten)]
    pub span: Span,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolType {
    Module,
    Function,
    GenericProcedure,
    CustomOperator,
    Struct,
    Enum,
    Variable,
    Class,
    ClassProcedure,
    Template,
    #[serde(other)]
    Other,
}

/// A named source entity.
///
/// Returned by name lookup, occurrence search and symbol listing. In a
/// `get_symbols` result, `parent_index` points into the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolType,
    pub filename: String,
    #[serde(flatten)]
    pub span: Span,
    #[serde(default)]
    pub parent_index: Option<usize>,
}
