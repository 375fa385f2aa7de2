//! Translation between compiler coordinates (1-based, inclusive at both
//! ends) and protocol coordinates (0-based).
//!
//! Each feature keeps its own end convention:
//! - diagnostics and document symbols: end column is not decremented
//! - definition and rename: both columns are decremented, closed range

use tower_lsp::lsp_types::{Position, Range};

use crate::compiler::Span;

/// Converts a protocol cursor into compiler `(line, column)`.
pub fn to_native(position: Position) -> (u32, u32) {
    (position.line + 1, position.character + 1)
}

fn start(span: &Span) -> Position {
    Position::new(
        span.first_line.saturating_sub(1),
        span.first_column.saturating_sub(1),
    )
}

/// Range of a published diagnostic.
pub fn diagnostic_range(span: &Span) -> Range {
    Range::new(
        start(span),
        Position::new(span.last_line.saturating_sub(1), span.last_column),
    )
}

/// Range of a definition target or rename edit.
pub fn closed_range(span: &Span) -> Range {
    Range::new(
        start(span),
        Position::new(
            span.last_line.saturating_sub(1),
            span.last_column.saturating_sub(1),
        ),
    )
}

/// Range of a document symbol, in both flat and hierarchical results.
pub fn symbol_range(span: &Span) -> Range {
    diagnostic_range(span)
}
