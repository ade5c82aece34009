//! Error types for scanning and parsing source markup
//!
//!     Only structural damage (a group that never closes) is an error. Everything else the
//!     parser can step over is reported as a [Warning](crate::warning::Warning) instead.

use std::fmt;

/// Errors raised by the brace-aware lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// A group was opened at `offset` and depth never returned to zero
    UnbalancedGroup { open: char, offset: usize },
    /// A group was expected at `offset` but the opening delimiter is not there
    MissingGroup { open: char, offset: usize },
}

impl LexError {
    pub fn offset(&self) -> usize {
        match self {
            LexError::UnbalancedGroup { offset, .. } | LexError::MissingGroup { offset, .. } => {
                *offset
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnbalancedGroup { open, offset } => {
                write!(f, "Unbalanced group: '{}' at offset {} is never closed", open, offset)
            }
            LexError::MissingGroup { open, offset } => {
                write!(f, "Expected '{}' at offset {}", open, offset)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Why a single-choice question's choices block was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidChoiceBlock {
    MissingMarker,
    UnknownMarker(String),
    ChoiceCount { arity: usize, found: usize },
    InvalidCorrect(String),
    CorrectOutOfRange { correct: String, arity: usize },
    TrailingContent(String),
    Lex(LexError),
}

impl fmt::Display for InvalidChoiceBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid choice block: ")?;
        match self {
            InvalidChoiceBlock::MissingMarker => write!(f, "missing arity marker"),
            InvalidChoiceBlock::UnknownMarker(name) => write!(f, "unknown marker '\\{}'", name),
            InvalidChoiceBlock::ChoiceCount { arity, found } => {
                write!(f, "expected {} choices, found {}", arity, found)
            }
            InvalidChoiceBlock::InvalidCorrect(raw) => {
                write!(f, "correct answer '{}' is neither a letter nor a number", raw)
            }
            InvalidChoiceBlock::CorrectOutOfRange { correct, arity } => {
                write!(f, "correct answer '{}' is outside {} choices", correct, arity)
            }
            InvalidChoiceBlock::TrailingContent(rest) => {
                write!(f, "unexpected content after choices: '{}'", rest)
            }
            InvalidChoiceBlock::Lex(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for InvalidChoiceBlock {}

/// Line/column position of a byte offset (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        Location {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Fatal errors of a whole-document parse
#[derive(Debug, Clone)]
pub enum ParseError {
    /// Unbalanced braces or brackets. Aborts the enclosing document.
    Structural {
        open: char,
        location: Location,
        source_context: String,
    },
}

impl ParseError {
    pub(crate) fn structural(source: &str, error: &LexError) -> Self {
        let open = match error {
            LexError::UnbalancedGroup { open, .. } | LexError::MissingGroup { open, .. } => *open,
        };
        let location = Location::from_offset(source, error.offset());
        ParseError::Structural {
            open,
            location,
            source_context: format_source_context(source, location.line),
        }
    }

    pub fn location(&self) -> Location {
        match self {
            ParseError::Structural { location, .. } => *location,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Structural {
                open,
                location,
                source_context,
            } => {
                writeln!(f, "Error: unbalanced '{}' group at {}", open, location)?;
                writeln!(f)?;
                write!(f, "{}", source_context)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Format source code context around an error line (1-based)
///
/// Shows 2 lines before the error, the error line with >> marker, and 2 lines after.
pub fn format_source_context(source: &str, line: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let error_line = line.saturating_sub(1);

    let start_line = error_line.saturating_sub(2);
    let end_line = (error_line + 3).min(lines.len());

    let mut context = String::new();
    for (line_num, text) in lines.iter().enumerate().take(end_line).skip(start_line) {
        let marker = if line_num == error_line { ">>" } else { "  " };
        context.push_str(&format!("{} {:3} | {}\n", marker, line_num + 1, text));
    }
    context
}
