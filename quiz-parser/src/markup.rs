//! Source markup conversion
//!
//!     The brace-delimited authoring language, in both directions:
//!         1. Lexing: escape-aware group scanning and comment stripping. See [lexer].
//!         2. Parsing: markup to [QuizDocument](crate::model::QuizDocument) plus
//!            [AnswerKey](crate::model::AnswerKey). See [parser].
//!         3. Building: the inverse of parsing. See [builder].
//!
//!     The command names themselves live in [commands].

pub mod builder;
pub mod commands;
pub mod lexer;
pub mod parser;

pub use builder::{build, inline_answers, BuildOptions};
pub use parser::{parse, ParseOptions, ParseOutput, DEFAULT_VERSION_INDEX, MIXED_VERSION_ID};
