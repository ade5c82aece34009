//! Quiz source markup: model, parser, builder and label numbering
//!
//!     This crate owns the structured quiz model ([QuizDocument](model::QuizDocument),
//!     [AnswerKey](model::AnswerKey)) and everything that reads or writes the brace-delimited
//!     authoring markup. The exchange package lives in quiz-babel, which builds on this model.
//!
//!     This is a pure lib: no printing, no environment, no filesystem. Recoverable defects come
//!     back as [Warning](warning::Warning) values next to the output (and are mirrored to
//!     `tracing`); only structural damage is an error.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # LexError, ParseError, source context formatting
//!     ├── warning.rs              # Warning kinds and the collecting list
//!     ├── model                   # Questions, answers, ids and uids
//!     ├── markup
//!     │   ├── lexer.rs            # Brace-aware scanning primitives
//!     │   ├── commands.rs         # Command vocabulary
//!     │   ├── parser.rs           # markup -> model
//!     │   └── builder.rs          # model -> markup
//!     └── labels
//!         ├── tokens.rs           # logos tokens for label scanning
//!         ├── numbering.rs        # The sequential numbering state machine
//!         ├── references.rs       # \ref, \eqref, \figref rewriting
//!         └── harvest.rs          # Label tables from aux files
//!
//! Testing
//!     tests
//!     ├── markup_parse.rs         # Parser scenarios
//!     ├── markup_roundtrip.rs     # parse(build(x)) == x, proptest
//!     └── labels.rs               # Numbering scenarios and reference rewriting

pub mod error;
pub mod labels;
pub mod markup;
pub mod model;
pub mod warning;

pub use error::{LexError, ParseError};
pub use warning::{Warning, WarningKind, Warnings};
