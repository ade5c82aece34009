//! Exchange package interop for quiz documents
//!
//!     Converts between the quiz model of quiz-parser and LMS exchange packages (QTI 1.2 items,
//!     Canvas quiz metadata, an IMS manifest and web resources).
//!
//!     A [Package](package::Package) is just an ordered map of path → bytes. Zipping and unzipping
//!     belong to whoever calls this crate; this is a pure lib and never touches the filesystem,
//!     the environment or stdout.
//!
//!     Prompt HTML is handled through the [HtmlNormalizer](exchange::HtmlNormalizer) seam. The
//!     default implementation uses html5ever; XML documents are built and read with
//!     markup5ever_rcdom trees and xml5ever.
//!
//!     The file structure :
//!     .
//!     ├── error.rs                # CodecError
//!     ├── package.rs              # Package, Asset, quiz hash identifiers and paths
//!     ├── exchange
//!     │   ├── build.rs            # model -> package
//!     │   ├── parse.rs            # package -> model
//!     │   ├── manifest.rs         # imsmanifest.xml
//!     │   ├── shapes.rs           # question_type dispatch
//!     │   ├── html.rs             # Prompt rendering and normalization
//!     │   └── xml.rs              # DOM helpers
//!     └── lib.rs
//!
//! Testing
//!     tests
//!     ├── exchange_roundtrip.rs   # markup -> package -> model, proptest
//!     └── exchange_import.rs      # Hand-written packages: down-conversions, unknown types

pub mod error;
pub mod exchange;
pub mod package;

pub use error::CodecError;
pub use exchange::{
    build_package, parse_package, parse_package_with, ExportOptions, ExportOutput,
    FillBlankExportMode, ImportOptions, ImportOutput,
};
pub use package::{Asset, Package, QuizPaths};
