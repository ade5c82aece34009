//! The exchange package codec (Canvas-flavoured QTI 1.2)
//!
//!     [build_package] writes one items document and one metadata document per quiz, a manifest
//!     listing them, and the asset blobs. [parse_package] reads them back. Both directions report
//!     per-item problems as warnings and keep going.
//!
//!     Round trip: anything the markup parser produces survives build → parse unchanged, as long
//!     as accepted answers do not contain the combined delimiter.

pub mod build;
pub mod html;
pub mod manifest;
pub mod parse;
pub mod shapes;
pub(crate) mod xml;

pub use build::{build_package, ExportOptions, ExportOutput, FillBlankExportMode};
pub use html::{DefaultNormalizer, HtmlNormalizer, NormalizedHtml};
pub use parse::{parse_package, parse_package_with, ImportOptions, ImportOutput};
pub use shapes::ItemShape;

/// Joins the accepted answers of a multi-blank question into one short-answer value
pub const DEFAULT_COMBINED_DELIMITER: &str = "; ";

/// Split items carry `uid#k`
pub const SPLIT_SEPARATOR: char = '#';

pub(crate) const ASSESSMENT_NS: &str = "http://www.imsglobal.org/xsd/ims_qtiasiv1p2";
pub(crate) const QUIZ_META_NS: &str = "http://canvas.instructure.com/xsd/cccv1p0";
pub(crate) const RESPONSE_IDENT: &str = "response1";
pub(crate) const FEEDBACK_IDENT: &str = "general_fb";
pub(crate) const HTML_TEXT: &str = "text/html";
pub(crate) const PLAIN_TEXT: &str = "text/plain";
