//! Recoverable defects collected during conversion
//!
//!     A bad question or item never aborts a batch. Converters push a [Warning] and carry on
//!     with best-effort output; callers decide how to surface them.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Bad id, bad choice block, missing argument: the question is skipped
    MalformedQuestion,
    /// No correct key or accepted answers could be resolved
    MissingAnswerData,
    /// Exchange item with a question type outside the supported set
    UnknownQuestionType,
    /// Down-conversion across question shapes
    LossyConversion,
    /// Asset placeholder or image source without a matching blob
    UnresolvedAsset,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WarningKind::MalformedQuestion => "malformed-question",
            WarningKind::MissingAnswerData => "missing-answer-data",
            WarningKind::UnknownQuestionType => "unknown-question-type",
            WarningKind::LossyConversion => "lossy-conversion",
            WarningKind::UnresolvedAsset => "unresolved-asset",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Question id, uid or item ident the warning is about, when known
    pub subject: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Warning {
            kind,
            subject: None,
            message: message.into(),
        }
    }

    pub fn about(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Accumulates warnings and mirrors each one to the log
#[derive(Debug, Default)]
pub struct Warnings {
    items: Vec<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        tracing::warn!(kind = %warning.kind, subject = ?warning.subject, "{}", warning.message);
        self.items.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items
    }
}
