//! Reference rewriting against a [LabelTable]

use super::LabelTable;
use crate::markup::lexer::{command_at, parse_group, skip_whitespace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language for figure-style references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// Noun put in front of a figure reference
    pub fn figure_noun(self) -> &'static str {
        match self {
            Language::Vietnamese => "Hình",
            Language::English => "Figure",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Vietnamese => "vi",
            Language::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vi" | "vietnamese" => Ok(Language::Vietnamese),
            "en" | "english" => Ok(Language::English),
            other => Err(format!("Unknown language '{}' (expected vi or en)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Plain,
    Equation,
    Figure,
}

impl Reference {
    fn of(command: &str) -> Option<Self> {
        match command {
            "ref" => Some(Reference::Plain),
            "eqref" => Some(Reference::Equation),
            "figref" => Some(Reference::Figure),
            _ => None,
        }
    }

    fn render(self, number: &str, language: Language) -> String {
        match self {
            Reference::Plain => number.to_string(),
            Reference::Equation => format!("({})", number),
            Reference::Figure => format!("{} {}", language.figure_noun(), number),
        }
    }
}

/// Replace `\ref`, `\eqref` and `\figref` commands by their display numbers.
///
/// An unknown label renders as the label itself. Escaped commands and commands without a
/// well-formed group are left untouched.
pub fn replace_references(text: &str, labels: &LabelTable, language: Language) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            pos += 1;
            continue;
        }
        let Some((name, after)) = command_at(text, pos) else {
            pos += 2;
            continue;
        };
        let Some(reference) = Reference::of(name) else {
            pos = after;
            continue;
        };
        let Ok((label, end)) = parse_group(text, skip_whitespace(text, after)) else {
            pos = after;
            continue;
        };

        let label = label.trim();
        let number = labels.get(label).unwrap_or_else(|| {
            tracing::debug!(label, "unresolved reference");
            label
        });
        out.push_str(&text[copied..pos]);
        out.push_str(&reference.render(number, language));
        copied = end;
        pos = end;
    }

    out.push_str(&text[copied..]);
    out
}
