//! Label tables from a typesetting engine's auxiliary output
//!
//!     Lines of interest look like `\newlabel{fig:a}{{\relax 3.1}{12}{caption}{}{}}`. The first
//!     group of the second argument is the display number, wrapped in whatever decorations the
//!     engine's numbering macros left behind.

use super::LabelTable;
use crate::markup::lexer::{command_at, parse_group, skip_whitespace};

const NEWLABEL: &str = "newlabel";

const DECORATIONS: [&str; 3] = ["\\relax", "\\ignorespaces", "\\protect"];

/// Read every `\newlabel` entry; the first entry for a label wins
pub fn harvest_aux_labels(aux: &str) -> LabelTable {
    let mut table = LabelTable::new();
    for line in aux.lines() {
        let Some((label, number)) = newlabel(line) else {
            continue;
        };
        if !table.insert_first(label, number) {
            tracing::debug!(label, "repeated aux label");
        }
    }
    table
}

fn newlabel(line: &str) -> Option<(&str, String)> {
    let start = skip_whitespace(line, 0);
    let (name, after) = command_at(line, start)?;
    if name != NEWLABEL {
        return None;
    }
    let (label, after) = parse_group(line, skip_whitespace(line, after)).ok()?;
    let (payload, _) = parse_group(line, skip_whitespace(line, after)).ok()?;
    let (number, _) = parse_group(payload, skip_whitespace(payload, 0)).ok()?;
    Some((label.trim(), clean_number(number)))
}

fn clean_number(raw: &str) -> String {
    let mut cleaned = raw.to_string();
    for decoration in DECORATIONS {
        cleaned = cleaned.replace(decoration, "");
    }
    cleaned.retain(|c| c != '{' && c != '}');
    cleaned.trim().to_string()
}
