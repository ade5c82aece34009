//! Command vocabulary of the source markup
//!
//!     These names are the wire contract with authoring tools. Changing any of them breaks
//!     every existing question bank.

/// `\baitracnghiem{id}{prompt}{choicesBlock}{solution}`
pub const SINGLE_CHOICE: &str = "baitracnghiem";

/// `\baidienkhuyet[..][..]{id}{prompt}{solution}`
pub const FILL_BLANK: &str = "baidienkhuyet";

/// Optional bracket arguments accepted (and ignored) by the fill-blank command
pub const FILL_BLANK_MAX_OPTIONAL: usize = 2;

/// Arity markers opening a choices block, indexed by choice count
const ARITY_MARKERS: [(&str, usize); 4] = [("haipa", 2), ("bapa", 3), ("bonpa", 4), ("nampa", 5)];

/// Marker used when rendering a choice count with no marker of its own
pub const FALLBACK_ARITY_MARKER: &str = "bonpa";

/// Inline fill-blank markers whose group holds an accepted answer
pub const ANSWER_MARKERS: [&str; 2] = ["blank", "answer"];

/// Inline fill-blank marker with no accepted answer
pub const BARE_MARKER: &str = "daugach";

/// Marker the builder writes for blanks that carry an answer
pub const BUILDER_ANSWER_MARKER: &str = "blank";

pub fn arity_of(marker: &str) -> Option<usize> {
    ARITY_MARKERS
        .iter()
        .find(|(name, _)| *name == marker)
        .map(|(_, arity)| *arity)
}

/// Marker for a choice count, falling back to the 4-way marker
pub fn marker_for(arity: usize) -> &'static str {
    ARITY_MARKERS
        .iter()
        .find(|(_, n)| *n == arity)
        .map(|(name, _)| *name)
        .unwrap_or(FALLBACK_ARITY_MARKER)
}

pub fn is_answer_marker(name: &str) -> bool {
    ANSWER_MARKERS.contains(&name)
}
