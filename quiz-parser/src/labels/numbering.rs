//! Sequential label numbering
//!
//!     One counter is shared by every numbered thing in a batch, so a figure, then an equation,
//!     then a figure number 1, 2, 3. What consumes a tick depends on the innermost block around a
//!     label:
//!
//!     - Figure-like block: one tick when the block opens; every label inside shares it.
//!     - Math block: one tick per label inside it.
//!     - Minipage group: a maximal run of minipages separated only by whitespace or `~`. The group
//!       ticks once, lazily, at its first figure-like block or first label outside math. A group
//!       with neither consumes nothing.
//!     - Outside any block: labels are left unnumbered.
//!
//!     A minipage inside a figure-like block is only layout: the figure already owns the number.

use super::tokens::{argument, tokenize, LabelToken};
use super::LabelTable;
use crate::markup::lexer::strip_comments;

const FIGURE_LIKE: [&str; 6] = [
    "figure",
    "figure*",
    "table",
    "table*",
    "wrapfigure",
    "wraptable",
];

const MATH: [&str; 7] = [
    "equation", "align", "gather", "multline", "eqnarray", "alignat", "flalign",
];

const MINIPAGE: &str = "minipage";

/// The batch-scoped counter. Pass one cursor through every document of a batch, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberingCursor {
    current: u32,
}

impl NumberingCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the new number
    pub fn tick(&mut self) -> u32 {
        self.current += 1;
        self.current
    }

    /// Last number handed out, 0 before the first tick
    pub fn current(&self) -> u32 {
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    FigureLike,
    Math,
    Minipage,
    Other,
}

impl BlockKind {
    fn of(name: &str) -> Self {
        let base = name.strip_suffix('*').unwrap_or(name);
        if FIGURE_LIKE.contains(&name) {
            BlockKind::FigureLike
        } else if MATH.contains(&base) {
            BlockKind::Math
        } else if name == MINIPAGE {
            BlockKind::Minipage
        } else {
            BlockKind::Other
        }
    }
}

#[derive(Debug)]
struct Frame<'a> {
    name: &'a str,
    kind: BlockKind,
    /// Number owned by a figure-like block
    number: Option<u32>,
}

/// Scanner state; the current state is the innermost numbered frame on `stack`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InFigureLikeBlock(u32),
    InMathBlock,
    InMinipageGroup,
}

#[derive(Debug, Default)]
struct MinipageGroup {
    number: Option<u32>,
    /// Every minipage of the group is closed; only a gap or another minipage may follow
    closed: bool,
}

struct Numbering<'c, 'a> {
    cursor: &'c mut NumberingCursor,
    table: LabelTable,
    stack: Vec<Frame<'a>>,
    group: Option<MinipageGroup>,
}

impl<'c, 'a> Numbering<'c, 'a> {
    fn state(&self) -> State {
        for frame in self.stack.iter().rev() {
            match frame.kind {
                BlockKind::FigureLike => {
                    if let Some(number) = frame.number {
                        return State::InFigureLikeBlock(number);
                    }
                }
                BlockKind::Math => return State::InMathBlock,
                BlockKind::Minipage => return State::InMinipageGroup,
                BlockKind::Other => {}
            }
        }
        State::Outside
    }

    fn group_number(&mut self) -> u32 {
        let cursor = &mut *self.cursor;
        let group = self.group.get_or_insert_with(MinipageGroup::default);
        *group.number.get_or_insert_with(|| cursor.tick())
    }

    fn in_figure_like(&self) -> bool {
        self.stack.iter().any(|f| f.kind == BlockKind::FigureLike)
    }

    fn begin(&mut self, name: &'a str) {
        let mut kind = BlockKind::of(name);
        let mut number = None;
        match kind {
            BlockKind::FigureLike => {
                number = Some(match self.state() {
                    State::InFigureLikeBlock(outer) => outer,
                    State::InMinipageGroup => self.group_number(),
                    _ => self.cursor.tick(),
                });
            }
            BlockKind::Minipage if self.in_figure_like() => kind = BlockKind::Other,
            BlockKind::Minipage => match &mut self.group {
                Some(group) => group.closed = false,
                None => self.group = Some(MinipageGroup::default()),
            },
            _ => {}
        }
        self.stack.push(Frame { name, kind, number });
    }

    fn end(&mut self, name: &str) {
        let Some(at) = self.stack.iter().rposition(|f| f.name == name) else {
            tracing::debug!(environment = name, "end without matching begin");
            return;
        };
        let closed: Vec<Frame<'a>> = self.stack.drain(at..).collect();
        let closes_minipage = closed.iter().any(|f| f.kind == BlockKind::Minipage);
        let still_in_minipage = self.stack.iter().any(|f| f.kind == BlockKind::Minipage);
        if closes_minipage && !still_in_minipage {
            if let Some(group) = &mut self.group {
                group.closed = true;
            }
        }
    }

    fn label(&mut self, label: &str) {
        let number = match self.state() {
            State::InFigureLikeBlock(number) => number,
            State::InMathBlock => self.cursor.tick(),
            State::InMinipageGroup => self.group_number(),
            State::Outside => {
                tracing::debug!(label, "label outside any numbered block");
                return;
            }
        };
        if !self.table.insert_first(label, number.to_string()) {
            tracing::warn!(label, "duplicate label, keeping the first number");
        }
    }

    /// Any content after the last minipage ends the group
    fn interrupt(&mut self) {
        if matches!(&self.group, Some(group) if group.closed) {
            self.group = None;
        }
    }

    fn feed(&mut self, token: LabelToken, slice: &'a str) {
        if token.is_gap() {
            return;
        }
        let continues_group = token == LabelToken::Begin && argument(slice) == MINIPAGE;
        if !continues_group {
            self.interrupt();
        }
        match token {
            LabelToken::Begin => self.begin(argument(slice)),
            LabelToken::End => self.end(argument(slice)),
            LabelToken::Label => self.label(argument(slice)),
            _ => {}
        }
    }
}

/// Number labels across a batch of documents with a fresh counter
pub fn collect_sequential_labels<S: AsRef<str>>(documents: &[S]) -> LabelTable {
    let mut cursor = NumberingCursor::new();
    collect_labels_with(documents, &mut cursor)
}

/// Number labels across a batch of documents, continuing from `cursor`
pub fn collect_labels_with<S: AsRef<str>>(
    documents: &[S],
    cursor: &mut NumberingCursor,
) -> LabelTable {
    let source = documents
        .iter()
        .map(|doc| strip_comments(doc.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join("\n");

    let mut numbering = Numbering {
        cursor,
        table: LabelTable::new(),
        stack: Vec::new(),
        group: None,
    };
    for (token, slice) in tokenize(&source) {
        numbering.feed(token, slice);
    }

    tracing::debug!(
        labels = numbering.table.len(),
        counter = numbering.cursor.current(),
        "numbered labels"
    );
    numbering.table
}
