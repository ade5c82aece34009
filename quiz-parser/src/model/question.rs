use super::id::{QuestionId, Uid};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder left in a fill-blank prompt wherever a blank marker stood
pub const BLANK_SENTINEL: &str = "[[blank]]";

/// Choice keys, contiguous from `A`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChoiceKey {
    A,
    B,
    C,
    D,
    E,
}

impl ChoiceKey {
    pub const ALL: [ChoiceKey; 5] = [
        ChoiceKey::A,
        ChoiceKey::B,
        ChoiceKey::C,
        ChoiceKey::D,
        ChoiceKey::E,
    ];

    /// Key for a 0-based position
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'A' => Some(ChoiceKey::A),
            'B' => Some(ChoiceKey::B),
            'C' => Some(ChoiceKey::C),
            'D' => Some(ChoiceKey::D),
            'E' => Some(ChoiceKey::E),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub key: ChoiceKey,
    pub text: String,
}

impl Choice {
    /// Assign keys `A..` to texts in order; texts past `E` are dropped
    pub fn keyed<I, S>(texts: I) -> Vec<Choice>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .zip(ChoiceKey::ALL)
            .map(|(text, key)| Choice {
                key,
                text: text.into(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleChoice {
    pub uid: Uid,
    pub prompt: String,
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillBlank {
    pub uid: Uid,
    /// Prompt with every blank replaced by [BLANK_SENTINEL]
    pub prompt: String,
    pub blank_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    SingleChoice(SingleChoice),
    FillBlank(FillBlank),
}

impl Question {
    pub fn uid(&self) -> &Uid {
        match self {
            Question::SingleChoice(q) => &q.uid,
            Question::FillBlank(q) => &q.uid,
        }
    }

    pub fn id(&self) -> &QuestionId {
        &self.uid().id
    }

    pub fn prompt(&self) -> &str {
        match self {
            Question::SingleChoice(q) => &q.prompt,
            Question::FillBlank(q) => &q.prompt,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Question::SingleChoice(_) => "single_choice",
            Question::FillBlank(_) => "fill_blank",
        }
    }
}

/// An ordered set of questions forming one quiz version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDocument {
    pub version_id: String,
    pub version_index: u32,
    pub questions: Vec<Question>,
}

impl QuizDocument {
    pub fn new(version_id: impl Into<String>, version_index: u32) -> Self {
        QuizDocument {
            version_id: version_id.into(),
            version_index,
            questions: Vec::new(),
        }
    }

    pub fn with_questions(mut self, questions: Vec<Question>) -> Self {
        self.questions = questions;
        self
    }
}

/// Count sentinel occurrences in a masked prompt
pub fn count_blanks(prompt: &str) -> usize {
    prompt.matches(BLANK_SENTINEL).count()
}
