use super::id::Uid;
use super::question::ChoiceKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleChoiceAnswer {
    pub correct_key: ChoiceKey,
    pub points: Option<f64>,
    pub solution_markup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillBlankAnswer {
    pub blank_count: usize,
    /// One accepted answer per blank, in blank order
    pub accepted_answers: Vec<String>,
    pub points: Option<f64>,
    pub solution_markup: Option<String>,
    pub notes: Option<String>,
}

impl FillBlankAnswer {
    /// Answer whose blank count is derived from the accepted answers
    pub fn from_answers(accepted_answers: Vec<String>) -> Self {
        FillBlankAnswer {
            blank_count: accepted_answers.len(),
            accepted_answers,
            points: None,
            solution_markup: None,
            notes: None,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.accepted_answers.len() == self.blank_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    SingleChoice(SingleChoiceAnswer),
    FillBlank(FillBlankAnswer),
}

impl Answer {
    pub fn solution_markup(&self) -> Option<&str> {
        match self {
            Answer::SingleChoice(a) => a.solution_markup.as_deref(),
            Answer::FillBlank(a) => a.solution_markup.as_deref(),
        }
    }

    pub fn points(&self) -> Option<f64> {
        match self {
            Answer::SingleChoice(a) => a.points,
            Answer::FillBlank(a) => a.points,
        }
    }
}

/// Answers keyed by question uid; at most one entry per uid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerKey {
    entries: BTreeMap<Uid, Answer>,
}

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an answer, returning the one it replaced
    pub fn insert(&mut self, uid: Uid, answer: Answer) -> Option<Answer> {
        self.entries.insert(uid, answer)
    }

    pub fn get(&self, uid: &Uid) -> Option<&Answer> {
        self.entries.get(uid)
    }

    pub fn contains(&self, uid: &Uid) -> bool {
        self.entries.contains_key(uid)
    }

    pub fn remove(&mut self, uid: &Uid) -> Option<Answer> {
        self.entries.remove(uid)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Uid, &Answer)> {
        self.entries.iter()
    }

    pub fn single_choice(&self, uid: &Uid) -> Option<&SingleChoiceAnswer> {
        match self.entries.get(uid) {
            Some(Answer::SingleChoice(answer)) => Some(answer),
            _ => None,
        }
    }

    pub fn fill_blank(&self, uid: &Uid) -> Option<&FillBlankAnswer> {
        match self.entries.get(uid) {
            Some(Answer::FillBlank(answer)) => Some(answer),
            _ => None,
        }
    }
}

impl Extend<(Uid, Answer)> for AnswerKey {
    fn extend<T: IntoIterator<Item = (Uid, Answer)>>(&mut self, iter: T) {
        self.entries.extend(iter)
    }
}

impl FromIterator<(Uid, Answer)> for AnswerKey {
    fn from_iter<T: IntoIterator<Item = (Uid, Answer)>>(iter: T) -> Self {
        AnswerKey {
            entries: iter.into_iter().collect(),
        }
    }
}
