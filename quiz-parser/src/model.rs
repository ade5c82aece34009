//! Structured quiz data shared by every converter
//!
//!     [QuizDocument] and [AnswerKey] are independent values correlated only by [Uid]. Neither
//!     borrows from the text or package it was built from.

mod answer;
mod id;
mod question;

pub use answer::{Answer, AnswerKey, FillBlankAnswer, SingleChoiceAnswer};
pub use id::{IdError, Level, QuestionId, Uid};
pub use question::{
    count_blanks, Choice, ChoiceKey, FillBlank, Question, QuizDocument, SingleChoice,
    BLANK_SENTINEL,
};
