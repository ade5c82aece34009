//! Source markup rendering (QuizDocument + AnswerKey → markup)
//!
//!     The inverse of [parse](super::parser::parse). Output is one command per line with a blank
//!     line between questions; re-parsing it yields the same document and answer key for anything
//!     the parser produced in the first place.

use super::commands;
use super::lexer::find_unescaped;
use crate::model::{AnswerKey, FillBlank, Question, QuizDocument, SingleChoice, BLANK_SENTINEL};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub include_solutions: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            include_solutions: true,
        }
    }
}

/// Render a quiz document and its answers back into source markup
pub fn build(document: &QuizDocument, answers: &AnswerKey, options: &BuildOptions) -> String {
    let rendered: Vec<String> = document
        .questions
        .iter()
        .map(|question| {
            let solution = options
                .include_solutions
                .then(|| answers.get(question.uid()).and_then(|a| a.solution_markup()))
                .flatten()
                .unwrap_or("");
            match question {
                Question::SingleChoice(q) => build_single_choice(q, answers, solution),
                Question::FillBlank(q) => build_fill_blank(q, answers, solution),
            }
        })
        .collect();

    let mut out = rendered.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn build_single_choice(question: &SingleChoice, answers: &AnswerKey, solution: &str) -> String {
    let marker = commands::marker_for(question.choices.len());
    let correct = match answers.single_choice(&question.uid) {
        Some(answer) => answer.correct_key.to_string(),
        None => {
            tracing::warn!(uid = %question.uid, "no correct key recorded, writing an empty one");
            String::new()
        }
    };

    let mut block = format!("\\{}{{{}}}", marker, correct);
    for choice in &question.choices {
        block.push('{');
        block.push_str(&choice.text);
        block.push('}');
    }

    format!(
        "\\{}{{{}}}{{{}}}{{{}}}{{{}}}",
        commands::SINGLE_CHOICE,
        question.uid.id,
        question.prompt,
        block,
        solution
    )
}

fn build_fill_blank(question: &FillBlank, answers: &AnswerKey, solution: &str) -> String {
    let accepted = answers
        .fill_blank(&question.uid)
        .map(|a| a.accepted_answers.as_slice())
        .unwrap_or(&[]);
    format!(
        "\\{}{{{}}}{{{}}}{{{}}}",
        commands::FILL_BLANK,
        question.uid.id,
        inline_answers(&question.prompt, accepted),
        solution
    )
}

/// Put the i-th accepted answer back into the i-th blank sentinel.
///
/// Sentinels past the last answer become the bare marker.
pub fn inline_answers(prompt: &str, accepted: &[String]) -> String {
    let mut out = String::with_capacity(prompt.len() + accepted.iter().map(String::len).sum::<usize>());
    let mut copied = 0;
    let mut index = 0;
    while let Some(at) = find_unescaped(prompt, BLANK_SENTINEL, copied) {
        out.push_str(&prompt[copied..at]);
        match accepted.get(index) {
            Some(answer) => {
                out.push('\\');
                out.push_str(commands::BUILDER_ANSWER_MARKER);
                out.push('{');
                out.push_str(answer);
                out.push('}');
            }
            None => {
                out.push('\\');
                out.push_str(commands::BARE_MARKER);
                out.push_str("{}");
            }
        }
        index += 1;
        copied = at + BLANK_SENTINEL.len();
    }
    out.push_str(&prompt[copied..]);
    out
}
