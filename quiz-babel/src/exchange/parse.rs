//! Exchange package import (Package → QuizDocument + AnswerKey)
//!
//!     Items are dispatched on their `question_type` metadata. Single-choice and short-answer
//!     items map directly onto the model; multi-select and dropdown items are down-converted
//!     into fill-blank questions and flagged. Nothing short of a missing or unreadable
//!     manifest/items document aborts the import: every per-item problem becomes a warning.

use super::html::{restore_blanks, DefaultNormalizer, HtmlNormalizer};
use super::manifest::{read_manifest, QuizResource};
use super::shapes::ItemShape;
use super::xml::{
    attr, child_named, children_named, descendants_named, descendants_outside, first_descendant,
    parse_xml, text_content,
};
use super::{DEFAULT_COMBINED_DELIMITER, FEEDBACK_IDENT, SPLIT_SEPARATOR};
use crate::error::CodecError;
use crate::package::{Asset, Package, MANIFEST_PATH};
use markup5ever_rcdom::Handle;
use quiz_parser::markup::lexer::trim_unescaped;
use quiz_parser::model::{
    count_blanks, Answer, AnswerKey, Choice, FillBlank, FillBlankAnswer, Question, QuizDocument,
    SingleChoice, SingleChoiceAnswer, Uid, BLANK_SENTINEL,
};
use quiz_parser::{Warning, WarningKind, Warnings};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Separator between accepted answers inside one short-answer value
    pub combined_delimiter: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            combined_delimiter: DEFAULT_COMBINED_DELIMITER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOutput {
    pub documents: Vec<QuizDocument>,
    pub answers: AnswerKey,
    /// Assets referenced by imported prompts, in first-reference order
    pub assets: Vec<Asset>,
    pub warnings: Vec<Warning>,
}

/// Parse a package with the default HTML normalizer
pub fn parse_package(package: &Package, options: &ImportOptions) -> Result<ImportOutput, CodecError> {
    parse_package_with(package, options, &DefaultNormalizer)
}

/// Parse a package, normalizing prompt HTML with `normalizer`
pub fn parse_package_with(
    package: &Package,
    options: &ImportOptions,
    normalizer: &dyn HtmlNormalizer,
) -> Result<ImportOutput, CodecError> {
    let manifest = package.text(MANIFEST_PATH).ok_or(CodecError::ManifestNotFound)??;
    let resources = read_manifest(manifest)?;

    let mut reader = PackageReader {
        package,
        options,
        normalizer,
        answers: AnswerKey::new(),
        assets: Vec::new(),
        warnings: Warnings::new(),
        seen: HashSet::new(),
    };

    let mut documents = Vec::with_capacity(resources.len());
    for (position, resource) in resources.iter().enumerate() {
        documents.push(reader.quiz(resource, position as u32 + 1)?);
    }

    tracing::debug!(
        quizzes = documents.len(),
        answers = reader.answers.len(),
        assets = reader.assets.len(),
        "parsed exchange package"
    );
    Ok(ImportOutput {
        documents,
        answers: reader.answers,
        assets: reader.assets,
        warnings: reader.warnings.into_vec(),
    })
}

/// Quiz title and index from the metadata document, when there is one
fn read_meta(package: &Package, href: Option<&str>) -> Result<(Option<String>, Option<u32>), CodecError> {
    let Some(text) = href.and_then(|href| package.text(href)) else {
        return Ok((None, None));
    };
    let root = parse_xml(text?)?;
    let field = |name: &str| {
        child_named(&root, name)
            .map(|node| text_content(&node).trim().to_string())
            .filter(|value| !value.is_empty())
    };
    Ok((
        field("title"),
        field("version_index").and_then(|v| v.parse().ok()),
    ))
}

/// Fields shared by every item shape
struct ItemParts {
    ident: String,
    uid: Uid,
    points: Option<f64>,
    prompt: String,
    solution: Option<String>,
}

/// A split fill-blank waiting for its next `uid#k` sibling
struct PendingSplit {
    question: FillBlank,
    answer: FillBlankAnswer,
}

struct PackageReader<'a> {
    package: &'a Package,
    options: &'a ImportOptions,
    normalizer: &'a dyn HtmlNormalizer,
    answers: AnswerKey,
    assets: Vec<Asset>,
    warnings: Warnings,
    seen: HashSet<Uid>,
}

impl PackageReader<'_> {
    fn quiz(&mut self, resource: &QuizResource, position: u32) -> Result<QuizDocument, CodecError> {
        let (title, index) = read_meta(self.package, resource.meta_href.as_deref())?;
        let text = self.package.text(&resource.items_href).ok_or_else(|| {
            CodecError::ParseError(format!("Items document '{}' not found", resource.items_href))
        })??;
        let root = parse_xml(text)?;

        let mut questions = Vec::new();
        let mut pending: Option<PendingSplit> = None;
        for item in descendants_named(&root, "item") {
            let Some(ident) = attr(&item, "ident") else {
                self.warn(WarningKind::MalformedQuestion, None, "Skipping item without ident".into());
                continue;
            };
            let (base, part) = split_ident(&ident);
            let shape = ItemShape::from_question_type(
                &metadata_field(&item, "question_type").unwrap_or_default(),
            );
            let split_part = part.is_some() && shape == ItemShape::ShortAnswer;

            if split_part {
                let sibling = pending
                    .as_mut()
                    .filter(|open| open.question.uid.to_string() == base);
                if let Some(open) = sibling {
                    open.answer.accepted_answers.push(split_value(&item));
                    open.answer.blank_count = open.answer.accepted_answers.len();
                    open.question.blank_count = open.answer.blank_count;
                    continue;
                }
            }
            if let Some(done) = pending.take() {
                self.close_split(done, &mut questions);
            }

            let uid = match Uid::parse(base) {
                Ok(uid) => uid,
                Err(err) => {
                    self.warn(
                        WarningKind::MalformedQuestion,
                        Some(&ident),
                        format!("Skipping item '{}': {}", ident, err),
                    );
                    continue;
                }
            };
            if self.seen.contains(&uid) {
                self.warn(
                    WarningKind::MalformedQuestion,
                    Some(&ident),
                    format!("Skipping item '{}': uid {} already imported", ident, uid),
                );
                continue;
            }
            if let ItemShape::Unrecognized(question_type) = &shape {
                self.warn(
                    WarningKind::UnknownQuestionType,
                    Some(&ident),
                    format!("Unknown question_type '{}' for {}", question_type, ident),
                );
                continue;
            }

            let parts = ItemParts {
                points: metadata_field(&item, "points_possible").and_then(|p| p.trim().parse().ok()),
                prompt: self.prompt(&item, shape != ItemShape::SingleChoice),
                solution: solution(&item),
                ident,
                uid,
            };

            if split_part {
                pending = Some(split_start(parts, split_value(&item)));
                continue;
            }

            let imported = match shape {
                ItemShape::SingleChoice => self.single_choice(&item, parts),
                ItemShape::ShortAnswer => self.short_answer(&item, parts),
                ItemShape::MultiSelect => self.multi_select(&item, parts),
                ItemShape::MultiBlankChoice => self.dropdowns(&item, parts),
                ItemShape::Unrecognized(_) => None,
            };
            if let Some(question) = imported {
                self.seen.insert(question.uid().clone());
                questions.push(question);
            }
        }
        if let Some(done) = pending.take() {
            self.close_split(done, &mut questions);
        }

        let version_id = title.unwrap_or_else(|| resource.identifier.clone());
        Ok(QuizDocument::new(version_id, index.unwrap_or(position)).with_questions(questions))
    }

    fn warn(&mut self, kind: WarningKind, subject: Option<&str>, message: String) {
        let warning = Warning::new(kind, message);
        self.warnings.push(match subject {
            Some(subject) => warning.about(subject),
            None => warning,
        });
    }

    /// Normalized prompt text; referenced images are resolved against the package.
    ///
    /// Underscore runs only mean blanks in items that have blanks.
    fn prompt(&mut self, item: &Handle, with_blanks: bool) -> String {
        let html = child_named(item, "presentation")
            .and_then(|p| child_named(&p, "material"))
            .and_then(|m| first_descendant(&m, "mattext"))
            .map(|node| text_content(&node))
            .unwrap_or_default();
        let normalized = self.normalizer.normalize(&html);

        for name in normalized.images {
            if self.assets.iter().any(|a| a.name == name) {
                continue;
            }
            match self.package.asset(&name) {
                Some(asset) => self.assets.push(asset),
                None => {
                    let ident = attr(item, "ident").unwrap_or_default();
                    self.warn(
                        WarningKind::UnresolvedAsset,
                        Some(&ident),
                        format!("Image '{}' in {} has no blob in the package", name, ident),
                    );
                }
            }
        }
        if with_blanks {
            restore_blanks(&normalized.text)
        } else {
            normalized.text
        }
    }

    fn single_choice(&mut self, item: &Handle, parts: ItemParts) -> Option<Question> {
        let labels = choice_labels(item);
        if !(2..=5).contains(&labels.len()) {
            self.warn(
                WarningKind::MalformedQuestion,
                Some(&parts.ident),
                format!(
                    "Skipping item '{}': {} choices, expected 2 to 5",
                    parts.ident,
                    labels.len()
                ),
            );
            return None;
        }

        let choices = Choice::keyed(labels.iter().map(|(_, text)| text.clone()));
        let correct = scoring_values(item).into_iter().find_map(|(_, value)| {
            labels
                .iter()
                .position(|(ident, _)| *ident == value.trim())
                .map(|index| choices[index].key)
        });

        match correct {
            Some(correct_key) => {
                self.answers.insert(
                    parts.uid.clone(),
                    Answer::SingleChoice(SingleChoiceAnswer {
                        correct_key,
                        points: parts.points,
                        solution_markup: parts.solution,
                    }),
                );
            }
            None => self.warn(
                WarningKind::MissingAnswerData,
                Some(&parts.ident),
                format!("No correct choice resolvable for {}", parts.ident),
            ),
        }

        Some(Question::SingleChoice(SingleChoice {
            uid: parts.uid,
            prompt: parts.prompt,
            choices,
        }))
    }

    fn short_answer(&mut self, item: &Handle, parts: ItemParts) -> Option<Question> {
        let values: Vec<String> = scoring_values(item).into_iter().map(|(_, v)| v).collect();
        let Some(first) = values.first() else {
            self.warn(
                WarningKind::MissingAnswerData,
                Some(&parts.ident),
                format!("No accepted answers for {}", parts.ident),
            );
            let answer = FillBlankAnswer::from_answers(Vec::new());
            return Some(self.fill_blank(parts, 0, Some(answer)));
        };

        let answers: Vec<String> = if count_blanks(&parts.prompt) > 1 {
            first
                .split(self.options.combined_delimiter.as_str())
                .map(|a| trim_unescaped(a).to_string())
                .collect()
        } else {
            vec![trim_unescaped(first).to_string()]
        };

        let mut answer = FillBlankAnswer::from_answers(answers);
        if values.len() > 1 {
            let alternatives = values[1..].join(" | ");
            self.warn(
                WarningKind::LossyConversion,
                Some(&parts.ident),
                format!(
                    "{} has {} alternative answers; only the first is kept",
                    parts.ident,
                    values.len() - 1
                ),
            );
            answer.notes = Some(format!("Alternative answers: {}", alternatives));
        }
        let blanks = answer.blank_count;
        Some(self.fill_blank(parts, blanks, Some(answer)))
    }

    fn multi_select(&mut self, item: &Handle, parts: ItemParts) -> Option<Question> {
        let labels = choice_labels(item);
        let mut prompt = parts.prompt.clone();
        let mut keys = Vec::with_capacity(labels.len());
        for (index, (_, text)) in labels.iter().enumerate() {
            let key = option_key(index);
            prompt.push_str(&format!("\n{}. {}", key, text));
            keys.push(key);
        }
        prompt.push('\n');
        prompt.push_str(BLANK_SENTINEL);

        let mut correct: Vec<char> = scoring_values(item)
            .into_iter()
            .filter_map(|(_, value)| labels.iter().position(|(ident, _)| *ident == value.trim()))
            .map(|index| keys[index])
            .collect();
        correct.sort_unstable();
        correct.dedup();

        self.warn(
            WarningKind::LossyConversion,
            Some(&parts.ident),
            format!("{} is multi-select; imported as a fill-blank listing the correct keys", parts.ident),
        );
        let answer = if correct.is_empty() {
            self.warn(
                WarningKind::MissingAnswerData,
                Some(&parts.ident),
                format!("No correct choices resolvable for {}", parts.ident),
            );
            None
        } else {
            let joined = correct.iter().map(char::to_string).collect::<Vec<_>>().join(",");
            let mut answer = FillBlankAnswer::from_answers(vec![joined]);
            answer.notes = Some(
                "Multi-select item: answer is the sorted, comma-separated set of correct keys".into(),
            );
            Some(answer)
        };

        Some(self.fill_blank(ItemParts { prompt, ..parts }, 1, answer))
    }

    fn dropdowns(&mut self, item: &Handle, parts: ItemParts) -> Option<Question> {
        let scoring = scoring_values(item);
        let mut prompt = parts.prompt.clone();
        let mut answers = Vec::new();
        let mut options = Vec::new();

        for lid in descendants_named(item, "response_lid") {
            let lid_ident = attr(&lid, "ident").unwrap_or_default();
            let name = child_named(&lid, "material")
                .map(|m| text_content(&m).trim().to_string())
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| {
                    lid_ident
                        .strip_prefix("response_")
                        .unwrap_or(&lid_ident)
                        .to_string()
                });

            let token = format!("[{}]", name);
            prompt = match prompt.find(&token) {
                Some(at) => format!("{}{}{}", &prompt[..at], BLANK_SENTINEL, &prompt[at + token.len()..]),
                None => format!("{} {}", prompt, BLANK_SENTINEL),
            };

            let labels = label_texts(&lid);
            let correct = scoring
                .iter()
                .filter(|(respident, _)| respident.as_deref().map_or(true, |r| r == lid_ident))
                .find_map(|(_, value)| labels.iter().find(|(ident, _)| *ident == value.trim()))
                .map(|(_, text)| text.clone());
            if correct.is_none() {
                self.warn(
                    WarningKind::MissingAnswerData,
                    Some(&parts.ident),
                    format!("No correct option for blank '{}' in {}", name, parts.ident),
                );
            }
            answers.push(correct.unwrap_or_default());

            let texts: Vec<&str> = labels.iter().map(|(_, text)| text.as_str()).collect();
            options.push(format!("({}: {})", name, texts.join(" / ")));
        }
        for line in &options {
            prompt.push('\n');
            prompt.push_str(line);
        }

        self.warn(
            WarningKind::LossyConversion,
            Some(&parts.ident),
            format!(
                "{} is a dropdown item; {} blanks imported with their options listed in the prompt",
                parts.ident,
                answers.len()
            ),
        );
        let blanks = answers.len();
        let mut answer = FillBlankAnswer::from_answers(answers);
        answer.notes = Some("Dropdown item: per-blank options are listed after the prompt".into());
        let answer = (!answer.accepted_answers.is_empty()).then_some(answer);
        Some(self.fill_blank(ItemParts { prompt, ..parts }, blanks, answer))
    }

    /// Fill-blank question whose prompt holds at least `blanks` sentinels, and at least one
    /// when no answer is known. Records the answer if any
    fn fill_blank(&mut self, parts: ItemParts, blanks: usize, answer: Option<FillBlankAnswer>) -> Question {
        let mut prompt = parts.prompt;
        for _ in count_blanks(&prompt)..blanks.max(1) {
            if !prompt.is_empty() {
                prompt.push(' ');
            }
            prompt.push_str(BLANK_SENTINEL);
        }
        if let Some(mut answer) = answer {
            answer.points = parts.points;
            answer.solution_markup = parts.solution;
            self.answers.insert(parts.uid.clone(), Answer::FillBlank(answer));
        }
        Question::FillBlank(FillBlank {
            uid: parts.uid,
            prompt,
            blank_count: blanks,
        })
    }

    fn close_split(&mut self, split: PendingSplit, questions: &mut Vec<Question>) {
        let PendingSplit { mut question, answer } = split;
        for _ in count_blanks(&question.prompt)..question.blank_count {
            question.prompt.push(' ');
            question.prompt.push_str(BLANK_SENTINEL);
        }
        tracing::debug!(uid = %question.uid, blanks = question.blank_count, "regrouped split item");
        self.seen.insert(question.uid.clone());
        self.answers.insert(question.uid.clone(), Answer::FillBlank(answer));
        questions.push(Question::FillBlank(question));
    }
}

fn split_start(parts: ItemParts, first: String) -> PendingSplit {
    let mut answer = FillBlankAnswer::from_answers(vec![first]);
    answer.points = parts.points;
    answer.solution_markup = parts.solution;
    PendingSplit {
        question: FillBlank {
            uid: parts.uid,
            prompt: parts.prompt,
            blank_count: answer.blank_count,
        },
        answer,
    }
}

/// The single accepted answer a split item carries
fn split_value(item: &Handle) -> String {
    scoring_values(item)
        .into_iter()
        .next()
        .map(|(_, value)| trim_unescaped(&value).to_string())
        .unwrap_or_default()
}

/// `uid#k` → (`uid`, Some(k)); anything else is returned whole
fn split_ident(ident: &str) -> (&str, Option<u32>) {
    match ident.rsplit_once(SPLIT_SEPARATOR) {
        Some((base, part)) => match part.parse::<u32>() {
            Ok(k) if k > 0 => (base, Some(k)),
            _ => (ident, None),
        },
        None => (ident, None),
    }
}

fn option_key(index: usize) -> char {
    char::from(b'A' + (index % 26) as u8)
}

/// Value of a `qtimetadatafield` by label
fn metadata_field(item: &Handle, label: &str) -> Option<String> {
    let metadata = child_named(item, "itemmetadata")?;
    descendants_named(&metadata, "qtimetadatafield")
        .into_iter()
        .find(|field| {
            child_named(field, "fieldlabel").is_some_and(|l| text_content(&l).trim() == label)
        })
        .and_then(|field| child_named(&field, "fieldentry"))
        .map(|entry| text_content(&entry).trim().to_string())
}

/// (ident, text) of every choice label in the item, in document order
fn choice_labels(item: &Handle) -> Vec<(String, String)> {
    match child_named(item, "presentation") {
        Some(presentation) => label_texts(&presentation),
        None => Vec::new(),
    }
}

fn label_texts(node: &Handle) -> Vec<(String, String)> {
    descendants_named(node, "response_label")
        .iter()
        .map(|label| {
            let ident = attr(label, "ident").unwrap_or_default();
            let text = first_descendant(label, "mattext")
                .map(|m| text_content(&m))
                .unwrap_or_else(|| text_content(label));
            (ident, trim_unescaped(&text).to_string())
        })
        .collect()
}

/// (respident, value) of every positive `varequal` in a scoring condition, in document order
///
/// Only conditions that set a positive score count; `varequal`s under `not` are skipped.
fn scoring_values(item: &Handle) -> Vec<(Option<String>, String)> {
    let Some(processing) = child_named(item, "resprocessing") else {
        return Vec::new();
    };
    let mut values = Vec::new();
    for condition in children_named(&processing, "respcondition") {
        let scores = children_named(&condition, "setvar")
            .iter()
            .any(|setvar| text_content(setvar).trim().parse::<f64>().is_ok_and(|v| v > 0.0));
        if !scores {
            continue;
        }
        let Some(conditions) = child_named(&condition, "conditionvar") else {
            continue;
        };
        for varequal in descendants_outside(&conditions, "varequal", "not") {
            values.push((attr(&varequal, "respident"), text_content(&varequal)));
        }
    }
    values
}

fn solution(item: &Handle) -> Option<String> {
    children_named(item, "itemfeedback")
        .into_iter()
        .find(|fb| attr(fb, "ident").as_deref() == Some(FEEDBACK_IDENT))
        .and_then(|fb| first_descendant(&fb, "mattext"))
        .map(|m| trim_unescaped(&text_content(&m)).to_string())
        .filter(|text| !text.is_empty())
}
