//! Exchange package export (QuizDocument + AnswerKey → Package)

use super::html::{has_literal_blank_runs, render_prompt};
use super::manifest::build_manifest;
use super::shapes::ItemShape;
use super::xml::{append_element, append_text_element, create_element, serialize_document};
use super::{
    ASSESSMENT_NS, DEFAULT_COMBINED_DELIMITER, FEEDBACK_IDENT, HTML_TEXT, PLAIN_TEXT,
    QUIZ_META_NS, RESPONSE_IDENT, SPLIT_SEPARATOR,
};
use crate::error::CodecError;
use crate::package::{Asset, Package, QuizPaths, MANIFEST_PATH};
use markup5ever_rcdom::Handle;
use quiz_parser::model::{
    count_blanks, AnswerKey, FillBlank, FillBlankAnswer, Question, QuizDocument, SingleChoice,
};
use quiz_parser::{Warning, WarningKind, Warnings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How fill-blank questions with several blanks become items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillBlankExportMode {
    /// One item, accepted answers joined with the combined delimiter
    #[default]
    Combined,
    /// One item per blank
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    pub fill_blank_mode: FillBlankExportMode,
    pub combined_delimiter: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            fill_blank_mode: FillBlankExportMode::Combined,
            combined_delimiter: DEFAULT_COMBINED_DELIMITER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub package: Package,
    pub warnings: Vec<Warning>,
}

/// Build an exchange package from quiz documents, their answers and the assets they use
pub fn build_package(
    documents: &[QuizDocument],
    answers: &AnswerKey,
    assets: &[Asset],
    options: &ExportOptions,
) -> Result<ExportOutput, CodecError> {
    let mut package = Package::new();
    let mut warnings = Warnings::new();
    let asset_names: BTreeSet<String> = assets.iter().map(|a| a.name.clone()).collect();

    let mut version_ids: Vec<&str> = Vec::new();
    let mut quizzes: Vec<QuizPaths> = Vec::new();

    for document in documents {
        if version_ids.contains(&document.version_id.as_str()) {
            warnings.push(
                Warning::new(
                    WarningKind::LossyConversion,
                    format!("Duplicate quiz version '{}' skipped", document.version_id),
                )
                .about(&document.version_id),
            );
            continue;
        }

        let paths = QuizPaths::for_version(&document.version_id);
        let mut writer = ItemWriter {
            answers,
            assets: &asset_names,
            options,
            warnings: &mut warnings,
            item_count: 0,
        };
        let items = writer.assessment(document, &paths.identifier)?;
        let item_count = writer.item_count;

        package.insert(paths.items.clone(), items);
        package.insert(paths.meta.clone(), quiz_meta(document, &paths, item_count)?);
        version_ids.push(&document.version_id);
        quizzes.push(paths);
    }

    let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
    package.insert(MANIFEST_PATH, build_manifest(&version_ids, &quizzes, &names)?);
    for asset in assets {
        package.insert(asset.path(), asset.bytes.clone());
    }

    tracing::debug!(
        quizzes = quizzes.len(),
        blobs = package.len(),
        warnings = warnings.len(),
        "built exchange package"
    );
    Ok(ExportOutput {
        package,
        warnings: warnings.into_vec(),
    })
}

fn quiz_meta(
    document: &QuizDocument,
    paths: &QuizPaths,
    item_count: usize,
) -> Result<String, CodecError> {
    let quiz = create_element(
        "quiz",
        vec![
            ("identifier", paths.identifier.as_str()),
            ("xmlns", QUIZ_META_NS),
        ],
    );
    append_text_element(&quiz, "title", vec![], &document.version_id);
    append_text_element(&quiz, "points_possible", vec![], &item_count.to_string());
    append_text_element(
        &quiz,
        "version_index",
        vec![],
        &document.version_index.to_string(),
    );
    serialize_document(&quiz)
}

struct ItemWriter<'a> {
    answers: &'a AnswerKey,
    assets: &'a BTreeSet<String>,
    options: &'a ExportOptions,
    warnings: &'a mut Warnings,
    item_count: usize,
}

impl ItemWriter<'_> {
    fn assessment(&mut self, document: &QuizDocument, identifier: &str) -> Result<String, CodecError> {
        let root = create_element("questestinterop", vec![("xmlns", ASSESSMENT_NS)]);
        let assessment = append_element(
            &root,
            "assessment",
            vec![
                ("ident", identifier),
                ("title", document.version_id.as_str()),
            ],
        );
        let section = append_element(&assessment, "section", vec![("ident", "root_section")]);

        for question in &document.questions {
            match question {
                Question::SingleChoice(q) => self.single_choice(&section, q),
                Question::FillBlank(q) => self.fill_blank(&section, q),
            }
        }
        serialize_document(&root)
    }

    fn warn(&mut self, kind: WarningKind, subject: &str, message: String) {
        self.warnings.push(Warning::new(kind, message).about(subject));
    }

    /// Item skeleton with metadata and the rendered prompt; returns (item, presentation)
    fn item(
        &mut self,
        section: &Handle,
        ident: &str,
        title: &str,
        shape: &ItemShape,
        points: Option<f64>,
        prompt: &str,
    ) -> (Handle, Handle) {
        self.item_count += 1;
        let item = append_element(section, "item", vec![("ident", ident), ("title", title)]);

        let metadata = append_element(&item, "itemmetadata", vec![]);
        let fields = append_element(&metadata, "qtimetadata", vec![]);
        metadata_field(&fields, "question_type", shape.question_type());
        if let Some(points) = points {
            metadata_field(&fields, "points_possible", &points.to_string());
        }

        let rendered = render_prompt(prompt, self.assets);
        for name in rendered.unresolved {
            self.warn(
                WarningKind::UnresolvedAsset,
                ident,
                format!("Asset '{}' referenced by {} is not in the package", name, ident),
            );
        }
        let presentation = append_element(&item, "presentation", vec![]);
        let material = append_element(&presentation, "material", vec![]);
        append_text_element(&material, "mattext", vec![("texttype", HTML_TEXT)], &rendered.html);

        (item, presentation)
    }

    fn single_choice(&mut self, section: &Handle, question: &SingleChoice) {
        let uid = question.uid.to_string();
        let answer = self.answers.single_choice(&question.uid);
        let (item, presentation) = self.item(
            section,
            &uid,
            &question.uid.id.raw,
            &ItemShape::SingleChoice,
            answer.and_then(|a| a.points),
            &question.prompt,
        );

        let lid = append_element(
            &presentation,
            "response_lid",
            vec![("ident", RESPONSE_IDENT), ("rcardinality", "Single")],
        );
        let render = append_element(&lid, "render_choice", vec![]);
        for choice in &question.choices {
            let key = choice.key.to_string();
            let label = append_element(&render, "response_label", vec![("ident", key.as_str())]);
            let material = append_element(&label, "material", vec![]);
            append_text_element(&material, "mattext", vec![("texttype", PLAIN_TEXT)], &choice.text);
        }

        let correct = answer.map(|a| a.correct_key.to_string());
        if correct.is_none() {
            self.warn(
                WarningKind::MissingAnswerData,
                &uid,
                format!("No correct key recorded for {}, exported without scoring", uid),
            );
        }
        scoring(&item, correct.as_deref());
        feedback(&item, answer.and_then(|a| a.solution_markup.as_deref()));
    }

    fn fill_blank(&mut self, section: &Handle, question: &FillBlank) {
        let uid = question.uid.to_string();
        let answer = self.answers.fill_blank(&question.uid);
        let accepted = answer.map(|a| a.accepted_answers.as_slice()).unwrap_or(&[]);

        if accepted.is_empty() {
            self.warn(
                WarningKind::MissingAnswerData,
                &uid,
                format!("No accepted answers recorded for {}", uid),
            );
        }
        if has_literal_blank_runs(&question.prompt) {
            self.warn(
                WarningKind::LossyConversion,
                &uid,
                format!("{} has a literal '_____' in its prompt; import reads it as a blank", uid),
            );
        }

        let split = self.options.fill_blank_mode == FillBlankExportMode::Split && accepted.len() > 1;
        if split {
            self.warn(
                WarningKind::LossyConversion,
                &uid,
                format!("{} split into {} items, one per blank", uid, accepted.len()),
            );
            for (k, single) in accepted.iter().enumerate() {
                let ident = format!("{}{}{}", uid, SPLIT_SEPARATOR, k + 1);
                self.short_answer(section, &ident, question, answer, Some(single.as_str()));
            }
        } else {
            let delimiter = self.options.combined_delimiter.as_str();
            let ambiguous = count_blanks(&question.prompt) > 1
                && !delimiter.is_empty()
                && accepted.iter().any(|a| a.contains(delimiter));
            if ambiguous {
                self.warn(
                    WarningKind::LossyConversion,
                    &uid,
                    format!(
                        "An answer of {} contains the delimiter '{}'; import splits it into more blanks",
                        uid, delimiter
                    ),
                );
            }
            let combined = (!accepted.is_empty()).then(|| accepted.join(delimiter));
            self.short_answer(section, &uid, question, answer, combined.as_deref());
        }
    }

    fn short_answer(
        &mut self,
        section: &Handle,
        ident: &str,
        question: &FillBlank,
        answer: Option<&FillBlankAnswer>,
        accepted: Option<&str>,
    ) {
        let (item, presentation) = self.item(
            section,
            ident,
            &question.uid.id.raw,
            &ItemShape::ShortAnswer,
            answer.and_then(|a| a.points),
            &question.prompt,
        );

        let response = append_element(
            &presentation,
            "response_str",
            vec![("ident", RESPONSE_IDENT), ("rcardinality", "Single")],
        );
        let render = append_element(&response, "render_fib", vec![]);
        append_element(&render, "response_label", vec![("ident", "answer1"), ("rshuffle", "No")]);

        scoring(&item, accepted);
        feedback(&item, answer.and_then(|a| a.solution_markup.as_deref()));
    }
}

fn metadata_field(fields: &Handle, label: &str, entry: &str) {
    let field = append_element(fields, "qtimetadatafield", vec![]);
    append_text_element(&field, "fieldlabel", vec![], label);
    append_text_element(&field, "fieldentry", vec![], entry);
}

/// `resprocessing` awarding full score when the response equals `correct`
fn scoring(item: &Handle, correct: Option<&str>) {
    let processing = append_element(item, "resprocessing", vec![]);
    let outcomes = append_element(&processing, "outcomes", vec![]);
    append_element(
        &outcomes,
        "decvar",
        vec![
            ("maxvalue", "100"),
            ("minvalue", "0"),
            ("varname", "SCORE"),
            ("vartype", "Decimal"),
        ],
    );
    let Some(correct) = correct else {
        return;
    };
    let condition = append_element(&processing, "respcondition", vec![("continue", "No")]);
    let conditions = append_element(&condition, "conditionvar", vec![]);
    append_text_element(&conditions, "varequal", vec![("respident", RESPONSE_IDENT)], correct);
    append_text_element(
        &condition,
        "setvar",
        vec![("action", "Set"), ("varname", "SCORE")],
        "100",
    );
}

fn feedback(item: &Handle, solution: Option<&str>) {
    let Some(solution) = solution else {
        return;
    };
    let feedback = append_element(item, "itemfeedback", vec![("ident", FEEDBACK_IDENT)]);
    let flow = append_element(&feedback, "flow_mat", vec![]);
    let material = append_element(&flow, "material", vec![]);
    append_text_element(&material, "mattext", vec![("texttype", PLAIN_TEXT)], solution);
}
