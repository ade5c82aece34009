//! Source markup parsing (markup → QuizDocument + AnswerKey)
//!
//!     The parser walks the comment-stripped text at brace depth zero and reacts to the two
//!     question commands. Groups at deeper levels are skipped whole, so a command nested in
//!     some other argument is never taken for a question.
//!
//!     Failure policy:
//!
//!     - An unbalanced group anywhere is a [ParseError] for the whole document.
//!     - Anything wrong with a single question (missing argument, bad id, bad choices block,
//!       no blank markers, duplicate uid) skips that question and records a [Warning].

use super::commands;
use super::lexer::{
    command_at, normalize_line_endings, parse_bracket_group, parse_group, parse_group_run,
    skip_whitespace, strip_comments, trim_unescaped,
};
use crate::error::{InvalidChoiceBlock, LexError, Location, ParseError};
use crate::model::{
    Answer, AnswerKey, Choice, ChoiceKey, FillBlank, FillBlankAnswer, Level, Question,
    QuestionId, QuizDocument, SingleChoice, SingleChoiceAnswer, Uid, BLANK_SENTINEL,
};
use crate::warning::{Warning, WarningKind, Warnings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Version id used when parsed questions span several topics
pub const MIXED_VERSION_ID: &str = "mixed";

/// Version index used when none is supplied
pub const DEFAULT_VERSION_INDEX: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub course_code: String,
    /// Also the scheme part of every uid
    pub subject: String,
    /// Keep only questions of this level
    pub level: Option<Level>,
    /// Forces the version id
    pub topic: Option<String>,
    pub version_index: Option<u32>,
}

impl ParseOptions {
    pub fn new(subject: impl Into<String>, course_code: impl Into<String>) -> Self {
        ParseOptions {
            course_code: course_code.into(),
            subject: subject.into(),
            level: None,
            topic: None,
            version_index: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_version_index(mut self, index: u32) -> Self {
        self.version_index = Some(index);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub document: QuizDocument,
    pub answers: AnswerKey,
    pub warnings: Vec<Warning>,
}

/// Parse source markup into a quiz document and its answer key
pub fn parse(text: &str, options: &ParseOptions) -> Result<ParseOutput, ParseError> {
    let normalized = normalize_line_endings(text);
    let stripped = strip_comments(&normalized);
    let source = stripped.as_ref();
    let bytes = source.as_bytes();

    let mut state = ParseState::new(source, options);
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => {
                let (_, end) =
                    parse_group(source, pos).map_err(|e| ParseError::structural(source, &e))?;
                pos = end;
            }
            b'\\' => match command_at(source, pos) {
                Some((name, end)) if name == commands::SINGLE_CHOICE => {
                    pos = state.single_choice(pos, end)?;
                }
                Some((name, end)) if name == commands::FILL_BLANK => {
                    pos = state.fill_blank(pos, end)?;
                }
                Some((_, end)) => pos = end,
                // Control symbol such as `\{` or `\\`
                None => pos += 2,
            },
            _ => pos += 1,
        }
    }

    Ok(state.finish())
}

enum Arguments<'a> {
    Complete { groups: Vec<&'a str>, end: usize },
    Missing { found: usize, resume: usize },
}

/// Read exactly `count` groups; a missing one stops at the last consumed position
fn read_arguments(source: &str, from: usize, count: usize) -> Result<Arguments<'_>, ParseError> {
    let mut groups = Vec::with_capacity(count);
    let mut pos = from;
    while groups.len() < count {
        let open = skip_whitespace(source, pos);
        match parse_group(source, open) {
            Ok((content, end)) => {
                groups.push(content);
                pos = end;
            }
            Err(LexError::MissingGroup { .. }) => {
                return Ok(Arguments::Missing {
                    found: groups.len(),
                    resume: pos,
                })
            }
            Err(err) => return Err(ParseError::structural(source, &err)),
        }
    }
    Ok(Arguments::Complete { groups, end: pos })
}

struct ParseState<'a> {
    source: &'a str,
    options: &'a ParseOptions,
    questions: Vec<Question>,
    answers: AnswerKey,
    warnings: Warnings,
}

impl<'a> ParseState<'a> {
    fn new(source: &'a str, options: &'a ParseOptions) -> Self {
        ParseState {
            source,
            options,
            questions: Vec::new(),
            answers: AnswerKey::new(),
            warnings: Warnings::new(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        Location::from_offset(self.source, offset).line
    }

    fn skip(&mut self, kind: WarningKind, at: usize, subject: Option<&str>, reason: String) {
        let mut warning = Warning::new(
            kind,
            format!("Skipping question at line {}: {}", self.line_of(at), reason),
        );
        if let Some(subject) = subject {
            warning = warning.about(subject);
        }
        self.warnings.push(warning);
    }

    /// Resolve the uid of a question, or record why it is skipped
    fn admit(&mut self, at: usize, raw_id: &str) -> Option<Uid> {
        let raw_id = raw_id.trim();
        let id = match QuestionId::parse(raw_id) {
            Ok(id) => id,
            Err(err) => {
                self.skip(WarningKind::MalformedQuestion, at, Some(raw_id), err.to_string());
                return None;
            }
        };

        if let Some(level) = self.options.level {
            if id.level != level {
                tracing::debug!(id = %id, "skipping question outside level {}", level);
                return None;
            }
        }

        let uid = Uid::new(&self.options.subject, &self.options.course_code, id);
        if self.questions.iter().any(|q| q.uid() == &uid) {
            self.skip(
                WarningKind::MalformedQuestion,
                at,
                Some(raw_id),
                format!("duplicate question uid '{}'", uid),
            );
            return None;
        }
        Some(uid)
    }

    fn missing_arguments(&mut self, at: usize, command: &str, expected: usize, found: usize) {
        self.skip(
            WarningKind::MalformedQuestion,
            at,
            None,
            format!(
                "\\{} expects {} arguments, found {}",
                command, expected, found
            ),
        );
    }

    /// `\baitracnghiem{id}{prompt}{choicesBlock}{solution}`; returns where scanning resumes
    fn single_choice(&mut self, start: usize, after_name: usize) -> Result<usize, ParseError> {
        let (groups, end) = match read_arguments(self.source, after_name, 4)? {
            Arguments::Complete { groups, end } => (groups, end),
            Arguments::Missing { found, resume } => {
                self.missing_arguments(start, commands::SINGLE_CHOICE, 4, found);
                return Ok(resume);
            }
        };

        let Some(uid) = self.admit(start, groups[0]) else {
            return Ok(end);
        };

        let block = match parse_choice_block(groups[2]) {
            Ok(block) => block,
            Err(err) => {
                let subject = uid.id.raw.clone();
                self.skip(
                    WarningKind::MalformedQuestion,
                    start,
                    Some(&subject),
                    err.to_string(),
                );
                return Ok(end);
            }
        };

        self.answers.insert(
            uid.clone(),
            Answer::SingleChoice(SingleChoiceAnswer {
                correct_key: block.correct,
                points: None,
                solution_markup: solution(groups[3]),
            }),
        );
        self.questions.push(Question::SingleChoice(SingleChoice {
            uid,
            prompt: trim_unescaped(groups[1]).to_string(),
            choices: block.choices,
        }));
        Ok(end)
    }

    /// `\baidienkhuyet[..][..]{id}{prompt}{solution}`; returns where scanning resumes
    fn fill_blank(&mut self, start: usize, after_name: usize) -> Result<usize, ParseError> {
        let mut pos = after_name;
        for _ in 0..commands::FILL_BLANK_MAX_OPTIONAL {
            let open = skip_whitespace(self.source, pos);
            if self.source.as_bytes().get(open) != Some(&b'[') {
                break;
            }
            let (_, end) = parse_bracket_group(self.source, open)
                .map_err(|e| ParseError::structural(self.source, &e))?;
            pos = end;
        }

        let (groups, end) = match read_arguments(self.source, pos, 3)? {
            Arguments::Complete { groups, end } => (groups, end),
            Arguments::Missing { found, resume } => {
                self.missing_arguments(start, commands::FILL_BLANK, 3, found);
                return Ok(resume);
            }
        };

        let Some(uid) = self.admit(start, groups[0]) else {
            return Ok(end);
        };

        let masked = match mask_prompt(groups[1]) {
            Ok(masked) => masked,
            Err(err) => {
                let subject = uid.id.raw.clone();
                self.skip(WarningKind::MalformedQuestion, start, Some(&subject), err.to_string());
                return Ok(end);
            }
        };
        if masked.markers == 0 {
            let subject = uid.id.raw.clone();
            self.skip(
                WarningKind::MalformedQuestion,
                start,
                Some(&subject),
                "fill-blank prompt has no blank markers".to_string(),
            );
            return Ok(end);
        }

        let mut answer = FillBlankAnswer::from_answers(masked.answers);
        answer.solution_markup = solution(groups[2]);
        self.questions.push(Question::FillBlank(FillBlank {
            uid: uid.clone(),
            prompt: masked.text,
            blank_count: answer.blank_count,
        }));
        self.answers.insert(uid, Answer::FillBlank(answer));
        Ok(end)
    }

    fn finish(self) -> ParseOutput {
        let version_id = match &self.options.topic {
            Some(topic) => topic.clone(),
            None => {
                let topics: BTreeSet<&str> = self
                    .questions
                    .iter()
                    .map(|q| q.id().topic.as_str())
                    .collect();
                match topics.len() {
                    1 => topics.into_iter().next().unwrap_or(MIXED_VERSION_ID).to_string(),
                    _ => MIXED_VERSION_ID.to_string(),
                }
            }
        };

        tracing::debug!(
            version_id = %version_id,
            questions = self.questions.len(),
            warnings = self.warnings.len(),
            "parsed source markup"
        );

        let document = QuizDocument::new(
            version_id,
            self.options.version_index.unwrap_or(DEFAULT_VERSION_INDEX),
        )
        .with_questions(self.questions);

        ParseOutput {
            document,
            answers: self.answers,
            warnings: self.warnings.into_vec(),
        }
    }
}

fn solution(raw: &str) -> Option<String> {
    let trimmed = trim_unescaped(raw);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

struct ChoiceBlock {
    correct: ChoiceKey,
    choices: Vec<Choice>,
}

/// `\haipa{correct}{A}{B}` and its 3/4/5-way siblings
fn parse_choice_block(block: &str) -> Result<ChoiceBlock, InvalidChoiceBlock> {
    let start = skip_whitespace(block, 0);
    let (marker, after) = command_at(block, start).ok_or(InvalidChoiceBlock::MissingMarker)?;
    let arity = commands::arity_of(marker)
        .ok_or_else(|| InvalidChoiceBlock::UnknownMarker(marker.to_string()))?;

    let (groups, end) = parse_group_run(block, after).map_err(InvalidChoiceBlock::Lex)?;
    let rest = block[end..].trim();
    if !rest.is_empty() {
        return Err(InvalidChoiceBlock::TrailingContent(rest.to_string()));
    }

    let Some((correct, texts)) = groups.split_first() else {
        return Err(InvalidChoiceBlock::ChoiceCount { arity, found: 0 });
    };
    if texts.len() != arity {
        return Err(InvalidChoiceBlock::ChoiceCount {
            arity,
            found: texts.len(),
        });
    }

    Ok(ChoiceBlock {
        correct: parse_correct(correct.trim(), arity)?,
        choices: Choice::keyed(texts.iter().map(|t| trim_unescaped(t))),
    })
}

/// A letter `A..` or a 1-based number, within the declared arity
fn parse_correct(raw: &str, arity: usize) -> Result<ChoiceKey, InvalidChoiceBlock> {
    let out_of_range = || InvalidChoiceBlock::CorrectOutOfRange {
        correct: raw.to_string(),
        arity,
    };

    let index = if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        raw.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(out_of_range)?
    } else {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                (c.to_ascii_uppercase() as u8 - b'A') as usize
            }
            _ => return Err(InvalidChoiceBlock::InvalidCorrect(raw.to_string())),
        }
    };

    if index >= arity {
        return Err(out_of_range());
    }
    ChoiceKey::from_index(index).ok_or_else(out_of_range)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MaskedPrompt {
    pub text: String,
    pub answers: Vec<String>,
    /// Every recognised marker, answer-bearing or not
    pub markers: usize,
}

/// Replace inline blank markers by the sentinel, collecting accepted answers in order
pub(crate) fn mask_prompt(prompt: &str) -> Result<MaskedPrompt, LexError> {
    let bytes = prompt.as_bytes();
    let mut text = String::with_capacity(prompt.len());
    let mut answers = Vec::new();
    let mut markers = 0;
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            pos += 1;
            continue;
        }
        let Some((name, after)) = command_at(prompt, pos) else {
            pos += 2;
            continue;
        };

        let replaced_until = if commands::is_answer_marker(name) {
            let open = skip_whitespace(prompt, after);
            if bytes.get(open) == Some(&b'{') {
                let (content, end) = parse_group(prompt, open)?;
                answers.push(trim_unescaped(content).to_string());
                Some(end)
            } else {
                None
            }
        } else if name == commands::BARE_MARKER {
            match bytes.get(after) {
                Some(b'{') => Some(parse_group(prompt, after)?.1),
                _ => Some(after),
            }
        } else {
            None
        };

        match replaced_until {
            Some(end) => {
                text.push_str(&prompt[copied..pos]);
                text.push_str(BLANK_SENTINEL);
                markers += 1;
                copied = end;
                pos = end;
            }
            None => pos = after,
        }
    }
    text.push_str(&prompt[copied..]);

    Ok(MaskedPrompt {
        text: trim_unescaped(&text).to_string(),
        answers,
        markers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn options() -> ParseOptions {
        ParseOptions::new("toan", "MA101")
    }

    #[test]
    fn test_single_choice_two_way() {
        let out = parse(r"\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}", &options()).unwrap();
        assert!(out.warnings.is_empty());
        assert_eq!(out.document.questions.len(), 1);

        let Question::SingleChoice(q) = &out.document.questions[0] else {
            panic!("Expected single choice question");
        };
        assert_eq!(q.uid.to_string(), "toan:MA101:g:q01");
        assert_eq!(q.prompt, "P");
        assert_eq!(q.choices.len(), 2);
        assert_eq!(q.choices[1].text, "Y");

        let answer = out.answers.single_choice(&q.uid).unwrap();
        assert_eq!(answer.correct_key, ChoiceKey::B);
        assert_eq!(answer.solution_markup.as_deref(), Some("S"));
        assert_eq!(out.document.version_id, "g");
        assert_eq!(out.document.version_index, 1);
    }

    #[rstest]
    #[case(r"\haipa{1}{x}{y}", ChoiceKey::A)]
    #[case(r"\bapa{c}{x}{y}{z}", ChoiceKey::C)]
    #[case(r"\bonpa {4} {a} {b} {c} {d}", ChoiceKey::D)]
    #[case(r"\nampa{E}{a}{b}{c}{d}{e}", ChoiceKey::E)]
    fn test_choice_block_correct(#[case] block: &str, #[case] expected: ChoiceKey) {
        let parsed = parse_choice_block(block).unwrap();
        assert_eq!(parsed.correct, expected);
    }

    #[rstest]
    #[case(r"{A}{x}{y}")]
    #[case(r"\saupa{A}{x}{y}")]
    #[case(r"\haipa{C}{x}{y}")]
    #[case(r"\haipa{3}{x}{y}")]
    #[case(r"\haipa{0}{x}{y}")]
    #[case(r"\haipa{AB}{x}{y}")]
    #[case(r"\bapa{A}{x}{y}")]
    #[case(r"\haipa{A}{x}{y} tail")]
    fn test_choice_block_rejects(#[case] block: &str) {
        assert!(parse_choice_block(block).is_err());
    }

    #[test]
    fn test_fill_blank_markers() {
        let src = r"\baidienkhuyet{g:q02}{Tính \blank{a^{b}} và \answer{c} rồi \daugach{}}{}";
        let out = parse(src, &options()).unwrap();
        assert!(out.warnings.is_empty());

        let Question::FillBlank(q) = &out.document.questions[0] else {
            panic!("Expected fill blank question");
        };
        assert_eq!(q.blank_count, 2);
        assert_eq!(q.prompt, "Tính [[blank]] và [[blank]] rồi [[blank]]");

        let answer = out.answers.fill_blank(&q.uid).unwrap();
        assert_eq!(answer.accepted_answers, vec!["a^{b}", "c"]);
        assert_eq!(answer.blank_count, 2);
        assert_eq!(answer.solution_markup, None);
    }

    #[test]
    fn test_fill_blank_optional_arguments_ignored() {
        let src = r"\baidienkhuyet[1][x]{g:q03}{x = \blank{2}}{Vì sao}";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].prompt(), "x = [[blank]]");
    }

    #[test]
    fn test_fill_blank_without_markers_dropped() {
        let src = r"\baidienkhuyet{g:q04}{no blanks here}{}
\baidienkhuyet{g:q05}{x = \blank{1}}{}";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].id().raw, "g:q05");
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].kind, WarningKind::MalformedQuestion);
        assert_eq!(out.warnings[0].subject.as_deref(), Some("g:q04"));
    }

    #[test]
    fn test_missing_argument_resumes() {
        let src = r"\baitracnghiem{g:q01}{P} oops
\baitracnghiem{g:q02}{P}{\haipa{A}{x}{y}}{}";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].id().raw, "g:q02");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].message.contains("line 1"));
    }

    #[test]
    fn test_bad_id_is_warning() {
        let src = r"\baitracnghiem{nonsense}{P}{\haipa{A}{x}{y}}{}";
        let out = parse(src, &options()).unwrap();
        assert!(out.document.questions.is_empty());
        assert_eq!(out.warnings[0].kind, WarningKind::MalformedQuestion);
        assert_eq!(out.document.version_id, MIXED_VERSION_ID);
    }

    #[test]
    fn test_unbalanced_is_fatal() {
        let src = "\\baitracnghiem{g:q01}{P}{\\haipa{A}{x}{y}}{}\n\\baitracnghiem{g:q02}{P";
        let err = parse(src, &options()).unwrap_err();
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_nested_commands_are_not_top_level() {
        let src = r"{\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}}";
        let out = parse(src, &options()).unwrap();
        assert!(out.document.questions.is_empty());
    }

    #[test]
    fn test_escaped_command_ignored() {
        let src = r"\\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}";
        let out = parse(src, &options()).unwrap();
        assert!(out.document.questions.is_empty());
    }

    #[test]
    fn test_comments_stripped() {
        let src = "% \\baitracnghiem{g:q09}{P}{\\haipa{A}{x}{y}}{}\n\\baitracnghiem{g:q01}{50\\% of {x}}{\\haipa{A}{x}{y}}{} % trailing";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].prompt(), r"50\% of {x}");
    }

    #[test]
    fn test_version_id_rules() {
        let src = r"\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}
\baitracnghiem{h:q01}{P}{\haipa{A}{x}{y}}{}";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.version_id, MIXED_VERSION_ID);

        let out = parse(src, &options().with_topic("de-1").with_version_index(3)).unwrap();
        assert_eq!(out.document.version_id, "de-1");
        assert_eq!(out.document.version_index, 3);
    }

    #[test]
    fn test_level_filter() {
        let src = r"\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}
\baitracnghiem{advanceg:q01}{P}{\haipa{A}{x}{y}}{}";
        let out = parse(src, &options().with_level(Level::Advance)).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].id().level, Level::Advance);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_uid_skipped() {
        let src = r"\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}
\baitracnghiem{g:q01}{Q}{\haipa{B}{x}{y}}{}";
        let out = parse(src, &options()).unwrap();
        assert_eq!(out.document.questions.len(), 1);
        assert_eq!(out.document.questions[0].prompt(), "P");
        assert_eq!(out.answers.len(), 1);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_crlf_source_parses_like_lf() {
        let crlf = "\\baitracnghiem{g:q01}{Dòng 1\r\nDòng 2}{\\haipa{A}{x}{y}}{Lời\r\ngiải}\r\n\r\n\\baidienkhuyet{g:q02}{a\r\n\\blank{1}}{}";
        let lf = crlf.replace("\r\n", "\n");
        let from_crlf = parse(crlf, &options()).unwrap();
        let from_lf = parse(&lf, &options()).unwrap();

        assert_eq!(from_crlf.document, from_lf.document);
        assert_eq!(from_crlf.answers, from_lf.answers);
        assert_eq!(from_crlf.document.questions[0].prompt(), "Dòng 1\nDòng 2");
    }

    #[test]
    fn test_escaped_trailing_space_survives_building() {
        let src = r"\baitracnghiem{g:q01}{Giá trị $x$\ }{\haipa{A}{x\ }{y}}{Vì $y$\ }
\baidienkhuyet{g:q02}{\blank{$a$\ } và $b$\ }{}";
        let out = parse(src, &options()).unwrap();
        assert!(out.warnings.is_empty());

        let Question::SingleChoice(q) = &out.document.questions[0] else {
            panic!("Expected single choice question");
        };
        assert_eq!(q.prompt, r"Giá trị $x$\ ");
        assert_eq!(q.choices[0].text, r"x\ ");
        let answer = out.answers.single_choice(&q.uid).unwrap();
        assert_eq!(answer.solution_markup.as_deref(), Some(r"Vì $y$\ "));

        let Question::FillBlank(q) = &out.document.questions[1] else {
            panic!("Expected fill blank question");
        };
        assert_eq!(q.prompt, r"[[blank]] và $b$\ ");
        let answer = out.answers.fill_blank(&q.uid).unwrap();
        assert_eq!(answer.accepted_answers, vec![r"$a$\ ".to_string()]);

        let rebuilt = crate::markup::build(&out.document, &out.answers, &Default::default());
        let again = parse(&rebuilt, &options()).unwrap();
        assert_eq!(again.document, out.document);
        assert_eq!(again.answers, out.answers);
    }

    #[test]
    fn test_bare_marker_only_keeps_solution() {
        let src = r"\baidienkhuyet{g:q01}{Chọn đáp án \daugach{}}{Lời giải}";
        let out = parse(src, &options()).unwrap();
        assert!(out.warnings.is_empty());

        let Question::FillBlank(q) = &out.document.questions[0] else {
            panic!("Expected fill blank question");
        };
        assert_eq!(q.blank_count, 0);
        assert_eq!(q.prompt, "Chọn đáp án [[blank]]");
        let answer = out.answers.fill_blank(&q.uid).unwrap();
        assert!(answer.accepted_answers.is_empty());
        assert_eq!(answer.solution_markup.as_deref(), Some("Lời giải"));
    }

    #[test]
    fn test_mask_prompt_marker_without_group_is_text() {
        let masked = mask_prompt(r"\blank and \daugach").unwrap();
        assert_eq!(masked.markers, 1);
        assert_eq!(masked.text, r"\blank and [[blank]]");
        assert!(masked.answers.is_empty());
    }
}
