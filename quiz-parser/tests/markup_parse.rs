//! Parser scenarios over whole documents

use quiz_parser::markup::{build, parse, BuildOptions, ParseOptions, MIXED_VERSION_ID};
use quiz_parser::model::{ChoiceKey, Level, Question};
use quiz_parser::WarningKind;
use rstest::rstest;

fn options() -> ParseOptions {
    ParseOptions::new("toan", "MA101")
}

#[test]
fn test_single_choice_scenario() {
    let out = parse(r"\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}", &options()).unwrap();

    assert_eq!(out.document.questions.len(), 1);
    let Question::SingleChoice(q) = &out.document.questions[0] else {
        panic!("Expected a single choice question");
    };
    assert_eq!(q.choices.len(), 2);
    assert_eq!(q.uid.id.topic, "g");
    assert_eq!(q.uid.id.level, Level::Basic);
    assert_eq!(q.uid.id.number, 1);
    assert_eq!(
        out.answers.single_choice(&q.uid).unwrap().correct_key,
        ChoiceKey::B
    );
}

#[test]
fn test_fill_blank_scenario() {
    let src = r"\baidienkhuyet{advanceg:q07}{Cho \blank{a^{b}} và \answer{c}, bỏ qua \daugach{}.}{}";
    let out = parse(src, &options()).unwrap();

    let Question::FillBlank(q) = &out.document.questions[0] else {
        panic!("Expected a fill blank question");
    };
    assert_eq!(q.blank_count, 2);
    assert_eq!(q.prompt.matches("[[blank]]").count(), 3);
    assert_eq!(q.uid.id.level, Level::Advance);
    assert_eq!(
        out.answers.fill_blank(&q.uid).unwrap().accepted_answers,
        vec!["a^{b}".to_string(), "c".to_string()]
    );
}

#[test]
fn test_bad_questions_do_not_abort_batch() {
    let src = r"
\baitracnghiem{g:q01}{Đúng}{\bapa{2}{x}{y}{z}}{}
\baitracnghiem{g:q02}{Sai số lựa chọn}{\bapa{A}{x}{y}}{}
\baitracnghiem{g:q03}{Sai đáp án}{\haipa{D}{x}{y}}{}
\baitracnghiem{g-q04}{Sai id}{\haipa{A}{x}{y}}{}
\baidienkhuyet{g:q05}{Không có chỗ trống}{}
\baidienkhuyet{g:q06}{Có \blank{1} chỗ}{}
";
    let out = parse(src, &options()).unwrap();

    let ids: Vec<&str> = out
        .document
        .questions
        .iter()
        .map(|q| q.id().raw.as_str())
        .collect();
    assert_eq!(ids, vec!["g:q01", "g:q06"]);
    assert_eq!(out.warnings.len(), 4);
    assert!(out
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::MalformedQuestion));
    assert_eq!(out.document.version_id, "g");
}

#[test]
fn test_structural_error_reports_location() {
    let src = "\\baitracnghiem{g:q01}{P}{\\haipa{A}{x}{y}}{}\n\n\\baidienkhuyet{g:q02}{x = \\blank{1}{}";
    let err = parse(src, &options()).unwrap_err();
    assert_eq!(err.location().line, 3);
    assert!(err.to_string().contains(">>   3 |"));
}

#[rstest]
#[case(r"\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}", 1)]
#[case(r"\baitracnghiem {g:q01} {P} {\haipa{B}{X}{Y}} {S}", 1)]
#[case(r"\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}", 0)]
#[case(r"\baitracnghiemx{g:q01}{P}{\haipa{B}{X}{Y}}{S}", 0)]
#[case(r"\begin{itemize}\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}\end{itemize}", 1)]
fn test_command_recognition(#[case] src: &str, #[case] expected: usize) {
    let out = parse(src, &options()).unwrap();
    assert_eq!(out.document.questions.len(), expected);
}

#[test]
fn test_mixed_topics() {
    let src = r"\baitracnghiem{g:q01}{P}{\haipa{A}{x}{y}}{}
\baidienkhuyet{h:q01}{\blank{1}}{}";
    let out = parse(src, &options()).unwrap();
    assert_eq!(out.document.version_id, MIXED_VERSION_ID);
}

#[test]
fn test_builder_output_layout() {
    let src = r"
% đề kiểm tra
\baitracnghiem{ g:q01 }{ P }{\haipa { b }{X}{ Y }}{ S }
\baidienkhuyet[3][x]{g:q02}{x = \answer{1} và \daugach}{}
";
    let out = parse(src, &options()).unwrap();
    let markup = build(&out.document, &out.answers, &BuildOptions::default());
    insta::assert_snapshot!(markup.trim_end(), @r"
    \baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}

    \baidienkhuyet{g:q02}{x = \blank{1} và \daugach{}}{}
    ");
}
