//! Import of hand-written packages: shapes the markup side never produces

use quiz_babel::exchange::{HtmlNormalizer, NormalizedHtml};
use quiz_babel::{parse_package, parse_package_with, CodecError, ImportOptions, Package};
use quiz_parser::markup::{build, BuildOptions};
use quiz_parser::model::{ChoiceKey, Question, Uid};
use quiz_parser::WarningKind;

const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="m" xmlns="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1">
  <resources>
    <resource identifier="q1" type="imsqti_xmlv1p2">
      <file href="q1/q1.xml"/>
      <dependency identifierref="q1_meta"/>
    </resource>
    <resource identifier="q1_meta" type="associatedcontent/imscc_xmlv1p1/learning-application-resource" href="q1/assessment_meta.xml">
      <file href="q1/assessment_meta.xml"/>
    </resource>
  </resources>
</manifest>"#;

const META: &str = r#"<quiz identifier="q1"><title>de-thi</title><version_index>3</version_index></quiz>"#;

fn item(ident: &str, question_type: &str, prompt: &str, choices: &str, processing: &str) -> String {
    format!(
        r#"<item ident="{ident}" title="x">
  <itemmetadata><qtimetadata>
    <qtimetadatafield><fieldlabel>question_type</fieldlabel><fieldentry>{question_type}</fieldentry></qtimetadatafield>
  </qtimetadata></itemmetadata>
  <presentation>
    <material><mattext texttype="text/html">{prompt}</mattext></material>
    {choices}
  </presentation>
  <resprocessing>{processing}</resprocessing>
</item>"#
    )
}

fn label(ident: &str, text: &str) -> String {
    format!(
        r#"<response_label ident="{ident}"><material><mattext texttype="text/plain">{text}</mattext></material></response_label>"#
    )
}

fn scored(conditions: &str) -> String {
    format!(
        r#"<respcondition continue="No"><conditionvar>{conditions}</conditionvar><setvar action="Set" varname="SCORE">100</setvar></respcondition>"#
    )
}

fn package(items: &[String]) -> Package {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<questestinterop xmlns="http://www.imsglobal.org/xsd/ims_qtiasiv1p2">
  <assessment ident="q1" title="de-thi"><section ident="root_section">{}</section></assessment>
</questestinterop>"#,
        items.concat()
    );
    [
        ("imsmanifest.xml", MANIFEST.to_string()),
        ("q1/assessment_meta.xml", META.to_string()),
        ("q1/q1.xml", document),
    ]
    .into_iter()
    .collect()
}

fn true_false(ident: &str) -> String {
    item(
        ident,
        "true_false_question",
        "&lt;p&gt;2 là số chẵn&lt;/p&gt;",
        &format!(
            r#"<response_lid ident="response1"><render_choice>{}{}</render_choice></response_lid>"#,
            label("t1", "Đúng"),
            label("t2", "Sai")
        ),
        &scored(r#"<varequal respident="response1">t1</varequal>"#),
    )
}

fn uid(raw: &str) -> Uid {
    Uid::parse(raw).unwrap()
}

#[test]
fn test_unknown_question_type_is_dropped_with_warning() {
    let package = package(&[
        true_false("toan:MA101:g:q01"),
        item("toan:MA101:g:q02", "unknown_x", "Viết bài luận", "", ""),
        item(
            "toan:MA101:g:q03",
            "short_answer_question",
            "1 + 1 = _____",
            "",
            &scored(r#"<varequal respident="response1">2</varequal>"#),
        ),
    ]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::UnknownQuestionType);
    assert_eq!(
        out.warnings[0].message,
        "Unknown question_type 'unknown_x' for toan:MA101:g:q02"
    );

    let document = &out.documents[0];
    assert_eq!(document.version_id, "de-thi");
    assert_eq!(document.version_index, 3);
    let ids: Vec<&str> = document.questions.iter().map(|q| q.id().raw.as_str()).collect();
    assert_eq!(ids, vec!["g:q01", "g:q03"]);

    let Question::SingleChoice(q) = &document.questions[0] else {
        panic!("Expected a single choice question");
    };
    assert_eq!(q.prompt, "2 là số chẵn");
    assert_eq!(q.choices.len(), 2);
    assert_eq!(
        out.answers.single_choice(&q.uid).unwrap().correct_key,
        ChoiceKey::A
    );
    assert_eq!(
        out.answers.fill_blank(&uid("toan:MA101:g:q03")).unwrap().accepted_answers,
        vec!["2".to_string()]
    );
}

#[test]
fn test_multi_select_becomes_key_list() {
    let package = package(&[item(
        "toan:MA101:g:q03",
        "multiple_answers_question",
        "Chọn số chẵn",
        &format!(
            r#"<response_lid ident="response1" rcardinality="Multiple"><render_choice>{}{}{}</render_choice></response_lid>"#,
            label("1001", "Hai"),
            label("1002", "Ba"),
            label("1003", "Bốn")
        ),
        &scored(
            r#"<and><varequal respident="response1">1003</varequal><not><varequal respident="response1">1002</varequal></not><varequal respident="response1">1001</varequal></and>"#,
        ),
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::LossyConversion);

    let answer = out.answers.fill_blank(&uid("toan:MA101:g:q03")).unwrap();
    assert_eq!(answer.accepted_answers, vec!["A,C".to_string()]);
    assert!(answer.notes.is_some());

    let markup = build(&out.documents[0], &out.answers, &BuildOptions::default());
    insta::assert_snapshot!(markup.trim_end(), @r"
    \baidienkhuyet{g:q03}{Chọn số chẵn
    A. Hai
    B. Ba
    C. Bốn
    \blank{A,C}}{}
    ");
}

#[test]
fn test_dropdowns_become_one_fill_blank() {
    let color = format!(
        r#"<response_lid ident="response_color"><material><mattext>color</mattext></material><render_choice>{}{}</render_choice></response_lid>"#,
        label("c1", "đỏ"),
        label("c2", "xanh")
    );
    let size = format!(
        r#"<response_lid ident="response_size"><render_choice>{}{}</render_choice></response_lid>"#,
        label("s1", "to"),
        label("s2", "nhỏ")
    );
    let processing = [
        scored(r#"<varequal respident="response_color">c2</varequal>"#),
        scored(r#"<varequal respident="response_size">s1</varequal>"#),
    ]
    .concat();
    let package = package(&[item(
        "toan:MA101:g:q04",
        "multiple_dropdowns_question",
        "Lá cây màu [color], quả táo [size]",
        &(color + &size),
        &processing,
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::LossyConversion);

    let Question::FillBlank(q) = &out.documents[0].questions[0] else {
        panic!("Expected a fill blank question");
    };
    assert_eq!(q.blank_count, 2);
    assert_eq!(
        q.prompt,
        "Lá cây màu [[blank]], quả táo [[blank]]\n(color: đỏ / xanh)\n(size: to / nhỏ)"
    );
    let answer = out.answers.fill_blank(&q.uid).unwrap();
    assert_eq!(answer.accepted_answers, vec!["xanh".to_string(), "to".to_string()]);
    assert!(answer.is_consistent());
}

#[test]
fn test_short_answer_alternatives_are_noted() {
    let package = package(&[item(
        "toan:MA101:g:q05",
        "short_answer_question",
        "Thủ đô của Việt Nam: _____",
        "",
        &scored(
            r#"<varequal respident="response1">Hà Nội</varequal><varequal respident="response1">Ha Noi</varequal>"#,
        ),
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::LossyConversion);
    let answer = out.answers.fill_blank(&uid("toan:MA101:g:q05")).unwrap();
    assert_eq!(answer.accepted_answers, vec!["Hà Nội".to_string()]);
    assert_eq!(answer.notes.as_deref(), Some("Alternative answers: Ha Noi"));
    assert_eq!(out.documents[0].questions[0].prompt(), "Thủ đô của Việt Nam: [[blank]]");
}

#[test]
fn test_short_answer_without_blank_gets_one() {
    let package = package(&[item(
        "toan:MA101:g:q06",
        "short_answer_question",
        "Thủ đô của Việt Nam?",
        "",
        &scored(r#"<varequal respident="response1">Hà Nội</varequal>"#),
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();
    assert!(out.warnings.is_empty());
    assert_eq!(out.documents[0].questions[0].prompt(), "Thủ đô của Việt Nam? [[blank]]");
}

#[test]
fn test_short_answer_without_values_keeps_an_empty_answer() {
    let package = package(&[item(
        "toan:MA101:g:q06",
        "short_answer_question",
        "Chọn đáp án _____",
        "",
        "",
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::MissingAnswerData);

    let Question::FillBlank(q) = &out.documents[0].questions[0] else {
        panic!("Expected a fill blank question");
    };
    assert_eq!(q.blank_count, 0);
    assert_eq!(q.prompt, "Chọn đáp án [[blank]]");
    let answer = out.answers.fill_blank(&q.uid).unwrap();
    assert!(answer.accepted_answers.is_empty());
    assert!(answer.is_consistent());
}

#[test]
fn test_single_choice_underscores_are_text() {
    let package = package(&[item(
        "toan:MA101:g:q09",
        "multiple_choice_question",
        "Điền vào chỗ trống: _____",
        &format!(
            r#"<response_lid ident="response1"><render_choice>{}{}</render_choice></response_lid>"#,
            label("a1", "_____"),
            label("a2", "x")
        ),
        &scored(r#"<varequal respident="response1">a1</varequal>"#),
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();
    assert!(out.warnings.is_empty());

    let Question::SingleChoice(q) = &out.documents[0].questions[0] else {
        panic!("Expected a single choice question");
    };
    assert_eq!(q.prompt, "Điền vào chỗ trống: _____");
    assert_eq!(q.choices[0].text, "_____");
}

#[test]
fn test_bad_items_are_skipped() {
    let six_choices: String = ["a", "b", "c", "d", "e", "f"]
        .iter()
        .map(|id| label(id, id))
        .collect();
    let package = package(&[
        true_false("not a uid"),
        item(
            "toan:MA101:g:q07",
            "multiple_choice_question",
            "Quá nhiều lựa chọn",
            &format!(r#"<response_lid ident="response1"><render_choice>{six_choices}</render_choice></response_lid>"#),
            "",
        ),
        true_false("toan:MA101:g:q08"),
        true_false("toan:MA101:g:q08"),
    ]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.documents[0].questions.len(), 1);
    assert_eq!(out.warnings.len(), 3);
    assert!(out
        .warnings
        .iter()
        .all(|w| w.kind == WarningKind::MalformedQuestion));
}

#[test]
fn test_missing_correct_choice_keeps_question() {
    let package = package(&[item(
        "toan:MA101:g:q09",
        "multiple_choice_question",
        "Chọn",
        &format!(
            r#"<response_lid ident="response1"><render_choice>{}{}</render_choice></response_lid>"#,
            label("x", "1"),
            label("y", "2")
        ),
        "",
    )]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(out.documents[0].questions.len(), 1);
    assert!(out.answers.is_empty());
    assert_eq!(out.warnings[0].kind, WarningKind::MissingAnswerData);
}

#[test]
fn test_images_resolve_against_web_resources() {
    let mut package = package(&[item(
        "toan:MA101:g:q10",
        "short_answer_question",
        r#"&lt;p&gt;&lt;img src="$IMS-CC-FILEBASE$/hinh.png"&gt; &lt;img src="$IMS-CC-FILEBASE$/mat.png"&gt; _____&lt;/p&gt;"#,
        "",
        &scored(r#"<varequal respident="response1">3</varequal>"#),
    )]);
    package.insert("web_resources/hinh.png", vec![1u8, 2, 3]);
    let out = parse_package(&package, &ImportOptions::default()).unwrap();

    assert_eq!(
        out.documents[0].questions[0].prompt(),
        "[[img:hinh.png]] [[img:mat.png]] [[blank]]"
    );
    assert_eq!(out.assets.len(), 1);
    assert_eq!(out.assets[0].name, "hinh.png");
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(out.warnings[0].kind, WarningKind::UnresolvedAsset);
}

#[test]
fn test_missing_manifest_is_an_error() {
    let package: Package = [("q1/q1.xml", "<questestinterop/>")].into_iter().collect();
    let err = parse_package(&package, &ImportOptions::default()).unwrap_err();
    assert_eq!(err, CodecError::ManifestNotFound);
}

struct Upper;

impl HtmlNormalizer for Upper {
    fn normalize(&self, html: &str) -> NormalizedHtml {
        NormalizedHtml {
            text: html.to_uppercase(),
            images: Vec::new(),
        }
    }
}

#[test]
fn test_custom_normalizer() {
    let package = package(&[true_false("toan:MA101:g:q01")]);
    let out = parse_package_with(&package, &ImportOptions::default(), &Upper).unwrap();
    assert_eq!(out.documents[0].questions[0].prompt(), "<P>2 LÀ SỐ CHẴN</P>");
}
