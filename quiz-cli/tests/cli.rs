use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const QUIZ: &str = r"% Đề kiểm tra
\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}

\baidienkhuyet{g:q02}{\blank{4} + \answer{5} = 9}{}
";

const FIGURES: &str = r"\begin{figure}\includegraphics{a}\label{fig:1}\end{figure}
\begin{align}
a &= b \label{eq:1} \\
c &= d \label{eq:2}
\end{align}
Xem \figref{fig:1} và \eqref{eq:2}.
";

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn parse_prints_json() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "de.tex", QUIZ);

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("parse")
        .arg(&quiz)
        .arg("--subject")
        .arg("toan")
        .arg("--course")
        .arg("MA101");

    let output_pred = predicate::str::contains("\"toan:MA101:g:q01\"")
        .and(predicate::str::contains("\"correct_key\": \"B\""))
        .and(predicate::str::contains("\"version_id\": \"g\""));
    cmd.assert().success().stdout(output_pred);
}

#[test]
fn structural_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "hong.tex", "\\baidienkhuyet{g:q01}{x = \\blank{1}{}");

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("parse").arg(&quiz);
    cmd.assert().failure().code(1).stderr(predicate::str::contains("Error:"));
}

#[test]
fn export_then_import_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "de.tex", QUIZ);
    let package = dir.path().join("package");

    let mut export = cargo_bin_cmd!("quizconv");
    export.arg("export").arg(&quiz).arg("--out").arg(&package);
    export.assert().success();
    assert!(package.join("imsmanifest.xml").is_file());

    let mut import = cargo_bin_cmd!("quizconv");
    import.arg("import").arg(&package);
    let output_pred = predicate::str::contains(r"\baitracnghiem{g:q01}{P}{\haipa{B}{X}{Y}}{S}")
        .and(predicate::str::contains(r"\baidienkhuyet{g:q02}{\blank{4} + \blank{5} = 9}{}"));
    import.assert().success().stdout(output_pred);
}

#[test]
fn export_renames_repeated_version_ids() {
    let dir = tempfile::tempdir().unwrap();
    let first = write(dir.path(), "de-1.tex", r"\baitracnghiem{g:q01}{P}{\haipa{A}{X}{Y}}{}");
    let second = write(dir.path(), "de-2.tex", r"\baitracnghiem{g:q02}{Q}{\haipa{B}{X}{Y}}{}");
    let package = dir.path().join("package");

    cargo_bin_cmd!("quizconv")
        .arg("export")
        .arg(&first)
        .arg(&second)
        .arg("--out")
        .arg(&package)
        .assert()
        .success();

    let mut import = cargo_bin_cmd!("quizconv");
    import.arg("import").arg(&package);
    let output_pred = predicate::str::contains("% g (version 1)")
        .and(predicate::str::contains("% g-2 (version 2)"))
        .and(predicate::str::contains(r"\baitracnghiem{g:q02}{Q}{\haipa{B}{X}{Y}}{}"));
    import.assert().success().stdout(output_pred);
}

#[test]
fn import_without_solutions() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "de.tex", QUIZ);
    let package = dir.path().join("package");

    cargo_bin_cmd!("quizconv")
        .arg("export")
        .arg(&quiz)
        .arg("--out")
        .arg(&package)
        .assert()
        .success();

    cargo_bin_cmd!("quizconv")
        .arg("import")
        .arg(&package)
        .arg("--no-solutions")
        .assert()
        .success()
        .stdout(predicate::str::contains(r"{\haipa{B}{X}{Y}}{}"));
}

#[test]
fn split_export_warns() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "de.tex", QUIZ);

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("export")
        .arg(&quiz)
        .arg("--out")
        .arg(dir.path().join("package"))
        .arg("--split");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("split into 2 items"));
}

#[test]
fn import_without_manifest_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "không phải gói");

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("import").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Package has no manifest"));
}

#[test]
fn config_file_sets_uid_scheme() {
    let dir = tempfile::tempdir().unwrap();
    let quiz = write(dir.path(), "de.tex", QUIZ);
    let config = write(dir.path(), "quiz.toml", "[markup]\nsubject = \"ly\"\ncourse_code = \"PH1\"\n");

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("--config").arg(&config).arg("parse").arg(&quiz);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"ly:PH1:g:q02\""));
}

#[test]
fn labels_print_table() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "hinh.tex", FIGURES);

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("labels").arg(&doc);
    let output_pred = predicate::str::contains("\"fig:1\": \"1\"")
        .and(predicate::str::contains("\"eq:1\": \"2\""))
        .and(predicate::str::contains("\"eq:2\": \"3\""));
    cmd.assert().success().stdout(output_pred);
}

#[test]
fn labels_rewrite_references() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "hinh.tex", FIGURES);

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("labels").arg(&doc).arg("--rewrite").arg("--lang").arg("en");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Xem Figure 1 và (3)."));
}

#[test]
fn labels_from_aux_file() {
    let dir = tempfile::tempdir().unwrap();
    let doc = write(dir.path(), "hinh.tex", "Xem \\figref{fig:1}.");
    let aux = write(
        dir.path(),
        "hinh.aux",
        "\\newlabel{fig:1}{{2.1}{3}{}{figure.2.1}{}}\n",
    );

    let mut cmd = cargo_bin_cmd!("quizconv");
    cmd.arg("labels").arg(&doc).arg("--aux").arg(&aux).arg("--rewrite");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Xem Hình 2.1."));
}
