//! Command-line interface for the quiz converter
//! Converts quiz source markup to LMS exchange packages and back, and numbers figure/equation
//! labels across a batch of markup files.
//!
//! Usage:
//!   quizconv parse `<file>`                      - Parsed questions, answers and warnings as JSON
//!   quizconv export `<files>`... --out `<dir>`   - Markup files to a package directory
//!   quizconv import `<dir>`                      - Package directory to markup on stdout
//!   quizconv labels `<files>`... [--rewrite]     - Label table as JSON, or rewritten documents
//!
//! A package is a plain directory here; zipping it is left to other tools. Warnings are logged to
//! stderr and never fail a run. Unreadable input and structural markup errors exit with 1.

mod package_dir;

use clap::{Arg, ArgAction, ArgMatches, Command};
use quiz_babel::{build_package, parse_package, Asset};
use quiz_config::{Loader, QuizConfig};
use quiz_parser::labels::{collect_sequential_labels, harvest_aux_labels, replace_references, Language};
use quiz_parser::markup::{build, parse};
use quiz_parser::model::{AnswerKey, Level};
use std::collections::HashSet;
use std::fmt::Display;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() {
    let matches = Command::new("quizconv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert quiz markup to and from LMS exchange packages")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML file layered over the built-in defaults")
                .global(true),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .help("Scheme part of question uids (overrides markup.subject)")
                .global(true),
        )
        .arg(
            Arg::new("course")
                .long("course")
                .help("Course code part of question uids (overrides markup.course_code)")
                .global(true),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a markup file and print the result as JSON")
                .arg(Arg::new("file").help("Markup file").required(true).index(1))
                .arg(
                    Arg::new("topic")
                        .long("topic")
                        .help("Force the version id instead of deriving it from the question topics"),
                )
                .arg(
                    Arg::new("level")
                        .long("level")
                        .help("Keep only questions of this level")
                        .value_parser(["basic", "advance"]),
                )
                .arg(
                    Arg::new("version-index")
                        .long("version-index")
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Convert markup files into an exchange package directory")
                .arg(
                    Arg::new("files")
                        .help("Markup files, one quiz each")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .short('o')
                        .value_name("DIR")
                        .help("Package directory to write")
                        .required(true),
                )
                .arg(
                    Arg::new("split")
                        .long("split")
                        .help("One item per blank for multi-blank questions")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("assets")
                        .long("assets")
                        .value_name("DIR")
                        .help("Directory holding the images referenced as [[img:<name>]]"),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Convert an exchange package directory back into markup")
                .arg(Arg::new("dir").help("Package directory").required(true).index(1))
                .arg(
                    Arg::new("no-solutions")
                        .long("no-solutions")
                        .help("Leave solution groups empty")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("assets-out")
                        .long("assets-out")
                        .value_name("DIR")
                        .help("Write the images referenced by imported prompts here"),
                ),
        )
        .subcommand(
            Command::new("labels")
                .about("Number figure and equation labels across markup files, in the order given")
                .arg(
                    Arg::new("files")
                        .help("Markup files")
                        .required(true)
                        .num_args(1..)
                        .index(1),
                )
                .arg(
                    Arg::new("rewrite")
                        .long("rewrite")
                        .help("Print the documents with references replaced by their numbers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .help("Language of figure reference nouns")
                        .value_parser(["vi", "en"]),
                )
                .arg(
                    Arg::new("aux")
                        .long("aux")
                        .value_name("FILE")
                        .help("Take the label table from a typesetting .aux file instead"),
                ),
        )
        .get_matches();

    init_logging();

    match matches.subcommand() {
        Some(("parse", sub)) => handle_parse_command(sub),
        Some(("export", sub)) => handle_export_command(sub),
        Some(("import", sub)) => handle_import_command(sub),
        Some(("labels", sub)) => handle_labels_command(sub),
        _ => unreachable!("a subcommand is required"),
    }
}

/// Warnings and debug output go to stderr; RUST_LOG overrides the `warn` default
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn fail(message: impl Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Defaults, then --config, then flag overrides
fn load_config(matches: &ArgMatches, overrides: &[(&str, String)]) -> QuizConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }

    let mut all: Vec<(&str, String)> = Vec::new();
    if let Some(subject) = matches.get_one::<String>("subject") {
        all.push(("markup.subject", subject.clone()));
    }
    if let Some(course) = matches.get_one::<String>("course") {
        all.push(("markup.course_code", course.clone()));
    }
    all.extend(overrides.iter().cloned());

    for (key, value) in all {
        loader = loader
            .set_override(key, value)
            .unwrap_or_else(|e| fail(format!("Invalid setting {}: {}", key, e)));
    }
    loader
        .build()
        .unwrap_or_else(|e| fail(format!("Configuration error: {}", e)))
}

fn read_text(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| fail(format!("Cannot read {}: {}", path.display(), e)))
}

fn report_warnings(count: usize) {
    if count > 0 {
        eprintln!("{} warning(s)", count);
    }
}

fn handle_parse_command(matches: &ArgMatches) {
    let config = load_config(matches, &[]);
    let path = PathBuf::from(matches.get_one::<String>("file").expect("file is required"));

    let mut options = config.parse_options();
    if let Some(topic) = matches.get_one::<String>("topic") {
        options = options.with_topic(topic.as_str());
    }
    if let Some(level) = matches.get_one::<String>("level") {
        options = options.with_level(match level.as_str() {
            "advance" => Level::Advance,
            _ => Level::Basic,
        });
    }
    if let Some(index) = matches.get_one::<u32>("version-index") {
        options = options.with_version_index(*index);
    }

    let source = read_text(&path);
    let out = parse(&source, &options).unwrap_or_else(|e| fail(format!("{}: {}", path.display(), e)));
    report_warnings(out.warnings.len());

    let json = serde_json::json!({
        "document": out.document,
        "answers": out.answers,
        "warnings": out.warnings,
    });
    match serde_json::to_string_pretty(&json) {
        Ok(text) => println!("{}", text),
        Err(e) => fail(format!("Error formatting output: {}", e)),
    }
}

fn handle_export_command(matches: &ArgMatches) {
    let mut overrides = Vec::new();
    if matches.get_flag("split") {
        overrides.push(("exchange.fill_blank_mode", "split".to_string()));
    }
    let config = load_config(matches, &overrides);
    let out_dir = PathBuf::from(matches.get_one::<String>("out").expect("out is required"));

    let mut documents = Vec::new();
    let mut answers = AnswerKey::new();
    let mut version_ids = HashSet::new();
    let mut warning_count = 0;
    for (position, file) in matches.get_many::<String>("files").into_iter().flatten().enumerate() {
        let path = PathBuf::from(file);
        let options = config.parse_options().with_version_index(position as u32 + 1);
        let mut parsed = parse(&read_text(&path), &options)
            .unwrap_or_else(|e| fail(format!("{}: {}", path.display(), e)));
        warning_count += parsed.warnings.len();
        answers.extend(parsed.answers.iter().map(|(uid, answer)| (uid.clone(), answer.clone())));

        let document = &mut parsed.document;
        let taken = document.version_id.clone();
        while version_ids.contains(&document.version_id) {
            document.version_id = format!("{}-{}", document.version_id, document.version_index);
        }
        if document.version_id != taken {
            tracing::warn!(
                file = %path.display(),
                from = %taken,
                to = %document.version_id,
                "version id already used, renamed"
            );
        }
        version_ids.insert(document.version_id.clone());
        documents.push(parsed.document);
    }

    let assets: Vec<Asset> = match matches.get_one::<String>("assets") {
        Some(dir) => package_dir::read_assets(Path::new(dir))
            .unwrap_or_else(|e| fail(format!("Cannot read assets from {}: {}", dir, e))),
        None => Vec::new(),
    };

    let built = build_package(&documents, &answers, &assets, &config.export_options())
        .unwrap_or_else(|e| fail(e));
    warning_count += built.warnings.len();

    package_dir::write_package(&out_dir, &built.package)
        .unwrap_or_else(|e| fail(format!("Cannot write {}: {}", out_dir.display(), e)));
    report_warnings(warning_count);
    eprintln!(
        "Wrote {} quiz(zes), {} blob(s) to {}",
        documents.len(),
        built.package.len(),
        out_dir.display()
    );
}

fn handle_import_command(matches: &ArgMatches) {
    let mut overrides = Vec::new();
    if matches.get_flag("no-solutions") {
        overrides.push(("markup.include_solutions", "false".to_string()));
    }
    let config = load_config(matches, &overrides);
    let dir = PathBuf::from(matches.get_one::<String>("dir").expect("dir is required"));

    let package = package_dir::read_package(&dir)
        .unwrap_or_else(|e| fail(format!("Cannot read {}: {}", dir.display(), e)));
    let imported = parse_package(&package, &config.import_options()).unwrap_or_else(|e| fail(e));

    if let Some(assets_dir) = matches.get_one::<String>("assets-out") {
        package_dir::write_assets(Path::new(assets_dir), &imported.assets)
            .unwrap_or_else(|e| fail(format!("Cannot write assets to {}: {}", assets_dir, e)));
    }

    let rendered: Vec<String> = imported
        .documents
        .iter()
        .map(|document| {
            format!(
                "% {} (version {})\n{}",
                document.version_id,
                document.version_index,
                build(document, &imported.answers, &config.build_options())
            )
        })
        .collect();
    print!("{}", rendered.join("\n"));
    report_warnings(imported.warnings.len());
}

fn handle_labels_command(matches: &ArgMatches) {
    let mut overrides = Vec::new();
    if let Some(lang) = matches.get_one::<String>("lang") {
        overrides.push(("labels.language", lang.clone()));
    }
    let config = load_config(matches, &overrides);
    let language: Language = config.language();

    let documents: Vec<String> = matches
        .get_many::<String>("files")
        .into_iter()
        .flatten()
        .map(|file| read_text(Path::new(file)))
        .collect();

    let table = match matches.get_one::<String>("aux") {
        Some(aux) => harvest_aux_labels(&read_text(Path::new(aux))),
        None => collect_sequential_labels(documents.as_slice()),
    };

    if matches.get_flag("rewrite") {
        for document in &documents {
            print!("{}", replace_references(document, &table, language));
        }
        return;
    }
    match serde_json::to_string_pretty(&table) {
        Ok(text) => println!("{}", text),
        Err(e) => fail(format!("Error formatting labels: {}", e)),
    }
}
