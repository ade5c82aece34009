//! Prompt HTML in both directions
//!
//!     Export renders markup-plain prompt text as HTML: specials escaped, newlines as `<br/>`,
//!     blank sentinels as a five-underscore run and resolvable asset placeholders as `<img>`.
//!
//!     Import goes through an [HtmlNormalizer]. The codec only relies on the normalized text and
//!     the list of image names; [DefaultNormalizer] is the html5ever-backed implementation.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use once_cell::sync::Lazy;
use quiz_parser::markup::lexer::trim_unescaped;
use quiz_parser::model::{count_blanks, BLANK_SENTINEL};
use regex::Regex;
use std::collections::BTreeSet;

/// How a blank is shown to students
pub const BLANK_RUN: &str = "_____";

/// Prefix exporters put in front of package-relative asset references
pub const FILE_BASE: &str = "$IMS-CC-FILEBASE$";

const ENCODED_FILE_BASE: &str = "%24IMS-CC-FILEBASE%24";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[img:([^\]]+)\]\]|\[\[blank\]\]").expect("valid placeholder regex"));

/// Asset placeholder token for `name`
pub fn image_placeholder(name: &str) -> String {
    format!("[[img:{}]]", name)
}

/// Rendered prompt plus the placeholders that had no asset to point at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub html: String,
    pub unresolved: Vec<String>,
}

/// Render prompt text as HTML. Unresolved placeholders stay in the text, escaped.
pub fn render_prompt(text: &str, assets: &BTreeSet<String>) -> RenderedPrompt {
    let mut html = String::with_capacity(text.len() + 16);
    let mut unresolved = Vec::new();
    let mut copied = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_escaped(&mut html, &text[copied..whole.start()]);
        match caps.get(1) {
            Some(name) if assets.contains(name.as_str()) => {
                html.push_str("<img src=\"");
                push_escaped(&mut html, &format!("{}/{}", FILE_BASE, name.as_str()));
                html.push_str("\"/>");
            }
            Some(name) => {
                unresolved.push(name.as_str().to_string());
                push_escaped(&mut html, whole.as_str());
            }
            None => html.push_str(BLANK_RUN),
        }
        copied = whole.end();
    }
    push_escaped(&mut html, &text[copied..]);

    RenderedPrompt { html, unresolved }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("<br/>"),
            '\r' => {}
            c => out.push(c),
        }
    }
}

/// Replace runs of exactly five underscores by the blank sentinel
pub fn restore_blanks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    let flush = |out: &mut String, run: usize| {
        if run == BLANK_RUN.len() {
            out.push_str(BLANK_SENTINEL);
        } else {
            out.extend(std::iter::repeat('_').take(run));
        }
    };
    for c in text.chars() {
        if c == '_' {
            run += 1;
            continue;
        }
        flush(&mut out, run);
        run = 0;
        out.push(c);
    }
    flush(&mut out, run);
    out
}

/// Whether the text holds underscore runs that import would read back as blanks
pub fn has_literal_blank_runs(text: &str) -> bool {
    count_blanks(&restore_blanks(text)) > count_blanks(text)
}

/// Asset name for an image source, with any file-base prefix and query removed
pub fn asset_name(src: &str) -> String {
    let src = src.trim();
    let path = src
        .strip_prefix(FILE_BASE)
        .or_else(|| src.strip_prefix(ENCODED_FILE_BASE))
        .unwrap_or(src)
        .trim_start_matches('/');
    let path = path.split(['?', '#']).next().unwrap_or(path);
    path.replace("%20", " ")
}

/// Normalized prompt text and the images it referenced, by asset name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedHtml {
    pub text: String,
    pub images: Vec<String>,
}

/// Turns prompt HTML into markup-plain text with `[[img:<name>]]` placeholders
pub trait HtmlNormalizer {
    fn normalize(&self, html: &str) -> NormalizedHtml;
}

const BLOCK_ELEMENTS: [&str; 17] = [
    "p", "div", "li", "ul", "ol", "table", "tr", "h1", "h2", "h3", "h4", "h5", "h6", "pre",
    "blockquote", "section", "article",
];

const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "head"];

/// html5ever-backed normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNormalizer;

impl HtmlNormalizer for DefaultNormalizer {
    fn normalize(&self, html: &str) -> NormalizedHtml {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        let mut out = NormalizedHtml::default();
        walk(&dom.document, &mut out);
        out.text = trim_unescaped(&out.text).to_string();
        out
    }
}

fn walk(node: &Handle, out: &mut NormalizedHtml) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.text.push_str(&contents.borrow()),
            NodeData::Element { name, attrs, .. } => {
                let tag = &*name.local;
                if SKIPPED_ELEMENTS.contains(&tag) {
                    continue;
                }
                match tag {
                    "br" => out.text.push('\n'),
                    "img" => {
                        let src = attrs
                            .borrow()
                            .iter()
                            .find(|a| &*a.name.local == "src")
                            .map(|a| a.value.to_string());
                        if let Some(src) = src {
                            let name = asset_name(&src);
                            out.text.push_str(&image_placeholder(&name));
                            out.images.push(name);
                        }
                    }
                    _ if BLOCK_ELEMENTS.contains(&tag) => {
                        break_line(&mut out.text);
                        walk(child, out);
                        break_line(&mut out.text);
                    }
                    _ => walk(child, out),
                }
            }
            _ => walk(child, out),
        }
    }
}

fn break_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}
