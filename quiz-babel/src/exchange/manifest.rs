//! `imsmanifest.xml`: the package's table of contents
//!
//!     Per quiz there is an item resource (`imsqti_xmlv1p2`) that depends on a metadata resource
//!     (`<hash>_meta`). Assets are plain `webcontent` resources.

use super::xml::{
    append_element, append_text_element, attr, child_named, children_named, create_element,
    descendants_named, parse_xml, serialize_document,
};
use crate::error::CodecError;
use crate::package::{asset_path, quiz_identifier, QuizPaths};
use markup5ever_rcdom::Handle;

pub const QTI_RESOURCE: &str = "imsqti_xmlv1p2";
pub const META_RESOURCE: &str = "associatedcontent/imscc_xmlv1p1/learning-application-resource";
pub const WEB_RESOURCE: &str = "webcontent";

const MANIFEST_NS: &str = "http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1";

pub fn meta_identifier(quiz: &str) -> String {
    format!("{quiz}_meta")
}

/// Write the manifest for quizzes (in order) and asset names
pub fn build_manifest(
    version_ids: &[&str],
    quizzes: &[QuizPaths],
    assets: &[&str],
) -> Result<String, CodecError> {
    let identifier = quiz_identifier(&version_ids.join("\n"));
    let manifest = create_element(
        "manifest",
        vec![("identifier", identifier.as_str()), ("xmlns", MANIFEST_NS)],
    );

    let metadata = append_element(&manifest, "metadata", vec![]);
    append_text_element(&metadata, "schema", vec![], "IMS Content");
    append_text_element(&metadata, "schemaversion", vec![], "1.1.3");
    append_element(&manifest, "organizations", vec![]);

    let resources = append_element(&manifest, "resources", vec![]);
    for quiz in quizzes {
        let meta_id = meta_identifier(&quiz.identifier);

        let items = append_element(
            &resources,
            "resource",
            vec![("identifier", quiz.identifier.as_str()), ("type", QTI_RESOURCE)],
        );
        append_element(&items, "file", vec![("href", quiz.items.as_str())]);
        append_element(&items, "dependency", vec![("identifierref", meta_id.as_str())]);

        let meta = append_element(
            &resources,
            "resource",
            vec![
                ("identifier", meta_id.as_str()),
                ("type", META_RESOURCE),
                ("href", quiz.meta.as_str()),
            ],
        );
        append_element(&meta, "file", vec![("href", quiz.meta.as_str())]);
    }

    for name in assets {
        let path = asset_path(name);
        let asset_id = quiz_identifier(&path);
        let resource = append_element(
            &resources,
            "resource",
            vec![
                ("identifier", asset_id.as_str()),
                ("type", WEB_RESOURCE),
                ("href", path.as_str()),
            ],
        );
        append_element(&resource, "file", vec![("href", path.as_str())]);
    }

    serialize_document(&manifest)
}

/// One quiz as listed by a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResource {
    pub identifier: String,
    pub items_href: String,
    pub meta_href: Option<String>,
}

/// Quiz resources in manifest order
pub fn read_manifest(text: &str) -> Result<Vec<QuizResource>, CodecError> {
    let root = parse_xml(text)?;
    let resources: Vec<_> = match child_named(&root, "resources") {
        Some(node) => children_named(&node, "resource"),
        None => descendants_named(&root, "resource"),
    };

    let mut quizzes = Vec::new();
    for resource in &resources {
        if attr(resource, "type").as_deref() != Some(QTI_RESOURCE) {
            continue;
        }
        let Some(identifier) = attr(resource, "identifier") else {
            tracing::debug!("quiz resource without identifier");
            continue;
        };
        let items_href =
            resource_href(resource).unwrap_or_else(|| QuizPaths::for_identifier(&identifier).items);

        let meta_href = children_named(resource, "dependency")
            .iter()
            .filter_map(|dep| attr(dep, "identifierref"))
            .find_map(|dep_id| {
                resources
                    .iter()
                    .find(|r| attr(r, "identifier").as_deref() == Some(dep_id.as_str()))
                    .and_then(resource_href)
            });

        quizzes.push(QuizResource {
            identifier,
            items_href,
            meta_href,
        });
    }
    Ok(quizzes)
}

fn resource_href(resource: &Handle) -> Option<String> {
    child_named(resource, "file")
        .and_then(|file| attr(&file, "href"))
        .or_else(|| attr(resource, "href"))
}
