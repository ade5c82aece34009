//! DOM plumbing for exchange documents
//!
//! Documents are built as `markup5ever_rcdom` trees and written with the xml5ever serializer;
//! reading goes through the xml5ever tree builder into the same node type. Elements are matched
//! by local name only, since exporters disagree on namespaces.

use crate::error::CodecError;
use html5ever::serialize::TraversalScope;
use html5ever::{ns, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::default::Default;
use std::rc::Rc;
use xml5ever::driver::{parse_document, XmlParseOpts};
use xml5ever::serialize::{serialize, SerializeOpts};
use xml5ever::tendril::TendrilSink;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Create an element with attributes
pub(crate) fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub(crate) fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Append a new element to `parent` and return it
pub(crate) fn append_element(parent: &Handle, tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let element = create_element(tag, attrs);
    parent.children.borrow_mut().push(element.clone());
    element
}

/// Append an element holding only text
pub(crate) fn append_text_element(
    parent: &Handle,
    tag: &str,
    attrs: Vec<(&str, &str)>,
    text: &str,
) -> Handle {
    let element = append_element(parent, tag, attrs);
    element.children.borrow_mut().push(create_text(text));
    element
}

/// Serialize a root element as a standalone XML document
pub(crate) fn serialize_document(root: &Handle) -> Result<String, CodecError> {
    let mut output = XML_DECLARATION.as_bytes().to_vec();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(root.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|e| CodecError::SerializationError(format!("XML serialization failed: {}", e)))?;

    String::from_utf8(output)
        .map_err(|e| CodecError::SerializationError(format!("UTF-8 conversion failed: {}", e)))
}

/// Parse an XML document and return its root element
pub(crate) fn parse_xml(text: &str) -> Result<Handle, CodecError> {
    let dom = parse_document(RcDom::default(), XmlParseOpts::default()).one(text);
    // Detach the root: dropping the document node empties every subtree still attached to it
    let children = std::mem::take(&mut *dom.document.children.borrow_mut());
    let root = children.into_iter().find(|node| tag_name(node).is_some());
    root.ok_or_else(|| CodecError::ParseError("Document has no root element".to_string()))
}

pub(crate) fn tag_name(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub(crate) fn is_element(node: &Handle, tag: &str) -> bool {
    tag_name(node) == Some(tag)
}

pub(crate) fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

pub(crate) fn children_named(node: &Handle, tag: &str) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| is_element(child, tag))
        .cloned()
        .collect()
}

pub(crate) fn child_named(node: &Handle, tag: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| is_element(child, tag))
        .cloned()
}

/// Every descendant element named `tag`, in document order
pub(crate) fn descendants_named(node: &Handle, tag: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_descendants(node, tag, None, &mut found);
    found
}

/// Like [descendants_named], but does not descend into elements named `barrier`
pub(crate) fn descendants_outside(node: &Handle, tag: &str, barrier: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    collect_descendants(node, tag, Some(barrier), &mut found);
    found
}

fn collect_descendants(node: &Handle, tag: &str, barrier: Option<&str>, found: &mut Vec<Handle>) {
    for child in node.children.borrow().iter() {
        if barrier.is_some() && tag_name(child) == barrier {
            continue;
        }
        if is_element(child, tag) {
            found.push(child.clone());
        }
        collect_descendants(child, tag, barrier, found);
    }
}

pub(crate) fn first_descendant(node: &Handle, tag: &str) -> Option<Handle> {
    descendants_named(node, tag).into_iter().next()
}

/// Concatenated text of every descendant text node
pub(crate) fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    push_text(node, &mut text);
    text
}

fn push_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                push_text(child, out);
            }
        }
    }
}
