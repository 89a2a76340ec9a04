//! Conversion of XML text into a [`DocumentNode`] tree.
//!
//! The shape follows the usual attribute/text convention for XML-to-map
//! conversion:
//! - attributes become `@name` keys, ahead of child elements
//! - an element with only text becomes a `Scalar`
//! - text of an element that also has attributes or children is kept under `#text`
//! - same-named siblings are gathered into one `Sequence`, placed where the first appeared
//! - an element with neither text, attributes nor children becomes an empty `Mapping`

use indexmap::IndexMap;
use roxmltree::{Document, Node};

use super::utils::{attribute_key, direct_text, element_children, qualified_name};
use crate::error::Result;
use crate::node::DocumentNode;

/// Parse a notice file into a tree rooted at a one-key mapping named after
/// the root element.
///
/// # Examples
/// ```
/// use ted_extractor::xml::parse_document;
///
/// let doc = parse_document(r#"<TED_EXPORT><LG>EN</LG></TED_EXPORT>"#).unwrap();
/// let lg = doc.get("TED_EXPORT").and_then(|n| n.get("LG"));
/// assert_eq!(lg.and_then(|n| n.as_scalar()), Some("EN"));
/// ```
pub fn parse_document(xml: &str) -> Result<DocumentNode> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    let mut top = IndexMap::with_capacity(1);
    top.insert(qualified_name(root), element_to_node(root));
    Ok(DocumentNode::Mapping(top))
}

/// Convert one element and its subtree.
pub fn element_to_node(node: Node<'_, '_>) -> DocumentNode {
    let text = direct_text(node);
    let has_attributes = node.attributes().next().is_some();
    let has_children = element_children(node).next().is_some();

    if !has_attributes && !has_children {
        return match text {
            Some(text) => DocumentNode::Scalar(text),
            None => DocumentNode::Mapping(IndexMap::new()),
        };
    }

    let mut map: IndexMap<String, DocumentNode> = IndexMap::new();

    for attr in node.attributes() {
        map.insert(
            attribute_key(node, &attr),
            DocumentNode::Scalar(attr.value().to_string()),
        );
    }

    for child in element_children(node) {
        let key = qualified_name(child);
        let value = element_to_node(child);

        match map.get_mut(&key) {
            Some(DocumentNode::Sequence(items)) => items.push(value),
            Some(existing) => {
                let first = std::mem::replace(existing, DocumentNode::Sequence(Vec::new()));
                *existing = DocumentNode::Sequence(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }

    if let Some(text) = text {
        map.insert("#text".to_string(), DocumentNode::Scalar(text));
    }

    DocumentNode::Mapping(map)
}
