//! XML utility functions for navigating and extracting data from DOM trees.

use roxmltree::{Attribute, Node};

/// Get the tag name with its namespace prefix as written in the source.
///
/// Elements in the default namespace have no prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use ted_extractor::xml::qualified_name;
///
/// let xml = r#"<ROOT xmlns:n2016="urn:n2016"><n2016:NUTS CODE="FR1"/></ROOT>"#;
/// let doc = Document::parse(xml).unwrap();
/// let nuts = doc.root_element().first_element_child().unwrap();
/// assert_eq!(qualified_name(nuts), "n2016:NUTS");
/// ```
pub fn qualified_name(node: Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
    {
        Some(prefix) => format!("{prefix}:{}", tag.name()),
        None => tag.name().to_string(),
    }
}

/// Mapping key for an attribute: `@` followed by its prefixed name.
pub fn attribute_key(node: Node<'_, '_>, attr: &Attribute<'_, '_>) -> String {
    match attr
        .namespace()
        .and_then(|uri| node.lookup_prefix(uri))
        .filter(|prefix| !prefix.is_empty())
    {
        Some(prefix) => format!("@{prefix}:{}", attr.name()),
        None => format!("@{}", attr.name()),
    }
}

/// Concatenated direct text of an element, trimmed.
///
/// Returns `None` when the element holds only whitespace between its children.
pub fn direct_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Get all element children of a node.
///
/// # Returns
/// Iterator over element children (excludes text nodes, comments, etc.)
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}
