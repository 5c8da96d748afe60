//! Generic XML element tree
//!
//! Documents are read into nodes holding the local element name, attributes
//! in document order, direct text content and child elements. Namespace
//! prefixes are dropped from element and attribute names.

use crate::error::ManifestError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// One XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local element name
    pub name: String,
    /// Attributes as `(local name, value)` in document order
    pub attrs: Vec<(String, String)>,
    /// Concatenated text directly inside this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parses a document and returns its root element
    pub fn parse(content: &[u8]) -> Result<XmlNode, ManifestError> {
        let text = std::str::from_utf8(content).map_err(|e| malformed(e.to_string()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = Reader::from_str(text);
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(element(&e)?),
                Ok(Event::Empty(e)) => {
                    let node = element(&e)?;
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, node);
                }
                Ok(Event::Text(t)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&utf8(&t)?);
                    }
                }
                Ok(Event::CData(c)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&utf8(&c)?);
                    }
                }
                Ok(Event::GeneralRef(r)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&resolve_reference(&utf8(&r)?));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(malformed(format!(
                        "{} at position {}",
                        e,
                        reader.error_position()
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(malformed(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_else(|| malformed("document has no root element".to_string()))
    }

    /// Returns the value of the attribute with the given local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the child elements with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Walks a slash-separated path of element names starting below this node
    ///
    /// `ItemGroup/PackageReference` on a `<Project>` root returns every
    /// `PackageReference` inside every `ItemGroup`.
    pub fn find_nodes(&self, path: &str) -> Vec<&XmlNode> {
        if path.trim_matches('/').is_empty() {
            return Vec::new();
        }
        path.split('/')
            .filter(|part| !part.is_empty())
            .fold(vec![self], |nodes, part| {
                nodes
                    .into_iter()
                    .flat_map(|node| node.children.iter().filter(move |c| c.name == part))
                    .collect()
            })
    }
}

fn malformed(message: String) -> ManifestError {
    ManifestError::malformed("XML", message)
}

fn utf8(bytes: &[u8]) -> Result<Cow<'_, str>, ManifestError> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| malformed(e.to_string()))
}

fn element(start: &BytesStart<'_>) -> Result<XmlNode, ManifestError> {
    let name = utf8(start.local_name().as_ref())?.into_owned();

    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        let key = utf8(attr.key.local_name().as_ref())?.into_owned();
        let raw = utf8(&attr.value)?;
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| malformed(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok(XmlNode {
        name,
        attrs,
        ..Default::default()
    })
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        // Only the first top-level element is kept
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// Resolves `&name;` given the text between `&` and `;`
fn resolve_reference(name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        return quick_xml::escape::resolve_predefined_entity(name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("&{name};"));
    };

    code.and_then(char::from_u32)
        .map(String::from)
        .unwrap_or_else(|| format!("&{name};"))
}
