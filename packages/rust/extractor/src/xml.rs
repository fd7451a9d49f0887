//! Namespace-aware XML element tree.
//!
//! Reads a complete document with `quick_xml::NsReader` into an owned tree of
//! [`Element`]s. Every element records the namespace URI its prefix resolved
//! to, so lookups go by `(namespace URI, local name)` and never by prefix.

use std::borrow::Cow;

use nomina_shared::{NominaError, Result};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

/// Nesting limit; CFDI payroll documents are a handful of levels deep.
const MAX_DEPTH: usize = 256;

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// A parsed element with its resolved namespace, attributes and child elements.
///
/// Text content is not retained; CFDI carries all of its data in attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    local_name: String,
    /// Qualified attribute name (as written) → unescaped value.
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Namespace URI the element's prefix (or default namespace) resolved to.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Element name without its prefix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Value of the attribute with the given qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether this element is `local_name` in namespace `ns`.
    pub fn is(&self, ns: &str, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == Some(ns)
    }

    /// Direct child elements in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Direct children matching `(ns, local_name)`, in document order.
    pub fn children_named<'a>(
        &'a self,
        ns: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(ns, local_name))
    }

    /// First direct child matching `(ns, local_name)`.
    pub fn child(&self, ns: &str, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, local_name))
    }

    /// First descendant (excluding `self`) matching `(ns, local_name)`, in
    /// document order.
    pub fn find_descendant(&self, ns: &str, local_name: &str) -> Option<&Element> {
        let mut pending: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(el) = pending.pop() {
            if el.is(ns, local_name) {
                return Some(el);
            }
            pending.extend(el.children.iter().rev());
        }
        None
    }
}

/// Attribute lookup that is total over absent elements and attributes.
///
/// Returns `""` when `element` is `None` or lacks the attribute.
pub fn attr<'a>(element: Option<&'a Element>, name: &str) -> &'a str {
    element.and_then(|el| el.attribute(name)).unwrap_or("")
}

// ---------------------------------------------------------------------------
// XmlDocument
// ---------------------------------------------------------------------------

/// A well-formed XML document with exactly one root element.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    root: Element,
}

impl XmlDocument {
    /// Parse `xml` into an element tree.
    ///
    /// Fails with [`NominaError::InvalidXml`] on malformed markup, undeclared
    /// prefixes, unclosed or mismatched tags, a missing root element, or
    /// content after the root.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (ns, event) = match reader.read_resolved_event() {
                Ok(pair) => pair,
                Err(e) => {
                    return Err(NominaError::invalid_xml(format!(
                        "at position {}: {e}",
                        reader.error_position()
                    )));
                }
            };
            let namespace = namespace_uri(ns)?;

            match event {
                Event::Start(start) => {
                    if open.is_empty() && root.is_some() {
                        return Err(NominaError::invalid_xml("multiple root elements"));
                    }
                    if open.len() >= MAX_DEPTH {
                        return Err(NominaError::invalid_xml(format!(
                            "nesting deeper than {MAX_DEPTH} elements"
                        )));
                    }
                    open.push(element_from_start(&start, namespace)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start, namespace)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| NominaError::invalid_xml("unexpected closing tag"))?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Text(text) if open.is_empty() => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(NominaError::invalid_xml(
                            "text content outside the root element",
                        ));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.last() {
            return Err(NominaError::invalid_xml(format!(
                "unexpected end of document: <{}> is not closed",
                unclosed.local_name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| NominaError::invalid_xml("document has no root element"))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// First element (root included) matching `(ns, local_name)`, in document
    /// order.
    pub fn find(&self, ns: &str, local_name: &str) -> Option<&Element> {
        if self.root.is(ns, local_name) {
            return Some(&self.root);
        }
        self.root.find_descendant(ns, local_name)
    }
}

/// Turn a resolved prefix into an owned namespace URI.
fn namespace_uri(ns: ResolveResult<'_>) -> Result<Option<String>> {
    match ns {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.0).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(NominaError::invalid_xml(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn element_from_start(start: &BytesStart<'_>, namespace: Option<String>) -> Result<Element> {
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attribute in start.attributes() {
        let attribute = attribute
            .map_err(|e| NominaError::invalid_xml(format!("in <{local_name}>: {e}")))?;
        // xmlns declarations were already consumed by the namespace resolver.
        if attribute.key.as_namespace_binding().is_some() {
            continue;
        }
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let raw = std::str::from_utf8(&attribute.value)
            .map_err(|e| NominaError::invalid_xml(format!("attribute {key}: {e}")))?;
        let normalized = normalize_whitespace(raw);
        let value = quick_xml::escape::unescape(&normalized)
            .map_err(|e| NominaError::invalid_xml(format!("attribute {key}: {e}")))?;
        attributes.push((key, Cow::into_owned(value)));
    }

    Ok(Element {
        namespace,
        local_name,
        attributes,
        children: Vec::new(),
    })
}

/// Attribute-value normalization: a literal line break (CRLF, CR or LF) or
/// tab becomes a single space. Character references such as `&#10;` are
/// resolved afterwards and survive.
fn normalize_whitespace(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\t', '\n', '\r']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push(' ');
            }
            '\t' | '\n' => out.push(' '),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Hand a completed element to its parent, or make it the document root.
fn attach(open: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(NominaError::invalid_xml("multiple root elements")),
    }
    Ok(())
}
