//! The persisted document as an element tree, and its XML text form.
//!
//! The format only uses elements and attributes. Text content, comments and
//! processing instructions are skipped when reading; attribute order is
//! kept as written.

use std::io::Cursor;

use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::PersistError;

/// One element with its attributes and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Element {
            name: name.to_string(),
            ..Element::default()
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// The first child element named `name`.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

fn xml_error(position: u64, message: impl std::fmt::Display) -> PersistError {
    PersistError::Xml(format!("at byte {}: {}", position, message))
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<Element, PersistError> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| xml_error(position, e))?
        .to_string();
    let mut element = Element::new(&name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e))?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|e| xml_error(position, e))?;
        let raw = std::str::from_utf8(&attr.value).map_err(|e| xml_error(position, e))?;
        let value = quick_xml::escape::unescape(raw).map_err(|e| xml_error(position, e))?;
        element.set_attr(key, value.into_owned());
    }
    Ok(element)
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element, position: u64) -> Result<(), PersistError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(xml_error(position, "more than one root element")),
    }
}

/// Parse XML text into its root element.
pub fn parse_document(xml: &str) -> Result<Element, PersistError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&start, position)?),
            Ok(Event::Empty(start)) => {
                let element = element_from_start(&start, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| xml_error(position, "unexpected end tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(xml_error(position, err)),
        }
    }
    if let Some(open) = stack.last() {
        return Err(PersistError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or(PersistError::EmptyDocument)
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), PersistError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Serialize a root element as an XML document with an XML declaration.
pub fn write_document(root: &Element, indent: usize) -> Result<String, PersistError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root)?;
    let bytes = writer.into_inner().into_inner();
    let mut text = String::from_utf8(bytes).map_err(|e| PersistError::Xml(e.to_string()))?;
    text.push('\n');
    Ok(text)
}
