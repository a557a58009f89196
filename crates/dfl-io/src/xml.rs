//! Flat, namespace-agnostic view of the XML artifacts.
//!
//! The simulator's files (`.dyd`, `.par`, timeline, IIDM final state,
//! constraints) are all attribute-driven: everything the checks need lives
//! in an element's local name and attributes. Elements are returned in
//! document order.

use dfl_core::{DflError, DflResult};
use quick_xml::{
    events::{BytesStart, Event},
    name::LocalName,
    Reader,
};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name, without namespace prefix.
    pub name: String,
    /// Attributes in document order, local names, unescaped values.
    pub attributes: Vec<(String, String)>,
}

impl XmlElement {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }
}

/// Raw bytes of an artifact; decoding is left to the parser.
pub fn read_xml_file(path: &Path) -> DflResult<Vec<u8>> {
    fs::read(path).map_err(|err| DflError::Parse(format!("reading '{}': {err}", path.display())))
}

/// Parse every element of a document.
///
/// Names and values are decoded with the encoding the XML declaration names
/// (the simulator writes ISO-8859-1), UTF-8 when there is none. A document
/// that ends with an element still open is rejected.
pub fn parse_elements(doc: &[u8]) -> DflResult<Vec<XmlElement>> {
    let mut reader = Reader::from_reader(doc);
    reader.trim_text(true);

    let mut elements = Vec::new();
    let mut open: Vec<String> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let element = element_from(e, &reader)?;
                open.push(element.name.clone());
                elements.push(element);
            }
            Ok(Event::Empty(ref e)) => elements.push(element_from(e, &reader)?),
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(DflError::Parse(format!(
                    "malformed XML at byte {}: {err}",
                    reader.buffer_position()
                )))
            }
        }
    }
    if let Some(name) = open.last() {
        return Err(DflError::Parse(format!(
            "unclosed element <{name}> at end of document"
        )));
    }
    if elements.is_empty() {
        return Err(DflError::Parse("document has no root element".into()));
    }
    Ok(elements)
}

pub fn load_elements(path: &Path) -> DflResult<Vec<XmlElement>> {
    let doc = read_xml_file(path)?;
    parse_elements(&doc).map_err(|err| match err {
        DflError::Parse(msg) => DflError::Parse(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// First element (any depth) whose `id` equals `id`, optionally restricted
/// to a local name.
pub fn find_by_id(path: &Path, local_name: Option<&str>, id: &str) -> DflResult<Option<XmlElement>> {
    Ok(load_elements(path)?.into_iter().find(|element| {
        element.id() == Some(id) && local_name.map_or(true, |name| element.name == name)
    }))
}

fn element_from(event: &BytesStart, reader: &Reader<&[u8]>) -> DflResult<XmlElement> {
    let mut attributes = Vec::new();
    for attr in event.attributes().with_checks(false) {
        let attr = attr.map_err(|err| DflError::Parse(format!("bad attribute: {err}")))?;
        let raw_key = attr.key.as_ref();
        if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
            continue;
        }
        let key = decode_name(reader, attr.key.local_name())?;
        let value = attr
            .decode_and_unescape_value(reader)
            .map_err(|err| DflError::Parse(format!("bad attribute value for '{key}': {err}")))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name: decode_name(reader, event.local_name())?,
        attributes,
    })
}

fn decode_name(reader: &Reader<&[u8]>, name: LocalName) -> DflResult<String> {
    reader
        .decoder()
        .decode(name.as_ref())
        .map(|decoded| decoded.into_owned())
        .map_err(|err| DflError::Parse(format!("undecodable name: {err}")))
}
