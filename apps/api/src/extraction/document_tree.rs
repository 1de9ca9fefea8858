//! Word document tree: sections → block elements → runs and tables.
//!
//! `word/document.xml` is read into a generic element tree first, then
//! folded into the closed `DocNode` set. Text is collected by an explicit
//! depth-first walk over that set.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, PartialEq)]
pub enum DocNode {
    /// Plain text run.
    TextRun(String),
    /// Mixed inline content (paragraphs, hyperlinks, tracked insertions).
    CompositeRun(Vec<DocNode>),
    Table(Vec<TableRow>),
    /// Drawings, bookmarks, field codes and anything else without prose.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub elements: Vec<DocNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Section {
    pub elements: Vec<DocNode>,
}

/// Concatenates every textual leaf, each followed by a single space.
pub fn collect_text(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        for element in &section.elements {
            append_text(element, &mut out);
        }
    }
    out
}

fn append_text(node: &DocNode, out: &mut String) {
    match node {
        DocNode::TextRun(text) => {
            out.push_str(text);
            out.push(' ');
        }
        DocNode::CompositeRun(children) => {
            for child in children {
                append_text(child, out);
            }
        }
        DocNode::Table(rows) => {
            for cell in rows.iter().flat_map(|row| &row.cells) {
                for element in &cell.elements {
                    append_text(element, out);
                }
            }
        }
        DocNode::Other => {}
    }
}

/// Opens an OOXML package and builds its section tree.
pub fn parse_docx(bytes: &[u8]) -> Result<Vec<Section>, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    parse_document_xml(&xml)
}

pub fn parse_document_xml(xml: &str) -> Result<Vec<Section>, ExtractionError> {
    let root = read_element_tree(xml)?;
    let body = root
        .find("document")
        .and_then(|doc| doc.find("body"))
        .ok_or(ExtractionError::MissingBody)?;
    Ok(build_sections(body))
}

// ── generic XML tree ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<XmlChild>,
}

#[derive(Debug)]
enum XmlChild {
    Element(Element),
    Text(String),
}

impl Element {
    fn named(name: &[u8]) -> Self {
        Element {
            name: String::from_utf8_lossy(name).into_owned(),
            children: Vec::new(),
        }
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            XmlChild::Element(e) => Some(e),
            XmlChild::Text(_) => None,
        })
    }

    fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                XmlChild::Text(t) => Some(t.as_str()),
                XmlChild::Element(_) => None,
            })
            .collect()
    }
}

/// Element names are kept without their namespace prefix.
fn read_element_tree(xml: &str) -> Result<Element, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut stack = vec![Element::named(b"#document")];

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(Element::named(e.local_name().as_ref())),
            Event::Empty(e) => {
                let leaf = Element::named(e.local_name().as_ref());
                push_child(&mut stack, XmlChild::Element(leaf));
            }
            Event::Text(t) => {
                let text = t.unescape()?.into_owned();
                push_child(&mut stack, XmlChild::Text(text));
            }
            Event::CData(c) => push_child(
                &mut stack,
                XmlChild::Text(String::from_utf8_lossy(&c.into_inner()).into_owned()),
            ),
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(done) = stack.pop() {
                        push_child(&mut stack, XmlChild::Element(done));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    // Unclosed elements still hand their content to the root.
    while stack.len() > 1 {
        if let Some(done) = stack.pop() {
            push_child(&mut stack, XmlChild::Element(done));
        }
    }
    Ok(stack.pop().unwrap_or_default())
}

fn push_child(stack: &mut [Element], child: XmlChild) {
    if let Some(top) = stack.last_mut() {
        top.children.push(child);
    }
}

// ── folding into DocNode ──────────────────────────────────────────────────

/// A paragraph whose properties carry `w:sectPr` closes the current section.
fn build_sections(body: &Element) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut current = Section::default();

    for element in body.elements() {
        if element.name == "sectPr" {
            continue;
        }
        current.elements.push(block_node(element));
        let closes_section = element.name == "p"
            && element
                .find("pPr")
                .is_some_and(|props| props.find("sectPr").is_some());
        if closes_section {
            sections.push(std::mem::take(&mut current));
        }
    }

    if !current.elements.is_empty() || sections.is_empty() {
        sections.push(current);
    }
    sections
}

fn block_node(element: &Element) -> DocNode {
    match element.name.as_str() {
        "p" => DocNode::CompositeRun(inline_children(element)),
        "tbl" => DocNode::Table(
            element
                .elements()
                .filter(|e| e.name == "tr")
                .map(table_row)
                .collect(),
        ),
        "sdt" => content_control(element, block_node),
        _ => DocNode::Other,
    }
}

fn table_row(row: &Element) -> TableRow {
    TableRow {
        cells: row
            .elements()
            .filter(|e| e.name == "tc")
            .map(|cell| TableCell {
                elements: cell
                    .elements()
                    .filter(|e| !is_properties(e))
                    .map(block_node)
                    .collect(),
            })
            .collect(),
    }
}

fn inline_children(element: &Element) -> Vec<DocNode> {
    element
        .elements()
        .filter(|e| !is_properties(e))
        .map(inline_node)
        .collect()
}

fn inline_node(element: &Element) -> DocNode {
    match element.name.as_str() {
        "r" => run_node(element),
        "hyperlink" | "smartTag" | "ins" | "fldSimple" | "customXml" => {
            DocNode::CompositeRun(inline_children(element))
        }
        "sdt" => content_control(element, inline_node),
        _ => DocNode::Other,
    }
}

fn run_node(run: &Element) -> DocNode {
    let mut text = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "t" => text.push_str(&child.own_text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    if text.is_empty() {
        DocNode::Other
    } else {
        DocNode::TextRun(text)
    }
}

/// `w:sdt` wraps ordinary content in `w:sdtContent`; `fold` is the block or
/// inline folder matching where the control sits.
fn content_control(element: &Element, fold: fn(&Element) -> DocNode) -> DocNode {
    match element.find("sdtContent") {
        Some(content) => DocNode::CompositeRun(
            content
                .elements()
                .filter(|e| !is_properties(e))
                .map(fold)
                .collect(),
        ),
        None => DocNode::Other,
    }
}

fn is_properties(element: &Element) -> bool {
    element.name.ends_with("Pr")
}
