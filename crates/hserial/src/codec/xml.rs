// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML codec — one element per named root/member/variant.
//!
//! Records and choices add no wrapper of their own: the enclosing element
//! (document root, member, container item or variant) is the wrapper.
//! Container items are repeated `<item>` siblings; a choice element
//! contains exactly one variant element; a null pointer is `null="true"`
//! on the enclosing element. XML has no reference construct, so shared
//! graphs go through the duplication policy.
//!
//! Reading parses the whole document with roxmltree and walks it with a
//! node-cursor stack; members resolve by element name in any order.

use crate::codec::cursor::WriteCursor;
use crate::codec::{Decoder, Encoder, MemberKey, PointerEvent};
use crate::descriptor::{ContainerDescriptor, MemberDescriptor, TypeDescriptor};
use crate::error::{Error, Position, Result};
use roxmltree::{Document, NodeId};

const ITEM_ELEMENT: &str = "item";

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ElemState {
    /// `<name` not yet written — attributes may still be attached.
    Pending,
    /// Start tag written, awaiting content and `</name>`.
    Opened,
    /// Self-closed, nothing left to write.
    Closed,
}

#[derive(Debug)]
struct OpenElem {
    name: String,
    attrs: Vec<(String, String)>,
    state: ElemState,
}

/// XML encoder over a growing output buffer.
pub struct XmlEncoder {
    out: WriteCursor,
    stack: Vec<OpenElem>,
}

impl XmlEncoder {
    pub fn new() -> Self {
        Self {
            out: WriteCursor::new(),
            stack: Vec::new(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.stack.is_empty(), "unclosed element at end of encode");
        self.out.into_inner()
    }

    /// Write the start tag of the innermost element, if still pending.
    fn flush_top(&mut self) {
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        if top.state != ElemState::Pending {
            return;
        }
        let mut tag = String::new();
        tag.push('<');
        tag.push_str(&top.name);
        for (key, value) in &top.attrs {
            tag.push(' ');
            tag.push_str(key);
            tag.push_str("=\"");
            escape_attr(&mut tag, value);
            tag.push('"');
        }
        tag.push('>');
        top.state = ElemState::Opened;
        self.out.put_str(&tag);
    }

    fn open(&mut self, name: &str) {
        self.flush_top();
        self.stack.push(OpenElem {
            name: name.to_string(),
            attrs: Vec::new(),
            state: ElemState::Pending,
        });
    }

    fn close(&mut self) {
        let top = self.stack.pop().expect("close without open element");
        match top.state {
            ElemState::Pending => {
                let mut tag = String::new();
                tag.push('<');
                tag.push_str(&top.name);
                for (key, value) in &top.attrs {
                    tag.push(' ');
                    tag.push_str(key);
                    tag.push_str("=\"");
                    escape_attr(&mut tag, value);
                    tag.push('"');
                }
                tag.push_str("/>");
                self.out.put_str(&tag);
            }
            ElemState::Opened => {
                self.out.put_str(&format!("</{}>", top.name));
            }
            ElemState::Closed => {}
        }
    }

    fn put_text(&mut self, text: &str) {
        self.flush_top();
        let mut escaped = String::new();
        escape_text(&mut escaped, text);
        self.out.put_str(&escaped);
    }
}

impl Default for XmlEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for XmlEncoder {
    fn supports_references(&self) -> bool {
        false
    }

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()> {
        self.out
            .put_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.open(&root.name);
        if let Some(ns) = &root.xml_namespace {
            if let Some(top) = self.stack.last_mut() {
                top.attrs.push(("xmlns".to_string(), ns.clone()));
            }
        }
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.close();
        self.out.put_str("\n");
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        // An empty record still needs its start tag materialized.
        self.flush_top();
        Ok(())
    }

    fn begin_member(&mut self, member: &MemberDescriptor) -> Result<()> {
        self.open(&member.name);
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_choice(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_variant(&mut self, variant: &MemberDescriptor) -> Result<()> {
        self.open(&variant.name);
        Ok(())
    }

    fn end_variant(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor, _len: usize) -> Result<()> {
        Ok(())
    }

    fn begin_element(&mut self) -> Result<()> {
        self.open(ITEM_ELEMENT);
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        // An empty container still needs its start tag materialized.
        self.flush_top();
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            Some(top) if top.state == ElemState::Pending => {
                top.attrs.push(("null".to_string(), "true".to_string()));
                let mut tag = String::new();
                tag.push('<');
                tag.push_str(&top.name);
                for (key, value) in &top.attrs {
                    tag.push(' ');
                    tag.push_str(key);
                    tag.push_str("=\"");
                    escape_attr(&mut tag, value);
                    tag.push('"');
                }
                tag.push_str("/>");
                top.state = ElemState::Closed;
                self.out.put_str(&tag);
                Ok(())
            }
            _ => Err(Error::Format {
                position: Position::default(),
                message: "null marker requires an enclosing element".into(),
            }),
        }
    }

    fn begin_object(&mut self, _index: u32) -> Result<()> {
        Err(Error::UnsupportedReference { format: "xml" })
    }

    fn end_object(&mut self) -> Result<()> {
        Err(Error::UnsupportedReference { format: "xml" })
    }

    fn write_backref(&mut self, _index: u32) -> Result<()> {
        Err(Error::UnsupportedReference { format: "xml" })
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.put_text(if v { "true" } else { "false" });
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.put_text(&format!("{}", v));
        Ok(())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.put_text(&format!("{}", v));
        Ok(())
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        let text = if v.is_finite() {
            format!("{}", v)
        } else {
            non_finite_text(f64::from(v)).to_string()
        };
        self.put_text(&text);
        Ok(())
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        let text = if v.is_finite() {
            format!("{}", v)
        } else {
            non_finite_text(v).to_string()
        };
        self.put_text(&text);
        Ok(())
    }

    fn write_str(&mut self, v: &str) -> Result<()> {
        self.put_text(v);
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        let mut hex = String::with_capacity(v.len() * 2);
        for byte in v {
            hex.push_str(&format!("{:02X}", byte));
        }
        self.put_text(&hex);
        Ok(())
    }
}

/// XSD-style lexical form for non-finite floats.
fn non_finite_text(v: f64) -> &'static str {
    if v.is_nan() {
        "NaN"
    } else if v == f64::INFINITY {
        "INF"
    } else {
        "-INF"
    }
}

#[derive(Debug)]
struct NodeFrame {
    elem: NodeId,
    /// Next unvisited element child.
    next: Option<NodeId>,
}

/// XML decoder over a parsed document.
#[derive(Debug)]
pub struct XmlDecoder<'a> {
    doc: Document<'a>,
    stack: Vec<NodeFrame>,
}

impl<'a> XmlDecoder<'a> {
    /// Parse the input document.
    pub fn new(input: &'a str) -> Result<Self> {
        let doc = Document::parse(input).map_err(|e| {
            let pos = e.pos();
            Error::Format {
                position: Position::at_line(0, pos.row, pos.col),
                message: format!("malformed xml: {}", e),
            }
        })?;
        Ok(Self {
            doc,
            stack: Vec::new(),
        })
    }

    fn node(&self, id: NodeId) -> roxmltree::Node<'_, 'a> {
        self.doc.get_node(id).expect("node id belongs to this document")
    }

    fn node_position(&self, id: NodeId) -> Position {
        let offset = self.node(id).range().start;
        let pos = self.doc.text_pos_at(offset);
        Position::at_line(offset, pos.row, pos.col)
    }

    fn top(&self) -> &NodeFrame {
        self.stack.last().expect("no open element")
    }

    fn fail_here(&self, message: impl Into<String>) -> Error {
        let position = self
            .stack
            .last()
            .map(|frame| self.node_position(frame.elem))
            .unwrap_or_default();
        Error::Format {
            position,
            message: message.into(),
        }
    }

    /// Move the cursor into the top frame's next element child.
    fn push_child(&mut self) -> Option<NodeId> {
        let child = self.stack.last()?.next?;
        let node = self.node(child);
        let sibling = node.next_sibling_element().map(|n| n.id());
        let first = node.first_element_child().map(|n| n.id());
        if let Some(top) = self.stack.last_mut() {
            top.next = sibling;
        }
        self.stack.push(NodeFrame {
            elem: child,
            next: first,
        });
        Some(child)
    }

    /// Concatenated text content of the current element.
    fn element_text(&self) -> String {
        let node = self.node(self.top().elem);
        let mut text = String::new();
        for child in node.children() {
            if child.is_text() {
                if let Some(chunk) = child.text() {
                    text.push_str(chunk);
                }
            }
        }
        text
    }

    fn parse_trimmed<T, E>(
        &self,
        what: &str,
        parse: impl FnOnce(&str) -> std::result::Result<T, E>,
    ) -> Result<T> {
        let text = self.element_text();
        let trimmed = text.trim();
        parse(trimmed).map_err(|_| {
            self.fail_here(format!("element text {:?} is not a valid {}", trimmed, what))
        })
    }
}

impl Decoder for XmlDecoder<'_> {
    fn supports_references(&self) -> bool {
        false
    }

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()> {
        let elem = self.doc.root_element();
        if elem.tag_name().name() != root.name {
            let position = self.node_position(elem.id());
            return Err(Error::Format {
                position,
                message: format!(
                    "document root is <{}>, descriptor is {}",
                    elem.tag_name().name(),
                    root.name
                ),
            });
        }
        let first = elem.first_element_child().map(|n| n.id());
        self.stack.push(NodeFrame {
            elem: elem.id(),
            next: first,
        });
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.stack.pop();
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn next_member(&mut self) -> Result<Option<MemberKey>> {
        match self.push_child() {
            Some(child) => {
                let name = self.node(child).tag_name().name().to_string();
                Ok(Some(MemberKey::Name(name)))
            }
            None => Ok(None),
        }
    }

    fn end_member(&mut self) -> Result<()> {
        self.stack.pop();
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_choice(&mut self, desc: &TypeDescriptor) -> Result<MemberKey> {
        match self.push_child() {
            Some(child) => {
                let name = self.node(child).tag_name().name().to_string();
                Ok(MemberKey::Name(name))
            }
            None => Err(self.fail_here(format!("choice {} element has no variant", desc.name))),
        }
    }

    fn end_choice(&mut self) -> Result<()> {
        self.stack.pop();
        if self.top().next.is_some() {
            return Err(self.fail_here("choice element has more than one variant"));
        }
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor) -> Result<()> {
        Ok(())
    }

    fn next_element(&mut self) -> Result<bool> {
        match self.push_child() {
            Some(child) => {
                let name = self.node(child).tag_name().name();
                if name != ITEM_ELEMENT {
                    let position = self.node_position(child);
                    return Err(Error::Format {
                        position,
                        message: format!("expected <{}> element, found <{}>", ITEM_ELEMENT, name),
                    });
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn end_element(&mut self) -> Result<()> {
        self.stack.pop();
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_pointer(&mut self) -> Result<PointerEvent> {
        let node = self.node(self.top().elem);
        if node.attribute("null") == Some("true") {
            Ok(PointerEvent::Null)
        } else {
            Ok(PointerEvent::Object(None))
        }
    }

    fn end_object(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        self.parse_trimmed("bool", |text| match text {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(()),
        })
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.parse_trimmed("integer", str::parse::<i64>)
    }

    fn read_u64(&mut self) -> Result<u64> {
        self.parse_trimmed("integer", str::parse::<u64>)
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.read_f64().map(|v| v as f32)
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.parse_trimmed("number", |text| match text {
            "INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            "NaN" => Ok(f64::NAN),
            _ => text.parse::<f64>().map_err(|_| ()),
        })
    }

    fn read_str(&mut self) -> Result<String> {
        Ok(self.element_text())
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        self.parse_trimmed("hex string", |text| {
            if text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(());
            }
            Ok(text
                .as_bytes()
                .chunks(2)
                .map(|pair| {
                    u8::from_str_radix(std::str::from_utf8(pair).unwrap_or("00"), 16)
                        .unwrap_or(0)
                })
                .collect())
        })
    }

    fn skip_value(&mut self) -> Result<u32> {
        // Tree-backed cursor: ignoring the subtree is the skip.
        if let Some(top) = self.stack.last_mut() {
            top.next = None;
        }
        Ok(0)
    }

    fn position(&self) -> Position {
        self.stack
            .last()
            .map(|frame| self.node_position(frame.elem))
            .unwrap_or_default()
    }
}
