// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON codec backed by `serde_json`.
//!
//! Records map to objects keyed by member name (unset optionals omitted),
//! choices to a single-key object, containers to arrays, byte blocks to
//! hex strings and null pointers to `null`. JSON has no reference
//! construct, so shared graphs go through the duplication policy.
//!
//! The encoder builds a `serde_json::Value` on a container stack and
//! serializes it at document end; the decoder parses the input up front
//! and consumes the tree with an owned-value cursor, which gives member
//! lookup by name in any wire order for free.

use crate::codec::{Decoder, Encoder, MemberKey, PointerEvent};
use crate::descriptor::{ContainerDescriptor, MemberDescriptor, TypeDescriptor};
use crate::error::{Error, Position, Result};
use serde_json::{Map, Number, Value as Json};

fn encode_error(message: impl Into<String>) -> Error {
    Error::Format {
        position: Position::default(),
        message: message.into(),
    }
}

#[derive(Debug)]
enum BuildFrame {
    Object(Map<String, Json>),
    Array(Vec<Json>),
    Key(String),
}

/// JSON encoder.
pub struct JsonEncoder {
    stack: Vec<BuildFrame>,
    root: Option<Json>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            root: None,
        }
    }

    /// Serialized document bytes (compact form).
    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.stack.is_empty(), "unclosed value at end of encode");
        let root = self.root.unwrap_or(Json::Null);
        serde_json::to_vec(&root).expect("serde_json::Value serialization is infallible")
    }

    /// Attach a finished value to the innermost open container, or make it
    /// the document root.
    fn attach(&mut self, value: Json) {
        match self.stack.pop() {
            Some(BuildFrame::Key(key)) => match self.stack.last_mut() {
                Some(BuildFrame::Object(map)) => {
                    map.insert(key, value);
                }
                _ => panic!("member key without an enclosing object"),
            },
            Some(BuildFrame::Array(mut items)) => {
                items.push(value);
                self.stack.push(BuildFrame::Array(items));
            }
            Some(frame @ BuildFrame::Object(_)) => {
                // A value cannot land directly on an object; restore and
                // treat as a contract violation.
                self.stack.push(frame);
                panic!("value written without a member key");
            }
            None => self.root = Some(value),
        }
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for JsonEncoder {
    fn supports_references(&self) -> bool {
        false
    }

    fn begin_document(&mut self, _root: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.stack.push(BuildFrame::Object(Map::new()));
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(BuildFrame::Object(map)) => {
                self.attach(Json::Object(map));
                Ok(())
            }
            _ => panic!("end_record without open object"),
        }
    }

    fn begin_member(&mut self, member: &MemberDescriptor) -> Result<()> {
        self.stack.push(BuildFrame::Key(member.name.clone()));
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.stack.push(BuildFrame::Object(Map::new()));
        Ok(())
    }

    fn end_choice(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(BuildFrame::Object(map)) => {
                self.attach(Json::Object(map));
                Ok(())
            }
            _ => panic!("end_choice without open object"),
        }
    }

    fn begin_variant(&mut self, variant: &MemberDescriptor) -> Result<()> {
        self.stack.push(BuildFrame::Key(variant.name.clone()));
        Ok(())
    }

    fn end_variant(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor, len: usize) -> Result<()> {
        self.stack.push(BuildFrame::Array(Vec::with_capacity(len)));
        Ok(())
    }

    fn begin_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(BuildFrame::Array(items)) => {
                self.attach(Json::Array(items));
                Ok(())
            }
            _ => panic!("end_container without open array"),
        }
    }

    fn write_null(&mut self) -> Result<()> {
        self.attach(Json::Null);
        Ok(())
    }

    fn begin_object(&mut self, _index: u32) -> Result<()> {
        Err(Error::UnsupportedReference { format: "json" })
    }

    fn end_object(&mut self) -> Result<()> {
        Err(Error::UnsupportedReference { format: "json" })
    }

    fn write_backref(&mut self, _index: u32) -> Result<()> {
        Err(Error::UnsupportedReference { format: "json" })
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.attach(Json::Bool(v));
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.attach(Json::Number(Number::from(v)));
        Ok(())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.attach(Json::Number(Number::from(v)));
        Ok(())
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        self.write_f64(f64::from(v))
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        let number = Number::from_f64(v)
            .ok_or_else(|| encode_error("non-finite float is not representable in json"))?;
        self.attach(Json::Number(number));
        Ok(())
    }

    fn write_str(&mut self, v: &str) -> Result<()> {
        self.attach(Json::String(v.to_string()));
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        let mut hex = String::with_capacity(v.len() * 2);
        for byte in v {
            hex.push_str(&format!("{:02X}", byte));
        }
        self.attach(Json::String(hex));
        Ok(())
    }
}

#[derive(Debug)]
enum WalkFrame {
    /// A value waiting to be consumed by the next read.
    Value(Json),
    /// Open record: drained object entries, consumed in wire order.
    Object {
        entries: Vec<(String, Json)>,
        next: usize,
    },
    /// Open container: drained array items.
    Array { items: Vec<Json>, next: usize },
}

/// JSON decoder.
#[derive(Debug)]
pub struct JsonDecoder {
    stack: Vec<WalkFrame>,
}

impl JsonDecoder {
    /// Parse the input document.
    pub fn new(input: &[u8]) -> Result<Self> {
        let root: Json = serde_json::from_slice(input).map_err(|e| Error::Format {
            position: Position::at_line(0, e.line() as u32, e.column() as u32),
            message: format!("malformed json: {}", e),
        })?;
        Ok(Self {
            stack: vec![WalkFrame::Value(root)],
        })
    }

    fn fail(&self, message: impl Into<String>) -> Error {
        Error::Format {
            position: Position::default(),
            message: message.into(),
        }
    }

    /// Consume the pending value.
    fn take_value(&mut self, what: &str) -> Result<Json> {
        match self.stack.pop() {
            Some(WalkFrame::Value(value)) => Ok(value),
            Some(other) => {
                self.stack.push(other);
                Err(self.fail(format!("expected {}, found an open scope", what)))
            }
            None => Err(self.fail(format!("expected {}, found end of document", what))),
        }
    }

    /// Inspect the pending value without consuming it.
    fn peek_value(&self, what: &str) -> Result<&Json> {
        match self.stack.last() {
            Some(WalkFrame::Value(value)) => Ok(value),
            _ => Err(self.fail(format!("expected {}, found an open scope", what))),
        }
    }
}

impl Decoder for JsonDecoder {
    fn supports_references(&self) -> bool {
        false
    }

    fn begin_document(&mut self, _root: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_record(&mut self, desc: &TypeDescriptor) -> Result<()> {
        match self.take_value("object")? {
            Json::Object(map) => {
                self.stack.push(WalkFrame::Object {
                    entries: map.into_iter().collect(),
                    next: 0,
                });
                Ok(())
            }
            other => Err(self.fail(format!(
                "record {} must be a json object, found {}",
                desc.name,
                json_kind(&other)
            ))),
        }
    }

    fn next_member(&mut self) -> Result<Option<MemberKey>> {
        let (key, value) = match self.stack.last_mut() {
            Some(WalkFrame::Object { entries, next }) => {
                if *next >= entries.len() {
                    return Ok(None);
                }
                let entry = std::mem::replace(&mut entries[*next], (String::new(), Json::Null));
                *next += 1;
                entry
            }
            _ => return Err(self.fail("member outside an open object")),
        };
        self.stack.push(WalkFrame::Value(value));
        Ok(Some(MemberKey::Name(key)))
    }

    fn end_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(WalkFrame::Object { .. }) => Ok(()),
            _ => panic!("end_record without open object"),
        }
    }

    fn begin_choice(&mut self, desc: &TypeDescriptor) -> Result<MemberKey> {
        match self.take_value("object")? {
            Json::Object(map) if map.len() == 1 => {
                let (key, value) = map.into_iter().next().expect("length checked above");
                self.stack.push(WalkFrame::Value(value));
                Ok(MemberKey::Name(key))
            }
            Json::Object(map) => Err(self.fail(format!(
                "choice {} must be a single-key object, found {} keys",
                desc.name,
                map.len()
            ))),
            other => Err(self.fail(format!(
                "choice {} must be a json object, found {}",
                desc.name,
                json_kind(&other)
            ))),
        }
    }

    fn end_choice(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor) -> Result<()> {
        match self.take_value("array")? {
            Json::Array(items) => {
                self.stack.push(WalkFrame::Array { items, next: 0 });
                Ok(())
            }
            other => Err(self.fail(format!(
                "container must be a json array, found {}",
                json_kind(&other)
            ))),
        }
    }

    fn next_element(&mut self) -> Result<bool> {
        let value = match self.stack.last_mut() {
            Some(WalkFrame::Array { items, next }) => {
                if *next >= items.len() {
                    return Ok(false);
                }
                let item = std::mem::replace(&mut items[*next], Json::Null);
                *next += 1;
                item
            }
            _ => return Err(self.fail("element outside an open array")),
        };
        self.stack.push(WalkFrame::Value(value));
        Ok(true)
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(WalkFrame::Array { .. }) => Ok(()),
            _ => panic!("end_container without open array"),
        }
    }

    fn read_pointer(&mut self) -> Result<PointerEvent> {
        if self.peek_value("pointer value")?.is_null() {
            self.take_value("pointer value")?;
            Ok(PointerEvent::Null)
        } else {
            Ok(PointerEvent::Object(None))
        }
    }

    fn end_object(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        match self.take_value("bool")? {
            Json::Bool(v) => Ok(v),
            other => Err(self.fail(format!("expected bool, found {}", json_kind(&other)))),
        }
    }

    fn read_i64(&mut self) -> Result<i64> {
        match self.take_value("integer")? {
            Json::Number(n) => n
                .as_i64()
                .ok_or_else(|| self.fail(format!("number {} is not a signed integer", n))),
            other => Err(self.fail(format!("expected integer, found {}", json_kind(&other)))),
        }
    }

    fn read_u64(&mut self) -> Result<u64> {
        match self.take_value("integer")? {
            Json::Number(n) => n
                .as_u64()
                .ok_or_else(|| self.fail(format!("number {} is not an unsigned integer", n))),
            other => Err(self.fail(format!("expected integer, found {}", json_kind(&other)))),
        }
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.read_f64().map(|v| v as f32)
    }

    fn read_f64(&mut self) -> Result<f64> {
        match self.take_value("number")? {
            Json::Number(n) => n
                .as_f64()
                .ok_or_else(|| self.fail(format!("number {} is out of float range", n))),
            other => Err(self.fail(format!("expected number, found {}", json_kind(&other)))),
        }
    }

    fn read_str(&mut self) -> Result<String> {
        match self.take_value("string")? {
            Json::String(s) => Ok(s),
            other => Err(self.fail(format!("expected string, found {}", json_kind(&other)))),
        }
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        match self.take_value("hex string")? {
            Json::String(s) => {
                if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(self.fail(format!("string {:?} is not a hex byte block", s)));
                }
                Ok(s.as_bytes()
                    .chunks(2)
                    .map(|pair| {
                        u8::from_str_radix(std::str::from_utf8(pair).unwrap_or("00"), 16)
                            .unwrap_or(0)
                    })
                    .collect())
            }
            other => Err(self.fail(format!("expected hex string, found {}", json_kind(&other)))),
        }
    }

    fn skip_value(&mut self) -> Result<u32> {
        self.take_value("value")?;
        Ok(0)
    }

    fn position(&self) -> Position {
        Position::default()
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PrimitiveKind, RecordBuilder};

    #[test]
    fn test_encoder_compact_object() {
        let desc = RecordBuilder::new("Sample")
            .list_member("values", PrimitiveKind::U32)
            .build();
        let member = &desc.members().unwrap()[0];
        let cont = match &member.ty.kind {
            crate::descriptor::TypeKind::Container(cont) => cont,
            other => panic!("expected container member, got {:?}", other),
        };

        let mut enc = JsonEncoder::new();
        enc.begin_document(&desc).unwrap();
        enc.begin_record(&desc).unwrap();
        enc.begin_member(member).unwrap();
        enc.begin_container(cont, 3).unwrap();
        for v in [1u64, 2, 3] {
            enc.begin_element().unwrap();
            enc.write_u64(v).unwrap();
            enc.end_element().unwrap();
        }
        enc.end_container().unwrap();
        enc.end_member().unwrap();
        enc.end_record().unwrap();
        enc.end_document().unwrap();

        assert_eq!(enc.into_bytes(), br#"{"values":[1,2,3]}"#);
    }

    #[test]
    fn test_decoder_members_in_any_order() {
        let desc = RecordBuilder::new("Point")
            .member("x", PrimitiveKind::I32)
            .member("y", PrimitiveKind::I32)
            .build();

        let mut dec = JsonDecoder::new(br#"{"y":2,"x":1}"#).unwrap();
        dec.begin_document(&desc).unwrap();
        dec.begin_record(&desc).unwrap();

        assert_eq!(
            dec.next_member().unwrap(),
            Some(MemberKey::Name("y".into()))
        );
        assert_eq!(dec.read_i64().unwrap(), 2);
        dec.end_member().unwrap();
        assert_eq!(
            dec.next_member().unwrap(),
            Some(MemberKey::Name("x".into()))
        );
        assert_eq!(dec.read_i64().unwrap(), 1);
        dec.end_member().unwrap();
        assert_eq!(dec.next_member().unwrap(), None);
        dec.end_record().unwrap();
        dec.end_document().unwrap();
    }

    #[test]
    fn test_malformed_json_reports_position() {
        let err = JsonDecoder::new(b"{\n  \"x\": }").unwrap_err();
        match err {
            Error::Format { position, message } => {
                assert_eq!(position.line, 2);
                assert!(message.contains("malformed json"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_float_rejected() {
        let mut enc = JsonEncoder::new();
        assert!(enc.write_f64(f64::NAN).is_err());
    }

    #[test]
    fn test_bytes_as_hex_string() {
        let mut enc = JsonEncoder::new();
        enc.write_bytes(&[0xDE, 0xAD]).unwrap();
        assert_eq!(enc.into_bytes(), br#""DEAD""#);

        let mut dec = JsonDecoder::new(br#""DEAD""#).unwrap();
        assert_eq!(dec.read_bytes().unwrap(), vec![0xDE, 0xAD]);
    }
}
