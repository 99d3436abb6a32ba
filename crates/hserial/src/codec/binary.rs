// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary tag/length/value codec.
//!
//! Every value is framed as `tag byte ++ uleb128 length ++ payload`;
//! structural frames wrap the concatenation of their child frames. Member
//! tags, variant tags and reference indices are uleb128 inside the
//! payload; integer payloads are minimal-length little-endian. Encoding is
//! canonical — the same graph and descriptor always produce the same
//! bytes — because external consumers depend on the exact layout.
//!
//! Frame tags:
//!
//! ```text
//! 0x01 BOOL      0x02 INT       0x03 UINT      0x04 FLOAT32
//! 0x05 FLOAT64   0x06 STRING    0x07 BYTES
//! 0x10 RECORD    0x11 MEMBER    0x12 CHOICE    0x13 CONTAINER
//! 0x20 NULL      0x21 OBJECT    0x22 BACKREF
//! ```

use crate::codec::cursor::{Cursor, WriteCursor};
use crate::codec::{Decoder, Encoder, MemberKey, PointerEvent};
use crate::descriptor::{ContainerDescriptor, MemberDescriptor, TypeDescriptor};
use crate::error::{Error, Position, Result};

pub(crate) const TAG_BOOL: u8 = 0x01;
pub(crate) const TAG_INT: u8 = 0x02;
pub(crate) const TAG_UINT: u8 = 0x03;
pub(crate) const TAG_F32: u8 = 0x04;
pub(crate) const TAG_F64: u8 = 0x05;
pub(crate) const TAG_STRING: u8 = 0x06;
pub(crate) const TAG_BYTES: u8 = 0x07;
pub(crate) const TAG_RECORD: u8 = 0x10;
pub(crate) const TAG_MEMBER: u8 = 0x11;
pub(crate) const TAG_CHOICE: u8 = 0x12;
pub(crate) const TAG_CONTAINER: u8 = 0x13;
pub(crate) const TAG_NULL: u8 = 0x20;
pub(crate) const TAG_OBJECT: u8 = 0x21;
pub(crate) const TAG_BACKREF: u8 = 0x22;

fn push_uleb(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Minimal-length little-endian two's complement.
fn int_payload(v: i64) -> Vec<u8> {
    let mut bytes = v.to_le_bytes().to_vec();
    while bytes.len() > 1 {
        let last = bytes[bytes.len() - 1];
        let prev = bytes[bytes.len() - 2];
        let redundant =
            (last == 0x00 && prev & 0x80 == 0) || (last == 0xFF && prev & 0x80 != 0);
        if !redundant {
            break;
        }
        bytes.pop();
    }
    bytes
}

/// Minimal-length little-endian unsigned.
fn uint_payload(v: u64) -> Vec<u8> {
    let mut bytes = v.to_le_bytes().to_vec();
    while bytes.len() > 1 && bytes[bytes.len() - 1] == 0 {
        bytes.pop();
    }
    bytes
}

/// Binary encoder. Structural frames buffer their payload so the length
/// prefix can be emitted in canonical minimal form.
pub struct BinaryEncoder {
    out: WriteCursor,
    frames: Vec<(u8, Vec<u8>)>,
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self {
            out: WriteCursor::new(),
            frames: Vec::new(),
        }
    }

    /// Extract the encoded bytes. All structural frames must be closed.
    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.frames.is_empty(), "unclosed frame at end of encode");
        self.out.into_inner()
    }

    fn emit(&mut self, bytes: &[u8]) {
        match self.frames.last_mut() {
            Some((_, payload)) => payload.extend_from_slice(bytes),
            None => self.out.put_slice(bytes),
        }
    }

    fn emit_frame(&mut self, tag: u8, payload: &[u8]) {
        let mut header = Vec::with_capacity(payload.len() + 6);
        header.push(tag);
        push_uleb(&mut header, payload.len() as u64);
        header.extend_from_slice(payload);
        self.emit(&header);
    }

    fn open(&mut self, tag: u8) {
        self.frames.push((tag, Vec::new()));
    }

    fn open_with_id(&mut self, tag: u8, id: u32) {
        let mut payload = Vec::new();
        push_uleb(&mut payload, u64::from(id));
        self.frames.push((tag, payload));
    }

    fn close(&mut self) {
        let (tag, payload) = self.frames.pop().expect("close without open frame");
        self.emit_frame(tag, &payload);
    }

    /// Append a uleb value to the innermost open frame's payload.
    fn emit_uleb(&mut self, value: u64) {
        let mut buf = Vec::new();
        push_uleb(&mut buf, value);
        self.emit(&buf);
    }
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for BinaryEncoder {
    fn supports_references(&self) -> bool {
        true
    }

    fn begin_document(&mut self, _root: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.open(TAG_RECORD);
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn begin_member(&mut self, member: &MemberDescriptor) -> Result<()> {
        self.open_with_id(TAG_MEMBER, member.id);
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.open(TAG_CHOICE);
        Ok(())
    }

    fn end_choice(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn begin_variant(&mut self, variant: &MemberDescriptor) -> Result<()> {
        self.emit_uleb(u64::from(variant.id));
        Ok(())
    }

    fn end_variant(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor, _len: usize) -> Result<()> {
        self.open(TAG_CONTAINER);
        Ok(())
    }

    fn begin_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        self.emit_frame(TAG_NULL, &[]);
        Ok(())
    }

    fn begin_object(&mut self, index: u32) -> Result<()> {
        self.open_with_id(TAG_OBJECT, index);
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.close();
        Ok(())
    }

    fn write_backref(&mut self, index: u32) -> Result<()> {
        let mut payload = Vec::new();
        push_uleb(&mut payload, u64::from(index));
        self.emit_frame(TAG_BACKREF, &payload);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.emit_frame(TAG_BOOL, &[u8::from(v)]);
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.emit_frame(TAG_INT, &int_payload(v));
        Ok(())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.emit_frame(TAG_UINT, &uint_payload(v));
        Ok(())
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        self.emit_frame(TAG_F32, &v.to_le_bytes());
        Ok(())
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.emit_frame(TAG_F64, &v.to_le_bytes());
        Ok(())
    }

    fn write_str(&mut self, v: &str) -> Result<()> {
        self.emit_frame(TAG_STRING, v.as_bytes());
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.emit_frame(TAG_BYTES, v);
        Ok(())
    }
}

/// Binary decoder over a byte cursor.
///
/// Open structural frames are tracked as end offsets; every `end_*` event
/// verifies the payload was consumed exactly, so trailing garbage inside a
/// frame surfaces as a format error at the offending offset.
pub struct BinaryDecoder<'a> {
    cursor: Cursor<'a>,
    ends: Vec<usize>,
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buffer),
            ends: Vec::new(),
        }
    }

    /// Byte offset of the read cursor (diagnostics, sibling decoding).
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    fn read_uleb(&mut self) -> Result<u64> {
        let start = self.cursor.offset();
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.cursor.get()?;
            if shift >= 64 || (shift == 63 && byte > 1) {
                return Err(Error::Format {
                    position: Position::at_offset(start),
                    message: "uleb128 value overflows 64 bits".into(),
                });
            }
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    fn read_index(&mut self) -> Result<u32> {
        let at = self.cursor.offset();
        let raw = self.read_uleb()?;
        u32::try_from(raw).map_err(|_| Error::Format {
            position: Position::at_offset(at),
            message: format!("reference index {} out of range", raw),
        })
    }

    /// Read `tag ++ length`, verifying the tag and that the payload fits
    /// the remaining input. Returns the payload end offset.
    fn frame_header(&mut self, expected: u8, what: &'static str) -> Result<usize> {
        let at = self.cursor.offset();
        let tag = self.cursor.get()?;
        if tag != expected {
            return Err(Error::Format {
                position: Position::at_offset(at),
                message: format!(
                    "expected {} frame (tag 0x{:02X}), found tag 0x{:02X}",
                    what, expected, tag
                ),
            });
        }
        self.frame_length()
    }

    /// Read a frame length and bound-check it. Returns the end offset.
    fn frame_length(&mut self) -> Result<usize> {
        let at = self.cursor.offset();
        let len = self.read_uleb()? as usize;
        if len > self.cursor.remaining() {
            return Err(Error::Format {
                position: Position::at_offset(at),
                message: format!(
                    "frame length {} exceeds remaining input {}",
                    len,
                    self.cursor.remaining()
                ),
            });
        }
        Ok(self.cursor.offset() + len)
    }

    /// Read a fixed-size primitive payload.
    fn sized_payload(&mut self, expected: u8, what: &'static str, size: usize) -> Result<&'a [u8]> {
        let end = self.frame_header(expected, what)?;
        let have = end - self.cursor.offset();
        if have != size {
            return Err(Error::Format {
                position: self.cursor.position(),
                message: format!("{} payload must be {} byte(s), found {}", what, size, have),
            });
        }
        self.cursor.take(size)
    }

    fn close_frame(&mut self, what: &'static str) -> Result<()> {
        let end = self.ends.pop().expect("close without open frame");
        if self.cursor.offset() != end {
            return Err(Error::Format {
                position: self.cursor.position(),
                message: format!("{} payload not fully consumed", what),
            });
        }
        Ok(())
    }

    fn at_frame_end(&self) -> bool {
        self.ends
            .last()
            .is_some_and(|end| self.cursor.offset() >= *end)
    }

    /// Structurally skip one frame, counting OBJECT markers.
    fn skip_frame(&mut self) -> Result<u32> {
        let at = self.cursor.offset();
        let tag = self.cursor.get()?;
        let end = self.frame_length()?;
        let mut objects = 0u32;
        match tag {
            TAG_BOOL | TAG_INT | TAG_UINT | TAG_F32 | TAG_F64 | TAG_STRING | TAG_BYTES
            | TAG_NULL | TAG_BACKREF => {
                self.cursor.skip(end - self.cursor.offset())?;
            }
            TAG_RECORD | TAG_CONTAINER => {
                while self.cursor.offset() < end {
                    objects += self.skip_frame()?;
                }
            }
            TAG_MEMBER | TAG_CHOICE | TAG_OBJECT => {
                if tag == TAG_OBJECT {
                    objects += 1;
                }
                self.read_uleb()?;
                objects += self.skip_frame()?;
            }
            other => {
                return Err(Error::Format {
                    position: Position::at_offset(at),
                    message: format!("unknown frame tag 0x{:02X}", other),
                });
            }
        }
        if self.cursor.offset() != end {
            return Err(Error::Format {
                position: self.cursor.position(),
                message: "skipped frame payload not fully consumed".into(),
            });
        }
        Ok(objects)
    }
}

impl Decoder for BinaryDecoder<'_> {
    fn supports_references(&self) -> bool {
        true
    }

    fn begin_document(&mut self, _root: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        let end = self.frame_header(TAG_RECORD, "record")?;
        self.ends.push(end);
        Ok(())
    }

    fn next_member(&mut self) -> Result<Option<MemberKey>> {
        if self.at_frame_end() {
            return Ok(None);
        }
        let end = self.frame_header(TAG_MEMBER, "member")?;
        self.ends.push(end);
        let id = self.read_index()?;
        Ok(Some(MemberKey::Id(id)))
    }

    fn end_member(&mut self) -> Result<()> {
        self.close_frame("member")
    }

    fn end_record(&mut self) -> Result<()> {
        self.close_frame("record")
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<MemberKey> {
        let end = self.frame_header(TAG_CHOICE, "choice")?;
        self.ends.push(end);
        let id = self.read_index()?;
        Ok(MemberKey::Id(id))
    }

    fn end_choice(&mut self) -> Result<()> {
        self.close_frame("choice")
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor) -> Result<()> {
        let end = self.frame_header(TAG_CONTAINER, "container")?;
        self.ends.push(end);
        Ok(())
    }

    fn next_element(&mut self) -> Result<bool> {
        Ok(!self.at_frame_end())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        self.close_frame("container")
    }

    fn read_pointer(&mut self) -> Result<PointerEvent> {
        let at = self.cursor.offset();
        match self.cursor.peek() {
            Some(TAG_NULL) => {
                self.cursor.get()?;
                let end = self.frame_length()?;
                if end != self.cursor.offset() {
                    return Err(Error::Format {
                        position: Position::at_offset(at),
                        message: "null frame carries a payload".into(),
                    });
                }
                Ok(PointerEvent::Null)
            }
            Some(TAG_OBJECT) => {
                self.cursor.get()?;
                let end = self.frame_length()?;
                self.ends.push(end);
                let index = self.read_index()?;
                Ok(PointerEvent::Object(Some(index)))
            }
            Some(TAG_BACKREF) => {
                self.cursor.get()?;
                let end = self.frame_length()?;
                let index = self.read_index()?;
                if self.cursor.offset() != end {
                    return Err(Error::Format {
                        position: Position::at_offset(at),
                        message: "backref frame payload not fully consumed".into(),
                    });
                }
                Ok(PointerEvent::Backref(index))
            }
            Some(other) => Err(Error::Format {
                position: Position::at_offset(at),
                message: format!("expected pointer frame, found tag 0x{:02X}", other),
            }),
            None => Err(Error::Format {
                position: Position::at_offset(at),
                message: "unexpected end of input: expected pointer frame".into(),
            }),
        }
    }

    fn end_object(&mut self) -> Result<()> {
        self.close_frame("object")
    }

    fn read_bool(&mut self) -> Result<bool> {
        let at = self.cursor.offset();
        let payload = self.sized_payload(TAG_BOOL, "bool", 1)?;
        match payload[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Format {
                position: Position::at_offset(at),
                message: format!("invalid bool payload 0x{:02X}", other),
            }),
        }
    }

    fn read_i64(&mut self) -> Result<i64> {
        let at = self.cursor.offset();
        let end = self.frame_header(TAG_INT, "int")?;
        let len = end - self.cursor.offset();
        if len == 0 || len > 8 {
            return Err(Error::Format {
                position: Position::at_offset(at),
                message: format!("int payload must be 1..=8 bytes, found {}", len),
            });
        }
        let payload = self.cursor.take(len)?;
        let negative = payload[len - 1] & 0x80 != 0;
        let mut bytes = if negative { [0xFF; 8] } else { [0x00; 8] };
        bytes[..len].copy_from_slice(payload);
        Ok(i64::from_le_bytes(bytes))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let at = self.cursor.offset();
        let end = self.frame_header(TAG_UINT, "uint")?;
        let len = end - self.cursor.offset();
        if len == 0 || len > 8 {
            return Err(Error::Format {
                position: Position::at_offset(at),
                message: format!("uint payload must be 1..=8 bytes, found {}", len),
            });
        }
        let payload = self.cursor.take(len)?;
        let mut bytes = [0u8; 8];
        bytes[..len].copy_from_slice(payload);
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let payload = self.sized_payload(TAG_F32, "float32", 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(payload);
        Ok(f32::from_le_bytes(bytes))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let payload = self.sized_payload(TAG_F64, "float64", 8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(payload);
        Ok(f64::from_le_bytes(bytes))
    }

    fn read_str(&mut self) -> Result<String> {
        let at = self.cursor.offset();
        let end = self.frame_header(TAG_STRING, "string")?;
        let payload = self.cursor.take(end - self.cursor.offset())?;
        String::from_utf8(payload.to_vec()).map_err(|e| Error::Format {
            position: Position::at_offset(at),
            message: format!("invalid utf-8 in string payload: {}", e),
        })
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let end = self.frame_header(TAG_BYTES, "bytes")?;
        Ok(self.cursor.take(end - self.cursor.offset())?.to_vec())
    }

    fn skip_value(&mut self) -> Result<u32> {
        self.skip_frame()
    }

    fn position(&self) -> Position {
        self.cursor.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_payload_minimal() {
        assert_eq!(int_payload(0), vec![0x00]);
        assert_eq!(int_payload(1), vec![0x01]);
        assert_eq!(int_payload(-1), vec![0xFF]);
        assert_eq!(int_payload(127), vec![0x7F]);
        assert_eq!(int_payload(128), vec![0x80, 0x00]);
        assert_eq!(int_payload(-128), vec![0x80]);
        assert_eq!(int_payload(-129), vec![0x7F, 0xFF]);
        assert_eq!(uint_payload(0), vec![0x00]);
        assert_eq!(uint_payload(256), vec![0x00, 0x01]);
    }

    #[test]
    fn test_primitive_frame_bytes() {
        let mut enc = BinaryEncoder::new();
        enc.write_bool(true).unwrap();
        enc.write_u64(0x1234).unwrap();
        enc.write_str("hi").unwrap();
        assert_eq!(
            enc.into_bytes(),
            vec![
                TAG_BOOL, 0x01, 0x01, // true
                TAG_UINT, 0x02, 0x34, 0x12, // 0x1234 LE minimal
                TAG_STRING, 0x02, b'h', b'i',
            ]
        );
    }

    #[test]
    fn test_int_round_trip_extremes() {
        let mut enc = BinaryEncoder::new();
        enc.write_i64(i64::MIN).unwrap();
        enc.write_i64(i64::MAX).unwrap();
        enc.write_i64(-1).unwrap();
        let bytes = enc.into_bytes();

        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.read_i64().unwrap(), i64::MIN);
        assert_eq!(dec.read_i64().unwrap(), i64::MAX);
        assert_eq!(dec.read_i64().unwrap(), -1);
    }

    #[test]
    fn test_truncated_length_reports_offset() {
        // Valid string tag, then a uleb length whose continuation bit runs
        // off the end of the buffer.
        let bytes = [TAG_STRING, 0x85];
        let mut dec = BinaryDecoder::new(&bytes);
        match dec.read_str().unwrap_err() {
            Error::Format { position, .. } => assert_eq!(position.offset, 2),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_length_beyond_buffer_reports_offset() {
        let bytes = [TAG_BYTES, 0x7F, 0xAA];
        let mut dec = BinaryDecoder::new(&bytes);
        match dec.read_bytes().unwrap_err() {
            Error::Format { position, message } => {
                assert_eq!(position.offset, 1);
                assert!(message.contains("exceeds remaining"), "{}", message);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_skip_leaves_cursor_at_sibling() {
        let mut enc = BinaryEncoder::new();
        enc.write_str("first").unwrap();
        enc.write_u64(7).unwrap();
        let bytes = enc.into_bytes();

        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.skip_value().unwrap(), 0);
        assert_eq!(dec.read_u64().unwrap(), 7);
    }

    #[test]
    fn test_skip_counts_object_markers() {
        let mut enc = BinaryEncoder::new();
        enc.begin_object(0).unwrap();
        enc.write_str("shared").unwrap();
        enc.end_object().unwrap();
        let bytes = enc.into_bytes();

        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.skip_value().unwrap(), 1);
    }
}
