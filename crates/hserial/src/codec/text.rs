// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured text codec — brace notation with a `TypeName ::= value`
//! document header.
//!
//! Grammar summary:
//!
//! ```text
//! document  = name "::=" value
//! record    = "{" [ member value ("," member value)* ] "}"
//! choice    = variant value
//! container = "{" [ value ("," value)* ] "}"
//! bool      = "TRUE" | "FALSE"
//! string    = '"' chars '"'          ("" escapes an embedded quote)
//! bytes     = "'" hex "'H"
//! pointer   = "NULL" | "&" index value | "*" index
//! float     = number | "PLUS-INFINITY" | "MINUS-INFINITY" | "NOT-A-NUMBER"
//! ```
//!
//! Reading is whitespace-insensitive and accepts members in any order;
//! writing is canonical (single-space layout, declaration order).

use crate::codec::cursor::WriteCursor;
use crate::codec::{Decoder, Encoder, MemberKey, PointerEvent};
use crate::descriptor::{ContainerDescriptor, MemberDescriptor, TypeDescriptor};
use crate::error::{Error, Position, Result};

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Structured text encoder.
pub struct TextEncoder {
    out: WriteCursor,
    /// One flag per open brace scope: true until the first child is
    /// written (drives comma placement).
    scopes: Vec<bool>,
}

impl TextEncoder {
    pub fn new() -> Self {
        Self {
            out: WriteCursor::new(),
            scopes: Vec::new(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.scopes.is_empty(), "unclosed scope at end of encode");
        self.out.into_inner()
    }

    fn separate(&mut self) {
        match self.scopes.last_mut() {
            Some(first @ true) => {
                *first = false;
                self.out.put_str(" ");
            }
            Some(_) => self.out.put_str(", "),
            None => {}
        }
    }

    fn put_f64(&mut self, v: f64) {
        if v.is_nan() {
            self.out.put_str("NOT-A-NUMBER");
        } else if v == f64::INFINITY {
            self.out.put_str("PLUS-INFINITY");
        } else if v == f64::NEG_INFINITY {
            self.out.put_str("MINUS-INFINITY");
        } else {
            self.out.put_str(&format!("{}", v));
        }
    }
}

impl Default for TextEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder for TextEncoder {
    fn supports_references(&self) -> bool {
        true
    }

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()> {
        self.out.put_str(&root.name);
        self.out.put_str(" ::= ");
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.out.put_str("\n");
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.out.put_str("{");
        self.scopes.push(true);
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        self.scopes.pop();
        self.out.put_str(" }");
        Ok(())
    }

    fn begin_member(&mut self, member: &MemberDescriptor) -> Result<()> {
        self.separate();
        self.out.put_str(&member.name);
        self.out.put_str(" ");
        Ok(())
    }

    fn end_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_choice(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_variant(&mut self, variant: &MemberDescriptor) -> Result<()> {
        self.out.put_str(&variant.name);
        self.out.put_str(" ");
        Ok(())
    }

    fn end_variant(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor, _len: usize) -> Result<()> {
        self.out.put_str("{");
        self.scopes.push(true);
        Ok(())
    }

    fn begin_element(&mut self) -> Result<()> {
        self.separate();
        Ok(())
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        self.scopes.pop();
        self.out.put_str(" }");
        Ok(())
    }

    fn write_null(&mut self) -> Result<()> {
        self.out.put_str("NULL");
        Ok(())
    }

    fn begin_object(&mut self, index: u32) -> Result<()> {
        self.out.put_str(&format!("&{} ", index));
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_backref(&mut self, index: u32) -> Result<()> {
        self.out.put_str(&format!("*{}", index));
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.out.put_str(if v { "TRUE" } else { "FALSE" });
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.out.put_str(&format!("{}", v));
        Ok(())
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.out.put_str(&format!("{}", v));
        Ok(())
    }

    fn write_f32(&mut self, v: f32) -> Result<()> {
        if v.is_finite() {
            self.out.put_str(&format!("{}", v));
            Ok(())
        } else {
            self.put_f64(f64::from(v));
            Ok(())
        }
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.put_f64(v);
        Ok(())
    }

    fn write_str(&mut self, v: &str) -> Result<()> {
        self.out.put_str("\"");
        for ch in v.chars() {
            if ch == '"' {
                self.out.put_str("\"\"");
            } else {
                let mut buf = [0u8; 4];
                self.out.put_str(ch.encode_utf8(&mut buf));
            }
        }
        self.out.put_str("\"");
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.out.put_str("'");
        for byte in v {
            self.out.put_str(&format!("{:02X}", byte));
        }
        self.out.put_str("'H");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tokenizer + decoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    LBrace,
    RBrace,
    Comma,
    Assign,
    Ident(String),
    Number(String),
    Str(String),
    Hex(Vec<u8>),
    ObjectMark(u32),
    BackrefMark(u32),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::LBrace => "'{'".into(),
            Self::RBrace => "'}'".into(),
            Self::Comma => "','".into(),
            Self::Assign => "'::='".into(),
            Self::Ident(name) => format!("identifier {:?}", name),
            Self::Number(raw) => format!("number {}", raw),
            Self::Str(_) => "string literal".into(),
            Self::Hex(_) => "hex literal".into(),
            Self::ObjectMark(index) => format!("object marker &{}", index),
            Self::BackrefMark(index) => format!("back-reference *{}", index),
        }
    }
}

#[derive(Debug, Clone)]
struct Lexed {
    token: Token,
    position: Position,
}

/// Structured text decoder.
pub struct TextDecoder<'a> {
    input: &'a [u8],
    offset: usize,
    line: u32,
    column: u32,
    peeked: Option<Lexed>,
    /// One flag per open brace scope (comma discipline).
    scopes: Vec<bool>,
}

impl<'a> TextDecoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
            peeked: None,
            scopes: Vec::new(),
        }
    }

    fn here(&self) -> Position {
        Position::at_line(self.offset, self.line, self.column)
    }

    fn fail(&self, position: Position, message: impl Into<String>) -> Error {
        Error::Format {
            position,
            message: message.into(),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_byte(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn lex_index(&mut self, mark: u8) -> Result<u32> {
        let at = self.here();
        let mut digits = String::new();
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            digits.push(self.advance().unwrap() as char);
        }
        if digits.is_empty() {
            return Err(self.fail(
                at,
                format!("'{}' must be followed by a reference index", mark as char),
            ));
        }
        digits
            .parse::<u32>()
            .map_err(|_| self.fail(at, format!("reference index {} out of range", digits)))
    }

    fn lex_string(&mut self, at: Position) -> Result<Token> {
        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                Some(b'"') => {
                    // Doubled quote escapes a literal quote.
                    if self.peek_byte() == Some(b'"') {
                        self.advance();
                        bytes.push(b'"');
                    } else {
                        break;
                    }
                }
                Some(byte) => bytes.push(byte),
                None => return Err(self.fail(at, "unterminated string literal")),
            }
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| self.fail(at, format!("invalid utf-8 in string literal: {}", e)))?;
        Ok(Token::Str(text))
    }

    fn lex_hex(&mut self, at: Position) -> Result<Token> {
        let mut digits = String::new();
        loop {
            match self.advance() {
                Some(b'\'') => break,
                Some(byte) if byte.is_ascii_hexdigit() => digits.push(byte as char),
                Some(byte) => {
                    return Err(self.fail(at, format!("invalid hex digit {:?}", byte as char)))
                }
                None => return Err(self.fail(at, "unterminated hex literal")),
            }
        }
        if self.advance() != Some(b'H') {
            return Err(self.fail(at, "hex literal must end with 'H"));
        }
        if digits.len() % 2 != 0 {
            return Err(self.fail(at, "hex literal has an odd digit count"));
        }
        let bytes = digits
            .as_bytes()
            .chunks(2)
            .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).unwrap())
            .collect();
        Ok(Token::Hex(bytes))
    }

    fn lex_number(&mut self, first: u8) -> Token {
        let mut raw = String::new();
        raw.push(first as char);
        let mut prev_exp = false;
        while let Some(byte) = self.peek_byte() {
            let take = match byte {
                b'0'..=b'9' | b'.' => true,
                b'e' | b'E' => true,
                b'+' | b'-' => prev_exp,
                _ => false,
            };
            if !take {
                break;
            }
            prev_exp = matches!(byte, b'e' | b'E');
            raw.push(self.advance().unwrap() as char);
        }
        Token::Number(raw)
    }

    fn lex_ident(&mut self, first: u8) -> Token {
        let mut name = String::new();
        name.push(first as char);
        while let Some(byte) = self.peek_byte() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                name.push(self.advance().unwrap() as char);
            } else {
                break;
            }
        }
        Token::Ident(name)
    }

    fn next_token(&mut self) -> Result<Option<Lexed>> {
        if let Some(lexed) = self.peeked.take() {
            return Ok(Some(lexed));
        }
        self.skip_whitespace();
        let at = self.here();
        let byte = match self.advance() {
            Some(byte) => byte,
            None => return Ok(None),
        };
        let token = match byte {
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b',' => Token::Comma,
            b':' => {
                if self.advance() == Some(b':') && self.advance() == Some(b'=') {
                    Token::Assign
                } else {
                    return Err(self.fail(at, "expected '::='"));
                }
            }
            b'"' => self.lex_string(at)?,
            b'\'' => self.lex_hex(at)?,
            b'&' => Token::ObjectMark(self.lex_index(b'&')?),
            b'*' => Token::BackrefMark(self.lex_index(b'*')?),
            b'0'..=b'9' | b'-' => self.lex_number(byte),
            byte if byte.is_ascii_alphabetic() => self.lex_ident(byte),
            other => {
                return Err(self.fail(at, format!("unexpected character {:?}", other as char)))
            }
        };
        Ok(Some(Lexed {
            token,
            position: at,
        }))
    }

    fn require_token(&mut self, what: &str) -> Result<Lexed> {
        let at = self.here();
        self.next_token()?
            .ok_or_else(|| self.fail(at, format!("unexpected end of input: expected {}", what)))
    }

    fn peek_token(&mut self) -> Result<Option<&Lexed>> {
        if self.peeked.is_none() {
            self.peeked = self.next_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<()> {
        let lexed = self.require_token(what)?;
        if lexed.token == *expected {
            Ok(())
        } else {
            Err(self.fail(
                lexed.position,
                format!("expected {}, found {}", what, lexed.token.describe()),
            ))
        }
    }

    fn ident(&mut self, what: &str) -> Result<(String, Position)> {
        let lexed = self.require_token(what)?;
        match lexed.token {
            Token::Ident(name) => Ok((name, lexed.position)),
            other => Err(self.fail(
                lexed.position,
                format!("expected {}, found {}", what, other.describe()),
            )),
        }
    }

    /// Comma discipline shared by records and containers: returns false at
    /// the closing brace (left unconsumed), true when another child opens.
    fn next_child(&mut self) -> Result<bool> {
        let first = match self.scopes.last() {
            Some(first) => *first,
            None => return Ok(false),
        };
        let at_close = match self.peek_token()? {
            Some(lexed) => lexed.token == Token::RBrace,
            None => {
                let at = self.here();
                return Err(self.fail(at, "unexpected end of input: unterminated '{'"));
            }
        };
        if at_close {
            return Ok(false);
        }
        if first {
            if let Some(flag) = self.scopes.last_mut() {
                *flag = false;
            }
        } else {
            self.expect(&Token::Comma, "','")?;
        }
        Ok(true)
    }

    fn close_scope(&mut self, what: &str) -> Result<()> {
        self.scopes.pop();
        self.expect(&Token::RBrace, what)?;
        Ok(())
    }

    fn parse_i128(&mut self, what: &str) -> Result<(i128, Position)> {
        let lexed = self.require_token(what)?;
        match &lexed.token {
            Token::Number(raw) if !raw.contains(['.', 'e', 'E']) => raw
                .parse::<i128>()
                .map(|v| (v, lexed.position))
                .map_err(|_| {
                    self.fail(lexed.position, format!("integer {} out of range", raw))
                }),
            other => Err(self.fail(
                lexed.position,
                format!("expected {}, found {}", what, other.describe()),
            )),
        }
    }

    /// Skip one value starting at `lexed`, counting object markers.
    fn skip_from(&mut self, lexed: Lexed) -> Result<u32> {
        match lexed.token {
            Token::Number(_) | Token::Str(_) | Token::Hex(_) | Token::BackrefMark(_) => Ok(0),
            Token::Ident(name) => {
                match name.as_str() {
                    "TRUE" | "FALSE" | "NULL" | "PLUS-INFINITY" | "MINUS-INFINITY"
                    | "NOT-A-NUMBER" => Ok(0),
                    // Anything else is a choice variant followed by its value.
                    _ => {
                        let next = self.require_token("variant value")?;
                        self.skip_from(next)
                    }
                }
            }
            Token::ObjectMark(_) => {
                let next = self.require_token("object value")?;
                Ok(1 + self.skip_from(next)?)
            }
            Token::LBrace => {
                let mut depth = 1usize;
                let mut objects = 0u32;
                while depth > 0 {
                    let inner = self.require_token("'}'")?;
                    match inner.token {
                        Token::LBrace => depth += 1,
                        Token::RBrace => depth -= 1,
                        Token::ObjectMark(_) => objects += 1,
                        _ => {}
                    }
                }
                Ok(objects)
            }
            other => Err(self.fail(
                lexed.position,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }
}

impl Decoder for TextDecoder<'_> {
    fn supports_references(&self) -> bool {
        true
    }

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()> {
        let (name, at) = self.ident("type name")?;
        if name != root.name {
            return Err(self.fail(
                at,
                format!("document names type {}, descriptor is {}", name, root.name),
            ));
        }
        self.expect(&Token::Assign, "'::='")
    }

    fn end_document(&mut self) -> Result<()> {
        if let Some(lexed) = self.next_token()? {
            return Err(self.fail(
                lexed.position,
                format!("trailing content after value: {}", lexed.token.describe()),
            ));
        }
        Ok(())
    }

    fn begin_record(&mut self, _desc: &TypeDescriptor) -> Result<()> {
        self.expect(&Token::LBrace, "'{'")?;
        self.scopes.push(true);
        Ok(())
    }

    fn next_member(&mut self) -> Result<Option<MemberKey>> {
        if !self.next_child()? {
            return Ok(None);
        }
        let (name, _) = self.ident("member name")?;
        Ok(Some(MemberKey::Name(name)))
    }

    fn end_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        self.close_scope("'}'")
    }

    fn begin_choice(&mut self, _desc: &TypeDescriptor) -> Result<MemberKey> {
        let (name, _) = self.ident("variant name")?;
        Ok(MemberKey::Name(name))
    }

    fn end_choice(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, _desc: &ContainerDescriptor) -> Result<()> {
        self.expect(&Token::LBrace, "'{'")?;
        self.scopes.push(true);
        Ok(())
    }

    fn next_element(&mut self) -> Result<bool> {
        self.next_child()
    }

    fn end_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        self.close_scope("'}'")
    }

    fn read_pointer(&mut self) -> Result<PointerEvent> {
        let lexed = self.require_token("pointer value")?;
        match lexed.token {
            Token::Ident(name) if name == "NULL" => Ok(PointerEvent::Null),
            Token::ObjectMark(index) => Ok(PointerEvent::Object(Some(index))),
            Token::BackrefMark(index) => Ok(PointerEvent::Backref(index)),
            other => Err(self.fail(
                lexed.position,
                format!("expected pointer value, found {}", other.describe()),
            )),
        }
    }

    fn end_object(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        let lexed = self.require_token("TRUE or FALSE")?;
        match lexed.token {
            Token::Ident(name) if name == "TRUE" => Ok(true),
            Token::Ident(name) if name == "FALSE" => Ok(false),
            other => Err(self.fail(
                lexed.position,
                format!("expected TRUE or FALSE, found {}", other.describe()),
            )),
        }
    }

    fn read_i64(&mut self) -> Result<i64> {
        let (value, at) = self.parse_i128("integer")?;
        i64::try_from(value).map_err(|_| self.fail(at, format!("integer {} out of range", value)))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let (value, at) = self.parse_i128("integer")?;
        u64::try_from(value)
            .map_err(|_| self.fail(at, format!("integer {} out of unsigned range", value)))
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.read_f64().map(|v| v as f32)
    }

    fn read_f64(&mut self) -> Result<f64> {
        let lexed = self.require_token("number")?;
        match &lexed.token {
            Token::Number(raw) => raw
                .parse::<f64>()
                .map_err(|_| self.fail(lexed.position, format!("malformed number {}", raw))),
            Token::Ident(name) => match name.as_str() {
                "PLUS-INFINITY" => Ok(f64::INFINITY),
                "MINUS-INFINITY" => Ok(f64::NEG_INFINITY),
                "NOT-A-NUMBER" => Ok(f64::NAN),
                _ => Err(self.fail(
                    lexed.position,
                    format!("expected number, found identifier {:?}", name),
                )),
            },
            other => Err(self.fail(
                lexed.position,
                format!("expected number, found {}", other.describe()),
            )),
        }
    }

    fn read_str(&mut self) -> Result<String> {
        let lexed = self.require_token("string literal")?;
        match lexed.token {
            Token::Str(text) => Ok(text),
            other => Err(self.fail(
                lexed.position,
                format!("expected string literal, found {}", other.describe()),
            )),
        }
    }

    fn read_bytes(&mut self) -> Result<Vec<u8>> {
        let lexed = self.require_token("hex literal")?;
        match lexed.token {
            Token::Hex(bytes) => Ok(bytes),
            other => Err(self.fail(
                lexed.position,
                format!("expected hex literal, found {}", other.describe()),
            )),
        }
    }

    fn skip_value(&mut self) -> Result<u32> {
        let lexed = self.require_token("value")?;
        self.skip_from(lexed)
    }

    fn position(&self) -> Position {
        self.here()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{PrimitiveKind, RecordBuilder};

    fn point() -> TypeDescriptor {
        RecordBuilder::new("Point")
            .member("x", PrimitiveKind::I32)
            .member("y", PrimitiveKind::I32)
            .build()
    }

    #[test]
    fn test_encoder_layout() {
        let desc = point();
        let members = desc.members().unwrap();

        let mut enc = TextEncoder::new();
        enc.begin_document(&desc).unwrap();
        enc.begin_record(&desc).unwrap();
        enc.begin_member(&members[0]).unwrap();
        enc.write_i64(1).unwrap();
        enc.end_member().unwrap();
        enc.begin_member(&members[1]).unwrap();
        enc.write_i64(-2).unwrap();
        enc.end_member().unwrap();
        enc.end_record().unwrap();
        enc.end_document().unwrap();

        let text = String::from_utf8(enc.into_bytes()).unwrap();
        assert_eq!(text, "Point ::= { x 1, y -2 }\n");
    }

    #[test]
    fn test_decoder_tolerates_whitespace_and_order() {
        let desc = point();
        let input = b"Point\n  ::= {\n    y 2 ,\n    x 1\n  }\n";
        let mut dec = TextDecoder::new(input);
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
    fn test_string_escaping_round_trip() {
        let mut enc = TextEncoder::new();
        enc.write_str("say \"hi\"").unwrap();
        let bytes = enc.into_bytes();
        assert_eq!(bytes, b"\"say \"\"hi\"\"\"");

        let mut dec = TextDecoder::new(&bytes);
        assert_eq!(dec.read_str().unwrap(), "say \"hi\"");
    }

    #[test]
    fn test_hex_literal_round_trip() {
        let mut enc = TextEncoder::new();
        enc.write_bytes(&[0xA1, 0x0F]).unwrap();
        let bytes = enc.into_bytes();
        assert_eq!(bytes, b"'A10F'H");

        let mut dec = TextDecoder::new(&bytes);
        assert_eq!(dec.read_bytes().unwrap(), vec![0xA1, 0x0F]);
    }

    #[test]
    fn test_wrong_type_name_rejected() {
        let desc = point();
        let mut dec = TextDecoder::new(b"Line ::= { }");
        let err = dec.begin_document(&desc).unwrap_err();
        assert!(err.to_string().contains("names type Line"));
    }

    #[test]
    fn test_error_carries_line_and_column() {
        let mut dec = TextDecoder::new(b"  \n  ?");
        let err = dec.read_i64().unwrap_err();
        match err {
            Error::Format { position, .. } => {
                assert_eq!(position.line, 2);
                assert_eq!(position.column, 3);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_skip_value_counts_objects() {
        let mut dec = TextDecoder::new(b"{ a &0 { x 1 }, b *0 } 7");
        assert_eq!(dec.skip_value().unwrap(), 1);
        assert_eq!(dec.read_i64().unwrap(), 7);
    }

    #[test]
    fn test_special_floats() {
        let mut enc = TextEncoder::new();
        enc.write_f64(f64::INFINITY).unwrap();
        let bytes = enc.into_bytes();
        assert_eq!(bytes, b"PLUS-INFINITY");

        let mut dec = TextDecoder::new(&bytes);
        assert_eq!(dec.read_f64().unwrap(), f64::INFINITY);
    }
}
