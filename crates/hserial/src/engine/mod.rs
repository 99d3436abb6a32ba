// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode/decode sessions.
//!
//! A session is one top-level [`encode`] or [`decode`] call: it owns a
//! fresh frame stack and reference table, walks the value/descriptor pair
//! with the generic dispatcher, and discards all session state on return.
//! Descriptors and the registry are read-only and shared across sessions.

mod read;
mod skip;
mod write;

pub use read::Reader;
pub use write::Writer;

use crate::codec::{
    BinaryDecoder, BinaryEncoder, JsonDecoder, JsonEncoder, TextDecoder, TextEncoder, WireFormat,
    XmlDecoder, XmlEncoder,
};
use crate::descriptor::{TypeDescriptor, TypeRegistry};
use crate::error::{Error, Position, Result};
use crate::value::Value;
use std::io;

/// Explicit per-session configuration. Never ambient.
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Unknown wire members are fatal instead of skipped.
    pub strict_mode: bool,
    /// Formats without reference syntax may duplicate shared objects
    /// instead of failing with `UnsupportedReference`.
    pub allow_unshared_duplication: bool,
}

impl StreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_unshared_duplication(mut self, allow: bool) -> Self {
        self.allow_unshared_duplication = allow;
        self
    }
}

/// Encode a value against its descriptor into the given wire format.
pub fn encode(
    value: &Value,
    desc: &TypeDescriptor,
    registry: &TypeRegistry,
    format: WireFormat,
    config: &StreamConfig,
) -> Result<Vec<u8>> {
    log::trace!("encode session: type={} format={}", desc.name, format.name());
    match format {
        WireFormat::Binary => {
            let mut codec = BinaryEncoder::new();
            Writer::new(&mut codec, registry, format, config).write_document(value, desc)?;
            Ok(codec.into_bytes())
        }
        WireFormat::Text => {
            let mut codec = TextEncoder::new();
            Writer::new(&mut codec, registry, format, config).write_document(value, desc)?;
            Ok(codec.into_bytes())
        }
        WireFormat::Xml => {
            let mut codec = XmlEncoder::new();
            Writer::new(&mut codec, registry, format, config).write_document(value, desc)?;
            Ok(codec.into_bytes())
        }
        WireFormat::Json => {
            let mut codec = JsonEncoder::new();
            Writer::new(&mut codec, registry, format, config).write_document(value, desc)?;
            Ok(codec.into_bytes())
        }
    }
}

/// Decode one value of the descriptor's shape from the given wire format.
pub fn decode(
    bytes: &[u8],
    desc: &TypeDescriptor,
    registry: &TypeRegistry,
    format: WireFormat,
    config: &StreamConfig,
) -> Result<Value> {
    log::trace!("decode session: type={} format={}", desc.name, format.name());
    match format {
        WireFormat::Binary => {
            let mut codec = BinaryDecoder::new(bytes);
            Reader::new(&mut codec, registry, config).read_document(desc)
        }
        WireFormat::Text => {
            let mut codec = TextDecoder::new(bytes);
            Reader::new(&mut codec, registry, config).read_document(desc)
        }
        WireFormat::Xml => {
            let text = std::str::from_utf8(bytes).map_err(|e| Error::Format {
                position: Position::at_offset(e.valid_up_to()),
                message: format!("input is not valid utf-8: {}", e),
            })?;
            let mut codec = XmlDecoder::new(text)?;
            Reader::new(&mut codec, registry, config).read_document(desc)
        }
        WireFormat::Json => {
            let mut codec = JsonDecoder::new(bytes)?;
            Reader::new(&mut codec, registry, config).read_document(desc)
        }
    }
}

/// Encode into an arbitrary byte sink. I/O failures surface as
/// [`Error::Io`]; the sink's state after a failure is the caller's to
/// clean up, and partial output must be treated as invalid.
pub fn encode_to_writer<W: io::Write>(
    writer: &mut W,
    value: &Value,
    desc: &TypeDescriptor,
    registry: &TypeRegistry,
    format: WireFormat,
    config: &StreamConfig,
) -> Result<()> {
    let bytes = encode(value, desc, registry, format, config)?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Decode from an arbitrary byte source.
pub fn decode_from_reader<R: io::Read>(
    reader: &mut R,
    desc: &TypeDescriptor,
    registry: &TypeRegistry,
    format: WireFormat,
    config: &StreamConfig,
) -> Result<Value> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes, desc, registry, format, config)
}
