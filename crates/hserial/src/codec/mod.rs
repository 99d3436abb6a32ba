// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Format codecs: the low-level event/primitive interface each wire format
//! implements beneath the generic dispatcher.
//!
//! The dispatcher never touches raw bytes — it emits/consumes structural
//! events and typed primitives through [`Encoder`]/[`Decoder`], and each
//! codec translates those into its own lexical rules atop a cursor.

pub mod binary;
pub mod cursor;
pub mod json;
pub mod text;
pub mod xml;

pub use binary::{BinaryDecoder, BinaryEncoder};
pub use json::{JsonDecoder, JsonEncoder};
pub use text::{TextDecoder, TextEncoder};
pub use xml::{XmlDecoder, XmlEncoder};

use crate::descriptor::{ContainerDescriptor, MemberDescriptor, TypeDescriptor};
use crate::error::{Position, Result};

/// The four supported wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// Tag/length/value binary — byte-exact compatibility contract.
    Binary,
    /// Brace-notation structured text.
    Text,
    /// One element per record/member.
    Xml,
    /// Objects, arrays and scalars.
    Json,
}

impl WireFormat {
    /// Lowercase format name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

/// Wire-provided member identifier: numeric tag for binary, name for the
/// text formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKey {
    Id(u32),
    Name(String),
}

impl MemberKey {
    /// Render for diagnostics.
    pub fn display(&self) -> String {
        match self {
            Self::Id(id) => format!("#{}", id),
            Self::Name(name) => name.clone(),
        }
    }
}

/// Pointer lexeme read from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Null marker.
    Null,
    /// Object start; the carried index, when the format expresses one, is
    /// verified against the session's first-seen counter.
    Object(Option<u32>),
    /// Back-reference to an earlier object.
    Backref(u32),
}

/// Write-side codec events. The dispatcher guarantees well-formed nesting
/// (mirrored by its frame stack); codecs only translate events to bytes.
pub trait Encoder {
    /// Whether the format has a reference/back-reference lexical construct.
    fn supports_references(&self) -> bool;

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;

    fn begin_record(&mut self, desc: &TypeDescriptor) -> Result<()>;
    fn end_record(&mut self) -> Result<()>;
    fn begin_member(&mut self, member: &MemberDescriptor) -> Result<()>;
    fn end_member(&mut self) -> Result<()>;

    fn begin_choice(&mut self, desc: &TypeDescriptor) -> Result<()>;
    fn end_choice(&mut self) -> Result<()>;
    fn begin_variant(&mut self, variant: &MemberDescriptor) -> Result<()>;
    fn end_variant(&mut self) -> Result<()>;

    fn begin_container(&mut self, desc: &ContainerDescriptor, len: usize) -> Result<()>;
    fn begin_element(&mut self) -> Result<()>;
    fn end_element(&mut self) -> Result<()>;
    fn end_container(&mut self) -> Result<()>;

    fn write_null(&mut self) -> Result<()>;
    fn begin_object(&mut self, index: u32) -> Result<()>;
    fn end_object(&mut self) -> Result<()>;
    fn write_backref(&mut self, index: u32) -> Result<()>;

    fn write_bool(&mut self, v: bool) -> Result<()>;
    fn write_i64(&mut self, v: i64) -> Result<()>;
    fn write_u64(&mut self, v: u64) -> Result<()>;
    fn write_f32(&mut self, v: f32) -> Result<()>;
    fn write_f64(&mut self, v: f64) -> Result<()>;
    fn write_str(&mut self, v: &str) -> Result<()>;
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;
}

/// Read-side codec events.
///
/// Record members arrive keyed ([`MemberKey`]) in whatever order the wire
/// carries them; the dispatcher resolves keys against the descriptor and
/// routes unknown ones to the skip layer.
pub trait Decoder {
    /// Whether the format has a reference/back-reference lexical construct.
    fn supports_references(&self) -> bool;

    fn begin_document(&mut self, root: &TypeDescriptor) -> Result<()>;
    fn end_document(&mut self) -> Result<()>;

    fn begin_record(&mut self, desc: &TypeDescriptor) -> Result<()>;
    /// Next member key, or None when the record has no further members.
    fn next_member(&mut self) -> Result<Option<MemberKey>>;
    fn end_member(&mut self) -> Result<()>;
    fn end_record(&mut self) -> Result<()>;

    /// Open a choice and return the selected variant's key.
    fn begin_choice(&mut self, desc: &TypeDescriptor) -> Result<MemberKey>;
    fn end_choice(&mut self) -> Result<()>;

    fn begin_container(&mut self, desc: &ContainerDescriptor) -> Result<()>;
    /// Whether another element follows.
    fn next_element(&mut self) -> Result<bool>;
    fn end_element(&mut self) -> Result<()>;
    fn end_container(&mut self) -> Result<()>;

    fn read_pointer(&mut self) -> Result<PointerEvent>;
    fn end_object(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_u64(&mut self) -> Result<u64>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_f64(&mut self) -> Result<f64>;
    fn read_str(&mut self) -> Result<String>;
    fn read_bytes(&mut self) -> Result<Vec<u8>>;

    /// Consume exactly one structurally well-formed value without
    /// materializing it, leaving the cursor at the next sibling. Returns
    /// the number of object-start markers consumed so the session can keep
    /// its reference index sequence aligned.
    fn skip_value(&mut self) -> Result<u32>;

    /// Current stream position for diagnostics.
    fn position(&self) -> Position;
}
