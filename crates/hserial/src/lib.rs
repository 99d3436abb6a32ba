// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hserial - Reflection-driven object serialization
//!
//! A single generic traversal that encodes/decodes arbitrary object
//! graphs (records, choices, containers, primitives, shared references)
//! to and from four wire formats, driven entirely by runtime type
//! descriptors — no per-type generated code.
//!
//! ## Quick Start
//!
//! ```rust
//! use hserial::{
//!     decode, encode, Instance, PrimitiveKind, RecordBuilder, StreamConfig, TypeRegistry,
//!     WireFormat,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> hserial::Result<()> {
//!     // Describe the type at runtime.
//!     let descriptor = Arc::new(
//!         RecordBuilder::new("SensorReading")
//!             .member("sensor_id", PrimitiveKind::U32)
//!             .member("temperature", PrimitiveKind::F64)
//!             .optional_member("label", PrimitiveKind::Str)
//!             .build(),
//!     );
//!
//!     // Populate an instance through the typed handle.
//!     let mut reading = Instance::new(&descriptor);
//!     reading.set("sensor_id", 42u32)?;
//!     reading.set("temperature", 23.5f64)?;
//!
//!     // One engine, four wire formats.
//!     let registry = TypeRegistry::new();
//!     let config = StreamConfig::default();
//!     let json = encode(
//!         reading.value(),
//!         &descriptor,
//!         &registry,
//!         WireFormat::Json,
//!         &config,
//!     )?;
//!     assert_eq!(json, br#"{"sensor_id":42,"temperature":23.5}"#);
//!
//!     let back = decode(&json, &descriptor, &registry, WireFormat::Json, &config)?;
//!     assert_eq!(&back, reading.value());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +--------------------------------------------------------------+
//! |                     Application Layer                        |
//! |        Instance handles  |  TypeDescriptor builders          |
//! +--------------------------------------------------------------+
//! |                     Generic Dispatcher                       |
//! |   one recursive read/write walk over (value, descriptor)     |
//! |   frame stack (nesting) | reference table (identity)         |
//! +--------------------------------------------------------------+
//! |                     Format Codecs                            |
//! |   binary TLV | structured text | XML | JSON                  |
//! +--------------------------------------------------------------+
//! |                     Byte Cursors                             |
//! |   pull (peek/get/position)  |  push (put)                    |
//! +--------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Closed structural shape: primitive, record, choice, container, pointer |
//! | [`TypeRegistry`] | Frozen name -> descriptor table; resolves lazy pointer links |
//! | [`Value`] / [`Instance`] | Dynamic object model and its typed handle |
//! | [`WireFormat`] | Binary, structured text, XML or JSON |
//! | [`StreamConfig`] | Explicit session policy: strict mode, unshared duplication |
//!
//! ## Guarantees
//!
//! - **Byte-exact binary round trip** — same graph, same descriptor, same
//!   bytes; external consumers depend on the exact tag/length layout.
//! - **Shared-reference fidelity** — one object start plus N-1
//!   back-references replay into one materialized instance.
//! - **Schema tolerance** — unknown wire members are skipped (fatal under
//!   strict mode), absent members fall back to defaults or stay unset.

mod codec;
mod descriptor;
mod engine;
mod error;
mod instance;
mod refs;
mod stack;
mod value;

pub use codec::cursor::{Cursor, WriteCursor};
pub use codec::{
    BinaryDecoder, BinaryEncoder, Decoder, Encoder, JsonDecoder, JsonEncoder, MemberKey,
    PointerEvent, TextDecoder, TextEncoder, WireFormat, XmlDecoder, XmlEncoder,
};
pub use descriptor::{
    ChoiceBuilder, ChoiceDescriptor, ContainerDescriptor, ContainerKind, MemberDescriptor,
    PointerDescriptor, PrimitiveKind, RecordBuilder, RecordDescriptor, TypeDescriptor, TypeKind,
    TypeRef, TypeRegistry, TypeRegistryBuilder,
};
pub use engine::{
    decode, decode_from_reader, encode, encode_to_writer, Reader, StreamConfig, Writer,
};
pub use error::{Error, Position, Result};
pub use instance::Instance;
pub use refs::{ReadRefs, WriteRefs};
pub use stack::{FrameKind, FrameStack, StreamFrame};
pub use value::{FromValue, IntoValue, SharedValue, Value};
