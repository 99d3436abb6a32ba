// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic write dispatcher.
//!
//! One recursive traversal over a (value, descriptor) pair, emitting typed
//! primitives and structural open/close events into the active codec. The
//! frame stack mirrors the stream state machine; the reference table keeps
//! pointer identity.

use crate::codec::{Encoder, WireFormat};
use crate::descriptor::{
    ContainerDescriptor, PointerDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
};
use crate::engine::StreamConfig;
use crate::error::{Error, Result};
use crate::refs::WriteRefs;
use crate::stack::{FrameKind, FrameStack};
use crate::value::{SharedValue, Value};

/// One write session over a codec.
pub struct Writer<'a, E: Encoder> {
    codec: &'a mut E,
    registry: &'a crate::descriptor::TypeRegistry,
    format: WireFormat,
    config: &'a StreamConfig,
    frames: FrameStack,
    refs: WriteRefs,
}

impl<'a, E: Encoder> Writer<'a, E> {
    pub fn new(
        codec: &'a mut E,
        registry: &'a crate::descriptor::TypeRegistry,
        format: WireFormat,
        config: &'a StreamConfig,
    ) -> Self {
        Self {
            codec,
            registry,
            format,
            config,
            frames: FrameStack::new(),
            refs: WriteRefs::new(),
        }
    }

    /// Write one complete document.
    pub fn write_document(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<()> {
        self.codec.begin_document(desc)?;
        self.write_value(value, desc)?;
        self.codec.end_document()?;
        debug_assert!(self.frames.is_empty(), "unbalanced frames after write");
        Ok(())
    }

    /// Write one value of the descriptor's shape.
    pub fn write_value(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<()> {
        match &desc.kind {
            TypeKind::Primitive(kind) => self.write_primitive(value, *kind),
            TypeKind::Record(_) => self.write_record(value, desc),
            TypeKind::Choice(_) => self.write_choice(value, desc),
            TypeKind::Container(cont) => self.write_container(value, cont),
            TypeKind::Pointer(ptr) => self.write_pointer(value, ptr),
        }
    }

    fn mismatch(&self, expected: impl Into<String>, found: &Value) -> Error {
        Error::TypeMismatch {
            expected: expected.into(),
            found: found.kind_name().to_string(),
            path: self.frames.path(),
        }
    }

    fn write_primitive(&mut self, value: &Value, kind: PrimitiveKind) -> Result<()> {
        match (kind, value) {
            (PrimitiveKind::Bool, Value::Bool(v)) => self.codec.write_bool(*v),
            (PrimitiveKind::I8, Value::I8(v)) => self.codec.write_i64(i64::from(*v)),
            (PrimitiveKind::I16, Value::I16(v)) => self.codec.write_i64(i64::from(*v)),
            (PrimitiveKind::I32, Value::I32(v)) => self.codec.write_i64(i64::from(*v)),
            (PrimitiveKind::I64, Value::I64(v)) => self.codec.write_i64(*v),
            (PrimitiveKind::U8, Value::U8(v)) => self.codec.write_u64(u64::from(*v)),
            (PrimitiveKind::U16, Value::U16(v)) => self.codec.write_u64(u64::from(*v)),
            (PrimitiveKind::U32, Value::U32(v)) => self.codec.write_u64(u64::from(*v)),
            (PrimitiveKind::U64, Value::U64(v)) => self.codec.write_u64(*v),
            (PrimitiveKind::F32, Value::F32(v)) => self.codec.write_f32(*v),
            (PrimitiveKind::F64, Value::F64(v)) => self.codec.write_f64(*v),
            (PrimitiveKind::Str, Value::Str(v)) => self.codec.write_str(v),
            (PrimitiveKind::Bytes, Value::Bytes(v)) => self.codec.write_bytes(v),
            (kind, other) => Err(self.mismatch(kind.name(), other)),
        }
    }

    fn write_record(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<()> {
        let members = match value {
            Value::Record(members) => members,
            other => return Err(self.mismatch("record", other)),
        };
        let record = match &desc.kind {
            TypeKind::Record(record) => record,
            _ => unreachable!("write_record on non-record descriptor"),
        };

        self.codec.begin_record(desc)?;
        self.frames.push(FrameKind::Record, &desc.name);
        // Set members (and required members carrying a default) encode in
        // declared order; unset optionals are omitted entirely.
        for member in &record.members {
            let current = match members.get(&member.name) {
                Some(set) => Some(set),
                // A default fills in for an unset required member only;
                // unset optionals are omitted even when a default exists.
                None if !member.optional => member.default.as_ref(),
                None => None,
            };
            match current {
                Some(member_value) => {
                    self.codec.begin_member(member)?;
                    self.frames.push(FrameKind::Member, &member.name);
                    self.write_value(member_value, &member.ty)?;
                    self.frames.pop(FrameKind::Member);
                    self.codec.end_member()?;
                }
                None if member.optional => {}
                None => {
                    return Err(Error::MissingRequiredMember {
                        record: desc.name.clone(),
                        member: member.name.clone(),
                    });
                }
            }
        }
        self.frames.pop(FrameKind::Record);
        self.codec.end_record()
    }

    fn write_choice(&mut self, value: &Value, desc: &TypeDescriptor) -> Result<()> {
        let (selected, inner) = match value {
            Value::Choice(selected, inner) => (selected, inner),
            Value::Null => {
                return Err(Error::ChoiceNotSet {
                    choice: desc.name.clone(),
                });
            }
            other => return Err(self.mismatch("choice", other)),
        };
        let choice = match &desc.kind {
            TypeKind::Choice(choice) => choice,
            _ => unreachable!("write_choice on non-choice descriptor"),
        };
        let variant = choice.variant(selected).ok_or_else(|| Error::TypeMismatch {
            expected: format!("variant of {}", desc.name),
            found: selected.clone(),
            path: self.frames.path(),
        })?;

        self.codec.begin_choice(desc)?;
        self.frames.push(FrameKind::Choice, &desc.name);
        self.codec.begin_variant(variant)?;
        self.frames.push(FrameKind::Variant, &variant.name);
        self.write_value(inner, &variant.ty)?;
        self.frames.pop(FrameKind::Variant);
        self.codec.end_variant()?;
        self.frames.pop(FrameKind::Choice);
        self.codec.end_choice()
    }

    fn write_container(&mut self, value: &Value, cont: &ContainerDescriptor) -> Result<()> {
        let items = match value {
            Value::List(items) => items,
            other => return Err(self.mismatch("container", other)),
        };

        self.codec.begin_container(cont, items.len())?;
        self.frames.push(FrameKind::Container, "");
        for (index, item) in items.iter().enumerate() {
            self.codec.begin_element()?;
            self.frames.push(FrameKind::Element, index.to_string());
            self.write_value(item, &cont.element)?;
            self.frames.pop(FrameKind::Element);
            self.codec.end_element()?;
        }
        self.frames.pop(FrameKind::Container);
        self.codec.end_container()
    }

    fn write_pointer(&mut self, value: &Value, ptr: &PointerDescriptor) -> Result<()> {
        match value {
            Value::Pointer(None) => {
                if ptr.nullable {
                    self.codec.write_null()
                } else {
                    Err(self.mismatch("non-null pointer", &Value::Null))
                }
            }
            Value::Pointer(Some(cell)) => self.write_shared(cell, ptr),
            other => Err(self.mismatch("pointer", other)),
        }
    }

    fn write_shared(&mut self, cell: &SharedValue, ptr: &PointerDescriptor) -> Result<()> {
        let pointee = ptr.pointee.resolve(self.registry)?.clone();

        if let Some(index) = self.refs.lookup(cell) {
            // Second and later sights of one identity.
            if self.codec.supports_references() {
                return self.codec.write_backref(index);
            }
            if self.refs.is_open(cell) {
                // A cycle cannot be expanded by duplication.
                return Err(Error::UnsupportedReference {
                    format: self.format.name(),
                });
            }
            if self.config.allow_unshared_duplication {
                log::warn!(
                    "duplicating shared {} object in {} output",
                    pointee.name,
                    self.format.name()
                );
                let inner = cell.get();
                return self.write_value(&inner, &pointee);
            }
            return Err(Error::UnsupportedReference {
                format: self.format.name(),
            });
        }

        // First sight: assign the next index and emit the object itself.
        let index = self.refs.assign(cell);
        let inner = cell.get();
        if self.codec.supports_references() {
            self.codec.begin_object(index)?;
            self.write_value(&inner, &pointee)?;
            self.codec.end_object()?;
        } else {
            self.write_value(&inner, &pointee)?;
        }
        self.refs.close(cell);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::BinaryEncoder;
    use crate::descriptor::{ChoiceBuilder, RecordBuilder, TypeRegistry};

    fn write_binary(value: &Value, desc: &TypeDescriptor) -> Result<Vec<u8>> {
        let registry = TypeRegistry::new();
        let config = StreamConfig::default();
        let mut codec = BinaryEncoder::new();
        Writer::new(&mut codec, &registry, WireFormat::Binary, &config)
            .write_document(value, desc)?;
        Ok(codec.into_bytes())
    }

    #[test]
    fn test_unset_required_member_fails() {
        let desc = RecordBuilder::new("Person")
            .member("name", PrimitiveKind::Str)
            .build();
        let err = write_binary(&Value::empty_record(), &desc).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredMember { .. }));
    }

    #[test]
    fn test_unset_default_member_encodes_default() {
        let desc = RecordBuilder::new("Config")
            .member_with_default("retries", PrimitiveKind::U32, Value::U32(3))
            .build();
        let with_default = write_binary(&Value::empty_record(), &desc).unwrap();

        let mut explicit = Value::empty_record();
        explicit.set_member("retries", Value::U32(3));
        let with_explicit = write_binary(&explicit, &desc).unwrap();

        assert_eq!(with_default, with_explicit);
    }

    #[test]
    fn test_unselected_choice_fails() {
        let desc = ChoiceBuilder::new("Shape")
            .variant("a", PrimitiveKind::I32)
            .build();
        let err = write_binary(&Value::Null, &desc).unwrap_err();
        assert!(matches!(err, Error::ChoiceNotSet { .. }));
    }

    #[test]
    fn test_type_mismatch_carries_path() {
        let desc = RecordBuilder::new("Person")
            .member("age", PrimitiveKind::U32)
            .build();
        let mut value = Value::empty_record();
        value.set_member("age", Value::Str("forty".into()));

        match write_binary(&value, &desc).unwrap_err() {
            Error::TypeMismatch { path, .. } => assert_eq!(path, "Person.age"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_null_through_non_nullable_pointer_fails() {
        let pointee = std::sync::Arc::new(TypeDescriptor::primitive("int", PrimitiveKind::I32));
        let desc = TypeDescriptor::pointer("Req", crate::descriptor::TypeRef::Direct(pointee), false);
        let err = write_binary(&Value::Pointer(None), &desc).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }
}
