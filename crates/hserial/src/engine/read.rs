// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic read dispatcher.
//!
//! Structurally symmetric to the write side, with the tolerance rules the
//! wire demands: members resolve by key in any order, unknown members are
//! skipped (fatal under strict mode), absent members fall back to their
//! default or the unset state, and back-references replay shared objects
//! into a single materialized instance.

use crate::codec::{Decoder, MemberKey, PointerEvent};
use crate::descriptor::{
    ContainerDescriptor, MemberDescriptor, PointerDescriptor, PrimitiveKind, RecordDescriptor,
    TypeDescriptor, TypeKind,
};
use crate::engine::StreamConfig;
use crate::error::{Error, Result};
use crate::refs::ReadRefs;
use crate::stack::{FrameKind, FrameStack};
use crate::value::{SharedValue, Value};
use std::collections::HashMap;

/// One read session over a codec.
pub struct Reader<'a, D: Decoder> {
    pub(crate) codec: &'a mut D,
    pub(crate) registry: &'a crate::descriptor::TypeRegistry,
    config: &'a StreamConfig,
    pub(crate) frames: FrameStack,
    pub(crate) refs: ReadRefs,
}

impl<'a, D: Decoder> Reader<'a, D> {
    pub fn new(
        codec: &'a mut D,
        registry: &'a crate::descriptor::TypeRegistry,
        config: &'a StreamConfig,
    ) -> Self {
        Self {
            codec,
            registry,
            config,
            frames: FrameStack::new(),
            refs: ReadRefs::new(),
        }
    }

    /// Read one complete document.
    pub fn read_document(&mut self, desc: &TypeDescriptor) -> Result<Value> {
        self.codec.begin_document(desc)?;
        let value = self.read_value(desc)?;
        self.codec.end_document()?;
        debug_assert!(self.frames.is_empty(), "unbalanced frames after read");
        Ok(value)
    }

    /// Read one value of the descriptor's shape.
    pub fn read_value(&mut self, desc: &TypeDescriptor) -> Result<Value> {
        match &desc.kind {
            TypeKind::Primitive(kind) => self.read_primitive(*kind),
            TypeKind::Record(record) => self.read_record(desc, record),
            TypeKind::Choice(_) => self.read_choice(desc),
            TypeKind::Container(cont) => self.read_container(cont),
            TypeKind::Pointer(ptr) => self.read_pointer_value(ptr),
        }
    }

    fn narrow_error(&self, kind: PrimitiveKind, raw: impl std::fmt::Display) -> Error {
        Error::TypeMismatch {
            expected: kind.name().to_string(),
            found: format!("integer {}", raw),
            path: self.frames.path(),
        }
    }

    fn read_primitive(&mut self, kind: PrimitiveKind) -> Result<Value> {
        match kind {
            PrimitiveKind::Bool => Ok(Value::Bool(self.codec.read_bool()?)),
            PrimitiveKind::I8 => {
                let raw = self.codec.read_i64()?;
                i8::try_from(raw)
                    .map(Value::I8)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::I16 => {
                let raw = self.codec.read_i64()?;
                i16::try_from(raw)
                    .map(Value::I16)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::I32 => {
                let raw = self.codec.read_i64()?;
                i32::try_from(raw)
                    .map(Value::I32)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::I64 => Ok(Value::I64(self.codec.read_i64()?)),
            PrimitiveKind::U8 => {
                let raw = self.codec.read_u64()?;
                u8::try_from(raw)
                    .map(Value::U8)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::U16 => {
                let raw = self.codec.read_u64()?;
                u16::try_from(raw)
                    .map(Value::U16)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::U32 => {
                let raw = self.codec.read_u64()?;
                u32::try_from(raw)
                    .map(Value::U32)
                    .map_err(|_| self.narrow_error(kind, raw))
            }
            PrimitiveKind::U64 => Ok(Value::U64(self.codec.read_u64()?)),
            PrimitiveKind::F32 => Ok(Value::F32(self.codec.read_f32()?)),
            PrimitiveKind::F64 => Ok(Value::F64(self.codec.read_f64()?)),
            PrimitiveKind::Str => Ok(Value::Str(self.codec.read_str()?)),
            PrimitiveKind::Bytes => Ok(Value::Bytes(self.codec.read_bytes()?)),
        }
    }

    /// Resolve a wire member key against the local descriptor.
    fn resolve_member<'m>(
        record: &'m RecordDescriptor,
        key: &MemberKey,
    ) -> Option<&'m MemberDescriptor> {
        match key {
            MemberKey::Id(id) => record.member_by_id(*id),
            MemberKey::Name(name) => record.member(name),
        }
    }

    fn read_record(&mut self, desc: &TypeDescriptor, record: &RecordDescriptor) -> Result<Value> {
        self.codec.begin_record(desc)?;
        self.frames.push(FrameKind::Record, &desc.name);

        let mut members: HashMap<String, Value> = HashMap::new();
        while let Some(key) = self.codec.next_member()? {
            match Self::resolve_member(record, &key) {
                Some(member) => {
                    if members.contains_key(&member.name) {
                        return Err(Error::Format {
                            position: self.codec.position(),
                            message: format!(
                                "duplicate member {}.{}",
                                desc.name, member.name
                            ),
                        });
                    }
                    let member = member.clone();
                    self.frames.push(FrameKind::Member, &member.name);
                    let value = self.read_value(&member.ty)?;
                    self.frames.pop(FrameKind::Member);
                    self.codec.end_member()?;
                    members.insert(member.name, value);
                }
                None if self.config.strict_mode => {
                    return Err(Error::UnknownMember {
                        record: desc.name.clone(),
                        member: key.display(),
                    });
                }
                None => {
                    log::debug!(
                        "skipping unknown member {} of {}",
                        key.display(),
                        desc.name
                    );
                    let markers = self.codec.skip_value()?;
                    self.register_skipped(markers);
                    self.codec.end_member()?;
                }
            }
        }
        self.codec.end_record()?;
        self.frames.pop(FrameKind::Record);

        // Absent members: default if one exists, unset if optional,
        // otherwise the wire is missing required data.
        for member in &record.members {
            if members.contains_key(&member.name) {
                continue;
            }
            if let Some(default) = &member.default {
                members.insert(member.name.clone(), default.clone());
            } else if !member.optional {
                return Err(Error::MissingRequiredMember {
                    record: desc.name.clone(),
                    member: member.name.clone(),
                });
            }
        }
        Ok(Value::Record(members))
    }

    fn read_choice(&mut self, desc: &TypeDescriptor) -> Result<Value> {
        let choice = match &desc.kind {
            TypeKind::Choice(choice) => choice,
            _ => unreachable!("read_choice on non-choice descriptor"),
        };
        let key = self.codec.begin_choice(desc)?;
        let variant = match &key {
            MemberKey::Id(id) => choice.variant_by_id(*id),
            MemberKey::Name(name) => choice.variant(name),
        };
        // There is no value to materialize for an unknown variant, so this
        // is fatal regardless of strict mode.
        let variant = variant
            .ok_or_else(|| Error::UnknownMember {
                record: desc.name.clone(),
                member: key.display(),
            })?
            .clone();

        self.frames.push(FrameKind::Choice, &desc.name);
        self.frames.push(FrameKind::Variant, &variant.name);
        let inner = self.read_value(&variant.ty)?;
        self.frames.pop(FrameKind::Variant);
        self.frames.pop(FrameKind::Choice);
        self.codec.end_choice()?;
        Ok(Value::Choice(variant.name, Box::new(inner)))
    }

    fn read_container(&mut self, cont: &ContainerDescriptor) -> Result<Value> {
        self.codec.begin_container(cont)?;
        self.frames.push(FrameKind::Container, "");
        let mut items = Vec::new();
        while self.codec.next_element()? {
            self.frames.push(FrameKind::Element, items.len().to_string());
            let item = self.read_value(&cont.element)?;
            self.frames.pop(FrameKind::Element);
            self.codec.end_element()?;
            items.push(item);
        }
        self.frames.pop(FrameKind::Container);
        self.codec.end_container()?;
        Ok(Value::List(items))
    }

    fn read_pointer_value(&mut self, ptr: &PointerDescriptor) -> Result<Value> {
        let pointee = ptr.pointee.resolve(self.registry)?.clone();
        match self.codec.read_pointer()? {
            PointerEvent::Null => {
                if ptr.nullable {
                    Ok(Value::Pointer(None))
                } else {
                    Err(Error::TypeMismatch {
                        expected: "non-null pointer".to_string(),
                        found: "null".to_string(),
                        path: self.frames.path(),
                    })
                }
            }
            PointerEvent::Backref(index) => {
                let cell = self.refs.resolve(index)?;
                Ok(Value::Pointer(Some(cell)))
            }
            PointerEvent::Object(wire_index) => {
                // Register before materializing the pointee, so cycles can
                // back-reference the object under construction.
                let cell = SharedValue::new(Value::Null);
                let index = self.refs.register(cell.clone());
                if let Some(carried) = wire_index {
                    if carried != index {
                        return Err(Error::Format {
                            position: self.codec.position(),
                            message: format!(
                                "object index {} does not match first-seen index {}",
                                carried, index
                            ),
                        });
                    }
                }
                let inner = self.read_value(&pointee)?;
                cell.set(inner);
                self.codec.end_object()?;
                Ok(Value::Pointer(Some(cell)))
            }
        }
    }

    /// Keep the reference index sequence aligned across skipped content:
    /// every object marker consumed by a skip claims the next index.
    pub(crate) fn register_skipped(&mut self, markers: u32) {
        for _ in 0..markers {
            self.refs.register(SharedValue::new(Value::Null));
        }
        if markers > 0 {
            log::debug!("registered {} placeholder object(s) from skipped content", markers);
        }
    }
}
