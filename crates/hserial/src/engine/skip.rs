// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Skip/tolerance layer.
//!
//! Consumes exactly one structurally well-formed value without
//! materializing it, leaving the cursor at the start of the next sibling.
//! Two flavors: a raw codec-level skip for wire content with no local
//! descriptor (the unknown-member path), and a descriptor-driven
//! validating skip that walks the known shape and discards everything it
//! reads. Both keep the reference index sequence aligned by registering a
//! placeholder for every object-start marker they consume.

use crate::codec::{Decoder, MemberKey, PointerEvent};
use crate::descriptor::{PointerDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use crate::engine::read::Reader;
use crate::error::{Error, Result};
use crate::value::{SharedValue, Value};

impl<D: Decoder> Reader<'_, D> {
    /// Skip one value. With a descriptor the skip validates the shape as
    /// it goes; without one it consumes whatever well-formed value the
    /// wire carries.
    pub fn skip(&mut self, desc: Option<&TypeDescriptor>) -> Result<()> {
        match desc {
            Some(desc) => self.skip_typed(desc),
            None => {
                let markers = self.codec.skip_value()?;
                self.register_skipped(markers);
                Ok(())
            }
        }
    }

    fn skip_typed(&mut self, desc: &TypeDescriptor) -> Result<()> {
        match &desc.kind {
            TypeKind::Primitive(kind) => self.skip_primitive(*kind),
            TypeKind::Record(record) => {
                self.codec.begin_record(desc)?;
                while let Some(key) = self.codec.next_member()? {
                    let member = match &key {
                        MemberKey::Id(id) => record.member_by_id(*id),
                        MemberKey::Name(name) => record.member(name),
                    };
                    match member {
                        Some(member) => {
                            let ty = member.ty.clone();
                            self.skip_typed(&ty)?;
                        }
                        None => {
                            let markers = self.codec.skip_value()?;
                            self.register_skipped(markers);
                        }
                    }
                    self.codec.end_member()?;
                }
                self.codec.end_record()
            }
            TypeKind::Choice(choice) => {
                let key = self.codec.begin_choice(desc)?;
                let variant = match &key {
                    MemberKey::Id(id) => choice.variant_by_id(*id),
                    MemberKey::Name(name) => choice.variant(name),
                };
                let variant = variant
                    .ok_or_else(|| Error::UnknownMember {
                        record: desc.name.clone(),
                        member: key.display(),
                    })?
                    .clone();
                self.skip_typed(&variant.ty)?;
                self.codec.end_choice()
            }
            TypeKind::Container(cont) => {
                self.codec.begin_container(cont)?;
                let element = cont.element.clone();
                while self.codec.next_element()? {
                    self.skip_typed(&element)?;
                    self.codec.end_element()?;
                }
                self.codec.end_container()
            }
            TypeKind::Pointer(ptr) => self.skip_pointer(ptr),
        }
    }

    fn skip_primitive(&mut self, kind: PrimitiveKind) -> Result<()> {
        match kind {
            PrimitiveKind::Bool => self.codec.read_bool().map(|_| ()),
            PrimitiveKind::I8 | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
                self.codec.read_i64().map(|_| ())
            }
            PrimitiveKind::U8 | PrimitiveKind::U16 | PrimitiveKind::U32 | PrimitiveKind::U64 => {
                self.codec.read_u64().map(|_| ())
            }
            PrimitiveKind::F32 => self.codec.read_f32().map(|_| ()),
            PrimitiveKind::F64 => self.codec.read_f64().map(|_| ()),
            PrimitiveKind::Str => self.codec.read_str().map(|_| ()),
            PrimitiveKind::Bytes => self.codec.read_bytes().map(|_| ()),
        }
    }

    fn skip_pointer(&mut self, ptr: &PointerDescriptor) -> Result<()> {
        match self.codec.read_pointer()? {
            PointerEvent::Null => Ok(()),
            PointerEvent::Backref(index) => {
                // Validate the reference even though the value is dropped.
                self.refs.resolve(index).map(|_| ())
            }
            PointerEvent::Object(wire_index) => {
                // The skipped object still claims its first-seen index.
                let index = self.refs.register(SharedValue::new(Value::Null));
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
                let pointee = ptr.pointee.resolve(self.registry)?.clone();
                self.skip_typed(&pointee)?;
                self.codec.end_object()
            }
        }
    }
}
