// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Instance handle: an opaque (value, descriptor) pair with typed access.
//!
//! The engine never owns application data; an `Instance` is the handle the
//! application hands to a session, and the handle it gets back from decode.

use crate::descriptor::{TypeDescriptor, TypeKind};
use crate::error::{Error, Result};
use crate::value::{FromValue, IntoValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// A value paired with its type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    descriptor: Arc<TypeDescriptor>,
    value: Value,
}

impl Instance {
    /// Create an instance holding the descriptor's default value: an empty
    /// record (all members unset), an unselected choice, an empty
    /// container, or a null pointer.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        let value = default_value(descriptor);
        Self {
            descriptor: descriptor.clone(),
            value,
        }
    }

    /// Wrap an existing value.
    pub fn from_value(descriptor: &Arc<TypeDescriptor>, value: Value) -> Self {
        Self {
            descriptor: descriptor.clone(),
            value,
        }
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Typed read of a record member. Unset members report `FieldNotFound`
    /// semantics via `MissingRequiredMember` — use [`Instance::is_set`] to
    /// probe presence first.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let member = self.require_member(name)?;
        let value = self.value.member(name).ok_or_else(|| {
            Error::MissingRequiredMember {
                record: self.descriptor.name.clone(),
                member: name.to_string(),
            }
        })?;
        T::from_value(value).ok_or_else(|| Error::TypeMismatch {
            expected: member.ty.kind_name().to_string(),
            found: value.kind_name().to_string(),
            path: format!("{}.{}", self.descriptor.name, name),
        })
    }

    /// Typed write of a record member.
    pub fn set<T: IntoValue>(&mut self, name: &str, value: T) -> Result<()> {
        self.require_member(name)?;
        if !self.value.set_member(name, value.into_value()) {
            return Err(Error::TypeMismatch {
                expected: "record".to_string(),
                found: self.value.kind_name().to_string(),
                path: self.descriptor.name.clone(),
            });
        }
        Ok(())
    }

    /// Presence indicator: whether the member currently holds a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.value.member(name).is_some()
    }

    /// Return a member to the unset state.
    pub fn clear(&mut self, name: &str) -> Result<()> {
        self.require_member(name)?;
        if let Value::Record(members) = &mut self.value {
            members.remove(name);
        }
        Ok(())
    }

    /// Select a choice variant. Replaces any previously selected variant,
    /// so exactly one variant is ever set.
    pub fn select<T: IntoValue>(&mut self, variant: &str, value: T) -> Result<()> {
        let choice = match &self.descriptor.kind {
            TypeKind::Choice(c) => c,
            _ => {
                return Err(Error::TypeMismatch {
                    expected: "choice".to_string(),
                    found: self.descriptor.kind_name().to_string(),
                    path: self.descriptor.name.clone(),
                })
            }
        };
        if choice.variant(variant).is_none() {
            return Err(Error::UnknownMember {
                record: self.descriptor.name.clone(),
                member: variant.to_string(),
            });
        }
        self.value = Value::Choice(variant.to_string(), Box::new(value.into_value()));
        Ok(())
    }

    /// Selected variant name, or None while the choice is unselected.
    pub fn selected(&self) -> Option<&str> {
        self.value.variant()
    }

    fn require_member(&self, name: &str) -> Result<&crate::descriptor::MemberDescriptor> {
        match &self.descriptor.kind {
            TypeKind::Record(record) => {
                record.member(name).ok_or_else(|| Error::UnknownMember {
                    record: self.descriptor.name.clone(),
                    member: name.to_string(),
                })
            }
            _ => Err(Error::TypeMismatch {
                expected: "record".to_string(),
                found: self.descriptor.kind_name().to_string(),
                path: self.descriptor.name.clone(),
            }),
        }
    }
}

/// Default value for a descriptor kind.
fn default_value(descriptor: &TypeDescriptor) -> Value {
    use crate::descriptor::PrimitiveKind;
    match &descriptor.kind {
        TypeKind::Primitive(kind) => match kind {
            PrimitiveKind::Bool => Value::Bool(false),
            PrimitiveKind::I8 => Value::I8(0),
            PrimitiveKind::I16 => Value::I16(0),
            PrimitiveKind::I32 => Value::I32(0),
            PrimitiveKind::I64 => Value::I64(0),
            PrimitiveKind::U8 => Value::U8(0),
            PrimitiveKind::U16 => Value::U16(0),
            PrimitiveKind::U32 => Value::U32(0),
            PrimitiveKind::U64 => Value::U64(0),
            PrimitiveKind::F32 => Value::F32(0.0),
            PrimitiveKind::F64 => Value::F64(0.0),
            PrimitiveKind::Str => Value::Str(String::new()),
            PrimitiveKind::Bytes => Value::Bytes(Vec::new()),
        },
        TypeKind::Record(_) => Value::Record(HashMap::new()),
        TypeKind::Choice(_) => Value::Null,
        TypeKind::Container(_) => Value::List(Vec::new()),
        TypeKind::Pointer(_) => Value::Pointer(None),
    }
}
