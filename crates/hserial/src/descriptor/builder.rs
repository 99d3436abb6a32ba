// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders for record and choice descriptors.
//!
//! Wire tag ids default to declaration order (0-based) and can be pinned
//! with the `*_with_id` variants for schema evolution.

use crate::descriptor::{
    ChoiceDescriptor, ContainerKind, MemberDescriptor, PrimitiveKind, RecordDescriptor,
    TypeDescriptor, TypeKind, TypeRef,
};
use crate::value::Value;
use std::sync::Arc;

/// Builder for record descriptors.
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    members: Vec<MemberDescriptor>,
    ordered: bool,
}

impl RecordBuilder {
    /// Create a new builder for a record type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            ordered: true,
        }
    }

    fn next_id(&self) -> u32 {
        self.members.len() as u32
    }

    /// Add a primitive member.
    pub fn member(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let ty = Arc::new(TypeDescriptor::primitive("", kind));
        self.member_of(name, ty)
    }

    /// Add a member with an explicit type descriptor.
    pub fn member_of(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        let id = self.next_id();
        self.members.push(MemberDescriptor::new(name, id, ty));
        self
    }

    /// Add a member with a pinned wire tag id.
    pub fn member_with_id(
        mut self,
        name: impl Into<String>,
        id: u32,
        ty: Arc<TypeDescriptor>,
    ) -> Self {
        self.members.push(MemberDescriptor::new(name, id, ty));
        self
    }

    /// Add an optional primitive member.
    pub fn optional_member(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let ty = Arc::new(TypeDescriptor::primitive("", kind));
        self.optional_member_of(name, ty)
    }

    /// Add an optional member with an explicit type descriptor.
    pub fn optional_member_of(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        let id = self.next_id();
        self.members
            .push(MemberDescriptor::new(name, id, ty).optional());
        self
    }

    /// Add a required member carrying a default value.
    pub fn member_with_default(
        mut self,
        name: impl Into<String>,
        kind: PrimitiveKind,
        default: Value,
    ) -> Self {
        let id = self.next_id();
        let ty = Arc::new(TypeDescriptor::primitive("", kind));
        self.members
            .push(MemberDescriptor::new(name, id, ty).with_default(default));
        self
    }

    /// Add a container member over a primitive element kind.
    pub fn list_member(self, name: impl Into<String>, element: PrimitiveKind) -> Self {
        let element = Arc::new(TypeDescriptor::primitive("", element));
        let ty = Arc::new(TypeDescriptor::container("", ContainerKind::List, element));
        self.member_of(name, ty)
    }

    /// Add a container member over an explicit element type.
    pub fn list_member_of(self, name: impl Into<String>, element: Arc<TypeDescriptor>) -> Self {
        let ty = Arc::new(TypeDescriptor::container("", ContainerKind::List, element));
        self.member_of(name, ty)
    }

    /// Add a nullable pointer member.
    pub fn pointer_member(self, name: impl Into<String>, pointee: impl Into<TypeRef>) -> Self {
        let ty = Arc::new(TypeDescriptor::pointer("", pointee.into(), true));
        self.member_of(name, ty)
    }

    /// Mark wire member order as insignificant to the schema layer.
    pub fn unordered(mut self) -> Self {
        self.ordered = false;
        self
    }

    /// Build the record descriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::new(
            self.name,
            TypeKind::Record(RecordDescriptor {
                members: self.members,
                ordered: self.ordered,
            }),
        )
    }
}

/// Builder for choice descriptors.
#[derive(Debug)]
pub struct ChoiceBuilder {
    name: String,
    variants: Vec<MemberDescriptor>,
}

impl ChoiceBuilder {
    /// Create a new builder for a choice type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Add a primitive variant.
    pub fn variant(self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let ty = Arc::new(TypeDescriptor::primitive("", kind));
        self.variant_of(name, ty)
    }

    /// Add a variant with an explicit type descriptor.
    pub fn variant_of(mut self, name: impl Into<String>, ty: Arc<TypeDescriptor>) -> Self {
        let id = self.variants.len() as u32;
        self.variants.push(MemberDescriptor::new(name, id, ty));
        self
    }

    /// Add a variant with a pinned wire tag id.
    pub fn variant_with_id(
        mut self,
        name: impl Into<String>,
        id: u32,
        ty: Arc<TypeDescriptor>,
    ) -> Self {
        self.variants.push(MemberDescriptor::new(name, id, ty));
        self
    }

    /// Build the choice descriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::new(
            self.name,
            TypeKind::Choice(ChoiceDescriptor {
                variants: self.variants,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder_assigns_ids() {
        let desc = RecordBuilder::new("Point")
            .member("x", PrimitiveKind::I32)
            .member("y", PrimitiveKind::I32)
            .optional_member("label", PrimitiveKind::Str)
            .build();

        let members = desc.members().expect("record");
        assert_eq!(members.len(), 3);
        assert_eq!(members[0].id, 0);
        assert_eq!(members[2].id, 2);
        assert!(members[2].optional);
        assert!(!members[0].optional);
    }

    #[test]
    fn test_record_builder_pinned_id() {
        let ty = Arc::new(TypeDescriptor::primitive("", PrimitiveKind::U64));
        let desc = RecordBuilder::new("Evolved")
            .member("kept", PrimitiveKind::Bool)
            .member_with_id("added", 7, ty)
            .build();

        let members = desc.members().expect("record");
        assert_eq!(members[1].id, 7);
    }

    #[test]
    fn test_choice_builder() {
        let desc = ChoiceBuilder::new("Shape")
            .variant("a", PrimitiveKind::I32)
            .variant("b", PrimitiveKind::Str)
            .build();

        let variants = desc.variants().expect("choice");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[1].name, "b");
        assert_eq!(variants[1].id, 1);
    }

    #[test]
    fn test_default_member() {
        let desc = RecordBuilder::new("Config")
            .member_with_default("retries", PrimitiveKind::U32, Value::U32(3))
            .build();

        let members = desc.members().expect("record");
        assert_eq!(members[0].default, Some(Value::U32(3)));
        assert!(!members[0].optional);
    }
}
