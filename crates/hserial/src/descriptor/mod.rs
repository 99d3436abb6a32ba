// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors.
//!
//! A [`TypeDescriptor`] is structural metadata driving the generic
//! traversal: one closed set of shapes (primitive, record, choice,
//! container, pointer) shared by every wire format. Descriptors are built
//! once, shared via `Arc`, and never mutated afterwards; any number of
//! concurrent streams may read them. Recursive types route through
//! [`Pointer`](TypeKind::Pointer), whose [`TypeRef`] may be a lazy name
//! resolved against the [`TypeRegistry`](registry::TypeRegistry) — that is
//! what keeps the descriptor graph finite.

mod builder;
mod registry;

pub use builder::{ChoiceBuilder, RecordBuilder};
pub use registry::{TypeRef, TypeRegistry, TypeRegistryBuilder};

use crate::value::Value;
use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Bytes,
}

impl PrimitiveKind {
    /// Fixed payload size in bytes (None for variable-size kinds).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::Str | Self::Bytes => None,
        }
    }

    /// Lowercase kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "string",
            Self::Bytes => "bytes",
        }
    }
}

/// Container flavor. All three encode as an element sequence; the
/// distinction is carried for schema layers (uniqueness and key/value
/// pairing are not enforced here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

/// Type kind enumeration — the closed set of structural shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Record(RecordDescriptor),
    Choice(ChoiceDescriptor),
    Container(ContainerDescriptor),
    Pointer(PointerDescriptor),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name (root element / document framing name).
    pub name: String,
    /// Optional XML namespace, written as `xmlns` on the root element.
    pub xml_namespace: Option<String>,
    /// Structural shape.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            xml_namespace: None,
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a container descriptor around an element type.
    pub fn container(
        name: impl Into<String>,
        kind: ContainerKind,
        element: Arc<TypeDescriptor>,
    ) -> Self {
        Self::new(
            name,
            TypeKind::Container(ContainerDescriptor { element, kind }),
        )
    }

    /// Create a pointer descriptor.
    pub fn pointer(name: impl Into<String>, pointee: TypeRef, nullable: bool) -> Self {
        Self::new(name, TypeKind::Pointer(PointerDescriptor { pointee, nullable }))
    }

    /// Attach an XML namespace.
    pub fn with_xml_namespace(mut self, ns: impl Into<String>) -> Self {
        self.xml_namespace = Some(ns.into());
        self
    }

    /// Lowercase shape name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Primitive(p) => p.name(),
            TypeKind::Record(_) => "record",
            TypeKind::Choice(_) => "choice",
            TypeKind::Container(_) => "container",
            TypeKind::Pointer(_) => "pointer",
        }
    }

    /// Record members, if this is a record.
    pub fn members(&self) -> Option<&[MemberDescriptor]> {
        match &self.kind {
            TypeKind::Record(r) => Some(&r.members),
            _ => None,
        }
    }

    /// Choice variants, if this is a choice.
    pub fn variants(&self) -> Option<&[MemberDescriptor]> {
        match &self.kind {
            TypeKind::Choice(c) => Some(&c.variants),
            _ => None,
        }
    }
}

/// Record (sequence of named members).
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    pub members: Vec<MemberDescriptor>,
    /// Whether wire member order is significant to the schema layer.
    /// Encoding always uses declaration order; decoding tolerates any order.
    pub ordered: bool,
}

impl RecordDescriptor {
    /// Find a member by name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Find a member by wire tag id.
    pub fn member_by_id(&self, id: u32) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.id == id)
    }
}

/// Choice (tagged union — exactly one variant holds a value at a time).
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceDescriptor {
    pub variants: Vec<MemberDescriptor>,
}

impl ChoiceDescriptor {
    /// Find a variant by name.
    pub fn variant(&self, name: &str) -> Option<&MemberDescriptor> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Find a variant by wire tag id.
    pub fn variant_by_id(&self, id: u32) -> Option<&MemberDescriptor> {
        self.variants.iter().find(|v| v.id == id)
    }
}

/// Homogeneous element collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDescriptor {
    pub element: Arc<TypeDescriptor>,
    pub kind: ContainerKind,
}

/// Owned or shared reference to a pointee type.
///
/// `nullable` permits the null marker on the wire; writing a null value
/// through a non-nullable pointer is a type mismatch.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDescriptor {
    pub pointee: TypeRef,
    pub nullable: bool,
}

/// Member (or choice variant) descriptor.
///
/// The presence indicator lives on the value side: a record value holds an
/// entry only for set members, so "unset" stays distinct from "set to the
/// default value".
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Member name (wire key for the text formats).
    pub name: String,
    /// Wire tag id (wire key for the binary format).
    pub id: u32,
    /// Member type.
    pub ty: Arc<TypeDescriptor>,
    /// May be omitted from the wire and left unset.
    pub optional: bool,
    /// Value assumed when the member is absent; also encoded for a
    /// required member left unset.
    pub default: Option<Value>,
}

impl MemberDescriptor {
    /// Create a new member descriptor.
    pub fn new(name: impl Into<String>, id: u32, ty: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            id,
            ty,
            optional: false,
            default: None,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::U32.size(), Some(4));
        assert_eq!(PrimitiveKind::F64.size(), Some(8));
        assert_eq!(PrimitiveKind::Str.size(), None);
        assert_eq!(PrimitiveKind::Bytes.size(), None);
    }

    #[test]
    fn test_record_member_lookup() {
        let u32_type = Arc::new(TypeDescriptor::primitive("uint32", PrimitiveKind::U32));
        let f64_type = Arc::new(TypeDescriptor::primitive("float64", PrimitiveKind::F64));

        let record = RecordDescriptor {
            members: vec![
                MemberDescriptor::new("x", 0, u32_type),
                MemberDescriptor::new("y", 1, f64_type),
            ],
            ordered: true,
        };

        assert!(record.member("x").is_some());
        assert!(record.member("z").is_none());
        assert_eq!(record.member_by_id(1).map(|m| m.name.as_str()), Some("y"));
    }

    #[test]
    fn test_choice_variant_lookup() {
        let int_type = Arc::new(TypeDescriptor::primitive("int", PrimitiveKind::I32));
        let str_type = Arc::new(TypeDescriptor::primitive("string", PrimitiveKind::Str));

        let choice = ChoiceDescriptor {
            variants: vec![
                MemberDescriptor::new("a", 0, int_type),
                MemberDescriptor::new("b", 1, str_type),
            ],
        };

        assert_eq!(choice.variant("b").map(|v| v.id), Some(1));
        assert_eq!(choice.variant_by_id(0).map(|v| v.name.as_str()), Some("a"));
        assert!(choice.variant("c").is_none());
    }

    #[test]
    fn test_kind_name() {
        let desc = TypeDescriptor::primitive("flag", PrimitiveKind::Bool);
        assert_eq!(desc.kind_name(), "bool");

        let list = TypeDescriptor::container(
            "flags",
            ContainerKind::List,
            Arc::new(TypeDescriptor::primitive("flag", PrimitiveKind::Bool)),
        );
        assert_eq!(list.kind_name(), "container");
    }
}
