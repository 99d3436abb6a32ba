// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic value model walked by the generic dispatcher.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A dynamic value covering every structural shape.
///
/// Records hold entries only for set members — absence of a key is the
/// "unset" presence state, distinct from a member set to its default.
/// `Null` doubles as the unselected state of a choice value and the
/// placeholder inside a [`SharedValue`] cell under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),

    /// Record value: member name -> value, set members only.
    Record(HashMap<String, Value>),
    /// Choice value: (selected variant name, variant value).
    Choice(String, Box<Value>),
    /// Container value (list, set and map flavors all use element order).
    List(Vec<Value>),
    /// Pointer value: None is the null pointer, Some shares the pointee.
    Pointer(Option<SharedValue>),

    Null,
}

impl Value {
    /// Empty record with no set members.
    pub fn empty_record() -> Self {
        Self::Record(HashMap::new())
    }

    /// Lowercase shape name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Record(_) => "record",
            Self::Choice(..) => "choice",
            Self::List(_) => "container",
            Self::Pointer(_) => "pointer",
            Self::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Widening view of any signed integer variant.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Widening view of any unsigned integer variant.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    /// Record member by name (None when unset or not a record).
    pub fn member(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(members) => members.get(name),
            _ => None,
        }
    }

    /// Set a record member. Returns false when self is not a record.
    pub fn set_member(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Record(members) => {
                members.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Selected variant name of a choice value.
    pub fn variant(&self) -> Option<&str> {
        match self {
            Self::Choice(name, _) => Some(name),
            _ => None,
        }
    }

    /// Value of the selected choice variant.
    pub fn variant_value(&self) -> Option<&Value> {
        match self {
            Self::Choice(_, value) => Some(value),
            _ => None,
        }
    }
}

/// Shared pointee cell — the identity a `Pointer` value holds.
///
/// Identity is the `Arc` allocation, stable for the duration of one
/// encode/decode session (the caller keeps the graph alive for the whole
/// call). Cloning shares the cell; two clones are the *same* object to the
/// reference table. The lock exists so decode can register the cell before
/// its pointee is fully materialized, which is what makes cyclic graphs
/// representable.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    /// New cell owning `value`.
    pub fn new(value: Value) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Identity test: same cell, not merely equal contents.
    pub fn ptr_eq(a: &SharedValue, b: &SharedValue) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Session-scoped identity key.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Clone the current contents out of the cell.
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    /// Replace the cell contents.
    pub fn set(&self, value: Value) {
        *self.0.write() = value;
    }

    /// Run `f` against the current contents without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.0.read())
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(guard) => f.debug_tuple("SharedValue").field(&*guard).finish(),
            None => f.write_str("SharedValue(<borrowed>)"),
        }
    }
}

impl PartialEq for SharedValue {
    fn eq(&self, other: &Self) -> bool {
        SharedValue::ptr_eq(self, other) || *self.0.read() == *other.0.read()
    }
}

/// Conversion out of a [`Value`], for typed instance accessors.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

/// Conversion into a [`Value`], for typed instance accessors.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

macro_rules! impl_value_conversions {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*
    };
}

impl_value_conversions! {
    Bool => bool,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
    Str => String,
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

// Vec<u8> would collide with the generic container conversions below, so
// byte blocks get their own wrapper-free entry points on Value instead.
impl Value {
    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(v.into())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_accessors() {
        let v = Value::U32(42);
        assert_eq!(v.as_u64(), Some(42));
        assert_eq!(v.as_i64(), None);

        let v = Value::Str("hello".into());
        assert_eq!(v.as_str(), Some("hello"));
        assert_eq!(v.kind_name(), "string");
    }

    #[test]
    fn test_record_members() {
        let mut v = Value::empty_record();
        assert!(v.set_member("x", Value::I32(10)));
        assert!(v.set_member("y", Value::I32(20)));

        assert_eq!(v.member("x").and_then(Value::as_i64), Some(10));
        assert!(v.member("z").is_none());
        assert!(!Value::Bool(true).set_member("x", Value::Null));
    }

    #[test]
    fn test_choice_accessors() {
        let v = Value::Choice("b".into(), Box::new(Value::Str("hi".into())));
        assert_eq!(v.variant(), Some("b"));
        assert_eq!(v.variant_value().and_then(Value::as_str), Some("hi"));
    }

    #[test]
    fn test_shared_value_identity() {
        let a = SharedValue::new(Value::I32(7));
        let b = a.clone();
        let c = SharedValue::new(Value::I32(7));

        assert!(SharedValue::ptr_eq(&a, &b));
        assert!(!SharedValue::ptr_eq(&a, &c));
        // Distinct cells with equal contents still compare equal as values.
        assert_eq!(a, c);

        b.set(Value::I32(8));
        assert_eq!(a.get(), Value::I32(8));
    }

    #[test]
    fn test_conversion_traits() {
        let v = 42u32.into_value();
        assert_eq!(u32::from_value(&v), Some(42));
        assert_eq!(i32::from_value(&v), None);

        let list = vec![1i64, 2, 3].into_value();
        assert_eq!(Vec::<i64>::from_value(&list), Some(vec![1, 2, 3]));
    }
}
