// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor registry and lazy type references.
//!
//! The registry is built once, frozen, and shared read-only across streams
//! — there is no ambient global table. Processes that want lazy one-time
//! construction wrap it in `std::sync::OnceLock`:
//!
//! ```
//! use hserial::{TypeRegistry, TypeRegistryBuilder};
//! use std::sync::{Arc, OnceLock};
//!
//! static REGISTRY: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
//!
//! fn registry() -> &'static Arc<TypeRegistry> {
//!     REGISTRY.get_or_init(|| Arc::new(TypeRegistryBuilder::new().build()))
//! }
//! # let _ = registry();
//! ```

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Direct or name-lazy link to a pointee descriptor.
///
/// `Named` is resolved against the registry at traversal time, which lets
/// mutually-recursive types exist as finite data: the cycle is broken at
/// the pointer link instead of requiring a cyclic `Arc` graph.
#[derive(Debug, Clone)]
pub enum TypeRef {
    Direct(Arc<TypeDescriptor>),
    Named(String),
}

impl TypeRef {
    /// Resolve to the pointee descriptor.
    pub fn resolve<'a>(&'a self, registry: &'a TypeRegistry) -> Result<&'a Arc<TypeDescriptor>> {
        match self {
            Self::Direct(desc) => Ok(desc),
            Self::Named(name) => registry.lookup(name),
        }
    }

    /// Name of the referenced type, for diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Self::Direct(desc) => &desc.name,
            Self::Named(name) => name,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Direct(a), Self::Direct(b)) => a == b,
            (Self::Named(a), Self::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Arc<TypeDescriptor>> for TypeRef {
    fn from(desc: Arc<TypeDescriptor>) -> Self {
        Self::Direct(desc)
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

/// Immutable name -> descriptor table.
///
/// Frozen at [`TypeRegistryBuilder::build`]; lookups afterwards are
/// lock-free and safe from any number of threads.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistry {
    /// Empty registry (sufficient when no pointer uses a named reference).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a registry.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    /// Look up a descriptor by name.
    pub fn lookup(&self, name: &str) -> Result<&Arc<TypeDescriptor>> {
        self.types.get(name).ok_or_else(|| Error::UnknownType {
            name: name.to_string(),
        })
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Mutable registration phase of a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    types: HashMap<String, Arc<TypeDescriptor>>,
}

impl TypeRegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own name.
    ///
    /// Idempotent for the same descriptor (same `Arc` or structurally
    /// equal); a conflicting re-registration fails with `DuplicateType`.
    pub fn register(&mut self, descriptor: Arc<TypeDescriptor>) -> Result<&mut Self> {
        match self.types.get(&descriptor.name) {
            None => {
                self.types.insert(descriptor.name.clone(), descriptor);
                Ok(self)
            }
            Some(existing) if Arc::ptr_eq(existing, &descriptor) || **existing == *descriptor => {
                Ok(self)
            }
            Some(_) => Err(Error::DuplicateType {
                name: descriptor.name.clone(),
            }),
        }
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> TypeRegistry {
        log::trace!("type registry frozen with {} types", self.types.len());
        TypeRegistry { types: self.types }
    }
}
