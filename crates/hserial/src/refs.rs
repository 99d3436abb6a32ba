// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Session-scoped reference tables for shared/cyclic object graphs.
//!
//! Indices are assigned in first-seen order during one encode or decode
//! session and are never reassigned. Identity is the pointee cell's `Arc`
//! allocation, which the caller keeps alive for the whole call — valid
//! within a session, meaningless across sessions or processes.

use crate::error::{Error, Result};
use crate::value::SharedValue;
use std::collections::{HashMap, HashSet};

/// Write-side table: identity -> wire index.
#[derive(Debug, Default)]
pub struct WriteRefs {
    indices: HashMap<usize, u32>,
    /// Objects whose pointee is still being written. Needed to refuse
    /// cycles when a reference-free format falls back to duplication.
    open: HashSet<usize>,
}

impl WriteRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index previously assigned to this identity, if any.
    pub fn lookup(&self, cell: &SharedValue) -> Option<u32> {
        self.indices.get(&cell.identity()).copied()
    }

    /// Assign the next first-seen index to this identity.
    pub fn assign(&mut self, cell: &SharedValue) -> u32 {
        let index = self.indices.len() as u32;
        let prev = self.indices.insert(cell.identity(), index);
        debug_assert!(prev.is_none(), "identity assigned twice in one session");
        self.open.insert(cell.identity());
        index
    }

    /// Mark an object's pointee as fully written.
    pub fn close(&mut self, cell: &SharedValue) {
        self.open.remove(&cell.identity());
    }

    /// Whether this identity's pointee is still being written.
    pub fn is_open(&self, cell: &SharedValue) -> bool {
        self.open.contains(&cell.identity())
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Read-side table: wire index -> materialized cell.
#[derive(Debug, Default)]
pub struct ReadRefs {
    cells: Vec<SharedValue>,
}

impl ReadRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next first-seen cell, returning its index.
    ///
    /// The cell may still hold its placeholder; registering before the
    /// pointee is materialized is what lets back-references inside the
    /// pointee (cycles) resolve.
    pub fn register(&mut self, cell: SharedValue) -> u32 {
        let index = self.cells.len() as u32;
        self.cells.push(cell);
        index
    }

    /// Resolve a back-reference. Forward references are a format error,
    /// surfaced as `DanglingReference`.
    pub fn resolve(&self, index: u32) -> Result<SharedValue> {
        self.cells
            .get(index as usize)
            .cloned()
            .ok_or(Error::DanglingReference { index })
    }

    /// Next index the session will assign.
    pub fn next_index(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_write_refs_first_seen_order() {
        let a = SharedValue::new(Value::I32(1));
        let b = SharedValue::new(Value::I32(2));

        let mut refs = WriteRefs::new();
        assert_eq!(refs.lookup(&a), None);
        assert_eq!(refs.assign(&a), 0);
        assert_eq!(refs.assign(&b), 1);
        assert_eq!(refs.lookup(&a), Some(0));

        // A clone shares identity with the original cell.
        let a2 = a.clone();
        assert_eq!(refs.lookup(&a2), Some(0));
    }

    #[test]
    fn test_write_refs_open_tracking() {
        let a = SharedValue::new(Value::Null);
        let mut refs = WriteRefs::new();
        refs.assign(&a);
        assert!(refs.is_open(&a));
        refs.close(&a);
        assert!(!refs.is_open(&a));
    }

    #[test]
    fn test_read_refs_resolve() {
        let mut refs = ReadRefs::new();
        let cell = SharedValue::new(Value::Null);
        assert_eq!(refs.register(cell.clone()), 0);

        let resolved = refs.resolve(0).unwrap();
        assert!(SharedValue::ptr_eq(&resolved, &cell));
    }

    #[test]
    fn test_read_refs_dangling() {
        let refs = ReadRefs::new();
        assert!(matches!(
            refs.resolve(3),
            Err(Error::DanglingReference { index: 3 })
        ));
    }
}
