//! DofMap: mapping graph entities to contiguous ranges of the global system.
//!
//! The `DofMap` gives every node and edge of a mesh graph a slice
//! `(offset, len)` of the global unknown vector. Slices are packed in
//! insertion order, so the DOF numbering is fully determined by the order in
//! which entries are inserted (the assembly inserts nodes in frozen order,
//! then edges in edge order).

use std::collections::HashMap;
use std::ops::Range;

use nalgebra::DVector;

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::handle::GridKey;

/// `DofMap` maintains:
/// - a lookup `map` from each `GridKey` to its `(offset, len)`,
/// - an `order` vector preserving insertion order,
/// - and `total_len`, the next free offset.
///
/// # Invariants
///
/// - Each key appears exactly once in `order`.
/// - `map` contains precisely the keys listed in `order`.
/// - Offsets are contiguous in insertion order and `total_len` equals the sum
///   of all lengths, so the ranges are pairwise disjoint and cover
///   `[0, total_len)`.
///
/// Zero-length entries are allowed: an algebraic coupling owns no unknowns
/// but still gets an (empty) range.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DofMap {
    map: HashMap<GridKey, (usize, usize)>,
    order: Vec<GridKey>,
    total_len: usize,
}

impl DofMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` with `len` unknowns and return its offset.
    ///
    /// # Errors
    /// `DuplicateDofEntry(key)` if `key` is already present.
    ///
    /// # Example
    /// ```rust
    /// # fn try_main() -> Result<(), mesh_bucket::mesh_error::MeshError> {
    /// use mesh_bucket::data::atlas::DofMap;
    /// use mesh_bucket::topology::handle::{GridKey, MeshId};
    /// let mut dofs = DofMap::new();
    /// let key = GridKey::Node(MeshId::new(7)?);
    /// assert_eq!(dofs.try_insert(key, 3)?, 0);
    /// assert_eq!(dofs.total_len(), 3);
    /// # Ok(())
    /// # }
    /// # try_main().unwrap();
    /// ```
    pub fn try_insert(&mut self, key: impl Into<GridKey>, len: usize) -> Result<usize, MeshError> {
        let key = key.into();
        if self.map.contains_key(&key) {
            return Err(MeshError::DuplicateDofEntry(key));
        }
        let offset = self.total_len;
        self.map.insert(key, (offset, len));
        self.order.push(key);
        self.total_len += len;
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        self.debug_assert_invariants();
        Ok(offset)
    }

    /// Slice descriptor `(offset, len)` of `key`.
    #[inline]
    pub fn get(&self, key: impl Into<GridKey>) -> Option<(usize, usize)> {
        self.map.get(&key.into()).copied()
    }

    /// Index range of `key` in the global vector.
    pub fn range(&self, key: impl Into<GridKey>) -> Result<Range<usize>, MeshError> {
        let key = key.into();
        self.map
            .get(&key)
            .map(|&(off, len)| off..off + len)
            .ok_or_else(|| missing(key))
    }

    #[inline]
    pub fn contains(&self, key: impl Into<GridKey>) -> bool {
        self.map.contains_key(&key.into())
    }

    /// Number of entries (not unknowns; see [`total_len`](Self::total_len)).
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of unknowns.
    #[inline]
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = GridKey> + '_ {
        self.order.iter().copied()
    }

    /// `(key, (offset, len))` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (GridKey, (usize, usize))> + '_ {
        self.order.iter().map(move |&k| (k, self.map[&k]))
    }

    /// Copy the sub-vector of `key` out of the global vector `x`.
    ///
    /// # Errors
    /// `VectorLengthMismatch` unless `x.len() == total_len`, or
    /// `DofMapInvariant` if `key` is not mapped.
    pub fn restrict(&self, key: impl Into<GridKey>, x: &DVector<f64>) -> Result<DVector<f64>, MeshError> {
        let key = key.into();
        if x.len() != self.total_len {
            return Err(MeshError::VectorLengthMismatch {
                owner: key,
                expected: self.total_len,
                found: x.len(),
            });
        }
        let range = self.range(key)?;
        Ok(DVector::from_column_slice(&x.as_slice()[range]))
    }
}

fn missing(key: GridKey) -> MeshError {
    MeshError::DofMapInvariant(format!("{key} has no DOF range"))
}

impl DebugInvariants for DofMap {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "DofMap invalid");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        if self.order.len() != self.map.len() {
            return Err(MeshError::DofMapInvariant(format!(
                "{} ordered keys for {} mapped keys",
                self.order.len(),
                self.map.len()
            )));
        }
        let mut expected_off = 0usize;
        for &key in &self.order {
            let &(off, len) = self.map.get(&key).ok_or_else(|| missing(key))?;
            if off != expected_off {
                return Err(MeshError::DofMapInvariant(format!(
                    "{key} starts at {off}, expected {expected_off}"
                )));
            }
            expected_off = off.checked_add(len).ok_or_else(|| {
                MeshError::DofMapInvariant(format!("{key} range overflows"))
            })?;
        }
        if expected_off != self.total_len {
            return Err(MeshError::DofMapInvariant(format!(
                "ranges cover {expected_off} unknowns, total is {}",
                self.total_len
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
impl DofMap {
    /// Test helper to force the offset of a key without adjusting others.
    pub fn force_offset(&mut self, key: GridKey, new_off: usize) {
        if let Some((_, len)) = self.map.get(&key).copied() {
            self.map.insert(key, (new_off, len));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::handle::{EdgeId, MeshId};

    fn node(raw: u64) -> GridKey {
        GridKey::Node(MeshId::new(raw).unwrap())
    }

    #[test]
    fn insert_and_lookup() {
        let mut d = DofMap::new();
        assert_eq!(d.try_insert(node(1), 3).unwrap(), 0);
        assert_eq!(d.try_insert(node(2), 5).unwrap(), 3);
        assert_eq!(d.try_insert(EdgeId::from_index(0), 0).unwrap(), 8);
        assert_eq!(d.get(node(2)), Some((3, 5)));
        assert_eq!(d.range(EdgeId::from_index(0)).unwrap(), 8..8);
        assert_eq!(d.total_len(), 8);
        assert_eq!(d.len(), 3);
        assert_eq!(d.keys().next(), Some(node(1)));
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut d = DofMap::new();
        d.try_insert(node(4), 1).unwrap();
        assert_eq!(
            d.try_insert(node(4), 2),
            Err(MeshError::DuplicateDofEntry(node(4)))
        );
    }

    #[test]
    fn validate_detects_gaps() {
        let mut d = DofMap::new();
        d.try_insert(node(1), 2).unwrap();
        d.try_insert(node(2), 2).unwrap();
        d.force_offset(node(2), 3);
        assert!(matches!(
            d.validate_invariants(),
            Err(MeshError::DofMapInvariant(_))
        ));
    }

    #[test]
    fn restrict_checks_length() {
        let mut d = DofMap::new();
        d.try_insert(node(1), 2).unwrap();
        d.try_insert(node(2), 1).unwrap();
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(d.restrict(node(2), &x).unwrap().as_slice(), &[3.0]);
        let short = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            d.restrict(node(1), &short),
            Err(MeshError::VectorLengthMismatch { .. })
        ));
    }
}
