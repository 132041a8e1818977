//! Typed per-node and per-edge property storage.
//!
//! Values are stored type-erased and retrieved through a [`PropertyKey<T>`]
//! that carries the value type, so a lookup either returns a `&T` or fails
//! with `MissingProperty` / `PropertyTypeMismatch`. There are no defaults:
//! a key that was never set is an error, not a zero.
//!
//! ```rust
//! # fn try_main() -> Result<(), mesh_bucket::mesh_error::MeshError> {
//! use mesh_bucket::data::properties::{PropertyKey, PropertyStore};
//! use mesh_bucket::mesh_generation::point_grid;
//!
//! const SOURCE: PropertyKey<Vec<f64>> = PropertyKey::new("source");
//! let mesh = point_grid([0.0; 3])?;
//! let mut store = PropertyStore::new();
//! store.set_node_property(mesh.id(), SOURCE, vec![2.0]);
//! assert_eq!(store.get_node_property(mesh.id(), SOURCE)?, &vec![2.0]);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use std::any::{Any, type_name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

use crate::mesh_error::MeshError;
use crate::mesh_graph::MeshGraph;
use crate::topology::handle::{EdgeId, GridKey, MeshId};

type Entries = BTreeMap<&'static str, Box<dyn Any + Send + Sync>>;

/// Name of a property together with the type of its value.
pub struct PropertyKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PropertyKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for PropertyKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyKey<{}>({:?})", type_name::<T>(), self.name)
    }
}

/// Property values keyed by graph entity and property name.
#[derive(Default)]
pub struct PropertyStore {
    entries: HashMap<GridKey, Entries>,
}

impl fmt::Debug for PropertyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (owner, entries) in &self.entries {
            map.entry(owner, &entries.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key` for mesh `node`, replacing any previous value.
    pub fn set_node_property<T: Any + Send + Sync>(
        &mut self,
        node: MeshId,
        key: PropertyKey<T>,
        value: T,
    ) {
        self.set(GridKey::Node(node), key, value);
    }

    /// Store `value` under `key` for `edge`, replacing any previous value.
    pub fn set_edge_property<T: Any + Send + Sync>(
        &mut self,
        edge: EdgeId,
        key: PropertyKey<T>,
        value: T,
    ) {
        self.set(GridKey::Edge(edge), key, value);
    }

    pub fn get_node_property<T: Any>(&self, node: MeshId, key: PropertyKey<T>) -> Result<&T, MeshError> {
        self.node(node).get(key)
    }

    pub fn get_edge_property<T: Any>(&self, edge: EdgeId, key: PropertyKey<T>) -> Result<&T, MeshError> {
        self.edge(edge).get(key)
    }

    pub fn has_node_property<T>(&self, node: MeshId, key: PropertyKey<T>) -> bool {
        self.node(node).has(key)
    }

    pub fn has_edge_property<T>(&self, edge: EdgeId, key: PropertyKey<T>) -> bool {
        self.edge(edge).has(key)
    }

    /// Remove a node property; returns whether it was present.
    pub fn remove_node_property<T>(&mut self, node: MeshId, key: PropertyKey<T>) -> bool {
        self.remove(GridKey::Node(node), key.name)
    }

    /// Remove an edge property; returns whether it was present.
    pub fn remove_edge_property<T>(&mut self, edge: EdgeId, key: PropertyKey<T>) -> bool {
        self.remove(GridKey::Edge(edge), key.name)
    }

    /// Read-only view of the properties of one mesh.
    pub fn node(&self, node: MeshId) -> PropertyView<'_> {
        self.view(GridKey::Node(node))
    }

    /// Read-only view of the properties of one edge.
    pub fn edge(&self, edge: EdgeId) -> PropertyView<'_> {
        self.view(GridKey::Edge(edge))
    }

    pub fn view(&self, owner: GridKey) -> PropertyView<'_> {
        PropertyView {
            owner,
            entries: self.entries.get(&owner),
        }
    }

    /// Property names set for `owner`, sorted.
    pub fn keys_of(&self, owner: impl Into<GridKey>) -> Vec<&'static str> {
        self.entries
            .get(&owner.into())
            .map(|e| e.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Check that every entity with properties exists in `graph`.
    ///
    /// # Errors
    /// `UnknownNode` / `UnknownEdge` for the first stray owner (in key order).
    pub fn validate_against(&self, graph: &MeshGraph) -> Result<(), MeshError> {
        let mut owners: Vec<GridKey> = self.entries.keys().copied().collect();
        owners.sort_unstable();
        for owner in owners {
            match owner {
                GridKey::Node(id) => {
                    graph.mesh(id)?;
                }
                GridKey::Edge(id) => {
                    graph.interface(id)?;
                }
            }
        }
        Ok(())
    }

    fn set<T: Any + Send + Sync>(&mut self, owner: GridKey, key: PropertyKey<T>, value: T) {
        self.entries
            .entry(owner)
            .or_default()
            .insert(key.name, Box::new(value));
    }

    fn remove(&mut self, owner: GridKey, name: &'static str) -> bool {
        let Some(entries) = self.entries.get_mut(&owner) else {
            return false;
        };
        let removed = entries.remove(name).is_some();
        if entries.is_empty() {
            self.entries.remove(&owner);
        }
        removed
    }
}

/// Properties of one graph entity.
#[derive(Clone, Copy)]
pub struct PropertyView<'a> {
    owner: GridKey,
    entries: Option<&'a Entries>,
}

impl<'a> PropertyView<'a> {
    /// A view with no properties at all.
    pub fn empty(owner: GridKey) -> Self {
        Self {
            owner,
            entries: None,
        }
    }

    #[inline]
    pub fn owner(&self) -> GridKey {
        self.owner
    }

    /// Value of a required property.
    ///
    /// # Errors
    /// `MissingProperty` if unset, `PropertyTypeMismatch` if stored with
    /// another type.
    pub fn get<T: Any>(&self, key: PropertyKey<T>) -> Result<&'a T, MeshError> {
        self.get_optional(key)?.ok_or(MeshError::MissingProperty {
            owner: self.owner,
            key: key.name,
        })
    }

    /// Value of an optional property; a type mismatch is still an error.
    pub fn get_optional<T: Any>(&self, key: PropertyKey<T>) -> Result<Option<&'a T>, MeshError> {
        let Some(value) = self.entries.and_then(|e| e.get(key.name)) else {
            return Ok(None);
        };
        value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or(MeshError::PropertyTypeMismatch {
                owner: self.owner,
                key: key.name,
                expected: type_name::<T>(),
            })
    }

    pub fn has<T>(&self, key: PropertyKey<T>) -> bool {
        self.entries.is_some_and(|e| e.contains_key(key.name))
    }
}

impl fmt::Debug for PropertyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyView")
            .field("owner", &self.owner)
            .field("keys", &self.entries.map(|e| e.keys().collect::<Vec<_>>()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APERTURE: PropertyKey<Vec<f64>> = PropertyKey::new("aperture");
    const APERTURE_SCALAR: PropertyKey<f64> = PropertyKey::new("aperture");

    #[test]
    fn missing_and_mistyped_keys_are_errors() {
        let node = MeshId::new(11).unwrap();
        let mut store = PropertyStore::new();
        assert_eq!(
            store.get_node_property(node, APERTURE),
            Err(MeshError::MissingProperty {
                owner: GridKey::Node(node),
                key: "aperture",
            })
        );
        store.set_node_property(node, APERTURE, vec![0.1]);
        assert!(matches!(
            store.get_node_property(node, APERTURE_SCALAR),
            Err(MeshError::PropertyTypeMismatch { key: "aperture", .. })
        ));
        assert_eq!(store.keys_of(node), vec!["aperture"]);
        assert!(store.remove_node_property(node, APERTURE));
        assert!(!store.has_node_property(node, APERTURE));
        assert!(store.keys_of(node).is_empty());
    }

    #[test]
    fn node_and_edge_namespaces_are_separate() {
        let node = MeshId::new(1).unwrap();
        let edge = EdgeId::from_index(0);
        let mut store = PropertyStore::new();
        store.set_edge_property(edge, APERTURE, vec![1.0]);
        assert!(store.has_edge_property(edge, APERTURE));
        assert!(!store.has_node_property(node, APERTURE));
        assert_eq!(store.edge(edge).get_optional(APERTURE).unwrap(), Some(&vec![1.0]));
    }
}
