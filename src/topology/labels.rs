//! Entity label storage for mesh metadata.
//!
//! Labels map an entity index (face or cell of one mesh) → integer tag,
//! grouped by label name. Meshes use them to mark domain-boundary faces,
//! fracture faces and fracture tips.

use std::collections::{BTreeMap, HashMap};

/// Label for faces on the outer boundary of the computational domain.
pub const DOMAIN_BOUNDARY: &str = "domain_boundary";
/// Label for faces that lie on a fracture (split faces of a parent mesh).
pub const FRACTURE: &str = "fracture";
/// Label for faces where a lower-dimensional mesh ends inside the domain.
pub const TIP: &str = "tip";

/// Named integer labels for mesh entities.
#[derive(Clone, Debug, Default)]
pub struct LabelSet {
    labels: HashMap<String, HashMap<usize, i32>>,
}

impl LabelSet {
    /// Creates an empty label set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` for `entity` under label `name`.
    ///
    /// Returns the previous value, if any.
    pub fn set_label(&mut self, entity: usize, name: &str, value: i32) -> Option<i32> {
        self.labels
            .entry(name.to_string())
            .or_default()
            .insert(entity, value)
    }

    /// Removes the label `name` from `entity`, returning its value.
    pub fn clear_label(&mut self, entity: usize, name: &str) -> Option<i32> {
        self.labels.get_mut(name).and_then(|map| map.remove(&entity))
    }

    /// Returns the label value for `entity` under `name`.
    pub fn get_label(&self, entity: usize, name: &str) -> Option<i32> {
        self.labels
            .get(name)
            .and_then(|map| map.get(&entity).copied())
    }

    /// True if `entity` carries `name == value`.
    pub fn has_label(&self, entity: usize, name: &str, value: i32) -> bool {
        self.get_label(entity, name) == Some(value)
    }

    /// Returns all entities with label `name == value` in ascending order.
    pub fn stratum_points(&self, name: &str, value: i32) -> Vec<usize> {
        let mut points: Vec<usize> = self
            .labels
            .get(name)
            .into_iter()
            .flat_map(|map| {
                map.iter()
                    .filter_map(move |(&e, &v)| (v == value).then_some(e))
            })
            .collect();
        points.sort_unstable();
        points
    }

    /// Returns the number of entities with label `name == value`.
    pub fn stratum_size(&self, name: &str, value: i32) -> usize {
        self.labels.get(name).map_or(0, |map| {
            map.values().filter(|&&v| v == value).count()
        })
    }

    /// Builds a value-indexed view of one label.
    pub fn strata_by_value(&self, name: &str) -> BTreeMap<i32, Vec<usize>> {
        let Some(map) = self.labels.get(name) else {
            return BTreeMap::new();
        };
        let mut strata: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (&entity, &value) in map {
            strata.entry(value).or_default().push(entity);
        }
        for entities in strata.values_mut() {
            entities.sort_unstable();
        }
        strata
    }

    /// Rewrites entity indices through `map`; entities mapped to `None` are dropped.
    pub fn renumber(&self, map: impl Fn(usize) -> Option<usize>) -> LabelSet {
        let mut out = LabelSet::new();
        for (name, entries) in &self.labels {
            for (&entity, &value) in entries {
                if let Some(new) = map(entity) {
                    out.set_label(new, name, value);
                }
            }
        }
        out
    }
}
