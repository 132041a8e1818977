//! Mesh ingestion from externally parsed cell blocks.
//!
//! A mesh-file reader hands over a [`MeshInput`]: one shared vertex array and
//! one [`CellBlock`] per topological dimension, each cell tagged with a
//! physical region. [`meshes_by_region`] turns every (dimension, region)
//! pair into its own simplex [`Mesh`] that remembers the shared vertex
//! numbering, and [`graph_from_input`] links dimension-adjacent meshes that
//! share faces into a [`MeshGraph`].

use std::collections::BTreeMap;

use crate::mesh_error::MeshError;
use crate::mesh_generation::simplex::simplex_mesh;
use crate::mesh_graph::MeshGraph;
use crate::topology::mesh::Mesh;
use crate::topology::mortar::{Interface, shared_vertex_matches};

/// Simplex cells of one dimension with a region tag per cell.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CellBlock {
    pub dim: usize,
    /// Vertex indices per cell (`dim + 1` each) into [`MeshInput::points`].
    pub cells: Vec<Vec<usize>>,
    /// Physical region per cell.
    pub regions: Vec<i32>,
}

/// Parsed mesh: shared vertices and per-dimension cell blocks.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshInput {
    pub points: Vec<[f64; 3]>,
    pub blocks: Vec<CellBlock>,
}

/// One mesh per (dimension, region), ordered by descending dimension, then region.
pub fn meshes_by_region(input: &MeshInput) -> Result<Vec<(usize, i32, Mesh)>, MeshError> {
    let mut groups: BTreeMap<(std::cmp::Reverse<usize>, i32), Vec<&[usize]>> = BTreeMap::new();
    for (b, block) in input.blocks.iter().enumerate() {
        if block.regions.len() != block.cells.len() {
            return Err(MeshError::InvalidGeometry(format!(
                "cell block {b} has {} cells but {} region tags",
                block.cells.len(),
                block.regions.len()
            )));
        }
        for (cell, &region) in block.cells.iter().zip(&block.regions) {
            groups
                .entry((std::cmp::Reverse(block.dim), region))
                .or_default()
                .push(cell);
        }
    }

    let mut out = Vec::with_capacity(groups.len());
    for ((std::cmp::Reverse(dim), region), cells) in groups {
        let mut globals: Vec<usize> = cells.iter().flat_map(|c| c.iter().copied()).collect();
        globals.sort_unstable();
        globals.dedup();
        if let Some(&v) = globals.last().filter(|&&v| v >= input.points.len()) {
            return Err(MeshError::InvalidGeometry(format!(
                "region {region} references vertex {v}, input has {} vertices",
                input.points.len()
            )));
        }
        let local_of = |g: usize| globals.binary_search(&g).unwrap_or_default();
        let nodes = globals.iter().map(|&g| input.points[g]).collect();
        let local_cells: Vec<Vec<usize>> = cells
            .iter()
            .map(|c| c.iter().map(|&g| local_of(g)).collect())
            .collect();
        let mut mesh = simplex_mesh(dim, nodes, &local_cells)?;
        if dim == 0 {
            // point meshes carry one vertex per cell
            mesh.set_global_point_ind(cells.iter().map(|c| c[0]).collect())?;
        } else {
            mesh.set_global_point_ind(globals)?;
        }
        log::trace!(
            "region {region}: {}-d mesh {} with {} cells",
            dim,
            mesh.id(),
            mesh.num_cells()
        );
        out.push((dim, region, mesh));
    }
    Ok(out)
}

/// Build a mesh graph from `input`: every region mesh becomes a node and
/// every pair of meshes one dimension apart that shares at least one face
/// becomes an edge.
pub fn graph_from_input(input: &MeshInput) -> Result<MeshGraph, MeshError> {
    let meshes = meshes_by_region(input)?;
    let mut interfaces = Vec::new();
    for (p, (pdim, _, parent)) in meshes.iter().enumerate() {
        for (c, (cdim, _, child)) in meshes.iter().enumerate() {
            if *pdim != *cdim + 1 {
                continue;
            }
            let pairs = shared_vertex_matches(parent, child);
            if pairs.is_empty() {
                continue;
            }
            interfaces.push((p, c, Interface::from_face_cells(parent, child, &pairs)?));
        }
    }

    let mut graph = MeshGraph::new();
    let mut ids = Vec::with_capacity(meshes.len());
    for (_, _, mesh) in meshes {
        ids.push(graph.add_node(mesh)?);
    }
    for (p, c, interface) in interfaces {
        graph.add_edge(ids[p], ids[c], interface)?;
    }
    log::debug!(
        "ingested {} meshes and {} interfaces",
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(graph)
}
