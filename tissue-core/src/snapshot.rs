//! Read-only copies of the tissue state for output and rendering.

use glam::DVec2;

use crate::tissue::Tissue;
use crate::types::{CellId, EdgeId, VertexId};

#[derive(Clone, Debug, PartialEq)]
pub struct VertexSnapshot {
    pub id: VertexId,
    pub pos: DVec2,
    pub m: f64,
    pub boundary: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub v1: VertexId,
    pub v2: VertexId,
    pub length: f64,
    pub tension: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellSnapshot {
    pub id: CellId,
    pub vertices: Vec<VertexId>,
    pub edges: Vec<EdgeId>,
    pub centroid: DVec2,
    pub area: f64,
    pub perimeter: f64,
    /// Unit major axis of the cell shape.
    pub director: DVec2,
    /// Largest eigenvalue of the gyration tensor.
    pub lambda: f64,
    pub m: f64,
}

/// Everything live in the tissue at the end of step `step`, in slot order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub step: u64,
    pub vertices: Vec<VertexSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub cells: Vec<CellSnapshot>,
    pub cell_defects: Vec<CellId>,
    pub vertex_defects: Vec<VertexId>,
}

impl Snapshot {
    /// Looks up a vertex position by identity.
    pub fn position(&self, v: VertexId) -> Option<DVec2> {
        self.vertices
            .binary_search_by_key(&v, |x| x.id)
            .ok()
            .map(|i| self.vertices[i].pos)
    }

    /// Polygon of a cell snapshot, in sequence order.
    pub fn polygon(&self, cell: &CellSnapshot) -> Vec<DVec2> {
        cell.vertices.iter().filter_map(|&v| self.position(v)).collect()
    }

    pub fn total_area(&self) -> f64 {
        self.cells.iter().map(|c| c.area).sum()
    }
}

impl Tissue {
    /// Copies out the current state. Does not modify the tissue.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step,
            vertices: self
                .vertices
                .iter()
                .map(|(id, v)| VertexSnapshot {
                    id,
                    pos: v.pos,
                    m: v.m,
                    boundary: v.boundary,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|(id, e)| EdgeSnapshot {
                    id,
                    v1: e.v1,
                    v2: e.v2,
                    length: e.length,
                    tension: e.tension,
                })
                .collect(),
            cells: self
                .cells
                .iter()
                .map(|(id, c)| CellSnapshot {
                    id,
                    vertices: c.vertices.clone(),
                    edges: c.edges.clone(),
                    centroid: c.centroid,
                    area: c.area,
                    perimeter: c.perimeter,
                    director: c.director,
                    lambda: c.lambda,
                    m: c.m,
                })
                .collect(),
            cell_defects: self.cell_defects.clone(),
            vertex_defects: self.vertex_defects.clone(),
        }
    }
}
