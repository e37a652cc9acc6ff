use glam::DVec2;

use crate::error::{Result, invalid_edit};
use crate::types::{CellId, VertexId};

/// Undirected junction between two vertices.
///
/// Borders one cell on the tissue boundary and two in the interior. An edge
/// whose junction set empties is destroyed by the tissue.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) v1: VertexId,
    pub(crate) v2: VertexId,
    pub(crate) length: f64,
    pub(crate) tension: f64,
    pub(crate) cells: Vec<CellId>,
}

impl Edge {
    pub fn new(v1: VertexId, v2: VertexId) -> Self {
        Self {
            v1,
            v2,
            length: 0.0,
            tension: 0.0,
            cells: Vec::with_capacity(2),
        }
    }

    #[inline]
    pub fn endpoints(&self) -> (VertexId, VertexId) {
        (self.v1, self.v2)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn tension(&self) -> f64 {
        self.tension
    }

    #[inline]
    pub fn cell_junctions(&self) -> &[CellId] {
        &self.cells
    }

    #[inline]
    pub fn has_vertex(&self, v: VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// Whether this edge joins `a` and `b`, in either order.
    #[inline]
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.v1 == a && self.v2 == b) || (self.v1 == b && self.v2 == a)
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    pub fn other(&self, v: VertexId) -> Option<VertexId> {
        if v == self.v1 {
            Some(self.v2)
        } else if v == self.v2 {
            Some(self.v1)
        } else {
            None
        }
    }

    /// The bordering cell other than `c`, if any.
    pub fn other_cell(&self, c: CellId) -> Option<CellId> {
        self.cells.iter().copied().find(|&x| x != c)
    }

    /// Replaces endpoint `old` by `new`.
    ///
    /// ### Returns
    /// `Err(InvalidTopologyEdit)` if `old` is not an endpoint or if the swap
    /// would make both endpoints equal.
    pub(crate) fn swap_vertex(&mut self, old: VertexId, new: VertexId) -> Result<()> {
        let (slot, other) = if self.v1 == old {
            (&mut self.v1, self.v2)
        } else if self.v2 == old {
            (&mut self.v2, self.v1)
        } else {
            return Err(invalid_edit(format!(
                "{old} is not an endpoint of edge ({}, {})",
                self.v1, self.v2
            )));
        };
        if other == new {
            return Err(invalid_edit(format!("swapping {old} -> {new} collapses the edge")));
        }
        *slot = new;
        Ok(())
    }

    pub(crate) fn add_cell_junction(&mut self, c: CellId) {
        if !self.cells.contains(&c) {
            self.cells.push(c);
        }
    }

    /// Removes `c` from the junction set.
    ///
    /// ### Returns
    /// `true` if the junction set is now empty.
    pub(crate) fn remove_cell_junction(&mut self, c: CellId) -> bool {
        self.cells.retain(|&x| x != c);
        self.cells.is_empty()
    }

    pub(crate) fn calc_length(&mut self, p1: DVec2, p2: DVec2) {
        self.length = p1.distance(p2);
    }

    /// Sets the tension to `base + k_line * perimeter_sum`.
    ///
    /// ### Parameters
    /// - `base` - Baseline line tension.
    /// - `k_line` - Perimeter coefficient.
    /// - `perimeter_sum` - Sum of the perimeters of the bordering cells.
    pub(crate) fn calc_tension(&mut self, base: f64, k_line: f64, perimeter_sum: f64) {
        self.tension = base + k_line * perimeter_sum;
    }
}
