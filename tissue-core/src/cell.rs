//! Cells: ordered polygons over shared vertices and edges.
//!
//! A cell stores two parallel cyclic sequences. Edge `i` joins vertex `i` and
//! vertex `i + 1 (mod n)`. Every structural edit in this module keeps the two
//! sequences length-matched and aligned; back-references on the vertices and
//! edges are the tissue's job.

use glam::DVec2;

use crate::error::{Result, degenerate, invalid_edit};
use crate::geometry::{self, SymTensor2};
use crate::types::{CellId, EdgeId, VertexId};

#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) vertices: Vec<VertexId>,
    pub(crate) edges: Vec<EdgeId>,

    pub(crate) centroid: DVec2,
    pub(crate) area: f64,
    pub(crate) signed_area: f64,
    pub(crate) perimeter: f64,
    /// `k_A (A - A_0)`, the pressure-like term of the area force.
    pub(crate) area_tension: f64,
    pub(crate) gyration: SymTensor2,
    pub(crate) lambda: f64,
    pub(crate) director: DVec2,
    /// Topological charge of the director field around this cell.
    pub(crate) m: f64,
    /// The last area computation failed. Such cells are extruded regardless
    /// of `min_area`.
    pub(crate) degenerate: bool,

    /// Cells across each edge, in edge-sequence order. Boundary edges
    /// contribute nothing.
    pub(crate) neighbours: Vec<CellId>,
}

impl Cell {
    pub fn new(vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Self {
        Self {
            vertices,
            edges,
            centroid: DVec2::ZERO,
            area: 0.0,
            signed_area: 0.0,
            perimeter: 0.0,
            area_tension: 0.0,
            gyration: SymTensor2::default(),
            lambda: 0.0,
            director: DVec2::X,
            m: 0.0,
            degenerate: false,
            neighbours: Vec::new(),
        }
    }

    /// Whether the last area computation failed.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn centroid(&self) -> DVec2 {
        self.centroid
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.area
    }

    #[inline]
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    #[inline]
    pub fn perimeter(&self) -> f64 {
        self.perimeter
    }

    #[inline]
    pub fn area_tension(&self) -> f64 {
        self.area_tension
    }

    #[inline]
    pub fn gyration(&self) -> SymTensor2 {
        self.gyration
    }

    /// Largest eigenvalue of the gyration tensor.
    #[inline]
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Unit major axis of the gyration tensor.
    #[inline]
    pub fn director(&self) -> DVec2 {
        self.director
    }

    #[inline]
    pub fn m(&self) -> f64 {
        self.m
    }

    #[inline]
    pub fn neighbours(&self) -> &[CellId] {
        &self.neighbours
    }

    pub fn vertex_index(&self, v: VertexId) -> Option<usize> {
        self.vertices.iter().position(|&x| x == v)
    }

    pub fn edge_index(&self, e: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&x| x == e)
    }

    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains(&e)
    }

    // ---------------------------------------------------------------------
    // Derived geometry. `points` are the positions of `self.vertices`.
    // ---------------------------------------------------------------------

    pub(crate) fn calc_centroid(&mut self, points: &[DVec2]) {
        self.centroid = geometry::centroid(points);
    }

    /// Shoelace area.
    ///
    /// ### Returns
    /// `Err(DegenerateGeometry)` if the signed area is not finite and
    /// positive, which covers collapsed and inverted cells. The stored area
    /// is then zero and the cell is flagged for the next extrusion pass.
    pub(crate) fn calc_area(&mut self, points: &[DVec2]) -> Result<f64> {
        let signed = geometry::signed_area(points);
        if !signed.is_finite() || signed <= f64::EPSILON {
            self.signed_area = 0.0;
            self.area = 0.0;
            self.degenerate = true;
            return Err(degenerate(format!("cell area {signed}")));
        }
        self.signed_area = signed;
        self.area = signed;
        self.degenerate = false;
        Ok(self.area)
    }

    pub(crate) fn calc_perimeter(&mut self, points: &[DVec2]) {
        self.perimeter = geometry::perimeter(points);
    }

    /// Requires an up-to-date centroid.
    pub(crate) fn calc_gyration_tensor(&mut self, points: &[DVec2]) {
        self.gyration = SymTensor2::gyration(points, self.centroid);
    }

    /// Requires an up-to-date gyration tensor.
    pub(crate) fn calc_dominant_eigen(&mut self) {
        let (lambda, director) = self.gyration.dominant_eigen();
        self.lambda = lambda;
        self.director = director;
    }

    pub(crate) fn calc_area_tension(&mut self, k_area: f64, target_area: f64) {
        self.area_tension = k_area * (self.area - target_area);
    }

    // ---------------------------------------------------------------------
    // Ordered-sequence edits.
    // ---------------------------------------------------------------------

    pub(crate) fn add_vertex(&mut self, v: VertexId, index: usize) {
        self.vertices.insert(index, v);
    }

    pub(crate) fn add_edge(&mut self, e: EdgeId, index: usize) {
        self.edges.insert(index, e);
    }

    /// Removes `v` from the vertex sequence and returns its former index.
    pub(crate) fn remove_vertex(&mut self, v: VertexId) -> Result<usize> {
        let i = self
            .vertex_index(v)
            .ok_or_else(|| invalid_edit(format!("{v} is not a vertex of this cell")))?;
        self.vertices.remove(i);
        Ok(i)
    }

    /// Removes `e` from the edge sequence and returns its former index.
    pub(crate) fn remove_edge(&mut self, e: EdgeId) -> Result<usize> {
        let i = self
            .edge_index(e)
            .ok_or_else(|| invalid_edit(format!("{e} is not an edge of this cell")))?;
        self.edges.remove(i);
        Ok(i)
    }

    /// Substitutes `new` for `old` in place and returns the index.
    pub(crate) fn exchange_vertex(&mut self, old: VertexId, new: VertexId) -> Result<usize> {
        if self.contains_vertex(new) {
            return Err(invalid_edit(format!("{new} is already a vertex of this cell")));
        }
        let i = self
            .vertex_index(old)
            .ok_or_else(|| invalid_edit(format!("{old} is not a vertex of this cell")))?;
        self.vertices[i] = new;
        Ok(i)
    }

    /// Removes edge `e` together with one of its two endpoints, merging them
    /// into `keep`.
    ///
    /// The edge at index `i` goes with the vertex at `i + 1`, or with the
    /// vertex at `i` when `i` is the last index, so the remaining edges stay
    /// aligned with their start vertices.
    ///
    /// ### Returns
    /// The endpoint that left the sequence.
    pub(crate) fn merge_edge(&mut self, e: EdgeId, keep: VertexId) -> Result<VertexId> {
        let n = self.len();
        if n <= 3 {
            return Err(invalid_edit(format!("merging {e} would leave fewer than 3 vertices")));
        }
        let i = self
            .edge_index(e)
            .ok_or_else(|| invalid_edit(format!("{e} is not an edge of this cell")))?;
        let a = self.vertices[i];
        let b = self.vertices[(i + 1) % n];
        let dropped = if keep == a {
            b
        } else if keep == b {
            a
        } else {
            return Err(invalid_edit(format!("{keep} is not an endpoint of {e} in this cell")));
        };

        let (survivor_slot, removed_slot) = if i + 1 < n { (i, i + 1) } else { (0, i) };
        self.edges.remove(i);
        self.vertices.remove(removed_slot);
        self.vertices[survivor_slot] = keep;
        Ok(dropped)
    }

    /// Where to insert a new vertex next to `anchor` on the side of `via`,
    /// together with the new edge that joins it to `anchor`.
    ///
    /// `via` must be one of the two edges of this cell at `anchor`. After the
    /// insertion `via` joins the new vertex to the neighbour of `anchor` it
    /// used to reach.
    ///
    /// ### Returns
    /// `(vertex_index, edge_index)` for [`Cell::add_vertex`] and
    /// [`Cell::add_edge`].
    pub(crate) fn beside_slot(&self, anchor: VertexId, via: EdgeId) -> Result<(usize, usize)> {
        let n = self.len();
        let i = self
            .vertex_index(anchor)
            .ok_or_else(|| invalid_edit(format!("{anchor} is not a vertex of this cell")))?;
        if self.edges[i] == via {
            Ok((i + 1, i))
        } else if self.edges[(i + n - 1) % n] == via {
            Ok((i, i))
        } else {
            Err(invalid_edit(format!("{via} does not meet {anchor} in this cell")))
        }
    }
}
