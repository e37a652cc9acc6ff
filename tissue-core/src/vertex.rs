use glam::DVec2;
use rand::Rng;

use crate::types::{CellId, EdgeId};

/// A point mass shared by the polygons that meet at it.
///
/// Contact lists are kept free of duplicates. The cell contacts are ordered
/// angularly around the vertex by [`crate::tissue::Tissue::find_neighbours`];
/// contacts are only ever changed through the tissue so that back-references
/// stay symmetric.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) pos: DVec2,
    /// Displacement applied by the last integration step.
    pub(crate) displacement: DVec2,
    pub(crate) force: DVec2,
    /// Topological charge of the director field around this vertex.
    pub(crate) m: f64,
    pub(crate) boundary: bool,
    pub(crate) cells: Vec<CellId>,
    pub(crate) edges: Vec<EdgeId>,
}

impl Vertex {
    pub fn new(pos: DVec2) -> Self {
        Self {
            pos,
            displacement: DVec2::ZERO,
            force: DVec2::ZERO,
            m: 0.0,
            boundary: false,
            cells: Vec::with_capacity(3),
            edges: Vec::with_capacity(3),
        }
    }

    #[inline]
    pub fn pos(&self) -> DVec2 {
        self.pos
    }

    #[inline]
    pub fn force(&self) -> DVec2 {
        self.force
    }

    #[inline]
    pub fn displacement(&self) -> DVec2 {
        self.displacement
    }

    #[inline]
    pub fn m(&self) -> f64 {
        self.m
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    #[inline]
    pub fn cell_contacts(&self) -> &[CellId] {
        &self.cells
    }

    #[inline]
    pub fn edge_contacts(&self) -> &[EdgeId] {
        &self.edges
    }

    pub(crate) fn add_cell_contact(&mut self, c: CellId) {
        if !self.cells.contains(&c) {
            self.cells.push(c);
        }
    }

    pub(crate) fn remove_cell_contact(&mut self, c: CellId) {
        self.cells.retain(|&x| x != c);
    }

    pub(crate) fn add_edge_contact(&mut self, e: EdgeId) {
        if !self.edges.contains(&e) {
            self.edges.push(e);
        }
    }

    pub(crate) fn remove_edge_contact(&mut self, e: EdgeId) {
        self.edges.retain(|&x| x != e);
    }

    #[inline]
    pub(crate) fn add_force(&mut self, f: DVec2) {
        self.force += f;
    }

    /// Explicit-Euler update `pos += force * dt`, plus a random kick of
    /// length `noise * sqrt(dt)` in a uniformly drawn direction.
    ///
    /// Clears the force accumulator afterwards.
    ///
    /// ### Parameters
    /// - `dt` - Timestep.
    /// - `noise` - Kick magnitude per `sqrt(dt)`; zero draws nothing.
    /// - `rng` - Source of the kick direction.
    pub(crate) fn apply_force(&mut self, dt: f64, noise: f64, rng: &mut impl Rng) {
        let mut dr = self.force * dt;
        if noise > 0.0 {
            let theta = rng.random_range(0.0..std::f64::consts::TAU);
            dr += DVec2::from_angle(theta) * noise * dt.sqrt();
        }
        self.pos += dr;
        self.displacement = dr;
        self.force = DVec2::ZERO;
    }
}
