//! The tissue: sole owner of every vertex, edge and cell.
//!
//! All structural edits go through [`Tissue`] so that the back-references
//! between the three entity kinds stay symmetric:
//!
//! - a vertex lists an edge iff the edge has it as an endpoint,
//! - a vertex lists a cell iff the cell has it in its polygon,
//! - an edge lists a cell iff the cell has it in its boundary.
//!
//! Entities that lose their last reason to exist are released here as well:
//! an edge with no bordering cell dies, and a vertex with neither cells nor
//! edges dies.

use glam::DVec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::arena::Arena;
use crate::cell::Cell;
use crate::config::Config;
use crate::edge::Edge;
use crate::error::{Result, TissueError, invalid_edit};
use crate::geometry;
use crate::phases;
use crate::snapshot::Snapshot;
use crate::types::{CellId, EdgeId, EntityKind, VertexId};
use crate::vertex::Vertex;

/// Number of topology events performed by one call to [`Tissue::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub extrusions: usize,
    pub divisions: usize,
    pub t1_flips: usize,
    pub splits: usize,
    /// Extrusion or division candidates postponed to a later step.
    pub deferred: usize,
}

impl StepReport {
    /// Whether any entity was rewired during the step.
    pub fn changed_topology(&self) -> bool {
        self.extrusions + self.divisions + self.t1_flips + self.splits > 0
    }

    /// Adds the counts of `other` to `self`.
    pub fn accumulate(&mut self, other: &StepReport) {
        self.extrusions += other.extrusions;
        self.divisions += other.divisions;
        self.t1_flips += other.t1_flips;
        self.splits += other.splits;
        self.deferred += other.deferred;
    }
}

#[derive(Debug)]
pub struct Tissue {
    pub(crate) cfg: Config,
    pub(crate) vertices: Arena<VertexId, Vertex>,
    pub(crate) edges: Arena<EdgeId, Edge>,
    pub(crate) cells: Arena<CellId, Cell>,
    pub(crate) step: u64,
    pub(crate) rng: StdRng,
    pub(crate) cell_defects: Vec<CellId>,
    pub(crate) vertex_defects: Vec<VertexId>,
}

impl Tissue {
    /// Creates an empty tissue with arenas sized from `cfg`.
    pub fn new(cfg: Config) -> Self {
        Self {
            vertices: Arena::with_capacity(EntityKind::Vertex, cfg.vertex_capacity),
            edges: Arena::with_capacity(EntityKind::Edge, cfg.edge_capacity),
            cells: Arena::with_capacity(EntityKind::Cell, cfg.cell_capacity),
            step: 0,
            rng: StdRng::seed_from_u64(cfg.seed),
            cell_defects: Vec::new(),
            vertex_defects: Vec::new(),
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Replaces the mechanical and transition parameters.
    ///
    /// Arena capacities and the RNG seed are fixed at construction; the
    /// corresponding fields of `cfg` are ignored.
    pub fn set_config(&mut self, cfg: Config) {
        self.cfg = Config {
            vertex_capacity: self.cfg.vertex_capacity,
            edge_capacity: self.cfg.edge_capacity,
            cell_capacity: self.cfg.cell_capacity,
            seed: self.cfg.seed,
            ..cfg
        };
    }

    /// Number of completed timesteps.
    #[inline]
    pub fn step_index(&self) -> u64 {
        self.step
    }

    pub fn vertex(&self, v: VertexId) -> Option<&Vertex> {
        self.vertices.get(v)
    }

    pub fn edge(&self, e: EdgeId) -> Option<&Edge> {
        self.edges.get(e)
    }

    pub fn cell(&self, c: CellId) -> Option<&Cell> {
        self.cells.get(c)
    }

    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter()
    }

    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> + '_ {
        self.cells.iter()
    }

    /// Live `(vertices, edges, cells)` counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.vertices.len(), self.edges.len(), self.cells.len())
    }

    /// `V - E + C` over live entities.
    pub fn euler_characteristic(&self) -> i64 {
        let (v, e, c) = self.counts();
        v as i64 - e as i64 + c as i64
    }

    pub fn cell_defects(&self) -> &[CellId] {
        &self.cell_defects
    }

    pub fn vertex_defects(&self) -> &[VertexId] {
        &self.vertex_defects
    }

    /// Positions of a cell's polygon, in sequence order.
    pub fn cell_points(&self, c: CellId) -> Vec<DVec2> {
        self.cells[c]
            .vertices
            .iter()
            .map(|&v| self.vertices[v].pos)
            .collect()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    pub fn create_vertex(&mut self, pos: DVec2) -> Result<VertexId> {
        self.vertices.insert(Vertex::new(pos))
    }

    /// Creates an edge and registers it with both endpoints.
    pub fn create_edge(&mut self, v1: VertexId, v2: VertexId) -> Result<EdgeId> {
        if v1 == v2 {
            return Err(invalid_edit(format!("edge endpoints must differ, got {v1} twice")));
        }
        self.require_vertex(v1)?;
        self.require_vertex(v2)?;
        let e = self.edges.insert(Edge::new(v1, v2))?;
        self.vertices[v1].add_edge_contact(e);
        self.vertices[v2].add_edge_contact(e);
        Ok(e)
    }

    /// Creates a cell over an aligned vertex/edge cycle and registers it with
    /// every vertex and edge.
    pub fn create_cell(&mut self, vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Result<CellId> {
        let n = vertices.len();
        if n < 3 || edges.len() != n {
            return Err(invalid_edit(format!(
                "cell needs matching sequences of at least 3, got {} vertices and {} edges",
                n,
                edges.len()
            )));
        }
        for i in 0..n {
            let (a, b) = (vertices[i], vertices[(i + 1) % n]);
            self.require_vertex(a)?;
            let edge = self
                .edges
                .get(edges[i])
                .ok_or_else(|| invalid_edit(format!("{} is not a live edge", edges[i])))?;
            if !edge.connects(a, b) {
                return Err(invalid_edit(format!("{} does not join {a} and {b}", edges[i])));
            }
            if vertices[..i].contains(&a) {
                return Err(invalid_edit(format!("{a} appears twice in the cell")));
            }
        }

        let c = self.cells.insert(Cell::new(vertices, edges))?;
        let (vs, es) = {
            let cell = &self.cells[c];
            (cell.vertices.clone(), cell.edges.clone())
        };
        for v in vs {
            self.vertices[v].add_cell_contact(c);
        }
        for e in es {
            self.edges[e].add_cell_junction(c);
        }
        Ok(c)
    }

    /// Marks a vertex dead. Callers detach it from every edge and cell first.
    pub fn destroy_vertex(&mut self, v: VertexId) {
        debug_assert!(
            self.vertices.get(v).is_none_or(|x| x.edges.is_empty() && x.cells.is_empty()),
            "destroying attached vertex {v}"
        );
        self.vertices.kill(v);
    }

    /// Removes an edge from its bordering cells and endpoints, then marks it dead.
    pub fn destroy_edge(&mut self, e: EdgeId) -> Result<()> {
        let edge = self
            .edges
            .get(e)
            .ok_or_else(|| invalid_edit(format!("{e} is not a live edge")))?;
        let (v1, v2) = edge.endpoints();
        let junctions = edge.cells.clone();
        for c in junctions {
            self.cell_mut(c)?.remove_edge(e)?;
        }
        self.vertices[v1].remove_edge_contact(e);
        self.vertices[v2].remove_edge_contact(e);
        self.edges.kill(e);
        self.release_if_orphan(v1);
        self.release_if_orphan(v2);
        Ok(())
    }

    /// Detaches a cell from its edges and vertices and marks it dead.
    ///
    /// Edges left without a bordering cell die with it, then vertices left
    /// without cells and edges.
    pub fn destroy_cell(&mut self, c: CellId) -> Result<()> {
        let cell = self
            .cells
            .get(c)
            .ok_or_else(|| invalid_edit(format!("{c} is not a live cell")))?;
        let (vs, es) = (cell.vertices.clone(), cell.edges.clone());
        self.cells.kill(c);

        for e in es {
            if self.edges.is_live(e) && self.edges[e].remove_cell_junction(c) {
                self.destroy_edge(e)?;
            }
        }
        for v in vs {
            if self.vertices.is_live(v) {
                self.vertices[v].remove_cell_contact(c);
                self.release_if_orphan(v);
            }
        }
        Ok(())
    }

    pub(crate) fn release_if_orphan(&mut self, v: VertexId) {
        if let Some(vx) = self.vertices.get(v)
            && vx.cells.is_empty()
            && vx.edges.is_empty()
        {
            self.vertices.kill(v);
        }
    }

    // ---------------------------------------------------------------------
    // Cell sequence edits with back-reference bookkeeping
    // ---------------------------------------------------------------------

    /// Inserts `v` into the vertex sequence of `c` at `index`.
    pub fn cell_new_vertex(&mut self, c: CellId, v: VertexId, index: usize) -> Result<()> {
        self.require_vertex(v)?;
        self.cell_mut(c)?.add_vertex(v, index);
        self.vertices[v].add_cell_contact(c);
        Ok(())
    }

    /// Inserts `e` into the edge sequence of `c` at `index`.
    pub fn cell_new_edge(&mut self, c: CellId, e: EdgeId, index: usize) -> Result<()> {
        if !self.edges.is_live(e) {
            return Err(invalid_edit(format!("{e} is not a live edge")));
        }
        self.cell_mut(c)?.add_edge(e, index);
        self.edges[e].add_cell_junction(c);
        Ok(())
    }

    /// Removes `v` from the vertex sequence of `c`; returns the vacated index.
    pub fn cell_remove_vertex(&mut self, c: CellId, v: VertexId) -> Result<usize> {
        let i = self.cell_mut(c)?.remove_vertex(v)?;
        self.vertices[v].remove_cell_contact(c);
        self.release_if_orphan(v);
        Ok(i)
    }

    /// Removes `e` from the edge sequence of `c`; returns the vacated index.
    ///
    /// The edge is destroyed if `c` was its last bordering cell.
    pub fn cell_remove_edge(&mut self, c: CellId, e: EdgeId) -> Result<usize> {
        let i = self.cell_mut(c)?.remove_edge(e)?;
        if self.edges[e].remove_cell_junction(c) {
            self.destroy_edge(e)?;
        }
        Ok(i)
    }

    /// Substitutes `new` for `old` in the polygon of `c`.
    ///
    /// Cell contacts move from `old` to `new`; `old` is released if it is
    /// left with no cell and no edge.
    pub fn cell_exchange_vertex(&mut self, c: CellId, old: VertexId, new: VertexId) -> Result<()> {
        self.require_vertex(new)?;
        self.cell_mut(c)?.exchange_vertex(old, new)?;
        self.vertices[old].remove_cell_contact(c);
        self.vertices[new].add_cell_contact(c);
        self.release_if_orphan(old);
        Ok(())
    }

    /// Drops edge `e` and one endpoint from `c`, leaving `keep` in place.
    ///
    /// ### Parameters
    /// - `c` - Cell losing a side.
    /// - `e` - Edge of `c` to remove; destroyed if `c` was its last cell.
    /// - `keep` - Endpoint of `e` that stays in the polygon.
    ///
    /// ### Returns
    /// The endpoint removed from the polygon.
    pub fn cell_merge_edge(&mut self, c: CellId, e: EdgeId, keep: VertexId) -> Result<VertexId> {
        let dropped = self.cell_mut(c)?.merge_edge(e, keep)?;
        self.vertices[dropped].remove_cell_contact(c);
        if self.edges[e].remove_cell_junction(c) {
            self.destroy_edge(e)?;
        }
        self.release_if_orphan(dropped);
        Ok(dropped)
    }

    /// Inserts `new_vertex` into `c` next to `anchor` on the side of `via`,
    /// joined to `anchor` by `new_edge`.
    ///
    /// ### Parameters
    /// - `c` - Cell to grow by one corner.
    /// - `anchor` - Existing corner of `c` the new corner attaches to.
    /// - `via` - Edge of `c` at `anchor` that will end at `new_vertex`; picks
    ///   the side of `anchor` on which the insertion happens.
    /// - `new_vertex` - Corner to insert.
    /// - `new_edge` - Edge joining `anchor` and `new_vertex`.
    pub(crate) fn cell_insert_beside(
        &mut self,
        c: CellId,
        anchor: VertexId,
        via: EdgeId,
        new_vertex: VertexId,
        new_edge: EdgeId,
    ) -> Result<()> {
        let (vi, ei) = self.cell_mut(c)?.beside_slot(anchor, via)?;
        self.cell_new_vertex(c, new_vertex, vi)?;
        self.cell_new_edge(c, new_edge, ei)
    }

    /// Re-routes endpoint `old` of `e` onto `new`.
    ///
    /// ### Parameters
    /// - `e` - Edge to re-route.
    /// - `old` - Current endpoint of `e`; it loses the edge contact but stays
    ///   alive.
    /// - `new` - Replacement endpoint; must differ from the other endpoint.
    pub fn edge_swap_vertex(&mut self, e: EdgeId, old: VertexId, new: VertexId) -> Result<()> {
        self.require_vertex(new)?;
        self.edges
            .get_mut(e)
            .ok_or_else(|| invalid_edit(format!("{e} is not a live edge")))?
            .swap_vertex(old, new)?;
        self.vertices[old].remove_edge_contact(e);
        self.vertices[new].add_edge_contact(e);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Neighbourhoods
    // ---------------------------------------------------------------------

    /// Orders every vertex's cell contacts around it, refreshes boundary flags
    /// and rebuilds every cell's neighbour list.
    pub fn find_neighbours(&mut self) {
        let vertex_ids: Vec<VertexId> = self.vertices.ids().collect();
        for v in vertex_ids {
            self.order_cell_contacts(v);
            self.refresh_boundary(v);
        }
        let cell_ids: Vec<CellId> = self.cells.ids().collect();
        for c in cell_ids {
            self.cell_find_neighbours(c);
        }
    }

    /// Sorts the cell contacts of `v` counter-clockwise by the direction of
    /// each cell's centroid.
    pub(crate) fn order_cell_contacts(&mut self, v: VertexId) {
        let center = self.vertices[v].pos;
        let mut keyed: Vec<(f64, CellId)> = self.vertices[v]
            .cells
            .iter()
            .map(|&c| {
                let centroid = geometry::centroid(&self.cell_points(c));
                (geometry::polar_angle(center, centroid), c)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.vertices[v].cells = keyed.into_iter().map(|(_, c)| c).collect();
    }

    pub(crate) fn refresh_boundary(&mut self, v: VertexId) {
        let vx = &self.vertices[v];
        let boundary = vx.cells.len() < vx.edges.len()
            || vx.edges.iter().any(|&e| self.edges[e].cells.len() < 2);
        self.vertices[v].boundary = boundary;
    }

    pub(crate) fn cell_find_neighbours(&mut self, c: CellId) {
        let mut neighbours = Vec::with_capacity(self.cells[c].edges.len());
        for &e in &self.cells[c].edges {
            if let Some(o) = self.edges[e].other_cell(c)
                && !neighbours.contains(&o)
            {
                neighbours.push(o);
            }
        }
        self.cells[c].neighbours = neighbours;
    }

    /// The edge shared by two cells, if they are neighbours.
    pub fn common_edge(&self, c1: CellId, c2: CellId) -> Option<EdgeId> {
        let cell = self.cells.get(c1)?;
        cell.edges
            .iter()
            .copied()
            .find(|&e| self.edges[e].cells.contains(&c2))
    }

    /// Signed rotation, in doubled-angle space, from the director of `c1` to
    /// that of `c2`.
    pub fn director_angle(&self, c1: CellId, c2: CellId) -> f64 {
        geometry::nematic_angle(
            self.cells[c1].gyration.nematic(),
            self.cells[c2].gyration.nematic(),
        )
    }

    // ---------------------------------------------------------------------
    // Stepping
    // ---------------------------------------------------------------------

    /// Advances the tissue by one timestep.
    ///
    /// Runs geometry, forces, integration and the topology transitions in
    /// that order, then refreshes the order field on output steps.
    pub fn step(&mut self) -> Result<StepReport> {
        phases::geometry_phase(self);
        phases::force_phase(self);
        phases::integration_phase(self)?;
        let report = phases::transition_phase(self)?;
        self.step += 1;
        if self.is_output_step() {
            phases::order_phase(self);
        }
        if report.changed_topology() {
            debug!(step = self.step, ?report, "topology changed");
        }
        Ok(report)
    }

    /// Runs `cfg.timesteps` steps, handing a snapshot to `on_snapshot` on
    /// every output step and after the last step.
    ///
    /// ### Returns
    /// The summed transition counts, or the first fatal error.
    pub fn run(&mut self, mut on_snapshot: impl FnMut(&Snapshot)) -> Result<StepReport> {
        let mut total = StepReport::default();
        let end = self.step + self.cfg.timesteps;
        while self.step < end {
            let report = self.step()?;
            total.accumulate(&report);
            if self.is_output_step() || self.step == end {
                if !self.is_output_step() {
                    phases::order_phase(self);
                }
                on_snapshot(&self.snapshot());
            }
        }
        let (v, e, c) = self.counts();
        info!(steps = self.cfg.timesteps, v, e, c, ?total, "run finished");
        Ok(total)
    }

    fn is_output_step(&self) -> bool {
        self.cfg.output_interval > 0 && self.step % self.cfg.output_interval == 0
    }

    // ---------------------------------------------------------------------
    // Invariants
    // ---------------------------------------------------------------------

    /// Verifies back-reference symmetry, sequence alignment, liveness of
    /// every reference and counter-clockwise winding of every cell at the
    /// current positions. Reports the first violation found.
    pub fn check_consistency(&self) -> Result<()> {
        let broken = |msg: String| Err(TissueError::BrokenInvariant(msg));

        for (v, vx) in self.vertices.iter() {
            if vx.cells.is_empty() {
                return broken(format!("{v} has no cell contacts"));
            }
            for &e in &vx.edges {
                match self.edges.get(e) {
                    Some(edge) if edge.has_vertex(v) => {}
                    _ => return broken(format!("{v} lists {e}, which does not end at it")),
                }
            }
            for &c in &vx.cells {
                match self.cells.get(c) {
                    Some(cell) if cell.contains_vertex(v) => {}
                    _ => return broken(format!("{v} lists {c}, which does not contain it")),
                }
            }
        }

        for (e, edge) in self.edges.iter() {
            let (a, b) = edge.endpoints();
            if a == b {
                return broken(format!("{e} has equal endpoints"));
            }
            for v in [a, b] {
                match self.vertices.get(v) {
                    Some(vx) if vx.edges.contains(&e) => {}
                    _ => return broken(format!("{e} ends at {v}, which does not list it")),
                }
            }
            if edge.cells.is_empty() || edge.cells.len() > 2 {
                return broken(format!("{e} borders {} cells", edge.cells.len()));
            }
            for &c in &edge.cells {
                match self.cells.get(c) {
                    Some(cell) if cell.contains_edge(e) => {}
                    _ => return broken(format!("{e} lists {c}, which does not use it")),
                }
            }
        }

        for (c, cell) in self.cells.iter() {
            let n = cell.vertices.len();
            if n < 3 || cell.edges.len() != n {
                return broken(format!(
                    "{c} has {} vertices and {} edges",
                    n,
                    cell.edges.len()
                ));
            }
            for i in 0..n {
                let (a, b) = (cell.vertices[i], cell.vertices[(i + 1) % n]);
                let e = cell.edges[i];
                match self.edges.get(e) {
                    Some(edge) if edge.connects(a, b) && edge.cells.contains(&c) => {}
                    _ => return broken(format!("{c}: {e} at position {i} does not join {a} and {b}")),
                }
                match self.vertices.get(a) {
                    Some(vx) if vx.cells.contains(&c) => {}
                    _ => return broken(format!("{c} contains {a}, which does not list it")),
                }
                if cell.vertices[..i].contains(&a) {
                    return broken(format!("{c} visits {a} twice"));
                }
            }
            let signed = geometry::signed_area(&self.cell_points(c));
            if signed.is_nan() || signed <= 0.0 {
                return broken(format!("{c} is not wound counter-clockwise (signed area {signed})"));
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    pub(crate) fn cell_mut(&mut self, c: CellId) -> Result<&mut Cell> {
        self.cells
            .get_mut(c)
            .ok_or_else(|| invalid_edit(format!("{c} is not a live cell")))
    }

    fn require_vertex(&self, v: VertexId) -> Result<()> {
        if self.vertices.is_live(v) {
            Ok(())
        } else {
            Err(invalid_edit(format!("{v} is not a live vertex")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two unit squares side by side, built by hand.
    ///
    /// ```text
    /// v3 -- v4 -- v5
    ///  | c0  |  c1 |
    /// v0 -- v1 -- v2
    /// ```
    fn two_squares() -> (Tissue, [VertexId; 6], [CellId; 2], EdgeId) {
        let mut t = Tissue::new(Config::default());
        let p = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)];
        let v = p.map(|(x, y)| t.create_vertex(DVec2::new(x, y)).unwrap());
        let e01 = t.create_edge(v[0], v[1]).unwrap();
        let e14 = t.create_edge(v[1], v[4]).unwrap();
        let e43 = t.create_edge(v[4], v[3]).unwrap();
        let e30 = t.create_edge(v[3], v[0]).unwrap();
        let e12 = t.create_edge(v[1], v[2]).unwrap();
        let e25 = t.create_edge(v[2], v[5]).unwrap();
        let e54 = t.create_edge(v[5], v[4]).unwrap();
        let c0 = t
            .create_cell(vec![v[0], v[1], v[4], v[3]], vec![e01, e14, e43, e30])
            .unwrap();
        let c1 = t
            .create_cell(vec![v[1], v[2], v[5], v[4]], vec![e12, e25, e54, e14])
            .unwrap();
        t.find_neighbours();
        (t, v, [c0, c1], e14)
    }

    #[test]
    fn creation_wires_back_references() {
        let (t, v, [c0, c1], shared) = two_squares();
        assert_eq!(t.counts(), (6, 7, 2));
        assert_eq!(t.euler_characteristic(), 1);
        t.check_consistency().unwrap();

        assert_eq!(t.vertex(v[1]).unwrap().cell_contacts().len(), 2);
        assert_eq!(t.vertex(v[1]).unwrap().edge_contacts().len(), 3);
        assert_eq!(t.common_edge(c0, c1), Some(shared));
        assert_eq!(t.cell(c0).unwrap().neighbours(), &[c1]);
        assert!(t.vertices().all(|(_, x)| x.is_boundary()));
    }

    #[test]
    fn create_rejects_malformed_input() {
        let (mut t, v, _, shared) = two_squares();
        assert!(matches!(
            t.create_edge(v[0], v[0]),
            Err(TissueError::InvalidTopologyEdit(_))
        ));
        // e14 does not join v0 and v1.
        assert!(t.create_cell(vec![v[0], v[1], v[3]], vec![shared, shared, shared]).is_err());
        assert!(t.create_cell(vec![v[0], v[1]], vec![]).is_err());
        assert_eq!(t.counts(), (6, 7, 2));
    }

    #[test]
    fn destroying_a_cell_releases_what_only_it_used() {
        let (mut t, v, [c0, c1], shared) = two_squares();
        t.destroy_cell(c0).unwrap();

        assert_eq!(t.counts(), (4, 4, 1));
        assert!(t.vertex(v[0]).is_none());
        assert!(t.vertex(v[3]).is_none());
        assert_eq!(t.edge(shared).unwrap().cell_junctions(), &[c1]);
        t.check_consistency().unwrap();
    }

    #[test]
    fn destroying_an_edge_unlinks_cells_and_endpoints() {
        let (mut t, v, [c0, c1], shared) = two_squares();
        t.destroy_edge(shared).unwrap();

        assert!(t.edge(shared).is_none());
        assert!(!t.cell(c0).unwrap().contains_edge(shared));
        assert!(!t.cell(c1).unwrap().contains_edge(shared));
        assert_eq!(t.vertex(v[1]).unwrap().edge_contacts().len(), 2);
        // The cells are now misaligned, which the checker reports.
        assert!(matches!(
            t.check_consistency(),
            Err(TissueError::BrokenInvariant(_))
        ));
    }

    #[test]
    fn removing_the_last_junction_destroys_the_edge() {
        let (mut t, _, [c0, _], _) = two_squares();
        let outer = t.cell(c0).unwrap().edges()[0];
        assert_eq!(t.cell_remove_edge(c0, outer).unwrap(), 0);
        assert!(t.edge(outer).is_none());
    }

    #[test]
    fn exchange_and_swap_move_contacts() {
        let (mut t, v, [c0, _], _) = two_squares();
        let w = t.create_vertex(DVec2::new(-0.5, 0.5)).unwrap();
        let e30 = t.cell(c0).unwrap().edges()[3];

        t.edge_swap_vertex(e30, v[0], w).unwrap();
        t.cell_exchange_vertex(c0, v[0], w).unwrap();

        // v0 still ends e01, so it stays live without cells.
        assert!(t.vertex(v[0]).unwrap().cell_contacts().is_empty());
        assert_eq!(t.vertex(w).unwrap().cell_contacts(), &[c0]);
        assert!(t.edge(e30).unwrap().connects(v[3], w));
        assert!(t.cell_exchange_vertex(c0, v[1], w).is_err());
    }

    #[test]
    fn capacity_is_checked_per_kind() {
        let cfg = Config {
            vertex_capacity: 2,
            ..Config::default()
        };
        let mut t = Tissue::new(cfg);
        t.create_vertex(DVec2::ZERO).unwrap();
        t.create_vertex(DVec2::X).unwrap();
        match t.create_vertex(DVec2::Y) {
            Err(TissueError::CapacityExceeded { kind, capacity }) => {
                assert_eq!(kind, EntityKind::Vertex);
                assert_eq!(capacity, 2);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn set_config_keeps_capacities_and_seed() {
        let mut t = Tissue::new(Config::default());
        t.set_config(Config {
            k_area: 5.0,
            vertex_capacity: 1,
            seed: 99,
            ..Config::default()
        });
        assert_eq!(t.config().k_area, 5.0);
        assert_eq!(t.config().vertex_capacity, Config::default().vertex_capacity);
        assert_eq!(t.config().seed, 0);
    }

    #[test]
    fn contacts_are_ordered_counter_clockwise() {
        let (t, v, [c0, c1], _) = two_squares();
        // Around v1, c1's centroid (1.5, 0.5) comes before c0's (0.5, 0.5).
        assert_eq!(t.vertex(v[1]).unwrap().cell_contacts(), &[c1, c0]);
    }
}
