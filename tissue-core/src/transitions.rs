//! Topology transitions: extrusion, division, T1 flip and four-fold split.
//!
//! Each operator rewires the entity graph through the [`Tissue`] sequence
//! edits, so back-references stay symmetric, and each preserves
//! `V - E + C`. The passes select candidates, run the operators and sort the
//! outcome into applied and deferred.
//!
//! Operators may leave vertex contact order and cell neighbour lists stale
//! for cells around the edit; the transition phase re-derives them once the
//! passes are done.

use glam::DVec2;
use tracing::{debug, instrument, warn};

use crate::cell::Cell;
use crate::error::{Result, TissueError, degenerate, invalid_edit};
use crate::geometry::{self, SymTensor2};
use crate::tissue::Tissue;
use crate::types::{CellId, EdgeId, VertexId};

/// Split points are kept this far, as a fraction of the edge, from either end.
const SPLIT_MARGIN: f64 = 0.1;

/// Outcome of an extrusion or division pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub applied: usize,
    pub deferred: usize,
}

impl Tissue {
    // ---------------------------------------------------------------------
    // Extrusion
    // ---------------------------------------------------------------------

    /// Collapses cell `c` into a single new vertex at its centroid.
    ///
    /// Every edge leaving the cell is re-routed to the new vertex and every
    /// neighbour's run of the cell's corners shrinks to that vertex. The
    /// cell, its edges and its corners die.
    ///
    /// ### Returns
    /// - `Ok(vertex)` naming the collapsed vertex.
    /// - `Err(DegenerateGeometry)` when the collapse would corrupt a
    ///   neighbour (it would drop below three corners, or it touches the cell
    ///   in more than one run), when an edge outside the cell joins two of its
    ///   corners, or when the cell has no neighbours at all. Nothing is
    ///   modified in that case.
    pub fn extrude(&mut self, c: CellId) -> Result<VertexId> {
        let cell = self
            .cells
            .get(c)
            .ok_or_else(|| invalid_edit(format!("{c} is not a live cell")))?;
        let corners = cell.vertices.clone();
        let own_edges = cell.edges.clone();

        self.check_extrudable(c, &corners, &own_edges)?;

        let centroid = geometry::centroid(&self.cell_points(c));
        if !centroid.is_finite() {
            return Err(degenerate(format!("{c} has no finite centroid")));
        }
        let m = self.create_vertex(centroid)?;

        for &v in &corners {
            let outward: Vec<EdgeId> = self.vertices[v]
                .edges
                .iter()
                .copied()
                .filter(|e| !own_edges.contains(e))
                .collect();
            for e in outward {
                self.edge_swap_vertex(e, v, m)?;
            }
        }

        for n in self.cells_around(c, &corners) {
            loop {
                let neighbour = &self.cells[n];
                let Some(i) = neighbour.edges.iter().position(|e| own_edges.contains(e)) else {
                    break;
                };
                let (e, keep) = (neighbour.edges[i], neighbour.vertices[i]);
                self.cell_merge_edge(n, e, keep)?;
            }
            let stale = self.cells[n]
                .vertices
                .iter()
                .copied()
                .find(|v| corners.contains(v))
                .ok_or_else(|| invalid_edit(format!("{n} lost contact with {c} during extrusion")))?;
            self.cell_exchange_vertex(n, stale, m)?;
        }

        self.destroy_cell(c)?;
        self.order_cell_contacts(m);
        self.refresh_boundary(m);
        debug!(cell = %c, vertex = %m, "extruded");
        Ok(m)
    }

    /// Live cells other than `c` that share a corner with it.
    fn cells_around(&self, c: CellId, corners: &[VertexId]) -> Vec<CellId> {
        let mut around = Vec::new();
        for &v in corners {
            for &n in &self.vertices[v].cells {
                if n != c && !around.contains(&n) {
                    around.push(n);
                }
            }
        }
        around
    }

    fn check_extrudable(&self, c: CellId, corners: &[VertexId], own_edges: &[EdgeId]) -> Result<()> {
        let around = self.cells_around(c, corners);
        if around.is_empty() {
            return Err(degenerate(format!("{c} has no neighbours to absorb it")));
        }
        for n in around {
            let neighbour = &self.cells[n];
            let shared_corners = neighbour.vertices.iter().filter(|v| corners.contains(v)).count();
            let shared_edges = neighbour.edges.iter().filter(|e| own_edges.contains(e)).count();
            if shared_corners != shared_edges + 1 {
                return Err(degenerate(format!("{n} touches {c} in more than one place")));
            }
            if neighbour.len() + 1 < shared_corners + 3 {
                return Err(degenerate(format!("{n} would drop below 3 corners")));
            }
        }

        let mut far_ends = Vec::new();
        for &v in corners {
            for &e in &self.vertices[v].edges {
                if own_edges.contains(&e) {
                    continue;
                }
                let Some(other) = self.edges[e].other(v) else {
                    return Err(invalid_edit(format!("{v} lists {e}, which does not end at it")));
                };
                if corners.contains(&other) {
                    return Err(degenerate(format!("{e} is a chord of {c}")));
                }
                if far_ends.contains(&other) {
                    return Err(degenerate(format!("two corners of {c} both reach {other}")));
                }
                far_ends.push(other);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Division
    // ---------------------------------------------------------------------

    /// Splits cell `c` in two along the line through its centroid
    /// perpendicular to its major axis.
    ///
    /// A new vertex is inserted on each of the two crossed edges and a new
    /// edge joins them. Both children keep the parent's winding and the
    /// parent slot dies.
    ///
    /// ### Returns
    /// - `Ok((a, b))` naming the two children.
    /// - `Err(DegenerateGeometry)` if the line does not cross the boundary
    ///   exactly twice. Nothing is modified in that case.
    pub fn divide(&mut self, c: CellId) -> Result<(CellId, CellId)> {
        if !self.cells.is_live(c) {
            return Err(invalid_edit(format!("{c} is not a live cell")));
        }
        let pts = self.cell_points(c);
        let centroid = geometry::centroid(&pts);
        let (_, axis) = SymTensor2::gyration(&pts, centroid).dominant_eigen();

        let side: Vec<bool> = pts.iter().map(|&p| (p - centroid).dot(axis) >= 0.0).collect();
        let n = pts.len();
        let crossed: Vec<usize> = (0..n).filter(|&i| side[i] != side[(i + 1) % n]).collect();
        if crossed.len() != 2 {
            return Err(degenerate(format!(
                "division line crosses {c} {} times",
                crossed.len()
            )));
        }

        let mut cuts = Vec::with_capacity(2);
        for &i in &crossed {
            let x = self.cells[c].vertices[i];
            let (px, py) = (pts[i], pts[(i + 1) % n]);
            let (sx, sy) = ((px - centroid).dot(axis), (py - centroid).dot(axis));
            let t = (sx / (sx - sy)).clamp(SPLIT_MARGIN, 1.0 - SPLIT_MARGIN);
            cuts.push((self.cells[c].edges[i], x, px + (py - px) * t));
        }
        let mut split = Vec::with_capacity(2);
        for (e, x, at) in cuts {
            split.push(self.split_edge(e, x, at)?);
        }

        let (mut p1, mut p2) = (split[0], split[1]);
        let parent = &self.cells[c];
        let (mut i1, mut i2) = (
            parent.vertex_index(p1).ok_or_else(|| invalid_edit("split vertex missing from parent"))?,
            parent.vertex_index(p2).ok_or_else(|| invalid_edit("split vertex missing from parent"))?,
        );
        if i1 > i2 {
            std::mem::swap(&mut i1, &mut i2);
            std::mem::swap(&mut p1, &mut p2);
        }
        let (vs, es) = (parent.vertices.clone(), parent.edges.clone());

        let g = self.create_edge(p2, p1)?;

        let a_vertices = vs[i1..=i2].to_vec();
        let mut a_edges = es[i1..i2].to_vec();
        a_edges.push(g);

        let mut b_vertices = vs[i2..].to_vec();
        b_vertices.extend_from_slice(&vs[..=i1]);
        let mut b_edges = es[i2..].to_vec();
        b_edges.extend_from_slice(&es[..i1]);
        b_edges.push(g);

        let a = self.create_cell(a_vertices, a_edges)?;
        let b = self.create_cell(b_vertices, b_edges)?;
        self.destroy_cell(c)?;
        debug!(parent = %c, children = ?(a, b), "divided");
        Ok((a, b))
    }

    /// Inserts a new vertex on edge `e`.
    ///
    /// `e` keeps the `from` half and a new edge takes the other half. Every
    /// bordering cell gains the vertex and the new edge in sequence order.
    ///
    /// ### Parameters
    /// - `e` - Edge to split.
    /// - `from` - Endpoint of `e` that stays on it.
    /// - `at` - Position of the new vertex.
    fn split_edge(&mut self, e: EdgeId, from: VertexId, at: DVec2) -> Result<VertexId> {
        let to = self.edges[e]
            .other(from)
            .ok_or_else(|| invalid_edit(format!("{from} is not an endpoint of {e}")))?;
        let p = self.create_vertex(at)?;
        let f = self.create_edge(p, to)?;
        self.edge_swap_vertex(e, to, p)?;

        let junctions = self.edges[e].cells.clone();
        for j in junctions {
            let cell = &self.cells[j];
            let k = cell
                .edge_index(e)
                .ok_or_else(|| invalid_edit(format!("{j} lost {e}")))?;
            let forward = cell.vertices[k] == from;
            self.cell_new_vertex(j, p, k + 1)?;
            self.cell_new_edge(j, f, if forward { k + 1 } else { k })?;
        }
        Ok(p)
    }

    // ---------------------------------------------------------------------
    // T1
    // ---------------------------------------------------------------------

    /// Whether edge `e` can take part in a neighbour exchange: it borders two
    /// cells with more than three corners, and both endpoints are interior
    /// three-fold vertices whose third cells differ.
    pub fn is_flippable(&self, e: EdgeId) -> bool {
        let Some(edge) = self.edges.get(e) else {
            return false;
        };
        if edge.cells.len() != 2 || edge.cells.iter().any(|&c| self.cells[c].len() <= 3) {
            return false;
        }
        let (a, b) = edge.endpoints();
        let threefold = |v: VertexId| {
            let vx = &self.vertices[v];
            vx.edges.len() == 3
                && vx.cells.len() == 3
                && vx.edges.iter().all(|&x| self.edges[x].cells.len() == 2)
        };
        if !threefold(a) || !threefold(b) {
            return false;
        }
        match (self.third_cell(a, edge.cells[0], edge.cells[1]), self.third_cell(b, edge.cells[0], edge.cells[1])) {
            (Some(c3), Some(c4)) => c3 != c4,
            _ => false,
        }
    }

    fn third_cell(&self, v: VertexId, c1: CellId, c2: CellId) -> Option<CellId> {
        self.vertices[v].cells.iter().copied().find(|&c| c != c1 && c != c2)
    }

    /// The edge at `v`, other than `skip`, that borders `c`.
    fn edge_at_bordering(&self, v: VertexId, skip: EdgeId, c: CellId) -> Result<EdgeId> {
        self.vertices[v]
            .edges
            .iter()
            .copied()
            .find(|&x| x != skip && self.edges[x].cells.contains(&c))
            .ok_or_else(|| invalid_edit(format!("no edge at {v} borders {c}")))
    }

    /// Exchanges neighbours across edge `e`.
    ///
    /// The two cells bordering `e` stop sharing it; the two cells at its ends
    /// become neighbours across it. The endpoints are re-placed on the
    /// perpendicular through the old midpoint, `t1_length()` apart.
    pub fn t1_flip(&mut self, e: EdgeId) -> Result<()> {
        if !self.is_flippable(e) {
            return Err(invalid_edit(format!("{e} is not flippable")));
        }
        let (a, b) = self.edges[e].endpoints();
        let (c1, c2) = (self.edges[e].cells[0], self.edges[e].cells[1]);
        let c3 = self
            .third_cell(a, c1, c2)
            .ok_or_else(|| invalid_edit(format!("{a} has no third cell")))?;
        let c4 = self
            .third_cell(b, c1, c2)
            .ok_or_else(|| invalid_edit(format!("{b} has no third cell")))?;
        let ea_c2 = self.edge_at_bordering(a, e, c2)?;
        let eb_c1 = self.edge_at_bordering(b, e, c1)?;

        let (pa, pb) = (self.vertices[a].pos, self.vertices[b].pos);
        let mid = 0.5 * (pa + pb);
        let mut dir = (pb - pa).perp().normalize_or(DVec2::Y);
        let toward_c1 = geometry::centroid(&self.cell_points(c1)) - mid;
        if dir.dot(toward_c1) < 0.0 {
            dir = -dir;
        }

        self.edge_swap_vertex(eb_c1, b, a)?;
        self.edge_swap_vertex(ea_c2, a, b)?;
        self.cell_insert_beside(c3, a, ea_c2, b, e)?;
        self.cell_insert_beside(c4, b, eb_c1, a, e)?;
        self.cell_merge_edge(c1, e, a)?;
        self.cell_merge_edge(c2, e, b)?;

        let half = 0.5 * self.cfg.t1_length();
        self.vertices[a].pos = mid + dir * half;
        self.vertices[b].pos = mid - dir * half;
        self.order_cell_contacts(a);
        self.order_cell_contacts(b);
        debug!(edge = %e, lost = ?(c1, c2), gained = ?(c3, c4), "T1 flip");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Four-fold split
    // ---------------------------------------------------------------------

    /// Whether `v` is an interior vertex where exactly four cells and four
    /// edges meet.
    pub fn is_fourfold(&self, v: VertexId) -> bool {
        let Some(vx) = self.vertices.get(v) else {
            return false;
        };
        vx.edges.len() == 4
            && vx.cells.len() == 4
            && vx.edges.iter().all(|&e| self.edges[e].cells.len() == 2)
    }

    /// Resolves a four-fold vertex into two three-fold vertices joined by a
    /// new edge of length `t1_length()`.
    ///
    /// The new edge is shared by the opposite pair of cells whose centroids
    /// are closer; the other pair is separated.
    ///
    /// ### Returns
    /// The new vertex.
    pub fn split_fourfold(&mut self, v: VertexId) -> Result<VertexId> {
        if !self.is_fourfold(v) {
            return Err(invalid_edit(format!("{v} is not a four-fold vertex")));
        }
        self.order_cell_contacts(v);
        let mut ring: Vec<CellId> = self.vertices[v].cells.clone();
        let centroid = |t: &Self, c: CellId| geometry::centroid(&t.cell_points(c));
        let d02 = centroid(self, ring[0]).distance(centroid(self, ring[2]));
        let d13 = centroid(self, ring[1]).distance(centroid(self, ring[3]));
        if d02 < d13 {
            ring.rotate_left(1);
        }
        let [c0, c1, c2, c3] = [ring[0], ring[1], ring[2], ring[3]];

        let between = |t: &Self, x: CellId, y: CellId| {
            t.vertices[v]
                .edges
                .iter()
                .copied()
                .find(|&e| t.edges[e].cells.contains(&x) && t.edges[e].cells.contains(&y))
                .ok_or_else(|| degenerate(format!("cells {x} and {y} do not meet at {v}")))
        };
        let e12 = between(self, c1, c2)?;
        let e23 = between(self, c2, c3)?;

        let p = self.vertices[v].pos;
        let dir = (centroid(self, c0) - centroid(self, c2)).normalize_or(DVec2::X);
        let half = 0.5 * self.cfg.t1_length();

        let w = self.create_vertex(p - dir * half)?;
        let f = self.create_edge(v, w)?;
        self.edge_swap_vertex(e12, v, w)?;
        self.edge_swap_vertex(e23, v, w)?;
        self.cell_exchange_vertex(c2, v, w)?;
        self.cell_insert_beside(c1, v, e12, w, f)?;
        self.cell_insert_beside(c3, v, e23, w, f)?;

        self.vertices[v].pos = p + dir * half;
        self.order_cell_contacts(v);
        self.order_cell_contacts(w);
        debug!(vertex = %v, new_vertex = %w, "four-fold split");
        Ok(w)
    }

    // ---------------------------------------------------------------------
    // Passes
    // ---------------------------------------------------------------------

    /// Greedy first-come-first-served selection: cells matching `pick`, in
    /// slot order, skipping any cell that shares a vertex with one already
    /// selected.
    fn select_isolated(&self, pick: impl Fn(&Cell) -> bool) -> Vec<CellId> {
        let mut selected: Vec<CellId> = Vec::new();
        for (c, cell) in self.cells.iter() {
            if !pick(cell) {
                continue;
            }
            let touches_selected = cell
                .vertices
                .iter()
                .any(|&v| self.vertices[v].cells.iter().any(|x| selected.contains(x)));
            if !touches_selected {
                selected.push(c);
            }
        }
        selected
    }

    /// Extrudes every isolated cell with area below `min_area`, and every
    /// isolated cell whose area could not be computed.
    #[instrument(level = "debug", skip(self), fields(step = self.step))]
    pub fn extrusion_pass(&mut self) -> Result<PassOutcome> {
        let min_area = self.cfg.min_area;
        let mut outcome = PassOutcome::default();
        for c in self.select_isolated(|cell| cell.degenerate || cell.area < min_area) {
            match self.extrude(c) {
                Ok(_) => outcome.applied += 1,
                Err(TissueError::DegenerateGeometry(reason)) => {
                    warn!(cell = %c, %reason, "extrusion deferred");
                    outcome.deferred += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// Divides every isolated cell with area above `max_area`.
    #[instrument(level = "debug", skip(self), fields(step = self.step))]
    pub fn division_pass(&mut self) -> Result<PassOutcome> {
        let max_area = self.cfg.max_area;
        let mut outcome = PassOutcome::default();
        for c in self.select_isolated(|cell| !cell.degenerate && cell.area > max_area) {
            match self.divide(c) {
                Ok(_) => outcome.applied += 1,
                Err(TissueError::DegenerateGeometry(reason)) => {
                    warn!(cell = %c, %reason, "division deferred");
                    outcome.deferred += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// Flips the first flippable edge, in slot order, shorter than
    /// `min_edge_length`.
    ///
    /// ### Returns
    /// The flipped edge, if any.
    #[instrument(level = "debug", skip(self), fields(step = self.step))]
    pub fn t1_pass(&mut self) -> Result<Option<EdgeId>> {
        let threshold = self.cfg.min_edge_length;
        let candidate = self
            .edges
            .iter()
            .filter(|(_, edge)| edge.length < threshold)
            .map(|(e, _)| e)
            .find(|&e| self.is_flippable(e));
        match candidate {
            Some(e) => {
                self.t1_flip(e)?;
                Ok(Some(e))
            }
            None => Ok(None),
        }
    }

    /// Splits every interior four-fold vertex.
    ///
    /// ### Returns
    /// The number of vertices split.
    #[instrument(level = "debug", skip(self), fields(step = self.step))]
    pub fn fourfold_split_pass(&mut self) -> Result<usize> {
        let candidates: Vec<VertexId> = self.vertices.ids().collect();
        let mut splits = 0;
        for v in candidates {
            if !self.is_fourfold(v) {
                continue;
            }
            match self.split_fourfold(v) {
                Ok(_) => splits += 1,
                Err(TissueError::DegenerateGeometry(reason)) => {
                    warn!(vertex = %v, %reason, "four-fold split skipped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(splits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::seed::Seed;
    use approx::assert_relative_eq;

    fn everywhere(_: DVec2) -> bool {
        true
    }

    fn grid(nx: usize, ny: usize, cfg: Config) -> Tissue {
        Tissue::from_seed(cfg, &Seed::square_grid(nx, ny, 1.0), everywhere).unwrap()
    }

    /// Two pairs of cells around a short horizontal edge `a`-`b`.
    fn t1_patch(cfg: Config) -> Tissue {
        let a = DVec2::new(-0.05, 0.0);
        let b = DVec2::new(0.05, 0.0);
        let tl = DVec2::new(-2.0, 2.0);
        let tr = DVec2::new(2.0, 2.0);
        let br = DVec2::new(2.0, -2.0);
        let bl = DVec2::new(-2.0, -2.0);
        let seed = Seed::from_faces(vec![
            vec![a, b, tr, tl],
            vec![bl, br, b, a],
            vec![tl, bl, a],
            vec![br, tr, b],
        ]);
        Tissue::from_seed(cfg, &seed, everywhere).unwrap()
    }

    fn cell_at(t: &Tissue, p: DVec2) -> CellId {
        t.cells()
            .find(|(_, c)| c.centroid().distance(p) < 1e-9)
            .map(|(c, _)| c)
            .unwrap()
    }

    #[test]
    fn extruding_the_center_of_a_grid() {
        let mut t = grid(3, 3, Config::default());
        let center = cell_at(&t, DVec2::new(1.5, 1.5));

        let m = t.extrude(center).unwrap();

        assert_eq!(t.counts(), (13, 20, 8));
        assert_eq!(t.euler_characteristic(), 1);
        assert!(t.cell(center).is_none());
        let mv = t.vertex(m).unwrap();
        assert_eq!(mv.pos(), DVec2::new(1.5, 1.5));
        assert_eq!(mv.edge_contacts().len(), 8);
        assert_eq!(mv.cell_contacts().len(), 8);
        t.check_consistency().unwrap();
    }

    #[test]
    fn extrusion_pass_defers_cells_next_to_triangles() {
        let cfg = Config {
            min_area: 2.0,
            ..Config::default()
        };
        let mut t = grid(3, 3, cfg);

        let outcome = t.extrusion_pass().unwrap();

        assert_eq!(outcome, PassOutcome { applied: 2, deferred: 2 });
        assert_eq!(t.counts(), (10, 16, 7));
        assert_eq!(t.euler_characteristic(), 1);
        t.check_consistency().unwrap();
    }

    #[test]
    fn inverted_cell_is_extruded_even_without_min_area() {
        let cfg = Config {
            min_area: 0.0,
            ..Config::default()
        };
        let mut t = grid(2, 1, cfg);
        let left = cell_at(&t, DVec2::new(0.5, 0.5));
        let right = cell_at(&t, DVec2::new(1.5, 0.5));
        // Drag the free top-left corner across the shared edge.
        let corner = t
            .vertices()
            .find(|(_, v)| v.pos() == DVec2::new(0.0, 1.0))
            .map(|(v, _)| v)
            .unwrap();
        t.vertices[corner].pos = DVec2::new(2.0, 0.2);
        assert!(matches!(t.check_consistency(), Err(TissueError::BrokenInvariant(_))));

        crate::phases::geometry_phase(&mut t);
        assert!(t.cell(left).unwrap().is_degenerate());
        assert_eq!(t.cell(left).unwrap().area(), 0.0);

        let outcome = t.extrusion_pass().unwrap();

        assert_eq!(outcome, PassOutcome { applied: 1, deferred: 0 });
        assert!(t.cell(left).is_none());
        assert_eq!(t.cell(right).unwrap().len(), 3);
        assert_eq!(t.counts(), (3, 3, 1));
        t.check_consistency().unwrap();
    }

    #[test]
    fn lone_degenerate_cell_is_deferred_with_a_reason() {
        let cfg = Config {
            min_area: 0.0,
            ..Config::default()
        };
        let mut t = grid(1, 1, cfg);
        let ids: Vec<VertexId> = t.vertices.ids().collect();
        for v in ids {
            t.vertices[v].pos = DVec2::ZERO;
        }
        crate::phases::geometry_phase(&mut t);

        let c = t.cells().next().unwrap().0;
        assert!(matches!(t.extrude(c), Err(TissueError::DegenerateGeometry(_))));
        let outcome = t.extrusion_pass().unwrap();
        assert_eq!(outcome, PassOutcome { applied: 0, deferred: 1 });
        assert_eq!(t.counts(), (4, 4, 1));
    }

    #[test]
    fn extrusion_refuses_to_shrink_a_triangle() {
        let mut t = t1_patch(Config::default());
        let top = cell_at(&t, geometry::centroid(&[
            DVec2::new(-0.05, 0.0),
            DVec2::new(0.05, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(-2.0, 2.0),
        ]));
        // The triangles at both ends would lose two corners.
        assert!(matches!(t.extrude(top), Err(TissueError::DegenerateGeometry(_))));
        assert_eq!(t.counts(), (6, 9, 4));
        t.check_consistency().unwrap();
    }

    #[test]
    fn dividing_a_rectangle_across_its_long_axis() {
        let rect = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(0.0, 1.0),
        ];
        let mut t = Tissue::from_seed(Config::default(), &Seed::from_faces(vec![rect]), everywhere).unwrap();
        let (parent, _) = t.cells().next().unwrap();

        let (a, b) = t.divide(parent).unwrap();

        assert_eq!(t.counts(), (6, 7, 2));
        assert_eq!(t.euler_characteristic(), 1);
        assert!(t.cell(parent).is_none());
        for child in [a, b] {
            let pts = t.cell_points(child);
            assert_relative_eq!(geometry::signed_area(&pts), 1.0, epsilon = 1e-12);
        }
        assert!(t.common_edge(a, b).is_some());
        t.check_consistency().unwrap();
    }

    #[test]
    fn division_inserts_vertices_into_neighbours() {
        let cfg = Config {
            max_area: 0.5,
            ..Config::default()
        };
        let mut t = grid(1, 2, cfg);
        let before: f64 = t.cells().map(|(c, _)| geometry::signed_area(&t.cell_points(c))).sum();
        let upper = cell_at(&t, DVec2::new(0.5, 1.5));

        let outcome = t.division_pass().unwrap();

        // Both cells share a vertex, so only the first is taken this pass.
        assert_eq!(outcome, PassOutcome { applied: 1, deferred: 0 });
        assert_eq!(t.counts(), (8, 10, 3));
        // The cut crosses the shared edge, so the upper cell gains a corner.
        assert_eq!(t.cell(upper).unwrap().len(), 5);
        let after: f64 = t.cells().map(|(c, _)| geometry::signed_area(&t.cell_points(c))).sum();
        assert_relative_eq!(before, after, epsilon = 1e-12);
        t.check_consistency().unwrap();
    }

    #[test]
    fn t1_exchanges_bordering_pairs() {
        let cfg = Config {
            min_edge_length: 0.2,
            ..Config::default()
        };
        let mut t = t1_patch(cfg);
        t.check_consistency().unwrap();

        let short = t
            .edges()
            .find(|(_, e)| e.length() < 0.2)
            .map(|(e, _)| e)
            .unwrap();
        let [c1, c2] = [t.edge(short).unwrap().cell_junctions()[0], t.edge(short).unwrap().cell_junctions()[1]];
        let (a, b) = t.edge(short).unwrap().endpoints();
        let c3 = t.third_cell(a, c1, c2).unwrap();
        let c4 = t.third_cell(b, c1, c2).unwrap();

        assert_eq!(t.t1_pass().unwrap(), Some(short));

        assert_eq!(t.counts(), (6, 9, 4));
        assert_eq!(t.common_edge(c3, c4), Some(short));
        assert_eq!(t.common_edge(c1, c2), None);
        let (pa, pb) = (t.vertex(a).unwrap().pos(), t.vertex(b).unwrap().pos());
        assert_relative_eq!(pa.distance(pb), 0.3, epsilon = 1e-12);
        assert_relative_eq!(pa.x, 0.0, epsilon = 1e-12);
        t.check_consistency().unwrap();
        for (c, _) in t.cells() {
            assert!(geometry::signed_area(&t.cell_points(c)) > 0.0);
        }
    }

    #[test]
    fn t1_pass_ignores_boundary_edges() {
        let cfg = Config {
            min_edge_length: 10.0,
            ..Config::default()
        };
        let mut t = grid(2, 2, cfg);
        assert_eq!(t.t1_pass().unwrap(), None);
        assert!(t.t1_flip(EdgeId(0)).is_err());
    }

    #[test]
    fn fourfold_center_of_grid_is_split() {
        let cfg = Config {
            min_edge_length: 0.1,
            ..Config::default()
        };
        let mut t = grid(2, 2, cfg);
        let center = t
            .vertices()
            .find(|(_, v)| v.pos() == DVec2::new(1.0, 1.0))
            .map(|(v, _)| v)
            .unwrap();
        assert!(t.is_fourfold(center));

        assert_eq!(t.fourfold_split_pass().unwrap(), 1);

        assert_eq!(t.counts(), (10, 13, 4));
        assert_eq!(t.euler_characteristic(), 1);
        let v = t.vertex(center).unwrap();
        assert_eq!(v.edge_contacts().len(), 3);
        assert_eq!(v.cell_contacts().len(), 3);
        assert!(t.vertices().all(|(id, _)| !t.is_fourfold(id)));
        t.check_consistency().unwrap();
        for (c, _) in t.cells() {
            assert!(geometry::signed_area(&t.cell_points(c)) > 0.0);
        }
    }
}
