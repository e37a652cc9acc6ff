//! Initial tessellations and their ingestion into a [`Tissue`].
//!
//! A [`Seed`] is plain data: a point set and faces given as ordered position
//! lists. Faces are matched to points by exact coordinates, so builders must
//! produce bitwise-identical positions for shared corners. The lattice
//! builders below compute every coordinate from integer lattice indices for
//! that reason.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use glam::DVec2;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, TissueError};
use crate::geometry;
use crate::phases;
use crate::tissue::Tissue;
use crate::types::{CellId, EdgeId, VertexId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Seed {
    pub points: Vec<DVec2>,
    pub faces: Vec<Vec<DVec2>>,
}

impl Seed {
    pub fn new(points: Vec<DVec2>, faces: Vec<Vec<DVec2>>) -> Self {
        Self { points, faces }
    }

    /// Builds a seed whose point set is every distinct face corner.
    pub fn from_faces(faces: Vec<Vec<DVec2>>) -> Self {
        let mut seen = BTreeSet::new();
        let mut points = Vec::new();
        for p in faces.iter().flatten() {
            if seen.insert(point_key(*p)) {
                points.push(*p);
            }
        }
        Self { points, faces }
    }

    /// `nx` by `ny` axis-aligned squares of side `side`, lower-left corner at
    /// the origin.
    pub fn square_grid(nx: usize, ny: usize, side: f64) -> Self {
        let at = |i: usize, j: usize| DVec2::new(i as f64 * side, j as f64 * side);
        let mut points = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(at(i, j));
            }
        }
        let mut faces = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                faces.push(vec![at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
            }
        }
        Self { points, faces }
    }

    /// `rows` by `cols` regular pointy-top hexagons of side `side`, odd rows
    /// shifted right by half a cell.
    pub fn hexagonal(rows: usize, cols: usize, side: f64) -> Self {
        // Lattice units: half a hexagon width along x, half a side along y.
        let ux = side * 3f64.sqrt() / 2.0;
        let uy = side / 2.0;
        const CORNERS: [(i64, i64); 6] = [(1, 1), (0, 2), (-1, 1), (-1, -1), (0, -2), (1, -1)];

        let at = |(ix, iy): (i64, i64)| DVec2::new(ix as f64 * ux, iy as f64 * uy);
        let mut lattice = BTreeSet::new();
        let mut faces = Vec::with_capacity(rows * cols);
        for row in 0..rows as i64 {
            for col in 0..cols as i64 {
                let center = (2 * col + (row & 1), 3 * row);
                let corners: Vec<(i64, i64)> = CORNERS
                    .iter()
                    .map(|&(dx, dy)| (center.0 + dx, center.1 + dy))
                    .collect();
                lattice.extend(corners.iter().copied());
                faces.push(corners.into_iter().map(at).collect());
            }
        }
        let points = lattice.into_iter().map(at).collect();
        Self { points, faces }
    }

    /// Axis-aligned bounding box of the point set as `(min, max)`.
    pub fn bounds(&self) -> Option<(DVec2, DVec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}

fn point_key(p: DVec2) -> (u64, u64) {
    (p.x.to_bits(), p.y.to_bits())
}

fn seeding(msg: impl Into<String>) -> TissueError {
    TissueError::Seeding(msg.into())
}

impl Tissue {
    /// Builds a tissue from a seed.
    ///
    /// 1. Creates one vertex per distinct point.
    /// 2. For every face: resolves corners to vertices by exact coordinates,
    ///    drops consecutive repeats, skips faces left with fewer than three
    ///    corners or zero area, reverses clockwise faces and creates the cell
    ///    with shared edges deduplicated.
    /// 3. Removes every cell with a corner outside `contains`, then every
    ///    vertex left without a cell.
    /// 4. Derives neighbourhoods and geometry and logs the Euler
    ///    characteristic, warning when it is not 1.
    ///
    /// ### Parameters
    /// - `cfg` - Simulation parameters; its capacities size the arenas.
    /// - `seed` - Points and faces to ingest.
    /// - `contains` - Domain test; cells with any corner for which it
    ///   returns `false` are dropped.
    ///
    /// ### Returns
    /// - `Err(Seeding)` for a face corner missing from the point set, a
    ///   non-finite point, a corner repeated within a face or an edge shared
    ///   by more than two faces.
    /// - `Err(CapacityExceeded)` if the seed does not fit the arenas.
    pub fn from_seed(cfg: Config, seed: &Seed, contains: impl Fn(DVec2) -> bool) -> Result<Tissue> {
        let mut tissue = Tissue::new(cfg);

        let mut by_point: HashMap<(u64, u64), VertexId> = HashMap::with_capacity(seed.points.len());
        for &p in &seed.points {
            if !p.is_finite() {
                return Err(seeding(format!("point {p} is not finite")));
            }
            if let Entry::Vacant(slot) = by_point.entry(point_key(p)) {
                slot.insert(tissue.create_vertex(p)?);
            }
        }

        let mut by_pair: HashMap<(VertexId, VertexId), EdgeId> = HashMap::new();
        let mut skipped = 0usize;
        for (f, face) in seed.faces.iter().enumerate() {
            let mut ids: Vec<VertexId> = Vec::with_capacity(face.len());
            for &p in face {
                let v = *by_point
                    .get(&point_key(p))
                    .ok_or_else(|| seeding(format!("face {f} uses point {p} missing from the point set")))?;
                if ids.last() != Some(&v) {
                    ids.push(v);
                }
            }
            while ids.len() > 1 && ids.first() == ids.last() {
                ids.pop();
            }
            if ids.len() < 3 {
                debug!(face = f, corners = ids.len(), "skipping face with fewer than 3 corners");
                skipped += 1;
                continue;
            }
            if ids.iter().enumerate().any(|(i, v)| ids[..i].contains(v)) {
                return Err(seeding(format!("face {f} visits a corner twice")));
            }

            let pts: Vec<DVec2> = ids.iter().map(|&v| tissue.vertices[v].pos).collect();
            let area = geometry::signed_area(&pts);
            if area == 0.0 {
                debug!(face = f, "skipping face with zero area");
                skipped += 1;
                continue;
            }
            if area < 0.0 {
                ids.reverse();
            }

            let n = ids.len();
            let mut edges = Vec::with_capacity(n);
            for i in 0..n {
                let (a, b) = (ids[i], ids[(i + 1) % n]);
                let key = (a.min(b), a.max(b));
                if let Some(&e) = by_pair.get(&key) {
                    if tissue.edges[e].cells.len() >= 2 {
                        return Err(seeding(format!("face {f} is the third face on edge {a}-{b}")));
                    }
                    edges.push(e);
                } else {
                    let e = tissue.create_edge(a, b)?;
                    by_pair.insert(key, e);
                    edges.push(e);
                }
            }
            tissue.create_cell(ids, edges)?;
        }

        let outside: Vec<CellId> = tissue
            .cells
            .iter()
            .filter(|(_, cell)| cell.vertices.iter().any(|&v| !contains(tissue.vertices[v].pos)))
            .map(|(c, _)| c)
            .collect();
        for &c in &outside {
            tissue.destroy_cell(c)?;
        }
        let orphans: Vec<VertexId> = tissue
            .vertices
            .iter()
            .filter(|(_, v)| v.cells.is_empty())
            .map(|(v, _)| v)
            .collect();
        for v in orphans {
            tissue.destroy_vertex(v);
        }

        tissue.find_neighbours();
        phases::geometry_phase(&mut tissue);
        phases::order_phase(&mut tissue);

        let (v, e, c) = tissue.counts();
        let euler = tissue.euler_characteristic();
        info!(
            vertices = v,
            edges = e,
            cells = c,
            euler,
            skipped_faces = skipped,
            outside_cells = outside.len(),
            "tissue seeded"
        );
        if euler != 1 {
            warn!(euler, "seeded tissue is not a single simply connected patch");
        }
        Ok(tissue)
    }
}
