//! Orientational order of cell shapes and its topological defects.
//!
//! Each cell's shape defines a nematic director (its gyration tensor's major
//! axis). Walking once around a closed ring of cells and summing the signed
//! rotations of the director gives a multiple of `pi`; divided by `2 pi` this
//! is the winding number `m` of the director field inside the ring. Rotations
//! are measured in doubled-angle space, hence the `4 pi` below.

use std::f64::consts::PI;

use crate::tissue::Tissue;
use crate::types::{CellId, VertexId};

/// Winding numbers reported as defects.
pub const DEFECT_CHARGES: [f64; 4] = [0.5, -0.5, 1.0, -1.0];

/// Maximum distance from a defect charge.
pub const DEFECT_TOLERANCE: f64 = 1e-3;

pub fn is_defect(m: f64) -> bool {
    DEFECT_CHARGES.iter().any(|q| (m - q).abs() < DEFECT_TOLERANCE)
}

fn ring_charge(tissue: &Tissue, ring: &[CellId]) -> f64 {
    let n = ring.len();
    let total: f64 = (0..n)
        .map(|i| tissue.director_angle(ring[i], ring[(i + 1) % n]))
        .sum();
    total / (4.0 * PI)
}

/// Winding number of the directors of the cells around `c`.
///
/// `None` for cells on the tissue boundary, whose neighbour ring is open.
pub fn cell_charge(tissue: &Tissue, c: CellId) -> Option<f64> {
    let cell = tissue.cell(c)?;
    let closed = cell
        .edges()
        .iter()
        .all(|&e| tissue.edge(e).is_some_and(|edge| edge.cell_junctions().len() == 2));
    if !closed || cell.neighbours().len() < 3 {
        return None;
    }
    Some(ring_charge(tissue, cell.neighbours()))
}

/// Winding number of the directors of the cells meeting at `v`.
///
/// `None` for boundary vertices.
pub fn vertex_charge(tissue: &Tissue, v: VertexId) -> Option<f64> {
    let vertex = tissue.vertex(v)?;
    if vertex.is_boundary() || vertex.cell_contacts().len() < 3 {
        return None;
    }
    Some(ring_charge(tissue, vertex.cell_contacts()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geometry::SymTensor2;
    use crate::seed::Seed;
    use approx::assert_relative_eq;
    use glam::DVec2;

    fn director(theta: f64) -> SymTensor2 {
        let (s, c) = theta.sin_cos();
        SymTensor2 {
            xx: c * c,
            xy: s * c,
            yy: s * s,
        }
    }

    #[test]
    fn defect_thresholds() {
        assert!(is_defect(0.5));
        assert!(is_defect(-0.5005));
        assert!(is_defect(1.0));
        assert!(is_defect(-0.9995));
        assert!(!is_defect(0.0));
        assert!(!is_defect(0.25));
        assert!(!is_defect(0.502));
    }

    #[test]
    fn aligned_tissue_has_no_charge() {
        let seed = Seed::square_grid(3, 3, 1.0);
        let stretched = Seed::new(
            seed.points.iter().map(|p| DVec2::new(2.0 * p.x, p.y)).collect(),
            seed.faces
                .iter()
                .map(|f| f.iter().map(|p| DVec2::new(2.0 * p.x, p.y)).collect())
                .collect(),
        );
        let t = Tissue::from_seed(Config::default(), &stretched, |_| true).unwrap();

        let center = t
            .cells()
            .find(|(_, c)| c.centroid().distance(DVec2::new(3.0, 1.5)) < 1e-9)
            .map(|(c, _)| c)
            .unwrap();
        assert_relative_eq!(cell_charge(&t, center).unwrap(), 0.0);
        assert!(t.cells().filter(|&(c, _)| c != center).all(|(c, _)| cell_charge(&t, c).is_none()));
        assert!(t.cell_defects().is_empty());
        assert!(t.vertex_defects().is_empty());
    }

    #[test]
    fn half_turn_of_directors_is_a_half_defect() {
        let mut t = Tissue::from_seed(Config::default(), &Seed::square_grid(3, 3, 1.0), |_| true).unwrap();
        let center = t
            .cells()
            .find(|(_, c)| c.centroid().distance(DVec2::new(1.5, 1.5)) < 1e-9)
            .map(|(c, _)| c)
            .unwrap();
        let ring = t.cell(center).unwrap().neighbours().to_vec();
        assert_eq!(ring.len(), 4);
        // Directors turn by a quarter of a half turn from each ring cell to the next.
        for (k, &c) in ring.iter().enumerate() {
            t.cells[c].gyration = director(k as f64 * PI / 4.0);
        }

        let m = cell_charge(&t, center).unwrap();
        assert_relative_eq!(m, 0.5, epsilon = 1e-12);
        assert!(is_defect(m));
    }
}
