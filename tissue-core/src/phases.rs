//! Per-timestep simulation phases for the vertex model.
//!
//! [`Tissue::step`] runs them in this order:
//! 1. [`geometry_phase`]: edge lengths, cell shape descriptors, area and
//!    line tensions.
//! 2. [`force_phase`]: area and line forces accumulated on each vertex.
//! 3. [`integration_phase`]: explicit Euler move of every vertex, plus the
//!    random kick, followed by a geometry refresh.
//! 4. [`transition_phase`]: extrusion, division, T1 and four-fold split
//!    passes, then neighbourhood and geometry refresh if anything changed.
//! 5. [`order_phase`]: order field and defect lists, on output steps only.

use glam::DVec2;
use tracing::warn;

use crate::error::{Result, TissueError};
use crate::order;
use crate::tissue::{StepReport, Tissue};

/// Recomputes every derived geometric quantity from the current positions.
///
/// For each live cell: centroid, area, perimeter, gyration tensor, dominant
/// eigenpair and area tension `k_area * (A - A_0)`. A cell whose area
/// degenerates is logged and left with area 0, so the next extrusion pass
/// picks it up.
///
/// For each live edge: length, then line tension
/// `line_tension + k_line * sum(perimeters of bordering cells)`, which needs
/// the cell perimeters computed first.
pub fn geometry_phase(tissue: &mut Tissue) {
    let Tissue {
        cfg,
        vertices,
        edges,
        cells,
        step,
        ..
    } = tissue;

    for (c, cell) in cells.iter_mut() {
        let pts: Vec<DVec2> = cell.vertices.iter().map(|&v| vertices[v].pos).collect();
        cell.calc_centroid(&pts);
        if let Err(err) = cell.calc_area(&pts) {
            warn!(step = *step, cell = %c, %err, "degenerate cell");
        }
        cell.calc_perimeter(&pts);
        cell.calc_gyration_tensor(&pts);
        cell.calc_dominant_eigen();
        cell.calc_area_tension(cfg.k_area, cfg.target_area);
    }

    for (_, edge) in edges.iter_mut() {
        edge.calc_length(vertices[edge.v1].pos, vertices[edge.v2].pos);
        let perimeter_sum: f64 = edge.cells.iter().map(|&c| cells[c].perimeter).sum();
        edge.calc_tension(cfg.line_tension, cfg.k_line, perimeter_sum);
    }
}

/// Accumulates the mechanical forces on every vertex.
///
/// Requires an up-to-date [`geometry_phase`]. Positions are not changed.
///
/// - Area term, per cell and per corner `i`:
///   `-T_A * 0.5 * (y[i+1] - y[i-1], x[i-1] - x[i+1])`, the gradient of the
///   counter-clockwise cell area with respect to the corner, where
///   `T_A = k_area * (A - A_0)`. Degenerate cells exert no area force.
/// - Line term, per edge: each endpoint is pulled towards the other with
///   magnitude equal to the edge tension.
pub fn force_phase(tissue: &mut Tissue) {
    let Tissue {
        vertices,
        edges,
        cells,
        ..
    } = tissue;

    for (_, cell) in cells.iter() {
        if cell.degenerate {
            continue;
        }
        let n = cell.vertices.len();
        let scale = -cell.area_tension * 0.5;
        for i in 0..n {
            let prev = vertices[cell.vertices[(i + n - 1) % n]].pos;
            let next = vertices[cell.vertices[(i + 1) % n]].pos;
            let grad = DVec2::new(next.y - prev.y, prev.x - next.x);
            vertices[cell.vertices[i]].add_force(scale * grad);
        }
    }

    for (_, edge) in edges.iter() {
        let (p1, p2) = (vertices[edge.v1].pos, vertices[edge.v2].pos);
        let pull = edge.tension * (p2 - p1).normalize_or_zero();
        vertices[edge.v1].add_force(pull);
        vertices[edge.v2].add_force(-pull);
    }
}

/// Moves every vertex by `force * dt` plus the noise kick, clears the force
/// accumulators and refreshes the geometry.
///
/// ### Returns
/// `Err(BrokenInvariant)` if any vertex ends up at a non-finite position.
/// The run cannot recover from that, so it is reported instead of deferred.
pub fn integration_phase(tissue: &mut Tissue) -> Result<()> {
    {
        let Tissue {
            cfg, vertices, rng, ..
        } = &mut *tissue;
        for (_, v) in vertices.iter_mut() {
            v.apply_force(cfg.dt, cfg.noise, rng);
        }
        if let Some((v, vx)) = vertices.iter().find(|(_, vx)| !vx.pos.is_finite()) {
            return Err(TissueError::BrokenInvariant(format!(
                "{v} moved to non-finite position {}",
                vx.pos
            )));
        }
    }
    geometry_phase(tissue);
    Ok(())
}

/// Runs the topology transition passes in their fixed order.
///
/// 1. Extrusion of cells smaller than `min_area`.
/// 2. Division of cells larger than `max_area`.
/// 3. At most one T1 flip of an edge shorter than `min_edge_length`.
/// 4. Splitting of four-fold vertices.
///
/// Passes 3 and 4 are skipped when `min_edge_length` is zero. Neighbour
/// lists, contact order and geometry are refreshed after any pass that
/// changed topology, so later passes and the next step see current data.
///
/// ### Returns
/// The per-pass counts, or the first fatal error.
pub fn transition_phase(tissue: &mut Tissue) -> Result<StepReport> {
    let mut report = StepReport::default();

    let extruded = tissue.extrusion_pass()?;
    report.extrusions = extruded.applied;
    report.deferred += extruded.deferred;
    if extruded.applied > 0 {
        refresh_topology(tissue);
    }

    let divided = tissue.division_pass()?;
    report.divisions = divided.applied;
    report.deferred += divided.deferred;
    if divided.applied > 0 {
        refresh_topology(tissue);
    }

    if tissue.cfg.t1_enabled() {
        if tissue.t1_pass()?.is_some() {
            report.t1_flips = 1;
            refresh_topology(tissue);
        }
        report.splits = tissue.fourfold_split_pass()?;
        if report.splits > 0 {
            refresh_topology(tissue);
        }
    }
    Ok(report)
}

fn refresh_topology(tissue: &mut Tissue) {
    tissue.find_neighbours();
    geometry_phase(tissue);
}

/// Recomputes the order field `m` of every cell and vertex and rebuilds the
/// defect lists.
///
/// Entities on the tissue boundary get `m = 0` and are never defects.
pub fn order_phase(tissue: &mut Tissue) {
    let cell_ids: Vec<_> = tissue.cells.ids().collect();
    let vertex_ids: Vec<_> = tissue.vertices.ids().collect();

    let cell_m: Vec<f64> = cell_ids
        .iter()
        .map(|&c| order::cell_charge(tissue, c).unwrap_or(0.0))
        .collect();
    let vertex_m: Vec<f64> = vertex_ids
        .iter()
        .map(|&v| order::vertex_charge(tissue, v).unwrap_or(0.0))
        .collect();

    tissue.cell_defects.clear();
    for (&c, m) in cell_ids.iter().zip(cell_m) {
        tissue.cells[c].m = m;
        if order::is_defect(m) {
            tissue.cell_defects.push(c);
        }
    }
    tissue.vertex_defects.clear();
    for (&v, m) in vertex_ids.iter().zip(vertex_m) {
        tissue.vertices[v].m = m;
        if order::is_defect(m) {
            tissue.vertex_defects.push(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::seed::Seed;
    use approx::assert_relative_eq;

    fn unit_square(cfg: Config) -> Tissue {
        Tissue::from_seed(cfg, &Seed::square_grid(1, 1, 1.0), |_| true).unwrap()
    }

    fn total_force(t: &Tissue) -> DVec2 {
        t.vertices().map(|(_, v)| v.force()).sum()
    }

    #[test]
    fn geometry_phase_sets_tensions() {
        let cfg = Config {
            k_area: 2.0,
            target_area: 0.5,
            k_line: 0.1,
            line_tension: 0.3,
            ..Config::default()
        };
        let mut t = unit_square(cfg);
        geometry_phase(&mut t);

        let (_, cell) = t.cells().next().unwrap();
        assert_relative_eq!(cell.area_tension(), 1.0);
        for (_, e) in t.edges() {
            assert_relative_eq!(e.length(), 1.0);
            // One bordering cell of perimeter 4.
            assert_relative_eq!(e.tension(), 0.7, epsilon = 1e-12);
        }
    }

    #[test]
    fn compressed_cell_pushes_corners_outward() {
        let cfg = Config {
            target_area: 2.0,
            k_area: 1.0,
            k_line: 0.0,
            line_tension: 0.0,
            ..Config::default()
        };
        let mut t = unit_square(cfg);
        geometry_phase(&mut t);
        force_phase(&mut t);

        for (_, v) in t.vertices() {
            let outward = v.pos() - DVec2::splat(0.5);
            assert!(v.force().dot(outward) > 0.0);
            // T_A = -1, gradient magnitude 0.5 along each axis.
            assert_relative_eq!(v.force().length(), 0.5 * 2f64.sqrt(), epsilon = 1e-12);
        }
        assert_relative_eq!(total_force(&t).length(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn line_tension_pulls_corners_inward() {
        let cfg = Config {
            target_area: 1.0,
            k_line: 0.0,
            line_tension: 1.0,
            ..Config::default()
        };
        let mut t = unit_square(cfg);
        geometry_phase(&mut t);
        force_phase(&mut t);

        for (_, v) in t.vertices() {
            let inward = DVec2::splat(0.5) - v.pos();
            assert!(v.force().dot(inward) > 0.0);
            assert_relative_eq!(v.force().length(), 2f64.sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn integration_moves_by_force_times_dt() {
        let cfg = Config {
            target_area: 1.0,
            k_line: 0.0,
            line_tension: 1.0,
            dt: 0.1,
            noise: 0.0,
            ..Config::default()
        };
        let mut t = unit_square(cfg);
        geometry_phase(&mut t);
        force_phase(&mut t);
        integration_phase(&mut t).unwrap();

        let origin = t
            .vertices()
            .find(|(_, v)| v.displacement().x > 0.0 && v.displacement().y > 0.0)
            .map(|(_, v)| v)
            .unwrap();
        assert_relative_eq!(origin.pos().x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(origin.pos().y, 0.1, epsilon = 1e-12);
        assert_eq!(origin.force(), DVec2::ZERO);
        // Geometry is refreshed after the move.
        let (_, cell) = t.cells().next().unwrap();
        assert_relative_eq!(cell.area(), 0.8 * 0.8, epsilon = 1e-12);
    }

    #[test]
    fn non_finite_positions_stop_the_step() {
        let mut t = unit_square(Config::default());
        let v = t.vertices.ids().next().unwrap();
        t.vertices[v].pos = DVec2::new(f64::NAN, 0.0);

        assert!(matches!(integration_phase(&mut t), Err(TissueError::BrokenInvariant(_))));
        assert!(matches!(t.step(), Err(TissueError::BrokenInvariant(_))));
        assert_eq!(t.step_index(), 0);
    }

    #[test]
    fn degenerate_cells_exert_no_area_force() {
        let cfg = Config {
            target_area: 2.0,
            line_tension: 0.0,
            k_line: 0.0,
            ..Config::default()
        };
        let mut t = unit_square(cfg);
        // Mirror the square so it winds clockwise.
        let ids: Vec<_> = t.vertices.ids().collect();
        for v in ids {
            t.vertices[v].pos.x = -t.vertices[v].pos.x;
        }
        geometry_phase(&mut t);
        force_phase(&mut t);

        let (_, cell) = t.cells().next().unwrap();
        assert!(cell.is_degenerate());
        assert!(t.vertices().all(|(_, v)| v.force() == DVec2::ZERO));
    }

    #[test]
    fn transition_phase_without_candidates_reports_nothing() {
        let mut t = Tissue::from_seed(Config::default(), &Seed::hexagonal(3, 3, 0.6), |_| true).unwrap();
        let before = t.counts();
        let report = transition_phase(&mut t).unwrap();
        assert_eq!(report, StepReport::default());
        assert_eq!(t.counts(), before);
    }

    #[test]
    fn transition_phase_skips_t1_when_disabled() {
        let cfg = Config {
            min_edge_length: 0.0,
            min_area: 0.0,
            max_area: 10.0,
            ..Config::default()
        };
        let mut t = Tissue::from_seed(cfg, &Seed::square_grid(2, 2, 1.0), |_| true).unwrap();
        let report = transition_phase(&mut t).unwrap();
        assert_eq!(report.splits, 0);
        assert_eq!(t.counts(), (9, 12, 4));
    }

    #[test]
    fn order_phase_clears_stale_defects() {
        let mut t = Tissue::from_seed(Config::default(), &Seed::square_grid(3, 3, 1.0), |_| true).unwrap();
        t.cell_defects.push(crate::types::CellId(0));
        order_phase(&mut t);
        assert!(t.cell_defects().is_empty());
        assert!(t.cells().all(|(_, c)| c.m() == 0.0));
    }
}
