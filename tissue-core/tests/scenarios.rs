//! End-to-end scenarios driven through `Tissue::step` and `Tissue::run`.

use approx::assert_relative_eq;
use glam::DVec2;

use tissue_core::{Config, Seed, StepReport, Tissue, TissueError};

fn everywhere(_: DVec2) -> bool {
    true
}

/// Mechanics off: no area spring, no line tension.
fn frozen() -> Config {
    Config {
        k_area: 0.0,
        k_line: 0.0,
        line_tension: 0.0,
        noise: 0.0,
        min_area: 0.0,
        max_area: 100.0,
        min_edge_length: 0.0,
        ..Config::default()
    }
}

fn total_area(t: &Tissue) -> f64 {
    t.cells().map(|(_, c)| c.area()).sum()
}

#[test]
fn two_by_two_grid_at_target_area_stays_put() {
    let cfg = Config {
        k_area: 1.0,
        target_area: 1.0,
        ..frozen()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::square_grid(2, 2, 1.0), everywhere).unwrap();
    let before = t.snapshot();

    for _ in 0..10 {
        let report = t.step().unwrap();
        assert_eq!(report, StepReport::default());
    }

    let after = t.snapshot();
    assert_eq!(after.step, 10);
    assert_eq!(t.counts(), (9, 12, 4));
    for (a, b) in before.vertices.iter().zip(&after.vertices) {
        assert_eq!(a.id, b.id);
        assert_relative_eq!(a.pos.x, b.pos.x, epsilon = 1e-12);
        assert_relative_eq!(a.pos.y, b.pos.y, epsilon = 1e-12);
    }
    t.check_consistency().unwrap();
}

#[test]
fn short_edge_between_two_pairs_flips_once() {
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
    let cfg = Config {
        min_edge_length: 0.2,
        ..frozen()
    };
    let mut t = Tissue::from_seed(cfg, &seed, everywhere).unwrap();

    let left = t.cells().find(|(_, c)| c.len() == 3 && c.centroid().x < 0.0).unwrap().0;
    let right = t.cells().find(|(_, c)| c.len() == 3 && c.centroid().x > 0.0).unwrap().0;
    let top = t.cells().find(|(_, c)| c.len() == 4 && c.centroid().y > 0.0).unwrap().0;
    let bottom = t.cells().find(|(_, c)| c.len() == 4 && c.centroid().y < 0.0).unwrap().0;
    assert!(t.common_edge(top, bottom).is_some());
    assert!(t.common_edge(left, right).is_none());

    let report = t.step().unwrap();
    assert_eq!(report.t1_flips, 1);
    assert_eq!(t.counts(), (6, 9, 4));
    assert!(t.common_edge(top, bottom).is_none());
    let shared = t.common_edge(left, right).unwrap();
    assert_relative_eq!(t.edge(shared).unwrap().length(), 0.3, epsilon = 1e-12);
    t.check_consistency().unwrap();

    // The new edge is longer than the threshold: nothing more happens.
    let report = t.step().unwrap();
    assert_eq!(report, StepReport::default());
    assert_eq!(t.euler_characteristic(), 1);
}

#[test]
fn divisions_conserve_area() {
    let cfg = Config {
        max_area: 0.9,
        ..frozen()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::square_grid(3, 3, 1.0), everywhere).unwrap();
    let before = total_area(&t);

    let report = t.step().unwrap();

    // The four corner cells are the only ones that do not touch each other.
    assert_eq!(report.divisions, 4);
    assert_eq!(t.counts(), (24, 36, 13));
    assert_eq!(t.euler_characteristic(), 1);
    assert_relative_eq!(total_area(&t), before, epsilon = 1e-9);
    for (_, cell) in t.cells() {
        assert!(cell.signed_area() > 0.0);
    }
    t.check_consistency().unwrap();
}

#[test]
fn extrusions_reduce_counts_and_keep_euler() {
    let cfg = Config {
        min_area: 2.0,
        ..frozen()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::square_grid(3, 3, 1.0), everywhere).unwrap();

    let report = t.step().unwrap();

    assert_eq!(report.extrusions, 2);
    assert_eq!(report.deferred, 2);
    assert_eq!(t.counts(), (10, 16, 7));
    assert_eq!(t.euler_characteristic(), 1);
    t.check_consistency().unwrap();
}

#[test]
fn snapshots_are_pure_reads() {
    let cfg = Config {
        noise: 0.2,
        seed: 11,
        ..Config::default()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::hexagonal(4, 4, 0.6), everywhere).unwrap();
    for _ in 0..5 {
        t.step().unwrap();
    }
    let first = t.snapshot();
    let second = t.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.step, 5);
}

#[test]
fn run_emits_snapshots_on_interval_and_at_the_end() {
    let cfg = Config {
        timesteps: 25,
        output_interval: 10,
        ..Config::default()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::hexagonal(3, 3, 0.6), everywhere).unwrap();
    let mut steps = Vec::new();
    t.run(|snap| steps.push(snap.step)).unwrap();
    assert_eq!(steps, vec![10, 20, 25]);
    assert_eq!(t.step_index(), 25);
}

#[test]
fn same_seed_same_trajectory() {
    let cfg = Config {
        noise: 0.3,
        seed: 42,
        ..Config::default()
    };
    let seed = Seed::hexagonal(3, 4, 0.6);
    let mut x = Tissue::from_seed(cfg, &seed, everywhere).unwrap();
    let mut y = Tissue::from_seed(cfg, &seed, everywhere).unwrap();
    let mut z = Tissue::from_seed(Config { seed: 43, ..cfg }, &seed, everywhere).unwrap();
    for _ in 0..20 {
        x.step().unwrap();
        y.step().unwrap();
        z.step().unwrap();
    }
    assert_eq!(x.snapshot(), y.snapshot());
    assert_ne!(x.snapshot(), z.snapshot());
}

#[test]
fn noisy_hexagonal_tissue_keeps_its_invariants() {
    let cfg = Config {
        noise: 0.05,
        seed: 3,
        ..Config::default()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::hexagonal(5, 5, 0.6), everywhere).unwrap();
    for _ in 0..200 {
        t.step().unwrap();
        assert_eq!(t.euler_characteristic(), 1);
    }
    t.check_consistency().unwrap();
}

#[test]
fn running_out_of_slots_is_fatal() {
    let cfg = Config {
        max_area: 0.5,
        vertex_capacity: 5,
        ..frozen()
    };
    let mut t = Tissue::from_seed(cfg, &Seed::square_grid(1, 1, 1.0), everywhere).unwrap();
    assert!(matches!(t.step(), Err(TissueError::CapacityExceeded { .. })));
}
