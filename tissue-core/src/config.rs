/// Simulation parameters, consumed as plain values.
///
/// Mechanical constants follow the usual vertex-model energy
/// `k_area/2 (A - A_0)^2` per cell plus line tension per edge, where the
/// tension of an edge is `line_tension + k_line * (sum of bordering cell
/// perimeters)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Target cell area `A_0`.
    pub target_area: f64,
    /// Area spring constant `k_A`.
    pub k_area: f64,
    /// Perimeter contribution to edge tension `k_L`.
    pub k_line: f64,
    /// Baseline edge tension `T_l_0`.
    pub line_tension: f64,

    /// Edges shorter than this are T1 candidates. Zero disables T1 flips and
    /// four-fold splits.
    pub min_edge_length: f64,
    /// Length of the edge produced by a T1 flip or a four-fold split, as a
    /// multiple of `min_edge_length`.
    pub t1_length_factor: f64,
    /// Cells below this area are extruded.
    pub min_area: f64,
    /// Cells above this area divide.
    pub max_area: f64,

    /// Explicit-Euler timestep.
    pub dt: f64,
    /// Number of steps performed by [`crate::tissue::Tissue::run`].
    pub timesteps: u64,
    /// Magnitude of the random vertex kick per `sqrt(dt)`.
    pub noise: f64,
    /// Seed for the tissue RNG.
    pub seed: u64,
    /// The order field is refreshed and a snapshot emitted every this many steps.
    pub output_interval: u64,

    pub vertex_capacity: usize,
    pub edge_capacity: usize,
    pub cell_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_area: 1.0,
            k_area: 1.0,
            k_line: 0.04,
            line_tension: 0.12,
            min_edge_length: 0.05,
            t1_length_factor: 1.5,
            min_area: 0.1,
            max_area: 2.0,
            dt: 0.01,
            timesteps: 10_000,
            noise: 0.0,
            seed: 0,
            output_interval: 10,
            vertex_capacity: 6_000,
            edge_capacity: 9_000,
            cell_capacity: 3_000,
        }
    }
}

impl Config {
    /// Length given to the edge created by a T1 flip or four-fold split.
    #[inline]
    pub fn t1_length(&self) -> f64 {
        self.min_edge_length * self.t1_length_factor
    }

    /// Whether the T1 machinery (flip and four-fold split) is active.
    #[inline]
    pub fn t1_enabled(&self) -> bool {
        self.min_edge_length > 0.0
    }
}
