//! Planar geometry helpers shared by edges, cells and the transition engine.
//!
//! Polygons are given as ordered point slices; the closing segment from the
//! last point back to the first is implied.

use glam::DVec2;

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.perp_dot(b)
}

/// Signed shoelace area. Positive for counter-clockwise winding.
pub fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        acc += cross(points[i], points[(i + 1) % n]);
    }
    0.5 * acc
}

pub fn perimeter(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].distance(points[(i + 1) % n]))
        .sum()
}

/// Area-weighted polygon centroid.
///
/// Falls back to the vertex mean when the polygon has (numerically) zero area.
pub fn centroid(points: &[DVec2]) -> DVec2 {
    let n = points.len();
    if n == 0 {
        return DVec2::ZERO;
    }
    let a = signed_area(points);
    if a.abs() < 1e-12 {
        return vertex_mean(points);
    }
    let mut c = DVec2::ZERO;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        c += (p + q) * cross(p, q);
    }
    c / (6.0 * a)
}

pub fn vertex_mean(points: &[DVec2]) -> DVec2 {
    if points.is_empty() {
        return DVec2::ZERO;
    }
    points.iter().copied().sum::<DVec2>() / points.len() as f64
}

/// Symmetric 2x2 tensor stored as its three independent entries
/// `[[xx, xy], [xy, yy]]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SymTensor2 {
    pub xx: f64,
    pub xy: f64,
    pub yy: f64,
}

impl SymTensor2 {
    /// Gyration tensor of `points` about `center`: the mean of the outer
    /// products of the offsets.
    pub fn gyration(points: &[DVec2], center: DVec2) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let mut g = Self::default();
        for &p in points {
            let d = p - center;
            g.xx += d.x * d.x;
            g.xy += d.x * d.y;
            g.yy += d.y * d.y;
        }
        let n = points.len() as f64;
        Self {
            xx: g.xx / n,
            xy: g.xy / n,
            yy: g.yy / n,
        }
    }

    /// Both eigenvalues, largest first.
    pub fn eigenvalues(&self) -> (f64, f64) {
        let mean = 0.5 * (self.xx + self.yy);
        let half_diff = 0.5 * (self.xx - self.yy);
        let r = (half_diff * half_diff + self.xy * self.xy).sqrt();
        (mean + r, mean - r)
    }

    /// Largest eigenvalue and its unit eigenvector.
    ///
    /// For an isotropic tensor every direction is an eigenvector; the x axis
    /// is returned so the choice is deterministic.
    pub fn dominant_eigen(&self) -> (f64, DVec2) {
        let (lambda, _) = self.eigenvalues();
        let dir = if self.xy.abs() > 1e-14 {
            DVec2::new(lambda - self.yy, self.xy).normalize_or_zero()
        } else if self.xx >= self.yy {
            DVec2::X
        } else {
            DVec2::Y
        };
        (lambda, dir)
    }

    /// Traceless part as a doubled-angle vector `(xx - yy, 2 xy)`.
    ///
    /// Its polar angle is twice the orientation of the major axis, which makes
    /// it insensitive to the head/tail ambiguity of a director.
    #[inline]
    pub fn nematic(&self) -> DVec2 {
        DVec2::new(self.xx - self.yy, 2.0 * self.xy)
    }
}

/// Signed rotation, in doubled-angle space, taking nematic vector `a` to `b`.
///
/// Returns zero if either vector vanishes (isotropic shape).
pub fn nematic_angle(a: DVec2, b: DVec2) -> f64 {
    if a.length_squared() < 1e-24 || b.length_squared() < 1e-24 {
        return 0.0;
    }
    cross(a, b).atan2(a.dot(b))
}

/// Even-odd point-in-polygon test.
pub fn contains_point(points: &[DVec2], p: DVec2) -> bool {
    let n = points.len();
    let mut inside = false;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + n - 1) % n];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
    }
    inside
}

/// Angle of `p` around `center`, in `(-pi, pi]`.
#[inline]
pub fn polar_angle(center: DVec2, p: DVec2) -> f64 {
    let d = p - center;
    d.y.atan2(d.x)
}
