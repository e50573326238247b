//! Vector and color types plus the analytic ray-sphere solver

use nalgebra::Vector3;

/// World-space vector. Doubles as a point, since every ray starts at the origin.
pub type Vec3 = Vector3<f64>;

/// 8-bit-per-channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `intensity`, truncating toward zero.
    ///
    /// Truncation (not rounding) is part of the output format and must stay
    /// bit-exact.
    pub fn scale(self, intensity: f64) -> Self {
        let intensity = intensity.clamp(0.0, 1.0);
        let channel = |c: u8| (intensity * f64::from(c)) as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_black(self) -> bool {
        self == Color::BLACK
    }
}

/// Intersect a ray leaving the origin along `direction` with a sphere.
///
/// Returns the ray parameter `t` of the nearest intersection strictly beyond
/// the viewport plane (`t > 1`), since `direction` is the unnormalized pixel
/// center and `t = 1` is the plane itself. Tangent rays, misses and spheres
/// lying entirely before the plane all yield `None`, as does a zero-length
/// direction.
pub fn intersect_ray_sphere(direction: &Vec3, center: &Vec3, radius: f64) -> Option<f64> {
    let qa = direction.norm_squared();
    // Zero-length or non-finite ray
    if qa == 0.0 || !qa.is_finite() {
        return None;
    }

    let qb = -2.0 * center.dot(direction);
    let qc = center.norm_squared() - radius * radius;

    let det = qb * qb - 4.0 * qa * qc;
    if det <= 0.0 {
        return None;
    }

    let denom = 2.0 * qa;
    let right = det.sqrt() / denom;
    let left = -qb / denom;

    let mut nearest: Option<f64> = None;
    for t in [left - right, left + right] {
        if t > 1.0 && nearest.map_or(true, |best| t < best) {
            nearest = Some(t);
        }
    }

    // Rounding can push a root that should sit on the plane back in front of it
    nearest.filter(|&t| t >= 1.0)
}
