//! Viewport: pixel → ray mapping and fog shading
//!
//! The camera sits at the origin looking down +y. The viewport plane is
//! perpendicular to the y axis at `vp_distance`; x grows to the right and z
//! grows upward, so row 0 of the image is the highest z.

use crate::error::RenderError;
use crate::geometry::{Color, Vec3};
use crate::params::RenderParameters;
use crate::scene::Scene;

/// Fixed camera position
pub const CAMERA_ORIGIN: Vec3 = Vec3::new(0.0, 0.0, 0.0);

/// Parameters that determine the cached pixel-center table.
///
/// Any change here requires a new [`Viewport`]; everything else can reuse it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportKey {
    pub width: usize,
    pub height: usize,
    pub pixel_size: f64,
    /// Center of the viewport plane
    pub center: Vec3,
}

impl From<&RenderParameters> for ViewportKey {
    fn from(params: &RenderParameters) -> Self {
        Self {
            width: params.width,
            height: params.height,
            pixel_size: params.pixel_size,
            center: Vec3::new(0.0, params.vp_distance, 0.0),
        }
    }
}

/// Read-only viewport with every pixel's ray direction precomputed
#[derive(Debug, Clone)]
pub struct Viewport {
    key: ViewportKey,
    max_distance: f64,
    pixel_centers: Vec<Vec3>,
}

impl Viewport {
    /// Build a viewport whose plane is centered at `center`.
    ///
    /// `max_distance` is the fog distance used by [`Viewport::shade`].
    pub fn new(
        center: Vec3,
        pixel_size: f64,
        width: usize,
        height: usize,
        max_distance: f64,
    ) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        // The table holds width * height vectors and frames need 3 bytes each
        if width.checked_mul(height).and_then(|n| n.checked_mul(3)).is_none() {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if !(pixel_size.is_finite() && pixel_size > 0.0) {
            return Err(RenderError::not_positive("pixel_size", pixel_size));
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(RenderError::not_positive("fog", max_distance));
        }
        if !center.iter().all(|c| c.is_finite()) {
            return Err(RenderError::InvalidParameter {
                name: "vp_distance",
                value: center.y,
                reason: "viewport center must be finite",
            });
        }

        let pixel_centers = compute_pixel_centers(&center, pixel_size, width, height);

        let degenerate = pixel_centers
            .iter()
            .filter(|c| !c.iter().all(|v| v.is_finite()) || c.norm_squared() == 0.0)
            .count();
        if degenerate > 0 {
            tracing::warn!(
                degenerate,
                width,
                height,
                pixel_size,
                "Viewport has unusable pixel rays, they render black"
            );
        }

        tracing::debug!(width, height, pixel_size, center_y = center.y, "Built viewport");

        Ok(Self {
            key: ViewportKey {
                width,
                height,
                pixel_size,
                center,
            },
            max_distance,
            pixel_centers,
        })
    }

    /// Build the viewport for a parameter set: plane at `(0, vp_distance, 0)`
    pub fn from_params(params: &RenderParameters) -> Result<Self, RenderError> {
        Self::new(
            Vec3::new(0.0, params.vp_distance, 0.0),
            params.pixel_size,
            params.width,
            params.height,
            params.fog,
        )
    }

    /// Same pixel table with a different fog distance
    pub fn with_max_distance(self, max_distance: f64) -> Result<Self, RenderError> {
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(RenderError::not_positive("fog", max_distance));
        }
        Ok(Self { max_distance, ..self })
    }

    pub fn key(&self) -> ViewportKey {
        self.key
    }

    pub fn width(&self) -> usize {
        self.key.width
    }

    pub fn height(&self) -> usize {
        self.key.height
    }

    pub fn pixel_size(&self) -> f64 {
        self.key.pixel_size
    }

    pub fn camera(&self) -> Vec3 {
        CAMERA_ORIGIN
    }

    pub fn center(&self) -> &Vec3 {
        &self.key.center
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Pixel center on the viewport plane, which is also the ray direction
    pub fn pixel_center(&self, x: usize, y: usize) -> Option<&Vec3> {
        if x >= self.key.width || y >= self.key.height {
            return None;
        }
        self.pixel_centers.get(y * self.key.width + x)
    }

    /// Shaded color seen through pixel `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the viewport.
    pub fn pixel_color(&self, scene: &Scene, x: usize, y: usize) -> Color {
        assert!(
            x < self.key.width && y < self.key.height,
            "pixel ({}, {}) outside {}x{} viewport",
            x,
            y,
            self.key.width,
            self.key.height
        );
        let pixel_center = &self.pixel_centers[y * self.key.width + x];

        match scene.nearest_hit(pixel_center) {
            Some(hit) => self.shade(hit.color, &hit.point, pixel_center),
            None => Color::BLACK,
        }
    }

    /// Fade `color` by the squared distance between the hit point and the
    /// pixel center the ray was cast through. Reaches black at the fog
    /// distance.
    pub fn shade(&self, color: Color, hit_point: &Vec3, pixel_center: &Vec3) -> Color {
        let max_sq = self.max_distance * self.max_distance;
        let dist_sq = (hit_point - pixel_center).norm_squared().min(max_sq);
        color.scale(1.0 - dist_sq / max_sq)
    }
}

/// Row-major table of pixel centers for a plane centered at `center`
fn compute_pixel_centers(center: &Vec3, pixel_size: f64, width: usize, height: usize) -> Vec<Vec3> {
    let world_width = pixel_size * width as f64;
    let world_height = pixel_size * height as f64;

    // Outer edges of the top-left pixel
    let left = center.x - world_width / 2.0;
    let top = center.z + world_height / 2.0;
    let half = pixel_size / 2.0;

    let mut centers = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            centers.push(Vec3::new(
                left + pixel_size * x as f64 + half,
                center.y,
                top - pixel_size * y as f64 - half,
            ));
        }
    }
    centers
}
