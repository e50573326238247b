//! Scene definitions: spheres, the scene container and the scene builder

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::geometry::{intersect_ray_sphere, Color, Vec3};
use crate::params::RenderParameters;

/// Sphere primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
    color: Color,
}

impl Sphere {
    /// Create a sphere, rejecting non-finite centers and non-positive radii
    pub fn new(center: Vec3, radius: f64, color: Color) -> Result<Self, RenderError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(RenderError::InvalidSphere(format!(
                "radius must be finite and positive, got {}",
                radius
            )));
        }
        if !center.iter().all(|c| c.is_finite()) {
            return Err(RenderError::InvalidSphere(format!(
                "center must be finite, got ({}, {}, {})",
                center.x, center.y, center.z
            )));
        }
        Ok(Self { center, radius, color })
    }

    pub fn center(&self) -> &Vec3 {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Ray parameter of the nearest hit beyond the viewport plane
    pub fn intersect(&self, direction: &Vec3) -> Option<f64> {
        intersect_ray_sphere(direction, &self.center, self.radius)
    }
}

/// Nearest intersection of a ray with the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub t: f64,
    pub point: Vec3,
    pub color: Color,
}

/// Ordered set of sphere slots. Empty slots are skipped during intersection.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    spheres: Vec<Option<Sphere>>,
}

impl Scene {
    pub fn new(spheres: Vec<Option<Sphere>>) -> Self {
        Self { spheres }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_spheres(spheres: impl IntoIterator<Item = Sphere>) -> Self {
        Self::new(spheres.into_iter().map(Some).collect())
    }

    /// Present spheres in slot order
    pub fn spheres(&self) -> impl Iterator<Item = &Sphere> {
        self.spheres.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.spheres().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the nearest sphere hit along `direction`.
    ///
    /// On equal `t` the earlier slot wins.
    pub fn nearest_hit(&self, direction: &Vec3) -> Option<Hit> {
        let mut best: Option<(f64, Color)> = None;

        for sphere in self.spheres() {
            if let Some(t) = sphere.intersect(direction) {
                if best.map_or(true, |(best_t, _)| t < best_t) {
                    best = Some((t, sphere.color()));
                }
            }
        }

        best.map(|(t, color)| Hit {
            t,
            point: direction * t,
            color,
        })
    }
}

/// How the three spheres are arranged around the central one
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SceneLayout {
    /// Two satellites orbit the central sphere in the x/y plane by `rot`
    #[default]
    Orbit,
    /// Satellites sit above and below the central sphere; `rot` is ignored
    Stacked,
}

impl SceneLayout {
    /// Build the scene for this layout from the current parameters
    pub fn build(self, params: &RenderParameters) -> Result<Scene, RenderError> {
        match self {
            SceneLayout::Orbit => orbit_scene(params.s_distance, params.s_r, params.rot),
            SceneLayout::Stacked => stacked_scene(params.s_distance, params.s_r),
        }
    }
}

/// A green sphere with red and blue satellites orbiting it at twice its radius.
///
/// The blue satellite trails the red one by half a turn.
pub fn orbit_scene(s_distance: f64, s_r: f64, rot: f64) -> Result<Scene, RenderError> {
    let satellite = |degrees: f64, color: Color| {
        let theta = degrees.to_radians();
        Sphere::new(
            Vec3::new(
                s_r * 2.0 * theta.sin(),
                s_distance + s_r * 2.0 * theta.cos(),
                0.0,
            ),
            s_r / 2.0,
            color,
        )
    };

    Ok(Scene::from_spheres([
        satellite(rot, Color::RED)?,
        Sphere::new(Vec3::new(0.0, s_distance, 0.0), s_r, Color::GREEN)?,
        satellite(rot + 180.0, Color::BLUE)?,
    ]))
}

/// Red above, green in the middle, blue below, all at `s_distance`
pub fn stacked_scene(s_distance: f64, s_r: f64) -> Result<Scene, RenderError> {
    Ok(Scene::from_spheres([
        Sphere::new(Vec3::new(0.0, s_distance, 2.0 * s_r), s_r / 2.0, Color::RED)?,
        Sphere::new(Vec3::new(0.0, s_distance, 0.0), s_r, Color::GREEN)?,
        Sphere::new(Vec3::new(0.0, s_distance, -2.0 * s_r), s_r / 2.0, Color::BLUE)?,
    ]))
}
