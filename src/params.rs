//! Render parameters supplied by the caller for each frame

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Scalar render settings, read once per render request
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RenderParameters {
    /// World units per output pixel
    #[serde(default = "default_pixel_size")]
    pub pixel_size: f64,
    /// Offset of the viewport plane along the viewing (y) axis
    #[serde(default = "default_vp_distance")]
    pub vp_distance: f64,
    /// Distance of the central sphere along the viewing axis
    #[serde(default = "default_s_distance")]
    pub s_distance: f64,
    /// Central sphere radius; the satellites scale from it
    #[serde(default = "default_s_r")]
    pub s_r: f64,
    /// Distance at which fog fades a hit to black
    #[serde(default = "default_fog")]
    pub fog: f64,
    /// Orbital angle of the satellite spheres, in degrees
    #[serde(default)]
    pub rot: f64,
    #[serde(default = "default_dimension")]
    pub width: usize,
    #[serde(default = "default_dimension")]
    pub height: usize,
}

fn default_pixel_size() -> f64 {
    0.096
}

fn default_vp_distance() -> f64 {
    4.214
}

fn default_s_distance() -> f64 {
    35.0
}

fn default_s_r() -> f64 {
    25.0
}

fn default_fog() -> f64 {
    15.0
}

fn default_dimension() -> usize {
    100
}

impl Default for RenderParameters {
    fn default() -> Self {
        Self {
            pixel_size: default_pixel_size(),
            vp_distance: default_vp_distance(),
            s_distance: default_s_distance(),
            s_r: default_s_r(),
            fog: default_fog(),
            rot: 0.0,
            width: default_dimension(),
            height: default_dimension(),
        }
    }
}

impl RenderParameters {
    /// Check every field against its valid range.
    ///
    /// Called before any pixel work so an invalid request never produces a
    /// partial image.
    pub fn validate(&self) -> Result<(), RenderError> {
        let positive = [
            ("pixel_size", self.pixel_size),
            ("vp_distance", self.vp_distance),
            ("s_distance", self.s_distance),
            ("s_r", self.s_r),
            ("fog", self.fog),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::not_positive(name, value));
            }
        }

        if !(self.rot.is_finite() && (0.0..360.0).contains(&self.rot)) {
            return Err(RenderError::InvalidParameter {
                name: "rot",
                value: self.rot,
                reason: "must be in [0, 360) degrees",
            });
        }

        self.byte_len()?;
        Ok(())
    }

    /// Length of the RGB buffer these dimensions produce
    pub fn byte_len(&self) -> Result<usize, RenderError> {
        let invalid = RenderError::InvalidDimensions {
            width: self.width,
            height: self.height,
        };
        if self.width == 0 || self.height == 0 {
            return Err(invalid);
        }
        self.width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(invalid)
    }

    /// Move one slider by `steps` increments, clamped to the slider's range.
    /// Rotation wraps around instead of clamping.
    pub fn adjust(&mut self, slider: Slider, steps: i32) {
        let (min, max, step) = slider.range();
        let delta = step * f64::from(steps);
        match slider {
            Slider::PixelSize => self.pixel_size = (self.pixel_size + delta).clamp(min, max),
            Slider::VpDistance => self.vp_distance = (self.vp_distance + delta).clamp(min, max),
            Slider::SphereDistance => self.s_distance = (self.s_distance + delta).clamp(min, max),
            Slider::SphereRadius => self.s_r = (self.s_r + delta).clamp(min, max),
            Slider::Fog => self.fog = (self.fog + delta).clamp(min, max),
            Slider::Rotation => {
                // rem_euclid can round up to exactly `max` for tiny negatives
                let rot = (self.rot + delta).rem_euclid(max);
                self.rot = if rot >= max { min } else { rot };
            }
        }
    }
}

/// Interactive controls over individual render parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slider {
    PixelSize,
    VpDistance,
    SphereDistance,
    SphereRadius,
    Fog,
    Rotation,
}

impl Slider {
    /// (min, max, step) for this slider
    pub fn range(self) -> (f64, f64, f64) {
        match self {
            Slider::PixelSize => (0.01, 1.0, 0.004),
            Slider::VpDistance => (0.01, 5.0, 0.05),
            Slider::SphereDistance => (1.0, 100.0, 1.0),
            Slider::SphereRadius => (1.0, 100.0, 1.0),
            Slider::Fog => (1.0, 200.0, 1.0),
            Slider::Rotation => (0.0, 360.0, 5.0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slider::PixelSize => "pixel size",
            Slider::VpDistance => "viewport distance",
            Slider::SphereDistance => "sphere distance",
            Slider::SphereRadius => "sphere radius",
            Slider::Fog => "fog",
            Slider::Rotation => "rotation",
        }
    }
}
