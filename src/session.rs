//! Render session: one retained viewport plus the rebuild-on-change policy

use std::time::Instant;

use crate::error::RenderError;
use crate::frame::Frame;
use crate::params::RenderParameters;
use crate::renderer::Renderer;
use crate::scene::SceneLayout;
use crate::stats::RenderStats;
use crate::viewport::{Viewport, ViewportKey};

/// A rendered frame and the metrics gathered while producing it
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub frame: Frame,
    pub stats: RenderStats,
}

/// Renders parameter sets one after another, reusing the pixel-center table
/// while width, height, pixel size and viewport distance stay the same.
#[derive(Debug)]
pub struct RenderSession {
    renderer: Renderer,
    layout: SceneLayout,
    viewport: Option<Viewport>,
    viewport_builds: usize,
}

impl RenderSession {
    pub fn new(renderer: Renderer, layout: SceneLayout) -> Self {
        Self {
            renderer,
            layout,
            viewport: None,
            viewport_builds: 0,
        }
    }

    pub fn layout(&self) -> SceneLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: SceneLayout) {
        self.layout = layout;
    }

    /// How many times the viewport table has been built
    pub fn viewport_builds(&self) -> usize {
        self.viewport_builds
    }

    /// Validate `params`, build the scene and render a full frame.
    ///
    /// Nothing is rendered if validation fails.
    pub fn render(&mut self, params: &RenderParameters) -> Result<RenderOutput, RenderError> {
        params.validate()?;
        let scene = self.layout.build(params)?;
        let rebuilt = self.prepare_viewport(params)?;

        let Some(viewport) = self.viewport.as_ref() else {
            return Err(RenderError::InvalidDimensions {
                width: params.width,
                height: params.height,
            });
        };

        let start = Instant::now();
        let frame = self.renderer.render(viewport, &scene);
        let stats = RenderStats::new(&frame, self.renderer.threads(), rebuilt, start.elapsed());

        tracing::debug!(
            width = stats.width,
            height = stats.height,
            lit_pixels = stats.lit_pixels,
            duration_ms = stats.duration_ms,
            viewport_rebuilt = rebuilt,
            "Frame rendered"
        );

        Ok(RenderOutput { frame, stats })
    }

    /// Make sure the retained viewport matches `params`. Returns true when the
    /// pixel-center table was rebuilt.
    fn prepare_viewport(&mut self, params: &RenderParameters) -> Result<bool, RenderError> {
        let key = ViewportKey::from(params);

        match self.viewport.take() {
            Some(viewport) if viewport.key() == key => {
                let viewport = if viewport.max_distance() == params.fog {
                    viewport
                } else {
                    viewport.with_max_distance(params.fog)?
                };
                self.viewport = Some(viewport);
                Ok(false)
            }
            previous => {
                if let Some(old) = previous {
                    tracing::debug!(old = ?old.key(), new = ?key, "Viewport parameters changed");
                }
                self.viewport = Some(Viewport::from_params(params)?);
                self.viewport_builds += 1;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;

    fn params() -> RenderParameters {
        RenderParameters {
            pixel_size: 0.5,
            vp_distance: 1.0,
            s_distance: 100.0,
            s_r: 10.0,
            fog: 1000.0,
            rot: 0.0,
            width: 31,
            height: 21,
        }
    }

    fn session() -> RenderSession {
        RenderSession::new(Renderer::sequential(), SceneLayout::Orbit)
    }

    #[test]
    fn test_render_produces_full_frame() {
        let out = session().render(&params()).unwrap();
        assert_eq!(out.frame.width(), 31);
        assert_eq!(out.frame.height(), 21);
        assert_eq!(out.frame.as_bytes().len(), 31 * 21 * 3);
        assert!(out.stats.viewport_rebuilt);
        assert!(out.stats.lit_pixels > 0);
    }

    #[test]
    fn test_invalid_params_render_nothing() {
        let mut session = session();
        let bad = RenderParameters { height: 0, ..params() };
        assert!(matches!(session.render(&bad), Err(RenderError::InvalidDimensions { .. })));
        assert_eq!(session.viewport_builds(), 0);

        let bad = RenderParameters { fog: -1.0, ..params() };
        assert!(session.render(&bad).is_err());
        assert_eq!(session.viewport_builds(), 0);
    }

    #[test]
    fn test_viewport_reused_for_scene_changes() {
        let mut session = session();
        session.render(&params()).unwrap();

        let moved = RenderParameters { rot: 45.0, s_r: 12.0, s_distance: 80.0, ..params() };
        let out = session.render(&moved).unwrap();
        assert!(!out.stats.viewport_rebuilt);
        assert_eq!(session.viewport_builds(), 1);
    }

    #[test]
    fn test_fog_change_reuses_table_but_applies() {
        let mut session = session();
        let near = session.render(&params()).unwrap();

        let foggy = RenderParameters { fog: 50.0, ..params() };
        let far = session.render(&foggy).unwrap();
        assert!(!far.stats.viewport_rebuilt);
        assert_eq!(session.viewport_builds(), 1);

        // Hits sit ~75 units away, past the new fog distance
        assert!(near.stats.lit_pixels > 0);
        assert_eq!(far.stats.lit_pixels, 0);
    }

    #[test]
    fn test_viewport_rebuilt_for_geometry_changes() {
        let mut session = session();
        session.render(&params()).unwrap();

        for changed in [
            RenderParameters { width: 32, ..params() },
            RenderParameters { height: 22, ..params() },
            RenderParameters { pixel_size: 0.4, ..params() },
            RenderParameters { vp_distance: 2.0, ..params() },
        ] {
            let out = session.render(&changed).unwrap();
            assert!(out.stats.viewport_rebuilt);
        }
        assert_eq!(session.viewport_builds(), 5);
    }

    #[test]
    fn test_reused_viewport_matches_fresh_render() {
        let mut reused = session();
        reused.render(&params()).unwrap();
        let changed = RenderParameters { rot: 90.0, fog: 500.0, ..params() };
        let a = reused.render(&changed).unwrap();

        let b = session().render(&changed).unwrap();
        assert_eq!(a.frame, b.frame);
    }

    #[test]
    fn test_repeat_render_is_identical() {
        let mut session = RenderSession::new(Renderer::new(3).unwrap(), SceneLayout::Orbit);
        let a = session.render(&params()).unwrap();
        let b = session.render(&params()).unwrap();
        assert_eq!(a.frame, b.frame);
    }

    #[test]
    fn test_half_turn_swaps_satellites() {
        let mut session = session();
        let p0 = params();
        let p180 = RenderParameters { rot: 180.0, ..params() };

        let a = session.render(&p0).unwrap().frame;
        let b = session.render(&p180).unwrap().frame;
        assert_ne!(a, b);

        // The center pixel looks straight down +y: the satellite in front of
        // the green sphere is blue at rot = 0 and red at rot = 180
        let center_a = a.pixel(15, 10).unwrap();
        let center_b = b.pixel(15, 10).unwrap();
        assert!(center_a.b > 0 && center_a.r == 0 && center_a.g == 0);
        assert!(center_b.r > 0 && center_b.b == 0 && center_b.g == 0);
    }

    #[test]
    fn test_quarter_turns_mirror_satellites() {
        let mut session = session();
        let p = RenderParameters {
            pixel_size: 0.02,
            s_distance: 60.0,
            s_r: 8.0,
            ..params()
        };

        let mean_x = |frame: &Frame, color: Color| {
            let mut sum = 0usize;
            let mut count = 0usize;
            for y in 0..frame.height() {
                for x in 0..frame.width() {
                    let px = frame.pixel(x, y).unwrap();
                    let dominant = match color {
                        Color::RED => px.r > 0 && px.g == 0 && px.b == 0,
                        _ => px.b > 0 && px.g == 0 && px.r == 0,
                    };
                    if dominant {
                        sum += x;
                        count += 1;
                    }
                }
            }
            assert!(count > 0, "no {:?} pixels", color);
            sum as f64 / count as f64
        };

        let right = session.render(&RenderParameters { rot: 90.0, ..p }).unwrap().frame;
        let left = session.render(&RenderParameters { rot: 270.0, ..p }).unwrap().frame;
        let mid = (right.width() - 1) as f64 / 2.0;

        assert!(mean_x(&right, Color::RED) > mid);
        assert!(mean_x(&right, Color::BLUE) < mid);
        assert!(mean_x(&left, Color::RED) < mid);
        assert!(mean_x(&left, Color::BLUE) > mid);
    }

    #[test]
    fn test_stacked_layout_ignores_rotation() {
        let mut session = RenderSession::new(Renderer::sequential(), SceneLayout::Stacked);
        let a = session.render(&params()).unwrap().frame;
        let b = session.render(&RenderParameters { rot: 123.0, ..params() }).unwrap().frame;
        assert_eq!(a, b);
        assert_eq!(session.layout(), SceneLayout::Stacked);
    }
}
