//! fog-rt: a CPU sphere ray caster with distance fog
//!
//! One ray per output pixel is cast from a fixed camera at the origin through
//! a viewport plane into a scene of spheres. Hits are shaded by the sphere's
//! color, faded by the squared distance between the hit point and the pixel
//! on the viewport plane.
//!
//! Features:
//! - Analytic ray-sphere intersection with a viewport-plane cutoff
//! - Cached per-pixel ray directions, rebuilt only when geometry changes
//! - Row-parallel rendering on an owned rayon pool
//! - Background render worker that drops superseded requests
//! - PPM output and a truecolor terminal viewer

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod params;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod stats;
pub mod terminal;
pub mod viewport;
pub mod worker;

pub use config::AppConfig;
pub use error::RenderError;
pub use frame::Frame;
pub use geometry::{Color, Vec3};
pub use params::RenderParameters;
pub use renderer::Renderer;
pub use scene::{Scene, SceneLayout, Sphere};
pub use session::{RenderOutput, RenderSession};
pub use viewport::Viewport;
pub use worker::RenderWorker;
