//! Image assembler: runs the viewport over every pixel
//!
//! Rows are independent, so they are filled in parallel on a rayon pool
//! owned by the [`Renderer`]. Each row writes straight into its slot of the
//! output buffer, so the bytes never depend on scheduling.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::RenderError;
use crate::frame::Frame;
use crate::scene::Scene;
use crate::viewport::Viewport;

pub struct Renderer {
    pool: Option<ThreadPool>,
}

impl Renderer {
    /// Create a renderer with `threads` workers.
    ///
    /// `0` picks one worker per core; `1` renders on the calling thread with no
    /// pool at all.
    pub fn new(threads: usize) -> Result<Self, RenderError> {
        if threads == 1 {
            return Ok(Self::sequential());
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("fog-rt-render-{}", i))
            .build()
            .map_err(|e| RenderError::Worker(e.to_string()))?;

        tracing::debug!(threads = pool.current_num_threads(), "Render pool started");

        Ok(Self { pool: Some(pool) })
    }

    /// Renderer that works through the rows in order on the calling thread
    pub fn sequential() -> Self {
        Self { pool: None }
    }

    pub fn threads(&self) -> usize {
        self.pool.as_ref().map_or(1, |p| p.current_num_threads())
    }

    /// Render every pixel of `viewport` into a row-major RGB frame
    pub fn render(&self, viewport: &Viewport, scene: &Scene) -> Frame {
        let width = viewport.width();
        let height = viewport.height();
        let row_len = width * 3;
        let mut pixels = vec![0u8; row_len * height];

        let fill_row = |(y, row): (usize, &mut [u8])| {
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                px.copy_from_slice(&viewport.pixel_color(scene, x, y).to_bytes());
            }
        };

        match &self.pool {
            Some(pool) => pool.install(|| {
                pixels.par_chunks_mut(row_len).enumerate().for_each(fill_row);
            }),
            None => pixels.chunks_mut(row_len).enumerate().for_each(fill_row),
        }

        Frame::from_parts(width, height, pixels)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("threads", &self.threads())
            .finish()
    }
}
