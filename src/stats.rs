//! Per-render metrics and their text formats

use std::time::Duration;

use serde::Serialize;

use crate::config::StatsFormat;
use crate::frame::Frame;

/// Metrics collected for one rendered frame
#[derive(Debug, Clone, Serialize)]
pub struct RenderStats {
    pub width: usize,
    pub height: usize,
    /// Total pixel count
    pub pixels: usize,
    /// Pixels that hit a sphere and survived the fog
    pub lit_pixels: usize,
    /// Worker threads used for pixel rows
    pub threads: usize,
    /// Whether the pixel-center table had to be rebuilt for this frame
    pub viewport_rebuilt: bool,
    pub duration_ms: f64,
    pub pixels_per_sec: f64,
}

impl RenderStats {
    pub fn new(frame: &Frame, threads: usize, viewport_rebuilt: bool, elapsed: Duration) -> Self {
        let pixels = frame.width() * frame.height();
        let secs = elapsed.as_secs_f64();
        Self {
            width: frame.width(),
            height: frame.height(),
            pixels,
            lit_pixels: frame.lit_pixels(),
            threads,
            viewport_rebuilt,
            duration_ms: secs * 1000.0,
            pixels_per_sec: if secs > 0.0 { pixels as f64 / secs } else { 0.0 },
        }
    }

    /// Share of pixels that are not black, in percent
    pub fn coverage_percent(&self) -> f64 {
        if self.pixels == 0 {
            return 0.0;
        }
        self.lit_pixels as f64 * 100.0 / self.pixels as f64
    }
}

/// Format stats according to the configured format
pub fn format_stats(stats: &RenderStats, format: StatsFormat) -> String {
    match format {
        StatsFormat::Pretty => format_pretty(stats),
        StatsFormat::Json => format_json(stats),
        StatsFormat::Compact => format_compact(stats),
    }
}

fn format_pretty(s: &RenderStats) -> String {
    format!(
        r#"┌────────────────────────────────────────┐
│ Render Metrics                         │
├────────────────────────────────────────┤
│ Size:     {:>10} x {:<16}│
│ Lit:      {:>10} ({:5.1}%)          │
│ Threads:  {:>10}                   │
│ Viewport: {:>10}                   │
│ Time:     {:>10.2} ms                │
│ Rate:     {:>10.0} px/s              │
└────────────────────────────────────────┘
"#,
        s.width,
        s.height,
        s.lit_pixels,
        s.coverage_percent(),
        s.threads,
        if s.viewport_rebuilt { "rebuilt" } else { "reused" },
        s.duration_ms,
        s.pixels_per_sec,
    )
}

fn format_json(s: &RenderStats) -> String {
    serde_json::to_string(s).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

fn format_compact(s: &RenderStats) -> String {
    format!(
        "{}x{} lit={} threads={} viewport={} {:.2}ms {:.0}px/s",
        s.width,
        s.height,
        s.lit_pixels,
        s.threads,
        if s.viewport_rebuilt { "rebuilt" } else { "reused" },
        s.duration_ms,
        s.pixels_per_sec,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RenderStats {
        let frame = Frame::from_rgb(2, 2, vec![255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        RenderStats::new(&frame, 4, true, Duration::from_millis(2))
    }

    #[test]
    fn test_stats_from_frame() {
        let stats = sample();
        assert_eq!(stats.pixels, 4);
        assert_eq!(stats.lit_pixels, 1);
        assert!((stats.coverage_percent() - 25.0).abs() < 1e-9);
        assert!((stats.duration_ms - 2.0).abs() < 1e-9);
        assert!((stats.pixels_per_sec - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_elapsed() {
        let frame = Frame::from_rgb(1, 1, vec![0, 0, 0]).unwrap();
        let stats = RenderStats::new(&frame, 1, false, Duration::ZERO);
        assert_eq!(stats.pixels_per_sec, 0.0);
    }

    #[test]
    fn test_format_json() {
        let out = format_stats(&sample(), StatsFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["width"], 2);
        assert_eq!(value["lit_pixels"], 1);
        assert_eq!(value["viewport_rebuilt"], true);
    }

    #[test]
    fn test_format_compact() {
        let out = format_stats(&sample(), StatsFormat::Compact);
        assert!(out.starts_with("2x2 lit=1 threads=4 viewport=rebuilt"));
    }

    #[test]
    fn test_format_pretty() {
        let out = format_stats(&sample(), StatsFormat::Pretty);
        assert!(out.contains("Render Metrics"));
        assert!(out.contains("rebuilt"));
    }
}
