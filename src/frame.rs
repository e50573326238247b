//! Rendered RGB frame and PPM output

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::geometry::Color;

/// Flat row-major RGB888 image, three bytes per pixel, no row padding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap an RGB buffer. Returns `None` if the length does not match the
    /// dimensions.
    pub fn from_rgb(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        let expected = width.checked_mul(height)?.checked_mul(3)?;
        (pixels.len() == expected).then_some(Self { width, height, pixels })
    }

    /// Caller guarantees `pixels.len() == width * height * 3`
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height * 3);
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGB bytes, row 0 first
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        Some(Color::new(self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]))
    }

    /// Iterate pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Color> + '_ {
        self.pixels
            .chunks_exact(3)
            .map(|px| Color::new(px[0], px[1], px[2]))
    }

    /// Number of pixels that are not pure black
    pub fn lit_pixels(&self) -> usize {
        self.pixels().filter(|c| !c.is_black()).count()
    }

    /// Write as binary PPM (P6)
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.pixels)?;
        out.flush()
    }

    pub fn save_ppm<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_ppm(BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Frame {
        Frame::from_rgb(2, 2, vec![255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_from_rgb_length_check() {
        assert!(Frame::from_rgb(2, 2, vec![0; 12]).is_some());
        assert!(Frame::from_rgb(2, 2, vec![0; 11]).is_none());
        assert!(Frame::from_rgb(usize::MAX, 2, Vec::new()).is_none());
    }

    #[test]
    fn test_pixel_access() {
        let frame = checker();
        assert_eq!(frame.pixel(0, 0), Some(Color::RED));
        assert_eq!(frame.pixel(1, 1), Some(Color::BLUE));
        assert_eq!(frame.pixel(1, 0), Some(Color::BLACK));
        assert_eq!(frame.pixel(2, 0), None);
        assert_eq!(frame.lit_pixels(), 2);
    }

    #[test]
    fn test_write_ppm() {
        let mut out = Vec::new();
        checker().write_ppm(&mut out).unwrap();

        let header = b"P6\n2 2\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], checker().as_bytes());
    }

    #[test]
    fn test_save_ppm() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("frame.ppm");
        checker().save_ppm(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n2 2\n255\n"));
        assert_eq!(bytes.len(), 11 + 12);
    }
}
