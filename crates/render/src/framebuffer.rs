use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);
}

/// A row-major RGBA raster. Pixel `(x, y)` lives at index `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    /// A fully transparent raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Returns `false` when `(x, y)` lies outside the raster.
    pub fn set(&mut self, x: u32, y: u32, color: Rgba) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Change the dimensions. Contents are reset to transparent.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Rgba::TRANSPARENT);
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Binary PPM (`P6`). Alpha is dropped.
    pub fn to_ppm(&self) -> Vec<u8> {
        let mut out = format!("P6\n{} {}\n255\n", self.width, self.height).into_bytes();
        out.reserve(self.pixels.len() * 3);
        for p in &self.pixels {
            out.extend_from_slice(&p.0[..3]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let fb = Framebuffer::new(3, 2);
        assert_eq!(fb.len(), 6);
        assert!(fb.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_set_get_row_major() {
        let mut fb = Framebuffer::new(3, 2);
        let red = Rgba([255, 0, 0, 255]);
        assert!(fb.set(2, 1, red));
        assert_eq!(fb.get(2, 1), Some(red));
        assert_eq!(fb.pixels()[5], red);
        assert!(!fb.set(3, 0, red));
        assert_eq!(fb.get(0, 2), None);
    }

    #[test]
    fn test_resize_clears() {
        let mut fb = Framebuffer::new(2, 2);
        fb.fill(Rgba([1, 2, 3, 4]));
        fb.resize(4, 1);
        assert_eq!((fb.width(), fb.height(), fb.len()), (4, 1, 4));
        assert!(fb.pixels().iter().all(|p| *p == Rgba::TRANSPARENT));
    }

    #[test]
    fn test_ppm_drops_alpha() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set(0, 0, Rgba([1, 2, 3, 4]));
        fb.set(1, 0, Rgba([5, 6, 7, 8]));
        let ppm = fb.to_ppm();
        assert!(ppm.starts_with(b"P6\n2 1\n255\n"));
        assert!(ppm.ends_with(&[1, 2, 3, 5, 6, 7]));
    }
}
