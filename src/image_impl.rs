//! Raster loading and thresholding into binary pixel masks

use image::{DynamicImage, GrayImage};
use std::path::Path;

use crate::engine::EngineError;
use crate::glyph::Bounds;

/// Bit depth of the rendered raster handed to the thresholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BitDepth {
    /// Single-bit rasters such as extracted overlays, stored as 0/1 (or 0/255) luma.
    One,
    /// Ordinary 8-bit grayscale renderings.
    #[default]
    Eight,
}

impl BitDepth {
    /// A pixel is foreground when its value is strictly above this.
    pub fn threshold(self) -> u8 {
        match self {
            BitDepth::One => 0,
            BitDepth::Eight => 127,
        }
    }
}

/// Width x height foreground/background grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl PixelMask {
    /// Threshold a grayscale raster that was already windowed by the renderer.
    pub fn threshold(img: &GrayImage, depth: BitDepth) -> Self {
        let (width, height) = img.dimensions();
        let cutoff = depth.threshold();
        let data = img.pixels().map(|p| p[0] > cutoff).collect();
        Self { width, height, data }
    }

    pub fn from_dynamic(img: &DynamicImage, depth: BitDepth) -> Self {
        Self::threshold(&img.to_luma8(), depth)
    }

    pub fn from_bits(width: u32, height: u32, data: Vec<bool>) -> Result<Self, EngineError> {
        if data.len() != (width as usize) * (height as usize) {
            return Err(EngineError::InvalidInput(format!(
                "mask data has {} pixels, expected {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(0, 0, self.width, self.height)
    }

    /// Foreground test; out-of-bounds pixels are background.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.data[(y * self.width + x) as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = on;
        }
    }

    pub fn count_on(&self) -> usize {
        self.data.iter().filter(|&&on| on).count()
    }
}

pub fn imread<P: AsRef<Path>>(path: P) -> Result<DynamicImage, EngineError> {
    let img = image::open(path)?;
    Ok(img)
}

pub fn imread_mask<P: AsRef<Path>>(path: P, depth: BitDepth) -> Result<PixelMask, EngineError> {
    let img = imread(path)?;
    Ok(PixelMask::from_dynamic(&img, depth))
}

pub fn decode_mask(bytes: &[u8], depth: BitDepth) -> Result<PixelMask, EngineError> {
    let img = image::load_from_memory(bytes)?;
    Ok(PixelMask::from_dynamic(&img, depth))
}

/// Build a mask from `#`/`.` art, one string per row.
#[cfg(test)]
pub(crate) fn mask_from_art(rows: &[&str]) -> PixelMask {
    let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
    let data = rows
        .iter()
        .flat_map(|r| r.chars().map(|c| c == '#'))
        .collect();
    PixelMask::from_bits(width, rows.len() as u32, data).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_eight_bit_threshold_is_strictly_above_127() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([127]));
        img.put_pixel(1, 0, Luma([128]));
        img.put_pixel(2, 0, Luma([255]));

        let mask = PixelMask::threshold(&img, BitDepth::Eight);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(mask.get(2, 0));
    }

    #[test]
    fn test_one_bit_threshold_is_any_nonzero() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(1, 0, Luma([1]));

        let mask = PixelMask::threshold(&img, BitDepth::One);
        assert!(!mask.get(0, 0));
        assert!(mask.get(1, 0));

        // The same raster read as 8-bit has no foreground at all.
        assert_eq!(PixelMask::threshold(&img, BitDepth::Eight).count_on(), 0);
    }

    #[test]
    fn test_out_of_bounds_is_background() {
        let mask = mask_from_art(&["##", "##"]);
        assert!(mask.get(1, 1));
        assert!(!mask.get(2, 0));
        assert!(!mask.get(0, 2));
    }

    #[test]
    fn test_from_bits_checks_length() {
        assert!(PixelMask::from_bits(2, 2, vec![true; 3]).is_err());
    }
}
