//! Glyph value types: normalized bitmaps, page locations and bounds.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::engine::EngineError;

/// Top-left corner of a glyph in page coordinates.
///
/// Ordered row-major: by `y` first, then by `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub x: u32,
    pub y: u32,
}

impl Location {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned rectangle in page coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A pixel pattern cropped to its tight bounding box, plus the string it
/// was recognized as (if any).
///
/// Equality and hashing only look at the bitmap and its dimensions, so a
/// recognized glyph still matches the same shape fresh out of segmentation.
#[derive(Clone, Debug)]
pub struct Glyph {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    text: Option<String>,
}

/// Largest glyph bitmap accepted from a catalog, in pixels.
pub const MAX_GLYPH_PIXELS: usize = 1 << 20;

/// `width * height` in `usize`, or `None` if it overflows.
fn pixel_count(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

impl Glyph {
    /// Build a glyph from a row-major bitmap.
    pub fn new(width: u32, height: u32, bits: Vec<bool>) -> Result<Self, EngineError> {
        if width == 0 || height == 0 {
            return Err(EngineError::InvalidInput(format!(
                "glyph dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if pixel_count(width, height) != Some(bits.len()) {
            return Err(EngineError::InvalidInput(format!(
                "glyph bitmap has {} bits, expected {width}x{height}",
                bits.len()
            )));
        }
        Ok(Self { width, height, bits, text: None })
    }

    /// Build a glyph from the offsets of its "on" bits in a row-major bitmap
    /// of the given width. The height is implied by the largest offset.
    ///
    /// This is the catalog form, so every failure is
    /// [`EngineError::InvalidCatalog`]. Bitmaps over [`MAX_GLYPH_PIXELS`]
    /// are rejected.
    pub fn from_on_bits(on_bits: &[u32], width: u32) -> Result<Self, EngineError> {
        if width == 0 {
            return Err(EngineError::InvalidCatalog("glyph width must be non-zero".to_string()));
        }
        let max = on_bits
            .iter()
            .copied()
            .max()
            .ok_or_else(|| EngineError::InvalidCatalog("glyph has no on bits".to_string()))?;

        let rows = max as usize / width as usize + 1;
        let size = (width as usize)
            .checked_mul(rows)
            .filter(|&n| n <= MAX_GLYPH_PIXELS)
            .ok_or_else(|| {
                EngineError::InvalidCatalog(format!(
                    "glyph of width {width} and {rows} rows exceeds {MAX_GLYPH_PIXELS} pixels"
                ))
            })?;
        // Bounded by MAX_GLYPH_PIXELS, so it fits.
        let height = rows as u32;

        let mut bits = vec![false; size];
        for &offset in on_bits {
            bits[offset as usize] = true;
        }
        Ok(Self { width, height, bits, text: None })
    }

    /// Crop a set of page pixels to their tight bounding box.
    ///
    /// Returns the glyph together with the top-left corner of the box, or
    /// `None` for an empty pixel set.
    pub fn from_pixels(pixels: &[(u32, u32)]) -> Option<(Location, Self)> {
        let first = pixels.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.0, first.1, first.0, first.1);
        for &(x, y) in pixels {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let width = max_x - min_x + 1;
        let height = max_y - min_y + 1;
        let mut bits = vec![false; width as usize * height as usize];
        for &(x, y) in pixels {
            bits[(y - min_y) as usize * width as usize + (x - min_x) as usize] = true;
        }

        Some((
            Location::new(min_x, min_y),
            Self { width, height, bits, text: None },
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offsets of the "on" bits, in row-major order.
    pub fn on_bits(&self) -> Vec<u32> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &on)| on)
            .map(|(i, _)| i as u32)
            .collect()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn without_text(mut self) -> Self {
        self.text = None;
        self
    }

    /// Bounds of this glyph when placed at `location`.
    pub fn bounds_at(&self, location: Location) -> Bounds {
        Bounds::new(location.x, location.y, self.width, self.height)
    }
}

impl PartialEq for Glyph {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.bits == other.bits
    }
}

impl Eq for Glyph {}

impl Hash for Glyph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.bits.hash(state);
    }
}

/// Renders the bitmap as `#`/`.` rows, one per line.
impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.bits.chunks(self.width as usize) {
            for &on in row {
                f.write_str(if on { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn glyph_from_art(rows: &[&str]) -> Glyph {
    let width = rows[0].len() as u32;
    let bits = rows
        .iter()
        .flat_map(|r| r.chars().map(|c| c == '#'))
        .collect();
    Glyph::new(width, rows.len() as u32, bits).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_location_orders_by_row_then_column() {
        let mut locs = vec![
            Location::new(50, 10),
            Location::new(5, 30),
            Location::new(5, 10),
        ];
        locs.sort();
        assert_eq!(
            locs,
            vec![Location::new(5, 10), Location::new(50, 10), Location::new(5, 30)]
        );
    }

    #[test]
    fn test_equality_ignores_text() {
        let a = glyph_from_art(&["#.#", "###"]);
        let b = glyph_from_art(&["#.#", "###"]).with_text("H");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_same_bits_different_width_are_distinct() {
        let wide = Glyph::new(4, 1, vec![true; 4]).unwrap();
        let tall = Glyph::new(1, 4, vec![true; 4]).unwrap();
        assert_ne!(wide, tall);
    }

    #[test]
    fn test_on_bits_round_trip() {
        let g = glyph_from_art(&[".#.", "#.#", ".#."]);
        assert_eq!(g.on_bits(), vec![1, 3, 5, 7]);
        let back = Glyph::from_on_bits(&g.on_bits(), 3).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.height(), 3);
    }

    #[test]
    fn test_from_pixels_crops_to_tight_box() {
        let (loc, g) = Glyph::from_pixels(&[(10, 7), (12, 8), (11, 7)]).unwrap();
        assert_eq!(loc, Location::new(10, 7));
        assert_eq!((g.width(), g.height()), (3, 2));
        assert_eq!(g.to_string(), "##.\n..#\n");
    }

    #[test]
    fn test_from_on_bits_rejects_empty() {
        assert!(Glyph::from_on_bits(&[], 3).is_err());
        assert!(Glyph::from_on_bits(&[1], 0).is_err());
    }

    #[test]
    fn test_from_on_bits_rejects_oversized_bitmaps() {
        for (bits, width) in [(vec![u32::MAX], 65536), (vec![u32::MAX], 1), (vec![0, 1 << 21], 2)] {
            assert!(matches!(
                Glyph::from_on_bits(&bits, width),
                Err(EngineError::InvalidCatalog(_))
            ));
        }
        // Exactly at the limit is fine.
        let g = Glyph::from_on_bits(&[MAX_GLYPH_PIXELS as u32 - 1], 1024).unwrap();
        assert_eq!((g.width(), g.height()), (1024, 1024));
    }

    #[test]
    fn test_new_rejects_mismatched_bitmap_as_input_error() {
        assert!(matches!(Glyph::new(0, 2, vec![]), Err(EngineError::InvalidInput(_))));
        assert!(matches!(
            Glyph::new(2, 2, vec![true; 3]),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            Glyph::new(u32::MAX, u32::MAX, vec![true]),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
