// Gap-tolerant connected-component segmentation
// Splits a binary mask into glyph-sized blobs for dictionary lookup

use log::trace;

use crate::glyph::{Bounds, Glyph, Location};
use crate::image_impl::PixelMask;
use crate::types::SegmentConfig;

/// The connectivity search grew past `SegmentConfig::max_connections`.
///
/// Seen when a page is not validly thresholded for the vendor's tolerances,
/// e.g. a mis-windowed rendering that turns the background into foreground.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("exceeded maximum connections ({limit}) growing blob from {seed}; image likely not validly thresholded")]
pub struct ConnectionOverflow {
    pub seed: Location,
    pub limit: usize,
}

/// Order in which seed pixels are visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    /// Top-to-bottom, then left-to-right within a row.
    RowMajor,
    /// Left-to-right, then top-to-bottom within a column.
    ColumnMajor,
}

/// A connected component cropped to its bounding box.
#[derive(Clone, Debug)]
pub struct Blob {
    pub location: Location,
    pub glyph: Glyph,
}

impl Blob {
    pub fn bounds(&self) -> Bounds {
        self.glyph.bounds_at(self.location)
    }
}

/// Find all blobs of `mask` inside `region`.
///
/// Two foreground pixels belong to the same blob when they are within
/// `horizontal_gap_tolerance` columns and `vertical_gap_tolerance` rows of
/// each other, transitively. Pixels outside `region` are ignored.
pub fn find_blobs(
    mask: &PixelMask,
    region: Bounds,
    cfg: &SegmentConfig,
    order: ScanOrder,
) -> Result<Vec<Blob>, ConnectionOverflow> {
    let region = clip_to_mask(region, mask);
    if region.is_empty() {
        return Ok(Vec::new());
    }

    let mut visited = vec![false; region.width as usize * region.height as usize];
    let mut blobs = Vec::new();

    let (outer, inner) = match order {
        ScanOrder::RowMajor => (region.height, region.width),
        ScanOrder::ColumnMajor => (region.width, region.height),
    };

    for a in 0..outer {
        for b in 0..inner {
            let (x, y) = match order {
                ScanOrder::RowMajor => (b, a),
                ScanOrder::ColumnMajor => (a, b),
            };
            let idx = (y * region.width + x) as usize;
            if visited[idx] || !mask.get(region.x + x, region.y + y) {
                continue;
            }

            let pixels = flood_fill(mask, region, &mut visited, (x, y), cfg)?;

            // Nothing connected to the seed: an isolated speck, not a glyph.
            if pixels.len() < 2 {
                trace!("Discarding isolated pixel at ({},{})", region.x + x, region.y + y);
                continue;
            }

            if let Some((location, glyph)) = Glyph::from_pixels(&pixels) {
                blobs.push(Blob { location, glyph });
            }
        }
    }

    Ok(blobs)
}

/// Worklist flood fill over the expanded neighborhood.
///
/// `visited` is region-local and row-major. Returned pixels are in page
/// coordinates, seed first.
fn flood_fill(
    mask: &PixelMask,
    region: Bounds,
    visited: &mut [bool],
    seed: (u32, u32),
    cfg: &SegmentConfig,
) -> Result<Vec<(u32, u32)>, ConnectionOverflow> {
    let h = cfg.horizontal_gap_tolerance;
    let v = cfg.vertical_gap_tolerance;
    let max_x = region.width - 1;
    let max_y = region.height - 1;

    visited[(seed.1 * region.width + seed.0) as usize] = true;
    let mut pixels = vec![(region.x + seed.0, region.y + seed.1)];
    let mut stack = vec![seed];
    let mut connections = 0usize;

    while let Some((x, y)) = stack.pop() {
        let x0 = x.saturating_sub(h);
        let x1 = x.saturating_add(h).min(max_x);
        let y0 = y.saturating_sub(v);
        let y1 = y.saturating_add(v).min(max_y);

        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let idx = (ny * region.width + nx) as usize;
                if visited[idx] || !mask.get(region.x + nx, region.y + ny) {
                    continue;
                }

                visited[idx] = true;
                connections += 1;
                if connections > cfg.max_connections {
                    return Err(ConnectionOverflow {
                        seed: Location::new(region.x + seed.0, region.y + seed.1),
                        limit: cfg.max_connections,
                    });
                }

                pixels.push((region.x + nx, region.y + ny));
                stack.push((nx, ny));
            }
        }
    }

    Ok(pixels)
}

fn clip_to_mask(region: Bounds, mask: &PixelMask) -> Bounds {
    let x = region.x.min(mask.width());
    let y = region.y.min(mask.height());
    let right = region.right().min(mask.width());
    let bottom = region.bottom().min(mask.height());
    Bounds::new(x, y, right - x, bottom - y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_impl::mask_from_art;

    fn cfg(h: u32, v: u32) -> SegmentConfig {
        SegmentConfig {
            horizontal_gap_tolerance: h,
            vertical_gap_tolerance: v,
            ..SegmentConfig::tight()
        }
    }

    fn fingerprint(blobs: &[Blob]) -> Vec<(Location, u32, u32, Vec<u32>)> {
        let mut out: Vec<_> = blobs
            .iter()
            .map(|b| (b.location, b.glyph.width(), b.glyph.height(), b.glyph.on_bits()))
            .collect();
        out.sort();
        out
    }

    // Two 3x3 blocks, the second offset diagonally by 6 pixels.
    fn two_blocks() -> PixelMask {
        mask_from_art(&[
            "###......",
            "###......",
            "###......",
            ".........",
            ".........",
            ".........",
            "......###",
            "......###",
            "......###",
        ])
    }

    #[test]
    fn test_segmentation_is_deterministic() {
        let mask = mask_from_art(&[
            "##..#....##",
            "#...#.....#",
            "##..#..#..#",
            ".......#...",
        ]);
        let c = cfg(1, 1);
        let first = find_blobs(&mask, mask.bounds(), &c, ScanOrder::RowMajor).unwrap();
        let again = find_blobs(&mask, mask.bounds(), &c, ScanOrder::RowMajor).unwrap();
        let by_column = find_blobs(&mask, mask.bounds(), &c, ScanOrder::ColumnMajor).unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(fingerprint(&first), fingerprint(&again));
        assert_eq!(fingerprint(&first), fingerprint(&by_column));
    }

    #[test]
    fn test_gap_beyond_tolerance_keeps_blobs_apart() {
        let mask = two_blocks();
        // Nearest pixels are 4 apart on both axes.
        let blobs = find_blobs(&mask, mask.bounds(), &cfg(3, 3), ScanOrder::RowMajor).unwrap();
        assert_eq!(blobs.len(), 2);
        assert_eq!(blobs[0].location, Location::new(0, 0));
        assert_eq!(blobs[1].location, Location::new(6, 6));
        assert_eq!((blobs[1].glyph.width(), blobs[1].glyph.height()), (3, 3));
    }

    #[test]
    fn test_gap_within_tolerance_merges_blobs() {
        let mask = two_blocks();
        let blobs = find_blobs(&mask, mask.bounds(), &cfg(4, 4), ScanOrder::RowMajor).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].location, Location::new(0, 0));
        assert_eq!((blobs[0].glyph.width(), blobs[0].glyph.height()), (9, 9));
        assert_eq!(blobs[0].glyph.on_bits().len(), 18);
    }

    #[test]
    fn test_tolerance_is_per_axis() {
        let mask = two_blocks();
        // Close enough horizontally but not vertically.
        let blobs = find_blobs(&mask, mask.bounds(), &cfg(6, 3), ScanOrder::RowMajor).unwrap();
        assert_eq!(blobs.len(), 2);
    }

    #[test]
    fn test_oversized_region_trips_circuit_breaker() {
        let mask = PixelMask::from_bits(40, 40, vec![true; 1600]).unwrap();
        let c = SegmentConfig {
            max_connections: 500,
            ..cfg(1, 1)
        };
        let err = find_blobs(&mask, mask.bounds(), &c, ScanOrder::RowMajor).unwrap_err();
        assert_eq!(err.seed, Location::new(0, 0));
        assert_eq!(err.limit, 500);
    }

    #[test]
    fn test_isolated_pixel_is_discarded() {
        let mask = mask_from_art(&["#....", ".....", "...##"]);
        let blobs = find_blobs(&mask, mask.bounds(), &cfg(1, 1), ScanOrder::RowMajor).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].location, Location::new(3, 2));
    }

    #[test]
    fn test_region_restricts_search() {
        let mask = two_blocks();
        let region = Bounds::new(5, 5, 4, 4);
        let blobs = find_blobs(&mask, region, &cfg(9, 9), ScanOrder::RowMajor).unwrap();
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].location, Location::new(6, 6));
    }

    #[test]
    fn test_column_major_finds_blobs_left_to_right() {
        // The right-hand blob starts higher up than the left-hand one.
        let mask = mask_from_art(&[
            ".....##",
            "##...##",
            "##.....",
        ]);
        let blobs = find_blobs(&mask, mask.bounds(), &cfg(1, 1), ScanOrder::ColumnMajor).unwrap();
        let xs: Vec<u32> = blobs.iter().map(|b| b.location.x).collect();
        assert_eq!(xs, vec![0, 5]);

        let rows = find_blobs(&mask, mask.bounds(), &cfg(1, 1), ScanOrder::RowMajor).unwrap();
        let xs: Vec<u32> = rows.iter().map(|b| b.location.x).collect();
        assert_eq!(xs, vec![5, 0]);
    }
}
