use crate::image_impl::BitDepth;
use crate::vendor::Vendor;

/// Ceiling on pixels accepted into one blob before segmentation gives up.
/// Sized well above the widest merged words of the wide-spacing vendor.
pub const DEFAULT_MAX_CONNECTIONS: usize = 20_000;

/// Horizontal gap, in pixels, above which two glyphs are separate words.
pub const DEFAULT_WORD_SPACING: u32 = 5;

/// Inserted between words when assembling lines.
pub const WORD_SEPARATOR: char = '\t';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentConfig {
    pub horizontal_gap_tolerance: u32,
    pub vertical_gap_tolerance: u32,
    pub max_connections: usize,
}

impl SegmentConfig {
    pub fn new(horizontal_gap_tolerance: u32, vertical_gap_tolerance: u32) -> Self {
        Self {
            horizontal_gap_tolerance,
            vertical_gap_tolerance,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Tolerances tuned against each vendor's font rendering.
    pub fn for_vendor(vendor: Vendor) -> Self {
        match vendor {
            Vendor::Ge => Self::new(6, 4),
            Vendor::Siemens => Self::new(6, 2),
            Vendor::Toshiba => Self::new(13, 6),
        }
    }

    /// Plain 8-connectivity, used to split merged blobs.
    pub fn tight() -> Self {
        Self::new(1, 1)
    }
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self::for_vendor(Vendor::Ge)
    }
}

#[derive(Clone, Debug)]
pub struct OcrConfig {
    pub segment: SegmentConfig,
    pub refine: SegmentConfig,
    pub word_spacing: u32,
    pub refine_unrecognized: bool,
    pub bit_depth: BitDepth,
}

impl OcrConfig {
    pub fn for_vendor(vendor: Vendor) -> Self {
        Self {
            segment: SegmentConfig::for_vendor(vendor),
            ..Self::default()
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            segment: SegmentConfig::default(),
            refine: SegmentConfig::tight(),
            word_spacing: DEFAULT_WORD_SPACING,
            refine_unrecognized: true,
            bit_depth: BitDepth::Eight,
        }
    }
}
