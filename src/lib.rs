//! # doseocr - CT dose screen OCR
//!
//! doseocr reads the radiation dose summary that CT scanners render as a
//! screenshot ("dose screen") and turns it into a structured [`DoseReport`].
//!
//! Screens use a small, fixed set of fonts, so recognition is exact glyph
//! lookup rather than a trained model: the raster is thresholded, split into
//! connected components with vendor-tuned gap tolerances, and each component
//! is looked up in a [`GlyphDictionary`]. The recognized lines are then fed
//! through a per-vendor grammar.
//!
//! ## Features
//!
//! - **Exact glyph matching** from a JSON catalog, grown by interactive training
//! - **GE, Siemens and Toshiba/Canon** dose screen grammars
//! - **Multi-page** reports, with per-page failure isolation
//! - **No native dependencies**: pure Rust image decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use doseocr::{DoseScreen, DoseScreenConfig, Vendor};
//!
//! let config = DoseScreenConfig {
//!     vendor: Vendor::Ge,
//!     catalog_path: Some("glyphs.json".into()),
//! };
//!
//! let screen = DoseScreen::new(config)?;
//! let report = screen.read_dose(&["dose_screen.png"], "1.2.840.113619.2.55")?;
//!
//! for acq in &report.acquisitions {
//!     println!("{:?}: CTDIvol {:?} DLP {:?}", acq.scan_type, acq.ctdi_vol, acq.dlp);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
mod components;
mod dict;
mod dose;
mod dose_ocr;
mod engine;
mod glyph;
mod image_impl;
mod layout;
mod rec;
mod train;
mod types;
mod vendor;

// Public API exports
pub use crate::components::{find_blobs, Blob, ConnectionOverflow, ScanOrder};
pub use crate::dict::{Batch, CatalogEntry, GlyphDictionary, GlyphLookup};
pub use crate::dose::{
    AcquisitionDetails, DlpDiscrepancy, DoseAcquisitionRecord, DoseReport, PhantomType,
    ScanDirection, ScanPosition, ScanRange, ScanType, Side, TotalDlp,
};
pub use crate::dose_ocr::{DoseOcr, DoseOcrOutput};
pub use crate::engine::EngineError;
pub use crate::glyph::{Bounds, Glyph, Location, MAX_GLYPH_PIXELS};
pub use crate::image_impl::{decode_mask, imread, imread_mask, BitDepth, PixelMask};
pub use crate::layout::{assemble_lines, RecognizedGlyphIndex};
pub use crate::rec::{GlyphRecognizer, TextRecOutput};
pub use crate::train::{ConsoleTrainer, Trainer, Training};
pub use crate::types::{
    OcrConfig, SegmentConfig, DEFAULT_MAX_CONNECTIONS, DEFAULT_WORD_SPACING, WORD_SEPARATOR,
};
pub use crate::vendor::{parse_dose_report, SourceInfo, Vendor};

use std::path::{Path, PathBuf};

/// Configuration for [`DoseScreen`]
#[derive(Debug, Clone)]
pub struct DoseScreenConfig {
    pub vendor: Vendor,
    /// Glyph catalog to load. Without one nothing is recognized.
    pub catalog_path: Option<PathBuf>,
}

impl Default for DoseScreenConfig {
    fn default() -> Self {
        Self {
            vendor: Vendor::Ge,
            catalog_path: None,
        }
    }
}

/// Main dose screen interface: recognition plus the vendor grammar.
pub struct DoseScreen {
    inner: DoseOcr,
    vendor: Vendor,
}

impl DoseScreen {
    pub fn new(config: DoseScreenConfig) -> Result<Self, EngineError> {
        let dictionary = match &config.catalog_path {
            Some(path) => GlyphDictionary::load(path)?,
            None => GlyphDictionary::new(),
        };
        let inner = DoseOcr::new(OcrConfig::for_vendor(config.vendor), dictionary);

        Ok(Self {
            inner,
            vendor: config.vendor,
        })
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Recognized lines of the given pages, in order.
    pub fn read<P: AsRef<Path>>(&self, image_paths: &[P]) -> Result<Vec<String>, EngineError> {
        Ok(self.inner.run(image_paths)?.lines)
    }

    /// Read the pages of one dose screen into a report.
    pub fn read_dose<P: AsRef<Path>>(
        &self,
        image_paths: &[P],
        scope: &str,
    ) -> Result<DoseReport, EngineError> {
        let lines = self.read(image_paths)?;
        Ok(parse_dose_report(self.vendor, scope, &lines))
    }

    /// Same as [`read_dose`](Self::read_dose) for a single encoded page
    /// held in memory.
    pub fn read_dose_from_bytes(
        &self,
        image_data: &[u8],
        scope: &str,
    ) -> Result<DoseReport, EngineError> {
        let mask = decode_mask(image_data, self.inner.cfg.bit_depth)?;
        let out = self.inner.read_pages(std::slice::from_ref(&mask))?;
        Ok(parse_dose_report(self.vendor, scope, &out.lines))
    }
}
