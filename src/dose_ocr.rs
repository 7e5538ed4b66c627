use std::path::Path;

use log::{info, warn};

use crate::dict::{Batch, GlyphDictionary, GlyphLookup};
use crate::engine::EngineError;
use crate::image_impl::{imread_mask, PixelMask};
use crate::layout::assemble_lines;
use crate::rec::GlyphRecognizer;
use crate::train::{Trainer, Training};
use crate::types::OcrConfig;

#[derive(Debug, Default)]
pub struct DoseOcrOutput {
    /// Assembled lines of every page read, in page order.
    pub lines: Vec<String>,
    pub pages: usize,
    /// Indices of pages abandoned because segmentation overflowed.
    pub skipped_pages: Vec<usize>,
    pub recognized: usize,
    pub refined: usize,
    pub dropped: usize,
    pub elapse_rec: f64,
}

/// Multi-page driver: recognizes each page and concatenates its lines.
pub struct DoseOcr {
    pub cfg: OcrConfig,
    pub dictionary: GlyphDictionary,
}

impl DoseOcr {
    pub fn new(cfg: OcrConfig, dictionary: GlyphDictionary) -> Self {
        Self { cfg, dictionary }
    }

    /// Recognize one page in batch mode.
    pub fn read_page(&self, mask: &PixelMask) -> Result<Vec<String>, EngineError> {
        let rec = GlyphRecognizer::new(self.cfg.clone());
        let out = rec.run(mask, &mut Batch::new(&self.dictionary))?;
        Ok(assemble_lines(&out.index, self.cfg.word_spacing))
    }

    /// Recognize the pages of one report in batch mode.
    pub fn read_pages(&self, masks: &[PixelMask]) -> Result<DoseOcrOutput, EngineError> {
        read_with(&self.cfg, masks, &mut Batch::new(&self.dictionary))
    }

    /// Like [`read_pages`](Self::read_pages), asking `trainer` about every
    /// glyph the dictionary does not know. Returns the number learned.
    pub fn train_pages<T: Trainer>(
        &mut self,
        masks: &[PixelMask],
        trainer: T,
    ) -> Result<(DoseOcrOutput, usize), EngineError> {
        let mut training = Training::new(&mut self.dictionary, trainer);
        let out = read_with(&self.cfg, masks, &mut training)?;
        let learned = training.learned();
        info!("Learned {} new glyphs", learned);
        Ok((out, learned))
    }

    /// Load and read image files, in order, as the pages of one report.
    pub fn run<P: AsRef<Path>>(&self, image_paths: &[P]) -> Result<DoseOcrOutput, EngineError> {
        let masks = self.load_pages(image_paths)?;
        self.read_pages(&masks)
    }

    pub fn load_pages<P: AsRef<Path>>(&self, image_paths: &[P]) -> Result<Vec<PixelMask>, EngineError> {
        image_paths
            .iter()
            .map(|p| imread_mask(p, self.cfg.bit_depth))
            .collect()
    }
}

fn read_with<L: GlyphLookup + ?Sized>(
    cfg: &OcrConfig,
    masks: &[PixelMask],
    lookup: &mut L,
) -> Result<DoseOcrOutput, EngineError> {
    let rec = GlyphRecognizer::new(cfg.clone());
    let mut output = DoseOcrOutput {
        pages: masks.len(),
        ..DoseOcrOutput::default()
    };

    for (page, mask) in masks.iter().enumerate() {
        let rec_res = match rec.run(mask, lookup) {
            Ok(res) => res,
            Err(e) if e.is_page_local() => {
                warn!("Skipping page {}: {}", page, e);
                output.skipped_pages.push(page);
                continue;
            }
            Err(e) => return Err(e),
        };
        output.lines.extend(assemble_lines(&rec_res.index, cfg.word_spacing));
        output.recognized += rec_res.recognized;
        output.refined += rec_res.refined;
        output.dropped += rec_res.dropped;
        output.elapse_rec += rec_res.elapse;
    }

    Ok(output)
}
