use std::time::Instant;

use log::debug;

use crate::components::{find_blobs, Blob, ScanOrder};
use crate::dict::GlyphLookup;
use crate::engine::EngineError;
use crate::image_impl::PixelMask;
use crate::layout::RecognizedGlyphIndex;
use crate::types::OcrConfig;

pub struct TextRecOutput {
    pub index: RecognizedGlyphIndex,
    /// Blobs recognized as a whole on the first pass.
    pub recognized: usize,
    /// Blobs recognized only after being split.
    pub refined: usize,
    /// Blobs that stayed unrecognized and were left out.
    pub dropped: usize,
    pub elapse: f64,
}

/// Segments one page and resolves every blob through a [`GlyphLookup`].
pub struct GlyphRecognizer {
    pub cfg: OcrConfig,
}

impl GlyphRecognizer {
    pub fn new(cfg: OcrConfig) -> Self {
        Self { cfg }
    }

    pub fn run<L: GlyphLookup + ?Sized>(
        &self,
        mask: &PixelMask,
        lookup: &mut L,
    ) -> Result<TextRecOutput, EngineError> {
        let start = Instant::now();

        let blobs = find_blobs(mask, mask.bounds(), &self.cfg.segment, ScanOrder::RowMajor)?;
        let total = blobs.len();

        let mut index = RecognizedGlyphIndex::new();
        let mut misses = Vec::new();
        for blob in blobs {
            match lookup.lookup(&blob.glyph, blob.location)? {
                Some(text) => index.insert(blob.location, blob.glyph.with_text(text)),
                None => misses.push(blob),
            }
        }
        let recognized = total - misses.len();

        let mut refined = 0;
        let mut dropped = 0;
        for blob in misses {
            let text = if self.cfg.refine_unrecognized {
                self.refine(mask, &blob, lookup)?
            } else {
                None
            };
            match text {
                Some(text) => {
                    refined += 1;
                    index.insert(blob.location, blob.glyph.with_text(text));
                }
                None => {
                    dropped += 1;
                    debug!(
                        "Dropping unrecognized {}x{} blob at {}",
                        blob.glyph.width(),
                        blob.glyph.height(),
                        blob.location
                    );
                }
            }
        }

        let elapse = start.elapsed().as_secs_f64();
        debug!(
            "Page {}x{}: {} blobs, {} recognized, {} refined, {} dropped in {:.3}s",
            mask.width(),
            mask.height(),
            total,
            recognized,
            refined,
            dropped,
            elapse
        );

        Ok(TextRecOutput {
            index,
            recognized,
            refined,
            dropped,
            elapse,
        })
    }

    /// Re-segment a missed blob with tight connectivity, left to right, and
    /// join whatever parts are recognized. The parts form one word.
    fn refine<L: GlyphLookup + ?Sized>(
        &self,
        mask: &PixelMask,
        blob: &Blob,
        lookup: &mut L,
    ) -> Result<Option<String>, EngineError> {
        let parts = find_blobs(mask, blob.bounds(), &self.cfg.refine, ScanOrder::ColumnMajor)?;

        let mut text = String::new();
        for part in &parts {
            if let Some(s) = lookup.lookup(&part.glyph, part.location)? {
                text.push_str(&s);
            }
        }

        Ok((!text.is_empty()).then_some(text))
    }
}
