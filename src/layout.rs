//! Line assembly: recognized glyphs in reading order.

use std::collections::btree_map::{self, BTreeMap};

use log::debug;

use crate::glyph::{Glyph, Location};
use crate::types::WORD_SEPARATOR;

/// Recognized glyphs of one page, keyed by location in row-major order.
#[derive(Clone, Debug, Default)]
pub struct RecognizedGlyphIndex {
    glyphs: BTreeMap<Location, Glyph>,
}

impl RecognizedGlyphIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a glyph. A glyph already at `location` is replaced.
    pub fn insert(&mut self, location: Location, glyph: Glyph) {
        if let Some(replaced) = self.glyphs.insert(location, glyph) {
            debug!(
                "Glyph {:?} at {} replaced by a later glyph with the same corner",
                replaced.text().unwrap_or_default(),
                location
            );
        }
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Location, Glyph> {
        self.glyphs.iter()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn clear(&mut self) {
        self.glyphs.clear();
    }
}

/// Turn a page's glyphs into text lines.
///
/// Glyphs sharing a `y` form a line, joined in `x` order. A
/// [`WORD_SEPARATOR`] goes between two glyphs whose horizontal gap exceeds
/// `word_spacing` pixels.
pub fn assemble_lines(index: &RecognizedGlyphIndex, word_spacing: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    // (y, right edge) of the previous glyph on the current line
    let mut prev: Option<(u32, u32)> = None;

    for (location, glyph) in index.iter() {
        let text = glyph.text().unwrap_or_default();
        match prev {
            Some((y, right)) if y == location.y => {
                if location.x.saturating_sub(right) > word_spacing {
                    current.push(WORD_SEPARATOR);
                }
            }
            Some(_) => lines.push(std::mem::take(&mut current)),
            None => {}
        }
        current.push_str(text);
        prev = Some((location.y, location.x + glyph.width()));
    }

    if prev.is_some() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(width: u32, text: &str) -> Glyph {
        Glyph::new(width, 2, vec![true; (width * 2) as usize])
            .unwrap()
            .with_text(text)
    }

    #[test]
    fn test_lines_follow_row_major_order() {
        let mut index = RecognizedGlyphIndex::new();
        index.insert(Location::new(5, 30), bar(4, "C"));
        index.insert(Location::new(50, 10), bar(4, "B"));
        index.insert(Location::new(5, 10), bar(4, "A"));

        let lines = assemble_lines(&index, 5);
        assert_eq!(lines, vec!["A\tB".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_word_break_only_above_spacing() {
        let mut index = RecognizedGlyphIndex::new();
        // "1" ends at x=14; "2" starts 5 pixels later, "3" 6 pixels after "2".
        index.insert(Location::new(10, 0), bar(4, "1"));
        index.insert(Location::new(19, 0), bar(4, "2"));
        index.insert(Location::new(29, 0), bar(4, "3"));

        assert_eq!(assemble_lines(&index, 5), vec!["12\t3".to_string()]);
    }

    #[test]
    fn test_same_corner_keeps_the_later_glyph() {
        let mut index = RecognizedGlyphIndex::new();
        index.insert(Location::new(3, 3), bar(2, "1"));
        index.insert(Location::new(3, 3), bar(4, "7"));
        assert_eq!(index.len(), 1);
        assert_eq!(assemble_lines(&index, 5), vec!["7".to_string()]);
    }

    #[test]
    fn test_empty_index_has_no_lines() {
        assert!(assemble_lines(&RecognizedGlyphIndex::new(), 5).is_empty());
    }

    #[test]
    fn test_assembly_can_be_repeated() {
        let mut index = RecognizedGlyphIndex::new();
        index.insert(Location::new(0, 0), bar(3, "Total"));
        let first = assemble_lines(&index, 5);
        assert_eq!(first, assemble_lines(&index, 5));
        index.clear();
        assert!(assemble_lines(&index, 5).is_empty());
    }
}
