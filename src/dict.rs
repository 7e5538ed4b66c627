//! Glyph dictionary and its persisted catalog.
//!
//! The dictionary maps exact glyph bitmaps to the strings they stand for.
//! It is loaded once per run from a JSON catalog, optionally grown by
//! training (see [`crate::train`]) and saved back at the end of the run.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::glyph::{Glyph, Location};

/// One persisted dictionary entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Offsets of the "on" bits in a row-major bitmap of `width` columns.
    pub bits: Vec<u32>,
    pub width: u32,
    pub text: String,
}

#[derive(Clone, Debug, Default)]
pub struct GlyphDictionary {
    entries: Vec<(Glyph, String)>,
    index: HashMap<Glyph, usize>,
    modified: bool,
}

impl GlyphDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let catalog: Vec<CatalogEntry> = serde_json::from_reader(reader)?;
        let dict = Self::from_catalog(catalog)?;
        info!("Loaded {} glyphs from {}", dict.len(), path.display());
        Ok(dict)
    }

    pub fn from_catalog(catalog: Vec<CatalogEntry>) -> Result<Self, EngineError> {
        let mut dict = Self::new();
        for (i, entry) in catalog.into_iter().enumerate() {
            if entry.text.is_empty() {
                return Err(EngineError::InvalidCatalog(format!("entry {i} has no text")));
            }
            let glyph = Glyph::from_on_bits(&entry.bits, entry.width).map_err(|e| match e {
                EngineError::InvalidCatalog(msg) => {
                    EngineError::InvalidCatalog(format!("entry {i}: {msg}"))
                }
                other => other,
            })?;
            if !dict.insert(glyph, entry.text) {
                warn!("Catalog entry {i} repeats an earlier glyph; keeping the first");
            }
        }
        dict.modified = false;
        Ok(dict)
    }

    pub fn to_catalog(&self) -> Vec<CatalogEntry> {
        self.entries
            .iter()
            .map(|(glyph, text)| CatalogEntry {
                bits: glyph.on_bits(),
                width: glyph.width(),
                text: text.clone(),
            })
            .collect()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), EngineError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &self.to_catalog())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!("Saved {} glyphs to {}", self.len(), path.display());
        Ok(())
    }

    pub fn get(&self, glyph: &Glyph) -> Option<&str> {
        self.index.get(glyph).map(|&i| self.entries[i].1.as_str())
    }

    /// Add a mapping. Returns `false`, leaving the dictionary untouched, if
    /// the glyph is already known.
    pub fn insert(&mut self, glyph: Glyph, text: String) -> bool {
        if self.index.contains_key(&glyph) {
            return false;
        }
        // Keys never carry a recognized string of their own.
        let key = glyph.without_text();
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, text));
        self.modified = true;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once anything was inserted after loading.
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// Recognition port used by the recognizer for every blob it finds.
pub trait GlyphLookup {
    fn lookup(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError>;
}

/// Read-only, non-interactive lookup: a miss is just `None`.
pub struct Batch<'a> {
    dictionary: &'a GlyphDictionary,
}

impl<'a> Batch<'a> {
    pub fn new(dictionary: &'a GlyphDictionary) -> Self {
        Self { dictionary }
    }
}

impl GlyphLookup for Batch<'_> {
    fn lookup(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError> {
        let found = self.dictionary.get(glyph).map(str::to_owned);
        if found.is_none() {
            trace!(
                "No dictionary entry for {}x{} glyph at {}",
                glyph.width(),
                glyph.height(),
                location
            );
        }
        Ok(found)
    }
}
