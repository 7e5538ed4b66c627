//! Interactive training of unknown glyphs.
//!
//! [`Training`] decorates the dictionary lookup: known glyphs resolve as in
//! batch mode, unknown ones are handed to a [`Trainer`] and whatever it
//! answers is learned for the rest of the run.

use std::io::{self, BufRead, BufReader, Stdin, Stderr, Write};

use log::{debug, info, warn};

use crate::dict::{GlyphDictionary, GlyphLookup};
use crate::engine::EngineError;
use crate::glyph::{Glyph, Location};

/// Supplies the string for a glyph the dictionary does not know.
///
/// Returning `Ok(None)` leaves the glyph unrecognized.
pub trait Trainer {
    fn label(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError>;
}

impl<F> Trainer for F
where
    F: FnMut(&Glyph, Location) -> Option<String>,
{
    fn label(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError> {
        Ok(self(glyph, location))
    }
}

pub struct Training<'a, T: Trainer> {
    dictionary: &'a mut GlyphDictionary,
    trainer: T,
    learned: usize,
}

impl<'a, T: Trainer> Training<'a, T> {
    pub fn new(dictionary: &'a mut GlyphDictionary, trainer: T) -> Self {
        Self {
            dictionary,
            trainer,
            learned: 0,
        }
    }

    /// Number of glyphs learned through this decorator.
    pub fn learned(&self) -> usize {
        self.learned
    }
}

impl<T: Trainer> GlyphLookup for Training<'_, T> {
    fn lookup(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError> {
        if let Some(text) = self.dictionary.get(glyph) {
            return Ok(Some(text.to_owned()));
        }

        match self.trainer.label(glyph, location)? {
            Some(text) if !text.is_empty() => {
                info!("Learned {:?} from glyph at {}", text, location);
                self.dictionary.insert(glyph.clone(), text.clone());
                self.learned += 1;
                Ok(Some(text))
            }
            _ => {
                debug!("Glyph at {} left unlabeled", location);
                Ok(None)
            }
        }
    }
}

/// Prompts on a terminal: draws the glyph, reads one line of answer.
/// An empty answer skips the glyph. Once the input is closed every later
/// glyph is skipped without prompting.
pub struct ConsoleTrainer<R: BufRead, W: Write> {
    input: R,
    output: W,
    closed: bool,
}

impl ConsoleTrainer<BufReader<Stdin>, Stderr> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsoleTrainer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output, closed: false }
    }
}

impl<R: BufRead, W: Write> Trainer for ConsoleTrainer<R, W> {
    fn label(&mut self, glyph: &Glyph, location: Location) -> Result<Option<String>, EngineError> {
        if self.closed {
            return Ok(None);
        }
        writeln!(
            self.output,
            "Unknown {}x{} glyph at {}:",
            glyph.width(),
            glyph.height(),
            location
        )?;
        write!(self.output, "{glyph}")?;
        write!(self.output, "Text (empty to skip): ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            warn!("Training input closed; remaining unknown glyphs are skipped");
            self.closed = true;
            return Ok(None);
        }
        let answer = answer.trim_end_matches(['\r', '\n']);
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}
