use std::future::Future;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

mod cleaner;
mod preprocess;
mod recipes;
mod strategy;
mod tesseract;

pub use cleaner::clean_transcript;
pub use preprocess::ImagePreprocessor;
pub use recipes::{Recipe, TransformOp, default_recipes};
pub use strategy::{ScoredResult, select_best};
pub use tesseract::{TesseractEngine, list_tesseract_languages, normalize_languages};

/// One recognized text fragment with the engine's confidence score (0-100).
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub conf: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, conf: f32) -> Self {
        Self {
            text: text.into(),
            conf,
        }
    }
}

/// Engine output for one image: words grouped into lines in reading order,
/// plus a flat-text fallback for engines that return no line structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionResult {
    pub lines: Vec<Vec<Word>>,
    pub raw_text: String,
}

impl RecognitionResult {
    pub fn from_lines(lines: Vec<Vec<Word>>) -> Self {
        let raw_text = lines
            .iter()
            .map(|words| {
                words
                    .iter()
                    .map(|word| word.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self { lines, raw_text }
    }

    pub fn from_raw_text(text: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            raw_text: text.into(),
        }
    }
}

/// Applies a preprocessing recipe to a source image and hands back the
/// derived image as a named temp file. Dropping the handle deletes the file,
/// so derived images never outlive their strategy.
pub trait Preprocess {
    fn apply(&self, recipe: &Recipe, source: &Path) -> Result<NamedTempFile>;
}

/// The opaque text-recognition capability. An engine failure must propagate
/// as an error, never as empty-but-successful output.
pub trait Recognize {
    fn recognize(
        &self,
        image: &Path,
        languages: &str,
    ) -> impl Future<Output = Result<RecognitionResult>> + Send;
}
