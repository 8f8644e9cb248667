use std::path::Path;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::{debug, warn};

pub mod error;
pub mod fields;
pub mod logging;
pub mod ocr;
pub mod settings;

pub use fields::{FieldParser, ParsedFields};
pub use ocr::{
    ImagePreprocessor, Preprocess, Recipe, Recognize, RecognitionResult, TesseractEngine, Word,
};

/// Process-wide pipeline configuration, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub languages: String,
    pub recipes: Vec<Recipe>,
    pub confidence_floor: f32,
    pub line_yield: f32,
    pub score_floor: f32,
    pub address_keywords: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_settings(&settings::Settings::default())
    }
}

impl PipelineConfig {
    pub fn from_settings(settings: &settings::Settings) -> Self {
        Self {
            languages: settings.languages.clone(),
            recipes: ocr::default_recipes(),
            confidence_floor: settings.confidence_floor,
            line_yield: settings.line_yield,
            score_floor: settings.score_floor,
            address_keywords: settings.address_keywords.clone(),
        }
    }
}

/// Everything extracted from one photograph. `has_text` is false and all
/// fields are `None` when the image yields no usable text; callers never see
/// an error from the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredText {
    pub has_text: bool,
    pub raw_transcript: Option<String>,
    pub cleaned_transcript: Option<String>,
    pub full_text: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub url: Option<String>,
    pub other_text: Option<String>,
}

/// Runs the full pipeline on one image: strategy fan-out, transcript
/// cleaning, field parsing. Total; degrades to an empty result instead of
/// surfacing recognition failures.
pub async fn extract_structured_text<P, R>(
    preprocessor: &P,
    engine: &R,
    config: &PipelineConfig,
    image_path: &Path,
) -> StructuredText
where
    P: Preprocess,
    R: Recognize,
{
    if !image_path.exists() {
        warn!("input does not exist: {}", image_path.display());
        return StructuredText::default();
    }
    match infer::get_from_path(image_path) {
        Ok(Some(kind)) if kind.mime_type().starts_with("image/") => {}
        Ok(_) => {
            warn!("input is not an image: {}", image_path.display());
            return StructuredText::default();
        }
        Err(err) => {
            warn!("failed to read input {}: {err}", image_path.display());
            return StructuredText::default();
        }
    }

    let scored = match ocr::select_best(
        preprocessor,
        engine,
        &config.recipes,
        image_path,
        &config.languages,
        config.score_floor,
    )
    .await
    {
        Ok(scored) => scored,
        Err(err) => {
            warn!("recognition failed for {}: {err}", image_path.display());
            return StructuredText::default();
        }
    };
    debug!(recipe = %scored.recipe, score = scored.score, "selected strategy");

    let cleaned = ocr::clean_transcript(&scored.result, config.confidence_floor, config.line_yield);
    if cleaned.chars().filter(|ch| !ch.is_whitespace()).count() < 2 {
        debug!("no text detected in {}", image_path.display());
        return StructuredText::default();
    }

    let parser = FieldParser::new(&config.address_keywords);
    let parsed = parser.parse(&cleaned);
    StructuredText {
        has_text: true,
        raw_transcript: Some(scored.result.raw_text),
        cleaned_transcript: Some(cleaned),
        full_text: parsed.full_text,
        address: parsed.address,
        phone: parsed.phone,
        email: parsed.email,
        url: parsed.url,
        other_text: parsed.other_text,
    }
}

/// CLI-facing configuration, filled from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub image: Option<String>,
    pub languages: Option<String>,
    pub settings_path: Option<String>,
    pub json: bool,
    pub list_langs: bool,
}

pub async fn run(config: Config) -> Result<String> {
    let settings = settings::load_settings(config.settings_path.as_deref().map(Path::new))?;

    if config.list_langs {
        let langs = ocr::list_tesseract_languages()?;
        return Ok(langs.join("\n"));
    }

    let image = config
        .image
        .as_deref()
        .ok_or_else(|| anyhow!("no image path given"))?;

    let mut pipeline = PipelineConfig::from_settings(&settings);
    if let Some(languages) = config.languages {
        pipeline.languages = languages;
    }
    pipeline.languages = ocr::normalize_languages(&pipeline.languages)?;

    let result = extract_structured_text(
        &ImagePreprocessor,
        &TesseractEngine,
        &pipeline,
        Path::new(image),
    )
    .await;

    if config.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(format_plain(&result))
    }
}

fn format_plain(result: &StructuredText) -> String {
    if !result.has_text {
        return "no text detected".to_string();
    }

    let mut sections = Vec::new();
    if let Some(text) = &result.full_text {
        sections.push(text.clone());
    }

    let mut meta = Vec::new();
    if let Some(value) = &result.address {
        meta.push(format!("address: {value}"));
    }
    if let Some(value) = &result.phone {
        meta.push(format!("phone: {value}"));
    }
    if let Some(value) = &result.email {
        meta.push(format!("email: {value}"));
    }
    if let Some(value) = &result.url {
        meta.push(format!("url: {value}"));
    }
    if !meta.is_empty() {
        sections.push(meta.join("\n"));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_plain_reports_missing_text() {
        assert_eq!(format_plain(&StructuredText::default()), "no text detected");
    }

    #[test]
    fn format_plain_lists_present_fields_after_the_text() {
        let result = StructuredText {
            has_text: true,
            full_text: Some("Hotel Saravana\n12 Main Road".to_string()),
            address: Some("12 Main Road".to_string()),
            phone: Some("9876543210".to_string()),
            ..StructuredText::default()
        };
        assert_eq!(
            format_plain(&result),
            "Hotel Saravana\n12 Main Road\n\naddress: 12 Main Road\nphone: 9876543210"
        );
    }
}
