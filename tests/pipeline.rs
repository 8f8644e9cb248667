use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use signtext::error::{ExtractError, Result};
use signtext::ocr::{Recipe, select_best};
use signtext::{
    PipelineConfig, Preprocess, Recognize, RecognitionResult, StructuredText, Word,
    extract_structured_text,
};

/// Writes the recipe name into the derived temp file so the scripted engine
/// can tell strategies apart without touching real pixels.
struct MarkerPreprocessor;

impl Preprocess for MarkerPreprocessor {
    fn apply(&self, recipe: &Recipe, _source: &Path) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(recipe.name.as_bytes())?;
        tmp.flush()?;
        Ok(tmp)
    }
}

struct FailingPreprocessor;

impl Preprocess for FailingPreprocessor {
    fn apply(&self, recipe: &Recipe, _source: &Path) -> Result<NamedTempFile> {
        Err(ExtractError::Preprocess(format!(
            "cannot decode for {}",
            recipe.name
        )))
    }
}

/// Deterministic engine: answers per preprocessor marker, with an optional
/// response for unmarked paths (the unprocessed source image).
#[derive(Default)]
struct ScriptedEngine {
    by_marker: HashMap<String, RecognitionResult>,
    unmarked: Option<RecognitionResult>,
}

impl Recognize for ScriptedEngine {
    async fn recognize(&self, image: &Path, _languages: &str) -> Result<RecognitionResult> {
        let bytes = std::fs::read(image).unwrap_or_default();
        let marker = String::from_utf8_lossy(&bytes).to_string();
        if let Some(result) = self.by_marker.get(marker.as_str()) {
            return Ok(result.clone());
        }
        match &self.unmarked {
            Some(result) => Ok(result.clone()),
            None => Err(ExtractError::Recognition("engine offline".to_string())),
        }
    }
}

fn words(specs: &[(&str, f32)]) -> Vec<Word> {
    specs
        .iter()
        .map(|(text, conf)| Word::new(*text, *conf))
        .collect()
}

fn sample_png() -> NamedTempFile {
    let mut tmp = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    image::DynamicImage::new_rgb8(64, 32)
        .write_to(&mut tmp, image::ImageFormat::Png)
        .unwrap();
    tmp.flush().unwrap();
    tmp
}

fn signboard_result() -> RecognitionResult {
    RecognitionResult::from_lines(vec![
        words(&[("HOTEL", 91.0), ("SARAVANA", 88.0)]),
        words(&[("Contact", 90.0), ("us:", 85.0), ("9876543210", 93.0)]),
        words(&[("Visit", 80.0), ("www.example.com", 75.0)]),
        words(&[
            ("12", 88.0),
            ("Main", 90.0),
            ("Road,", 84.0),
            ("Chennai", 89.0),
        ]),
        words(&[("@#!", 12.0), ("||", 8.0), ("zz", 30.0)]),
    ])
}

#[tokio::test]
async fn best_strategy_wins_and_fields_are_disjoint() {
    let source = sample_png();
    let config = PipelineConfig::default();

    let mut by_marker = HashMap::new();
    by_marker.insert(
        "high-contrast".to_string(),
        RecognitionResult::from_lines(vec![words(&[("NOISY", 55.0)])]),
    );
    by_marker.insert("clean-print".to_string(), signboard_result());
    by_marker.insert(
        "low-contrast".to_string(),
        RecognitionResult::from_lines(vec![words(&[("dim", 60.0)])]),
    );
    let engine = ScriptedEngine {
        by_marker,
        unmarked: None,
    };

    let result =
        extract_structured_text(&MarkerPreprocessor, &engine, &config, source.path()).await;

    assert!(result.has_text);
    assert_eq!(
        result.cleaned_transcript.as_deref(),
        Some("HOTEL SARAVANA\nContact us: 9876543210\nVisit www.example.com\n12 Main Road, Chennai")
    );
    assert!(result.raw_transcript.as_deref().unwrap().contains("zz"));
    assert_eq!(result.phone.as_deref(), Some("9876543210"));
    assert_eq!(result.url.as_deref(), Some("www.example.com"));
    insta::assert_snapshot!(result.address.as_deref().unwrap(), @"12 Main Road, Chennai");
    assert_eq!(
        result.other_text.as_deref(),
        Some("HOTEL SARAVANA\nContact us:\nVisit")
    );
}

#[tokio::test]
async fn equal_scores_resolve_to_declaration_order() {
    let source = sample_png();
    let recipes = vec![
        Recipe::new("a", Vec::new()),
        Recipe::new("b", Vec::new()),
        Recipe::new("c", Vec::new()),
    ];

    let mut by_marker = HashMap::new();
    by_marker.insert(
        "a".to_string(),
        RecognitionResult::from_lines(vec![words(&[("first", 62.0)])]),
    );
    by_marker.insert(
        "b".to_string(),
        RecognitionResult::from_lines(vec![words(&[("second", 71.5)])]),
    );
    by_marker.insert(
        "c".to_string(),
        RecognitionResult::from_lines(vec![words(&[("third", 71.5)])]),
    );
    let engine = ScriptedEngine {
        by_marker,
        unmarked: None,
    };

    let best = select_best(
        &MarkerPreprocessor,
        &engine,
        &recipes,
        source.path(),
        "eng+tam",
        50.0,
    )
    .await
    .unwrap();

    assert_eq!(best.recipe, "b");
    assert_eq!(best.score, 71.5);
    assert_eq!(best.result.raw_text, "second");
}

#[tokio::test]
async fn failed_strategies_fall_back_to_the_unprocessed_image() {
    let source = sample_png();
    let recipes = vec![Recipe::new("a", Vec::new()), Recipe::new("b", Vec::new())];
    let engine = ScriptedEngine {
        by_marker: HashMap::new(),
        unmarked: Some(RecognitionResult::from_lines(vec![words(&[
            ("salvaged", 70.0),
            ("text", 66.0),
        ])])),
    };

    let best = select_best(
        &FailingPreprocessor,
        &engine,
        &recipes,
        source.path(),
        "eng+tam",
        50.0,
    )
    .await
    .unwrap();

    assert_eq!(best.recipe, "unprocessed");
    assert_eq!(best.score, 0.0);
    assert_eq!(best.result.raw_text, "salvaged text");
}

#[tokio::test]
async fn total_failure_degrades_to_an_empty_result() {
    let source = sample_png();
    let config = PipelineConfig::default();
    let engine = ScriptedEngine::default();

    let result =
        extract_structured_text(&FailingPreprocessor, &engine, &config, source.path()).await;

    assert_eq!(result, StructuredText::default());
}

#[tokio::test]
async fn missing_input_yields_an_empty_result() {
    let config = PipelineConfig::default();
    let engine = ScriptedEngine::default();

    let result = extract_structured_text(
        &MarkerPreprocessor,
        &engine,
        &config,
        Path::new("/nonexistent/signboard.png"),
    )
    .await;

    assert_eq!(result, StructuredText::default());
}

#[tokio::test]
async fn non_image_input_yields_an_empty_result() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(b"just some text, not pixels").unwrap();
    tmp.flush().unwrap();

    let config = PipelineConfig::default();
    let engine = ScriptedEngine::default();

    let result = extract_structured_text(&MarkerPreprocessor, &engine, &config, tmp.path()).await;

    assert_eq!(result, StructuredText::default());
}

#[tokio::test]
async fn transcript_below_two_characters_counts_as_no_text() {
    let source = sample_png();
    let config = PipelineConfig::default();

    let noise = RecognitionResult::from_lines(vec![words(&[(".", 20.0), ("-", 31.0)])]);
    let mut by_marker = HashMap::new();
    for recipe in &config.recipes {
        by_marker.insert(recipe.name.clone(), noise.clone());
    }
    let engine = ScriptedEngine {
        by_marker,
        unmarked: None,
    };

    let result =
        extract_structured_text(&MarkerPreprocessor, &engine, &config, source.path()).await;

    assert_eq!(result, StructuredText::default());
}

#[tokio::test]
async fn flat_engine_output_passes_through_the_cleaner() {
    let source = sample_png();
    let config = PipelineConfig::default();

    let flat = RecognitionResult::from_raw_text("ORDERS TAKEN ph 98765 43210");
    let mut by_marker = HashMap::new();
    for recipe in &config.recipes {
        by_marker.insert(recipe.name.clone(), flat.clone());
    }
    let engine = ScriptedEngine {
        by_marker,
        unmarked: None,
    };

    let result =
        extract_structured_text(&MarkerPreprocessor, &engine, &config, source.path()).await;

    assert!(result.has_text);
    assert_eq!(
        result.cleaned_transcript.as_deref(),
        Some("ORDERS TAKEN ph 98765 43210")
    );
    assert_eq!(result.phone.as_deref(), Some("98765 43210"));
}
