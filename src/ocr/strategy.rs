use std::path::Path;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::error::{ExtractError, Result};

use super::{Preprocess, Recipe, Recognize, RecognitionResult};

/// The winning strategy: recipe name, its recognition output, and the mean
/// confidence it scored.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub recipe: String,
    pub score: f32,
    pub result: RecognitionResult,
}

/// Runs every recipe's preprocess-then-recognize pipeline concurrently and
/// keeps the strictly best-scoring result; ties resolve to the earliest
/// recipe in declaration order. A failing recipe is logged and skipped. When
/// all recipes fail, one recognition pass runs on the unprocessed source
/// before giving up with `AllStrategiesFailed`.
pub async fn select_best<P, R>(
    preprocessor: &P,
    engine: &R,
    recipes: &[Recipe],
    source: &Path,
    languages: &str,
    score_floor: f32,
) -> Result<ScoredResult>
where
    P: Preprocess,
    R: Recognize,
{
    let attempts = recipes.iter().map(|recipe| async move {
        let derived = preprocessor.apply(recipe, source)?;
        let result = engine.recognize(derived.path(), languages).await?;
        // `derived` drops here, removing the temp image on every exit path.
        Ok::<_, ExtractError>((recipe.name.clone(), result))
    });
    let outcomes = join_all(attempts).await;

    let mut best: Option<ScoredResult> = None;
    for outcome in outcomes {
        match outcome {
            Ok((recipe, result)) => {
                let score = mean_confidence(&result, score_floor);
                debug!(recipe = %recipe, score, "strategy scored");
                if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                    best = Some(ScoredResult {
                        recipe,
                        score,
                        result,
                    });
                }
            }
            Err(err) => warn!("strategy failed: {err}"),
        }
    }
    if let Some(best) = best {
        return Ok(best);
    }

    warn!("every preprocessing strategy failed, retrying on the unprocessed image");
    let result = engine
        .recognize(source, languages)
        .await
        .map_err(|_| ExtractError::AllStrategiesFailed)?;
    Ok(ScoredResult {
        recipe: "unprocessed".to_string(),
        score: 0.0,
        result,
    })
}

fn mean_confidence(result: &RecognitionResult, score_floor: f32) -> f32 {
    let mut sum = 0.0f32;
    let mut count = 0usize;
    for word in result.lines.iter().flatten() {
        if word.conf > score_floor {
            sum += word.conf;
            count += 1;
        }
    }
    if count == 0 { 0.0 } else { sum / count as f32 }
}
