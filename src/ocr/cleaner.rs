use super::RecognitionResult;

/// Rebuilds a clean transcript from recognition output. Words below the
/// confidence floor are dropped; a line survives only when the surviving
/// fraction of its words strictly exceeds the yield threshold, which rejects
/// bursts of misrecognized glyphs that per-word filtering would still
/// assemble into nonsense lines. Never fails; an empty string means no
/// usable text.
pub fn clean_transcript(
    result: &RecognitionResult,
    confidence_floor: f32,
    line_yield: f32,
) -> String {
    if result.lines.is_empty() {
        // Engines without line structure fall back to their flat text.
        return result.raw_text.trim().to_string();
    }

    let mut kept = Vec::new();
    for words in &result.lines {
        if words.is_empty() {
            continue;
        }
        let survivors = words
            .iter()
            .filter(|word| word.conf >= confidence_floor && !word.text.trim().is_empty())
            .map(|word| word.text.trim())
            .collect::<Vec<_>>();
        if survivors.is_empty() {
            continue;
        }
        let ratio = survivors.len() as f32 / words.len() as f32;
        if ratio <= line_yield {
            continue;
        }
        kept.push(survivors.join(" "));
    }
    kept.join("\n")
}
