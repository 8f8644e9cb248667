use std::path::Path;
use std::process::Command;

use tracing::warn;

use crate::error::{ExtractError, Result};

use super::{Recognize, RecognitionResult, Word};

/// Adapter around the `tesseract` binary. Engine parameters are fixed:
/// single-uniform-block segmentation, LSTM engine, preserved inter-word
/// spacing. Language packs are the caller's deployment concern.
pub struct TesseractEngine;

impl Recognize for TesseractEngine {
    async fn recognize(&self, image: &Path, languages: &str) -> Result<RecognitionResult> {
        let output = tokio::process::Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(languages)
            .arg("--oem")
            .arg("1")
            .arg("--psm")
            .arg("6")
            .arg("--dpi")
            .arg("300")
            .arg("-c")
            .arg("preserve_interword_spaces=1")
            .arg("tsv")
            .output()
            .await
            .map_err(|err| {
                ExtractError::Recognition(format!(
                    "failed to run tesseract (is it installed?): {err}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Recognition(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }
        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Word rows (level 5) carry text and confidence; rows with negative
/// confidence are structural and skipped. Consecutive rows sharing a
/// (page, block, paragraph, line) key form one line, in row order.
pub(crate) fn parse_tsv(tsv: &str) -> RecognitionResult {
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut current_key: Option<(u32, u32, u32, u32)> = None;

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let cols = row.split('\t').collect::<Vec<_>>();
        if cols.len() < 12 {
            continue;
        }
        let level: u32 = cols[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let page_num: u32 = cols[1].parse().unwrap_or(0);
        let block_num: u32 = cols[2].parse().unwrap_or(0);
        let par_num: u32 = cols[3].parse().unwrap_or(0);
        let line_num: u32 = cols[4].parse().unwrap_or(0);
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }

        let key = (page_num, block_num, par_num, line_num);
        if current_key != Some(key) {
            lines.push(Vec::new());
            current_key = Some(key);
        }
        if let Some(line) = lines.last_mut() {
            line.push(Word::new(text, conf));
        }
    }

    RecognitionResult::from_lines(lines)
}

pub fn list_tesseract_languages() -> Result<Vec<String>> {
    let output = Command::new("tesseract")
        .arg("--list-langs")
        .output()
        .map_err(|err| {
            ExtractError::Recognition(format!("failed to run tesseract --list-langs: {err}"))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Recognition(format!(
            "tesseract --list-langs failed: {}",
            stderr.trim()
        )));
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut langs = Vec::new();
    for (idx, line) in stdout.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let value = line.trim();
        if !value.is_empty() {
            langs.push(value.to_string());
        }
    }
    Ok(langs)
}

/// Checks the requested language hint against the installed packs. Missing
/// packs are dropped with a warning; an empty remainder is an error. When
/// the installed list cannot be read the hint passes through untouched.
pub fn normalize_languages(requested: &str) -> Result<String> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Recognition(
            "language hint is empty".to_string(),
        ));
    }

    let available = match list_tesseract_languages() {
        Ok(list) => list,
        Err(_) => return Ok(trimmed.to_string()),
    };

    let mut chosen = Vec::new();
    let mut missing = Vec::new();
    for raw in trimmed.split(['+', ',', ' ']) {
        let lang = raw.trim();
        if lang.is_empty() {
            continue;
        }
        if available.iter().any(|value| value == lang) {
            chosen.push(lang.to_string());
        } else {
            missing.push(lang.to_string());
        }
    }

    if chosen.is_empty() {
        return Err(ExtractError::Recognition(format!(
            "language pack(s) not installed: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        )));
    }
    if !missing.is_empty() {
        warn!(
            "language pack(s) not installed: {} (available: {})",
            missing.join(", "),
            available.join(", ")
        );
    }

    Ok(chosen.join("+"))
}
