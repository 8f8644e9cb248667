use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::fields::default_address_keywords;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub languages: String,
    pub confidence_floor: f32,
    pub line_yield: f32,
    pub score_floor: f32,
    pub address_keywords: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            languages: "eng+tam".to_string(),
            confidence_floor: 45.0,
            line_yield: 0.4,
            score_floor: 50.0,
            address_keywords: default_address_keywords(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    ocr: Option<OcrSettings>,
    thresholds: Option<ThresholdSettings>,
    parser: Option<ParserSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct OcrSettings {
    languages: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ThresholdSettings {
    confidence_floor: Option<f32>,
    line_yield: Option<f32>,
    score_floor: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ParserSettings {
    address_keywords: Option<Vec<String>>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
    }
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(ocr) = incoming.ocr {
            if let Some(languages) = ocr.languages {
                if !languages.trim().is_empty() {
                    self.languages = languages;
                }
            }
        }
        if let Some(thresholds) = incoming.thresholds {
            if let Some(floor) = thresholds.confidence_floor {
                if (0.0..=100.0).contains(&floor) {
                    self.confidence_floor = floor;
                }
            }
            if let Some(yield_fraction) = thresholds.line_yield {
                if (0.0..1.0).contains(&yield_fraction) {
                    self.line_yield = yield_fraction;
                }
            }
            if let Some(floor) = thresholds.score_floor {
                if (0.0..=100.0).contains(&floor) {
                    self.score_floor = floor;
                }
            }
        }
        if let Some(parser) = incoming.parser {
            if let Some(keywords) = parser.address_keywords {
                if !keywords.is_empty() {
                    self.address_keywords = keywords;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".signtext"))
        }
    })
}
