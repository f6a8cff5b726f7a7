use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::tidy::names::{DEFAULT_LECTURE_MARKER, LectureNumbering};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    pub document_extension: String,
    pub folder_prefix: String,
    pub lecture_marker: String,
    pub missing_report_limit: usize,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            document_extension: "md".to_string(),
            folder_prefix: "lecture".to_string(),
            lecture_marker: DEFAULT_LECTURE_MARKER.to_string(),
            missing_report_limit: 10,
        }
    }
}

impl TidyConfig {
    /// `"<prefix> NN"`.
    pub fn folder_name(&self, number: &str) -> String {
        format!("{} {number}", self.folder_prefix)
    }

    pub fn numbering(&self) -> Result<LectureNumbering> {
        LectureNumbering::new(&self.lecture_marker)
            .map_err(|err| anyhow!("invalid lecture marker `{}`: {err}", self.lecture_marker))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigFile {
    tidy: Option<TidyConfig>,
}

fn env_or_string(var: &str, fallback: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn validate(cfg: &TidyConfig) -> Result<()> {
    let ext = cfg.document_extension.as_str();
    if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
        return Err(anyhow!(
            "invalid document extension `{ext}`: use a bare extension such as `md`"
        ));
    }
    if cfg.folder_prefix.trim().is_empty() || cfg.folder_prefix.contains(['/', '\\']) {
        return Err(anyhow!(
            "invalid folder prefix `{}`: must be non-empty and contain no path separators",
            cfg.folder_prefix
        ));
    }
    if cfg.lecture_marker.is_empty() {
        return Err(anyhow!("invalid lecture marker: cannot be empty"));
    }
    if cfg.missing_report_limit == 0 {
        return Err(anyhow!("invalid missing report limit: must be >= 1"));
    }
    Ok(())
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("LECTURE_TIDY_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let base = dirs::config_dir()?;
    Some(base.join("lecture-tidy").join("config.toml"))
}

fn parse_file_config(raw: &str) -> Result<Option<TidyConfig>> {
    let parsed: ConfigFile = toml::from_str(raw)?;
    Ok(parsed.tidy)
}

fn merge_file_config(base: &mut TidyConfig) -> Result<()> {
    let Some(path) = resolve_config_path() else {
        return Ok(());
    };
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed = parse_file_config(&raw)
        .map_err(|err| anyhow!("failed to parse config {}: {err}", path.display()))?;
    if let Some(tidy) = parsed {
        *base = tidy;
    }
    Ok(())
}

pub fn load_config() -> Result<TidyConfig> {
    let mut cfg = TidyConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.document_extension = env_or_string("LECTURE_TIDY_DOC_EXT", &cfg.document_extension);
    cfg.folder_prefix = env_or_string("LECTURE_TIDY_FOLDER_PREFIX", &cfg.folder_prefix);
    cfg.lecture_marker = env_or_string("LECTURE_TIDY_MARKER", &cfg.lecture_marker);
    cfg.missing_report_limit =
        env_or_usize("LECTURE_TIDY_MISSING_LIMIT", cfg.missing_report_limit);

    validate(&cfg)?;
    Ok(cfg)
}
