use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::spec::{BackgroundMode, EffectSpec, GlowStyle};

/// One render request as described by a JSON job file. Field names and
/// defaults match the CLI surface; unknown fields are rejected outright so a
/// typo cannot silently change a batch render.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobRequest {
    pub input: PathBuf,
    /// Defaults to `neon_<color>_<timestamp>.mp4` next to the working
    /// directory when omitted.
    #[serde(default)]
    pub output: Option<PathBuf>,
    pub text: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_x")]
    pub x: f64,
    #[serde(default = "default_y")]
    pub y: f64,
    #[serde(default)]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub layers: Option<u8>,
    #[serde(default = "default_true")]
    pub blur_background: bool,
    #[serde(default)]
    pub palette: Option<String>,
    #[serde(default)]
    pub font: Option<PathBuf>,
}

fn default_color() -> String {
    "white".to_owned()
}

fn default_x() -> f64 {
    0.5
}

fn default_y() -> f64 {
    0.7
}

fn default_true() -> bool {
    true
}

/// A job resolved into compiler inputs plus the file endpoints.
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    pub spec: EffectSpec,
    pub palette: Option<String>,
    pub font: Option<PathBuf>,
}

pub fn load_job(path: &Path) -> Result<Job> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read job file {}", path.display()))?;
    let request: JobRequest = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse job file {}", path.display()))?;
    request.into_job()
}

impl JobRequest {
    pub fn into_job(self) -> Result<Job> {
        let style = match &self.style {
            Some(name) => GlowStyle::parse(name, self.layers)?,
            None => GlowStyle::CleanSplit,
        };
        let output = self
            .output
            .unwrap_or_else(|| PathBuf::from(default_output_name(&self.color)));
        let spec = EffectSpec {
            text: self.text,
            color: self.color,
            x: self.x,
            y: self.y,
            font_size: self.font_size,
            background: if self.blur_background {
                BackgroundMode::Blurred
            } else {
                BackgroundMode::CroppedOnly
            },
            style,
        };
        Ok(Job {
            input: self.input,
            output,
            spec,
            palette: self.palette,
            font: self.font,
        })
    }
}

fn default_output_name(color: &str) -> String {
    format!("neon_{color}_{}.mp4", chrono::Utc::now().timestamp_millis())
}
