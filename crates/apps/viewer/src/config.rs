use std::env;
use std::time::Duration;

use scene::{Viewport, ZoomConfig};
use serde::{Deserialize, Serialize};
use streaming::DEFAULT_TOPOLOGY_URL;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "config field {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Engine settings. Every field has a default, so partial JSON documents and
/// sparse environments both work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub topology_url: String,
    /// TopoJSON object holding the country geometries.
    pub topology_object: String,
    pub fetch_timeout_s: f64,

    pub map_width: f64,
    pub map_height: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub translate_margin: f64,
    pub wheel_step: f64,
    pub boundary_stroke_width: f64,

    pub story_width: f64,
    pub story_height: f64,
    /// Seed for threat-zone placement. Fixed seeds replay identically.
    pub overlay_seed: u64,
    pub label_cell_px: f64,
    pub max_labels: usize,

    pub mini_width: f64,
    pub mini_height: f64,
    pub mini_scale: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            topology_url: DEFAULT_TOPOLOGY_URL.to_string(),
            topology_object: "countries".to_string(),
            fetch_timeout_s: 30.0,
            map_width: 800.0,
            map_height: 600.0,
            min_zoom: 1.0,
            max_zoom: 8.0,
            translate_margin: 0.3,
            wheel_step: 0.002,
            boundary_stroke_width: 0.5,
            story_width: 1000.0,
            story_height: 600.0,
            overlay_seed: 0x5eed,
            label_cell_px: 16.0,
            max_labels: 400,
            mini_width: 500.0,
            mini_height: 300.0,
            mini_scale: 80.0,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `ATLAS_*` variables over the defaults. Unset or unparsable
    /// variables keep the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let d = Self::default();
        let config = Self {
            topology_url: env::var("ATLAS_TOPOLOGY_URL").unwrap_or(d.topology_url),
            topology_object: env::var("ATLAS_TOPOLOGY_OBJECT").unwrap_or(d.topology_object),
            fetch_timeout_s: env_var_f64("ATLAS_FETCH_TIMEOUT_S", d.fetch_timeout_s),
            map_width: env_var_f64("ATLAS_MAP_WIDTH", d.map_width),
            map_height: env_var_f64("ATLAS_MAP_HEIGHT", d.map_height),
            min_zoom: env_var_f64("ATLAS_MIN_ZOOM", d.min_zoom),
            max_zoom: env_var_f64("ATLAS_MAX_ZOOM", d.max_zoom),
            translate_margin: env_var_f64("ATLAS_TRANSLATE_MARGIN", d.translate_margin),
            wheel_step: env_var_f64("ATLAS_WHEEL_STEP", d.wheel_step),
            boundary_stroke_width: env_var_f64("ATLAS_BOUNDARY_STROKE", d.boundary_stroke_width),
            story_width: env_var_f64("ATLAS_STORY_WIDTH", d.story_width),
            story_height: env_var_f64("ATLAS_STORY_HEIGHT", d.story_height),
            overlay_seed: env_var_u64("ATLAS_OVERLAY_SEED", d.overlay_seed),
            label_cell_px: env_var_f64("ATLAS_LABEL_CELL_PX", d.label_cell_px),
            max_labels: env_var_usize("ATLAS_MAX_LABELS", d.max_labels),
            mini_width: env_var_f64("ATLAS_MINI_WIDTH", d.mini_width),
            mini_height: env_var_f64("ATLAS_MINI_HEIGHT", d.mini_height),
            mini_scale: env_var_f64("ATLAS_MINI_SCALE", d.mini_scale),
        };
        config.validate()?;
        tracing::debug!(?config, "engine config loaded from environment");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("map_width", self.map_width),
            ("map_height", self.map_height),
            ("story_width", self.story_width),
            ("story_height", self.story_height),
            ("mini_width", self.mini_width),
            ("mini_height", self.mini_height),
            ("mini_scale", self.mini_scale),
            ("fetch_timeout_s", self.fetch_timeout_s),
            ("label_cell_px", self.label_cell_px),
            ("min_zoom", self.min_zoom),
        ];
        for (field, value) in sizes {
            positive(field, value)?;
        }
        if !self.max_zoom.is_finite() || self.max_zoom < self.min_zoom {
            return Err(invalid(
                "max_zoom",
                format!("{} must be at least min_zoom {}", self.max_zoom, self.min_zoom),
            ));
        }
        if !self.translate_margin.is_finite() || self.translate_margin < 0.0 {
            return Err(invalid(
                "translate_margin",
                format!("{} must be non-negative", self.translate_margin),
            ));
        }
        if !self.wheel_step.is_finite() {
            return Err(invalid("wheel_step", "must be finite".to_string()));
        }
        if !self.boundary_stroke_width.is_finite() || self.boundary_stroke_width < 0.0 {
            return Err(invalid(
                "boundary_stroke_width",
                format!("{} must be non-negative", self.boundary_stroke_width),
            ));
        }
        if self.topology_url.trim().is_empty() {
            return Err(invalid("topology_url", "must not be empty".to_string()));
        }
        self.fetch_timeout()?;
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.fetch_timeout_s)
            .map_err(|err| invalid("fetch_timeout_s", format!("{}: {err}", self.fetch_timeout_s)))
    }

    pub fn map_viewport(&self) -> Viewport {
        Viewport::new(self.map_width, self.map_height)
    }

    pub fn story_viewport(&self) -> Viewport {
        Viewport::new(self.story_width, self.story_height)
    }

    pub fn mini_viewport(&self) -> Viewport {
        Viewport::new(self.mini_width, self.mini_height)
    }

    pub fn zoom_config(&self) -> ZoomConfig {
        ZoomConfig {
            min_k: self.min_zoom,
            max_k: self.max_zoom,
            translate_margin: self.translate_margin,
            wheel_step: self.wheel_step,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be positive")))
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn env_var_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
