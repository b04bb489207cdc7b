use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::engine::interaction::ZoomLimits;
use crate::engine::physics::ForceParams;
use crate::topology::{Aggregation, DataSource, StatusQuery, TimeWindow};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("source.window_minutes must be between 1 and 60, got {0}")]
    WindowOutOfRange(u32),
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("physics.velocity_decay must be in [0, 1), got {0}")]
    VelocityDecay(f32),
    #[error("physics.charge must be negative, got {0}")]
    AttractiveCharge(f32),
    #[error("{field} must be in {range}, got {value}")]
    OutOfUnitRange {
        field: &'static str,
        range: &'static str,
        value: f32,
    },
    #[error("view.min_zoom ({min}) must be below view.max_zoom ({max})")]
    ZoomRange { min: f32, max: f32 },
    #[error("source.kind = \"file\" requires source.path")]
    MissingPath,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Status,
    Prometheus,
    File,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub url: String,
    /// PromQL label matcher appended to `probe_success`, e.g. `{job="icmp"}`.
    pub filter: String,
    pub path: Option<PathBuf>,
    pub window_minutes: u32,
    pub aggregation: Aggregation,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Status,
            url: "http://localhost:8080/status".to_owned(),
            filter: String::new(),
            path: None,
            window_minutes: 10,
            aggregation: Aggregation::Average,
            timeout_secs: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Zero turns auto-refresh off.
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub link_distance: f32,
    pub charge: f32,
    pub collision_radius: f32,
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub settle_ticks: u32,
    pub reheat_target: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let params = ForceParams::default();
        Self {
            link_distance: params.link_distance,
            charge: params.charge,
            collision_radius: params.collision_radius,
            velocity_decay: params.velocity_decay,
            alpha_min: params.alpha_min,
            settle_ticks: 300,
            reheat_target: params.reheat_target,
        }
    }
}

impl PhysicsConfig {
    pub fn force_params(&self) -> ForceParams {
        ForceParams {
            link_distance: self.link_distance,
            charge: self.charge,
            collision_radius: self.collision_radius,
            velocity_decay: self.velocity_decay,
            alpha_min: self.alpha_min,
            alpha_decay: ForceParams::decay_for(self.alpha_min, self.settle_ticks),
            reheat_target: self.reheat_target,
            ..ForceParams::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self {
            min_zoom: limits.min,
            max_zoom: limits.max,
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub prometheus: Option<String>,
    pub filter: Option<String>,
    pub file: Option<PathBuf>,
    pub window: Option<u32>,
    pub minimum: bool,
    pub refresh_secs: Option<u64>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub refresh: RefreshConfig,
    pub physics: PhysicsConfig,
    pub view: ViewConfig,
}

impl Config {
    /// Reads `path` if given, otherwise starts from defaults. Overrides are
    /// applied before validation.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read config file at {}", path.display())
                })?;
                toml::from_str::<Config>(&content).with_context(|| {
                    format!("Failed to parse config file at {}", path.display())
                })?
            }
            None => Config::default(),
        };

        config.apply(overrides);
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub fn apply(&mut self, overrides: &Overrides) {
        let source = &mut self.source;
        if let Some(url) = &overrides.url {
            source.kind = SourceKind::Status;
            source.url = url.clone();
        }
        if let Some(url) = &overrides.prometheus {
            source.kind = SourceKind::Prometheus;
            source.url = url.clone();
        }
        if let Some(path) = &overrides.file {
            source.kind = SourceKind::File;
            source.path = Some(path.clone());
        }
        if let Some(filter) = &overrides.filter {
            source.filter = filter.clone();
        }
        if let Some(window) = overrides.window {
            source.window_minutes = window;
        }
        if overrides.minimum {
            source.aggregation = Aggregation::Minimum;
        }
        if let Some(interval) = overrides.refresh_secs {
            self.refresh.interval_secs = interval;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = self.source.window_minutes;
        if TimeWindow::new(window).is_err() {
            return Err(ConfigError::WindowOutOfRange(window));
        }
        if self.source.kind == SourceKind::File && self.source.path.is_none() {
            return Err(ConfigError::MissingPath);
        }

        let physics = &self.physics;
        for (field, value) in [
            ("physics.link_distance", physics.link_distance),
            ("physics.collision_radius", physics.collision_radius),
            ("view.min_zoom", self.view.min_zoom),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if physics.charge.is_nan() || physics.charge >= 0.0 {
            return Err(ConfigError::AttractiveCharge(physics.charge));
        }
        if !(physics.alpha_min > 0.0 && physics.alpha_min < 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "physics.alpha_min",
                range: "(0, 1)",
                value: physics.alpha_min,
            });
        }
        if !(physics.reheat_target > 0.0 && physics.reheat_target <= 1.0) {
            return Err(ConfigError::OutOfUnitRange {
                field: "physics.reheat_target",
                range: "(0, 1]",
                value: physics.reheat_target,
            });
        }
        if !(0.0..1.0).contains(&physics.velocity_decay) {
            return Err(ConfigError::VelocityDecay(physics.velocity_decay));
        }
        if self.view.max_zoom.is_nan() || self.view.min_zoom >= self.view.max_zoom {
            return Err(ConfigError::ZoomRange {
                min: self.view.min_zoom,
                max: self.view.max_zoom,
            });
        }
        Ok(())
    }

    pub fn data_source(&self) -> DataSource {
        let source = &self.source;
        match (source.kind, &source.path) {
            (SourceKind::File, Some(path)) => DataSource::File { path: path.clone() },
            (SourceKind::Prometheus, _) => DataSource::Prometheus {
                url: source.url.clone(),
                filter: source.filter.clone(),
            },
            _ => DataSource::Status {
                url: source.url.clone(),
            },
        }
    }

    /// Initial query. Falls back to the default window if the configured one
    /// did not pass validation.
    pub fn query(&self) -> StatusQuery {
        StatusQuery {
            window: TimeWindow::new(self.source.window_minutes).unwrap_or_default(),
            aggregation: self.source.aggregation,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh.interval_secs > 0).then(|| Duration::from_secs(self.refresh.interval_secs))
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.view.min_zoom,
            max: self.view.max_zoom,
        }
    }
}
