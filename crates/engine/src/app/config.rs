use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::rendering::{surface_viewport, Viewport};
use super::simulation::GridSize;

pub const CONFIG_PATH_ENV_VAR: &str = "GRIDLOOP_CONFIG";
pub const MAX_TICKS_ENV_VAR: &str = "GRIDLOOP_MAX_TICKS_PER_FRAME";
pub const SLOW_FRAME_ENV_VAR: &str = "GRIDLOOP_SLOW_FRAME_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least one column and one row (got {columns}x{rows})")]
    EmptyGrid { columns: u32, rows: u32 },
    #[error("tile size must be non-zero")]
    ZeroTileSize,
    #[error("surface of {columns}x{rows} tiles at {tile_size}px does not fit in u32 pixels")]
    SurfaceTooLarge {
        columns: u32,
        rows: u32,
        tile_size: u32,
    },
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse loop config at {json_path}: {source}")]
    Parse {
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoopConfig {
    pub window_title: String,
    pub columns: u32,
    pub rows: u32,
    pub tile_size: u32,
    /// `None` lets a late frame catch up with as many ticks as it owes.
    pub max_ticks_per_frame: Option<u32>,
    pub metrics_log_interval_ms: u64,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Grid Loop".to_string(),
            columns: 64,
            rows: 48,
            tile_size: 16,
            max_ticks_per_frame: None,
            metrics_log_interval_ms: 1000,
            simulated_slow_frame_ms: 0,
        }
    }
}

impl LoopConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, LoopConfig>(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                json_path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        })
    }

    /// Checks the grid and surface dimensions and returns the grid they describe.
    pub fn validate(&self) -> Result<GridSize, ConfigError> {
        let grid = GridSize::new(self.columns, self.rows)?;
        self.surface_viewport(grid)?;
        Ok(grid)
    }

    pub(crate) fn surface_viewport(&self, grid: GridSize) -> Result<Viewport, ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        surface_viewport(grid, self.tile_size).ok_or(ConfigError::SurfaceTooLarge {
            columns: grid.columns(),
            rows: grid.rows(),
            tile_size: self.tile_size,
        })
    }

    pub fn max_ticks_per_frame(&self) -> Option<u32> {
        normalize_tick_cap(self.max_ticks_per_frame)
    }

    pub fn metrics_log_interval(&self) -> Duration {
        normalize_non_zero_duration(
            Duration::from_millis(self.metrics_log_interval_ms),
            Duration::from_secs(1),
        )
    }

    pub fn slow_frame_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_slow_frame_ms)
    }

    /// Layers `GRIDLOOP_MAX_TICKS_PER_FRAME` and `GRIDLOOP_SLOW_FRAME_MS` over
    /// the current values. Unreadable values are logged and ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(max_ticks) = read_env_u64(MAX_TICKS_ENV_VAR, env::var(MAX_TICKS_ENV_VAR)) {
            let max_ticks = u32::try_from(max_ticks).unwrap_or(u32::MAX);
            self.max_ticks_per_frame = normalize_tick_cap(Some(max_ticks));
        }
        if let Some(slow_ms) = read_env_u64(SLOW_FRAME_ENV_VAR, env::var(SLOW_FRAME_ENV_VAR)) {
            self.simulated_slow_frame_ms = slow_ms;
        }
        self
    }
}

fn read_env_u64(var: &'static str, value: Result<String, env::VarError>) -> Option<u64> {
    match value {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    env_var = var,
                    value = raw.as_str(),
                    "invalid env var value; keeping configured value"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var = var,
                error = %err,
                "unable to read env var; keeping configured value"
            );
            None
        }
    }
}

fn normalize_tick_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
