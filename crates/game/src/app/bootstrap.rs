use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use gridloop::{ConfigError, LoopConfig, CONFIG_PATH_ENV_VAR};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Grid Loop Startup ===");

    let config_path = env::var_os(CONFIG_PATH_ENV_VAR).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?.with_env_overrides();
    config.validate()?;

    Ok(AppWiring { config })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LoopConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(LoopConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let config = LoopConfig::from_json_str(&raw)?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}
