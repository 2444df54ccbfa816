use crate::*;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(path))]
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    info!("Loading configuration from: {:?}", path);

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    debug!("Config file content length: {} bytes", content.len());

    let substituted = substitution::substitute_env_vars(&content)?;

    // An empty document parses as YAML null
    if substituted.trim().is_empty() {
        return Ok(AppConfig::default());
    }

    let config: AppConfig = serde_yaml::from_str(&substituted)
        .with_context(|| "Failed to parse YAML configuration")?;

    info!("Configuration loaded successfully");
    Ok(config)
}

/// Load `path`, or fall back to built-in defaults when the file does not exist.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Config file {:?} not found, using built-in defaults", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}

#[instrument]
pub fn generate_default_config() -> AppConfig {
    AppConfig {
        analytics: Some(AnalyticsConfig::default()),
        history: Some(HistoryConfig::default()),
        logging: Some(LoggingConfig::default()),
        strategy: Some(StrategyConfig::default()),
    }
}

#[instrument]
pub fn save_config<P: AsRef<Path> + std::fmt::Debug>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving configuration to: {:?}", path);

    let yaml = serde_yaml::to_string(config)
        .with_context(|| "Failed to serialize configuration to YAML")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    info!("Configuration saved successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("optlens-config-{}", uuid::Uuid::new_v4()))
            .join("optlens.yaml")
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let path = temp_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "analytics:\n  strike_step: 50\nhistory:\n  backend: memory\n").unwrap();

        let config = load_config(&path).unwrap();

        let analytics = config.analytics();
        assert_eq!(analytics.strike_step, 50.0);
        assert_eq!(analytics.risk_free_rate, 0.07);
        assert_eq!(analytics.days_to_expiry, 7);
        assert_eq!(config.history().backend, "memory");
        assert_eq!(config.history().window, 180);
        assert!(config.strategy.is_none());
        assert_eq!(config.strategy().capital, 100_000.0);
    }

    #[test]
    fn test_empty_file_is_default() {
        let path = temp_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "").unwrap();

        assert_eq!(load_config(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_or_default(temp_config_path()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let path = temp_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "history:\n  window: [not, a, number]\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_save_then_load_default_config() {
        let path = temp_config_path();
        let config = generate_default_config();

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        assert_eq!(loaded, config);
        assert_eq!(loaded.history().path, "data/iv_history.json");
    }
}
