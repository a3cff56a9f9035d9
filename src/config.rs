use std::{env, fs, path::Path, path::PathBuf};

use directories::BaseDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::state::DEFAULT_PAGE_SIZES;
use crate::services::ApiConfig;

const CONFIG: &str = include_str!("../.config/config.json5");

/// Color palette selection
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub api_base: String,
    pub page_size: usize,
    #[serde(default)]
    pub page_sizes: Vec<usize>,
    #[serde(default)]
    pub auto_chain: bool,
    #[serde(default)]
    pub show_hits_only: bool,
    #[serde(default)]
    pub theme: ThemeName,
    #[serde(default)]
    pub keybindings_path: Option<PathBuf>,
    pub toast_ticks: u64,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Layer embedded defaults, the user file and `SHEETRX_*` variables
    ///
    /// With no explicit path the file at `~/.sheetrx-config.json5` is used,
    /// and written from the embedded defaults when missing.
    pub fn from_path(config_path: Option<&PathBuf>) -> Result<Self, config::ConfigError> {
        let selected_path = match config_path {
            Some(p) => expand_tilde(p),
            None => {
                let home_cfg = default_home_config_path();
                if !home_cfg.exists() {
                    if let Some(parent) = home_cfg.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    if let Err(e) = fs::write(&home_cfg, CONFIG) {
                        warn!("Could not write default config to {}: {}", home_cfg.display(), e);
                    }
                }
                home_cfg
            }
        };
        Self::build(
            Some(&selected_path),
            config::Environment::with_prefix(&PROJECT_NAME).try_parsing(true),
        )
    }

    /// Embedded defaults only
    pub fn embedded() -> Result<Self, config::ConfigError> {
        Self::build(None, config::Environment::default().source(Some(Default::default())))
    }

    fn build(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));
        if let Some(path) = path {
            debug!("Loading config from {}", path.display());
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json5)
                    .required(false),
            );
        }
        let cfg: Self = builder.add_source(environment).build()?.try_deserialize()?;
        Ok(cfg.normalized())
    }

    fn normalized(mut self) -> Self {
        self.page_sizes.retain(|s| *s > 0);
        if self.page_sizes.is_empty() {
            self.page_sizes = DEFAULT_PAGE_SIZES.to_vec();
        }
        if self.page_size == 0 {
            self.page_size = 100;
        }
        self.toast_ticks = self.toast_ticks.max(1);
        self
    }

    pub fn api(&self) -> ApiConfig {
        ApiConfig {
            api_base: self.api_base.clone(),
        }
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix('~') {
            if let Some(base) = BaseDirs::new() {
                return base.home_dir().join(rest.trim_start_matches(['/', '\\']));
            }
        }
    }
    path.to_path_buf()
}

fn default_home_config_path() -> PathBuf {
    if let Some(dir) = CONFIG_FOLDER.clone() {
        return dir.join("config.json5");
    }
    if let Some(base) = BaseDirs::new() {
        return base.home_dir().join(".sheetrx-config.json5");
    }
    PathBuf::from(".sheetrx-config.json5")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn no_env() -> config::Environment {
        config::Environment::with_prefix("SHEETRX").source(Some(HashMap::new()))
    }

    #[test]
    fn test_embedded_defaults() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.api_base, "http://localhost:8000/api");
        assert_eq!(cfg.page_size, 100);
        assert_eq!(cfg.page_sizes, vec![25, 50, 100, 200]);
        assert!(!cfg.auto_chain);
        assert_eq!(cfg.theme, ThemeName::Dark);
        assert!(cfg.keybindings_path.is_none());
    }

    #[test]
    fn test_user_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.json5");
        fs::write(
            &path,
            "{ api_base: 'http://example.test/api', theme: 'light', page_sizes: [10, 0, 20] }",
        )
        .unwrap();
        let cfg = Config::build(Some(&path), no_env()).unwrap();
        assert_eq!(cfg.api_base, "http://example.test/api");
        assert_eq!(cfg.theme, ThemeName::Light);
        assert_eq!(cfg.page_sizes, vec![10, 20]);
        assert_eq!(cfg.page_size, 100);
    }

    #[test]
    fn test_missing_user_file_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::build(Some(&dir.path().join("nope.json5")), no_env()).unwrap();
        assert_eq!(cfg.toast_ticks, 16);
    }

    #[test]
    fn test_environment_overrides_file() {
        let vars: HashMap<String, String> = [
            ("SHEETRX_API_BASE".to_string(), "http://env.test".to_string()),
            ("SHEETRX_PAGE_SIZE".to_string(), "25".to_string()),
            ("SHEETRX_AUTO_CHAIN".to_string(), "true".to_string()),
        ]
        .into_iter()
        .collect();
        let env = config::Environment::with_prefix("SHEETRX")
            .try_parsing(true)
            .source(Some(vars));
        let cfg = Config::build(None, env).unwrap();
        assert_eq!(cfg.api_base, "http://env.test");
        assert_eq!(cfg.page_size, 25);
        assert!(cfg.auto_chain);
    }

    #[test]
    fn test_api_config() {
        let cfg = Config::embedded().unwrap();
        assert_eq!(cfg.api().api_base, cfg.api_base);
    }
}
