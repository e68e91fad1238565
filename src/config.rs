//! Settings file for the annotator.
//!
//! The command line only names a category; everything else (dataset layout,
//! display scale, overlay look, segmentation budget, logging) lives in an
//! optional JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AnnotatorError;

pub const CONFIG_ENV_VAR: &str = "MASK_ANNOTATOR_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "mask-annotator.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dataset_root: PathBuf,
    pub source_dir_name: String,
    pub mask_dir_name: String,
    /// Integer upscale from native image size to the on-screen image.
    pub scale_factor: u32,
    pub overlay_color: [u8; 3],
    pub overlay_alpha: u8,
    pub grabcut_iterations: u32,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("dataset"),
            source_dir_name: "abnormal_dir".to_string(),
            mask_dir_name: "mask_dir".to_string(),
            scale_factor: 2,
            overlay_color: [255, 255, 255],
            overlay_alpha: 150,
            grabcut_iterations: 5,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Reads the config from `$MASK_ANNOTATOR_CONFIG`, else from
    /// `./mask-annotator.json`, else falls back to defaults.
    pub fn load() -> Result<Self, AnnotatorError> {
        Self::load_from(std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
    }

    /// An explicitly named file must exist; only the implicit default file
    /// may be absent.
    pub fn load_from(explicit: Option<PathBuf>) -> Result<Self, AnnotatorError> {
        match explicit {
            Some(path) if !path.exists() => Err(AnnotatorError::configuration(format!(
                "{CONFIG_ENV_VAR} names {}, which does not exist",
                path.display()
            ))),
            Some(path) => Self::from_file(&path),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, AnnotatorError> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AnnotatorError::configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&data)
            .map_err(|e| AnnotatorError::configuration(format!("{}: {e}", path.display())))
    }

    pub fn from_json(data: &str) -> Result<Self, AnnotatorError> {
        let config: Config = serde_json::from_str(data)
            .map_err(|e| AnnotatorError::configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnnotatorError> {
        if self.scale_factor == 0 {
            return Err(AnnotatorError::configuration("scale_factor must be at least 1"));
        }
        if self.grabcut_iterations == 0 {
            return Err(AnnotatorError::configuration(
                "grabcut_iterations must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn source_dir(&self, category: &str) -> PathBuf {
        self.dataset_root.join(category).join(&self.source_dir_name)
    }

    pub fn mask_dir(&self, category: &str) -> PathBuf {
        self.dataset_root.join(category).join(&self.mask_dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scale_factor, 2);
        assert_eq!(config.overlay_alpha, 150);
    }

    #[test]
    fn category_maps_to_source_and_mask_dirs() {
        let config = Config::from_json(r#"{ "dataset_root": "/data" }"#).unwrap();
        assert_eq!(
            config.source_dir("bottle"),
            PathBuf::from("/data/bottle/abnormal_dir")
        );
        assert_eq!(config.mask_dir("bottle"), PathBuf::from("/data/bottle/mask_dir"));
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = Config::from_json(r#"{ "scale_factor": 0 }"#).unwrap_err();
        assert!(matches!(err, AnnotatorError::Configuration { .. }));
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = Config::from_json("{ scale_factor: ").unwrap_err();
        assert!(matches!(err, AnnotatorError::Configuration { .. }));
    }

    #[test]
    fn log_level_parses_lowercase() {
        let config = Config::from_json(r#"{ "log_level": "debug" }"#).unwrap();
        assert_eq!(config.log_level.to_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(Some(dir.path().join("missing.json"))).unwrap_err();
        assert!(matches!(err, AnnotatorError::Configuration { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn explicit_path_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotator.json");
        std::fs::write(&path, r#"{ "scale_factor": 3 }"#).unwrap();
        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.scale_factor, 3);
    }
}
