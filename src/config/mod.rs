//! Application Configuration
//!
//! Operator settings and preferences stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Camera settings
    pub camera: CameraSettings,
    /// Preprocessing settings
    pub preprocess: PreprocessSettings,
    /// Storage settings
    pub storage: StorageSettings,
}

/// Camera-related settings, passed through to the device adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSettings {
    /// Preferred pixel format
    pub pixel_format: String,
    /// Fallback when the preferred format is not supported by the device
    pub fallback_pixel_format: String,
    /// Exposure time in microseconds
    pub exposure_time_us: f64,
    /// Acquisition frame rate in frames per second
    pub frame_rate: f64,
    /// Period between frame pulls in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            pixel_format: "BGR8".to_string(),
            fallback_pixel_format: "Mono8".to_string(),
            exposure_time_us: 10_000.0,
            frame_rate: 10.0,
            poll_interval_ms: 100,
        }
    }
}

/// Settings for the frame conditioning pipeline run before recognition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessSettings {
    /// Denoise filter strength; higher removes more noise and more detail
    pub denoise_strength: f32,
    /// Adaptive threshold window size in pixels; must be odd
    pub threshold_block_size: u32,
    /// Constant subtracted from the local mean before thresholding
    pub threshold_offset: f32,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            denoise_strength: 10.0,
            threshold_block_size: 11,
            threshold_offset: 2.0,
        }
    }
}

/// Persistence-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database path; defaults to the platform data directory
    pub database_path: Option<PathBuf>,
    /// Where to write the annotated inspection image, or None to skip it
    pub annotated_image_path: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            annotated_image_path: Some(PathBuf::from("ocr_result.jpg")),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();

        // Check camera defaults
        assert_eq!(config.camera.pixel_format, "BGR8");
        assert_eq!(config.camera.fallback_pixel_format, "Mono8");
        assert!((config.camera.exposure_time_us - 10_000.0).abs() < f64::EPSILON);
        assert!((config.camera.frame_rate - 10.0).abs() < f64::EPSILON);
        assert_eq!(config.camera.poll_interval_ms, 100);

        // Check preprocessing defaults
        assert!((config.preprocess.denoise_strength - 10.0).abs() < 0.01);
        assert_eq!(config.preprocess.threshold_block_size, 11);
        assert!((config.preprocess.threshold_offset - 2.0).abs() < 0.01);

        // Check storage defaults
        assert!(config.storage.database_path.is_none());
        assert_eq!(
            config.storage.annotated_image_path,
            Some(PathBuf::from("ocr_result.jpg"))
        );
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = AppConfig::default();

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.camera.pixel_format, parsed.camera.pixel_format);
        assert_eq!(config.camera.poll_interval_ms, parsed.camera.poll_interval_ms);
        assert_eq!(
            config.preprocess.threshold_block_size,
            parsed.preprocess.threshold_block_size
        );
        assert_eq!(
            config.storage.annotated_image_path,
            parsed.storage.annotated_image_path
        );
    }

    #[test]
    fn test_config_with_custom_values() {
        let mut config = AppConfig::default();
        config.camera.pixel_format = "Mono8".to_string();
        config.camera.poll_interval_ms = 50;
        config.preprocess.denoise_strength = 4.0;
        config.storage.annotated_image_path = None;

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.camera.pixel_format, "Mono8");
        assert_eq!(parsed.camera.poll_interval_ms, 50);
        assert!((parsed.preprocess.denoise_strength - 4.0).abs() < 0.01);
        assert!(parsed.storage.annotated_image_path.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let config = AppConfig::default();
        let temp_file = NamedTempFile::new().unwrap();

        save_config(&config, temp_file.path()).unwrap();
        let loaded = load_config(temp_file.path()).unwrap();

        assert_eq!(config.camera.pixel_format, loaded.camera.pixel_format);
        assert_eq!(config.camera.poll_interval_ms, loaded.camera.poll_interval_ms);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "this is not valid toml {{{{").unwrap();

        let result = load_config(temp_file.path());
        assert!(result.is_err());
    }
}
