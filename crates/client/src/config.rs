use serde::{Deserialize, Serialize};
use skyview_common::Size;
use skyview_kernel::FixedStepLoop;
use skyview_render::RendererConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Engine configuration. Every field has a default, so partial files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Surface size used when the host has no usable container.
    pub fallback_surface: Size,
    pub renderer: RendererConfig,
    /// Fixed update rate.
    pub tick_rate_hz: f64,
    /// Longest real frame fed to the loop accumulator.
    pub max_frame_time_secs: f64,
    /// Draw the camera view box as an outline in the stage layer.
    pub debug_view_box: bool,
    /// Zoom of the default fixed camera.
    pub camera_zoom: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_surface: Size::new(1, 1),
            renderer: RendererConfig::default(),
            tick_rate_hz: 60.0,
            max_frame_time_secs: 0.25,
            debug_view_box: false,
            camera_zoom: 1.0,
        }
    }
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// A fixed-step loop at the configured rate.
    pub fn frame_loop(&self) -> FixedStepLoop {
        FixedStepLoop::new(self.tick_rate_hz, self.max_frame_time_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.fallback_surface, Size::new(1, 1));
        assert_eq!(c.tick_rate_hz, 60.0);
        assert!(!c.debug_view_box);
        assert!((c.frame_loop().fixed_dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(
            &path,
            r#"{"tick_rate_hz": 30, "debug_view_box": true, "renderer": {"antialias": false}}"#,
        )
        .unwrap();

        let c = EngineConfig::load(&path).unwrap();
        assert_eq!(c.tick_rate_hz, 30.0);
        assert!(c.debug_view_box);
        assert!(!c.renderer.antialias);
        assert_eq!(c.camera_zoom, 1.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ tick_rate_hz: ").unwrap();
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }
}
