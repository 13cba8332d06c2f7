//! Viewer configuration
//!
//! Every tuning constant of the camera, the interaction state machine and
//! the renderer lives here, loadable from `sketch3d.toml`. Missing keys take
//! their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::style::{Color, Style};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "sketch3d.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
    /// Style given to newly created shapes
    pub style: Style,
}

/// Camera start state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub pitch: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
}

/// Pointer sensitivities and hit radii. Radii are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub pick_radius: f32,
    /// Move and scale gizmos
    pub gizmo_radius: f32,
    pub rotate_gizmo_radius: f32,
    /// World units per pixel along a gizmo axis
    pub move_speed: f32,
    /// World units per pixel when dragging a shape body
    pub free_move_speed: f32,
    /// Scale factor change per pixel
    pub scale_speed: f32,
    /// Vector length change per pixel
    pub vector_length_speed: f32,
    /// Degrees per pixel on a rotate ring
    pub rotate_speed: f32,
    /// Degrees per pixel when dragging a shape body
    pub free_rotate_speed: f32,
    /// Degrees of yaw per pixel of orbit drag
    pub orbit_yaw_speed: f32,
    /// Degrees of pitch per pixel of orbit drag
    pub orbit_pitch_speed: f32,
}

/// Scene furniture and shading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub show_grid: bool,
    pub show_axes: bool,
    /// Direction the light travels, normalized at use
    pub light_direction: [f32; 3],
    pub highlight_fill: Color,
    pub highlight_outline: Color,
    pub grid_color: Color,
    pub grid_major_color: Color,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 20.0,
            yaw: 45.0,
            pitch: 30.0,
            fov: 60.0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pick_radius: 20.0,
            gizmo_radius: 8.0,
            rotate_gizmo_radius: 20.0,
            move_speed: 0.05,
            free_move_speed: 0.03,
            scale_speed: 0.005,
            vector_length_speed: 0.02,
            rotate_speed: 1.0,
            free_rotate_speed: 0.5,
            orbit_yaw_speed: 0.4,
            orbit_pitch_speed: 0.3,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            light_direction: [0.5, 0.7, 0.5],
            highlight_fill: Color::rgb(0xff, 0xff, 0x00),
            highlight_outline: Color::rgb(0xff, 0x88, 0x00),
            grid_color: Color::rgb(0x2a, 0x2a, 0x2a),
            grid_major_color: Color::rgb(0x3a, 0x3a, 0x3a),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `sketch3d.toml` from the current directory, or the defaults if
    /// it is missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.camera.distance, 20.0);
        assert_eq!(config.interaction.pick_radius, 20.0);
        assert_eq!(config.render.light_direction, [0.5, 0.7, 0.5]);
        assert_eq!(config.style, Style::default());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r##"
            [camera]
            distance = 35.0

            [render]
            show_grid = false
            highlight_fill = "#00ffff"

            [style]
            line_color = "red"
            fill_color = "#222222"
        "##;

        let config = ViewerConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.camera.distance, 35.0);
        assert_eq!(config.camera.yaw, 45.0);
        assert!(!config.render.show_grid);
        assert!(config.render.show_axes);
        assert_eq!(config.render.highlight_fill, Color::rgb(0, 255, 255));
        assert_eq!(config.style.line_color, Color::rgb(255, 0, 0));
        assert_eq!(config.style.fill_color, Some(Color::rgb(0x22, 0x22, 0x22)));
        assert_eq!(config.interaction, InteractionConfig::default());
    }

    #[test]
    fn test_bad_color_is_parse_error() {
        let result = ViewerConfig::from_toml("[render]\nhighlight_fill = \"nope\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ViewerConfig::load_from_file("/nonexistent/sketch3d.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = ViewerConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(ViewerConfig::from_toml(&text).unwrap(), config);
    }
}
