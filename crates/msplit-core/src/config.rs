// ABOUTME: Engine configuration handling.
// ABOUTME: Loads and saves geometry, validation, and history settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Divider sizing used by the geometry engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometrySettings {
    /// Visible gap between adjacent children of a split, in pixels
    pub handle_width: u32,
    /// Extra grab area on each side of a divider; does not change its visual width
    pub hit_area_padding: u32,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            handle_width: 6,
            hit_area_padding: 4,
        }
    }
}

/// Limits enforced (or warned about) before a command executes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Smallest share a split may give the new pane
    pub min_split_ratio: f64,
    /// Largest share a split may give the new pane
    pub max_split_ratio: f64,
    /// Smallest share any child may be resized down to
    pub min_resize_ratio: f64,
    /// Ratios below this produce a warning
    pub small_ratio_warning: f64,
    /// Tree depth beyond which a warning is emitted
    pub max_depth: usize,
    /// Pane count beyond which a warning is emitted
    pub max_panes: usize,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            min_split_ratio: 0.1,
            max_split_ratio: 0.9,
            min_resize_ratio: 0.05,
            small_ratio_warning: 0.15,
            max_depth: 10,
            max_panes: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Oldest undo entries are dropped beyond this
    pub max_undo_levels: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_undo_levels: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSettings {
    /// Raise a focus indicator overlay above the focused pane
    pub show_indicator: bool,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            show_indicator: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub geometry: GeometrySettings,
    pub validation: ValidationSettings,
    pub history: HistorySettings,
    pub focus: FocusSettings,

    /// Viewport used until the host reports a real one
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geometry: GeometrySettings::default(),
            validation: ValidationSettings::default(),
            history: HistorySettings::default(),
            focus: FocusSettings::default(),
            viewport_width: 1200,
            viewport_height: 800,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,
}

impl Config {
    /// Get the default config file path (~/.config/multisplit/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("multisplit").join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(toml::from_str(&std::fs::read_to_string(path)?)?)
    }

    /// Settings from the default path; missing or unreadable files give the defaults
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_default(),
            _ => Self::default(),
        }
    }

    /// Write next to the target and rename over it, so a failed save keeps the old file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        let tmp = path.with_extension("toml.tmp");
        if let Err(e) = std::fs::write(&tmp, content).and_then(|()| std::fs::rename(&tmp, path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save(&path)?;
        Ok(path)
    }
}
