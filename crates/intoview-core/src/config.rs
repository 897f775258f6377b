use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::animation::timing::{frame_interval, FRAMES_PER_SECOND};
use crate::animation::{select_scheduler, Scheduler};
use crate::easing::Easing;
use crate::scroll::{PropagationMode, ScrollOptions};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Center the element when it is out of reach instead of aligning an edge
    #[serde(default = "default_true")]
    pub center_if_needed: bool,
    /// Animate scrolling
    #[serde(default)]
    pub smooth_enabled: bool,
    /// Animation duration in milliseconds
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Preset name: "ease", "ease-in", "ease-out", "ease-in-out", "linear"
    #[serde(default = "default_easing")]
    pub easing: String,
    /// "eager" or "sequential"
    #[serde(default)]
    pub propagation: PropagationMode,
    /// Animation steps per second (0 = 60)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            center_if_needed: default_true(),
            smooth_enabled: false,
            duration_ms: default_duration_ms(),
            easing: default_easing(),
            propagation: PropagationMode::default(),
            frame_rate: default_frame_rate(),
        }
    }
}

impl ScrollConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Time between animation steps at `frame_rate`
    pub fn frame_interval(&self) -> Duration {
        frame_interval(self.frame_rate)
    }

    /// Timer-paced scheduler stepping at `frame_rate`
    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        select_scheduler(|| None, self.frame_rate)
    }

    /// Animation is on and has a non-zero duration
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.duration_ms > 0
    }

    /// Options for an animated `scroll_into_view`, or `None` to scroll instantly
    ///
    /// Steps are paced by [`ScrollConfig::scheduler`]; hosts with a frame
    /// source replace it with `with_scheduler`.
    pub fn animation(&self) -> Option<ScrollOptions> {
        if !self.is_smooth() {
            return None;
        }
        Some(
            ScrollOptions::new()
                .with_center_if_needed(self.center_if_needed)
                .with_duration(self.duration())
                .with_easing(Easing::named(self.easing.clone()))
                .with_propagation(self.propagation)
                .with_scheduler(self.scheduler()),
        )
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_duration_ms() -> u64 {
    400
}

fn default_easing() -> String {
    "ease".to_string()
}

fn default_frame_rate() -> u32 {
    FRAMES_PER_SECOND as u32
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, or defaults when it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/intoview/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("intoview")
            .join("config.toml")
    }
}
