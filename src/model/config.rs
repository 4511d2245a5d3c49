use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub drag: DragSettings,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo steps kept
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig {
            limit: default_history_limit(),
        }
    }
}

fn default_history_limit() -> usize {
    10
}

/// Drag tuning, in terminal cells and milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragSettings {
    #[serde(default = "default_threshold")]
    pub mouse_threshold: f64,
    #[serde(default = "default_threshold")]
    pub touch_threshold: f64,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default)]
    pub row_spacing: f64,
    #[serde(default = "default_one")]
    pub autoscroll_margin: f64,
    #[serde(default = "default_one")]
    pub autoscroll_step: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        DragSettings {
            mouse_threshold: default_threshold(),
            touch_threshold: default_threshold(),
            long_press_ms: default_long_press_ms(),
            row_spacing: 0.0,
            autoscroll_margin: default_one(),
            autoscroll_step: default_one(),
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

fn default_long_press_ms() -> u64 {
    400
}

fn default_one() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long the reset key stays armed waiting for the confirming press
    #[serde(default = "default_reset_confirm_ms")]
    pub reset_confirm_ms: u64,
    /// Where the TUI writes its log (default: next to the data file)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            reset_confirm_ms: default_reset_confirm_ms(),
            log_file: None,
        }
    }
}

fn default_reset_confirm_ms() -> u64 {
    3000
}
