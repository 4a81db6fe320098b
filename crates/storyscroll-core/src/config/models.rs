use serde::Deserialize;
use std::time::Duration;

/// Flattened engine configuration; built from the TOML tables in `tables.rs`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "crate::config::defaults::default_trigger_ratio")]
    pub trigger_ratio: f64,
    #[serde(default = "crate::config::defaults::default_lead_in_ratio")]
    pub lead_in_ratio: f64,
    #[serde(default = "crate::config::defaults::default_transition_ms")]
    pub default_transition_ms: u64,
    #[serde(default = "crate::config::defaults::default_transition_grace_ms")]
    pub transition_grace_ms: u64,
    #[serde(default = "crate::config::defaults::default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "crate::config::defaults::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "crate::config::defaults::default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default = "crate::config::defaults::default_chapter_height")]
    pub chapter_height: f64,
    #[serde(default = "crate::config::defaults::default_scroll_speed")]
    pub scroll_speed_px_per_sec: f64,
    #[serde(default = "crate::config::defaults::default_smooth_scroll_ms")]
    pub smooth_scroll_ms: u64,
    #[serde(default = "crate::config::defaults::default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            trigger_ratio: crate::config::defaults::default_trigger_ratio(),
            lead_in_ratio: crate::config::defaults::default_lead_in_ratio(),
            default_transition_ms: crate::config::defaults::default_transition_ms(),
            transition_grace_ms: crate::config::defaults::default_transition_grace_ms(),
            settle_ms: crate::config::defaults::default_settle_ms(),
            poll_interval_ms: crate::config::defaults::default_poll_interval_ms(),
            viewport_height: crate::config::defaults::default_viewport_height(),
            chapter_height: crate::config::defaults::default_chapter_height(),
            scroll_speed_px_per_sec: crate::config::defaults::default_scroll_speed(),
            smooth_scroll_ms: crate::config::defaults::default_smooth_scroll_ms(),
            frame_ms: crate::config::defaults::default_frame_ms(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Clamp every tunable into a range the engine can work with.
    pub fn sanitized(mut self) -> Self {
        let ratio = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        let positive = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        self.trigger_ratio = ratio(
            self.trigger_ratio,
            crate::config::defaults::default_trigger_ratio(),
        );
        self.lead_in_ratio = ratio(
            self.lead_in_ratio,
            crate::config::defaults::default_lead_in_ratio(),
        );
        self.default_transition_ms = self.default_transition_ms.max(1);
        self.settle_ms = self.settle_ms.max(1);
        self.poll_interval_ms = self.poll_interval_ms.max(1);
        self.frame_ms = self.frame_ms.max(1);
        self.viewport_height = positive(
            self.viewport_height,
            crate::config::defaults::default_viewport_height(),
        );
        self.chapter_height = positive(
            self.chapter_height,
            crate::config::defaults::default_chapter_height(),
        );
        self.scroll_speed_px_per_sec = positive(
            self.scroll_speed_px_per_sec,
            crate::config::defaults::default_scroll_speed(),
        );
        self
    }

    pub fn default_transition(&self) -> Duration {
        Duration::from_millis(self.default_transition_ms)
    }

    pub fn transition_grace(&self) -> Duration {
        Duration::from_millis(self.transition_grace_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn smooth_scroll(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
