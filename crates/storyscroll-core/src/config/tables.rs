use super::defaults;
use super::models::{EngineConfig, LogLevel};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    scroll: ScrollConfig,
    #[serde(default)]
    transition: TransitionConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for EngineConfig {
    fn from(tables: ConfigTables) -> Self {
        EngineConfig {
            trigger_ratio: tables.scroll.trigger_ratio,
            lead_in_ratio: tables.scroll.lead_in_ratio,
            default_transition_ms: tables.transition.default_duration_ms,
            transition_grace_ms: tables.transition.grace_ms,
            settle_ms: tables.transition.settle_ms,
            poll_interval_ms: tables.transition.poll_interval_ms,
            viewport_height: tables.playback.viewport_height,
            chapter_height: tables.playback.chapter_height,
            scroll_speed_px_per_sec: tables.playback.scroll_speed_px_per_sec,
            smooth_scroll_ms: tables.playback.smooth_scroll_ms,
            frame_ms: tables.playback.frame_ms,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&EngineConfig> for ConfigTables {
    fn from(config: &EngineConfig) -> Self {
        ConfigTables {
            scroll: ScrollConfig {
                trigger_ratio: config.trigger_ratio,
                lead_in_ratio: config.lead_in_ratio,
            },
            transition: TransitionConfig {
                default_duration_ms: config.default_transition_ms,
                grace_ms: config.transition_grace_ms,
                settle_ms: config.settle_ms,
                poll_interval_ms: config.poll_interval_ms,
            },
            playback: PlaybackConfig {
                viewport_height: config.viewport_height,
                chapter_height: config.chapter_height,
                scroll_speed_px_per_sec: config.scroll_speed_px_per_sec,
                smooth_scroll_ms: config.smooth_scroll_ms,
                frame_ms: config.frame_ms,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ScrollConfig {
    #[serde(default = "defaults::default_trigger_ratio")]
    trigger_ratio: f64,
    #[serde(default = "defaults::default_lead_in_ratio")]
    lead_in_ratio: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            trigger_ratio: defaults::default_trigger_ratio(),
            lead_in_ratio: defaults::default_lead_in_ratio(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct TransitionConfig {
    #[serde(default = "defaults::default_transition_ms")]
    default_duration_ms: u64,
    #[serde(default = "defaults::default_transition_grace_ms")]
    grace_ms: u64,
    #[serde(default = "defaults::default_settle_ms")]
    settle_ms: u64,
    #[serde(default = "defaults::default_poll_interval_ms")]
    poll_interval_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            default_duration_ms: defaults::default_transition_ms(),
            grace_ms: defaults::default_transition_grace_ms(),
            settle_ms: defaults::default_settle_ms(),
            poll_interval_ms: defaults::default_poll_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PlaybackConfig {
    #[serde(default = "defaults::default_viewport_height")]
    viewport_height: f64,
    #[serde(default = "defaults::default_chapter_height")]
    chapter_height: f64,
    #[serde(default = "defaults::default_scroll_speed")]
    scroll_speed_px_per_sec: f64,
    #[serde(default = "defaults::default_smooth_scroll_ms")]
    smooth_scroll_ms: u64,
    #[serde(default = "defaults::default_frame_ms")]
    frame_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        PlaybackConfig {
            viewport_height: defaults::default_viewport_height(),
            chapter_height: defaults::default_chapter_height(),
            scroll_speed_px_per_sec: defaults::default_scroll_speed(),
            smooth_scroll_ms: defaults::default_smooth_scroll_ms(),
            frame_ms: defaults::default_frame_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
