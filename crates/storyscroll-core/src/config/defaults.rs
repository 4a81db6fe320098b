pub(crate) fn default_trigger_ratio() -> f64 {
    0.5
}

pub(crate) fn default_lead_in_ratio() -> f64 {
    0.1
}

pub(crate) fn default_transition_ms() -> u64 {
    2000
}

pub(crate) fn default_transition_grace_ms() -> u64 {
    100
}

pub(crate) fn default_settle_ms() -> u64 {
    100
}

pub(crate) fn default_poll_interval_ms() -> u64 {
    16
}

pub(crate) fn default_viewport_height() -> f64 {
    800.0
}

pub(crate) fn default_chapter_height() -> f64 {
    1200.0
}

pub(crate) fn default_scroll_speed() -> f64 {
    600.0
}

pub(crate) fn default_smooth_scroll_ms() -> u64 {
    600
}

pub(crate) fn default_frame_ms() -> u64 {
    16
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
