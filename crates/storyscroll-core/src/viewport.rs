//! The host's scroll signal, abstracted so the tracker can run anywhere.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Handle returned by [`ViewportSource::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Window-like capability consumed by the scroll tracker.
///
/// After `subscribe`, the host forwards scroll and resize notifications as
/// [`ViewportEvent`]s and calls `on_animation_frame` once per rendered frame
/// after `request_animation_frame`.
pub trait ViewportSource {
    /// Current scroll offset in document pixels.
    fn scroll_offset(&self) -> f64;
    fn viewport_height(&self) -> f64;
    /// Document height minus viewport height; zero or negative when the
    /// content fits in the viewport.
    fn document_scrollable_height(&self) -> f64;
    fn smooth_scroll_to(&mut self, offset: f64);
    fn request_animation_frame(&mut self);
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportEvent {
    Scroll,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ScrollDirection {
    Up,
    #[default]
    Down,
}

/// Vertical extent of a mounted chapter, in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterExtent {
    pub top: f64,
    pub height: f64,
}

impl ChapterExtent {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top: finite_or_zero(top),
            height: finite_or_zero(height).max(0.0),
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn middle(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn contains(&self, point: f64) -> bool {
        point >= self.top && point <= self.bottom()
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
