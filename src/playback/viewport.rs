use std::time::{Duration, Instant};
use storyscroll_core::{SubscriptionId, ViewportSource};

#[derive(Debug, Clone, Copy)]
struct ScrollAnimation {
    from: f64,
    to: f64,
    started_at: Instant,
}

/// In-memory window: a document of fixed height scrolled by the driver.
///
/// Smooth scrolls are linear over a fixed duration and start on the next
/// [`step`](Self::step).
#[derive(Debug)]
pub struct SimulatedViewport {
    offset: f64,
    viewport_height: f64,
    document_height: f64,
    smooth_scroll: Duration,
    pending_target: Option<f64>,
    animation: Option<ScrollAnimation>,
    frame_requested: bool,
    subscribers: Vec<SubscriptionId>,
    next_subscription: u64,
}

impl SimulatedViewport {
    pub fn new(viewport_height: f64, document_height: f64, smooth_scroll: Duration) -> Self {
        Self {
            offset: 0.0,
            viewport_height,
            document_height: document_height.max(viewport_height),
            smooth_scroll,
            pending_target: None,
            animation: None,
            frame_requested: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn max_offset(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Jump to `offset`, cancelling any smooth scroll. Returns whether the
    /// offset changed.
    pub fn set_offset(&mut self, offset: f64) -> bool {
        self.pending_target = None;
        self.animation = None;
        self.move_to(offset)
    }

    fn move_to(&mut self, offset: f64) -> bool {
        let clamped = offset.clamp(0.0, self.max_offset());
        if clamped == self.offset {
            return false;
        }
        self.offset = clamped;
        true
    }

    /// Advance the smooth scroll to `now`. Returns whether the offset moved.
    pub fn step(&mut self, now: Instant) -> bool {
        if let Some(target) = self.pending_target.take() {
            self.animation = Some(ScrollAnimation {
                from: self.offset,
                to: target.clamp(0.0, self.max_offset()),
                started_at: now,
            });
        }
        let Some(animation) = self.animation else {
            return false;
        };

        let elapsed = now.saturating_duration_since(animation.started_at);
        let t = if self.smooth_scroll.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.smooth_scroll.as_secs_f64()).min(1.0)
        };
        if t >= 1.0 {
            self.animation = None;
        }
        self.move_to(animation.from + (animation.to - animation.from) * t)
    }

    pub fn is_animating(&self) -> bool {
        self.pending_target.is_some() || self.animation.is_some()
    }

    /// Consume the frame request raised by the tracker, if any.
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl ViewportSource for SimulatedViewport {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_scrollable_height(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    fn smooth_scroll_to(&mut self, offset: f64) {
        self.pending_target = Some(offset);
    }

    fn request_animation_frame(&mut self) {
        self.frame_requested = true;
    }

    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.subscribers.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|sub| *sub != id);
    }
}
