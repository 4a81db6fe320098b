//! Scroll tracking: continuous scroll offset in, active chapter and
//! progress out.
//!
//! The tracker is the only reader of the viewport signal. Scroll and resize
//! notifications set a single latch and request one animation frame; the
//! recompute happens on that frame, so any number of events inside one
//! frame cost exactly one recompute.

use crate::chapter::ChapterRegistry;
use crate::config::EngineConfig;
use crate::viewport::{
    ChapterExtent, ScrollDirection, SubscriptionId, ViewportEvent, ViewportSource, finite_or_zero,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScrollState {
    pub active_chapter_index: usize,
    /// How far the viewport top has scrolled through the active chapter, `[0, 1]`.
    pub chapter_progress: f64,
    /// Scroll offset relative to the scrollable document height, `[0, 1]`.
    pub overall_progress: f64,
    pub direction: ScrollDirection,
}

pub struct ScrollTracker<V: ViewportSource> {
    registry: Arc<ChapterRegistry>,
    source: V,
    extents: HashMap<String, ChapterExtent>,
    state: ScrollState,
    last_scroll_offset: f64,
    frame_pending: bool,
    recompute_count: u64,
    subscription: Option<SubscriptionId>,
    trigger_ratio: f64,
    lead_in_ratio: f64,
}

impl<V: ViewportSource> ScrollTracker<V> {
    pub fn new(registry: Arc<ChapterRegistry>, source: V, config: &EngineConfig) -> Self {
        Self {
            registry,
            source,
            extents: HashMap::new(),
            state: ScrollState::default(),
            last_scroll_offset: 0.0,
            frame_pending: false,
            recompute_count: 0,
            subscription: None,
            trigger_ratio: config.trigger_ratio,
            lead_in_ratio: config.lead_in_ratio,
        }
    }

    /// Subscribe to the viewport and take the initial measurement.
    pub fn attach(&mut self) -> ScrollState {
        if self.subscription.is_none() {
            self.subscription = Some(self.source.subscribe());
        }
        self.recompute()
    }

    pub fn detach(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
        }
        self.frame_pending = false;
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn register_chapter_extent(&mut self, id: &str, top: f64, height: f64) {
        let extent = ChapterExtent::new(top, height);
        trace!(id, top = extent.top, height = extent.height, "Registered chapter extent");
        self.extents.insert(id.to_string(), extent);
    }

    pub fn unregister_chapter_extent(&mut self, id: &str) {
        if self.extents.remove(id).is_some() {
            trace!(id, "Unregistered chapter extent");
        }
    }

    pub fn extent(&self, id: &str) -> Option<ChapterExtent> {
        self.extents.get(id).copied()
    }

    /// Latch a recompute for the next frame. Returns `true` when this call
    /// requested the frame, `false` when one was already pending.
    pub fn handle_viewport_event(&mut self, event: ViewportEvent) -> bool {
        if self.frame_pending {
            trace!(?event, "Recompute already scheduled");
            return false;
        }
        self.frame_pending = true;
        self.source.request_animation_frame();
        true
    }

    pub fn on_animation_frame(&mut self) -> Option<ScrollState> {
        if !self.frame_pending {
            return None;
        }
        self.frame_pending = false;
        Some(self.recompute())
    }

    pub fn recompute(&mut self) -> ScrollState {
        let offset = finite_or_zero(self.source.scroll_offset());
        let viewport_height = finite_or_zero(self.source.viewport_height()).max(0.0);
        let scrollable = finite_or_zero(self.source.document_scrollable_height());

        let direction = if offset > self.last_scroll_offset {
            ScrollDirection::Down
        } else if offset < self.last_scroll_offset {
            ScrollDirection::Up
        } else {
            self.state.direction
        };
        self.last_scroll_offset = offset;

        let overall_progress = if scrollable > 0.0 {
            (offset / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let trigger_point = offset + viewport_height * self.trigger_ratio;
        let active_chapter_index = self
            .chapter_at(trigger_point)
            .unwrap_or(self.state.active_chapter_index)
            .min(self.registry.last_index());

        let chapter_progress = self
            .registry
            .get_chapter(active_chapter_index)
            .ok()
            .and_then(|chapter| self.extents.get(&chapter.id))
            .filter(|extent| extent.height > 0.0)
            .map(|extent| ((offset - extent.top) / extent.height).clamp(0.0, 1.0))
            .unwrap_or(0.0);

        let previous = self.state.active_chapter_index;
        self.state = ScrollState {
            active_chapter_index,
            chapter_progress,
            overall_progress,
            direction,
        };
        self.recompute_count += 1;

        if previous != active_chapter_index {
            info!(
                from = previous,
                to = active_chapter_index,
                offset,
                "Active chapter changed"
            );
        }
        debug!(
            offset,
            trigger_point,
            chapter = active_chapter_index,
            chapter_progress,
            overall_progress,
            ?direction,
            "Recomputed scroll state"
        );
        self.state
    }

    /// Index of the registered chapter containing `trigger_point` whose
    /// middle is closest to it; the lowest index wins ties.
    fn chapter_at(&self, trigger_point: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, chapter) in self.registry.iter().enumerate() {
            let Some(extent) = self.extents.get(&chapter.id) else {
                continue;
            };
            if !extent.contains(trigger_point) {
                continue;
            }
            let distance = (trigger_point - extent.middle()).abs();
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((idx, distance)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Ask the viewport to smooth-scroll so the chapter starts a little
    /// below the top edge. Returns the requested offset, or `None` when the
    /// index is out of range or the chapter is not mounted.
    ///
    /// The active chapter updates later, through the scroll events this
    /// produces.
    pub fn scroll_to_chapter(&mut self, index: usize) -> Option<f64> {
        let chapter = self.registry.get_chapter(index).ok()?;
        let extent = self.extents.get(&chapter.id)?;
        let viewport_height = finite_or_zero(self.source.viewport_height()).max(0.0);
        let target = extent.top - viewport_height * self.lead_in_ratio;
        info!(index, id = %chapter.id, target, "Scrolling to chapter");
        self.source.smooth_scroll_to(target);
        Some(target)
    }

    pub fn state(&self) -> ScrollState {
        self.state
    }

    pub fn recompute_count(&self) -> u64 {
        self.recompute_count
    }

    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    pub fn source(&self) -> &V {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut V {
        &mut self.source
    }
}
