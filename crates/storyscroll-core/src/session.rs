use crate::camera::{CameraController, ScreenPoint};
use crate::chapter::ChapterRegistry;
use crate::config::EngineConfig;
use crate::geo::Marker;
use crate::tracker::{ScrollState, ScrollTracker};
use crate::transition::{FinishReason, TransitionCoordinator, TransitionState};
use crate::viewport::{ViewportEvent, ViewportSource};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use ts_rs::TS;

/// Notification produced by the session entry points, in the order the
/// changes happened.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum StoryEvent {
    ChapterChanged {
        id: String,
        index: usize,
    },
    ScrollProgressed {
        scroll: ScrollState,
    },
    TransitionStarted {
        index: usize,
        #[ts(type = "number")]
        duration_ms: u64,
        camera_move: bool,
        superseded: bool,
    },
    TransitionFinished {
        index: usize,
        reason: FinishReason,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NavigationState {
    pub current_chapter: usize,
    /// Chapter ids that have been active at least once, in story order.
    pub visited_chapters: Vec<String>,
    pub total_chapters: usize,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct ChapterSummary {
    pub index: usize,
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub has_camera_target: bool,
    pub is_full_height: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct StorySnapshot {
    pub chapters: Vec<ChapterSummary>,
    pub scroll: ScrollState,
    pub transition: TransitionState,
    pub navigation: NavigationState,
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    GetSnapshot,
    ScrollToChapter { index: usize },
    NextChapter,
    PreviousChapter,
    RegisterChapterExtent { id: String, top: f64, height: f64 },
    UnregisterChapterExtent { id: String },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "story_get_snapshot",
            Self::ScrollToChapter { .. } => "story_scroll_to_chapter",
            Self::NextChapter => "story_next_chapter",
            Self::PreviousChapter => "story_previous_chapter",
            Self::RegisterChapterExtent { .. } => "story_register_chapter_extent",
            Self::UnregisterChapterExtent { .. } => "story_unregister_chapter_extent",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: StorySnapshot,
}

/// Engine facade: owns the registry, the scroll tracker, and the transition
/// coordinator, and wires tracker output into the coordinator.
pub struct StorySession<V: ViewportSource> {
    registry: Arc<ChapterRegistry>,
    tracker: ScrollTracker<V>,
    coordinator: TransitionCoordinator,
    visited: BTreeSet<usize>,
}

impl<V: ViewportSource> StorySession<V> {
    pub fn new(registry: ChapterRegistry, source: V, config: &EngineConfig) -> Self {
        let registry = Arc::new(registry);
        Self {
            tracker: ScrollTracker::new(Arc::clone(&registry), source, config),
            coordinator: TransitionCoordinator::new(Arc::clone(&registry), config),
            registry,
            visited: BTreeSet::new(),
        }
    }

    /// Subscribe to the viewport and report the initial state.
    pub fn attach(&mut self, now: Instant) -> Vec<StoryEvent> {
        let state = self.tracker.attach();
        let mut events = Vec::new();
        self.announce_chapter(state.active_chapter_index, &mut events);
        events.push(StoryEvent::ScrollProgressed { scroll: state });
        self.forward_to_coordinator(state.active_chapter_index, now, &mut events);
        events
    }

    pub fn detach(&mut self) {
        self.tracker.detach();
    }

    pub fn handle_viewport_event(&mut self, event: ViewportEvent) -> bool {
        self.tracker.handle_viewport_event(event)
    }

    pub fn on_animation_frame(&mut self, now: Instant) -> Vec<StoryEvent> {
        let mut events = Vec::new();
        let previous = self.tracker.state().active_chapter_index;
        let Some(state) = self.tracker.on_animation_frame() else {
            return events;
        };
        if state.active_chapter_index != previous {
            self.announce_chapter(state.active_chapter_index, &mut events);
        }
        events.push(StoryEvent::ScrollProgressed { scroll: state });
        self.forward_to_coordinator(state.active_chapter_index, now, &mut events);
        events
    }

    /// Fire due transition timers.
    pub fn tick(&mut self, now: Instant) -> Vec<StoryEvent> {
        self.coordinator
            .advance(now)
            .map(|finish| StoryEvent::TransitionFinished {
                index: finish.target_chapter_index,
                reason: finish.reason,
            })
            .into_iter()
            .collect()
    }

    fn announce_chapter(&mut self, index: usize, events: &mut Vec<StoryEvent>) {
        let Ok(chapter) = self.registry.get_chapter(index) else {
            return;
        };
        self.visited.insert(index);
        events.push(StoryEvent::ChapterChanged {
            id: chapter.id.clone(),
            index,
        });
    }

    fn forward_to_coordinator(&mut self, index: usize, now: Instant, events: &mut Vec<StoryEvent>) {
        if let Some(start) = self.coordinator.observe_active_chapter(index, now) {
            events.push(StoryEvent::TransitionStarted {
                index: start.target_chapter_index,
                duration_ms: start.duration.as_millis() as u64,
                camera_move: start.camera_move,
                superseded: start.superseded,
            });
        }
    }

    /// Smooth-scroll to a chapter. Out-of-range indices and unmounted
    /// chapters are ignored; returns whether a scroll was requested.
    pub fn scroll_to_chapter(&mut self, index: usize) -> bool {
        if index >= self.registry.count() {
            debug!(index, count = self.registry.count(), "Ignoring out-of-range chapter");
            return false;
        }
        self.tracker.scroll_to_chapter(index).is_some()
    }

    pub fn scroll_to_chapter_id(&mut self, id: &str) -> bool {
        match self.registry.index_of(id) {
            Some(index) => self.scroll_to_chapter(index),
            None => {
                debug!(id, "Ignoring unknown chapter id");
                false
            }
        }
    }

    pub fn next_chapter(&mut self) -> bool {
        let current = self.active_chapter_index();
        if current >= self.registry.last_index() {
            return false;
        }
        self.scroll_to_chapter(current + 1)
    }

    pub fn previous_chapter(&mut self) -> bool {
        match self.active_chapter_index().checked_sub(1) {
            Some(index) => self.scroll_to_chapter(index),
            None => false,
        }
    }

    pub fn register_chapter_extent(&mut self, id: &str, top: f64, height: f64) {
        self.tracker.register_chapter_extent(id, top, height);
    }

    pub fn unregister_chapter_extent(&mut self, id: &str) {
        self.tracker.unregister_chapter_extent(id);
    }

    pub fn attach_camera(&mut self, camera: Box<dyn CameraController>) {
        self.coordinator.attach_camera(camera);
    }

    pub fn detach_camera(&mut self) -> Option<Box<dyn CameraController>> {
        self.coordinator.detach_camera()
    }

    pub fn project_to_screen(&self, lon: f64, lat: f64) -> Option<ScreenPoint> {
        self.coordinator.project_to_screen(lon, lat)
    }

    pub fn project_marker(&self, marker: &Marker) -> Option<ScreenPoint> {
        let [lon, lat] = marker.coordinates;
        self.project_to_screen(lon, lat)
    }

    pub fn active_chapter_index(&self) -> usize {
        self.tracker.state().active_chapter_index
    }

    pub fn scroll_progress(&self) -> ScrollState {
        self.tracker.state()
    }

    pub fn is_transitioning(&self) -> bool {
        self.coordinator.is_transitioning()
    }

    pub fn transition_progress(&self) -> f64 {
        self.coordinator.transition_progress()
    }

    pub fn transition_state(&self) -> TransitionState {
        self.coordinator.state()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.coordinator.next_deadline()
    }

    pub fn registry(&self) -> &ChapterRegistry {
        &self.registry
    }

    pub fn viewport(&self) -> &V {
        self.tracker.source()
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        self.tracker.source_mut()
    }

    pub fn navigation_state(&self) -> NavigationState {
        let current = self.active_chapter_index();
        let total = self.registry.count();
        NavigationState {
            current_chapter: current,
            visited_chapters: self
                .visited
                .iter()
                .filter_map(|idx| self.registry.get_chapter(*idx).ok())
                .map(|chapter| chapter.id.clone())
                .collect(),
            total_chapters: total,
            can_go_next: current + 1 < total,
            can_go_previous: current > 0,
        }
    }

    pub fn snapshot(&self) -> StorySnapshot {
        let active = self.active_chapter_index();
        let chapters = self
            .registry
            .iter()
            .enumerate()
            .map(|(index, chapter)| ChapterSummary {
                index,
                id: chapter.id.clone(),
                title: chapter.title.clone(),
                subtitle: chapter.subtitle.clone(),
                has_camera_target: chapter.camera_target.is_some(),
                is_full_height: chapter.is_full_height,
                is_active: index == active,
            })
            .collect();

        StorySnapshot {
            chapters,
            scroll: self.scroll_progress(),
            transition: self.transition_state(),
            navigation: self.navigation_state(),
        }
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::ScrollToChapter { index } => {
                self.scroll_to_chapter(index);
            }
            SessionCommand::NextChapter => {
                self.next_chapter();
            }
            SessionCommand::PreviousChapter => {
                self.previous_chapter();
            }
            SessionCommand::RegisterChapterExtent { id, top, height } => {
                self.register_chapter_extent(&id, top, height)
            }
            SessionCommand::UnregisterChapterExtent { id } => self.unregister_chapter_extent(&id),
        }
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }
}
