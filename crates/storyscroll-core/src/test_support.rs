use crate::camera::{CameraController, CameraError, CameraState, ScreenPoint};
use crate::chapter::{CameraTarget, Chapter, ChapterRegistry};
use crate::viewport::{SubscriptionId, ViewportSource};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct FakeViewport {
    pub offset: f64,
    pub viewport_height: f64,
    pub scrollable_height: f64,
    pub scroll_requests: Vec<f64>,
    pub frame_requests: usize,
    pub active_subscriptions: Vec<SubscriptionId>,
    next_subscription: u64,
}

impl FakeViewport {
    pub fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            viewport_height,
            scrollable_height: document_height - viewport_height,
            ..Self::default()
        }
    }
}

impl ViewportSource for FakeViewport {
    fn scroll_offset(&self) -> f64 {
        self.offset
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn document_scrollable_height(&self) -> f64 {
        self.scrollable_height
    }

    fn smooth_scroll_to(&mut self, offset: f64) {
        self.scroll_requests.push(offset);
    }

    fn request_animation_frame(&mut self) {
        self.frame_requests += 1;
    }

    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.active_subscriptions.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.active_subscriptions.retain(|sub| *sub != id);
    }
}

pub(crate) type MoveLog = Rc<RefCell<Vec<(CameraState, Duration)>>>;

/// Camera that records every command; optionally fails them.
pub(crate) struct RecordingCamera {
    pub moves: MoveLog,
    pub fail_with_unavailable: bool,
}

impl RecordingCamera {
    pub fn new() -> (Self, MoveLog) {
        let moves = MoveLog::default();
        (
            Self {
                moves: moves.clone(),
                fail_with_unavailable: false,
            },
            moves,
        )
    }
}

impl CameraController for RecordingCamera {
    fn move_to(&mut self, state: &CameraState, duration: Duration) -> Result<(), CameraError> {
        self.moves.borrow_mut().push((state.clone(), duration));
        if self.fail_with_unavailable {
            return Err(CameraError::Unavailable);
        }
        Ok(())
    }

    fn project_to_screen(&self, lon: f64, lat: f64) -> Option<ScreenPoint> {
        Some(ScreenPoint {
            x: lon * 10.0,
            y: lat * 10.0,
        })
    }
}

pub(crate) fn camera_target(lon: f64, lat: f64, duration_ms: Option<u64>) -> CameraTarget {
    CameraTarget {
        center: [lon, lat],
        zoom: 6.0,
        pitch: None,
        bearing: None,
        transition_duration_ms: duration_ms,
    }
}

/// Three chapters; `targets[i]` is chapter i's camera target.
pub(crate) fn build_registry(targets: [Option<CameraTarget>; 3]) -> ChapterRegistry {
    let ids = ["hero", "geography", "route"];
    let chapters = ids
        .iter()
        .zip(targets)
        .map(|(id, target)| {
            let chapter = Chapter::new(*id, id.to_uppercase());
            match target {
                Some(target) => chapter.with_camera_target(target),
                None => chapter,
            }
        })
        .collect();
    ChapterRegistry::new(chapters).expect("unique test ids")
}
