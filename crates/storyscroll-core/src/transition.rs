//! Chapter-to-chapter camera transitions.
//!
//! When the active chapter changes, the coordinator sends one `move_to` to
//! the camera and then reports a synthetic progress derived from elapsed
//! time, since the camera gives no completion signal. A newer chapter change
//! supersedes the running transition: its timers are cancelled before the
//! new ones are scheduled.

use crate::camera::{CameraController, CameraState, ScreenPoint};
use crate::chapter::ChapterRegistry;
use crate::config::EngineConfig;
use crate::timers::TimerQueue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransitionState {
    pub is_transitioning: bool,
    pub transition_progress: f64,
    pub target_chapter_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FinishReason {
    /// Elapsed time reached the declared duration.
    Completed,
    /// The `duration + grace` backstop fired first.
    SafetyTimeout,
    /// Short settle for a chapter without a camera target.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionStart {
    pub target_chapter_index: usize,
    pub duration: Duration,
    /// False when the chapter has no camera target.
    pub camera_move: bool,
    /// True when this start cancelled a running transition.
    pub superseded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionFinish {
    pub target_chapter_index: usize,
    pub reason: FinishReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransitionTimer {
    Poll,
    Complete,
    SafetyTimeout,
    Settle,
}

#[derive(Debug, Clone, Copy)]
struct Inflight {
    target: usize,
    started_at: Instant,
    duration: Duration,
}

pub struct TransitionCoordinator {
    registry: Arc<ChapterRegistry>,
    camera: Option<Box<dyn CameraController>>,
    timers: TimerQueue<TransitionTimer>,
    state: TransitionState,
    inflight: Option<Inflight>,
    last_observed: usize,
    camera_commands: u64,
    default_duration: Duration,
    grace: Duration,
    settle: Duration,
    poll_interval: Duration,
}

impl TransitionCoordinator {
    pub fn new(registry: Arc<ChapterRegistry>, config: &EngineConfig) -> Self {
        Self {
            registry,
            camera: None,
            timers: TimerQueue::new(),
            state: TransitionState::default(),
            inflight: None,
            last_observed: 0,
            camera_commands: 0,
            default_duration: config.default_transition(),
            grace: config.transition_grace(),
            settle: config.settle(),
            poll_interval: config.poll_interval(),
        }
    }

    pub fn attach_camera(&mut self, camera: Box<dyn CameraController>) {
        info!("Camera controller attached");
        self.camera = Some(camera);
    }

    pub fn detach_camera(&mut self) -> Option<Box<dyn CameraController>> {
        self.camera.take()
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn project_to_screen(&self, lon: f64, lat: f64) -> Option<ScreenPoint> {
        self.camera.as_ref()?.project_to_screen(lon, lat)
    }

    /// React to the tracker's active chapter. Starts (or supersedes) a
    /// transition when `index` differs from the last observed index.
    pub fn observe_active_chapter(&mut self, index: usize, now: Instant) -> Option<TransitionStart> {
        if index == self.last_observed {
            return None;
        }
        let registry = Arc::clone(&self.registry);
        let chapter = match registry.get_chapter(index) {
            Ok(chapter) => chapter,
            Err(err) => {
                warn!(index, "Ignoring chapter change: {err}");
                return None;
            }
        };
        self.last_observed = index;

        let superseded = self.state.is_transitioning;
        let cancelled = self.timers.cancel_all();
        if superseded {
            debug!(
                previous = ?self.state.target_chapter_index,
                next = index,
                cancelled,
                "Superseding in-flight transition"
            );
        }

        self.state = TransitionState {
            is_transitioning: true,
            transition_progress: 0.0,
            target_chapter_index: Some(index),
        };

        let (duration, camera_move) = match &chapter.camera_target {
            Some(target) => {
                let duration = target
                    .transition_duration_ms
                    .map(Duration::from_millis)
                    .unwrap_or(self.default_duration)
                    .max(Duration::from_millis(1));
                self.issue_camera_move(&CameraState::from(target), duration, index);
                self.timers
                    .schedule_interval(now + self.poll_interval, self.poll_interval, TransitionTimer::Poll);
                self.timers
                    .schedule_once(now + duration, TransitionTimer::Complete);
                self.timers
                    .schedule_once(now + duration + self.grace, TransitionTimer::SafetyTimeout);
                (duration, true)
            }
            None => {
                self.timers
                    .schedule_once(now + self.settle, TransitionTimer::Settle);
                (self.settle, false)
            }
        };

        self.inflight = Some(Inflight {
            target: index,
            started_at: now,
            duration,
        });
        info!(
            chapter = index,
            id = %chapter.id,
            duration_ms = duration.as_millis() as u64,
            camera_move,
            "Transition started"
        );

        Some(TransitionStart {
            target_chapter_index: index,
            duration,
            camera_move,
            superseded,
        })
    }

    /// Fire due timers. Returns the finish record when the transition ends
    /// during this call.
    pub fn advance(&mut self, now: Instant) -> Option<TransitionFinish> {
        for (_, timer) in self.timers.drain_due(now) {
            let Some(inflight) = self.inflight else {
                break;
            };
            match timer {
                TransitionTimer::Poll => {
                    let progress = Self::sample_progress(&inflight, now);
                    if progress > self.state.transition_progress {
                        self.state.transition_progress = progress;
                    }
                    if progress >= 1.0 {
                        return Some(self.finish(FinishReason::Completed));
                    }
                }
                TransitionTimer::Complete => return Some(self.finish(FinishReason::Completed)),
                TransitionTimer::SafetyTimeout => {
                    return Some(self.finish(FinishReason::SafetyTimeout));
                }
                TransitionTimer::Settle => return Some(self.finish(FinishReason::Settled)),
            }
        }
        None
    }

    fn sample_progress(inflight: &Inflight, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(inflight.started_at);
        let ratio = elapsed.as_secs_f64() / inflight.duration.as_secs_f64();
        if ratio.is_finite() {
            ratio.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn finish(&mut self, reason: FinishReason) -> TransitionFinish {
        self.timers.cancel_all();
        let target = self
            .inflight
            .take()
            .map(|inflight| inflight.target)
            .unwrap_or(self.last_observed);
        self.state.is_transitioning = false;
        self.state.transition_progress = 1.0;
        info!(chapter = target, ?reason, "Transition finished");
        TransitionFinish {
            target_chapter_index: target,
            reason,
        }
    }

    fn issue_camera_move(&mut self, state: &CameraState, duration: Duration, index: usize) {
        let Some(camera) = self.camera.as_mut() else {
            debug!(chapter = index, "No camera attached; running transition on timers only");
            return;
        };
        self.camera_commands += 1;
        match camera.move_to(state, duration) {
            Ok(()) => debug!(
                chapter = index,
                lon = state.center[0],
                lat = state.center[1],
                zoom = state.zoom,
                "Camera move issued"
            ),
            Err(err) => warn!(chapter = index, "Camera move failed: {err}"),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state.is_transitioning
    }

    pub fn transition_progress(&self) -> f64 {
        self.state.transition_progress
    }

    pub fn last_observed(&self) -> usize {
        self.last_observed
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn camera_commands(&self) -> u64 {
        self.camera_commands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{RecordingCamera, build_registry, camera_target};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn build_coordinator(
        targets: [Option<crate::chapter::CameraTarget>; 3],
    ) -> (TransitionCoordinator, crate::test_support::MoveLog) {
        let registry = Arc::new(build_registry(targets));
        let mut coordinator = TransitionCoordinator::new(registry, &EngineConfig::default());
        let (camera, moves) = RecordingCamera::new();
        coordinator.attach_camera(Box::new(camera));
        (coordinator, moves)
    }

    /// Advance in 16 ms frames up to `end`, collecting state after each step.
    fn run_frames(
        coordinator: &mut TransitionCoordinator,
        from: Instant,
        end: Instant,
    ) -> Vec<(Instant, TransitionState)> {
        let mut samples = Vec::new();
        let mut now = from;
        while now <= end {
            coordinator.advance(now);
            samples.push((now, coordinator.state()));
            now += ms(16);
        }
        samples
    }

    #[test]
    fn declared_duration_drives_synthetic_progress() {
        let (mut coordinator, moves) =
            build_coordinator([None, Some(camera_target(121.5, 31.2, Some(1500))), None]);
        let t0 = Instant::now();

        let start = coordinator.observe_active_chapter(1, t0).expect("transition starts");
        assert_eq!(start.duration, ms(1500));
        assert!(start.camera_move);
        assert!(coordinator.is_transitioning());
        assert_eq!(coordinator.transition_progress(), 0.0);

        assert_eq!(coordinator.advance(t0 + ms(750)), None);
        assert!((coordinator.transition_progress() - 0.5).abs() < 0.02);
        assert!(coordinator.is_transitioning());

        let finish = coordinator.advance(t0 + ms(1500)).expect("finishes at duration");
        assert_eq!(finish.reason, FinishReason::Completed);
        assert_eq!(finish.target_chapter_index, 1);
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.transition_progress(), 1.0);
        assert_eq!(coordinator.pending_timers(), 0);

        let moves = moves.borrow();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].0.center, [121.5, 31.2]);
        assert_eq!(moves[0].1, ms(1500));
    }

    #[test]
    fn missing_duration_uses_default() {
        let (mut coordinator, moves) =
            build_coordinator([None, Some(camera_target(116.4, 39.9, None)), None]);

        let start = coordinator
            .observe_active_chapter(1, Instant::now())
            .expect("transition starts");

        assert_eq!(start.duration, ms(2000));
        assert_eq!(moves.borrow()[0].1, ms(2000));
    }

    #[test]
    fn chapter_without_camera_target_settles_quickly() {
        let (mut coordinator, moves) = build_coordinator([None, None, None]);
        let t0 = Instant::now();

        let start = coordinator.observe_active_chapter(2, t0).expect("transition starts");
        assert!(!start.camera_move);
        assert!(coordinator.is_transitioning());
        assert!(moves.borrow().is_empty());

        assert_eq!(coordinator.advance(t0 + ms(99)), None);
        assert!(coordinator.is_transitioning());

        let finish = coordinator.advance(t0 + ms(100)).expect("settles");
        assert_eq!(finish.reason, FinishReason::Settled);
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.transition_progress(), 1.0);
    }

    #[test]
    fn superseding_cancels_stale_timers() {
        let (mut coordinator, moves) = build_coordinator([
            None,
            Some(camera_target(121.5, 31.2, Some(2000))),
            Some(camera_target(104.1, 30.6, Some(2000))),
        ]);
        let t0 = Instant::now();

        coordinator.observe_active_chapter(1, t0);
        let samples_a = run_frames(&mut coordinator, t0, t0 + ms(496));
        assert!(samples_a.iter().all(|(_, state)| state.is_transitioning));

        let t_b = t0 + ms(500);
        let start = coordinator.observe_active_chapter(2, t_b).expect("supersedes");
        assert!(start.superseded);
        assert_eq!(coordinator.transition_progress(), 0.0);
        assert_eq!(coordinator.pending_timers(), 3);
        assert_eq!(moves.borrow().len(), 2);

        let samples_b = run_frames(&mut coordinator, t_b, t0 + ms(3000));
        let first_idle = samples_b
            .iter()
            .position(|(_, state)| !state.is_transitioning)
            .expect("B finishes");

        // A's completion (t0+2000) and safety timeout (t0+2100) must not end B.
        let (finished_at, _) = samples_b[first_idle];
        assert!(finished_at >= t_b + ms(2000));
        assert!(finished_at <= t_b + ms(2000) + ms(100));
        assert!(
            samples_b[first_idle..]
                .iter()
                .all(|(_, state)| !state.is_transitioning),
            "a stale timer flipped the transition back on"
        );
        let (_, early) = samples_b[1];
        assert!(early.transition_progress < 0.05);
        assert_eq!(early.target_chapter_index, Some(2));
    }

    #[test]
    fn progress_is_monotonic_and_completes_within_grace() {
        let (mut coordinator, _moves) =
            build_coordinator([None, Some(camera_target(113.2, 23.1, Some(1000))), None]);
        let t0 = Instant::now();
        coordinator.observe_active_chapter(1, t0);

        let samples = run_frames(&mut coordinator, t0, t0 + ms(1100));

        let mut previous = 0.0;
        for (_, state) in &samples {
            assert!(state.transition_progress >= previous);
            previous = state.transition_progress;
        }
        let (done_at, _) = samples
            .iter()
            .find(|(_, state)| state.transition_progress >= 1.0)
            .expect("reaches 1.0");
        assert!(*done_at <= t0 + ms(1100));
        assert!(!coordinator.is_transitioning());
    }

    #[test]
    fn missing_camera_still_cycles_states() {
        let registry = Arc::new(build_registry([
            None,
            Some(camera_target(121.5, 31.2, Some(400))),
            None,
        ]));
        let mut coordinator = TransitionCoordinator::new(registry, &EngineConfig::default());
        let t0 = Instant::now();

        let start = coordinator.observe_active_chapter(1, t0).expect("starts");
        assert!(start.camera_move);
        assert_eq!(coordinator.camera_commands(), 0);
        assert!(coordinator.is_transitioning());

        assert_eq!(coordinator.advance(t0 + ms(200)), None);
        let finish = coordinator.advance(t0 + ms(400)).expect("finishes");
        assert_eq!(finish.reason, FinishReason::Completed);
        assert!(coordinator.project_to_screen(121.5, 31.2).is_none());
    }

    #[test]
    fn failing_camera_is_logged_and_ignored() {
        let registry = Arc::new(build_registry([
            None,
            Some(camera_target(121.5, 31.2, Some(400))),
            None,
        ]));
        let mut coordinator = TransitionCoordinator::new(registry, &EngineConfig::default());
        let (mut camera, moves) = RecordingCamera::new();
        camera.fail_with_unavailable = true;
        coordinator.attach_camera(Box::new(camera));
        let t0 = Instant::now();

        coordinator.observe_active_chapter(1, t0).expect("starts");
        assert_eq!(moves.borrow().len(), 1);
        assert!(coordinator.advance(t0 + ms(400)).is_some());
    }

    #[test]
    fn repeated_or_invalid_index_is_ignored() {
        let (mut coordinator, moves) =
            build_coordinator([Some(camera_target(0.0, 0.0, None)), None, None]);
        let t0 = Instant::now();

        assert!(coordinator.observe_active_chapter(0, t0).is_none());
        assert!(coordinator.observe_active_chapter(7, t0).is_none());
        assert!(!coordinator.is_transitioning());
        assert_eq!(coordinator.last_observed(), 0);
        assert!(moves.borrow().is_empty());
    }

    #[test]
    fn projection_passes_through_to_camera() {
        let (coordinator, _moves) = build_coordinator([None, None, None]);

        let point = coordinator.project_to_screen(12.0, 3.0).expect("projected");
        assert_eq!(point.x, 120.0);
        assert_eq!(point.y, 30.0);
    }
}
