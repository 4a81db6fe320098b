//! Headless playback: lays a story out in a simulated window, scrolls it
//! frame by frame, and writes every engine event as a JSON line.

mod camera;
mod script;
mod viewport;

pub use camera::LoggingCamera;
pub use script::{ScriptAction, ScriptStep, load_script};
pub use viewport::SimulatedViewport;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Write;
use std::time::{Duration, Instant};
use storyscroll_core::{
    CameraState, ChapterRegistry, EngineConfig, StoryDocument, StoryEvent, StorySession,
    ViewportEvent,
};
use tracing::{debug, info, warn};

/// Simulated time after which playback gives up.
const MAX_SIMULATED: Duration = Duration::from_secs(30 * 60);
const SCREEN_WIDTH: f64 = 1280.0;

#[derive(Debug, Clone)]
pub enum PlaybackMode {
    /// Scroll top to bottom at the configured speed.
    AutoScroll,
    Script(Vec<ScriptStep>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterLayout {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub frames: u64,
    pub events: u64,
    pub chapter_changes: u64,
    pub transitions: u64,
}

/// Stack chapters top to bottom; full-height chapters take one viewport.
pub fn layout_chapters(registry: &ChapterRegistry, config: &EngineConfig) -> Vec<ChapterLayout> {
    let mut top = 0.0;
    registry
        .iter()
        .map(|chapter| {
            let height = if chapter.is_full_height {
                config.viewport_height
            } else {
                config.chapter_height
            };
            let layout = ChapterLayout { top, height };
            top += height;
            layout
        })
        .collect()
}

pub struct Playback {
    session: StorySession<SimulatedViewport>,
    config: EngineConfig,
}

impl Playback {
    pub fn new(story: StoryDocument, config: &EngineConfig) -> Result<Self> {
        let initial = CameraState {
            center: story.map.initial_center,
            zoom: story.map.initial_zoom,
            pitch: Some(story.map.initial_pitch),
            bearing: Some(story.map.initial_bearing),
        };
        let story_id = story.meta.id.clone();
        let registry = story
            .into_registry()
            .with_context(|| format!("failed to build chapters for {story_id}"))?;

        let layout = layout_chapters(&registry, config);
        let document_height = layout
            .last()
            .map(|last| last.top + last.height)
            .unwrap_or_default();
        let extents: Vec<(String, ChapterLayout)> = registry
            .iter()
            .zip(&layout)
            .map(|(chapter, layout)| (chapter.id.clone(), *layout))
            .collect();

        let viewport = SimulatedViewport::new(
            config.viewport_height,
            document_height,
            config.smooth_scroll(),
        );
        let mut session = StorySession::new(registry, viewport, config);
        for (id, layout) in &extents {
            session.register_chapter_extent(id, layout.top, layout.height);
        }
        session.attach_camera(Box::new(LoggingCamera::new(
            initial,
            SCREEN_WIDTH,
            config.viewport_height,
        )));
        info!(
            story = %story_id,
            chapters = extents.len(),
            document_height,
            "Laid out story"
        );

        Ok(Self {
            session,
            config: config.clone(),
        })
    }

    pub fn session(&self) -> &StorySession<SimulatedViewport> {
        &self.session
    }

    pub fn run<W: Write>(&mut self, mode: &PlaybackMode, out: &mut W) -> Result<PlaybackSummary> {
        let start = Instant::now();
        let frame = self.config.frame();
        let scroll_speed = self.config.scroll_speed_px_per_sec;
        let max_offset = self.session.viewport().max_offset();
        let mut summary = PlaybackSummary::default();
        let mut next_step = 0;
        let mut elapsed = Duration::ZERO;

        let events = self.session.attach(start);
        emit(out, elapsed, &events, &mut summary)?;

        loop {
            elapsed += frame;
            let now = start + elapsed;

            let script_done = match mode {
                PlaybackMode::AutoScroll => {
                    let target = (scroll_speed * elapsed.as_secs_f64()).min(max_offset);
                    if self.session.viewport_mut().set_offset(target) {
                        self.session.handle_viewport_event(ViewportEvent::Scroll);
                    }
                    self.session.viewport().offset() >= max_offset
                }
                PlaybackMode::Script(steps) => {
                    while let Some(step) = steps.get(next_step).filter(|step| step.at <= elapsed) {
                        self.apply(step.action);
                        next_step += 1;
                    }
                    next_step >= steps.len()
                }
            };

            if self.session.viewport_mut().step(now) {
                self.session.handle_viewport_event(ViewportEvent::Scroll);
            }
            let mut events = if self.session.viewport_mut().take_frame_request() {
                self.session.on_animation_frame(now)
            } else {
                Vec::new()
            };
            events.extend(self.session.tick(now));
            emit(out, elapsed, &events, &mut summary)?;
            summary.frames += 1;

            let idle = !self.session.viewport().is_animating() && !self.session.is_transitioning();
            if script_done && idle {
                break;
            }
            if elapsed >= MAX_SIMULATED {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Stopping playback after the simulated time limit"
                );
                break;
            }
        }

        self.session.detach();
        out.flush().context("failed to flush event output")?;
        info!(
            frames = summary.frames,
            events = summary.events,
            chapter_changes = summary.chapter_changes,
            transitions = summary.transitions,
            final_chapter = self.session.active_chapter_index(),
            "Playback finished"
        );
        Ok(summary)
    }

    fn apply(&mut self, action: ScriptAction) {
        debug!(?action, "Script step");
        match action {
            ScriptAction::ScrollTo(offset) => {
                if self.session.viewport_mut().set_offset(offset) {
                    self.session.handle_viewport_event(ViewportEvent::Scroll);
                }
            }
            ScriptAction::Goto(index) => {
                self.session.scroll_to_chapter(index);
            }
            ScriptAction::Next => {
                self.session.next_chapter();
            }
            ScriptAction::Prev => {
                self.session.previous_chapter();
            }
        }
    }
}

fn emit<W: Write>(
    out: &mut W,
    elapsed: Duration,
    events: &[StoryEvent],
    summary: &mut PlaybackSummary,
) -> Result<()> {
    for event in events {
        let mut line = serde_json::to_value(event).context("failed to encode event")?;
        if let Value::Object(fields) = &mut line {
            fields.insert("at_ms".to_string(), Value::from(elapsed.as_millis() as u64));
        }
        serde_json::to_writer(&mut *out, &line).context("failed to write event")?;
        writeln!(out).context("failed to write event")?;

        summary.events += 1;
        match event {
            StoryEvent::ChapterChanged { .. } => summary.chapter_changes += 1,
            StoryEvent::TransitionStarted { .. } => summary.transitions += 1,
            _ => {}
        }
    }
    Ok(())
}
