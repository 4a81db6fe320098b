//! Scroll-driven storytelling engine.
//!
//! A [`StorySession`] turns a host's scroll signal into an active chapter
//! and drives an injected map camera to that chapter's viewpoint:
//! - [`tracker`] maps scroll offset to the active chapter and progress.
//! - [`transition`] issues camera moves and reports their synthetic progress.
//! - [`session`] wires the two together and exposes navigation.

pub mod bindings;
pub mod camera;
pub mod chapter;
pub mod config;
pub mod error;
pub mod geo;
pub mod session;
pub mod story;
pub mod timers;
pub mod tracker;
pub mod transition;
pub mod viewport;

#[cfg(test)]
mod test_support;

pub use camera::{CameraController, CameraError, CameraState, ScreenPoint};
pub use chapter::{CameraTarget, Chapter, ChapterRegistry};
pub use config::{EngineConfig, LogLevel};
pub use error::{StoryError, StoryResult};
pub use session::{SessionCommand, SessionEvent, StoryEvent, StorySession, StorySnapshot};
pub use story::{StoryDocument, load_story};
pub use tracker::ScrollState;
pub use transition::TransitionState;
pub use viewport::{ScrollDirection, SubscriptionId, ViewportEvent, ViewportSource};
