//! Camera controller capability consumed by the transition coordinator.

use crate::chapter::CameraTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Map viewpoint handed to [`CameraController::move_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub pitch: Option<f64>,
    pub bearing: Option<f64>,
}

impl From<&CameraTarget> for CameraState {
    fn from(target: &CameraTarget) -> Self {
        Self {
            center: target.center,
            zoom: target.zoom,
            pitch: target.pitch,
            bearing: target.bearing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Error)]
pub enum CameraError {
    /// The map has not loaded yet
    #[error("camera unavailable")]
    Unavailable,

    #[error("camera rejected command: {0}")]
    Rejected(String),
}

/// Map SDK surface the engine drives.
///
/// `move_to` is fire-and-forget: there is no completion callback, which is
/// why the coordinator tracks progress from elapsed time.
pub trait CameraController {
    fn move_to(&mut self, state: &CameraState, duration: Duration) -> Result<(), CameraError>;
    fn project_to_screen(&self, lon: f64, lat: f64) -> Option<ScreenPoint>;
}
