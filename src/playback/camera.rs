use std::time::Duration;
use storyscroll_core::{CameraController, CameraError, CameraState, ScreenPoint};
use tracing::info;

/// Tile size the zoom level is defined against.
const TILE_SIZE: f64 = 256.0;

/// Camera stand-in for headless playback: jumps straight to each target and
/// logs the command.
#[derive(Debug)]
pub struct LoggingCamera {
    state: CameraState,
    width: f64,
    height: f64,
    moves: usize,
}

impl LoggingCamera {
    pub fn new(initial: CameraState, width: f64, height: f64) -> Self {
        Self {
            state: initial,
            width,
            height,
            moves: 0,
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn moves(&self) -> usize {
        self.moves
    }
}

impl CameraController for LoggingCamera {
    fn move_to(&mut self, state: &CameraState, duration: Duration) -> Result<(), CameraError> {
        if !state.zoom.is_finite() {
            return Err(CameraError::Rejected(format!("zoom {} is not finite", state.zoom)));
        }
        info!(
            lon = state.center[0],
            lat = state.center[1],
            zoom = state.zoom,
            pitch = state.pitch.unwrap_or(0.0),
            bearing = state.bearing.unwrap_or(0.0),
            duration_ms = duration.as_millis() as u64,
            "Camera fly-to"
        );
        self.state = state.clone();
        self.moves += 1;
        Ok(())
    }

    /// Flat projection around the current center; good enough to place
    /// overlays in logs.
    fn project_to_screen(&self, lon: f64, lat: f64) -> Option<ScreenPoint> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let px_per_degree = TILE_SIZE * self.state.zoom.exp2() / 360.0;
        Some(ScreenPoint {
            x: self.width / 2.0 + (lon - self.state.center[0]) * px_per_degree,
            y: self.height / 2.0 - (lat - self.state.center[1]) * px_per_degree,
        })
    }
}
