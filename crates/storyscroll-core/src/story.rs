//! Story documents: metadata, map settings, chapters, markers, and routes.
//!
//! Stories are authored as TOML (or JSON for generated content) and turned
//! into a [`ChapterRegistry`] once validated.

use crate::chapter::{CameraTarget, Chapter, ChapterRegistry};
use crate::error::{StoryError, StoryResult};
use crate::geo::{LngLat, Marker, RouteSegment, is_valid_lng_lat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryMeta {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapProjection {
    #[default]
    Mercator,
    Globe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, alias = "initialCenter")]
    pub initial_center: LngLat,
    #[serde(default = "default_initial_zoom", alias = "initialZoom")]
    pub initial_zoom: f64,
    #[serde(default, alias = "initialPitch")]
    pub initial_pitch: f64,
    #[serde(default, alias = "initialBearing")]
    pub initial_bearing: f64,
    #[serde(default = "default_show_controls", alias = "showControls")]
    pub show_controls: bool,
    #[serde(default, alias = "enable3D")]
    pub enable_3d: bool,
    #[serde(default)]
    pub projection: MapProjection,
}

fn default_initial_zoom() -> f64 {
    2.0
}

fn default_show_controls() -> bool {
    true
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: None,
            initial_center: [0.0, 0.0],
            initial_zoom: default_initial_zoom(),
            initial_pitch: 0.0,
            initial_bearing: 0.0,
            show_controls: default_show_controls(),
            enable_3d: false,
            projection: MapProjection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub meta: StoryMeta,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub routes: Vec<RouteSegment>,
}

/// Read a story file; `.json` is parsed as JSON, anything else as TOML.
pub fn load_story(path: &Path) -> StoryResult<StoryDocument> {
    let contents = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let story = if is_json {
        parse_story_json(&contents)?
    } else {
        parse_story_toml(&contents)?
    };
    info!(
        path = %path.display(),
        id = %story.meta.id,
        chapters = story.chapters.len(),
        markers = story.markers.len(),
        routes = story.routes.len(),
        "Loaded story"
    );
    Ok(story)
}

pub fn parse_story_toml(contents: &str) -> StoryResult<StoryDocument> {
    let story: StoryDocument = toml::from_str(contents)?;
    story.validate()?;
    Ok(story)
}

pub fn parse_story_json(contents: &str) -> StoryResult<StoryDocument> {
    let story: StoryDocument = serde_json::from_str(contents)?;
    story.validate()?;
    Ok(story)
}

impl StoryDocument {
    pub fn validate(&self) -> StoryResult<()> {
        if self.meta.id.trim().is_empty() || self.meta.title.trim().is_empty() {
            return Err(invalid("story meta needs an id and a title"));
        }
        if !is_valid_lng_lat(self.map.initial_center) {
            return Err(invalid("map initial_center is not a valid coordinate"));
        }

        let mut seen = HashSet::with_capacity(self.chapters.len());
        for (idx, chapter) in self.chapters.iter().enumerate() {
            if chapter.id.trim().is_empty() || chapter.title.trim().is_empty() {
                return Err(invalid(format!("chapter {idx} needs an id and a title")));
            }
            if !seen.insert(chapter.id.as_str()) {
                return Err(StoryError::DuplicateChapterId(chapter.id.clone()));
            }
            if let Some(target) = &chapter.camera_target {
                validate_camera_target(&chapter.id, target)?;
            }
        }

        for marker in &self.markers {
            if !is_valid_lng_lat(marker.coordinates) {
                return Err(invalid(format!(
                    "marker {:?} has invalid coordinates",
                    marker.title
                )));
            }
        }
        for (idx, route) in self.routes.iter().enumerate() {
            if !is_valid_lng_lat(route.from) || !is_valid_lng_lat(route.to) {
                return Err(invalid(format!("route segment {idx} has invalid coordinates")));
            }
        }

        debug!(id = %self.meta.id, "Story validated");
        Ok(())
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn into_registry(self) -> StoryResult<ChapterRegistry> {
        ChapterRegistry::new(self.chapters)
    }
}

fn validate_camera_target(chapter_id: &str, target: &CameraTarget) -> StoryResult<()> {
    if !is_valid_lng_lat(target.center) {
        return Err(invalid(format!(
            "chapter {chapter_id} camera center is not a valid coordinate"
        )));
    }
    if !target.zoom.is_finite() || target.zoom < 0.0 {
        return Err(invalid(format!("chapter {chapter_id} camera zoom must be >= 0")));
    }
    let finite = |value: Option<f64>| value.is_none_or(f64::is_finite);
    if !finite(target.pitch) || !finite(target.bearing) {
        return Err(invalid(format!(
            "chapter {chapter_id} camera pitch/bearing must be finite"
        )));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> StoryError {
    StoryError::InvalidStory(message.into())
}
