//! Chapter descriptors and the ordered registry that holds them.
//!
//! A registry is built once when a story loads and is read-only afterwards.
//! Order in the registry is scroll order.

use crate::error::{StoryError, StoryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Camera viewpoint a chapter flies to when it becomes active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTarget {
    /// `[longitude, latitude]`
    pub center: [f64; 2],
    pub zoom: f64,
    #[serde(default)]
    pub pitch: Option<f64>,
    #[serde(default)]
    pub bearing: Option<f64>,
    #[serde(default, alias = "duration")]
    pub transition_duration_ms: Option<u64>,
}

/// One narrative unit of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Render-time payload. The engine never looks inside.
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, alias = "camera", alias = "map_state", alias = "mapState")]
    pub camera_target: Option<CameraTarget>,
    #[serde(default = "default_full_height", alias = "isFullHeight")]
    pub is_full_height: bool,
}

fn default_full_height() -> bool {
    true
}

impl Chapter {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            subtitle: None,
            content: serde_json::Value::Null,
            camera_target: None,
            is_full_height: true,
        }
    }

    pub fn with_camera_target(mut self, target: CameraTarget) -> Self {
        self.camera_target = Some(target);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChapterRegistry {
    chapters: Vec<Chapter>,
    by_id: HashMap<String, usize>,
}

impl ChapterRegistry {
    pub fn new(chapters: Vec<Chapter>) -> StoryResult<Self> {
        let mut by_id = HashMap::with_capacity(chapters.len());
        for (idx, chapter) in chapters.iter().enumerate() {
            if by_id.insert(chapter.id.clone(), idx).is_some() {
                return Err(StoryError::DuplicateChapterId(chapter.id.clone()));
            }
        }
        Ok(Self { chapters, by_id })
    }

    pub fn get_chapter(&self, index: usize) -> StoryResult<&Chapter> {
        self.chapters.get(index).ok_or(StoryError::IndexOutOfRange {
            index: index as i64,
            count: self.chapters.len(),
        })
    }

    /// Same as [`get_chapter`](Self::get_chapter) for callers holding a signed index.
    pub fn get_chapter_signed(&self, index: i64) -> StoryResult<&Chapter> {
        if index < 0 {
            return Err(StoryError::IndexOutOfRange {
                index,
                count: self.chapters.len(),
            });
        }
        self.get_chapter(index as usize)
    }

    pub fn get_chapter_by_id(&self, id: &str) -> StoryResult<&Chapter> {
        self.index_of(id)
            .map(|idx| &self.chapters[idx])
            .ok_or_else(|| StoryError::ChapterNotFound(id.to_string()))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn count(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.chapters.len().saturating_sub(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_registry(ids: &[&str]) -> ChapterRegistry {
        let chapters = ids
            .iter()
            .map(|id| Chapter::new(*id, format!("Title {id}")))
            .collect();
        ChapterRegistry::new(chapters).expect("unique ids")
    }

    #[test]
    fn lookup_by_index_and_id() {
        let registry = build_registry(&["hero", "geography", "route"]);

        assert_eq!(registry.count(), 3);
        assert_eq!(registry.get_chapter(1).unwrap().id, "geography");
        assert_eq!(registry.get_chapter_by_id("route").unwrap().title, "Title route");
        assert_eq!(registry.index_of("hero"), Some(0));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let registry = build_registry(&["hero", "geography", "route"]);

        assert!(matches!(
            registry.get_chapter(3),
            Err(StoryError::IndexOutOfRange { index: 3, count: 3 })
        ));
        assert!(matches!(
            registry.get_chapter_signed(-1),
            Err(StoryError::IndexOutOfRange { index: -1, count: 3 })
        ));
        assert!(registry.get_chapter_signed(2).is_ok());
    }

    #[test]
    fn unknown_id_is_not_found() {
        let registry = build_registry(&["hero"]);

        let err = registry.get_chapter_by_id("xian").unwrap_err();
        assert!(matches!(err, StoryError::ChapterNotFound(ref id) if id == "xian"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let chapters = vec![Chapter::new("hero", "A"), Chapter::new("hero", "B")];

        let err = ChapterRegistry::new(chapters).unwrap_err();
        assert!(matches!(err, StoryError::DuplicateChapterId(ref id) if id == "hero"));
    }

    #[test]
    fn camera_target_accepts_duration_alias() {
        let target: CameraTarget =
            serde_json::from_str(r#"{"center":[121.47,31.23],"zoom":10,"duration":1500}"#)
                .expect("camera target json");

        assert_eq!(target.transition_duration_ms, Some(1500));
        assert_eq!(target.pitch, None);
    }
}
