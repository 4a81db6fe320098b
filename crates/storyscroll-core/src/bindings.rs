//! TypeScript bindings for the types a web front end consumes.

use crate::session::{ChapterSummary, NavigationState, StoryEvent, StorySnapshot};
use crate::tracker::ScrollState;
use crate::transition::{FinishReason, TransitionState};
use crate::viewport::ScrollDirection;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use ts_rs::TS;

const EXPORTED_TYPES: &[&str] = &[
    "ScrollDirection",
    "ScrollState",
    "TransitionState",
    "FinishReason",
    "StoryEvent",
    "NavigationState",
    "ChapterSummary",
    "StorySnapshot",
];

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<()> {
    T::export_all_to(out_dir).with_context(|| format!("failed to export {}", T::name()))
}

/// Replace every `.ts` file in `out_dir` with freshly generated bindings
/// and an `index.ts` re-exporting them.
pub fn export_ts_bindings(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    for entry in
        fs::read_dir(out_dir).with_context(|| format!("failed to list {}", out_dir.display()))?
    {
        let path = entry.context("failed to read directory entry")?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
    }

    export_single_type::<ScrollDirection>(out_dir)?;
    export_single_type::<ScrollState>(out_dir)?;
    export_single_type::<TransitionState>(out_dir)?;
    export_single_type::<FinishReason>(out_dir)?;
    export_single_type::<StoryEvent>(out_dir)?;
    export_single_type::<NavigationState>(out_dir)?;
    export_single_type::<ChapterSummary>(out_dir)?;
    export_single_type::<StorySnapshot>(out_dir)?;

    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index_content())
        .with_context(|| format!("failed to write {}", index_path.display()))?;
    Ok(())
}

fn index_content() -> String {
    EXPORTED_TYPES
        .iter()
        .map(|name| format!("export type {{ {name} }} from \"./{name}\";\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_reexports_every_type() {
        let index = index_content();

        assert_eq!(index.lines().count(), EXPORTED_TYPES.len());
        assert!(index.contains("export type { StorySnapshot } from \"./StorySnapshot\";"));
    }
}
