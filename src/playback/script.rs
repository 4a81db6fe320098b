//! Scroll scripts: one timed action per line.
//!
//! ```text
//! # at_ms  action
//! 0        1200        # jump to offset 1200
//! 2500     goto 3
//! 4000     next
//! 6000     prev
//! ```

use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptAction {
    ScrollTo(f64),
    Goto(usize),
    Next,
    Prev,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub at: Duration,
    pub action: ScriptAction,
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptStep>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&contents).with_context(|| format!("invalid script {}", path.display()))
}

/// Parse a script; steps come back ordered by time, keeping file order for
/// equal times.
pub fn parse_script(contents: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_line(line).with_context(|| format!("line {}: {raw:?}", idx + 1))?;
        steps.push(step);
    }
    steps.sort_by_key(|step| step.at);
    Ok(steps)
}

fn parse_line(line: &str) -> Result<ScriptStep> {
    let mut fields = line.split_whitespace();
    let at_ms: u64 = fields
        .next()
        .ok_or_else(|| anyhow!("missing time"))?
        .parse()
        .context("time must be whole milliseconds")?;
    let verb = fields.next().ok_or_else(|| anyhow!("missing action"))?;

    let action = match verb {
        "next" => ScriptAction::Next,
        "prev" => ScriptAction::Prev,
        "goto" => {
            let index = fields
                .next()
                .ok_or_else(|| anyhow!("goto needs a chapter index"))?
                .parse()
                .context("chapter index must be a non-negative integer")?;
            ScriptAction::Goto(index)
        }
        offset => {
            let offset: f64 = offset
                .parse()
                .with_context(|| format!("unknown action {offset:?}"))?;
            if !offset.is_finite() {
                bail!("offset must be finite");
            }
            ScriptAction::ScrollTo(offset)
        }
    };

    if let Some(extra) = fields.next() {
        bail!("unexpected trailing field {extra:?}");
    }
    Ok(ScriptStep {
        at: Duration::from_millis(at_ms),
        action,
    })
}
