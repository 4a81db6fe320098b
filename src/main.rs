//! Entry point for headless story playback.
//!
//! - Parse command-line arguments.
//! - Load engine configuration from `conf/config.toml`.
//! - Load the story and play it back, printing engine events as JSON lines
//!   on stdout. Logs go to stderr.

mod playback;

use crate::playback::{Playback, PlaybackMode, load_script};
use anyhow::{Context, Result, anyhow, bail};
use std::env;
use std::io;
use std::path::PathBuf;
use storyscroll_core::config::load_config;
use storyscroll_core::load_story;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str = "Usage: storyscroll <story.toml|story.json> [--script <file>] [--config <file>]";

#[derive(Debug)]
struct Args {
    story_path: PathBuf,
    script_path: Option<PathBuf>,
    config_path: PathBuf,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.story_path.display(),
        level = %config.log_level,
        "Starting story playback"
    );

    let story = load_story(&args.story_path)
        .with_context(|| format!("failed to load story {}", args.story_path.display()))?;
    let mode = match &args.script_path {
        Some(path) => {
            let steps = load_script(path)?;
            info!(path = %path.display(), steps = steps.len(), "Loaded scroll script");
            PlaybackMode::Script(steps)
        }
        None => PlaybackMode::AutoScroll,
    };

    let mut playback = Playback::new(story, &config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    playback.run(&mode, &mut out)?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut story_path = None;
    let mut script_path = None;
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--script" => {
                let value = args.next().ok_or_else(|| anyhow!("--script needs a path\n{USAGE}"))?;
                script_path = Some(existing_path(&value)?);
            }
            "--config" => {
                let value = args.next().ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config_path = PathBuf::from(value);
            }
            flag if flag.starts_with("--") => bail!("Unknown option {flag}\n{USAGE}"),
            other if story_path.is_none() => story_path = Some(existing_path(other)?),
            _ => bail!("Unexpected argument {arg}\n{USAGE}"),
        }
    }

    Ok(Args {
        story_path: story_path.ok_or_else(|| anyhow!(USAGE))?,
        script_path,
        config_path,
    })
}

fn existing_path(value: &str) -> Result<PathBuf> {
    let path = PathBuf::from(value);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }
    Ok(path)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    warn!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
