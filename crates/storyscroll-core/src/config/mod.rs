//! Engine configuration.
//!
//! Tunables live in `conf/config.toml`, grouped into tables. Missing or
//! invalid entries fall back to defaults so a story can still play.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{EngineConfig, LogLevel};
