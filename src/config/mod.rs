//! Configuration management for rangescan.
//!
//! Provides XDG-compliant settings storage with serde defaults for every field.

mod settings;

pub use settings::{Paths, Settings, DEFAULT_FALLBACK_PORTS};
