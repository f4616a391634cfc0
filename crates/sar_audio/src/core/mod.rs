//! # Core Module
//!
//! Shared configuration types used by every part of the sound subsystem.

pub mod config;

// Re-export commonly used config types
pub use config::{AudioConfig, Config, ConfigError, MusicConfig};
