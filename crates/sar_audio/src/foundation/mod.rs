//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Collections for backend session bookkeeping
//! - Logging utilities

pub mod collections;
pub mod logging;
