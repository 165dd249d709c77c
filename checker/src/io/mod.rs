//! I/O helpers for the checker.

pub mod artifacts;
pub mod config;
pub mod engine;
pub mod loader;
pub mod process;
