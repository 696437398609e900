//! Keepsake Engine - headless runner for the tribute page.
//!
//! This crate provides the outer loop around the page: configuration
//! loading, frame pacing, scripted input, and PNG snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod app;
pub mod config;
pub mod timing;

pub use app::{run, KeepsakeApp, RunSummary};
pub use config::EngineConfig;
