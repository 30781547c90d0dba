//! # Protolab
//!
//! HTTP API, CLI and configuration for the Protolab readiness tracker.
//! The rules themselves live in `protolab-core`.

pub mod api;
pub mod cli;
pub mod config;
