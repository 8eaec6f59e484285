//! Spans are created through small wrapper structs (see `operation`) rather
//! than ad-hoc `tracing` calls.
//!
//! The wrappers fix the span name, kind and parent of every pipeline phase,
//! and provide helpers for recording operation identity and status.
//! A span ends when its wrapper is dropped, so every exit path closes it.
//!
//! Attribute keys live in `attributes` as `const` values. Field layouts are
//! checked in `tests`.
pub const TARGET_NAME: &str = "cosmo-router";

pub mod attributes;
pub mod operation;
