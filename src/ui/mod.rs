//! Terminal-facing UI.
//!
//! Orchestration code depends on the [`render::RenderSink`] and
//! [`terminal::Console`] contracts rather than on stdout/stdin directly so the
//! review loop can run against scripted input in tests.

pub mod render;
pub mod settings;
pub mod terminal;
