//! # deepmemory-observability
//!
//! Tracing subscriber setup, span macros, and structured log events shared by
//! every DeepMemory crate.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, init_tracing_with_filter};
