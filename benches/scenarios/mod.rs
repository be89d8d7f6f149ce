//! Whole-voice benchmarks.
//!
//! These run the engine the way a host does: control updates interleaved
//! with audio samples, notes held and released.

mod engine;

pub use engine::bench_engine;
