//! Gateway module - Provider fallback orchestration

pub mod fallback;

pub use fallback::{FallbackChain, FallbackObserver, GenerationResult, SilentObserver};
