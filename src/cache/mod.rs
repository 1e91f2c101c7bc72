//! Model caching
//!
//! Holds at most one loaded artifact per `(name, stage)`, loaded on first
//! use and swapped atomically on reload.

mod model_cache;

pub use model_cache::{CacheKey, ModelCache, ModelDescription, DEFAULT_LOAD_TIMEOUT};
