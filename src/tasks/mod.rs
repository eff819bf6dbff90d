//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of a cache.
//!
//! # Tasks
//! - Reaper: evicts entries the invalidation policy rejects at configured intervals

mod reaper;

pub(crate) use reaper::{spawn_reaper, sweep};
