//! Invalidation Policy Module
//!
//! Decides whether cached entries are still valid and may enrich their metadata.
//!
//! # Policies
//! - `NopPolicy`: every entry stays valid
//! - `TimedPolicy`: entries go stale after a fixed lifetime without activity

mod nop;
mod timed;

pub use nop::NopPolicy;
pub use timed::TimedPolicy;

use crate::cache::Metadata;

// == Invalidation Policy ==
/// Pluggable validity predicate plus metadata hooks.
///
/// The `*_extra` hooks are meant to touch `Metadata::extra` only.
pub trait InvalidationPolicy<V>: Send + Sync + 'static {
    /// Returns false if the entry should be evicted.
    ///
    /// Called by the reaper for every entry on every sweep, so keep it cheap
    /// and free of side effects.
    fn is_valid(&self, metadata: &Metadata) -> bool;

    /// Lets the policy veto the insertion of a brand-new key.
    fn can_create(&self, _key: &str, _value: &V) -> bool {
        true
    }

    /// Called after a successful read stamps `accessed`.
    fn access_extra(&self, _metadata: &mut Metadata) {}

    /// Called after an insertion stamps `created`.
    fn create_extra(&self, _metadata: &mut Metadata) {}

    /// Called after an overwrite stamps `modified`.
    fn update_extra(&self, _metadata: &mut Metadata) {}

    /// Releases policy-owned resources on clear and destroy.
    fn stop(&self) {}
}
