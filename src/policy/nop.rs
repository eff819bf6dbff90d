use crate::cache::Metadata;
use crate::policy::InvalidationPolicy;

/// Policy that keeps every entry and adds nothing to metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopPolicy;

impl<V> InvalidationPolicy<V> for NopPolicy {
    fn is_valid(&self, _metadata: &Metadata) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nop_always_valid() {
        let policy = NopPolicy;
        let mut metadata = Metadata::new();
        metadata.created = 0;

        assert!(InvalidationPolicy::<String>::is_valid(&policy, &metadata));
        assert!(InvalidationPolicy::<String>::can_create(
            &policy,
            "key",
            &"value".to_string()
        ));
    }

    #[test]
    fn test_nop_leaves_extra_alone() {
        let policy = NopPolicy;
        let mut metadata = Metadata::new();

        InvalidationPolicy::<u8>::access_extra(&policy, &mut metadata);
        InvalidationPolicy::<u8>::create_extra(&policy, &mut metadata);
        InvalidationPolicy::<u8>::update_extra(&policy, &mut metadata);
        assert!(metadata.extra.is_null());
    }
}
