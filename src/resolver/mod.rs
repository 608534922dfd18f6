//! Multi-version conflict resolution.
//!
//! Reads may surface several concurrently written versions of one key.
//! A [`ConflictResolver`] reduces that set to a single winner. The
//! default policy keeps the most recently written version; applications
//! with richer semantics inject their own strategy, either as a trait
//! implementation or as a plain closure.

use crate::VersionedValue;

/// Strategy reducing a version set to one chosen value.
///
/// Implementations must return exactly one of the supplied versions (or
/// a deliberately merged one) for a non-empty set, and `None` only for
/// an empty set. Resolution never fails; "no value" is the empty-set
/// answer, not an error.
pub trait ConflictResolver: Send + Sync {
    fn resolve(
        &self,
        versions: Vec<VersionedValue>,
    ) -> Option<VersionedValue>;
}

/// Default policy: keep the version with the maximal write timestamp.
///
/// Ties between equal timestamps are broken arbitrarily; callers must
/// not rely on which of the tied versions survives.
pub struct MostRecentTimestamp;

impl ConflictResolver for MostRecentTimestamp {
    fn resolve(
        &self,
        versions: Vec<VersionedValue>,
    ) -> Option<VersionedValue> {
        versions.into_iter().max_by_key(|v| v.version.timestamp)
    }
}

/// Any matching closure is a resolver, so callers can inject a policy
/// without naming a type.
impl<F> ConflictResolver for F
where
    F: Fn(Vec<VersionedValue>) -> Option<VersionedValue> + Send + Sync,
{
    fn resolve(
        &self,
        versions: Vec<VersionedValue>,
    ) -> Option<VersionedValue> {
        self(versions)
    }
}
