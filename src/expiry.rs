//! Staleness policy for stored objects

use crate::store::Lookup;
use chrono::{DateTime, Utc};

/// Decide whether a fetched object is stale
///
/// Absent objects, in-band backend errors, and descriptors without a
/// last-modified time are always treated as expired. A TTL of `None`
/// or `0` never expires. The age comparison truncates to whole
/// seconds, so an object ages out strictly after `ttl_seconds` full
/// seconds have elapsed.
pub fn is_expired(lookup: &Lookup, ttl_seconds: Option<u64>, now: DateTime<Utc>) -> bool {
    let descriptor = match lookup {
        Lookup::Found(descriptor) => descriptor,
        Lookup::NotFound | Lookup::BackendError(_) => return true,
    };

    let modified = match descriptor.last_modified {
        Some(modified) => modified,
        None => return true,
    };

    let ttl = match ttl_seconds {
        None | Some(0) => return false,
        Some(ttl) => ttl,
    };

    now.signed_duration_since(modified).num_seconds() > ttl as i64
}
