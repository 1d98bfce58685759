//! Shared primitive types used across the entire crate.

/// A 12-digit Census Block Group identifier.
pub type Geoid = String;

/// A simulated month. Month 0 is the baseline.
pub type Month = u32;

/// Length of a block group GEOID.
pub const GEOID_LEN: usize = 12;

/// Leading GEOID characters naming the containing tract.
pub const TRACT_PREFIX_LEN: usize = 9;

/// Returns true if `id` is exactly 12 ASCII digits.
pub fn is_valid_geoid(id: &str) -> bool {
    id.len() == GEOID_LEN && id.bytes().all(|b| b.is_ascii_digit())
}

/// The tract prefix of a GEOID, or the whole id if it is shorter.
pub fn tract_prefix(id: &str) -> &str {
    id.get(..TRACT_PREFIX_LEN).unwrap_or(id)
}
