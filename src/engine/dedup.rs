//! Order-preserving deduplication of identifier sequences.

use std::collections::HashSet;

/// Result of removing repeats from a sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    /// First occurrence of each identifier, in input order
    pub unique: Vec<String>,
    /// How many repeats were dropped
    pub duplicate_count: usize,
    /// The dropped repeats, in the order they were dropped
    pub duplicates: Vec<String>,
}

/// Keep the first occurrence of every identifier and report what was dropped.
///
/// `unique.len() + duplicate_count == ids.len()` always holds.
pub fn deduplicate<S: AsRef<str>>(ids: &[S]) -> Deduplicated {
    let mut seen: HashSet<&str> = HashSet::with_capacity(ids.len());
    let mut result = Deduplicated {
        unique: Vec::with_capacity(ids.len()),
        ..Deduplicated::default()
    };

    for id in ids {
        let id = id.as_ref();
        if seen.insert(id) {
            result.unique.push(id.to_string());
        } else {
            result.duplicates.push(id.to_string());
            result.duplicate_count += 1;
        }
    }

    result
}
