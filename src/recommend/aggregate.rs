use std::collections::HashSet;

use crate::types::Track;

/// Merges strategy outputs into one candidate pool.
///
/// Drops tracks without an id and tracks whose id is in `excluded`, then keeps
/// the first occurrence of every remaining id. The result has no duplicate ids
/// and no overlap with `excluded`.
pub fn aggregate(outputs: Vec<Vec<Track>>, excluded: &HashSet<String>) -> Vec<Track> {
    let mut seen: HashSet<String> = HashSet::new();

    outputs
        .into_iter()
        .flatten()
        .filter(|track| match track.track_id() {
            Some(id) => !excluded.contains(id) && seen.insert(id.to_string()),
            None => false,
        })
        .collect()
}

/// Ids of the given tracks, skipping tracks without one.
pub fn track_ids<'a>(tracks: impl IntoIterator<Item = &'a Track>) -> HashSet<String> {
    tracks
        .into_iter()
        .filter_map(|t| t.track_id())
        .map(str::to_string)
        .collect()
}
