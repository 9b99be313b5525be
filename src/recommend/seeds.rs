use std::collections::HashSet;

use crate::types::Track;

/// Seed ceiling of the remote catalog.
pub const MAX_SEEDS: usize = 5;

/// Picks the most popular tracks as seeds.
///
/// Tracks without an id are dropped first. The sort is stable, so tracks with
/// equal popularity keep their input order.
pub fn select_seeds(input: &[Track], max_seeds: usize) -> Vec<Track> {
    let mut candidates: Vec<&Track> = input.iter().filter(|t| t.track_id().is_some()).collect();
    candidates.sort_by(|a, b| b.popularity.cmp(&a.popularity));
    candidates.into_iter().take(max_seeds).cloned().collect()
}

/// Mixes up to `per_source` tracks from each source into one list, keeping
/// the first occurrence of every id.
pub fn sample_distinct(sources: &[&[Track]], per_source: usize) -> Vec<Track> {
    let mut seen = HashSet::new();
    let mut sample = Vec::new();

    for source in sources {
        for track in source.iter().take(per_source) {
            let Some(id) = track.track_id() else {
                continue;
            };
            if seen.insert(id.to_string()) {
                sample.push(track.clone());
            }
        }
    }

    sample
}
