//! Splitting a mixed multi-storm feed into per-storm sample lists.

use std::collections::BTreeMap;

use storm_impact_track_models::RawTrackSample;

/// Groups samples by `track_id`.
///
/// Samples without a `track_id` are skipped. Each group is sorted stably
/// by its raw timestamp string; samples without a timestamp sort first.
#[must_use]
pub fn group_by_track_id(samples: &[RawTrackSample]) -> BTreeMap<String, Vec<RawTrackSample>> {
    let mut tracks: BTreeMap<String, Vec<RawTrackSample>> = BTreeMap::new();
    let mut unassigned = 0_usize;

    for sample in samples {
        match sample.track_id.as_deref() {
            Some(id) if !id.is_empty() => {
                tracks.entry(id.to_string()).or_default().push(sample.clone());
            }
            _ => unassigned += 1,
        }
    }

    if unassigned > 0 {
        log::debug!("Skipped {unassigned} samples without a track_id");
    }

    for records in tracks.values_mut() {
        records.sort_by(|a, b| {
            a.timestamp
                .as_deref()
                .unwrap_or("")
                .cmp(b.timestamp.as_deref().unwrap_or(""))
        });
    }

    tracks
}
