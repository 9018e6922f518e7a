//! Best-candidate selection with duplicate detection.

use std::collections::HashSet;

use crate::types::{Candidate, SelectedTrack};

/// Result of choosing a track for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected {
        track: SelectedTrack,
        candidate: Candidate,
    },
    /// The best candidate was already selected by an earlier query.
    DuplicateSkipped(Candidate),
    NotFound,
}

/// Picks the rank-0 candidate for `query`.
///
/// With duplicates disallowed a candidate whose id is already in `seen` is
/// skipped outright; lower-ranked candidates are never tried instead. An
/// accepted id is added to `seen`.
pub fn select(
    query: &str,
    candidates: &[Candidate],
    seen: &mut HashSet<String>,
    allow_duplicates: bool,
) -> Selection {
    let Some(best) = candidates.iter().min_by_key(|c| c.rank) else {
        return Selection::NotFound;
    };

    let first_time = seen.insert(best.track_id.clone());
    if !first_time && !allow_duplicates {
        return Selection::DuplicateSkipped(best.clone());
    }

    Selection::Selected {
        track: SelectedTrack {
            track_id: best.track_id.clone(),
            source_query: query.to_string(),
        },
        candidate: best.clone(),
    }
}
