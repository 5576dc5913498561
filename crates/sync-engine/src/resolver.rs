//! Active-segment resolution
//!
//! Maps a clock sample onto the index of the chunk whose half-open window
//! `[start, end)` contains it. Forward playback is served from the previous
//! index in O(1); anything else falls back to a binary search over `start`.

use readalong_core::{ChunkTable, GapPolicy, TextChunk};

/// Finds the chunk active at `time`
///
/// Returns `None` for gaps, for times outside the narration and for
/// non-finite or negative samples. `previous` is only a hint: a stale or
/// out-of-range hint costs a binary search, never a wrong answer.
///
/// The table must be sorted with non-overlapping windows; see
/// [`ChunkTable::sanitized`].
pub fn resolve(time: f64, table: &ChunkTable, previous: Option<usize>) -> Option<usize> {
    if !time.is_finite() || time < 0.0 {
        return None;
    }

    let chunks = table.chunks();
    if chunks.is_empty() {
        return None;
    }

    if let Some(hint) = previous {
        if let Some(found) = check_hint(time, chunks, hint) {
            return found;
        }
        log::trace!("Resolver hint {} missed at {:.3}s", hint, time);
    }

    search(time, chunks)
}

/// Like [`resolve`], with the gap behaviour chosen by `policy`
///
/// Under [`GapPolicy::StaleHold`] a sample that falls between two chunks
/// keeps the chunk that just ended. Before the first chunk and after the
/// last one the result is still `None`.
pub fn resolve_with_policy(
    time: f64,
    table: &ChunkTable,
    previous: Option<usize>,
    policy: GapPolicy,
) -> Option<usize> {
    let resolved = resolve(time, table, previous);
    if resolved.is_some() || policy == GapPolicy::ExplicitClear {
        return resolved;
    }
    if !time.is_finite() || time < 0.0 {
        return None;
    }

    let chunks = table.chunks();
    let after = chunks.partition_point(|c| c.start <= time);
    if after > 0 && after < chunks.len() {
        Some(after - 1)
    } else {
        None
    }
}

/// `Some(result)` when the hint settles the answer, `None` to fall back
fn check_hint(time: f64, chunks: &[TextChunk], hint: usize) -> Option<Option<usize>> {
    let current = chunks.get(hint)?;
    if current.contains(time) {
        return Some(Some(hint));
    }
    if time < current.end {
        return None;
    }

    match chunks.get(hint + 1) {
        Some(next) if next.contains(time) => Some(Some(hint + 1)),
        Some(next) if time < next.start => Some(None),
        Some(_) => None,
        None => Some(None),
    }
}

fn search(time: f64, chunks: &[TextChunk]) -> Option<usize> {
    let after = chunks.partition_point(|c| c.start <= time);
    if after == 0 {
        return None;
    }
    let candidate = after - 1;
    chunks[candidate].contains(time).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ChunkTable {
        ChunkTable::new(vec![
            TextChunk::new("one", 0.5, 1.0),
            TextChunk::new("two", 1.0, 2.0),
            TextChunk::new("three", 2.5, 3.0),
            TextChunk::new("four", 3.0, 4.25),
        ])
    }

    fn brute_force(time: f64, table: &ChunkTable) -> Option<usize> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        table.iter().position(|c| c.contains(time))
    }

    #[test]
    fn test_inside_windows() {
        let t = table();
        assert_eq!(resolve(0.5, &t, None), Some(0));
        assert_eq!(resolve(0.99, &t, None), Some(0));
        assert_eq!(resolve(1.5, &t, None), Some(1));
        assert_eq!(resolve(4.0, &t, None), Some(3));
    }

    #[test]
    fn test_shared_boundary_goes_to_successor() {
        let t = table();
        assert_eq!(resolve(1.0, &t, None), Some(1));
        assert_eq!(resolve(1.0, &t, Some(0)), Some(1));
        assert_eq!(resolve(3.0, &t, Some(2)), Some(3));
    }

    #[test]
    fn test_gaps_and_out_of_range() {
        let t = table();
        assert_eq!(resolve(0.0, &t, None), None);
        assert_eq!(resolve(2.0, &t, None), None);
        assert_eq!(resolve(2.2, &t, Some(1)), None);
        assert_eq!(resolve(4.25, &t, Some(3)), None);
        assert_eq!(resolve(100.0, &t, None), None);
    }

    #[test]
    fn test_rejects_unusable_time() {
        let t = table();
        assert_eq!(resolve(-0.1, &t, None), None);
        assert_eq!(resolve(f64::NAN, &t, Some(0)), None);
        assert_eq!(resolve(f64::INFINITY, &t, None), None);
        assert_eq!(resolve(f64::NEG_INFINITY, &t, Some(3)), None);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(resolve(1.0, &ChunkTable::empty(), None), None);
        assert_eq!(resolve(1.0, &ChunkTable::empty(), Some(4)), None);
    }

    #[test]
    fn test_regression_falls_back_to_search() {
        let t = table();
        assert_eq!(resolve(0.7, &t, Some(3)), Some(0));
        assert_eq!(resolve(1.2, &t, Some(2)), Some(1));
    }

    #[test]
    fn test_every_hint_matches_brute_force() {
        let t = table();
        let hints: Vec<Option<usize>> = std::iter::once(None)
            .chain((0..t.len() + 3).map(Some))
            .collect();

        for step in 0..=500 {
            let time = step as f64 * 0.01 - 0.05;
            let expected = brute_force(time, &t);
            for hint in &hints {
                assert_eq!(
                    resolve(time, &t, *hint),
                    expected,
                    "time {} with hint {:?}",
                    time,
                    hint
                );
            }
        }
    }

    #[test]
    fn test_stale_hold_keeps_previous_between_chunks() {
        let t = table();
        assert_eq!(
            resolve_with_policy(2.2, &t, Some(1), GapPolicy::StaleHold),
            Some(1)
        );
        assert_eq!(
            resolve_with_policy(2.2, &t, None, GapPolicy::StaleHold),
            Some(1)
        );
        assert_eq!(
            resolve_with_policy(2.2, &t, Some(1), GapPolicy::ExplicitClear),
            None
        );
    }

    #[test]
    fn test_stale_hold_still_clears_outside_narration() {
        let t = table();
        assert_eq!(resolve_with_policy(0.1, &t, None, GapPolicy::StaleHold), None);
        assert_eq!(
            resolve_with_policy(5.0, &t, Some(3), GapPolicy::StaleHold),
            None
        );
        assert_eq!(
            resolve_with_policy(f64::NAN, &t, Some(1), GapPolicy::StaleHold),
            None
        );
    }
}
