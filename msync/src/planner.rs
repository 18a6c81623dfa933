//! Round planning for the recursive doubling schedule
//!
//! Every host that already holds a copy is an eligible source, so the synced
//! prefix of the roster at least doubles each round (while destinations
//! remain) and N hosts are covered in ceil(log2(N)) rounds.

/// Progress of the synchronization across rounds.
///
/// `hosts_copied_to` counts roster entries that hold the data, the source
/// included, so it starts at 1 and the run is complete once it reaches the
/// roster length. `step_size` is `2^iteration`: it is both the offset between
/// a source index and its destination index and the upper bound on pairs
/// planned in the round.
#[derive(Debug, Clone, Copy)]
pub struct SyncState {
    pub hosts_copied_to: usize,
    pub iteration: usize,
    pub step_size: usize,
}

impl SyncState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hosts_copied_to: 1,
            iteration: 0,
            step_size: 1,
        }
    }

    #[must_use]
    pub fn complete(&self, total: usize) -> bool {
        self.hosts_copied_to >= total
    }

    /// Advance to the next round after the current one fully succeeded.
    pub fn advance_round(&mut self) {
        self.iteration += 1;
        self.step_size = 1 << self.iteration;
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

/// One planned pairwise copy, by roster index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyPair {
    pub source_index: usize,
    pub dest_index: usize,
}

/// Compute the pairs to copy this round and mark their destinations synced.
///
/// Source index `h` pairs with destination index `h + step_size`; planning
/// stops once every remaining host has a pair or the destination index would
/// run past the roster. The boundary skip is deliberate: an uncovered host is
/// picked up by a later round with a larger step, because earlier-synced
/// hosts stay eligible sources.
pub fn plan_round(state: &mut SyncState, total: usize) -> Vec<CopyPair> {
    let remaining = total - state.hosts_copied_to;
    let mut pairs = Vec::with_capacity(state.step_size.min(remaining));
    for h in 0..state.step_size {
        if pairs.len() == remaining {
            break;
        }
        if h + state.step_size >= total {
            // not enough hosts left to pair at this offset
            break;
        }
        pairs.push(CopyPair {
            source_index: h,
            dest_index: h + state.step_size,
        });
        state.hosts_copied_to += 1;
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_all_rounds(total: usize) -> Vec<Vec<CopyPair>> {
        let mut state = SyncState::new();
        let mut rounds = vec![];
        while !state.complete(total) {
            let pairs = plan_round(&mut state, total);
            assert!(!pairs.is_empty(), "planner stalled at {:?}", state);
            rounds.push(pairs);
            state.advance_round();
        }
        rounds
    }

    #[test]
    fn five_host_schedule() {
        let rounds = run_all_rounds(5);
        assert_eq!(
            rounds,
            vec![
                vec![CopyPair {
                    source_index: 0,
                    dest_index: 1
                }],
                vec![
                    CopyPair {
                        source_index: 0,
                        dest_index: 2
                    },
                    CopyPair {
                        source_index: 1,
                        dest_index: 3
                    },
                ],
                vec![CopyPair {
                    source_index: 0,
                    dest_index: 4
                }],
            ]
        );
    }

    #[test]
    fn single_host_needs_no_rounds() {
        let rounds = run_all_rounds(1);
        assert!(rounds.is_empty());
    }

    #[test]
    fn round_count_is_log2_of_host_count() {
        for total in 1..=64 {
            let rounds = run_all_rounds(total);
            let expected = (total as f64).log2().ceil() as usize;
            assert_eq!(rounds.len(), expected, "total = {}", total);
        }
    }

    #[test]
    fn destinations_are_disjoint_and_in_range() {
        for total in 1..=64 {
            let mut synced = vec![false; total];
            synced[0] = true;
            let mut state = SyncState::new();
            while !state.complete(total) {
                let before = state.hosts_copied_to;
                for pair in plan_round(&mut state, total) {
                    assert!(pair.dest_index < total);
                    // sources must already hold the data
                    assert!(synced[pair.source_index]);
                    // each destination is synced exactly once
                    assert!(!synced[pair.dest_index]);
                    synced[pair.dest_index] = true;
                }
                assert!(state.hosts_copied_to > before);
                state.advance_round();
            }
            assert!(synced.iter().all(|s| *s));
        }
    }

    #[test]
    fn step_size_doubles_each_round() {
        let mut state = SyncState::new();
        assert_eq!(state.step_size, 1);
        state.advance_round();
        assert_eq!(state.step_size, 2);
        state.advance_round();
        assert_eq!(state.step_size, 4);
        assert_eq!(state.iteration, 2);
    }

    #[test]
    fn pairs_per_round_are_bounded_by_remaining() {
        // 6 hosts: round 3 has step 4 but only 2 hosts left
        let mut state = SyncState::new();
        plan_round(&mut state, 6);
        state.advance_round();
        plan_round(&mut state, 6);
        state.advance_round();
        let pairs = plan_round(&mut state, 6);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].dest_index, 4);
        assert_eq!(pairs[1].dest_index, 5);
        assert!(state.complete(6));
    }
}
