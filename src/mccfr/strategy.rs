//! The strategy object: a dense, normalized policy table plus Monte-Carlo evaluation.
//!
//! Rows are keyed by a plain `usize` infoset index rather than a game-specific key, so the table
//! stays generic over any `Game` implementation. `sample_action`/`evaluate`/
//! `evaluate_against_uniform` follow the classic shape: sample a playout under the strategy (or
//! under the strategy for one player and uniform play for the rest) and average the payoff.

use crate::error::{McrError, McrResult};
use crate::mccfr::game::Game;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

/// A dense table of `NUM_INFO_SETS` rows, each of width `ACTION_MAX`, holding a probability
/// distribution over legal actions (zero outside the legal mask).
#[derive(Clone, Debug)]
pub struct Strategy {
    rows: Vec<Vec<f64>>,
}

impl Strategy {
    /// Validates the invariant: every row sums to `1 +/- 1e-5` or is all-zero.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> McrResult<Self> {
        for (infoset, row) in rows.iter().enumerate() {
            let sum: f64 = row.iter().sum();
            if sum.abs() > 1e-12 && (sum - 1.0).abs() > 1e-5 {
                return Err(McrError::NonNormalizedStrategy { infoset, sum });
            }
        }
        Ok(Self { rows })
    }

    pub fn row(&self, infoset: usize) -> &[f64] {
        &self.rows[infoset]
    }

    pub fn num_info_sets(&self) -> usize {
        self.rows.len()
    }

    /// Draws one action for `state`: from `action_probs()` at chance nodes, from this strategy's
    /// row at decision nodes. The sampled action is guaranteed legal because illegal entries are
    /// zero by construction.
    pub fn sample_action<G: Game>(&self, state: &G, rng: &mut impl Rng) -> usize {
        let actions = state.actions();
        if state.is_chance() {
            let probs = state.action_probs();
            let idx = sample_index(&probs, rng);
            actions[idx]
        } else {
            let row = self.row(state.info_set_idx());
            let action = sample_index(row, rng);
            debug_assert!(actions.contains(&action), "sampled an illegal action");
            action
        }
    }

    /// Monte-Carlo play-out: simulate `iters` full episodes with every actor drawing from this
    /// strategy; returns the mean utility to `player`.
    pub fn evaluate<G: Game>(&self, player: G::Player, iters: usize, rng: &mut impl Rng) -> f64 {
        let mut sum = 0.0;
        for _ in 0..iters {
            let mut state = G::root();
            while !state.is_terminal() {
                let action = self.sample_action(&state, rng);
                state = state.step(action);
            }
            sum += state.utility(player);
        }
        sum / iters as f64
    }

    /// Same as `evaluate`, but non-`player` decision actors draw uniformly over their legal
    /// actions instead of from this strategy (chance nodes still use their own distribution).
    pub fn evaluate_against_uniform<G: Game>(
        &self,
        player: G::Player,
        iters: usize,
        rng: &mut impl Rng,
    ) -> f64 {
        let mut sum = 0.0;
        for _ in 0..iters {
            let mut state = G::root();
            while !state.is_terminal() {
                let actions = state.actions();
                let action = if state.is_chance() {
                    let probs = state.action_probs();
                    actions[sample_index(&probs, rng)]
                } else if state.current_player() == player {
                    self.sample_action(&state, rng)
                } else {
                    actions[rng.random_range(0..actions.len())]
                };
                state = state.step(action);
            }
            sum += state.utility(player);
        }
        sum / iters as f64
    }
}

/// Samples an index in `0..probs.len()` proportional to `probs`, falling back to uniform if the
/// distribution sums to <= 1e-9 (the same underflow guard used elsewhere in regret matching).
pub fn sample_index(probs: &[f64], rng: &mut impl Rng) -> usize {
    let sum: f64 = probs.iter().sum();
    if sum <= 1e-9 {
        return rng.random_range(0..probs.len());
    }
    let weights: Vec<f64> = probs.iter().map(|&p| p.max(0.0)).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.random_range(0..probs.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_row_that_sums_to_neither_zero_nor_one() {
        let rows = vec![vec![0.2, 0.2, 0.2]];
        match Strategy::from_rows(rows) {
            Err(McrError::NonNormalizedStrategy { infoset: 0, .. }) => {}
            other => panic!("expected NonNormalizedStrategy, got {other:?}"),
        }
    }

    #[test]
    fn accepts_zero_rows_and_normalized_rows() {
        let rows = vec![vec![0.0, 0.0, 0.0], vec![0.25, 0.25, 0.5]];
        assert!(Strategy::from_rows(rows).is_ok());
    }
}
