//! Per-infoset regret matching with fine-grained, two-lock concurrency.
//!
//! A single infoset's regret and average-policy accumulators live behind independently lockable
//! `Mutex`es rather than both fields behind one shared lock, because every worker thread mutates
//! the table directly and concurrently: one lock covering both accumulators would serialize policy
//! reads against regret writes across the whole run.

use crate::error::{McrError, McrResult};
use std::sync::Mutex;

struct RegretState {
    dim: Option<usize>,
    r: Vec<f64>,
}

struct PolicyState {
    s: Vec<f64>,
}

/// The regret/average-policy accumulator for one information set.
pub struct RegretMinimizer {
    regret: Mutex<RegretState>,
    policy: Mutex<PolicyState>,
}

impl RegretMinimizer {
    fn new(action_max: usize) -> Self {
        Self {
            regret: Mutex::new(RegretState { dim: None, r: vec![0.0; action_max] }),
            policy: Mutex::new(PolicyState { s: vec![0.0; action_max] }),
        }
    }

    /// Declares the legal-action count. Idempotent; errors if a prior call observed a different
    /// dimension.
    pub fn set_dim(&self, infoset: usize, d: usize) -> McrResult<()> {
        let mut state = self.regret.lock().unwrap();
        match state.dim {
            None => {
                state.dim = Some(d);
                Ok(())
            }
            Some(expected) if expected == d => Ok(()),
            Some(expected) => Err(McrError::DimensionMismatch { infoset, expected, got: d }),
        }
    }

    /// `R[i] += u[i] - <last_policy, u>` for `i < u.len()`.
    pub fn observe_utility(&self, u: &[f64], last_policy: &[f64]) {
        debug_assert_eq!(u.len(), last_policy.len());
        let baseline: f64 = last_policy.iter().zip(u).map(|(p, v)| p * v).sum();
        let mut state = self.regret.lock().unwrap();
        for (i, &ui) in u.iter().enumerate() {
            state.r[i] += ui - baseline;
        }
    }

    /// Regret matching: `pi[i] = max(R[i], 0) / sum_j max(R[j], 0)`, uniform if the denominator
    /// is <= 1e-9.
    pub fn next_policy(&self, d: usize) -> Vec<f64> {
        let state = self.regret.lock().unwrap();
        let positive: Vec<f64> = state.r[..d].iter().map(|&x| x.max(0.0)).collect();
        let denom: f64 = positive.iter().sum();
        if denom <= 1e-9 {
            vec![1.0 / d as f64; d]
        } else {
            positive.into_iter().map(|x| x / denom).collect()
        }
    }

    /// `S[a] += delta`.
    pub fn increment_avg_policy(&self, a: usize, delta: f64) {
        let mut state = self.policy.lock().unwrap();
        state.s[a] += delta;
    }

    pub fn get_average_policy(&self) -> Vec<f64> {
        self.policy.lock().unwrap().s.clone()
    }

    pub fn set_average_policy(&self, s: Vec<f64>) {
        self.policy.lock().unwrap().s = s;
    }

    pub fn get_regret(&self) -> Vec<f64> {
        self.regret.lock().unwrap().r.clone()
    }

    pub fn set_regret(&self, r: Vec<f64>) {
        self.regret.lock().unwrap().r = r;
    }

    pub fn dim(&self) -> Option<usize> {
        self.regret.lock().unwrap().dim
    }
}

/// `NUM_INFO_SETS` independent, independently-lockable regret minimizers.
pub struct RegretTable {
    minimizers: Vec<RegretMinimizer>,
}

impl RegretTable {
    pub fn new(num_info_sets: usize, action_max: usize) -> Self {
        let minimizers = (0..num_info_sets).map(|_| RegretMinimizer::new(action_max)).collect();
        Self { minimizers }
    }

    pub fn get(&self, infoset: usize) -> &RegretMinimizer {
        &self.minimizers[infoset]
    }

    pub fn len(&self) -> usize {
        self.minimizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimizers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_policy_is_a_probability_distribution() {
        let m = RegretMinimizer::new(4);
        m.set_dim(0, 3).unwrap();
        m.observe_utility(&[1.0, -2.0, 0.5], &[1.0 / 3.0; 3]);
        let pi = m.next_policy(3);
        assert_eq!(pi.len(), 3);
        assert!(pi.iter().all(|&p| p >= 0.0));
        let sum: f64 = pi.iter().sum();
        assert!((sum - 1.0).abs() <= 1e-9, "sum = {sum}");
    }

    #[test]
    fn next_policy_falls_back_to_uniform_on_nonpositive_regret() {
        let m = RegretMinimizer::new(3);
        m.set_dim(0, 3).unwrap();
        let pi = m.next_policy(3);
        assert_eq!(pi, vec![1.0 / 3.0; 3]);
        m.observe_utility(&[-1.0, -1.0, -1.0], &[1.0 / 3.0; 3]);
        let pi = m.next_policy(3);
        assert_eq!(pi, vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn set_dim_rejects_a_changed_dimension() {
        let m = RegretMinimizer::new(4);
        m.set_dim(7, 2).unwrap();
        m.set_dim(7, 2).unwrap();
        match m.set_dim(7, 3) {
            Err(McrError::DimensionMismatch { infoset: 7, expected: 2, got: 3 }) => {}
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn regret_update_preserves_counterfactual_identity() {
        let m = RegretMinimizer::new(3);
        m.set_dim(0, 3).unwrap();
        let pi = vec![0.2, 0.3, 0.5];
        let u = vec![4.0, -1.0, 2.0];
        let before = m.get_regret();
        m.observe_utility(&u, &pi);
        let after = m.get_regret();
        let baseline: f64 = pi.iter().zip(&u).map(|(p, v)| p * v).sum();
        let mut weighted_delta = 0.0;
        for i in 0..3 {
            let delta = after[i] - before[i];
            assert!((delta - (u[i] - baseline)).abs() < 1e-12);
            weighted_delta += pi[i] * delta;
        }
        assert!(weighted_delta.abs() < 1e-9, "weighted_delta = {weighted_delta}");
    }
}
