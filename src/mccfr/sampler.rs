//! MCCFR episode drivers: outcome sampling (primary) and external sampling (alternative).
//!
//! Both dispatch by node kind (chance vs. the mover vs. an opponent), against the free-standing
//! `RegretTable` of [`crate::mccfr::regret`] rather than a single shared profile object.
//!
//! Both samplers assume the convention both shipped games honor: the raw action id returned by
//! `Game::actions()[i]` equals the position `i` used to index the regret/average-policy arrays,
//! i.e. the legal-action id space at any one infoset is always a contiguous `0..num_actions()`
//! prefix of `0..ACTION_MAX` (see DESIGN.md).
//!
//! `reach_sample` tracks only genuine stochastic sampling decisions along the current path — the
//! mover's own `a_star` draws, plus chance draws under outcome sampling. External sampling's
//! enumerated chance/opponent branches contribute no sampling probability, so they leave
//! `reach_sample` unchanged and fold their weight into `reach_other` instead.

use crate::mccfr::game::Game;
use crate::mccfr::regret::RegretTable;
use crate::mccfr::strategy::sample_index;
use rand::Rng;

/// Exploration weight mixed into the mover's own sampling distribution.
const EXPLORATION_EPSILON: f64 = 0.6;

fn mover_sampling_distribution(pi: &[f64]) -> Vec<f64> {
    let d = pi.len() as f64;
    pi.iter().map(|&p| EXPLORATION_EPSILON / d + (1.0 - EXPLORATION_EPSILON) * p).collect()
}

/// Runs one outcome-sampling episode for player `p` from `state`, mutating `table` in place and
/// returning the importance-weighted utility estimate to `p`.
pub fn outcome_sampling_episode<G: Game>(
    state: G,
    p: G::Player,
    reach_me: f64,
    reach_other: f64,
    reach_sample: f64,
    table: &RegretTable,
    rng: &mut impl Rng,
) -> f64 {
    if state.is_terminal() {
        return state.utility(p);
    }
    if state.is_chance() {
        let actions = state.actions();
        let probs = state.action_probs();
        let a_idx = sample_index(&probs, rng);
        let prob = probs[a_idx];
        let child = state.step(actions[a_idx]);
        return outcome_sampling_episode(
            child,
            p,
            reach_me,
            reach_other * prob,
            reach_sample * prob,
            table,
            rng,
        );
    }

    let infoset = state.info_set_idx();
    let actions = state.actions();
    let d = actions.len();
    let minimizer = table.get(infoset);
    minimizer.set_dim(infoset, d).unwrap_or_else(|e| panic!("{e}"));
    let pi = minimizer.next_policy(d);
    let mover = state.current_player();
    let is_mover = mover == p;

    let sigma = if is_mover { mover_sampling_distribution(&pi) } else { pi.clone() };
    let a_star = sample_index(&sigma, rng);
    let child = state.step(actions[a_star]);

    let (reach_me2, reach_other2) = if is_mover {
        (reach_me * pi[a_star], reach_other)
    } else {
        (reach_me, reach_other * pi[a_star])
    };
    let reach_sample2 = reach_sample * sigma[a_star];

    let x = outcome_sampling_episode(child, p, reach_me2, reach_other2, reach_sample2, table, rng);

    if !is_mover {
        return x;
    }

    let mut u = vec![0.0; d];
    u[a_star] = x * reach_other / reach_sample2;
    minimizer.observe_utility(&u, &pi);
    for (i, &pi_i) in pi.iter().enumerate() {
        minimizer.increment_avg_policy(i, reach_me * pi_i / reach_sample);
    }
    pi[a_star] * x / sigma[a_star]
}

/// Runs one external-sampling episode: identical to outcome sampling at the mover's own node, but
/// opponent and chance nodes are enumerated exactly (weighted sum over all children) instead of
/// sampled.
pub fn external_sampling_episode<G: Game>(
    state: G,
    p: G::Player,
    reach_me: f64,
    reach_other: f64,
    reach_sample: f64,
    table: &RegretTable,
    rng: &mut impl Rng,
) -> f64 {
    if state.is_terminal() {
        return state.utility(p);
    }
    if state.is_chance() {
        let actions = state.actions();
        let probs = state.action_probs();
        let mut total = 0.0;
        for (i, &action) in actions.iter().enumerate() {
            let prob = probs[i];
            if prob <= 0.0 {
                continue;
            }
            let child = state.step(action);
            total += prob
                * external_sampling_episode(
                    child,
                    p,
                    reach_me,
                    reach_other * prob,
                    reach_sample,
                    table,
                    rng,
                );
        }
        return total;
    }

    let infoset = state.info_set_idx();
    let actions = state.actions();
    let d = actions.len();
    let minimizer = table.get(infoset);
    minimizer.set_dim(infoset, d).unwrap_or_else(|e| panic!("{e}"));
    let pi = minimizer.next_policy(d);
    let mover = state.current_player();

    if mover != p {
        let mut total = 0.0;
        for (i, &action) in actions.iter().enumerate() {
            if pi[i] <= 0.0 {
                continue;
            }
            let child = state.step(action);
            total += pi[i]
                * external_sampling_episode(
                    child,
                    p,
                    reach_me,
                    reach_other * pi[i],
                    reach_sample,
                    table,
                    rng,
                );
        }
        return total;
    }

    let sigma = mover_sampling_distribution(&pi);
    let a_star = sample_index(&sigma, rng);
    let child = state.step(actions[a_star]);
    let reach_me2 = reach_me * pi[a_star];
    let reach_sample2 = reach_sample * sigma[a_star];
    let x =
        external_sampling_episode(child, p, reach_me2, reach_other, reach_sample2, table, rng);

    let mut u = vec![0.0; d];
    u[a_star] = x * reach_other / reach_sample2;
    minimizer.observe_utility(&u, &pi);
    for (i, &pi_i) in pi.iter().enumerate() {
        minimizer.increment_avg_policy(i, reach_me * pi_i / reach_sample);
    }
    pi[a_star] * x / sigma[a_star]
}

/// Which episode driver a `Driver` should run each iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerKind {
    OutcomeSampling,
    ExternalSampling,
}

/// Runs one MCCFR iteration: one episode per player, from the root, with all reach probabilities
/// starting at 1.
pub fn run_iteration<G: Game>(kind: SamplerKind, table: &RegretTable, rng: &mut impl Rng) {
    for &p in G::players() {
        let root = G::root();
        match kind {
            SamplerKind::OutcomeSampling => {
                outcome_sampling_episode(root, p, 1.0, 1.0, 1.0, table, rng);
            }
            SamplerKind::ExternalSampling => {
                external_sampling_episode(root, p, 1.0, 1.0, 1.0, table, rng);
            }
        }
    }
}
