//! The full-tree evaluator: exact best response and Nash gap via a two-pass tree walk.
//!
//! Visits each infoset once and touches every history belonging to it, which is why the
//! action-order invariant in [`crate::mccfr::game`] matters: summing `h.children[i].value` across
//! every history `h` sharing an infoset requires `i` to index the same action under each `h`.

use super::tree::{HistoryTree, NodeKind};
use crate::mccfr::game::Game;
use crate::mccfr::strategy::Strategy;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

pub struct Eval<'a, G: Game> {
    tree: &'a HistoryTree<G>,
}

impl<'a, G: Game> Eval<'a, G> {
    pub fn new(tree: &'a HistoryTree<G>) -> Self {
        Self { tree }
    }

    /// Replaces `p`'s rows with the exact best response to `strategy`'s other rows.
    pub fn best_response(&self, strategy: &Strategy, p: G::Player) -> Strategy {
        let mut rows: Vec<Vec<f64>> =
            (0..strategy.num_info_sets()).map(|i| strategy.row(i).to_vec()).collect();

        let mut p_reach_others = HashMap::new();
        self.fill_p_reach_others(self.tree.root, 1.0, strategy, p, &mut p_reach_others);

        let mut visited = HashSet::new();
        let mut values = HashMap::new();
        self.best_response_value(
            self.tree.root,
            strategy,
            p,
            &p_reach_others,
            &mut visited,
            &mut values,
            &mut rows,
        );

        Strategy::from_rows(rows).expect("best-response rows are one-hot or copied, always normalized")
    }

    /// First pass: reach probability of each node under the opponent's and chance's play only
    /// (treating `p`'s own policy as the all-ones vector).
    fn fill_p_reach_others(
        &self,
        idx: NodeIndex,
        reach_in: f64,
        strategy: &Strategy,
        p: G::Player,
        cache: &mut HashMap<NodeIndex, f64>,
    ) {
        cache.insert(idx, reach_in);
        let node = self.tree.node(idx);
        match &node.kind {
            NodeKind::Terminal => {}
            NodeKind::Chance => {
                let probs = node.game.action_probs();
                for (i, child) in self.tree.children_in_order(idx).into_iter().enumerate() {
                    self.fill_p_reach_others(child, reach_in * probs[i], strategy, p, cache);
                }
            }
            NodeKind::Decision { infoset, mover } => {
                let children = self.tree.children_in_order(idx);
                if *mover == p {
                    for child in children {
                        self.fill_p_reach_others(child, reach_in, strategy, p, cache);
                    }
                } else {
                    let row = strategy.row(*infoset).to_vec();
                    for (i, child) in children.into_iter().enumerate() {
                        self.fill_p_reach_others(child, reach_in * row[i], strategy, p, cache);
                    }
                }
            }
        }
    }

    /// Second pass: best response. Returns the computed value at `idx`; for a node belonging to
    /// `p`, the first visit to its infoset computes and caches the value for every history in
    /// that infoset and overwrites the corresponding row of `rows`.
    #[allow(clippy::too_many_arguments)]
    fn best_response_value(
        &self,
        idx: NodeIndex,
        strategy: &Strategy,
        p: G::Player,
        p_reach_others: &HashMap<NodeIndex, f64>,
        visited: &mut HashSet<usize>,
        values: &mut HashMap<NodeIndex, f64>,
        rows: &mut [Vec<f64>],
    ) -> f64 {
        if let Some(&v) = values.get(&idx) {
            return v;
        }
        let node = self.tree.node(idx);
        let value = match &node.kind {
            NodeKind::Terminal => node.game.utility(p) * p_reach_others[&idx],
            NodeKind::Chance => {
                let probs = node.game.action_probs();
                self.tree
                    .children_in_order(idx)
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| {
                        probs[i]
                            * self.best_response_value(
                                child,
                                strategy,
                                p,
                                p_reach_others,
                                visited,
                                values,
                                rows,
                            )
                    })
                    .sum()
            }
            NodeKind::Decision { infoset, mover } if *mover != p => {
                let row = strategy.row(*infoset).to_vec();
                self.tree
                    .children_in_order(idx)
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| {
                        row[i]
                            * self.best_response_value(
                                child,
                                strategy,
                                p,
                                p_reach_others,
                                visited,
                                values,
                                rows,
                            )
                    })
                    .sum()
            }
            NodeKind::Decision { infoset, .. } => {
                let infoset = *infoset;
                if !visited.contains(&infoset) {
                    visited.insert(infoset);
                    let histories = self.tree.infosets[&infoset].clone();
                    let per_history_children: Vec<Vec<NodeIndex>> =
                        histories.iter().map(|&h| self.tree.children_in_order(h)).collect();
                    let d = per_history_children[0].len();
                    let mut vals = vec![0.0; d];
                    for kids in &per_history_children {
                        for (i, &ck) in kids.iter().enumerate() {
                            vals[i] += self.best_response_value(
                                ck,
                                strategy,
                                p,
                                p_reach_others,
                                visited,
                                values,
                                rows,
                            );
                        }
                    }
                    let mut i_star = 0;
                    for i in 1..d {
                        if vals[i] > vals[i_star] {
                            i_star = i;
                        }
                    }
                    let mut onehot = vec![0.0; rows[infoset].len()];
                    onehot[i_star] = 1.0;
                    rows[infoset] = onehot;
                    for (h, kids) in histories.iter().zip(per_history_children.iter()) {
                        let chosen = *values.get(&kids[i_star]).unwrap();
                        values.insert(*h, chosen);
                    }
                }
                *values.get(&idx).unwrap()
            }
        };
        values.entry(idx).or_insert(value);
        value
    }

    /// Expected utility to `p` when every actor plays `strategy` (and chance plays its own
    /// distribution).
    pub fn eval_for(&self, strategy: &Strategy, p: G::Player) -> f64 {
        self.eval_rec(self.tree.root, strategy, p)
    }

    fn eval_rec(&self, idx: NodeIndex, strategy: &Strategy, p: G::Player) -> f64 {
        let node = self.tree.node(idx);
        match &node.kind {
            NodeKind::Terminal => node.game.utility(p),
            NodeKind::Chance => {
                let probs = node.game.action_probs();
                self.tree
                    .children_in_order(idx)
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| probs[i] * self.eval_rec(child, strategy, p))
                    .sum()
            }
            NodeKind::Decision { infoset, .. } => {
                let row = strategy.row(*infoset).to_vec();
                self.tree
                    .children_in_order(idx)
                    .into_iter()
                    .enumerate()
                    .map(|(i, child)| row[i] * self.eval_rec(child, strategy, p))
                    .sum()
            }
        }
    }

    /// Two-player zero-sum Nash gap: `eval_for(BR(strategy, p1), p1) - eval_for(BR(strategy, p2), p1)`.
    pub fn nash_gap(&self, strategy: &Strategy) -> f64 {
        assert_eq!(G::NUM_PLAYERS, 2, "nash_gap is defined only for two-player zero-sum games");
        let players = G::players();
        let (p1, p2) = (players[0], players[1]);
        let br_p1 = self.best_response(strategy, p1);
        let br_p2 = self.best_response(strategy, p2);
        self.eval_for(&br_p1, p1) - self.eval_for(&br_p2, p1)
    }
}
