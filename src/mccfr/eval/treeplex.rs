//! The treeplex evaluator: per-player decision-tree compaction, best response computed in
//! player-subjective space.
//!
//! Scratch structures are built once per call and reset rather than shared across calls, with no
//! shared ownership between them.
//!
//! Construction walks the already-built [`HistoryTree`] once (instead of re-walking raw `Game`
//! states), accumulating every OBSERVATION's collapsed terminal value and every DECISION's
//! reachable-infoset successors into two maps keyed by "anchor" (the point right after a player
//! action, or the tree root) and by infoset id, respectively. Two infosets reached via genuinely
//! different histories naturally merge into one DECISION node because they share a map key; this
//! is required for correctness whenever the player's own infoset does not pin down which hidden
//! chance/opponent history led there (true of both shipped games: RPS's second mover, and every
//! Kuhn infoset once the other player's private card is marginalized out).

use super::tree::{HistoryTree, NodeKind};
use crate::mccfr::game::Game;
use crate::mccfr::strategy::Strategy;
use petgraph::graph::NodeIndex as HistNodeIndex;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum Anchor {
    Root,
    Action(usize, usize),
}

#[derive(Default)]
struct ObsAccum {
    collapsed_value: f64,
    children: HashMap<usize, f64>,
}

struct DecisionAccum {
    actions: Vec<usize>,
}

enum TreeplexNode {
    Observation { collapsed_value: f64, children: Vec<(f64, usize)> },
    Decision { infoset: usize, actions: Vec<usize>, children: Vec<usize> },
}

/// A player-subjective tree built once for a given (history tree, strategy, player) triple.
pub struct Treeplex {
    nodes: Vec<TreeplexNode>,
    root: usize,
}

impl Treeplex {
    pub fn build<G: Game>(tree: &HistoryTree<G>, strategy: &Strategy, player: G::Player) -> Self {
        let mut observations: HashMap<Anchor, ObsAccum> = HashMap::new();
        let mut decisions: HashMap<usize, DecisionAccum> = HashMap::new();
        Self::walk(
            tree,
            tree.root,
            1.0,
            Anchor::Root,
            player,
            strategy,
            &mut observations,
            &mut decisions,
        );

        let mut obs_idx: HashMap<Anchor, usize> = HashMap::new();
        let mut dec_idx: HashMap<usize, usize> = HashMap::new();
        let mut nodes: Vec<TreeplexNode> = Vec::new();
        for &anchor in observations.keys() {
            obs_idx.insert(anchor, nodes.len());
            nodes.push(TreeplexNode::Observation { collapsed_value: 0.0, children: Vec::new() });
        }
        for &infoset in decisions.keys() {
            dec_idx.insert(infoset, nodes.len());
            nodes.push(TreeplexNode::Decision { infoset, actions: Vec::new(), children: Vec::new() });
        }

        for (anchor, accum) in &observations {
            let idx = obs_idx[anchor];
            let children = accum.children.iter().map(|(&infoset, &w)| (w, dec_idx[&infoset])).collect();
            nodes[idx] = TreeplexNode::Observation { collapsed_value: accum.collapsed_value, children };
        }
        for (&infoset, accum) in &decisions {
            let idx = dec_idx[&infoset];
            let children =
                (0..accum.actions.len()).map(|i| obs_idx[&Anchor::Action(infoset, i)]).collect();
            nodes[idx] = TreeplexNode::Decision { infoset, actions: accum.actions.clone(), children };
        }

        let root = obs_idx[&Anchor::Root];
        Self { nodes, root }
    }

    #[allow(clippy::too_many_arguments)]
    fn walk<G: Game>(
        tree: &HistoryTree<G>,
        idx: HistNodeIndex,
        reach: f64,
        anchor: Anchor,
        player: G::Player,
        strategy: &Strategy,
        observations: &mut HashMap<Anchor, ObsAccum>,
        decisions: &mut HashMap<usize, DecisionAccum>,
    ) {
        let node = tree.node(idx);
        match &node.kind {
            NodeKind::Terminal => {
                observations.entry(anchor).or_default().collapsed_value +=
                    node.game.utility(player) * reach;
            }
            NodeKind::Chance => {
                let probs = node.game.action_probs();
                for (i, child) in tree.children_in_order(idx).into_iter().enumerate() {
                    Self::walk(
                        tree,
                        child,
                        reach * probs[i],
                        anchor,
                        player,
                        strategy,
                        observations,
                        decisions,
                    );
                }
            }
            NodeKind::Decision { infoset, mover } if *mover != player => {
                let row = strategy.row(*infoset).to_vec();
                for (i, child) in tree.children_in_order(idx).into_iter().enumerate() {
                    Self::walk(
                        tree,
                        child,
                        reach * row[i],
                        anchor,
                        player,
                        strategy,
                        observations,
                        decisions,
                    );
                }
            }
            NodeKind::Decision { infoset, .. } => {
                let infoset = *infoset;
                let actions = node.game.actions();
                decisions.entry(infoset).or_insert_with(|| DecisionAccum { actions: actions.clone() });
                *observations.entry(anchor).or_default().children.entry(infoset).or_insert(0.0) +=
                    reach;
                for (i, child) in tree.children_in_order(idx).into_iter().enumerate() {
                    Self::walk(
                        tree,
                        child,
                        reach,
                        Anchor::Action(infoset, i),
                        player,
                        strategy,
                        observations,
                        decisions,
                    );
                }
            }
        }
    }

    /// `best_response_rec`: returns the root's best-response value and, for every infoset this
    /// player controls, the one-hot row replacing it.
    pub fn best_response(&self, row_width_template: &[Vec<f64>]) -> (f64, HashMap<usize, Vec<f64>>) {
        let mut values = vec![0.0; self.nodes.len()];
        let mut overrides = HashMap::new();
        let root_value = self.rec(self.root, &mut values, &mut overrides, row_width_template);
        (root_value, overrides)
    }

    fn rec(
        &self,
        idx: usize,
        values: &mut [f64],
        overrides: &mut HashMap<usize, Vec<f64>>,
        template: &[Vec<f64>],
    ) -> f64 {
        match &self.nodes[idx] {
            TreeplexNode::Observation { collapsed_value, children } => {
                let mut v = *collapsed_value;
                for &(weight, child) in children {
                    v += weight * self.rec(child, values, overrides, template);
                }
                values[idx] = v;
                v
            }
            TreeplexNode::Decision { infoset, actions, children } => {
                let mut best_i = 0;
                let mut best_v = f64::NEG_INFINITY;
                for (i, &child) in children.iter().enumerate() {
                    let v = self.rec(child, values, overrides, template);
                    if v > best_v {
                        best_v = v;
                        best_i = i;
                    }
                }
                let mut row = vec![0.0; template[*infoset].len()];
                row[actions[best_i]] = 1.0;
                overrides.insert(*infoset, row);
                values[idx] = best_v;
                best_v
            }
        }
    }
}

/// Computes best response and Nash gap by building a fresh [`Treeplex`] per call (reset-then-
/// rebuild, since the compaction depends on the opponent's current strategy).
pub struct EvalFast<'a, G: Game> {
    tree: &'a HistoryTree<G>,
}

impl<'a, G: Game> EvalFast<'a, G> {
    pub fn new(tree: &'a HistoryTree<G>) -> Self {
        Self { tree }
    }

    fn template(strategy: &Strategy) -> Vec<Vec<f64>> {
        (0..strategy.num_info_sets()).map(|i| strategy.row(i).to_vec()).collect()
    }

    pub fn best_response(&self, strategy: &Strategy, player: G::Player) -> Strategy {
        let template = Self::template(strategy);
        let treeplex = Treeplex::build(self.tree, strategy, player);
        let (_, overrides) = treeplex.best_response(&template);
        let mut rows = template;
        for (infoset, row) in overrides {
            rows[infoset] = row;
        }
        Strategy::from_rows(rows).expect("treeplex best-response rows are one-hot or copied")
    }

    pub fn root_value(&self, strategy: &Strategy, player: G::Player) -> f64 {
        let template = Self::template(strategy);
        let treeplex = Treeplex::build(self.tree, strategy, player);
        treeplex.best_response(&template).0
    }

    /// Two-player Nash gap: `root_value(p1) + root_value(p2)` (zero-sum cancellation).
    pub fn nash_gap(&self, strategy: &Strategy) -> f64 {
        assert_eq!(G::NUM_PLAYERS, 2, "nash_gap is defined only for two-player zero-sum games");
        let players = G::players();
        self.root_value(strategy, players[0]) + self.root_value(strategy, players[1])
    }
}
