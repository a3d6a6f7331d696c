//! The full history tree: built once per root state, reused across best-response calls.
//!
//! A petgraph `DiGraph` built by sequential node/edge construction, with an owned index-based map
//! from each infoset to every history belonging to it, rather than owned/shared node references.

use crate::mccfr::game::Game;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

pub(crate) enum NodeKind<P> {
    Terminal,
    Chance,
    Decision { infoset: usize, mover: P },
}

pub(crate) struct NodeRecord<G: Game> {
    pub(crate) game: G,
    pub(crate) kind: NodeKind<G::Player>,
}

/// The full, immutable history tree for one game, plus an index from infoset id to every
/// decision-node history that belongs to it.
pub struct HistoryTree<G: Game> {
    pub(crate) graph: DiGraph<NodeRecord<G>, usize>,
    pub(crate) root: NodeIndex,
    pub(crate) infosets: HashMap<usize, Vec<NodeIndex>>,
}

impl<G: Game> HistoryTree<G> {
    /// Depth-first builds the entire tree from `Game::root()`.
    pub fn build() -> Self {
        let mut graph = DiGraph::new();
        let mut infosets: HashMap<usize, Vec<NodeIndex>> = HashMap::new();
        let root = Self::grow(&mut graph, &mut infosets, G::root());
        Self { graph, root, infosets }
    }

    fn grow(
        graph: &mut DiGraph<NodeRecord<G>, usize>,
        infosets: &mut HashMap<usize, Vec<NodeIndex>>,
        game: G,
    ) -> NodeIndex {
        if game.is_terminal() {
            return graph.add_node(NodeRecord { game, kind: NodeKind::Terminal });
        }
        if game.is_chance() {
            let idx = graph.add_node(NodeRecord { game, kind: NodeKind::Chance });
            for (i, &action) in game.actions().iter().enumerate() {
                let child = Self::grow(graph, infosets, game.step(action));
                graph.add_edge(idx, child, i);
            }
            return idx;
        }
        let infoset = game.info_set_idx();
        let mover = game.current_player();
        let idx = graph.add_node(NodeRecord { game, kind: NodeKind::Decision { infoset, mover } });
        infosets.entry(infoset).or_default().push(idx);
        for (i, &action) in game.actions().iter().enumerate() {
            let child = Self::grow(graph, infosets, game.step(action));
            graph.add_edge(idx, child, i);
        }
        idx
    }

    /// Children of `idx`, ordered by action position (petgraph does not guarantee
    /// insertion order on `.neighbors()`, so this sorts explicitly by edge weight).
    pub(crate) fn children_in_order(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut kids: Vec<(usize, NodeIndex)> = self
            .graph
            .edges(idx)
            .map(|e| (*e.weight(), e.target()))
            .collect();
        kids.sort_by_key(|&(i, _)| i);
        kids.into_iter().map(|(_, n)| n).collect()
    }

    pub(crate) fn node(&self, idx: NodeIndex) -> &NodeRecord<G> {
        &self.graph[idx]
    }

    /// The player who controls `infoset`, read off any one history belonging to it (every
    /// history sharing an infoset shares its mover, by definition of an infoset).
    pub(crate) fn owner_of(&self, infoset: usize) -> G::Player {
        let histories = self.infosets.get(&infoset).expect("infoset has no histories");
        match &self.node(histories[0]).kind {
            NodeKind::Decision { mover, .. } => *mover,
            _ => unreachable!("infosets map only ever indexes Decision nodes"),
        }
    }
}
