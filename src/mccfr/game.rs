//! The contract the engine consumes from a game definition.
//!
//! A single trait carries everything a state needs to expose: state + legal actions + utility is
//! narrow enough that splitting it across several traits would buy no extra composability.

/// A value-copyable node in an extensive-form game tree.
///
/// Implementors must uphold the action-order invariant: for a fixed `info_set_idx()`, the order
/// of actions returned by `actions()` must be identical across every history sharing that index.
/// The engine relies on this to sum action-indexed utilities across coincident histories during
/// full-tree best response (see `eval::full::Eval`).
pub trait Game: Copy + Clone + Send + Sync {
    /// Player identity. Small, `Copy`, usually an enum or an integer newtype.
    type Player: Copy + Clone + Eq + std::hash::Hash + Send + Sync + std::fmt::Debug;

    /// Upper bound on the number of legal actions at any decision node.
    const ACTION_MAX: usize;
    /// Number of distinct information sets across the whole game.
    const NUM_INFO_SETS: usize;
    /// Number of players (training tolerates N; Nash-gap is defined only for 2).
    const NUM_PLAYERS: usize;

    /// The root state of a fresh episode.
    fn root() -> Self;

    fn is_terminal(&self) -> bool;
    fn is_chance(&self) -> bool;

    /// Valid only when `!is_terminal() && !is_chance()`.
    fn current_player(&self) -> Self::Player;

    /// Valid only when `!is_terminal() && !is_chance()`. `0 <= idx < NUM_INFO_SETS`.
    fn info_set_idx(&self) -> usize;

    /// Number of legal actions at this state (`<= ACTION_MAX`).
    fn num_actions(&self) -> usize;

    /// The legal action indices, in invariant order, for the first `num_actions()` entries.
    fn actions(&self) -> Vec<usize>;

    /// Valid only when `is_chance()`. One probability per entry of `actions()`, same order.
    fn action_probs(&self) -> Vec<f64>;

    /// Mutates to the child reached by `action`, an entry of `actions()` (not a raw index).
    fn step(&self, action: usize) -> Self;

    /// Valid only when `is_terminal()`.
    fn utility(&self, player: Self::Player) -> f64;

    /// The fixed roster of players in this game, used by evaluators and Monte-Carlo playout.
    fn players() -> &'static [Self::Player];

    /// Normalizes raw average-policy rows (possibly all-zero/"uninitialized") into a dense
    /// strategy table, replacing zero rows with uniform-over-legal using the per-infoset legal
    /// mask this game knows how to derive (e.g. from a descriptor or from re-walking the tree).
    fn get_strategy(average_policy: &[Vec<f64>]) -> crate::mccfr::strategy::Strategy;
}
