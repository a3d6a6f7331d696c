//! Monte-Carlo Counterfactual Regret Minimization: a polymorphic equilibrium-computation engine
//! over any two-player zero-sum extensive-form game exposing the [`game::Game`] interface.

pub mod driver;
pub mod eval;
pub mod game;
pub mod games;
pub mod metrics;
pub mod persist;
pub mod regret;
pub mod sampler;
pub mod strategy;

#[cfg(test)]
mod tests;
