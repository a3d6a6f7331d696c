//! Exploitability evaluators: an exact full-tree walk and a treeplex compaction. Both are read-only
//! over a [`Strategy`](crate::mccfr::strategy::Strategy) snapshot and share the same
//! [`HistoryTree`].

mod full;
mod tree;
mod treeplex;

pub use full::Eval;
pub use tree::HistoryTree;
pub use treeplex::EvalFast;
