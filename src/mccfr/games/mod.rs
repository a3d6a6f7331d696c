//! The two shipped games: Rock-Paper-Scissors (a one-shot simultaneous game with no chance node)
//! and Kuhn poker (a three-card imperfect-information poker game with a six-outcome deal).

pub mod kuhn;
pub mod rps;
