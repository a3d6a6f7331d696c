//! Rock-Paper-Scissors: two simultaneous-looking decisions modeled as sequential play with no
//! chance node, since P2 never observes P1's move before acting (`info_set_idx` is constant for
//! every P2 history).
//!
//! Payoffs are the classic symmetric win/tie/loss of +1/0/-1 under the cyclic relation "action
//! `(k+1) % 3` beats action `k`", which converges to the uniform 1/3 equilibrium (see DESIGN.md).

use crate::mccfr::game::Game;
use crate::mccfr::strategy::Strategy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
}

#[derive(Clone, Copy, Debug)]
pub struct Rps {
    p1_move: Option<u8>,
    p2_move: Option<u8>,
}

impl Game for Rps {
    type Player = Player;
    const ACTION_MAX: usize = 3;
    const NUM_INFO_SETS: usize = 2;
    const NUM_PLAYERS: usize = 2;

    fn root() -> Self {
        Self { p1_move: None, p2_move: None }
    }

    fn is_terminal(&self) -> bool {
        self.p1_move.is_some() && self.p2_move.is_some()
    }

    fn is_chance(&self) -> bool {
        false
    }

    fn current_player(&self) -> Player {
        if self.p1_move.is_none() { Player::P1 } else { Player::P2 }
    }

    fn info_set_idx(&self) -> usize {
        if self.p1_move.is_none() { 0 } else { 1 }
    }

    fn num_actions(&self) -> usize {
        3
    }

    fn actions(&self) -> Vec<usize> {
        vec![0, 1, 2]
    }

    fn action_probs(&self) -> Vec<f64> {
        unreachable!("rock-paper-scissors has no chance node")
    }

    fn step(&self, action: usize) -> Self {
        if self.p1_move.is_none() {
            Self { p1_move: Some(action as u8), p2_move: None }
        } else {
            Self { p1_move: self.p1_move, p2_move: Some(action as u8) }
        }
    }

    fn utility(&self, player: Player) -> f64 {
        let p1 = self.p1_move.expect("utility called before both moves are set") as i8;
        let p2 = self.p2_move.expect("utility called before both moves are set") as i8;
        if p1 == p2 {
            return 0.0;
        }
        let p2_wins = (p1 + 1) % 3 == p2;
        let p1_net = if p2_wins { -1.0 } else { 1.0 };
        if player == Player::P1 { p1_net } else { -p1_net }
    }

    fn players() -> &'static [Player] {
        &[Player::P1, Player::P2]
    }

    fn get_strategy(average_policy: &[Vec<f64>]) -> Strategy {
        let rows = average_policy
            .iter()
            .map(|row| {
                let sum: f64 = row.iter().sum();
                if sum <= 1e-9 {
                    vec![1.0 / 3.0; 3]
                } else {
                    row.iter().map(|&v| v / sum).collect()
                }
            })
            .collect();
        Strategy::from_rows(rows).expect("normalized rows always sum to 1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_payoff_has_no_ties_winner() {
        let s = Rps { p1_move: Some(0), p2_move: Some(1) };
        assert_eq!(s.utility(Player::P1), -1.0);
        assert_eq!(s.utility(Player::P2), 1.0);
    }

    #[test]
    fn a_tie_pays_nothing() {
        let s = Rps { p1_move: Some(2), p2_move: Some(2) };
        assert_eq!(s.utility(Player::P1), 0.0);
        assert_eq!(s.utility(Player::P2), 0.0);
    }

    #[test]
    fn p2_info_set_does_not_depend_on_p1s_move() {
        let a = Rps { p1_move: Some(0), p2_move: None };
        let b = Rps { p1_move: Some(2), p2_move: None };
        assert_eq!(a.info_set_idx(), b.info_set_idx());
    }
}
