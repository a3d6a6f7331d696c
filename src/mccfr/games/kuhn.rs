//! Three-card Kuhn poker: the smallest standard imperfect-information poker game, used as the
//! treeplex-vs-full-tree agreement check and the `-1/18` equilibrium-value regression test.
//!
//! Card ranks are `0 = Jack < 1 = Queen < 2 = King`. The deal is a single six-outcome chance node
//! (one outcome per ordered pair of distinct cards dealt to P1/P2), mirroring the original C++
//! `loaded_game.hpp` descriptor style of enumerating the whole deal as one chance move rather than
//! two separate draws.

use crate::mccfr::game::Game;
use crate::mccfr::strategy::Strategy;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
}

const DEALS: [(u8, u8); 6] = [(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)];

#[derive(Clone, Copy, Debug)]
pub struct Kuhn {
    dealt: bool,
    card1: u8,
    card2: u8,
    history: [u8; 3],
    len: u8,
}

impl Kuhn {
    fn past(&self) -> &[u8] {
        &self.history[..self.len as usize]
    }
}

impl Game for Kuhn {
    type Player = Player;
    const ACTION_MAX: usize = 2;
    const NUM_INFO_SETS: usize = 12;
    const NUM_PLAYERS: usize = 2;

    fn root() -> Self {
        Self { dealt: false, card1: 0, card2: 0, history: [0; 3], len: 0 }
    }

    fn is_terminal(&self) -> bool {
        if !self.dealt {
            return false;
        }
        match self.past() {
            [0, 0] | [1, 0] | [1, 1] => true,
            [0, 1, _] => true,
            _ => false,
        }
    }

    fn is_chance(&self) -> bool {
        !self.dealt
    }

    fn current_player(&self) -> Player {
        match self.past() {
            [] => Player::P1,
            [_] => Player::P2,
            [0, 1] => Player::P1,
            other => unreachable!("current_player called on a terminal history {other:?}"),
        }
    }

    fn info_set_idx(&self) -> usize {
        match self.past() {
            [] => self.card1 as usize,
            [0] => 3 + self.card2 as usize,
            [1] => 6 + self.card2 as usize,
            [0, 1] => 9 + self.card1 as usize,
            other => unreachable!("info_set_idx called on a terminal history {other:?}"),
        }
    }

    fn num_actions(&self) -> usize {
        if !self.dealt { 6 } else { 2 }
    }

    fn actions(&self) -> Vec<usize> {
        if !self.dealt {
            (0..6).collect()
        } else {
            vec![0, 1]
        }
    }

    fn action_probs(&self) -> Vec<f64> {
        assert!(!self.dealt, "action_probs is only defined at the chance (deal) node");
        vec![1.0 / 6.0; 6]
    }

    fn step(&self, action: usize) -> Self {
        if !self.dealt {
            let (card1, card2) = DEALS[action];
            return Self { dealt: true, card1, card2, history: [0; 3], len: 0 };
        }
        let mut history = self.history;
        history[self.len as usize] = action as u8;
        Self { len: self.len + 1, history, ..*self }
    }

    fn utility(&self, player: Player) -> f64 {
        let p1_card_wins = self.card1 > self.card2;
        let p1_net = match self.past() {
            [0, 0] => if p1_card_wins { 1.0 } else { -1.0 },
            [1, 0] => 1.0,
            [1, 1] => if p1_card_wins { 2.0 } else { -2.0 },
            [0, 1, 0] => -1.0,
            [0, 1, 1] => if p1_card_wins { 2.0 } else { -2.0 },
            other => unreachable!("utility called on a non-terminal history {other:?}"),
        };
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
                    vec![0.5; 2]
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
    fn a_full_deal_enumerates_six_equally_likely_outcomes() {
        let root = Kuhn::root();
        assert!(root.is_chance());
        assert_eq!(root.action_probs().len(), 6);
        assert!((root.action_probs().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bet_fold_pays_the_ante_only() {
        let s = Kuhn { dealt: true, card1: 0, card2: 2, history: [1, 0, 0], len: 2 };
        assert_eq!(s.utility(Player::P1), 1.0);
        assert_eq!(s.utility(Player::P2), -1.0);
    }

    #[test]
    fn check_bet_call_showdown_pays_double() {
        let s = Kuhn { dealt: true, card1: 2, card2: 0, history: [0, 1, 1], len: 3 };
        assert_eq!(s.utility(Player::P1), 2.0);
    }

    #[test]
    fn p1s_second_infoset_does_not_depend_on_p2s_card() {
        let a = Kuhn { dealt: true, card1: 1, card2: 0, history: [0, 1, 0], len: 2 };
        let b = Kuhn { dealt: true, card1: 1, card2: 2, history: [0, 1, 0], len: 2 };
        assert_eq!(a.info_set_idx(), b.info_set_idx());
    }
}
