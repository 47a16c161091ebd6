//! Agents that pick the next action for a board.
//!
//! Two roles take turns within an episode: a [`Player`] that slides and a
//! [`RandomSpawner`] that places new tiles.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::action::Action;
use crate::board::{Board, Move, Reward};

pub trait Agent {
    /// Choose an action for `board`, or `None` when there is nothing to do.
    fn take_action(&mut self, board: &Board) -> Option<Action>;

    /// Whether `board` counts as a win for this agent, ending the episode.
    fn check_for_win(&self, _board: &Board) -> bool { false }

    fn name(&self) -> &str;
}

/// Greedy player: the slide with the highest immediate reward.
#[derive(Debug, Clone, Default)]
pub struct Player {
    win_tile: Option<u8>,
}

impl Player {
    pub fn new() -> Self { Self::default() }

    /// Stop the episode once a tile of exponent `win_tile` appears.
    pub fn with_win_tile(win_tile: Option<u8>) -> Self { Player { win_tile } }
}

impl Agent for Player {
    fn take_action(&mut self, board: &Board) -> Option<Action> {
        let mut best: Option<(Move, Reward)> = None;
        for dir in Move::ALL {
            let mut after = *board;
            if let Some(reward) = after.make_move(dir) {
                // First direction wins ties.
                if best.map_or(true, |(_, r)| reward > r) {
                    best = Some((dir, reward));
                }
            }
        }
        best.map(|(dir, _)| Action::slide(dir))
    }

    fn check_for_win(&self, board: &Board) -> bool {
        self.win_tile.is_some_and(|tile| board.max_tile() >= tile)
    }

    fn name(&self) -> &str { "player" }
}

/// Places a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
#[derive(Debug, Clone)]
pub struct RandomSpawner {
    rng: StdRng,
}

impl RandomSpawner {
    pub fn new(seed: u64) -> Self { RandomSpawner { rng: StdRng::seed_from_u64(seed) } }
}

impl Agent for RandomSpawner {
    fn take_action(&mut self, board: &Board) -> Option<Action> {
        let empty: Vec<usize> = board.empty_cells().collect();
        if empty.is_empty() {
            return None;
        }
        let tile = if self.rng.gen_range(0..10) < 9 { 1 } else { 2 };
        let pos = empty[self.rng.gen_range(0..empty.len())];
        Some(Action::place(tile, pos))
    }

    fn name(&self) -> &str { "random" }
}
