use std::time::{SystemTime, UNIX_EPOCH};

use crate::action::Action;
use crate::board::Board;
use crate::error::Error;

/// Which party acts next within an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The move-selecting agent (slides).
    Mover,
    /// The tile-placement agent (spawns).
    Placer,
}

impl Turn {
    /// Whose turn it is after `recorded` actions.
    ///
    /// With `n = max(recorded + 1, 2)` the mover acts on odd `n`. The game
    /// therefore opens with two placements and alternates from there.
    pub fn after(recorded: usize) -> Turn {
        if recorded.saturating_add(1).max(2) % 2 == 1 { Turn::Mover } else { Turn::Placer }
    }
}

/// Outcome recovered by replaying an episode from an empty board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub board: Board,
    pub score: u64,
    pub actions: usize,
}

/// Append-only record of one game: its actions plus start/end timestamps in ms.
///
/// No board or score is cached; [`Episode::replay`] is the only way to
/// recover the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    actions: Vec<Action>,
    start_ms: u64,
    end_ms: Option<u64>,
}

impl Episode {
    /// Open a new episode stamped with the current wall clock.
    pub fn open() -> Self { Self::open_at(now_millis()) }

    pub fn open_at(start_ms: u64) -> Self {
        Episode { actions: Vec::with_capacity(1024), start_ms, end_ms: None }
    }

    /// Rebuild a closed episode (used when loading persisted history).
    pub fn from_parts(actions: Vec<Action>, start_ms: u64, end_ms: u64) -> Self {
        Episode { actions, start_ms, end_ms: Some(end_ms) }
    }

    pub fn push(&mut self, action: Action) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::EpisodeClosed);
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), Error> { self.close_at(now_millis()) }

    pub fn close_at(&mut self, end_ms: u64) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::EpisodeClosed);
        }
        self.end_ms = Some(end_ms);
        Ok(())
    }

    #[inline]
    pub fn is_closed(&self) -> bool { self.end_ms.is_some() }

    #[inline]
    pub fn actions(&self) -> &[Action] { &self.actions }

    #[inline]
    pub fn len(&self) -> usize { self.actions.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.actions.is_empty() }

    #[inline]
    pub fn start_ms(&self) -> u64 { self.start_ms }

    #[inline]
    pub fn end_ms(&self) -> Option<u64> { self.end_ms }

    /// Wall time between open and close; 0 while still open.
    pub fn elapsed_ms(&self) -> u64 {
        self.end_ms.map_or(0, |end| end.saturating_sub(self.start_ms))
    }

    #[inline]
    pub fn turn(&self) -> Turn { Turn::after(self.actions.len()) }

    /// Re-apply every action to an empty board, summing legal rewards.
    pub fn replay(&self) -> Replay {
        let mut board = Board::EMPTY;
        let score: u64 = self
            .actions
            .iter()
            .filter_map(|action| action.apply(&mut board))
            .map(u64::from)
            .sum();
        Replay { board, score, actions: self.actions.len() }
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;

    #[test]
    fn turn_alternation() {
        let turns: Vec<Turn> = (0..7).map(Turn::after).collect();
        use Turn::*;
        assert_eq!(turns, vec![Placer, Placer, Mover, Placer, Mover, Placer, Mover]);
    }

    #[test]
    fn append_only_while_open() {
        let mut ep = Episode::open_at(100);
        assert_eq!(ep.turn(), Turn::Placer);
        ep.push(Action::place(1, 0)).unwrap();
        ep.close_at(150).unwrap();
        assert_eq!(ep.push(Action::place(1, 1)), Err(Error::EpisodeClosed));
        assert_eq!(ep.close_at(160), Err(Error::EpisodeClosed));
        assert_eq!(ep.len(), 1);
        assert_eq!(ep.elapsed_ms(), 50);
        assert_eq!(ep.end_ms(), Some(150));
    }

    #[test]
    fn replay_recomputes_outcome() {
        let mut ep = Episode::open_at(0);
        for action in [
            Action::place(1, 0),
            Action::place(1, 3),
            Action::slide(Move::Left),
            Action::place(2, 7),
            Action::slide(Move::Left),
            Action::place(2, 8),
            Action::slide(Move::Up),
        ] {
            ep.push(action).unwrap();
        }
        ep.close_at(10).unwrap();
        let replay = ep.replay();
        // column 0 holds 4, 4, 4 before the final slide up
        assert_eq!(replay.board, Board::from_raw(0x3000_2000_0000_0000));
        assert_eq!(replay.score, 4 + 8);
        assert_eq!(replay.actions, 7);
        assert_eq!(ep.replay(), replay);
    }

    #[test]
    fn replay_skips_illegal_rewards() {
        let ep = Episode::from_parts(
            vec![Action::place(1, 0), Action::slide(Move::Left), Action::place(1, 0)],
            0,
            1,
        );
        let replay = ep.replay();
        assert_eq!(replay.score, 0);
        assert_eq!(replay.board, Board::from_raw(0x1000_0000_0000_0000));
    }
}
