use std::fmt;

use crate::board::{Board, Move, Reward};

/// An immutable opcode: either "slide in a direction" or "place a tile".
///
/// A code that fits in its own low two bits is a slide (see [`Move`]);
/// anything else is a placement packing the tile exponent above bit 4 and the
/// board position in the low nibble.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action(u32);

/// Decoded form of an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Slide(Move),
    Place { tile: u32, pos: usize },
}

impl Action {
    /// Width of one opcode on the wire.
    pub const WIRE_SIZE: usize = 4;

    #[inline]
    pub fn slide(dir: Move) -> Self { Action(dir.code() as u32) }

    /// A placement of exponent `tile` at flat index `pos` (0..16).
    #[inline]
    pub fn place(tile: u32, pos: usize) -> Self {
        debug_assert!(pos < 16, "placement position {pos} out of range");
        Action((tile << 4) | (pos as u32 & 0xf))
    }

    #[inline]
    pub fn from_code(code: u32) -> Self { Action(code) }

    #[inline]
    pub fn code(self) -> u32 { self.0 }

    pub fn kind(self) -> ActionKind {
        if self.0 & 0b11 == self.0 {
            // The mask guarantees a valid code.
            ActionKind::Slide(Move::from_code(self.0).unwrap_or(Move::Up))
        } else {
            ActionKind::Place { tile: self.0 >> 4, pos: (self.0 & 0xf) as usize }
        }
    }

    /// Apply to `board`, returning the reward or `None` when illegal.
    ///
    /// A placement earns nothing; it is illegal on an occupied cell.
    pub fn apply(self, board: &mut Board) -> Option<Reward> {
        match self.kind() {
            ActionKind::Slide(dir) => board.make_move(dir),
            ActionKind::Place { tile, pos } => board.place(tile, pos).then_some(0),
        }
    }

    pub fn name(self) -> String { self.to_string() }
}

impl From<Move> for Action {
    fn from(dir: Move) -> Self { Action::slide(dir) }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ActionKind::Slide(dir) => write!(f, "slide {}", dir.name()),
            ActionKind::Place { tile, pos } => write!(f, "place {tile}-index at position {pos}"),
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({:#x}: {})", self.0, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminates_codes() {
        for dir in Move::ALL {
            assert_eq!(Action::slide(dir).kind(), ActionKind::Slide(dir));
        }
        assert_eq!(Action::place(1, 5).code(), 0x15);
        assert_eq!(Action::place(2, 15).kind(), ActionKind::Place { tile: 2, pos: 15 });
        assert_eq!(Action::from_code(4).kind(), ActionKind::Place { tile: 0, pos: 4 });
    }

    #[test]
    fn apply_slide_and_place() {
        let mut b = Board::EMPTY;
        assert_eq!(Action::place(1, 0).apply(&mut b), Some(0));
        assert_eq!(Action::place(1, 3).apply(&mut b), Some(0));
        assert_eq!(Action::place(2, 3).apply(&mut b), None);
        assert_eq!(b, Board::from_raw(0x1001_0000_0000_0000));
        assert_eq!(Action::slide(Move::Left).apply(&mut b), Some(4));
        assert_eq!(b, Board::from_raw(0x2000_0000_0000_0000));
        assert_eq!(Action::slide(Move::Left).apply(&mut b), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn place_rejects_position_past_board() {
        let _ = Action::place(1, 16);
    }

    #[test]
    fn names() {
        assert_eq!(Action::slide(Move::Left).name(), "slide left");
        assert_eq!(Action::slide(Move::Up).to_string(), "slide up");
        assert_eq!(Action::place(1, 5).name(), "place 1-index at position 5");
    }
}
