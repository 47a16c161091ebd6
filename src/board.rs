use std::fmt;
use std::sync::OnceLock;

/// A direction to slide/merge tiles.
///
/// The discriminants are the move opcodes used by [`crate::action::Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Move {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Move {
    /// All directions in opcode order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    #[inline]
    pub fn code(self) -> u8 { self as u8 }

    /// Decode a 2-bit move code.
    pub fn from_code(code: u32) -> Option<Move> {
        match code {
            0 => Some(Move::Up),
            1 => Some(Move::Right),
            2 => Some(Move::Down),
            3 => Some(Move::Left),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Right => "right",
            Move::Down => "down",
            Move::Left => "left",
        }
    }
}

/// Points gained by a single move: the face value of every tile created by a merge.
pub type Reward = u32;

type BoardRaw = u64;
type Row = u16;

const ROW_TABLE_SIZE: usize = 0x1_0000; // 65,536 possible 16-bit rows

/// Largest exponent a nibble can hold. Two tiles at this exponent do not merge.
pub const MAX_EXPONENT: u8 = 15;

/// Packed 4x4 2048 board as 16 4-bit exponents in a `u64`.
///
/// Cell 0 (top-left) lives in the most significant nibble and cells run
/// row-major, so the derived ordering on the raw value is lexicographic over
/// the 16 cells.
///
/// ```text
///  (0)  (1)  (2)  (3)
///  (4)  (5)  (6)  (7)
///  (8)  (9) (10) (11)
/// (12) (13) (14) (15)
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    #[inline]
    pub fn from_raw(raw: BoardRaw) -> Self { Board(raw) }

    /// Borrow the raw packed `u64` for this `Board`.
    #[inline]
    pub fn raw(&self) -> BoardRaw { self.0 }

    /// Exponent stored at flat index `idx` (0..16, row-major).
    ///
    /// Panics if `idx` is out of range.
    #[inline]
    pub fn cell(&self, idx: usize) -> u8 {
        assert!(idx < 16, "cell index {idx} out of range");
        ((self.0 >> (60 - 4 * idx)) & 0xf) as u8
    }

    /// Overwrite the exponent at flat index `idx`.
    ///
    /// Panics if `idx` is out of range or `exponent` does not fit a nibble.
    #[inline]
    pub fn set_cell(&mut self, idx: usize, exponent: u8) {
        assert!(idx < 16, "cell index {idx} out of range");
        assert!(exponent <= MAX_EXPONENT, "exponent {exponent} does not fit a nibble");
        let shift = 60 - 4 * idx;
        self.0 = (self.0 & !(0xf << shift)) | ((exponent as BoardRaw) << shift);
    }

    /// Slide/merge in `dir`, returning the new board and the reward.
    ///
    /// Only [`Board::slide_left`] does real work; the other directions
    /// conjugate it with reflections and rotations.
    pub fn slide(self, dir: Move) -> (Board, Reward) {
        match dir {
            Move::Left => self.slide_left(),
            Move::Right => {
                let (moved, reward) = self.reflect_horizontal().slide_left();
                (moved.reflect_horizontal(), reward)
            }
            Move::Up => {
                let (moved, reward) = self.rotate_right().slide(Move::Right);
                (moved.rotate_left(), reward)
            }
            Move::Down => {
                let (moved, reward) = self.rotate_right().slide_left();
                (moved.rotate_left(), reward)
            }
        }
    }

    /// Return the board resulting from sliding/merging tiles in `dir`.
    #[inline]
    pub fn shift(self, dir: Move) -> Board { self.slide(dir).0 }

    /// Apply a slide in place.
    ///
    /// Returns the reward, or `None` if the slide leaves the board unchanged
    /// (the move is illegal). An illegal move never mutates the board.
    ///
    /// ```
    /// use env_2048::board::{Board, Move};
    /// let mut b = Board::from_raw(0x1122);
    /// assert_eq!(b.make_move(Move::Left), Some(12));
    /// assert_eq!(b, Board::from_raw(0x2300));
    /// assert_eq!(b.make_move(Move::Left), None);
    /// ```
    pub fn make_move(&mut self, dir: Move) -> Option<Reward> {
        let (moved, reward) = self.slide(dir);
        if moved == *self {
            return None;
        }
        *self = moved;
        Some(reward)
    }

    /// Put a tile with exponent `tile` at flat index `pos`.
    ///
    /// Fails (returning `false`, board untouched) if the cell is occupied or
    /// the position/exponent cannot be represented.
    pub fn place(&mut self, tile: u32, pos: usize) -> bool {
        if pos >= 16 || tile > MAX_EXPONENT as u32 || self.cell(pos) != 0 {
            return false;
        }
        self.set_cell(pos, tile as u8);
        true
    }

    /// Slide every row to the left using the cached row table.
    pub fn slide_left(self) -> (Board, Reward) {
        let table = rows();
        (0..4).fold((Board::EMPTY, 0), |(acc, reward), r| {
            let row = self.row(r) as usize;
            let shifted = (table.slid[row] as BoardRaw) << (48 - 16 * r);
            (Board(acc.0 | shifted), reward + table.reward[row])
        })
    }

    // Credit to Nneonneo
    pub fn transpose(self) -> Board {
        let x = self.0;
        let a1 = x & 0xF0F00F0FF0F00F0F;
        let a2 = x & 0x0000F0F00000F0F0;
        let a3 = x & 0x0F0F00000F0F0000;
        let a = a1 | (a2 << 12) | (a3 >> 12);
        let b1 = a & 0xFF00FF0000FF00FF;
        let b2 = a & 0x00FF00FF00000000;
        let b3 = a & 0x00000000FF00FF00;
        Board(b1 | (b2 >> 24) | (b3 << 24))
    }

    /// Mirror left-right (column c swaps with column 3 - c).
    pub fn reflect_horizontal(self) -> Board {
        let x = self.0;
        Board(
            ((x & 0xF000F000F000F000) >> 12)
                | ((x & 0x0F000F000F000F00) >> 4)
                | ((x & 0x00F000F000F000F0) << 4)
                | ((x & 0x000F000F000F000F) << 12),
        )
    }

    /// Mirror top-bottom (row r swaps with row 3 - r).
    pub fn reflect_vertical(self) -> Board {
        let x = self.0;
        Board(
            (x >> 48)
                | ((x >> 16) & 0x0000_0000_FFFF_0000)
                | ((x << 16) & 0x0000_FFFF_0000_0000)
                | (x << 48),
        )
    }

    /// Rotate clockwise.
    #[inline]
    pub fn rotate_right(self) -> Board { self.transpose().reflect_horizontal() }

    /// Rotate counterclockwise.
    #[inline]
    pub fn rotate_left(self) -> Board { self.transpose().reflect_vertical() }

    /// Rotate by 180 degrees.
    #[inline]
    pub fn reverse(self) -> Board { self.reflect_horizontal().reflect_vertical() }

    /// Rotate clockwise `r` times; negative values rotate counterclockwise.
    pub fn rotate(self, r: i32) -> Board {
        match r.rem_euclid(4) {
            1 => self.rotate_right(),
            2 => self.reverse(),
            3 => self.rotate_left(),
            _ => self,
        }
    }

    /// Highest exponent on the board (0 for an empty board).
    pub fn max_tile(&self) -> u8 {
        (0..16).map(|idx| self.cell(idx)).max().unwrap_or(0)
    }

    // https://stackoverflow.com/questions/38225571/count-number-of-zero-nibbles-in-an-unsigned-64-bit-integer
    /// Count the number of empty cells.
    pub fn count_empty(&self) -> u32 {
        let mut x = self.0;
        x |= x >> 1;
        x |= x >> 2;
        x &= 0x1111111111111111;
        16 - x.count_ones()
    }

    /// Flat indices of the empty cells, in ascending order.
    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..16).filter(move |&idx| self.cell(idx) == 0)
    }

    /// True if no slide in any direction changes the board.
    pub fn is_game_over(&self) -> bool {
        Move::ALL.iter().all(|&dir| self.shift(dir) == *self)
    }

    #[inline]
    fn row(&self, r: usize) -> Row { (self.0 >> (48 - 16 * r)) as Row }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#018x})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------------------------+")?;
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, "{:>6}", face_value(self.cell(r * 4 + c)))?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "+------------------------+")
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.raw() } }

/// Displayed value of a tile exponent; 0 stays 0 (empty cell).
#[inline]
pub fn face_value(exponent: u8) -> u32 {
    if exponent == 0 { 0 } else { 1 << exponent }
}

struct RowTable {
    slid: Box<[Row]>,
    reward: Box<[Reward]>,
}

static ROWS: OnceLock<RowTable> = OnceLock::new();

#[inline(always)]
fn rows() -> &'static RowTable { ROWS.get_or_init(create_row_table) }

fn create_row_table() -> RowTable {
    // Allocate on the heap to avoid large stack frames
    let mut slid = vec![0 as Row; ROW_TABLE_SIZE];
    let mut reward = vec![0 as Reward; ROW_TABLE_SIZE];
    for (val, (s, r)) in slid.iter_mut().zip(reward.iter_mut()).enumerate() {
        (*s, *r) = slide_row_left(val as Row);
    }
    RowTable {
        slid: slid.into_boxed_slice(),
        reward: reward.into_boxed_slice(),
    }
}

/// Slide one row to the left in a single pass.
///
/// `hold` carries the last unmatched tile and `top` is the write cursor; a
/// freshly merged tile is written immediately and never merges again in the
/// same pass.
fn slide_row_left(row: Row) -> (Row, Reward) {
    let mut out = [0u8; 4];
    let mut top = 0;
    let mut hold = 0u8;
    let mut reward: Reward = 0;
    for c in 0..4 {
        let tile = ((row >> (12 - 4 * c)) & 0xf) as u8;
        if tile == 0 {
            continue;
        }
        if hold == 0 {
            hold = tile;
        } else if hold == tile && tile < MAX_EXPONENT {
            let merged = tile + 1;
            out[top] = merged;
            top += 1;
            reward += 1 << merged;
            hold = 0;
        } else {
            out[top] = hold;
            top += 1;
            hold = tile;
        }
    }
    if hold != 0 {
        out[top] = hold;
    }
    let packed = out.iter().fold(0 as Row, |acc, &t| (acc << 4) | t as Row);
    (packed, reward)
}
