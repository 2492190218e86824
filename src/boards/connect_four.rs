use crate::board::{Board, GameOutcome, Score, Side};
use crate::error::GameError;
use std::fmt;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

const CENTER_COL: usize = COLS / 2;
const CENTER_WEIGHT: Score = 3;

/// Columns in the order moves are generated. Searching the centre first lets
/// alpha-beta cut more branches.
const COLUMN_ORDER: [u8; COLS] = [3, 2, 4, 1, 5, 0, 6];

/// (row step, column step) of the four line directions.
static DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Connect Four on the standard 6×7 grid with gravity drop.
///
/// Row 0 is the bottom row. A move is a column index. `Red` (`Side::First`) starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectFourBoard {
    grid: [[Option<Side>; COLS]; ROWS],
    current_player: Side,
}

impl Default for ConnectFourBoard {
    fn default() -> Self {
        Self {
            grid: [[None; COLS]; ROWS],
            current_player: Side::First,
        }
    }
}

impl ConnectFourBoard {
    /// Builds a position from six rows given top to bottom, using `R`/`X` for the
    /// first player, `Y`/`O` for the second and `.` for empty cells.
    pub fn from_rows(rows: [&str; ROWS]) -> Result<Self, GameError> {
        let mut grid = [[None; COLS]; ROWS];
        for (i, line) in rows.iter().enumerate() {
            let row = ROWS - 1 - i;
            if line.chars().count() != COLS {
                return Err(GameError::Layout(format!("row {i} must have {COLS} cells")));
            }
            for (col, ch) in line.chars().enumerate() {
                grid[row][col] = match ch {
                    'R' | 'X' => Some(Side::First),
                    'Y' | 'O' => Some(Side::Second),
                    '.' => None,
                    other => {
                        return Err(GameError::Layout(format!("unexpected cell {other:?}")));
                    }
                };
            }
        }

        for col in 0..COLS {
            for row in 1..ROWS {
                if grid[row][col].is_some() && grid[row - 1][col].is_none() {
                    return Err(GameError::Layout(format!("floating piece in column {col}")));
                }
            }
        }

        let count = |side| grid.iter().flatten().filter(|c| **c == Some(side)).count();
        let (reds, yellows) = (count(Side::First), count(Side::Second));
        let current_player = match reds.checked_sub(yellows) {
            Some(0) => Side::First,
            Some(1) => Side::Second,
            _ => return Err(GameError::Layout(format!("{reds} red against {yellows} yellow"))),
        };

        Ok(Self {
            grid,
            current_player,
        })
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Side> {
        self.grid[row][col]
    }

    fn height(&self, col: usize) -> usize {
        (0..ROWS)
            .find(|&row| self.grid[row][col].is_none())
            .unwrap_or(ROWS)
    }

    fn cell_at(&self, row: isize, col: isize) -> Option<Option<Side>> {
        if row < 0 || col < 0 || row >= ROWS as isize || col >= COLS as isize {
            return None;
        }
        Some(self.grid[row as usize][col as usize])
    }

    /// Every 4-cell window on the board, horizontal, vertical and both diagonals.
    fn windows(&self) -> impl Iterator<Item = [Option<Side>; 4]> + '_ {
        (0..ROWS as isize).flat_map(move |row| {
            (0..COLS as isize).flat_map(move |col| {
                DIRECTIONS.iter().filter_map(move |&(dr, dc)| {
                    let mut window = [None; 4];
                    for (k, slot) in window.iter_mut().enumerate() {
                        let k = k as isize;
                        *slot = self.cell_at(row + dr * k, col + dc * k)?;
                    }
                    Some(window)
                })
            })
        })
    }

    fn winner(&self) -> Option<Side> {
        self.windows().find_map(|window| {
            let first = window[0]?;
            window.iter().all(|c| *c == Some(first)).then_some(first)
        })
    }

    fn score_window(window: &[Option<Side>; 4], side: Side) -> Score {
        let own = window.iter().filter(|c| **c == Some(side)).count();
        let opp = window
            .iter()
            .filter(|c| **c == Some(side.opposite()))
            .count();
        let empty = 4 - own - opp;

        match (own, opp, empty) {
            (4, _, _) => 100,
            (3, _, 1) => 5,
            (2, _, 2) => 2,
            (_, 3, 1) => -20,
            _ => 0,
        }
    }

    /// One-sided score: window patterns plus centre-column occupancy.
    fn raw_score(&self, side: Side) -> Score {
        let center = (0..ROWS)
            .filter(|&row| self.grid[row][CENTER_COL] == Some(side))
            .count() as Score;
        let windows: Score = self.windows().map(|w| Self::score_window(&w, side)).sum();
        center * CENTER_WEIGHT + windows
    }
}

impl Board for ConnectFourBoard {
    type Move = u8;
    type Undo = ();

    fn side_to_move(&self) -> Side {
        self.current_player
    }

    fn outcome(&self) -> GameOutcome {
        if let Some(side) = self.winner() {
            return GameOutcome::Win(side);
        }

        if (0..COLS).all(|col| self.height(col) == ROWS) {
            GameOutcome::Draw
        } else {
            GameOutcome::InProgress
        }
    }

    fn legal_moves(&self) -> Vec<Self::Move> {
        if self.outcome() != GameOutcome::InProgress {
            return Vec::new();
        }

        COLUMN_ORDER
            .iter()
            .copied()
            .filter(|&col| self.height(col as usize) < ROWS)
            .collect()
    }

    fn apply(&mut self, mv: &Self::Move) {
        let col = *mv as usize;
        let row = self.height(col);
        if row == ROWS {
            panic!("BUG: dropping into full column {col}");
        }
        self.grid[row][col] = Some(self.current_player);
        self.current_player = self.current_player.opposite();
    }

    fn undo(&mut self, mv: &Self::Move, _undo: ()) {
        let col = *mv as usize;
        let row = self.height(col);
        if row == 0 {
            panic!("BUG: undoing a drop into empty column {col}");
        }
        self.grid[row - 1][col] = None;
        self.current_player = self.current_player.opposite();
    }

    fn evaluate(&self, side: Side) -> Option<Score> {
        Some(self.raw_score(side) - self.raw_score(side.opposite()))
    }

    fn hash(&self) -> u128 {
        self.grid.iter().flatten().fold(0u128, |hash, cell| {
            let cell_value = match cell {
                None => 0,
                Some(Side::First) => 1,
                Some(Side::Second) => 2,
            };
            hash * 3 + cell_value
        })
    }

    fn complexity(&self) -> u32 {
        let empty = self.grid.iter().flatten().filter(|c| c.is_none()).count() as u32;
        let threats = self
            .windows()
            .filter(|w| {
                let empty = w.iter().filter(|c| c.is_none()).count();
                let reds = w.iter().filter(|c| **c == Some(Side::First)).count();
                empty == 1 && (reds == 3 || reds == 0)
            })
            .count() as u32;
        empty + threats
    }

    fn move_number(&self) -> u32 {
        self.grid.iter().flatten().filter(|c| c.is_some()).count() as u32
    }
}

impl fmt::Display for ConnectFourBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid.iter().rev() {
            for cell in row {
                let ch = match cell {
                    None => '.',
                    Some(Side::First) => 'R',
                    Some(Side::Second) => 'Y',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: [&str; ROWS]) -> ConnectFourBoard {
        ConnectFourBoard::from_rows(rows).unwrap()
    }

    #[test]
    fn horizontal_four_is_a_win() {
        let b = board([
            ".......",
            ".......",
            ".......",
            ".......",
            "YYY....",
            "RRRR...",
        ]);
        assert_eq!(b.outcome(), GameOutcome::Win(Side::First));
        assert!(b.legal_moves().is_empty());
    }

    #[test]
    fn vertical_four_is_a_win() {
        let b = board([
            ".......",
            ".......",
            "......Y",
            "R.....Y",
            "R.....Y",
            "RR....Y",
        ]);
        assert_eq!(b.outcome(), GameOutcome::Win(Side::Second));
    }

    #[test]
    fn both_diagonals_are_wins() {
        let rising = board([
            ".......",
            ".......",
            "...R...",
            "..RY...",
            ".RYY...",
            "RYYR.R.",
        ]);
        let falling = board([
            ".......",
            ".......",
            "Y......",
            "RY.....",
            "RRY....",
            "RRYY..R",
        ]);
        assert_eq!(rising.outcome(), GameOutcome::Win(Side::First));
        assert_eq!(falling.outcome(), GameOutcome::Win(Side::Second));
    }

    #[test]
    fn full_board_without_four_is_draw() {
        let b = board([
            "YYRRYYR",
            "YYRRYYR",
            "RRYYRRY",
            "YYRRYYR",
            "RRYYRRY",
            "RRYYRRY",
        ]);
        assert_eq!(b.outcome(), GameOutcome::Draw);
        assert!(b.legal_moves().is_empty());
    }

    #[test]
    fn moves_are_generated_centre_first_and_skip_full_columns() {
        let b = board([
            "...Y...",
            "...R...",
            "...Y...",
            "...R...",
            "...Y...",
            "...R...",
        ]);
        assert_eq!(b.legal_moves(), vec![2, 4, 1, 5, 0, 6]);
    }

    #[test]
    fn pieces_stack_and_undo_pops() {
        // arrange
        let mut b = ConnectFourBoard::default();
        let empty = b.clone();

        // act
        b.apply(&3);
        b.apply(&3);

        // assert
        assert_eq!(b.cell(0, 3), Some(Side::First));
        assert_eq!(b.cell(1, 3), Some(Side::Second));
        b.undo(&3, ());
        b.undo(&3, ());
        assert_eq!(b, empty);
    }

    #[test]
    fn evaluation_is_zero_sum_and_rewards_centre() {
        let b = board([
            ".......",
            ".......",
            ".......",
            ".......",
            ".......",
            "...R..Y",
        ]);
        let red = b.evaluate(Side::First).unwrap();
        assert_eq!(red, -b.evaluate(Side::Second).unwrap());
        assert!(red > 0);
    }

    #[test]
    fn open_three_is_penalised_for_the_defender() {
        let b = board([
            ".......",
            ".......",
            ".......",
            ".......",
            "Y......",
            "RRR.Y..",
        ]);
        assert!(b.evaluate(Side::Second).unwrap() < 0);
    }

    #[test]
    fn rejects_floating_pieces() {
        let result = ConnectFourBoard::from_rows([
            ".......",
            ".......",
            ".......",
            ".......",
            "R......",
            ".Y.....",
        ]);
        assert!(matches!(result, Err(GameError::Layout(_))));
    }
}
