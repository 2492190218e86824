use crate::board::{Board, GameOutcome, Score, Side};
use crate::error::GameError;
use std::fmt;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// An implementation of the `Board` trait for the game of Tic-Tac-Toe.
///
/// The board is represented by a 9-element array, where each element corresponds to a cell.
/// A move is represented by a `u8` from 0 to 8 (`row * 3 + col`). `X` is `Side::First`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToeBoard {
    current_player: Side,
    field: [Option<Side>; 9],
}

impl TicTacToeBoard {
    /// Builds a position from three rows of `X`, `O` and `.`; the side to move is
    /// derived from the piece counts.
    pub fn from_rows(rows: [&str; 3]) -> Result<Self, GameError> {
        let mut field = [None; 9];
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != 3 {
                return Err(GameError::Layout(format!("row {r} must have 3 cells")));
            }
            for (c, ch) in row.chars().enumerate() {
                field[r * 3 + c] = match ch {
                    'X' | 'x' => Some(Side::First),
                    'O' | 'o' => Some(Side::Second),
                    '.' | ' ' => None,
                    other => {
                        return Err(GameError::Layout(format!("unexpected cell {other:?}")));
                    }
                };
            }
        }

        let xs = field.iter().filter(|c| **c == Some(Side::First)).count();
        let os = field.iter().filter(|c| **c == Some(Side::Second)).count();
        let current_player = match xs.checked_sub(os) {
            Some(0) => Side::First,
            Some(1) => Side::Second,
            _ => return Err(GameError::Layout(format!("{xs} X against {os} O"))),
        };

        Ok(Self {
            current_player,
            field,
        })
    }

    pub fn cell(&self, index: usize) -> Option<Side> {
        self.field[index]
    }

    fn winner(&self) -> Option<Side> {
        LINES.iter().find_map(|line| {
            let first = self.field[line[0]]?;
            line.iter()
                .all(|&i| self.field[i] == Some(first))
                .then_some(first)
        })
    }

    /// Lines holding two marks of one side and an empty cell.
    fn threat_lines(&self) -> u32 {
        LINES
            .iter()
            .filter(|line| {
                let empty = line.iter().filter(|&&i| self.field[i].is_none()).count();
                let xs = line
                    .iter()
                    .filter(|&&i| self.field[i] == Some(Side::First))
                    .count();
                empty == 1 && (xs == 2 || xs == 0)
            })
            .count() as u32
    }
}

impl Default for TicTacToeBoard {
    /// Creates a new Tic-Tac-Toe board with player 'X' starting.
    fn default() -> Self {
        Self {
            current_player: Side::First,
            field: [None; 9],
        }
    }
}

impl Board for TicTacToeBoard {
    type Move = u8;
    type Undo = ();

    fn side_to_move(&self) -> Side {
        self.current_player
    }

    fn outcome(&self) -> GameOutcome {
        if let Some(side) = self.winner() {
            return GameOutcome::Win(side);
        }

        if self.field.iter().any(|x| x.is_none()) {
            GameOutcome::InProgress
        } else {
            GameOutcome::Draw
        }
    }

    fn legal_moves(&self) -> Vec<Self::Move> {
        if self.outcome() != GameOutcome::InProgress {
            return Vec::new();
        }

        self.field
            .iter()
            .enumerate()
            .filter(|(_, x)| x.is_none())
            .map(|(i, _)| i as u8)
            .collect()
    }

    fn apply(&mut self, mv: &Self::Move) {
        self.field[*mv as usize] = Some(self.current_player);
        self.current_player = self.current_player.opposite();
    }

    fn undo(&mut self, mv: &Self::Move, _undo: ()) {
        self.current_player = self.current_player.opposite();
        self.field[*mv as usize] = None;
    }

    fn evaluate(&self, _side: Side) -> Option<Score> {
        Some(0)
    }

    fn hash(&self) -> u128 {
        let mut hash = 0;
        for (i, &cell) in self.field.iter().enumerate() {
            let cell_value = match cell {
                None => 0,
                Some(Side::First) => 1,
                Some(Side::Second) => 2,
            };
            hash += cell_value * 3u128.pow(i as u32);
        }
        hash
    }

    fn complexity(&self) -> u32 {
        let empty = self.field.iter().filter(|c| c.is_none()).count() as u32;
        empty + self.threat_lines()
    }

    fn move_number(&self) -> u32 {
        self.field.iter().filter(|c| c.is_some()).count() as u32
    }
}

impl fmt::Display for TicTacToeBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.field.chunks(3) {
            for cell in row {
                let ch = match cell {
                    None => '.',
                    Some(Side::First) => 'X',
                    Some(Side::Second) => 'O',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
