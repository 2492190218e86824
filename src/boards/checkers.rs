use crate::board::{Board, GameOutcome, Score, Side};
use std::fmt;

pub const SIZE: usize = 8;

static ALL_DIRECTIONS: [(i8, i8); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];

/// `(row, col)`, row 0 at the first player's edge.
pub type Square = (u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub king: bool,
}

impl Piece {
    pub fn man(side: Side) -> Self {
        Self { side, king: false }
    }

    pub fn king(side: Side) -> Self {
        Self { side, king: true }
    }

    fn directions(&self) -> &'static [(i8, i8)] {
        match (self.king, self.side) {
            (true, _) => &ALL_DIRECTIONS,
            (false, Side::First) => &ALL_DIRECTIONS[..2],
            (false, Side::Second) => &ALL_DIRECTIONS[2..],
        }
    }

    fn value(&self) -> Score {
        if self.king { 3 } else { 1 }
    }
}

/// A simple step or a complete capture chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckersMove {
    pub from: Square,
    pub to: Square,
    /// Squares of the jumped pieces, in jump order. Empty for a simple step.
    pub captured: Vec<Square>,
}

impl CheckersMove {
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// Every square the piece lands on, ending with `to`.
    pub fn path(&self) -> Vec<Square> {
        if self.captured.is_empty() {
            return vec![self.to];
        }
        let mut at = self.from;
        self.captured
            .iter()
            .map(|&(row, col)| {
                at = (2 * row - at.0, 2 * col - at.1);
                at
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckersUndo {
    captured: Vec<(Square, Piece)>,
    crowned: bool,
}

/// 8×8 draughts with mandatory capture and forced multi-jump.
///
/// Pieces live on squares where `row + col` is even. `Side::First` (dark) starts on
/// rows 0..3, moves toward row 7 and moves first; `Side::Second` (light) starts on
/// rows 5..8 and moves toward row 0. A man reaching the far row is crowned and its
/// move ends there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckersBoard {
    grid: [[Option<Piece>; SIZE]; SIZE],
    current_player: Side,
    plies: u32,
}

impl Default for CheckersBoard {
    fn default() -> Self {
        let mut board = Self::empty(Side::First);
        for row in 0..SIZE {
            for col in 0..SIZE {
                if !is_playable(row, col) {
                    continue;
                }
                if row < 3 {
                    board.grid[row][col] = Some(Piece::man(Side::First));
                } else if row > 4 {
                    board.grid[row][col] = Some(Piece::man(Side::Second));
                }
            }
        }
        board
    }
}

fn is_playable(row: usize, col: usize) -> bool {
    (row + col) % 2 == 0
}

fn offset(square: Square, (dr, dc): (i8, i8), steps: i8) -> Option<Square> {
    let row = square.0 as i8 + dr * steps;
    let col = square.1 as i8 + dc * steps;
    let range = 0..SIZE as i8;
    (range.contains(&row) && range.contains(&col)).then_some((row as u8, col as u8))
}

fn crown_row(side: Side) -> u8 {
    match side {
        Side::First => SIZE as u8 - 1,
        Side::Second => 0,
    }
}

impl CheckersBoard {
    /// A board with no pieces, for building positions by hand.
    pub fn empty(to_move: Side) -> Self {
        Self {
            grid: [[None; SIZE]; SIZE],
            current_player: to_move,
            plies: 0,
        }
    }

    /// Puts a piece on a playable square. Panics on a light square.
    pub fn place(&mut self, square: Square, piece: Piece) -> &mut Self {
        if !is_playable(square.0 as usize, square.1 as usize) {
            panic!("BUG: {square:?} is not a playable square");
        }
        self.grid[square.0 as usize][square.1 as usize] = Some(piece);
        self
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.grid[square.0 as usize][square.1 as usize]
    }

    fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.grid[square.0 as usize][square.1 as usize] = piece;
    }

    fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.grid.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, cell)| cell.map(|p| ((row as u8, col as u8), p)))
        })
    }

    fn count(&self, side: Side) -> usize {
        self.pieces().filter(|(_, p)| p.side == side).count()
    }

    fn simple_moves(&self, from: Square, piece: Piece, out: &mut Vec<CheckersMove>) {
        for &dir in piece.directions() {
            if let Some(to) = offset(from, dir, 1) {
                if self.piece_at(to).is_none() {
                    out.push(CheckersMove {
                        from,
                        to,
                        captured: Vec::new(),
                    });
                }
            }
        }
    }

    /// Depth-first search for maximal capture chains. The moving piece has notionally
    /// left `origin`, so that square counts as empty; jumped pieces stay on the board
    /// until the move completes and cannot be jumped twice.
    fn jump_chains(
        &self,
        origin: Square,
        piece: Piece,
        at: Square,
        captured: &mut Vec<Square>,
        out: &mut Vec<CheckersMove>,
    ) {
        let mut extended = false;
        for &dir in piece.directions() {
            let (Some(over), Some(land)) = (offset(at, dir, 1), offset(at, dir, 2)) else {
                continue;
            };
            let jumps_enemy = matches!(self.piece_at(over), Some(p) if p.side != piece.side);
            let lands_free = land == origin || self.piece_at(land).is_none();
            if !jumps_enemy || !lands_free || captured.contains(&over) {
                continue;
            }

            extended = true;
            captured.push(over);
            if !piece.king && land.0 == crown_row(piece.side) {
                out.push(CheckersMove {
                    from: origin,
                    to: land,
                    captured: captured.clone(),
                });
            } else {
                self.jump_chains(origin, piece, land, captured, out);
            }
            captured.pop();
        }

        if !extended && !captured.is_empty() {
            out.push(CheckersMove {
                from: origin,
                to: at,
                captured: captured.clone(),
            });
        }
    }

    fn generate_moves(&self, side: Side) -> Vec<CheckersMove> {
        let mut jumps = Vec::new();
        for (square, piece) in self.pieces().filter(|(_, p)| p.side == side) {
            self.jump_chains(square, piece, square, &mut Vec::new(), &mut jumps);
        }
        if !jumps.is_empty() {
            return jumps;
        }

        let mut steps = Vec::new();
        for (square, piece) in self.pieces().filter(|(_, p)| p.side == side) {
            self.simple_moves(square, piece, &mut steps);
        }
        steps
    }

    fn material(&self, side: Side) -> Score {
        self.pieces()
            .filter(|(_, p)| p.side == side)
            .map(|(_, p)| p.value())
            .sum()
    }

    /// Empty playable squares, capture opportunities for both sides and material
    /// imbalance. Independent of whose turn it is.
    fn board_complexity(&self) -> u32 {
        let pieces = self.pieces().count();
        let empty = (SIZE * SIZE / 2).saturating_sub(pieces) as u32;
        let jumps = self
            .pieces()
            .map(|(square, piece)| {
                ALL_DIRECTIONS
                    .iter()
                    .filter(|&&dir| {
                        let (Some(over), Some(land)) =
                            (offset(square, dir, 1), offset(square, dir, 2))
                        else {
                            return false;
                        };
                        matches!(self.piece_at(over), Some(p) if p.side != piece.side)
                            && self.piece_at(land).is_none()
                    })
                    .count() as u32
            })
            .sum::<u32>();
        let imbalance = self.count(Side::First).abs_diff(self.count(Side::Second)) as u32;
        empty + jumps + imbalance
    }
}

impl Board for CheckersBoard {
    type Move = CheckersMove;
    type Undo = CheckersUndo;

    fn side_to_move(&self) -> Side {
        self.current_player
    }

    fn outcome(&self) -> GameOutcome {
        let side = self.current_player;
        if self.count(side) == 0 || self.generate_moves(side).is_empty() {
            GameOutcome::Win(side.opposite())
        } else {
            GameOutcome::InProgress
        }
    }

    fn legal_moves(&self) -> Vec<Self::Move> {
        self.generate_moves(self.current_player)
    }

    fn apply(&mut self, mv: &Self::Move) -> Self::Undo {
        let Some(mut piece) = self.piece_at(mv.from) else {
            panic!("BUG: no piece on {:?}", mv.from);
        };

        let mut captured = Vec::with_capacity(mv.captured.len());
        for &square in &mv.captured {
            if let Some(victim) = self.piece_at(square) {
                captured.push((square, victim));
                self.set(square, None);
            }
        }

        let crowned = !piece.king && mv.to.0 == crown_row(piece.side);
        piece.king |= crowned;
        self.set(mv.from, None);
        self.set(mv.to, Some(piece));

        self.current_player = self.current_player.opposite();
        self.plies += 1;
        CheckersUndo { captured, crowned }
    }

    fn undo(&mut self, mv: &Self::Move, undo: Self::Undo) {
        let Some(mut piece) = self.piece_at(mv.to) else {
            panic!("BUG: no piece on {:?} to undo", mv.to);
        };
        if undo.crowned {
            piece.king = false;
        }
        self.set(mv.to, None);
        self.set(mv.from, Some(piece));
        for (square, victim) in undo.captured {
            self.set(square, Some(victim));
        }

        self.current_player = self.current_player.opposite();
        self.plies -= 1;
    }

    fn evaluate(&self, side: Side) -> Option<Score> {
        let material = self.material(side) - self.material(side.opposite());
        Some(material * (10 + self.board_complexity() as Score))
    }

    fn hash(&self) -> u128 {
        let mut hash = 0u128;
        for row in 0..SIZE {
            for col in (0..SIZE).filter(|&col| is_playable(row, col)) {
                let code = match self.grid[row][col] {
                    None => 0,
                    Some(Piece { side: Side::First, king: false }) => 1,
                    Some(Piece { side: Side::First, king: true }) => 2,
                    Some(Piece { side: Side::Second, king: false }) => 3,
                    Some(Piece { side: Side::Second, king: true }) => 4,
                };
                hash = hash * 5 + code;
            }
        }
        hash * 2 + self.current_player as u128
    }

    fn complexity(&self) -> u32 {
        self.board_complexity()
    }

    fn move_number(&self) -> u32 {
        self.plies
    }
}

impl fmt::Display for CheckersBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.grid.iter().rev() {
            for cell in row {
                let ch = match cell {
                    None => '.',
                    Some(Piece { side: Side::First, king: false }) => 'd',
                    Some(Piece { side: Side::First, king: true }) => 'D',
                    Some(Piece { side: Side::Second, king: false }) => 'l',
                    Some(Piece { side: Side::Second, king: true }) => 'L',
                };
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
