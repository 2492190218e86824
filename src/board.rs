use crate::error::GameError;
use std::fmt::Debug;

/// Score type shared by every evaluator and both search engines.
pub type Score = i32;

/// Base value of a won position. Every heuristic stays far below it, so a
/// forced win always outranks any positional advantage.
pub const WIN_SCORE: Score = 1_000_000;

/// The central trait of the library, defining the interface for a game state.
///
/// Both search engines are written once against this trait. It provides them with
/// move generation, reversible move application and terminal/heuristic evaluation.
pub trait Board: Clone + PartialEq + Debug {
    /// The type representing a move in the game. This could be a simple `u8` for a board position
    /// or a more complex struct for games with intricate actions.
    type Move: Clone + PartialEq + Debug;

    /// Everything `undo` needs to restore the position that existed before `apply`.
    type Undo: Debug;

    /// Returns the side whose turn it is to make a move.
    fn side_to_move(&self) -> Side;

    /// Returns the current outcome of the game. Always recomputed from the board itself.
    fn outcome(&self) -> GameOutcome;

    /// Returns every legal move for the side to move. Empty once the game is over.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Applies a legal move to the board, modifying its state.
    fn apply(&mut self, mv: &Self::Move) -> Self::Undo;

    /// Reverts a move previously made with `apply`. Must be its exact inverse.
    fn undo(&mut self, mv: &Self::Move, undo: Self::Undo);

    /// Static score of the position from `side`'s point of view.
    ///
    /// Must be zero-sum: `evaluate(s) == -evaluate(s.opposite())`. `None` means the
    /// variant has no heuristic; a depth-limited search that runs out of depth on such
    /// a board panics instead of guessing.
    fn evaluate(&self, _side: Side) -> Option<Score> {
        None
    }

    /// Returns a hash value for the current board state.
    fn hash(&self) -> u128;

    /// Rough size of the decision in front of the side to move (empty cells plus threats).
    fn complexity(&self) -> u32;

    /// Number of plies played since the initial position.
    fn move_number(&self) -> u32;
}

/// Represents the possible outcomes of a game.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum GameOutcome {
    /// The game is still ongoing.
    InProgress,
    /// The given side has won.
    Win(Side),
    /// The game has ended in a draw.
    Draw,
}

impl GameOutcome {
    pub fn is_over(&self) -> bool {
        *self != GameOutcome::InProgress
    }
}

/// The two players of a game. `First` always moves first from the initial position.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// Applies a caller-supplied move after checking it against `legal_moves`.
///
/// Engine-chosen moves never need this; it guards the human move handler.
pub fn play_move<B: Board>(board: &mut B, mv: &B::Move) -> Result<B::Undo, GameError> {
    if board.outcome().is_over() {
        return Err(GameError::GameOver);
    }

    if !board.legal_moves().contains(mv) {
        return Err(GameError::InvalidMove(format!("{mv:?}")));
    }

    Ok(board.apply(mv))
}
