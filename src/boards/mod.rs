//! Contains implementations of the `Board` trait for the supported games.

/// Checkers on an 8×8 board with mandatory, maximal multi-jumps.
pub mod checkers;
/// Chess with castling, en-passant, promotion and the fifty-move rule.
pub mod chess;
/// Connect Four on a 6×7 board with gravity drop.
pub mod connect_four;
/// A `Board` implementation for the game of Tic-Tac-Toe.
pub mod tic_tac_toe;
