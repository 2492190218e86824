//! Adversarial search for two-player board games.
//!
//! One [`Board`](board::Board) trait describes a game: move generation, reversible
//! move application and terminal/heuristic evaluation. Two engines are written once
//! against it: depth-limited minimax with optional alpha-beta pruning, and Monte Carlo
//! Tree Search. A [`MovePolicy`](policy::MovePolicy) turns a difficulty level into
//! search parameters for a concrete game.
//!
//! Tic-Tac-Toe, Connect Four, Checkers and Chess boards ship with the crate.
//!
//! # Example
//!
//! ```rust
//! use game_search::board::Board;
//! use game_search::boards::tic_tac_toe::TicTacToeBoard;
//! use game_search::mcts::MonteCarloTreeSearch;
//! use game_search::minimax::MinimaxSearch;
//! use game_search::random::CustomNumberGenerator;
//!
//! let mut board = TicTacToeBoard::from_rows(["XX.", "OO.", "..."]).unwrap();
//!
//! // Exhaustive minimax with alpha-beta pruning
//! let result = MinimaxSearch::new(9).search(&mut board);
//! assert_eq!(result.best_move, Some(2));
//!
//! // Monte Carlo Tree Search with a reproducible random generator
//! let mut mcts = MonteCarloTreeSearch::builder(board.clone())
//!     .with_random_generator(CustomNumberGenerator::default())
//!     .build();
//! mcts.iterate_n_times(1000);
//! assert_eq!(mcts.best_move(), Some(2));
//!
//! board.apply(&2);
//! assert!(board.outcome().is_over());
//! ```

/// Contains the `Board` trait and related types that define the interface for a game.
pub mod board;
/// Contains pre-made implementations of the `Board` trait.
pub mod boards;
/// Error types returned at the crate's boundaries.
pub mod error;
/// Monte Carlo Tree Search over any `Board`.
pub mod mcts;
/// Contains the `MctsNode` struct, which represents a node in the search tree.
pub mod mcts_node;
/// Depth-limited minimax with optional alpha-beta pruning.
pub mod minimax;
/// Difficulty levels and the per-session move policy.
pub mod policy;
/// Contains traits and implementations for random number generation.
pub mod random;
/// Engine-independent search configuration and results.
pub mod search;
/// User settings loaded from TOML and the provider trait the policy reads them through.
pub mod settings;
