use crate::board::{Board, GameOutcome, Score, Side, WIN_SCORE};
use crate::mcts::{Budget, MonteCarloTreeSearch};
use crate::minimax::MinimaxSearch;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Outcome of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<M> {
    /// `None` when the side to move has no legal move.
    pub best_move: Option<M>,
    /// Score from the point of view of the side to move at the root.
    pub score: Score,
    pub nodes_searched: u64,
}

impl<M> SearchResult<M> {
    pub fn is_game_over(&self) -> bool {
        self.best_move.is_none()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Minimax,
    #[default]
    AlphaBeta,
    Mcts,
}

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub max_depth: u32,
    /// Wall-clock budget. Only MCTS honours it; minimax is bounded by depth alone.
    pub time_budget: Duration,
    /// Probability in `[0, 1]` of playing a random legal move instead of searching.
    pub randomness: f64,
    pub algorithm: Algorithm,
    /// Caps MCTS rollouts at this many plies.
    pub rollout_depth: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            time_budget: Duration::from_secs(1),
            randomness: 0.0,
            algorithm: Algorithm::AlphaBeta,
            rollout_depth: None,
        }
    }
}

/// Score of a finished game for `side`, `ply` moves below the root.
pub(crate) fn terminal_score(outcome: GameOutcome, side: Side, ply: u32) -> Score {
    match outcome {
        GameOutcome::Win(winner) if winner == side => WIN_SCORE - ply as Score,
        GameOutcome::Win(_) => -(WIN_SCORE - ply as Score),
        GameOutcome::Draw | GameOutcome::InProgress => 0,
    }
}

/// Picks a move for the side to move using a fresh thread-local random generator.
///
/// The board is borrowed mutably for the duration of the search and is left exactly
/// as it was.
pub fn choose_move<B: Board>(board: &mut B, config: &SearchConfig) -> SearchResult<B::Move> {
    choose_move_with(board, config, &mut StandardRandomGenerator)
}

/// Same as [`choose_move`], drawing every random decision from `random`.
pub fn choose_move_with<B: Board, R: RandomGenerator>(
    board: &mut B,
    config: &SearchConfig,
    random: &mut R,
) -> SearchResult<B::Move> {
    if random.chance(config.randomness) {
        let moves = board.legal_moves();
        if let Some(mv) = random.choose(&moves) {
            debug!(randomness = config.randomness, "playing a random move");
            return SearchResult {
                best_move: Some(mv.clone()),
                score: 0,
                nodes_searched: 0,
            };
        }
    }

    match config.algorithm {
        Algorithm::Minimax | Algorithm::AlphaBeta => {
            MinimaxSearch::new(config.max_depth)
                .with_pruning(config.algorithm == Algorithm::AlphaBeta)
                .search(board)
        }
        Algorithm::Mcts => {
            let mut mcts = MonteCarloTreeSearch::builder(board.clone())
                .with_random_generator(std::mem::take(random))
                .with_rollout_depth(config.rollout_depth)
                .build();
            let result = mcts.search(Budget::Time(config.time_budget));
            *random = mcts.into_random_generator();
            result
        }
    }
}
