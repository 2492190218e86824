use crate::board::{Board, GameOutcome, Score, Side};
use crate::search::{SearchResult, terminal_score};
use tracing::{debug, warn};

/// Depth-limited minimax, optionally with alpha-beta pruning.
///
/// Pruning never changes the result: both modes return the same move and score,
/// pruning only visits fewer nodes. Ties go to the first best move in the order
/// `legal_moves` produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimaxSearch {
    max_depth: u32,
    use_pruning: bool,
}

impl MinimaxSearch {
    /// A depth of zero is searched as one ply, so a live position always yields a move.
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            use_pruning: true,
        }
    }

    /// Enables or disables alpha-beta pruning.
    pub fn with_pruning(mut self, use_pruning: bool) -> Self {
        self.use_pruning = use_pruning;
        self
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Searches `board` for the side to move. The board is mutated during the search
    /// and restored before returning.
    pub fn search<B: Board>(&self, board: &mut B) -> SearchResult<B::Move> {
        let mut run = Run {
            root_side: board.side_to_move(),
            use_pruning: self.use_pruning,
            nodes: 0,
        };

        debug!(
            depth = self.max_depth,
            pruning = self.use_pruning,
            side = ?run.root_side,
            "minimax search started"
        );
        let depth = self.max_depth.max(1);
        let (best_move, score) = run.visit(board, depth, 0, Score::MIN, Score::MAX);
        debug!(
            nodes = run.nodes,
            score,
            best_move = ?best_move,
            "minimax search finished"
        );

        SearchResult {
            best_move,
            score,
            nodes_searched: run.nodes,
        }
    }
}

struct Run {
    root_side: Side,
    use_pruning: bool,
    nodes: u64,
}

impl Run {
    fn leaf_score<B: Board>(&self, board: &B, outcome: GameOutcome, ply: u32) -> Score {
        if outcome.is_over() {
            return terminal_score(outcome, self.root_side, ply);
        }

        match board.evaluate(self.root_side) {
            Some(score) => score,
            None => panic!(
                "search depth exhausted on a non-terminal {} position without an evaluator",
                std::any::type_name::<B>()
            ),
        }
    }

    fn visit<B: Board>(
        &mut self,
        board: &mut B,
        depth: u32,
        ply: u32,
        mut alpha: Score,
        mut beta: Score,
    ) -> (Option<B::Move>, Score) {
        self.nodes += 1;

        let outcome = board.outcome();
        if outcome.is_over() || depth == 0 {
            return (None, self.leaf_score(board, outcome, ply));
        }

        let moves = board.legal_moves();
        if moves.is_empty() {
            warn!(ply, "position in progress without legal moves");
            return (None, board.evaluate(self.root_side).unwrap_or(0));
        }

        let maximizing = board.side_to_move() == self.root_side;
        let mut best_move = None;
        let mut best = if maximizing { Score::MIN } else { Score::MAX };

        for mv in moves {
            let undo = board.apply(&mv);
            let (_, score) = self.visit(board, depth - 1, ply + 1, alpha, beta);
            board.undo(&mv, undo);

            if maximizing {
                if best_move.is_none() || score > best {
                    best = score;
                    best_move = Some(mv);
                }
                alpha = alpha.max(best);
            } else {
                if best_move.is_none() || score < best {
                    best = score;
                    best_move = Some(mv);
                }
                beta = beta.min(best);
            }

            if self.use_pruning && alpha >= beta {
                break;
            }
        }

        (best_move, best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::WIN_SCORE;
    use crate::boards::connect_four::ConnectFourBoard;
    use crate::boards::tic_tac_toe::TicTacToeBoard;

    #[test]
    fn takes_the_immediate_win() {
        // arrange
        let mut board = TicTacToeBoard::from_rows(["XX.", "OO.", "..."]).unwrap();

        // act
        let result = MinimaxSearch::new(9).search(&mut board);

        // assert
        assert_eq!(result.best_move, Some(2));
        assert_eq!(result.score, WIN_SCORE - 1);
    }

    #[test]
    fn pruning_visits_fewer_nodes_for_the_same_answer() {
        // arrange
        let mut board = TicTacToeBoard::from_rows(["X..", "...", "..."]).unwrap();

        // act
        let plain = MinimaxSearch::new(8).with_pruning(false).search(&mut board);
        let pruned = MinimaxSearch::new(8).search(&mut board);

        // assert
        assert_eq!(plain.best_move, pruned.best_move);
        assert_eq!(plain.score, pruned.score);
        assert!(pruned.nodes_searched < plain.nodes_searched);
    }

    #[test]
    fn empty_board_is_a_draw_with_full_depth() {
        let mut board = TicTacToeBoard::default();
        let result = MinimaxSearch::new(9).search(&mut board);
        assert_eq!(result.score, 0);
        assert_eq!(board, TicTacToeBoard::default());
    }

    #[test]
    fn terminal_root_returns_no_move() {
        let mut board = TicTacToeBoard::from_rows(["OOO", "XX.", "X.."]).unwrap();
        let result = MinimaxSearch::new(3).search(&mut board);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, -WIN_SCORE);
        assert_eq!(result.nodes_searched, 1);
    }

    #[test]
    fn zero_depth_still_returns_a_move_on_a_live_board() {
        // arrange
        let mut board = TicTacToeBoard::from_rows(["XX.", "OO.", "..."]).unwrap();

        // act
        let result = MinimaxSearch::new(0).search(&mut board);

        // assert
        assert_eq!(result.best_move, Some(2));
        assert_eq!(result.score, WIN_SCORE - 1);
        assert!(!result.is_game_over());
    }

    #[test]
    fn connect_four_prefers_winning_to_blocking() {
        // arrange
        let mut board = ConnectFourBoard::from_rows([
            ".......",
            ".......",
            ".......",
            "Y......",
            "Y......",
            "YRR.R..",
        ])
        .unwrap();
        let before = board.clone();

        // act
        let result = MinimaxSearch::new(4).search(&mut board);

        // assert
        assert_eq!(result.best_move, Some(3));
        assert_eq!(board, before);
    }

    #[derive(Debug, Clone, PartialEq)]
    struct NoHeuristic(TicTacToeBoard);

    impl Board for NoHeuristic {
        type Move = u8;
        type Undo = ();

        fn side_to_move(&self) -> Side {
            self.0.side_to_move()
        }
        fn outcome(&self) -> GameOutcome {
            self.0.outcome()
        }
        fn legal_moves(&self) -> Vec<u8> {
            self.0.legal_moves()
        }
        fn apply(&mut self, mv: &u8) {
            self.0.apply(mv)
        }
        fn undo(&mut self, mv: &u8, undo: ()) {
            self.0.undo(mv, undo)
        }
        fn hash(&self) -> u128 {
            self.0.hash()
        }
        fn complexity(&self) -> u32 {
            self.0.complexity()
        }
        fn move_number(&self) -> u32 {
            self.0.move_number()
        }
    }

    #[test]
    #[should_panic(expected = "without an evaluator")]
    fn shallow_search_without_evaluator_panics() {
        let mut board = NoHeuristic(TicTacToeBoard::default());
        MinimaxSearch::new(2).search(&mut board);
    }
}
