use crate::board::{Board, GameOutcome, Side};

/// Game-theoretic value of a node once the solver has proven it, seen from the side
/// that made the move into the node.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Bound {
    None,
    ProvenWin,
    ProvenLoss,
}

/// Represents a single node in the Monte Carlo search tree.
///
/// Each node owns a copy of the game state, the statistics gathered by simulations
/// through it, and the move that led to it.
#[derive(Debug, Clone)]
pub struct MctsNode<T: Board> {
    /// The depth of the node in the tree.
    pub height: u32,
    /// The game state that this node represents.
    pub board: T,
    /// The move that led to this node's state from its parent. `None` for the root node.
    pub prev_move: Option<T::Move>,
    /// The side that played `prev_move`. Statistics are counted for this side.
    pub mover: Side,
    /// The outcome of the game at this node.
    pub outcome: GameOutcome,
    /// Legal moves that do not have a child node yet.
    pub untried_moves: Vec<T::Move>,
    pub visits: u32,
    /// Simulations through this node won by `mover`.
    pub wins: u32,
    pub draws: u32,
    pub bound: Bound,
    /// The value of this node is certain and selection no longer descends into it.
    pub is_fully_calculated: bool,
}

impl<T: Board> MctsNode<T> {
    pub fn new(board: T) -> Self {
        let mover = board.side_to_move().opposite();
        let outcome = board.outcome();
        let untried_moves = if outcome.is_over() {
            Vec::new()
        } else {
            board.legal_moves()
        };

        MctsNode {
            height: 0,
            board,
            prev_move: None,
            mover,
            outcome,
            untried_moves,
            visits: 0,
            wins: 0,
            draws: 0,
            bound: Bound::None,
            is_fully_calculated: false,
        }
    }

    /// Creates the node reached by playing `mv` from `parent`.
    pub fn child_of(parent: &MctsNode<T>, mv: T::Move) -> Self {
        let mut board = parent.board.clone();
        board.apply(&mv);
        let mut node = MctsNode::new(board);
        node.prev_move = Some(mv);
        node.height = parent.height + 1;
        node
    }

    /// Share of simulations won by `mover`, counting a draw as half a win.
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            (self.wins as f64 + 0.5 * self.draws as f64) / self.visits as f64
        }
    }

    pub fn draws_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            (self.draws as f64) / (self.visits as f64)
        }
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }

    /// Records one simulation result.
    pub fn record(&mut self, result: GameOutcome) {
        self.visits += 1;
        match result {
            GameOutcome::Win(side) if side == self.mover => self.wins += 1,
            GameOutcome::Draw => self.draws += 1,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::tic_tac_toe::TicTacToeBoard;

    #[test]
    fn root_mover_is_the_side_that_just_moved() {
        let node = MctsNode::new(TicTacToeBoard::default());
        assert_eq!(node.mover, Side::Second);
        assert_eq!(node.untried_moves.len(), 9);
    }

    #[test]
    fn child_applies_the_move() {
        // arrange
        let root = MctsNode::new(TicTacToeBoard::default());

        // act
        let child = MctsNode::child_of(&root, 4);

        // assert
        assert_eq!(child.mover, Side::First);
        assert_eq!(child.prev_move, Some(4));
        assert_eq!(child.height, 1);
        assert_eq!(child.board.cell(4), Some(Side::First));
        assert_eq!(child.untried_moves.len(), 8);
    }

    #[test]
    fn draws_count_as_half_a_win() {
        let mut node = MctsNode::new(TicTacToeBoard::default());
        node.record(GameOutcome::Win(Side::Second));
        node.record(GameOutcome::Draw);
        node.record(GameOutcome::Win(Side::First));
        node.record(GameOutcome::Draw);

        assert_eq!(node.visits, 4);
        assert_eq!(node.wins, 1);
        assert_eq!(node.draws, 2);
        assert_eq!(node.win_rate(), 0.5);
        assert_eq!(node.draws_rate(), 0.5);
    }

    #[test]
    fn terminal_node_has_no_untried_moves() {
        let board = TicTacToeBoard::from_rows(["XXX", "OO.", "..."]).unwrap();
        let node = MctsNode::new(board);
        assert_eq!(node.outcome, GameOutcome::Win(Side::First));
        assert!(node.is_fully_expanded());
    }
}
