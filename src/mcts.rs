use crate::board::{Board, GameOutcome, Score, Side};
use crate::mcts_node::{Bound, MctsNode};
use crate::random::RandomGenerator;
use crate::search::{SearchResult, terminal_score};
use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Exploration constant of UCB1.
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Scale of the score reported by [`MonteCarloTreeSearch::search`].
pub const MCTS_SCORE_SCALE: f64 = 1000.0;

/// How long [`MonteCarloTreeSearch::search`] keeps iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Iterations(u32),
    Time(Duration),
}

/// The main struct for running the Monte Carlo Tree Search algorithm.
///
/// It holds the search tree, the random number generator, and the configuration for the search.
pub struct MonteCarloTreeSearch<T: Board, K: RandomGenerator> {
    tree: Tree<MctsNode<T>>,
    root_id: NodeId,
    random: K,
    exploration: f64,
    rollout_depth: Option<u32>,
    use_solver: bool,
    next_action: MctsAction,
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<T: Board, K: RandomGenerator> {
    board: T,
    random_generator: K,
    exploration: f64,
    rollout_depth: Option<u32>,
    use_solver: bool,
}

impl<T: Board, K: RandomGenerator> MonteCarloTreeSearchBuilder<T, K> {
    pub fn new(board: T) -> Self {
        Self {
            board,
            random_generator: K::default(),
            exploration: DEFAULT_EXPLORATION,
            rollout_depth: None,
            use_solver: true,
        }
    }

    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    /// Enables or disables proving wins and losses inside the tree.
    pub fn with_solver(mut self, use_solver: bool) -> Self {
        self.use_solver = use_solver;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Stops rollouts after `depth` plies and scores them with the board heuristic.
    pub fn with_rollout_depth(mut self, depth: Option<u32>) -> Self {
        self.rollout_depth = depth;
        self
    }

    pub fn build(self) -> MonteCarloTreeSearch<T, K> {
        MonteCarloTreeSearch::new(
            self.board,
            self.random_generator,
            self.exploration,
            self.rollout_depth,
            self.use_solver,
        )
    }
}

impl<T: Board, K: RandomGenerator> MonteCarloTreeSearch<T, K> {
    pub fn builder(board: T) -> MonteCarloTreeSearchBuilder<T, K> {
        MonteCarloTreeSearchBuilder::new(board)
    }

    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(
        board: T,
        rg: K,
        exploration: f64,
        rollout_depth: Option<u32>,
        use_solver: bool,
    ) -> Self {
        let tree = Tree::new(MctsNode::new(board));
        let root_id = tree.root().id();

        let mut mcts = Self {
            tree,
            root_id,
            random: rg,
            exploration,
            rollout_depth,
            use_solver,
            next_action: MctsAction::Selection {
                root: root_id,
                updated_path: vec![],
            },
        };
        if use_solver {
            mcts.refresh_bound(root_id);
            if mcts.get_root().value().is_fully_calculated {
                mcts.next_action = MctsAction::EverythingIsCalculated;
            }
        }
        mcts
    }

    pub fn get_tree(&self) -> &Tree<MctsNode<T>> {
        &self.tree
    }

    /// Returns the next MCTS action to be performed. Useful for debugging and visualization.
    pub fn get_next_mcts_action(&self) -> &MctsAction {
        &self.next_action
    }

    pub fn get_root(&self) -> NodeRef<'_, MctsNode<T>> {
        self.node(self.root_id)
    }

    /// Hands the random generator back, advanced past every draw this search made.
    pub fn into_random_generator(self) -> K {
        self.random
    }

    fn node(&self, id: NodeId) -> NodeRef<'_, MctsNode<T>> {
        match self.tree.get(id) {
            Some(node) => node,
            None => panic!("BUG: node {id:?} is not in the tree"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> NodeMut<'_, MctsNode<T>> {
        match self.tree.get_mut(id) {
            Some(node) => node,
            None => panic!("BUG: node {id:?} is not in the tree"),
        }
    }

    /// Executes a single step of the MCTS algorithm (Selection, Expansion, Simulation, or Backpropagation).
    pub fn execute_action(&mut self) {
        match self.next_action.clone() {
            MctsAction::Selection { root, .. } => {
                self.next_action = match self.select_next_node(root) {
                    None => MctsAction::EverythingIsCalculated,
                    Some(leaf) => MctsAction::Expansion { leaf },
                };
            }
            MctsAction::Expansion { leaf } => {
                let child = self.expand_node(leaf);
                self.next_action = MctsAction::Simulation { child };
            }
            MctsAction::Simulation { child } => {
                let result = self.simulate(child);
                self.next_action = MctsAction::Backpropagation { child, result };
            }
            MctsAction::Backpropagation { child, result } => {
                let updated_path = self.backpropagate(child, result);
                self.next_action = if self.get_root().value().is_fully_calculated {
                    MctsAction::EverythingIsCalculated
                } else {
                    MctsAction::Selection {
                        root: self.root_id,
                        updated_path,
                    }
                };
            }
            MctsAction::EverythingIsCalculated => {}
        }
    }

    /// Performs one full iteration and returns the nodes updated by backpropagation.
    pub fn do_iteration(&mut self) -> Vec<NodeId> {
        loop {
            self.execute_action();
            match &self.next_action {
                MctsAction::Selection { updated_path, .. } => return updated_path.clone(),
                MctsAction::EverythingIsCalculated => return vec![],
                _ => {}
            }
        }
    }

    pub fn is_solved(&self) -> bool {
        self.next_action == MctsAction::EverythingIsCalculated
    }

    /// Runs `n` iterations, or fewer if the tree gets solved. Returns how many ran.
    pub fn iterate_n_times(&mut self, n: u32) -> u32 {
        let mut iteration = 0;
        while iteration < n && !self.is_solved() {
            self.do_iteration();
            iteration += 1;
        }
        iteration
    }

    /// Iterates until `budget` has elapsed. The clock is checked between iterations.
    pub fn iterate_for(&mut self, budget: Duration) -> u32 {
        let started = Instant::now();
        let mut iteration = 0;
        while started.elapsed() < budget && !self.is_solved() {
            self.do_iteration();
            iteration += 1;
        }
        iteration
    }

    /// The root child to play: a proven win if there is one, otherwise the most visited
    /// child that is not a proven loss.
    pub fn best_child(&self) -> Option<NodeRef<'_, MctsNode<T>>> {
        let root = self.get_root();
        if let Some(win) = root
            .children()
            .find(|child| child.value().bound == Bound::ProvenWin)
        {
            return Some(win);
        }

        most_visited(
            root.children()
                .filter(|child| child.value().bound != Bound::ProvenLoss),
        )
        .or_else(|| most_visited(root.children()))
    }

    pub fn best_move(&self) -> Option<T::Move> {
        self.best_child()
            .and_then(|child| child.value().prev_move.clone())
    }

    /// Runs the search and reports it in the engine-independent form. The score maps the
    /// chosen child's win rate onto `[-1000, 1000]`.
    pub fn search(&mut self, budget: Budget) -> SearchResult<T::Move> {
        debug!(?budget, solver = self.use_solver, "mcts search started");
        let iterations = match budget {
            Budget::Iterations(n) => self.iterate_n_times(n),
            Budget::Time(duration) => self.iterate_for(duration),
        };

        let root = self.get_root().value();
        let side = root.board.side_to_move();
        let nodes_searched = self.tree.nodes().count() as u64;
        let result = match self.best_child() {
            Some(child) => {
                let child = child.value();
                let rate = match child.bound {
                    Bound::ProvenWin => 1.0,
                    Bound::ProvenLoss => 0.0,
                    Bound::None => child.win_rate(),
                };
                SearchResult {
                    best_move: child.prev_move.clone(),
                    score: ((2.0 * rate - 1.0) * MCTS_SCORE_SCALE).round() as Score,
                    nodes_searched,
                }
            }
            None => SearchResult {
                best_move: None,
                score: terminal_score(root.outcome, side, 0),
                nodes_searched,
            },
        };

        debug!(
            iterations,
            nodes = result.nodes_searched,
            score = result.score,
            solved = self.is_solved(),
            "mcts search finished"
        );
        result
    }

    /// Descends from `root` by UCB1 to the first node that still has untried moves or
    /// is terminal. `None` once everything below `root` is calculated.
    fn select_next_node(&self, root: NodeId) -> Option<NodeId> {
        let mut current = self.node(root);
        if current.value().is_fully_calculated {
            return None;
        }

        loop {
            let data = current.value();
            if data.outcome.is_over() || !data.is_fully_expanded() {
                return Some(current.id());
            }

            let mut best_child = None;
            let mut max_ucb = f64::NEG_INFINITY;
            for child in current.children() {
                if child.value().is_fully_calculated {
                    continue;
                }

                let ucb = self.ucb_value(data.visits, child.value());
                if best_child.is_none() || ucb > max_ucb {
                    max_ucb = ucb;
                    best_child = Some(child);
                }
            }

            match best_child {
                Some(child) => current = child,
                None => return Some(current.id()),
            }
        }
    }

    /// Plays one random untried move of `leaf` and returns the new child. A terminal
    /// leaf is returned as is.
    fn expand_node(&mut self, leaf: NodeId) -> NodeId {
        let node = self.node(leaf).value();
        if node.outcome.is_over() || node.untried_moves.is_empty() {
            return leaf;
        }

        let untried = node.untried_moves.len() as i32;
        let index = self.random.next_range(0, untried) as usize;
        let mv = self.node_mut(leaf).value().untried_moves.swap_remove(index);
        let child = MctsNode::child_of(self.node(leaf).value(), mv);
        trace!(height = child.height, mv = ?child.prev_move, "expanded node");

        self.node_mut(leaf).append(child).id()
    }

    /// Plays random moves from `node_id` to the end of the game, never revisiting a
    /// position. Running out of unvisited positions counts as a draw.
    fn simulate(&mut self, node_id: NodeId) -> GameOutcome {
        let node = self.node(node_id).value();
        if node.outcome.is_over() {
            return node.outcome;
        }

        let mover = node.mover;
        let mut board = node.board.clone();
        let mut visited_states = HashSet::new();
        visited_states.insert(board.hash());
        let mut plies = 0;

        loop {
            let outcome = board.outcome();
            if outcome.is_over() {
                return outcome;
            }

            if self.rollout_depth.is_some_and(|cap| plies >= cap) {
                return Self::judge_by_heuristic(&board, mover);
            }

            let mut moves = board.legal_moves();
            loop {
                if moves.is_empty() {
                    return GameOutcome::Draw;
                }
                let index = self.random.next_range(0, moves.len() as i32) as usize;
                let mv = moves.swap_remove(index);
                let undo = board.apply(&mv);
                if visited_states.insert(board.hash()) {
                    break;
                }
                board.undo(&mv, undo);
            }
            plies += 1;
        }
    }

    fn judge_by_heuristic(board: &T, mover: Side) -> GameOutcome {
        match board.evaluate(mover) {
            Some(score) if score > 0 => GameOutcome::Win(mover),
            Some(score) if score < 0 => GameOutcome::Win(mover.opposite()),
            _ => GameOutcome::Draw,
        }
    }

    /// Records `result` on every node from `node_id` up to the root.
    fn backpropagate(&mut self, node_id: NodeId, result: GameOutcome) -> Vec<NodeId> {
        let mut branch = vec![node_id];
        let mut current = self.node(node_id);
        while let Some(parent) = current.parent() {
            branch.push(parent.id());
            current = parent;
        }

        for &id in &branch {
            self.node_mut(id).value().record(result);
            if self.use_solver {
                self.refresh_bound(id);
            }
        }

        branch
    }

    /// Recomputes the proven value of a node from its outcome and its children.
    fn refresh_bound(&mut self, id: NodeId) {
        let node = self.node(id);
        let data = node.value();
        let mover = data.mover;

        let bound = match data.outcome {
            GameOutcome::Win(side) if side == mover => Bound::ProvenWin,
            GameOutcome::Win(_) => Bound::ProvenLoss,
            GameOutcome::Draw => Bound::None,
            GameOutcome::InProgress => {
                if node
                    .children()
                    .any(|child| child.value().bound == Bound::ProvenWin)
                {
                    Bound::ProvenLoss
                } else if data.is_fully_expanded()
                    && node
                        .children()
                        .all(|child| child.value().bound == Bound::ProvenLoss)
                {
                    Bound::ProvenWin
                } else {
                    Bound::None
                }
            }
        };

        let is_fully_calculated = bound != Bound::None
            || data.outcome.is_over()
            || (data.is_fully_expanded()
                && node.children().all(|child| child.value().is_fully_calculated));

        let mut node = self.node_mut(id);
        let data = node.value();
        data.bound = bound;
        data.is_fully_calculated = is_fully_calculated;
    }

    /// Calculates the UCB1 (Upper Confidence Bound 1) value for a node.
    fn ucb_value(&self, total_visits: u32, node: &MctsNode<T>) -> f64 {
        if node.visits == 0 {
            return f64::INFINITY;
        }
        node.win_rate()
            + self.exploration * f64::sqrt(f64::ln(total_visits as f64) / node.visits as f64)
    }
}

fn most_visited<'a, T: Board>(
    nodes: impl Iterator<Item = NodeRef<'a, MctsNode<T>>>,
) -> Option<NodeRef<'a, MctsNode<T>>> {
    let mut best: Option<NodeRef<'a, MctsNode<T>>> = None;
    for node in nodes {
        match &best {
            Some(b) if b.value().visits >= node.value().visits => {}
            _ => best = Some(node),
        }
    }
    best
}

/// Represents the four main stages of the MCTS algorithm.
///
/// This enum is used to manage the state of the search process.
#[derive(Debug, PartialEq, Clone)]
pub enum MctsAction {
    /// Descend from `root` to a leaf worth expanding.
    Selection {
        root: NodeId,
        /// Nodes updated by the previous backpropagation.
        updated_path: Vec<NodeId>,
    },
    /// Add one child to `leaf`.
    Expansion { leaf: NodeId },
    /// Random playout from the new `child`.
    Simulation { child: NodeId },
    /// Update the statistics on the path from `child` to the root.
    Backpropagation { child: NodeId, result: GameOutcome },
    /// The root's value is certain; further iterations change nothing.
    EverythingIsCalculated,
}

impl MctsAction {
    pub fn get_name(&self) -> &'static str {
        match self {
            MctsAction::Selection { .. } => "Selection",
            MctsAction::Expansion { .. } => "Expansion",
            MctsAction::Simulation { .. } => "Simulation",
            MctsAction::Backpropagation { .. } => "Backpropagation",
            MctsAction::EverythingIsCalculated => "EverythingIsCalculated",
        }
    }
}
