use game_search::board::{Board, GameOutcome, play_move};
use game_search::boards::tic_tac_toe::TicTacToeBoard;
use game_search::mcts::MonteCarloTreeSearch;
use game_search::minimax::MinimaxSearch;
use game_search::policy::{Difficulty, GameKind, MovePolicy};
use game_search::random::CustomNumberGenerator;
use game_search::settings::Settings;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Opening statistics from MCTS
    let mut mcts = MonteCarloTreeSearch::builder(TicTacToeBoard::default())
        .with_solver(false)
        .with_random_generator(CustomNumberGenerator::default())
        .build();
    mcts.iterate_n_times(20000);

    for child in mcts.get_root().children() {
        let node = child.value();
        println!(
            "Move: {:?} = {:.2?}% over {} visits",
            node.prev_move,
            node.win_rate() * 100.0,
            node.visits
        );
    }

    let opening = mcts.best_move();
    println!("The best opening move is: {opening:?}");
    assert!(matches!(opening, Some(0 | 2 | 4 | 6 | 8)));

    // Perfect play from both sides ends in a draw
    let mut board = TicTacToeBoard::default();
    let search = MinimaxSearch::new(9);
    while !board.outcome().is_over() {
        let result = search.search(&mut board);
        let Some(mv) = result.best_move else {
            break;
        };
        if board.move_number() == 0 {
            assert!([0, 2, 4, 6, 8].contains(&mv));
        }
        play_move(&mut board, &mv).expect("engine picked an illegal move");
    }
    println!("{board}");
    assert_eq!(board.outcome(), GameOutcome::Draw);

    // Two hard policies play each other from a corner opening
    let hard = Settings {
        difficulty: Difficulty::Hard,
        randomness: Some(0.0),
        ..Settings::default()
    };
    let mut policy = MovePolicy::new(GameKind::TicTacToe, hard)
        .with_random_generator(CustomNumberGenerator::default());
    let mut board = TicTacToeBoard::from_rows(["X..", "...", "..."]).unwrap();
    while !board.outcome().is_over() {
        let result = policy.choose_move(&mut board);
        let Some(mv) = result.best_move else {
            break;
        };
        play_move(&mut board, &mv).expect("policy picked an illegal move");
    }
    println!("{board}");
    assert_eq!(board.outcome(), GameOutcome::Draw);
}
