//! Turns a difficulty level into a concrete search configuration and plays moves with it.

use crate::board::Board;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::search::{SearchConfig, SearchResult, choose_move_with};
use crate::settings::SettingsProvider;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Shortest thinking time, in seconds, whatever the difficulty.
pub const MIN_THINKING_TIME: f64 = 0.2;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Search parameters for one difficulty level. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub search_depth: u32,
    pub randomness: f64,
    pub base_time: f64,
    pub time_per_move: f64,
    pub time_per_complexity: f64,
    pub max_time: f64,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                search_depth: 2,
                randomness: 0.3,
                base_time: 2.0,
                time_per_move: 0.5,
                time_per_complexity: 0.1,
                max_time: 5.0,
            },
            Difficulty::Medium => DifficultyProfile {
                search_depth: 4,
                randomness: 0.2,
                base_time: 1.0,
                time_per_move: 0.3,
                time_per_complexity: 0.2,
                max_time: 3.0,
            },
            Difficulty::Hard => DifficultyProfile {
                search_depth: 6,
                randomness: 0.1,
                base_time: 0.5,
                time_per_move: 0.2,
                time_per_complexity: 0.3,
                max_time: 2.0,
            },
        }
    }
}

impl DifficultyProfile {
    /// `base + moves * per_move + complexity * per_complexity`, clamped to
    /// `[MIN_THINKING_TIME, max_time]`.
    pub fn thinking_time(&self, move_number: u32, complexity: u32) -> Duration {
        let seconds = self.base_time
            + move_number as f64 * self.time_per_move
            + complexity as f64 * self.time_per_complexity;
        Duration::from_secs_f64(seconds.clamp(MIN_THINKING_TIME, self.max_time))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    ConnectFour,
    Checkers,
    Chess,
}

impl GameKind {
    /// The difficulty profile tuned for this game.
    pub fn profile(self, difficulty: Difficulty) -> DifficultyProfile {
        let base = difficulty.profile();
        let depth = base.search_depth;
        let (search_depth, randomness_factor) = match self {
            GameKind::TicTacToe => {
                let depth = match difficulty {
                    Difficulty::Easy => 2,
                    Difficulty::Medium => 4,
                    Difficulty::Hard => 9,
                };
                (depth, 1.5)
            }
            GameKind::ConnectFour => (depth * 6 / 5, 0.9),
            GameKind::Checkers => (depth * 3 / 2, 0.8),
            GameKind::Chess => (depth / 2 + 1, 0.5),
        };
        let (base_factor, move_factor, complexity_factor) = match self {
            GameKind::TicTacToe => (0.5, 0.5, 0.5),
            GameKind::ConnectFour => (1.2, 1.3, 1.2),
            GameKind::Checkers => (1.5, 1.2, 1.5),
            GameKind::Chess => (2.0, 1.5, 2.0),
        };

        DifficultyProfile {
            search_depth,
            randomness: (base.randomness * randomness_factor).clamp(0.0, 1.0),
            base_time: base.base_time * base_factor,
            time_per_move: base.time_per_move * move_factor,
            time_per_complexity: base.time_per_complexity * complexity_factor,
            max_time: base.max_time,
        }
    }
}

/// Plays moves for one game session.
///
/// Settings are read from the provider before every move. The policy owns its random
/// generator, so sessions never share random state.
pub struct MovePolicy<P: SettingsProvider, R: RandomGenerator = StandardRandomGenerator> {
    game: GameKind,
    provider: P,
    random: R,
}

impl<P: SettingsProvider> MovePolicy<P> {
    pub fn new(game: GameKind, provider: P) -> Self {
        Self {
            game,
            provider,
            random: StandardRandomGenerator,
        }
    }
}

impl<P: SettingsProvider, R: RandomGenerator> MovePolicy<P, R> {
    pub fn with_random_generator<R2: RandomGenerator>(self, random: R2) -> MovePolicy<P, R2> {
        MovePolicy {
            game: self.game,
            provider: self.provider,
            random,
        }
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    /// The configuration the next search on `board` would use.
    ///
    /// Providers are not required to validate what they return. Out-of-range overrides
    /// are clamped, and a non-positive or non-finite time base falls back to the profile.
    pub fn config_for<B: Board>(&self, board: &B) -> SearchConfig {
        let settings = self.provider.settings();
        if let Err(err) = settings.validate() {
            warn!(%err, "provider returned invalid settings, clamping");
        }

        let mut profile = self.game.profile(settings.difficulty);
        if let Some(base) = settings.time_budget_base.filter(|b| b.is_finite() && *b > 0.0) {
            profile.base_time = base;
        }

        SearchConfig {
            max_depth: settings.search_depth.unwrap_or(profile.search_depth).max(1),
            time_budget: profile.thinking_time(board.move_number(), board.complexity()),
            randomness: settings
                .randomness
                .filter(|r| !r.is_nan())
                .unwrap_or(profile.randomness)
                .clamp(0.0, 1.0),
            algorithm: settings.algorithm,
            rollout_depth: settings.rollout_depth.map(|d| d.max(1)),
        }
    }

    /// Picks a move for the side to move. The board is restored before returning.
    pub fn choose_move<B: Board>(&mut self, board: &mut B) -> SearchResult<B::Move> {
        let config = self.config_for(board);
        debug!(game = ?self.game, ?config, "choosing move");
        choose_move_with(board, &config, &mut self.random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::tic_tac_toe::TicTacToeBoard;
    use crate::random::CustomNumberGenerator;
    use crate::search::Algorithm;
    use crate::settings::Settings;
    use std::cell::Cell;

    #[test]
    fn depth_is_tuned_per_game() {
        let depths = |game: GameKind| {
            [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
                .map(|d| game.profile(d).search_depth)
        };

        assert_eq!(depths(GameKind::TicTacToe), [2, 4, 9]);
        assert_eq!(depths(GameKind::ConnectFour), [2, 4, 7]);
        assert_eq!(depths(GameKind::Checkers), [3, 6, 9]);
        assert_eq!(depths(GameKind::Chess), [2, 3, 4]);
    }

    #[test]
    fn randomness_is_scaled_and_clamped() {
        let easy_ttt = GameKind::TicTacToe.profile(Difficulty::Easy);
        let hard_chess = GameKind::Chess.profile(Difficulty::Hard);

        assert!((easy_ttt.randomness - 0.45).abs() < 1e-9);
        assert!((hard_chess.randomness - 0.05).abs() < 1e-9);
        assert!(easy_ttt.randomness <= 1.0);
    }

    #[test]
    fn thinking_time_grows_and_is_clamped() {
        let profile = GameKind::Chess.profile(Difficulty::Hard);

        assert_eq!(profile.thinking_time(0, 0), Duration::from_secs(1));
        assert!(profile.thinking_time(2, 0) > profile.thinking_time(0, 0));
        assert_eq!(profile.thinking_time(500, 500), Duration::from_secs(2));

        let easy = GameKind::TicTacToe.profile(Difficulty::Easy);
        assert_eq!(easy.thinking_time(1000, 1000), Duration::from_secs(5));
    }

    #[test]
    fn thinking_time_below_the_floor_is_raised() {
        let profile = DifficultyProfile {
            base_time: 0.01,
            ..GameKind::TicTacToe.profile(Difficulty::Medium)
        };

        // 0.01 s computed for the opening move of an empty position
        assert_eq!(
            profile.thinking_time(0, 0),
            Duration::from_secs_f64(MIN_THINKING_TIME)
        );
        assert!(profile.thinking_time(0, 9) > Duration::from_secs_f64(MIN_THINKING_TIME));
    }

    #[test]
    fn time_base_override_replaces_the_profile_base() {
        // arrange
        let settings = Settings {
            time_budget_base: Some(0.01),
            ..Settings::default()
        };
        let policy = MovePolicy::new(GameKind::TicTacToe, settings);
        let board = TicTacToeBoard::default();
        let profile = DifficultyProfile {
            base_time: 0.01,
            ..GameKind::TicTacToe.profile(Difficulty::Medium)
        };

        // act
        let config = policy.config_for(&board);

        // assert
        assert_eq!(config.time_budget, profile.thinking_time(0, 9));
    }

    #[test]
    fn unvalidated_provider_values_are_clamped() {
        // arrange
        let provider = || Settings {
            search_depth: Some(0),
            randomness: Some(3.0),
            time_budget_base: Some(-1.0),
            rollout_depth: Some(0),
            ..Settings::default()
        };
        let mut policy = MovePolicy::new(GameKind::TicTacToe, provider)
            .with_random_generator(CustomNumberGenerator::default());
        let mut board = TicTacToeBoard::default();

        // act
        let config = policy.config_for(&board);
        let result = policy.choose_move(&mut board);

        // assert
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.randomness, 1.0);
        assert_eq!(config.rollout_depth, Some(1));
        assert!(config.time_budget >= Duration::from_secs_f64(MIN_THINKING_TIME));
        assert!(result.best_move.is_some());
    }

    #[test]
    fn settings_override_the_profile() {
        let settings = Settings {
            difficulty: Difficulty::Hard,
            search_depth: Some(3),
            randomness: Some(0.0),
            algorithm: Algorithm::Minimax,
            ..Settings::default()
        };
        let policy = MovePolicy::new(GameKind::Chess, settings);

        let config = policy.config_for(&TicTacToeBoard::default());

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.randomness, 0.0);
        assert_eq!(config.algorithm, Algorithm::Minimax);
    }

    #[test]
    fn settings_are_read_before_every_move() {
        // arrange
        let difficulty = Cell::new(Difficulty::Easy);
        let provider = || Settings {
            difficulty: difficulty.get(),
            ..Settings::default()
        };
        let policy = MovePolicy::new(GameKind::TicTacToe, provider);
        let board = TicTacToeBoard::default();

        // act
        let easy = policy.config_for(&board);
        difficulty.set(Difficulty::Hard);
        let hard = policy.config_for(&board);

        // assert
        assert_eq!(easy.max_depth, 2);
        assert_eq!(hard.max_depth, 9);
    }

    #[test]
    fn full_randomness_plays_a_random_legal_move() {
        // arrange
        let settings = Settings {
            randomness: Some(1.0),
            ..Settings::default()
        };
        let mut policy = MovePolicy::new(GameKind::TicTacToe, settings)
            .with_random_generator(CustomNumberGenerator::default());
        let mut board = TicTacToeBoard::from_rows(["X..", ".O.", "..."]).unwrap();

        // act
        let result = policy.choose_move(&mut board);

        // assert
        let mv = result.best_move.unwrap();
        assert!(board.legal_moves().contains(&mv));
        assert_eq!(result.nodes_searched, 0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn zero_randomness_always_searches() {
        // arrange
        let settings = Settings {
            difficulty: Difficulty::Hard,
            randomness: Some(0.0),
            ..Settings::default()
        };
        let mut policy = MovePolicy::new(GameKind::TicTacToe, settings)
            .with_random_generator(CustomNumberGenerator::default());
        let mut board = TicTacToeBoard::from_rows(["XX.", "OO.", "..."]).unwrap();
        let before = board.clone();

        // act
        let results: Vec<_> = (0..5).map(|_| policy.choose_move(&mut board)).collect();

        // assert
        for result in results {
            assert_eq!(result.best_move, Some(2));
            assert!(result.nodes_searched > 0);
        }
        assert_eq!(board, before);
    }
}
