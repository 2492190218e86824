//! User-tunable search settings.
//!
//! Every field is optional in the TOML source; missing fields fall back to the
//! difficulty profile. A minimal file:
//!
//! ```toml
//! difficulty = "hard"
//! algorithm = "mcts"
//! randomness = 0.05
//! ```

use crate::error::SettingsError;
use crate::policy::Difficulty;
use crate::search::Algorithm;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Replaces the depth derived from the difficulty.
    pub search_depth: Option<u32>,
    /// Replaces the random-move probability derived from the difficulty.
    pub randomness: Option<f64>,
    /// Replaces the base thinking time, in seconds.
    pub time_budget_base: Option<f64>,
    pub algorithm: Algorithm,
    /// Caps MCTS rollouts at this many plies.
    pub rollout_depth: Option<u32>,
}

impl Settings {
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(randomness) = self.randomness {
            if !(0.0..=1.0).contains(&randomness) {
                return Err(SettingsError::Invalid(format!(
                    "randomness must be within [0, 1], got {randomness}"
                )));
            }
        }

        if self.search_depth == Some(0) {
            return Err(SettingsError::Invalid(
                "search_depth must be at least 1".to_string(),
            ));
        }

        if self.rollout_depth == Some(0) {
            return Err(SettingsError::Invalid(
                "rollout_depth must be at least 1".to_string(),
            ));
        }

        if let Some(base) = self.time_budget_base {
            if !base.is_finite() || base <= 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "time_budget_base must be a positive number of seconds, got {base}"
                )));
            }
        }

        Ok(())
    }
}

/// Supplies the settings a [`MovePolicy`](crate::policy::MovePolicy) reads before
/// every move, so a session can change difficulty between moves.
pub trait SettingsProvider {
    fn settings(&self) -> Settings;
}

impl SettingsProvider for Settings {
    fn settings(&self) -> Settings {
        self.clone()
    }
}

impl<F: Fn() -> Settings> SettingsProvider for F {
    fn settings(&self) -> Settings {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_gives_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.difficulty, Difficulty::Medium);
        assert_eq!(settings.algorithm, Algorithm::AlphaBeta);
    }

    #[test]
    fn parses_every_field() {
        let settings = Settings::from_toml_str(
            r#"
            difficulty = "hard"
            search_depth = 7
            randomness = 0.05
            time_budget_base = 1.5
            algorithm = "mcts"
            rollout_depth = 40
            "#,
        )
        .unwrap();

        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.search_depth, Some(7));
        assert_eq!(settings.randomness, Some(0.05));
        assert_eq!(settings.time_budget_base, Some(1.5));
        assert_eq!(settings.algorithm, Algorithm::Mcts);
        assert_eq!(settings.rollout_depth, Some(40));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for source in [
            "randomness = 1.5",
            "randomness = -0.1",
            "search_depth = 0",
            "rollout_depth = 0",
            "time_budget_base = 0.0",
        ] {
            assert!(
                matches!(
                    Settings::from_toml_str(source),
                    Err(SettingsError::Invalid(_))
                ),
                "{source}"
            );
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            Settings::from_toml_str("difficulty = \"impossible\""),
            Err(SettingsError::Parse(_))
        ));
        assert!(matches!(
            Settings::from_toml_str("colour = \"red\""),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = Settings::load("/definitely/not/here/settings.toml");
        assert!(matches!(result, Err(SettingsError::Read(_))));
    }

    #[test]
    fn closures_provide_settings() {
        let provider = || Settings {
            difficulty: Difficulty::Easy,
            ..Settings::default()
        };
        assert_eq!(provider.settings().difficulty, Difficulty::Easy);
    }
}
