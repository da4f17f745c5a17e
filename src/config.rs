use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// Settings for a game session, stored as TOML. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_fen: String,
    /// Plies without a pawn move or capture before the fifty-move flag is raised
    pub fifty_move_plies: u32,
    /// Occurrences of one position that count as a repetition draw
    pub repetition_count: usize,
    pub log_level: String,
    pub file_logging: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_fen: START_FEN.to_string(),
            fifty_move_plies: FIFTY_MOVE_PLIES,
            repetition_count: REPETITION_COUNT,
            log_level: "info".to_string(),
            file_logging: false,
        }
    }
}

impl GameConfig {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> miette::Result<()> {
        let toml_string = toml::to_string_pretty(self).into_diagnostic()?;
        fs::write(path, toml_string).into_diagnostic()?;
        Ok(())
    }

    /// Load from a TOML File
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> miette::Result<Self> {
        let path = path.as_ref();
        let file_content = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("Reading config from {}", path.display()))?;
        let config: Self = toml::from_str(&file_content).into_diagnostic()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> miette::Result<()> {
        miette::ensure!(self.fifty_move_plies > 0, "fifty_move_plies must be positive");
        miette::ensure!(
            self.repetition_count > 1,
            "repetition_count must be at least 2, got {}",
            self.repetition_count
        );
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> miette::Result<Level> {
        Level::from_str(&self.log_level)
            .into_diagnostic()
            .with_context(|| format!("Invalid log level {:?}", self.log_level))
    }

    /// Applies the logging settings to the global subscriber
    pub fn apply_logging(&self) -> miette::Result<()> {
        set_log_level(self.level()?)?;
        toggle_file_logging(self.file_logging)
    }
}
