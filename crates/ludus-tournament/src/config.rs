//! Tournament settings and the per-match config derived from them.

use ludus_combat::{MatchConfig, MatchRules};
use serde::{Deserialize, Serialize};

use crate::bracket::BracketFormat;

/// Configuration for a tournament run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Bracket format.
    pub format: BracketFormat,
    /// Bracket size for single elimination. `None` = next power of two.
    pub size: Option<usize>,
    /// Rules every match is fought under.
    pub rules: MatchRules,
    /// Turn limit per match.
    pub max_turns: u32,
    /// RNG seed for seeding and every match.
    pub seed: u64,
    /// Share of missing HP restored between matches (0.0 - 1.0).
    pub recovery: f64,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            format: BracketFormat::SingleElimination,
            size: None,
            rules: MatchRules::Exhibition,
            max_turns: 30,
            seed: 42,
            recovery: 0.5,
        }
    }
}

impl TournamentConfig {
    /// Set the bracket format.
    pub fn with_format(mut self, format: BracketFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the single-elimination bracket size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Set the match rules.
    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the per-match turn limit.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the between-match recovery share, clamped to 0.0 - 1.0.
    pub fn with_recovery(mut self, recovery: f64) -> Self {
        self.recovery = recovery.clamp(0.0, 1.0);
        self
    }

    /// The per-match configuration derived from this one.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::default()
            .with_rules(self.rules)
            .with_max_rounds(self.max_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = TournamentConfig::default();
        assert_eq!(config.format, BracketFormat::SingleElimination);
        assert_eq!(config.size, None);
        assert_eq!(config.seed, 42);
        assert!((config.recovery - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn config_builder_chain() {
        let config = TournamentConfig::default()
            .with_format(BracketFormat::Gauntlet)
            .with_rules(MatchRules::Death)
            .with_max_turns(12)
            .with_seed(7)
            .with_recovery(3.0);
        assert_eq!(config.format, BracketFormat::Gauntlet);
        assert!((config.recovery - 1.0).abs() < f64::EPSILON);

        let m = config.match_config();
        assert_eq!(m.rules, MatchRules::Death);
        assert_eq!(m.max_rounds, 12);
    }
}
