//! Stage and placement rewards.
//!
//! The table is game-design data loaded like the combat catalog. Lookups are
//! pure; the tournament decides when a reward is granted.

use std::fmt;
use std::ops::AddAssign;

use ludus_combat::CombatantId;
use serde::{Deserialize, Serialize};

use crate::bracket::BracketFormat;
use crate::error::TournamentResult;

/// Gold and fame paid out together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    /// Coin.
    pub gold: u32,
    /// Renown.
    pub fame: u32,
}

impl Reward {
    /// A reward of `gold` and `fame`.
    pub fn new(gold: u32, fame: u32) -> Self {
        Self { gold, fame }
    }
}

/// Totals saturate at `u32::MAX` instead of wrapping.
impl AddAssign for Reward {
    fn add_assign(&mut self, rhs: Self) {
        self.gold = self.gold.saturating_add(rhs.gold);
        self.fame = self.fame.saturating_add(rhs.fame);
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} gold, {} fame", self.gold, self.fame)
    }
}

/// The stage a match belongs to, for reward lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKey {
    /// Last two standing.
    Final,
    /// Last four.
    Semifinal,
    /// Last eight.
    Quarterfinal,
    /// An earlier knockout round with this many entrants.
    RoundOf(usize),
    /// A match in a format without knockout stages.
    Bout,
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Final => write!(f, "final"),
            Self::Semifinal => write!(f, "semifinal"),
            Self::Quarterfinal => write!(f, "quarterfinal"),
            Self::RoundOf(n) => write!(f, "round of {n}"),
            Self::Bout => write!(f, "bout"),
        }
    }
}

/// Classify a round of a bracket.
pub fn stage_key(format: BracketFormat, bracket_size: usize, round: usize) -> StageKey {
    if format != BracketFormat::SingleElimination {
        return StageKey::Bout;
    }
    match bracket_size.checked_shr(round as u32).unwrap_or(0) {
        0..=2 => StageKey::Final,
        3..=4 => StageKey::Semifinal,
        5..=8 => StageKey::Quarterfinal,
        n => StageKey::RoundOf(n),
    }
}

/// Why a reward was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardReason {
    /// Winning a match at this stage.
    Stage(StageKey),
    /// Winning the tournament.
    Champion,
    /// Finishing second.
    RunnerUp,
}

impl fmt::Display for RewardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stage(stage) => write!(f, "{stage} win"),
            Self::Champion => write!(f, "champion"),
            Self::RunnerUp => write!(f, "runner-up"),
        }
    }
}

/// A reward paid to one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// Who is paid.
    pub recipient: CombatantId,
    /// What for.
    pub reason: RewardReason,
    /// How much.
    pub reward: Reward,
}

/// Payouts per stage plus placement bonuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTable {
    /// Winning the final.
    #[serde(rename = "final")]
    pub final_match: Reward,
    /// Winning a semifinal.
    pub semifinal: Reward,
    /// Winning a quarterfinal.
    pub quarterfinal: Reward,
    /// Winning any earlier knockout round.
    pub early_round: Reward,
    /// Winning a round-robin or gauntlet bout.
    pub bout: Reward,
    /// Placement bonus for the champion.
    pub champion: Reward,
    /// Placement bonus for second place.
    pub runner_up: Reward,
}

impl RewardTable {
    /// Built-in payouts.
    pub fn standard() -> Self {
        Self {
            final_match: Reward::new(500, 50),
            semifinal: Reward::new(250, 25),
            quarterfinal: Reward::new(120, 12),
            early_round: Reward::new(60, 6),
            bout: Reward::new(80, 8),
            champion: Reward::new(1000, 100),
            runner_up: Reward::new(400, 40),
        }
    }

    /// Parse a table from JSON.
    pub fn from_json(json: &str) -> TournamentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Payout for winning a match at `stage`.
    pub fn stage(&self, stage: StageKey) -> Reward {
        match stage {
            StageKey::Final => self.final_match,
            StageKey::Semifinal => self.semifinal,
            StageKey::Quarterfinal => self.quarterfinal,
            StageKey::RoundOf(_) => self.early_round,
            StageKey::Bout => self.bout,
        }
    }

    /// Payout for a grant reason.
    pub fn lookup(&self, reason: RewardReason) -> Reward {
        match reason {
            RewardReason::Stage(stage) => self.stage(stage),
            RewardReason::Champion => self.champion,
            RewardReason::RunnerUp => self.runner_up,
        }
    }
}

impl Default for RewardTable {
    fn default() -> Self {
        Self::standard()
    }
}
