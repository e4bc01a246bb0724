//! Error types for the combat engine.

use crate::catalog::SkillId;

/// Errors that can occur when validating combat input or loading combat data.
#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    /// A class referenced by a roster entry does not exist in the catalog.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// A skill referenced by an action does not exist in the catalog.
    #[error("unknown skill: {0}")]
    UnknownSkill(SkillId),

    /// The skill exists but cannot be used right now.
    #[error("skill '{skill}' unavailable: {reason}")]
    SkillUnavailable {
        /// The skill that was requested.
        skill: SkillId,
        /// Why the skill cannot be used (cooldown, mana, not learned).
        reason: String,
    },

    /// A combatant was requested at a level outside `1..=max`.
    #[error("invalid level {level}: must be between 1 and {max}")]
    InvalidLevel {
        /// The requested level.
        level: u32,
        /// The highest allowed level.
        max: u32,
    },

    /// The catalog data is malformed.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// The catalog could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;
