//! Actions a combatant can request on its turn.

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;

/// An action a combatant can request on its turn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionRequest {
    /// Plain weapon attack.
    Attack,
    /// Slower, harder-hitting attack.
    HeavyAttack,
    /// Brace to halve the next hit.
    Defend,
    /// Prepare to slip the next attack.
    Dodge,
    /// Signature move.
    Special,
    /// Recover stamina.
    Rest,
    /// Goad the opponent into a rage.
    Taunt,
    /// Use a catalog skill.
    UseSkill(SkillId),
    /// Do nothing. Forced while stunned.
    Idle,
}

impl ActionRequest {
    /// Returns true if the action attempts to deal damage to the opponent.
    ///
    /// Skills are resolved against the catalog, so this only answers for the
    /// fixed actions.
    pub fn is_attack(&self) -> bool {
        matches!(self, Self::Attack | Self::HeavyAttack | Self::Special)
    }
}

impl std::fmt::Display for ActionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::HeavyAttack => write!(f, "heavy attack"),
            Self::Defend => write!(f, "defend"),
            Self::Dodge => write!(f, "dodge"),
            Self::Special => write!(f, "special"),
            Self::Rest => write!(f, "rest"),
            Self::Taunt => write!(f, "taunt"),
            Self::UseSkill(skill) => write!(f, "skill: {skill}"),
            Self::Idle => write!(f, "idle"),
        }
    }
}
