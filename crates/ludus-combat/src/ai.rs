//! Difficulty-driven action selection for computer-controlled fighters.
//!
//! The policy is a pure function of the battlefield and a [`Personality`];
//! it keeps no memory between turns.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::catalog::{EffectTarget, SkillDef, SkillKind};
use crate::combatant::Combatant;
use crate::dice::Dice;

/// Health fraction below which a fighter is in critical condition.
pub const CRITICAL_HEALTH: f64 = 0.20;
/// Health fraction below which a fighter starts to look after itself.
pub const LOW_HEALTH: f64 = 0.40;
/// Threat level above which a clever fighter commits its skills.
pub const THREAT_TRIGGER: f64 = 50.0;

/// Four weights in `[0, 1]` that shape the policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Preference for attacking over defending or resting.
    pub aggression: f64,
    /// Likelihood of spending a turn on a skill.
    pub skill_usage: f64,
    /// Willingness to heal or defend when hurt.
    pub preservation: f64,
    /// Above 0.7 the fighter reads the threat level before using skills.
    pub intelligence: f64,
}

/// Difficulty tier; each maps to a fixed personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Timid and careless.
    Easy,
    /// Balanced.
    #[default]
    Normal,
    /// Aggressive and skill-savvy.
    Hard,
    /// Relentless.
    Nightmare,
}

impl Difficulty {
    /// Every tier, easiest first.
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Normal, Self::Hard, Self::Nightmare];

    /// Parse a tier name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.to_string().eq_ignore_ascii_case(s))
    }

    /// The personality used at this tier.
    pub fn personality(self) -> Personality {
        let (aggression, skill_usage, preservation, intelligence) = match self {
            Self::Easy => (0.40, 0.20, 0.30, 0.20),
            Self::Normal => (0.60, 0.40, 0.50, 0.50),
            Self::Hard => (0.70, 0.60, 0.60, 0.80),
            Self::Nightmare => (0.85, 0.80, 0.70, 1.00),
        };
        Personality {
            aggression,
            skill_usage,
            preservation,
            intelligence,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Normal => write!(f, "normal"),
            Self::Hard => write!(f, "hard"),
            Self::Nightmare => write!(f, "nightmare"),
        }
    }
}

/// How dangerous the situation looks to `me`, from 0 to 100.
pub fn threat_level(me: &Combatant, opponent: &Combatant) -> f64 {
    let strength_ratio = f64::from(opponent.stats.strength) / f64::from(me.stats.strength.max(1));
    let raw = 0.3 * opponent.health_fraction() * 100.0
        + 30.0 * strength_ratio
        + 0.4 * (100.0 - me.health_fraction() * 100.0);
    raw.clamp(0.0, 100.0)
}

/// Pick an action for `me`.
///
/// `available` must hold only skills `me` can use right now (see
/// [`crate::Catalog::available_skills`]). The first matching rule wins:
/// heal or defend when critical, heal when low, use a skill, and
/// finally attack, defend, or rest by aggression.
pub fn choose_action(
    me: &Combatant,
    opponent: &Combatant,
    available: &[&SkillDef],
    personality: &Personality,
    dice: &mut dyn Dice,
) -> ActionRequest {
    let health = me.health_fraction();
    let healing = available.iter().find(|s| s.kind == SkillKind::Healing);

    if health < CRITICAL_HEALTH {
        if let Some(skill) = healing.filter(|_| dice.probability(personality.preservation)) {
            return ActionRequest::UseSkill(skill.id.clone());
        }
        if dice.probability(0.8 * personality.preservation) {
            return ActionRequest::Defend;
        }
    } else if health < LOW_HEALTH {
        if let Some(skill) = healing.filter(|_| dice.probability(0.6 * personality.preservation)) {
            return ActionRequest::UseSkill(skill.id.clone());
        }
    }

    if let Some(skill) = pick_combat_skill(me, available) {
        let commit = if personality.intelligence > 0.7 {
            threat_level(me, opponent) > THREAT_TRIGGER || dice.probability(personality.skill_usage)
        } else {
            dice.probability(personality.skill_usage)
        };
        if commit {
            return ActionRequest::UseSkill(skill.id.clone());
        }
    }

    let roll = dice.percent() / 100.0;
    if roll < personality.aggression {
        if me.stamina.is_empty() {
            ActionRequest::Rest
        } else {
            ActionRequest::Attack
        }
    } else if roll < personality.aggression + 0.2 {
        ActionRequest::Defend
    } else {
        ActionRequest::Rest
    }
}

/// First offensive skill, or failing that a buff whose self effects are not
/// already running.
fn pick_combat_skill<'a>(me: &Combatant, available: &[&'a SkillDef]) -> Option<&'a SkillDef> {
    available
        .iter()
        .copied()
        .find(|s| s.kind == SkillKind::Offensive)
        .or_else(|| {
            available.iter().copied().find(|s| {
                s.kind == SkillKind::Buff
                    && s.effects
                        .iter()
                        .filter(|e| e.target == EffectTarget::User)
                        .any(|e| !me.effects.has(e.kind))
            })
        })
}
