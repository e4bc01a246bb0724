//! Turn-based gladiator combat engine for Ludus.
//!
//! Provides the combatant model, a versioned status-effect tracker, the
//! action resolver, a difficulty-driven AI policy, and a match simulator.
//! All randomness flows through the [`Dice`] trait, so every match can be
//! replayed from a seed. Game data (actions, classes, skills) lives in a
//! serde-loadable [`Catalog`] with built-in defaults.

pub mod action;
pub mod ai;
pub mod catalog;
pub mod combatant;
pub mod dice;
pub mod error;
pub mod log;
pub mod resolver;
pub mod simulator;
pub mod status;

pub use action::ActionRequest;
pub use ai::{Difficulty, Personality, choose_action, threat_level};
pub use catalog::{ActionProfile, ActionTable, Catalog, ClassDef, EffectChance, EffectTarget, SkillDef, SkillId, SkillKind};
pub use combatant::{Combatant, CombatantDelta, CombatantId, MAX_LEVEL, MAX_STAT, Posture, Resource, Stats};
pub use dice::{Dice, ScriptedDice, SeededDice, shuffle};
pub use error::{CombatError, CombatResult};
pub use log::{CombatLog, LogEntry, LogKind};
pub use resolver::{AppliedEffect, Outcome, resolve_action, validate_action};
pub use simulator::{
    ActionSource, AiController, Decision, Match, MatchConfig, MatchReport, MatchRules, MatchState,
    ScriptedController, Side,
};
pub use status::{EffectKind, StatusEffect, StatusEffects, tick_combatant};
