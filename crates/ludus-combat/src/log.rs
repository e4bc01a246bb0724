//! Append-only record of everything that happened in a match.

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::combatant::CombatantId;
use crate::status::EffectKind;

/// What a log entry records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogKind {
    /// An attack landed.
    Hit {
        /// The blow was a critical.
        critical: bool,
        /// The defender was braced and took half damage.
        blocked: bool,
    },
    /// An attack failed the hit roll.
    Missed,
    /// An attack was dodged.
    Dodged,
    /// The actor braced behind its shield.
    Defending,
    /// The actor took an evasive stance.
    Evading,
    /// The actor rested.
    Rested {
        /// Stamina recovered.
        recovered: i32,
    },
    /// The actor taunted its opponent.
    Taunted,
    /// The actor used a skill on itself.
    Buffed,
    /// The actor healed.
    Healed {
        /// HP restored.
        amount: i32,
    },
    /// An effect was attached to `target`.
    EffectApplied {
        /// Who received the effect.
        target: CombatantId,
        /// The effect.
        effect: EffectKind,
        /// Stack count after application.
        stacks: u32,
    },
    /// An effect on the actor ran out.
    EffectExpired {
        /// The effect.
        effect: EffectKind,
    },
    /// Bleeding dealt damage to the actor.
    Bled {
        /// Stacks that bled.
        stacks: u32,
    },
    /// The actor lost its turn to a stun.
    Stunned,
    /// The actor did nothing.
    Idle,
    /// The actor ran out of stamina.
    Exhausted,
    /// The actor yielded.
    Submitted,
    /// The actor was knocked out.
    KnockedOut,
    /// The judges awarded the match to the actor.
    JudgeDecision,
    /// The actor died in the arena.
    Died,
}

/// One entry in the combat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Turn number, starting at 1 (0 for pre-match decisions).
    pub turn: u32,
    /// The combatant the entry is about.
    pub actor: CombatantId,
    /// The action being resolved, if any.
    pub action: Option<ActionRequest>,
    /// Damage dealt or taken, if any.
    pub damage: Option<u32>,
    /// What happened.
    pub kind: LogKind,
}

/// Ordered, append-only combat log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// All entries in order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries recorded during a given turn.
    pub fn for_turn(&self, turn: u32) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.turn == turn)
    }

    /// Entries about a given combatant.
    pub fn for_actor(&self, actor: CombatantId) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.actor == actor)
    }

    /// Total hit damage dealt by a combatant.
    pub fn damage_by(&self, actor: CombatantId) -> u32 {
        self.for_actor(actor)
            .filter(|e| matches!(e.kind, LogKind::Hit { .. }))
            .filter_map(|e| e.damage)
            .sum()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
