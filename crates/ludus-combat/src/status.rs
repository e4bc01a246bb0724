//! Status effects and the per-turn tracker that decays them.
//!
//! Effects are stored on the combatant as an owned [`StatusEffects`]
//! collection. Every transition goes through its methods, and each one bumps
//! the collection's version. Stat modifiers are never folded into base stats;
//! the resolver reads them live, so removing an effect is always exact.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::log::{CombatLog, LogEntry, LogKind};

/// The closed set of status effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Damage over time, stacks up to three times.
    Bleeding,
    /// Forces the owner to skip its action.
    Stunned,
    /// Worn out: weaker blows, slower footwork.
    Exhausted,
    /// Hits harder but less accurately.
    Enraged,
    /// Braced behind the shield: halves the next incoming hit.
    Defended,
    /// Entangled in a net: poor accuracy and almost no dodging.
    Netted,
    /// Hampered movement: worse dodging, acts last.
    Slowed,
}

impl EffectKind {
    /// Every effect kind, in a fixed order.
    pub const ALL: [EffectKind; 7] = [
        Self::Bleeding,
        Self::Stunned,
        Self::Exhausted,
        Self::Enraged,
        Self::Defended,
        Self::Netted,
        Self::Slowed,
    ];

    /// Maximum number of stacks. Non-stackable kinds are fixed at 1.
    pub fn max_stacks(self) -> u32 {
        match self {
            Self::Bleeding => 3,
            _ => 1,
        }
    }

    /// Returns true if applying the effect again adds a stack.
    pub fn is_stackable(self) -> bool {
        self.max_stacks() > 1
    }

    /// HP lost per stack at each tick.
    pub fn damage_per_turn(self) -> u32 {
        match self {
            Self::Bleeding => 4,
            _ => 0,
        }
    }

    /// Flat change to the owner's hit chance when attacking.
    pub fn accuracy_modifier(self) -> f64 {
        match self {
            Self::Enraged | Self::Netted => -10.0,
            _ => 0.0,
        }
    }

    /// Flat change to the owner's dodge chance when defending.
    pub fn dodge_modifier(self) -> f64 {
        match self {
            Self::Netted => -20.0,
            Self::Exhausted | Self::Slowed => -10.0,
            _ => 0.0,
        }
    }

    /// Multiplier on damage the owner deals.
    pub fn outgoing_damage_multiplier(self) -> f64 {
        match self {
            Self::Enraged => 1.25,
            Self::Exhausted => 0.8,
            _ => 1.0,
        }
    }

    /// Multiplier on damage the owner receives.
    pub fn incoming_damage_multiplier(self) -> f64 {
        match self {
            Self::Defended => 0.5,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for EffectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bleeding => write!(f, "bleeding"),
            Self::Stunned => write!(f, "stunned"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Enraged => write!(f, "enraged"),
            Self::Defended => write!(f, "defended"),
            Self::Netted => write!(f, "netted"),
            Self::Slowed => write!(f, "slowed"),
        }
    }
}

/// An effect currently attached to a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// What kind of effect this is.
    pub kind: EffectKind,
    /// Turns left before the effect expires. Always positive while attached.
    pub remaining: u32,
    /// Current stack count, between 1 and `kind.max_stacks()`.
    pub stacks: u32,
    /// Set when attached or refreshed; cleared once the owner acts. A fresh
    /// effect is not counted down by the next tick, so its duration is spent
    /// on the owner's own turns.
    #[serde(skip)]
    pub fresh: bool,
}

/// The state of an effect right after it was attached or refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectApplication {
    /// The effect that was applied.
    pub kind: EffectKind,
    /// Its duration after application.
    pub duration: u32,
    /// Its stack count after application.
    pub stacks: u32,
    /// True if the effect was already present and got refreshed.
    pub refreshed: bool,
}

/// What one tracker tick did to an effect collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectTick {
    /// Damage dealt by damage-over-time effects that survived the tick.
    pub bleed_damage: u32,
    /// Stacks of bleeding that dealt damage (0 if none).
    pub bleed_stacks: u32,
    /// Effects that reached zero duration and were removed.
    pub expired: Vec<EffectKind>,
}

/// The owned, versioned effect list of a single combatant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    effects: Vec<StatusEffect>,
    version: u64,
}

impl StatusEffects {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach or refresh an effect.
    ///
    /// Refreshing replaces the remaining duration with `duration`; stackable
    /// kinds also gain a stack up to their maximum. Either way the effect is
    /// marked fresh. A zero duration is ignored and returns `None`.
    pub fn apply(&mut self, kind: EffectKind, duration: u32) -> Option<EffectApplication> {
        if duration == 0 {
            return None;
        }
        self.version += 1;
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.remaining = duration;
            existing.fresh = true;
            if kind.is_stackable() {
                existing.stacks = (existing.stacks + 1).min(kind.max_stacks());
            }
            return Some(EffectApplication {
                kind,
                duration,
                stacks: existing.stacks,
                refreshed: true,
            });
        }
        self.effects.push(StatusEffect {
            kind,
            remaining: duration,
            stacks: 1,
            fresh: true,
        });
        Some(EffectApplication {
            kind,
            duration,
            stacks: 1,
            refreshed: false,
        })
    }

    /// Remove an effect outright, returning it if it was present.
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffect> {
        let pos = self.effects.iter().position(|e| e.kind == kind)?;
        self.version += 1;
        Some(self.effects.remove(pos))
    }

    /// Remove every effect.
    pub fn clear(&mut self) {
        if !self.effects.is_empty() {
            self.version += 1;
            self.effects.clear();
        }
    }

    /// Mark every effect as seen by its owner's action for this turn.
    pub fn settle(&mut self) {
        for effect in &mut self.effects {
            effect.fresh = false;
        }
    }

    /// Advance every effect by one turn.
    ///
    /// Effects still fresh (attached after the owner acted) only lose the
    /// fresh mark. The rest are decremented. Bleeding that is still active
    /// after the decrement deals `damage_per_turn × stacks`; anything at zero
    /// is dropped. The caller applies the returned damage to HP.
    pub fn tick(&mut self) -> EffectTick {
        let mut report = EffectTick::default();
        if self.effects.is_empty() {
            return report;
        }
        self.version += 1;
        for effect in &mut self.effects {
            if effect.fresh {
                effect.fresh = false;
                continue;
            }
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining > 0 && effect.kind.damage_per_turn() > 0 {
                report.bleed_damage += effect.kind.damage_per_turn() * effect.stacks;
                report.bleed_stacks += effect.stacks;
            }
        }
        self.effects.retain(|e| {
            if e.remaining == 0 {
                report.expired.push(e.kind);
                false
            } else {
                true
            }
        });
        report
    }

    /// Look up an active effect.
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Returns true if the effect is active.
    pub fn has(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    /// Returns true if the owner must skip its next action.
    pub fn is_stunned(&self) -> bool {
        self.has(EffectKind::Stunned)
    }

    /// Iterate over the active effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Number of active effects.
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Returns true if no effect is active.
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Monotonic counter bumped on every transition.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Sum of accuracy modifiers from all active effects.
    pub fn accuracy_modifier(&self) -> f64 {
        self.effects.iter().map(|e| e.kind.accuracy_modifier()).sum()
    }

    /// Sum of dodge modifiers from all active effects.
    pub fn dodge_modifier(&self) -> f64 {
        self.effects.iter().map(|e| e.kind.dodge_modifier()).sum()
    }

    /// Product of outgoing damage multipliers from all active effects.
    pub fn outgoing_damage_multiplier(&self) -> f64 {
        self.effects
            .iter()
            .map(|e| e.kind.outgoing_damage_multiplier())
            .product()
    }
}

/// Run the end-of-turn tracker for one combatant.
///
/// Ticks status effects, applies bleed damage to HP, counts skill cooldowns
/// down, and records what happened in the combat log.
pub fn tick_combatant(combatant: &mut Combatant, turn: u32, log: &mut CombatLog) -> EffectTick {
    let report = combatant.effects.tick();

    if report.bleed_damage > 0 {
        let before = combatant.hp.current();
        combatant.hp.adjust(-(report.bleed_damage as i32));
        let lost = (before - combatant.hp.current()) as u32;
        tracing::debug!(
            fighter = %combatant.name,
            damage = lost,
            stacks = report.bleed_stacks,
            "bleed tick"
        );
        log.push(LogEntry {
            turn,
            actor: combatant.id,
            action: None,
            damage: Some(lost),
            kind: LogKind::Bled {
                stacks: report.bleed_stacks,
            },
        });
    }

    for kind in &report.expired {
        log.push(LogEntry {
            turn,
            actor: combatant.id,
            action: None,
            damage: None,
            kind: LogKind::EffectExpired { effect: *kind },
        });
    }

    combatant.cooldowns.retain(|_, remaining| {
        *remaining = remaining.saturating_sub(1);
        *remaining > 0
    });

    report
}
