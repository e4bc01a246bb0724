//! Combatants: identity, base stats, and clamped resources.
//!
//! A [`Combatant`] is plain data. The resolver and the status tracker are
//! the only code that mutates it during a match; outside combat it belongs to
//! whoever owns the roster, and match results flow back as a
//! [`CombatantDelta`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::SkillId;
use crate::status::{StatusEffect, StatusEffects};

/// Unique identifier for a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub Uuid);

impl CombatantId {
    /// Generate a new random combatant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The five base stats, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Raw power; drives damage.
    pub strength: u32,
    /// Footwork; drives dodging and turn order.
    pub agility: u32,
    /// Precision; drives hit and critical chance.
    pub dexterity: u32,
    /// Staying power; drives stamina.
    pub endurance: u32,
    /// Toughness; drives HP.
    pub constitution: u32,
}

/// Ceiling for any single stat.
pub const MAX_STAT: u32 = 100;

/// Highest level a combatant can be spawned at.
pub const MAX_LEVEL: u32 = 100;

impl Stats {
    /// All five stats set to the same value.
    pub fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            agility: value,
            dexterity: value,
            endurance: value,
            constitution: value,
        }
    }

    /// Stats grown by `per_level` points for every level above the first,
    /// capped at [`MAX_STAT`].
    pub fn scaled(self, level: u32, per_level: u32) -> Self {
        let bonus = level.saturating_sub(1).saturating_mul(per_level);
        let grow = |v: u32| v.saturating_add(bonus).min(MAX_STAT);
        Self {
            strength: grow(self.strength),
            agility: grow(self.agility),
            dexterity: grow(self.dexterity),
            endurance: grow(self.endurance),
            constitution: grow(self.constitution),
        }
    }
}

/// A numeric resource clamped between zero and its maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    current: i32,
    max: i32,
}

impl Resource {
    /// Create a full resource.
    pub fn new(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    /// Create a resource with an explicit current value, clamped to bounds.
    pub fn with_current(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    /// Adjust by a delta, clamping to bounds. Returns the new value.
    pub fn adjust(&mut self, delta: i32) -> i32 {
        self.current = self.current.saturating_add(delta).clamp(0, self.max);
        self.current
    }

    /// Set the current value, clamping to bounds.
    pub fn set(&mut self, value: i32) {
        self.current = value.clamp(0, self.max);
    }

    /// Current value.
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Maximum value.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Returns true if the resource is at zero.
    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    /// Returns true if the resource is at its maximum.
    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Fraction filled, from 0.0 to 1.0. A zero-capacity resource reads as empty.
    pub fn fraction(&self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.current) / f64::from(self.max)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

/// A transient stance that modifies the next incoming attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Posture {
    /// No stance.
    #[default]
    Neutral,
    /// Set by Dodge: better odds of slipping the next attack.
    Evasive,
}

/// A fighter's complete mechanical state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    /// Stable identity.
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// Class tag, a key into the catalog.
    pub class: String,
    /// Experience level.
    pub level: u32,
    /// Base stats.
    pub stats: Stats,
    /// Flat damage added by the equipped weapon.
    pub weapon_damage: u32,
    /// Luck, feeds the critical chance.
    pub luck: u32,
    /// Hit points.
    pub hp: Resource,
    /// Stamina, spent by actions and recovered by resting.
    pub stamina: Resource,
    /// Mana, spent by skills.
    pub mana: Resource,
    /// Active status effects.
    pub effects: StatusEffects,
    /// Skills this combatant knows.
    pub skills: Vec<SkillId>,
    /// Turns left before each skill is usable again.
    pub cooldowns: BTreeMap<SkillId, u32>,
    /// Current stance.
    pub posture: Posture,
}

impl Combatant {
    /// Create a combatant with resources derived from stats and level.
    ///
    /// Max HP is `40 + con + end/2 + 5·level`, max stamina `50 + end`.
    /// Both saturate at `i32::MAX`. Mana starts at zero; classes with skills
    /// set it via [`Self::with_mana`].
    pub fn new(name: impl Into<String>, class: impl Into<String>, level: u32, stats: Stats) -> Self {
        let hp = 40u32
            .saturating_add(stats.constitution)
            .saturating_add(stats.endurance / 2)
            .saturating_add(level.saturating_mul(5));
        let stamina = 50u32.saturating_add(stats.endurance);
        Self {
            id: CombatantId::new(),
            name: name.into(),
            class: class.into(),
            level,
            stats,
            weapon_damage: 0,
            luck: 0,
            hp: Resource::new(clamp_to_i32(hp)),
            stamina: Resource::new(clamp_to_i32(stamina)),
            mana: Resource::new(0),
            effects: StatusEffects::new(),
            skills: Vec::new(),
            cooldowns: BTreeMap::new(),
            posture: Posture::Neutral,
        }
    }

    /// Override max HP (and refill it).
    pub fn with_hp(mut self, max: i32) -> Self {
        self.hp = Resource::new(max);
        self
    }

    /// Override max stamina (and refill it).
    pub fn with_stamina(mut self, max: i32) -> Self {
        self.stamina = Resource::new(max);
        self
    }

    /// Set max mana (and refill it).
    pub fn with_mana(mut self, max: i32) -> Self {
        self.mana = Resource::new(max);
        self
    }

    /// Set the weapon's flat damage.
    pub fn with_weapon_damage(mut self, damage: u32) -> Self {
        self.weapon_damage = damage;
        self
    }

    /// Set luck.
    pub fn with_luck(mut self, luck: u32) -> Self {
        self.luck = luck;
        self
    }

    /// Set the known skills.
    pub fn with_skills(mut self, skills: Vec<SkillId>) -> Self {
        self.skills = skills;
        self
    }

    /// Returns true once HP has reached zero.
    pub fn is_defeated(&self) -> bool {
        self.hp.current() <= 0
    }

    /// Current HP as a fraction of max HP.
    pub fn health_fraction(&self) -> f64 {
        self.hp.fraction()
    }

    /// How spent the combatant is, from 0 (fresh) to 100 (no stamina left).
    pub fn fatigue_percent(&self) -> f64 {
        if self.stamina.max() == 0 {
            return 100.0;
        }
        (1.0 - self.stamina.fraction()) * 100.0
    }

    /// Turns until a skill is usable again (0 if ready).
    pub fn cooldown(&self, skill: &SkillId) -> u32 {
        self.cooldowns.get(skill).copied().unwrap_or(0)
    }

    /// Returns true if the combatant knows the skill.
    pub fn knows(&self, skill: &SkillId) -> bool {
        self.skills.contains(skill)
    }

    /// Snapshot the mutable state a match hands back to its owner.
    pub fn delta(&self) -> CombatantDelta {
        CombatantDelta {
            id: self.id,
            hp: self.hp.current(),
            stamina: self.stamina.current(),
            mana: self.mana.current(),
            cooldowns: self.cooldowns.clone(),
            effects: self.effects.iter().copied().collect(),
        }
    }

    /// Copy post-match state back onto this (roster-owned) combatant.
    ///
    /// Values are clamped to this combatant's own maxima. Effects are
    /// re-applied through the effect collection.
    pub fn apply_delta(&mut self, delta: &CombatantDelta) {
        self.hp.set(delta.hp);
        self.stamina.set(delta.stamina);
        self.mana.set(delta.mana);
        self.cooldowns = delta.cooldowns.clone();
        self.effects.clear();
        for effect in &delta.effects {
            self.effects.apply(effect.kind, effect.remaining);
            for _ in 1..effect.stacks {
                self.effects.apply(effect.kind, effect.remaining);
            }
        }
        self.posture = Posture::Neutral;
    }

    /// Restore a share of missing HP, all stamina and mana, and clear
    /// effects and cooldowns. Used between tournament bouts.
    pub fn recover(&mut self, hp_fraction: f64) {
        let missing = self.hp.max() - self.hp.current();
        let healed = (f64::from(missing) * hp_fraction.clamp(0.0, 1.0)).round() as i32;
        self.hp.adjust(healed.max(1));
        self.stamina.set(self.stamina.max());
        self.mana.set(self.mana.max());
        self.effects.clear();
        self.cooldowns.clear();
        self.posture = Posture::Neutral;
    }
}

fn clamp_to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// The state a finished match hands back for one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantDelta {
    /// Which combatant this delta belongs to.
    pub id: CombatantId,
    /// HP at the end of the match.
    pub hp: i32,
    /// Stamina at the end of the match.
    pub stamina: i32,
    /// Mana at the end of the match.
    pub mana: i32,
    /// Cooldowns still running.
    pub cooldowns: BTreeMap<SkillId, u32>,
    /// Effects still attached.
    pub effects: Vec<StatusEffect>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::EffectKind;

    fn gladiator() -> Combatant {
        Combatant::new("Spartacus", "thraex", 1, Stats::uniform(40))
    }

    #[test]
    fn derived_resources() {
        let c = gladiator();
        assert_eq!(c.hp.max(), 40 + 40 + 20 + 5);
        assert_eq!(c.stamina.max(), 90);
        assert_eq!(c.mana.max(), 0);
        assert!(c.hp.is_full());
    }

    #[test]
    fn resource_adjust_clamps() {
        let mut r = Resource::new(10);
        assert_eq!(r.adjust(5), 10);
        assert_eq!(r.adjust(-30), 0);
        assert!(r.is_empty());
        assert_eq!(r.adjust(i32::MAX), 10);
    }

    #[test]
    fn resource_with_current_clamps() {
        assert_eq!(Resource::with_current(50, 10).current(), 10);
        assert_eq!(Resource::with_current(-5, 10).current(), 0);
    }

    #[test]
    fn resource_fraction_and_display() {
        let mut r = Resource::new(120);
        r.adjust(-60);
        assert!((r.fraction() - 0.5).abs() < f64::EPSILON);
        assert_eq!(r.to_string(), "60/120");
        assert!(Resource::new(0).fraction().abs() < f64::EPSILON);
    }

    #[test]
    fn defeat_and_health_fraction() {
        let mut c = gladiator().with_hp(100);
        c.hp.adjust(-75);
        assert!((c.health_fraction() - 0.25).abs() < f64::EPSILON);
        assert!(!c.is_defeated());
        c.hp.adjust(-25);
        assert!(c.is_defeated());
    }

    #[test]
    fn fatigue_tracks_stamina() {
        let mut c = gladiator().with_stamina(100);
        assert!(c.fatigue_percent().abs() < f64::EPSILON);
        c.stamina.adjust(-40);
        assert!((c.fatigue_percent() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn stats_scale_with_level() {
        let s = Stats::uniform(50).scaled(4, 2);
        assert_eq!(s.strength, 56);
        assert_eq!(Stats::uniform(99).scaled(10, 2).agility, 100);
        assert_eq!(Stats::uniform(30).scaled(0, 2).agility, 30);
        assert_eq!(Stats::uniform(30).scaled(u32::MAX, u32::MAX).agility, MAX_STAT);
    }

    #[test]
    fn extreme_inputs_saturate_resources() {
        let c = Combatant::new("Titan", "murmillo", u32::MAX, Stats::uniform(u32::MAX));
        assert_eq!(c.hp.max(), i32::MAX);
        assert_eq!(c.stamina.max(), i32::MAX);
        assert!(c.hp.is_full());
    }

    #[test]
    fn delta_round_trips_onto_roster_copy() {
        let roster = gladiator().with_hp(100).with_mana(30);
        let mut in_match = roster.clone();
        in_match.hp.adjust(-35);
        in_match.mana.adjust(-10);
        in_match.effects.apply(EffectKind::Bleeding, 2);
        in_match.effects.apply(EffectKind::Bleeding, 2);
        in_match.cooldowns.insert(SkillId::from("bandage"), 2);

        let mut back = roster.clone();
        back.apply_delta(&in_match.delta());
        assert_eq!(back.hp.current(), 65);
        assert_eq!(back.mana.current(), 20);
        assert_eq!(back.effects.get(EffectKind::Bleeding).unwrap().stacks, 2);
        assert_eq!(back.cooldown(&SkillId::from("bandage")), 2);
    }

    #[test]
    fn recover_between_bouts() {
        let mut c = gladiator().with_hp(100);
        c.hp.adjust(-100);
        c.stamina.adjust(-50);
        c.effects.apply(EffectKind::Stunned, 2);
        c.recover(0.5);
        assert_eq!(c.hp.current(), 50);
        assert!(c.stamina.is_full());
        assert!(c.effects.is_empty());

        let mut full = gladiator();
        full.recover(0.5);
        assert!(full.hp.is_full());
    }

    #[test]
    fn id_display_is_short() {
        assert_eq!(CombatantId::new().to_string().len(), 8);
    }
}
