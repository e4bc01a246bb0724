//! Data tables consumed by the engine: the fixed action table, classes, and skills.
//!
//! Everything here is game-design data. [`Catalog::standard`] ships a
//! default set, and [`Catalog::from_json`] loads a replacement. Class-specific
//! behaviour is expressed as data (a class lists its skills) and resolved through
//! one generic lookup, so the resolver never branches on class names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::combatant::{Combatant, MAX_LEVEL, MAX_STAT, Stats};
use crate::error::{CombatError, CombatResult};
use crate::status::EffectKind;

/// Identifier of a skill in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

impl From<&str> for SkillId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who a conditional effect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    /// The opponent.
    #[default]
    Opponent,
    /// The combatant performing the action.
    User,
}

/// An effect an action may attach, with its independent chance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectChance {
    /// Which effect.
    pub kind: EffectKind,
    /// Chance to apply, in percent.
    pub chance: f64,
    /// Duration in turns when applied.
    pub duration: u32,
    /// Who receives the effect.
    #[serde(default)]
    pub target: EffectTarget,
}

impl EffectChance {
    /// An effect aimed at the opponent.
    pub fn on_opponent(kind: EffectKind, chance: f64, duration: u32) -> Self {
        Self {
            kind,
            chance,
            duration,
            target: EffectTarget::Opponent,
        }
    }

    /// An effect aimed at the user.
    pub fn on_user(kind: EffectKind, chance: f64, duration: u32) -> Self {
        Self {
            kind,
            chance,
            duration,
            target: EffectTarget::User,
        }
    }
}

/// Cost, power, and side effects of one of the fixed actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProfile {
    /// Stamina spent; negative values recover stamina.
    pub stamina_cost: i32,
    /// Multiplier on base damage (0 for non-damaging actions).
    pub damage_multiplier: f64,
    /// Flat change to hit chance.
    pub accuracy_modifier: f64,
    /// Conditional effects rolled after a hit (or on use, for Taunt).
    #[serde(default)]
    pub effects: Vec<EffectChance>,
}

impl ActionProfile {
    fn new(stamina_cost: i32, damage_multiplier: f64, accuracy_modifier: f64) -> Self {
        Self {
            stamina_cost,
            damage_multiplier,
            accuracy_modifier,
            effects: Vec::new(),
        }
    }

    fn with_effect(mut self, effect: EffectChance) -> Self {
        self.effects.push(effect);
        self
    }
}

/// The seven fixed actions every combatant can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTable {
    /// Plain attack.
    pub attack: ActionProfile,
    /// Slow, powerful attack.
    pub heavy_attack: ActionProfile,
    /// Brace for the next hit.
    pub defend: ActionProfile,
    /// Prepare to slip the next attack.
    pub dodge: ActionProfile,
    /// Signature move.
    pub special: ActionProfile,
    /// Catch breath.
    pub rest: ActionProfile,
    /// Goad the opponent.
    pub taunt: ActionProfile,
}

impl ActionTable {
    /// Profile for a fixed action. Skills and `Idle` have none.
    pub fn profile(&self, action: &ActionRequest) -> Option<&ActionProfile> {
        match action {
            ActionRequest::Attack => Some(&self.attack),
            ActionRequest::HeavyAttack => Some(&self.heavy_attack),
            ActionRequest::Defend => Some(&self.defend),
            ActionRequest::Dodge => Some(&self.dodge),
            ActionRequest::Special => Some(&self.special),
            ActionRequest::Rest => Some(&self.rest),
            ActionRequest::Taunt => Some(&self.taunt),
            ActionRequest::UseSkill(_) | ActionRequest::Idle => None,
        }
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self {
            attack: ActionProfile::new(10, 1.0, 0.0)
                .with_effect(EffectChance::on_opponent(EffectKind::Bleeding, 10.0, 3)),
            heavy_attack: ActionProfile::new(25, 1.6, -15.0)
                .with_effect(EffectChance::on_opponent(EffectKind::Stunned, 15.0, 1)),
            defend: ActionProfile::new(5, 0.0, 0.0),
            dodge: ActionProfile::new(8, 0.0, 0.0),
            special: ActionProfile::new(30, 2.0, -10.0)
                .with_effect(EffectChance::on_opponent(EffectKind::Bleeding, 35.0, 3)),
            rest: ActionProfile::new(-25, 0.0, 0.0),
            taunt: ActionProfile::new(5, 0.0, 0.0)
                .with_effect(EffectChance::on_opponent(EffectKind::Enraged, 60.0, 2)),
        }
    }
}

/// Broad category of a skill, used by the AI and the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Deals damage through the normal hit pipeline.
    Offensive,
    /// Restores the user's HP.
    Healing,
    /// Applies effects without attacking.
    Buff,
}

/// A skill definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    /// Catalog key.
    pub id: SkillId,
    /// Display name.
    pub name: String,
    /// Category.
    pub kind: SkillKind,
    /// Mana spent on use.
    #[serde(default)]
    pub mana_cost: i32,
    /// Stamina spent on use.
    #[serde(default)]
    pub stamina_cost: i32,
    /// Turns before the skill can be used again.
    #[serde(default)]
    pub cooldown: u32,
    /// Multiplier on base damage (offensive skills).
    #[serde(default)]
    pub damage_multiplier: f64,
    /// Flat change to hit chance (offensive skills).
    #[serde(default)]
    pub accuracy_modifier: f64,
    /// HP restored (healing skills).
    #[serde(default)]
    pub heal: i32,
    /// Conditional effects.
    #[serde(default)]
    pub effects: Vec<EffectChance>,
}

/// A gladiator class: base stats, weapon, mana pool, and skill list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Catalog key (e.g. "murmillo").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base stats at level 1.
    pub stats: Stats,
    /// Flat weapon damage.
    pub weapon_damage: u32,
    /// Mana pool.
    #[serde(default)]
    pub mana: i32,
    /// Skills granted by the class, in preference order.
    #[serde(default)]
    pub skills: Vec<SkillId>,
}

/// Stat points gained per level above the first.
pub const STATS_PER_LEVEL: u32 = 2;

/// The complete set of combat data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// The fixed action table.
    #[serde(default)]
    pub actions: ActionTable,
    /// All classes.
    pub classes: Vec<ClassDef>,
    /// All skills.
    pub skills: Vec<SkillDef>,
}

impl Catalog {
    /// Parse and validate a catalog from JSON.
    pub fn from_json(json: &str) -> CombatResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check internal consistency: unique keys, known skill references,
    /// sane chances and durations.
    pub fn validate(&self) -> CombatResult<()> {
        if self.classes.is_empty() {
            return Err(CombatError::InvalidCatalog("no classes defined".into()));
        }
        for (i, class) in self.classes.iter().enumerate() {
            if self.classes[..i].iter().any(|c| c.id == class.id) {
                return Err(CombatError::InvalidCatalog(format!(
                    "duplicate class '{}'",
                    class.id
                )));
            }
            let s = &class.stats;
            let highest = [s.strength, s.agility, s.dexterity, s.endurance, s.constitution]
                .into_iter()
                .max()
                .unwrap_or(0);
            if highest > MAX_STAT {
                return Err(CombatError::InvalidCatalog(format!(
                    "class '{}' has a stat of {highest}, above {MAX_STAT}",
                    class.id
                )));
            }
            for skill in &class.skills {
                if self.find_skill(skill).is_none() {
                    return Err(CombatError::InvalidCatalog(format!(
                        "class '{}' references unknown skill '{skill}'",
                        class.id
                    )));
                }
            }
        }
        for (i, skill) in self.skills.iter().enumerate() {
            if self.skills[..i].iter().any(|s| s.id == skill.id) {
                return Err(CombatError::InvalidCatalog(format!(
                    "duplicate skill '{}'",
                    skill.id
                )));
            }
            check_effects(&skill.id.0, &skill.effects)?;
        }
        let table = &self.actions;
        for (name, profile) in [
            ("attack", &table.attack),
            ("heavy_attack", &table.heavy_attack),
            ("defend", &table.defend),
            ("dodge", &table.dodge),
            ("special", &table.special),
            ("rest", &table.rest),
            ("taunt", &table.taunt),
        ] {
            check_effects(name, &profile.effects)?;
        }
        Ok(())
    }

    /// Look up a class.
    pub fn class(&self, id: &str) -> CombatResult<&ClassDef> {
        self.classes
            .iter()
            .find(|c| c.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CombatError::UnknownClass(id.to_string()))
    }

    /// Look up a skill.
    pub fn skill(&self, id: &SkillId) -> CombatResult<&SkillDef> {
        self.find_skill(id)
            .ok_or_else(|| CombatError::UnknownSkill(id.clone()))
    }

    fn find_skill(&self, id: &SkillId) -> Option<&SkillDef> {
        self.skills.iter().find(|s| &s.id == id)
    }

    /// The skills a class grants, in the class's preference order.
    pub fn skills_for_class(&self, class: &str) -> CombatResult<Vec<&SkillDef>> {
        self.class(class)?
            .skills
            .iter()
            .map(|id| self.skill(id))
            .collect()
    }

    /// Skills the combatant could use right now: known, off cooldown, and
    /// affordable in both mana and stamina.
    pub fn available_skills(&self, combatant: &Combatant) -> Vec<&SkillDef> {
        combatant
            .skills
            .iter()
            .filter_map(|id| self.find_skill(id))
            .filter(|s| skill_blocker(combatant, s).is_none())
            .collect()
    }

    /// Build a combatant of the given class and level.
    ///
    /// The level must lie in `1..=MAX_LEVEL`.
    pub fn spawn(&self, class: &str, name: impl Into<String>, level: u32) -> CombatResult<Combatant> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(CombatError::InvalidLevel { level, max: MAX_LEVEL });
        }
        let def = self.class(class)?;
        let stats = def.stats.scaled(level, STATS_PER_LEVEL);
        Ok(Combatant::new(name, def.id.clone(), level, stats)
            .with_weapon_damage(def.weapon_damage)
            .with_mana(def.mana)
            .with_skills(def.skills.clone()))
    }

    /// The built-in data set: four classes and their skills.
    pub fn standard() -> Self {
        let skills = vec![
            SkillDef {
                id: "shield_bash".into(),
                name: "Shield Bash".into(),
                kind: SkillKind::Offensive,
                mana_cost: 15,
                stamina_cost: 12,
                cooldown: 3,
                damage_multiplier: 1.2,
                accuracy_modifier: 0.0,
                heal: 0,
                effects: vec![EffectChance::on_opponent(EffectKind::Stunned, 50.0, 2)],
            },
            SkillDef {
                id: "second_wind".into(),
                name: "Second Wind".into(),
                kind: SkillKind::Healing,
                mana_cost: 20,
                stamina_cost: 0,
                cooldown: 4,
                damage_multiplier: 0.0,
                accuracy_modifier: 0.0,
                heal: 30,
                effects: Vec::new(),
            },
            SkillDef {
                id: "net_throw".into(),
                name: "Net Throw".into(),
                kind: SkillKind::Offensive,
                mana_cost: 15,
                stamina_cost: 10,
                cooldown: 3,
                damage_multiplier: 0.5,
                accuracy_modifier: 10.0,
                heal: 0,
                effects: vec![EffectChance::on_opponent(EffectKind::Netted, 80.0, 2)],
            },
            SkillDef {
                id: "trident_lunge".into(),
                name: "Trident Lunge".into(),
                kind: SkillKind::Offensive,
                mana_cost: 10,
                stamina_cost: 15,
                cooldown: 2,
                damage_multiplier: 1.4,
                accuracy_modifier: -5.0,
                heal: 0,
                effects: vec![EffectChance::on_opponent(EffectKind::Bleeding, 40.0, 3)],
            },
            SkillDef {
                id: "crushing_blow".into(),
                name: "Crushing Blow".into(),
                kind: SkillKind::Offensive,
                mana_cost: 15,
                stamina_cost: 20,
                cooldown: 3,
                damage_multiplier: 1.8,
                accuracy_modifier: -10.0,
                heal: 0,
                effects: vec![EffectChance::on_opponent(EffectKind::Slowed, 50.0, 2)],
            },
            SkillDef {
                id: "battle_cry".into(),
                name: "Battle Cry".into(),
                kind: SkillKind::Buff,
                mana_cost: 10,
                stamina_cost: 5,
                cooldown: 5,
                damage_multiplier: 0.0,
                accuracy_modifier: 0.0,
                heal: 0,
                effects: vec![EffectChance::on_user(EffectKind::Enraged, 100.0, 3)],
            },
            SkillDef {
                id: "sica_slash".into(),
                name: "Sica Slash".into(),
                kind: SkillKind::Offensive,
                mana_cost: 12,
                stamina_cost: 12,
                cooldown: 2,
                damage_multiplier: 1.3,
                accuracy_modifier: 5.0,
                heal: 0,
                effects: vec![EffectChance::on_opponent(EffectKind::Bleeding, 60.0, 3)],
            },
            SkillDef {
                id: "bandage".into(),
                name: "Bandage".into(),
                kind: SkillKind::Healing,
                mana_cost: 15,
                stamina_cost: 0,
                cooldown: 4,
                damage_multiplier: 0.0,
                accuracy_modifier: 0.0,
                heal: 25,
                effects: Vec::new(),
            },
        ];

        let class = |id: &str, name: &str, stats: [u32; 5], weapon: u32, mana: i32, skills: [&str; 2]| {
            ClassDef {
                id: id.to_string(),
                name: name.to_string(),
                stats: Stats {
                    strength: stats[0],
                    agility: stats[1],
                    dexterity: stats[2],
                    endurance: stats[3],
                    constitution: stats[4],
                },
                weapon_damage: weapon,
                mana,
                skills: skills.iter().map(|s| SkillId::from(*s)).collect(),
            }
        };

        let classes = vec![
            class("murmillo", "Murmillo", [60, 30, 45, 55, 60], 12, 40, ["shield_bash", "second_wind"]),
            class("retiarius", "Retiarius", [40, 60, 60, 40, 40], 8, 45, ["net_throw", "trident_lunge"]),
            class("secutor", "Secutor", [55, 35, 45, 60, 55], 11, 30, ["crushing_blow", "battle_cry"]),
            class("thraex", "Thraex", [50, 50, 55, 45, 45], 10, 35, ["sica_slash", "bandage"]),
        ];

        Self {
            actions: ActionTable::default(),
            classes,
            skills,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Why a skill cannot be used right now, or `None` if it can.
pub(crate) fn skill_blocker(combatant: &Combatant, skill: &SkillDef) -> Option<String> {
    if !combatant.knows(&skill.id) {
        return Some("not learned".to_string());
    }
    let cooldown = combatant.cooldown(&skill.id);
    if cooldown > 0 {
        return Some(format!("on cooldown for {cooldown} more turn(s)"));
    }
    if combatant.mana.current() < skill.mana_cost {
        return Some(format!(
            "needs {} mana, has {}",
            skill.mana_cost,
            combatant.mana.current()
        ));
    }
    if combatant.stamina.current() < skill.stamina_cost {
        return Some(format!(
            "needs {} stamina, has {}",
            skill.stamina_cost,
            combatant.stamina.current()
        ));
    }
    None
}

fn check_effects(owner: &str, effects: &[EffectChance]) -> CombatResult<()> {
    for effect in effects {
        if !(0.0..=100.0).contains(&effect.chance) {
            return Err(CombatError::InvalidCatalog(format!(
                "'{owner}': {} chance {} outside 0-100",
                effect.kind, effect.chance
            )));
        }
        if effect.duration == 0 {
            return Err(CombatError::InvalidCatalog(format!(
                "'{owner}': {} has zero duration",
                effect.kind
            )));
        }
    }
    Ok(())
}
