//! Resolution of a single action: costs, hit and dodge rolls, damage, effects.
//!
//! [`resolve_action`] never fails. Skill requests must be checked with
//! [`validate_action`] beforehand; resolving an unknown or unavailable skill
//! panics, since it means the caller skipped validation.

use crate::action::ActionRequest;
use crate::catalog::{Catalog, EffectChance, EffectTarget, SkillId, SkillKind, skill_blocker};
use crate::combatant::{Combatant, CombatantId, Posture};
use crate::dice::Dice;
use crate::error::{CombatError, CombatResult};
use crate::status::{EffectApplication, EffectKind};

const BASE_HIT: f64 = 70.0;
const HIT_RANGE: (f64, f64) = (20.0, 95.0);
const DODGE_RANGE: (f64, f64) = (5.0, 60.0);
const EVASIVE_BONUS: f64 = 25.0;
const CRIT_RANGE: (f64, f64) = (0.0, 50.0);
const CRIT_MULTIPLIER: f64 = 1.5;
const EXHAUSTION_TURNS: u32 = 2;

/// Defended lasts one of its owner's turns. It is cleared when its owner
/// acts again or when it absorbs a hit.
const DEFEND_TURNS: u32 = 1;

/// An effect attached while resolving an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEffect {
    /// Who received it.
    pub target: CombatantId,
    /// The effect's state after application.
    pub effect: EffectApplication,
}

/// Everything one action did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// The attack connected.
    pub hit: bool,
    /// Damage dealt to the defender.
    pub damage: u32,
    /// The hit was a critical.
    pub is_critical: bool,
    /// The defender dodged.
    pub dodged: bool,
    /// The defender's Defended effect absorbed half the damage.
    pub blocked: bool,
    /// HP restored to the attacker.
    pub healed: i32,
    /// Net stamina change for the attacker (positive when resting).
    pub stamina_delta: i32,
    /// Effects attached to either side.
    pub applied_effects: Vec<AppliedEffect>,
    /// The attacker ran out of stamina and became exhausted.
    pub exhausted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Strike,
    Defend,
    Dodge,
    Rest,
    Taunt,
    Heal,
    Buff,
}

#[derive(Debug)]
struct Plan<'a> {
    step: Step,
    stamina_cost: i32,
    mana_cost: i32,
    cooldown: Option<(&'a SkillId, u32)>,
    damage_multiplier: f64,
    accuracy_modifier: f64,
    heal: i32,
    effects: &'a [EffectChance],
}

impl<'a> Plan<'a> {
    fn build(action: &'a ActionRequest, catalog: &'a Catalog) -> Option<Self> {
        let table = &catalog.actions;
        let (step, profile) = match action {
            ActionRequest::Attack => (Step::Strike, &table.attack),
            ActionRequest::HeavyAttack => (Step::Strike, &table.heavy_attack),
            ActionRequest::Special => (Step::Strike, &table.special),
            ActionRequest::Defend => (Step::Defend, &table.defend),
            ActionRequest::Dodge => (Step::Dodge, &table.dodge),
            ActionRequest::Rest => (Step::Rest, &table.rest),
            ActionRequest::Taunt => (Step::Taunt, &table.taunt),
            ActionRequest::UseSkill(id) => {
                let skill = catalog.skill(id).ok()?;
                let step = match skill.kind {
                    SkillKind::Offensive => Step::Strike,
                    SkillKind::Healing => Step::Heal,
                    SkillKind::Buff => Step::Buff,
                };
                return Some(Self {
                    step,
                    stamina_cost: skill.stamina_cost,
                    mana_cost: skill.mana_cost,
                    cooldown: (skill.cooldown > 0).then_some((&skill.id, skill.cooldown)),
                    damage_multiplier: skill.damage_multiplier,
                    accuracy_modifier: skill.accuracy_modifier,
                    heal: skill.heal,
                    effects: &skill.effects,
                });
            }
            ActionRequest::Idle => return None,
        };
        Some(Self {
            step,
            stamina_cost: profile.stamina_cost,
            mana_cost: 0,
            cooldown: None,
            damage_multiplier: profile.damage_multiplier,
            accuracy_modifier: profile.accuracy_modifier,
            heal: 0,
            effects: &profile.effects,
        })
    }
}

/// Check that `combatant` may perform `action` right now.
///
/// Fixed actions are always allowed (stamina costs clamp at zero). Skills
/// must exist, be learned, be off cooldown, and be affordable.
pub fn validate_action(combatant: &Combatant, action: &ActionRequest, catalog: &Catalog) -> CombatResult<()> {
    let ActionRequest::UseSkill(id) = action else {
        return Ok(());
    };
    let skill = catalog.skill(id)?;
    match skill_blocker(combatant, skill) {
        Some(reason) => Err(CombatError::SkillUnavailable {
            skill: id.clone(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Hit chance for `attacker` against `defender`, in percent.
pub fn hit_chance(attacker: &Combatant, defender: &Combatant, accuracy_modifier: f64) -> f64 {
    let raw = BASE_HIT + 0.3 * f64::from(attacker.stats.dexterity) - 0.2 * f64::from(defender.stats.agility)
        + accuracy_modifier
        + attacker.effects.accuracy_modifier();
    raw.clamp(HIT_RANGE.0, HIT_RANGE.1)
}

/// Dodge chance for `defender`, in percent, including posture.
pub fn dodge_chance(defender: &Combatant) -> f64 {
    let mut raw = 0.3 * f64::from(defender.stats.agility) - 0.5 * defender.fatigue_percent()
        + defender.effects.dodge_modifier();
    if defender.posture == Posture::Evasive {
        raw += EVASIVE_BONUS;
    }
    raw.clamp(DODGE_RANGE.0, DODGE_RANGE.1)
}

/// Critical chance for `attacker`, in percent.
pub fn crit_chance(attacker: &Combatant) -> f64 {
    (5.0 + 0.1 * f64::from(attacker.stats.dexterity) + 0.2 * f64::from(attacker.luck))
        .clamp(CRIT_RANGE.0, CRIT_RANGE.1)
}

/// Damage before critical and defence modifiers.
pub fn base_damage(attacker: &Combatant, damage_multiplier: f64) -> f64 {
    let raw = 0.5 * f64::from(attacker.stats.strength) + f64::from(attacker.weapon_damage);
    let level_factor = 1.0 + 0.05 * f64::from(attacker.level);
    (raw * level_factor).round() * damage_multiplier * attacker.effects.outgoing_damage_multiplier()
}

/// Resolve one action of `attacker` against `defender`.
///
/// # Panics
///
/// Panics if `action` names a skill that fails [`validate_action`].
pub fn resolve_action(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    action: &ActionRequest,
    catalog: &Catalog,
    dice: &mut dyn Dice,
) -> Outcome {
    if let Err(e) = validate_action(attacker, action, catalog) {
        panic!("contract violation: {} cannot {action}: {e}", attacker.name);
    }

    // Stances last until their owner acts again.
    attacker.posture = Posture::Neutral;
    attacker.effects.remove(EffectKind::Defended);

    let mut outcome = Outcome::default();
    let Some(plan) = Plan::build(action, catalog) else {
        return outcome;
    };

    pay_costs(attacker, &plan, &mut outcome);

    match plan.step {
        Step::Defend => {
            attach(attacker, EffectKind::Defended, DEFEND_TURNS, &mut outcome);
        }
        Step::Dodge => attacker.posture = Posture::Evasive,
        Step::Rest => {}
        Step::Taunt | Step::Buff => roll_effects(attacker, defender, plan.effects, dice, &mut outcome),
        Step::Heal => {
            let before = attacker.hp.current();
            attacker.hp.adjust(plan.heal);
            outcome.healed = attacker.hp.current() - before;
            roll_effects(attacker, defender, plan.effects, dice, &mut outcome);
        }
        Step::Strike => strike(attacker, defender, &plan, dice, &mut outcome),
    }

    tracing::debug!(
        attacker = %attacker.name,
        defender = %defender.name,
        %action,
        hit = outcome.hit,
        damage = outcome.damage,
        critical = outcome.is_critical,
        "action resolved"
    );
    outcome
}

fn pay_costs(attacker: &mut Combatant, plan: &Plan<'_>, outcome: &mut Outcome) {
    let before = attacker.stamina.current();
    attacker.stamina.adjust(-plan.stamina_cost);
    outcome.stamina_delta = attacker.stamina.current() - before;

    if plan.mana_cost > 0 {
        attacker.mana.adjust(-plan.mana_cost);
    }
    if let Some((skill, turns)) = plan.cooldown {
        attacker.cooldowns.insert(skill.clone(), turns);
    }
    if plan.stamina_cost > 0 && attacker.stamina.is_empty() {
        outcome.exhausted = true;
        attach(attacker, EffectKind::Exhausted, EXHAUSTION_TURNS, outcome);
    }
}

fn strike(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    plan: &Plan<'_>,
    dice: &mut dyn Dice,
    outcome: &mut Outcome,
) {
    let to_hit = hit_chance(attacker, defender, plan.accuracy_modifier);
    if !dice.chance(to_hit) {
        defender.posture = Posture::Neutral;
        return;
    }

    let to_dodge = dodge_chance(defender);
    defender.posture = Posture::Neutral;
    if dice.chance(to_dodge) {
        outcome.dodged = true;
        return;
    }

    outcome.hit = true;
    let mut damage = base_damage(attacker, plan.damage_multiplier);
    if dice.chance(crit_chance(attacker)) {
        outcome.is_critical = true;
        damage *= CRIT_MULTIPLIER;
    }
    if defender.effects.remove(EffectKind::Defended).is_some() {
        outcome.blocked = true;
        damage *= EffectKind::Defended.incoming_damage_multiplier();
    }

    let damage = damage.round().max(0.0) as u32;
    defender.hp.adjust(-i32::try_from(damage).unwrap_or(i32::MAX));
    outcome.damage = damage;

    roll_effects(attacker, defender, plan.effects, dice, outcome);
}

fn roll_effects(
    attacker: &mut Combatant,
    defender: &mut Combatant,
    effects: &[EffectChance],
    dice: &mut dyn Dice,
    outcome: &mut Outcome,
) {
    for effect in effects {
        if !dice.chance(effect.chance) {
            continue;
        }
        let target = match effect.target {
            EffectTarget::Opponent => &mut *defender,
            EffectTarget::User => &mut *attacker,
        };
        attach(target, effect.kind, effect.duration, outcome);
    }
}

fn attach(target: &mut Combatant, kind: EffectKind, duration: u32, outcome: &mut Outcome) {
    if let Some(effect) = target.effects.apply(kind, duration) {
        outcome.applied_effects.push(AppliedEffect {
            target: target.id,
            effect,
        });
    }
}
