//! Match state machine: turn order, action resolution, and termination.
//!
//! A [`Match`] owns copies of both fighters for its whole lifetime and hands
//! them back in the [`MatchReport`]. Nothing is shared between matches, so
//! any number can run side by side.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::ActionRequest;
use crate::ai::{Difficulty, Personality, choose_action};
use crate::catalog::{Catalog, SkillKind};
use crate::combatant::{Combatant, CombatantDelta, CombatantId};
use crate::dice::Dice;
use crate::log::{CombatLog, LogEntry, LogKind};
use crate::resolver::{Outcome, resolve_action, validate_action};
use crate::status::{EffectKind, tick_combatant};

/// How a match may end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRules {
    /// Knockout or judges only. Nobody dies.
    #[default]
    Exhibition,
    /// Badly hurt fighters may yield.
    Submission,
    /// A knocked-out loser dies.
    Death,
}

impl MatchRules {
    /// Every rule set.
    pub const ALL: [MatchRules; 3] = [Self::Exhibition, Self::Submission, Self::Death];

    /// Parse a rule set name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.to_string().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for MatchRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhibition => write!(f, "exhibition"),
            Self::Submission => write!(f, "submission"),
            Self::Death => write!(f, "death"),
        }
    }
}

/// Configuration for a single match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Termination rules.
    pub rules: MatchRules,
    /// Turns before the judges decide.
    pub max_rounds: u32,
    /// Health fraction below which a fighter may submit.
    pub submission_threshold: f64,
    /// Probability that a fighter below the threshold submits.
    pub submission_chance: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rules: MatchRules::Exhibition,
            max_rounds: 30,
            submission_threshold: 0.20,
            submission_chance: 0.30,
        }
    }
}

impl MatchConfig {
    /// Set the rules.
    pub fn with_rules(mut self, rules: MatchRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the turn limit (at least one turn).
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Set the submission threshold and chance.
    pub fn with_submission(mut self, threshold: f64, chance: f64) -> Self {
        self.submission_threshold = threshold.clamp(0.0, 1.0);
        self.submission_chance = chance.clamp(0.0, 1.0);
        self
    }
}

/// One of the two corners of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// First participant; wins exact ties.
    A,
    /// Second participant.
    B,
}

impl Side {
    /// The opposite corner.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Index into a two-element array.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// How a match was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The loser's HP reached zero.
    Knockout,
    /// The loser yielded.
    Submission,
    /// The turn limit was reached.
    JudgeDecision,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Knockout => write!(f, "knockout"),
            Self::Submission => write!(f, "submission"),
            Self::JudgeDecision => write!(f, "judge decision"),
        }
    }
}

/// Lifecycle of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Created, no turn played.
    NotStarted,
    /// Turns are being played.
    InProgress,
    /// A winner has been decided.
    Decided,
}

/// Supplies actions for one side of a match.
pub trait ActionSource: fmt::Debug {
    /// Choose the next action for `me`.
    fn choose(
        &mut self,
        me: &Combatant,
        opponent: &Combatant,
        catalog: &Catalog,
        dice: &mut dyn Dice,
    ) -> ActionRequest;
}

/// Computer control through the AI policy.
#[derive(Debug, Clone, Copy)]
pub struct AiController {
    personality: Personality,
}

impl AiController {
    /// AI playing at the given difficulty.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_personality(difficulty.personality())
    }

    /// AI with a custom personality.
    pub fn with_personality(personality: Personality) -> Self {
        Self { personality }
    }
}

impl ActionSource for AiController {
    fn choose(
        &mut self,
        me: &Combatant,
        opponent: &Combatant,
        catalog: &Catalog,
        dice: &mut dyn Dice,
    ) -> ActionRequest {
        let available = catalog.available_skills(me);
        choose_action(me, opponent, &available, &self.personality, dice)
    }
}

/// Plays back a fixed list of actions, then repeats a fallback.
#[derive(Debug, Clone)]
pub struct ScriptedController {
    queue: VecDeque<ActionRequest>,
    fallback: ActionRequest,
}

impl ScriptedController {
    /// Play `actions` in order, then idle.
    pub fn new(actions: impl IntoIterator<Item = ActionRequest>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
            fallback: ActionRequest::Idle,
        }
    }

    /// Repeat `action` forever.
    pub fn repeat(action: ActionRequest) -> Self {
        Self::new([]).with_fallback(action)
    }

    /// Action used once the script is exhausted.
    pub fn with_fallback(mut self, action: ActionRequest) -> Self {
        self.fallback = action;
        self
    }
}

impl ActionSource for ScriptedController {
    fn choose(&mut self, _: &Combatant, _: &Combatant, _: &Catalog, _: &mut dyn Dice) -> ActionRequest {
        self.queue.pop_front().unwrap_or_else(|| self.fallback.clone())
    }
}

/// Everything a decided match hands back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    /// Winning corner.
    pub winner: Side,
    /// Losing corner.
    pub loser: Side,
    /// Winning combatant.
    pub winner_id: CombatantId,
    /// Losing combatant.
    pub loser_id: CombatantId,
    /// How the match ended.
    pub decision: Decision,
    /// Turns played.
    pub turns: u32,
    /// The loser died (death rules only).
    pub loser_died: bool,
    /// Both fighters as they left the arena, indexed by [`Side::index`].
    pub fighters: [Combatant; 2],
    /// The full combat log.
    pub log: CombatLog,
}

impl MatchReport {
    /// A fighter's final state.
    pub fn fighter(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    /// The post-match delta to copy back onto the roster.
    pub fn delta(&self, side: Side) -> CombatantDelta {
        self.fighter(side).delta()
    }
}

/// A single bout between two combatants.
#[derive(Debug)]
pub struct Match<'a> {
    catalog: &'a Catalog,
    config: MatchConfig,
    fighters: [Combatant; 2],
    controllers: [Box<dyn ActionSource + 'a>; 2],
    order: [Side; 2],
    state: MatchState,
    turn: u32,
    log: CombatLog,
    result: Option<(Side, Decision)>,
}

impl<'a> Match<'a> {
    /// Create a match where both sides are AI at normal difficulty.
    pub fn new(catalog: &'a Catalog, config: MatchConfig, a: Combatant, b: Combatant) -> Self {
        Self {
            catalog,
            config,
            fighters: [a, b],
            controllers: [
                Box::new(AiController::new(Difficulty::Normal)),
                Box::new(AiController::new(Difficulty::Normal)),
            ],
            order: [Side::A, Side::B],
            state: MatchState::NotStarted,
            turn: 0,
            log: CombatLog::new(),
            result: None,
        }
    }

    /// Replace the action source for one side.
    pub fn with_controller(mut self, side: Side, source: impl ActionSource + 'a) -> Self {
        self.controllers[side.index()] = Box::new(source);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MatchState {
        self.state
    }

    /// Turns played so far.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// A fighter's current state.
    pub fn fighter(&self, side: Side) -> &Combatant {
        &self.fighters[side.index()]
    }

    /// The log so far.
    pub fn log(&self) -> &CombatLog {
        &self.log
    }

    /// Winner and decision, once decided.
    pub fn result(&self) -> Option<(Side, Decision)> {
        self.result
    }

    /// Fix the turn order and enter play.
    ///
    /// The faster fighter (higher agility) acts first every turn; ties go to
    /// side A. A fighter that enters already defeated loses on the spot.
    pub fn start(&mut self) {
        if self.state != MatchState::NotStarted {
            return;
        }
        let [a, b] = &self.fighters;
        self.order = if b.stats.agility > a.stats.agility {
            [Side::B, Side::A]
        } else {
            [Side::A, Side::B]
        };
        self.state = MatchState::InProgress;
        tracing::debug!(
            a = %a.name,
            b = %b.name,
            first = %self.order[0],
            rules = %self.config.rules,
            "match started"
        );

        if let Some(loser) = [Side::A, Side::B]
            .into_iter()
            .find(|s| self.fighter(*s).is_defeated())
        {
            self.decide(loser.other(), Decision::Knockout);
        }
    }

    /// Order for the coming turn: the fixed order, except a slowed fighter
    /// moves behind one that is not.
    fn turn_order(&self) -> [Side; 2] {
        let [first, second] = self.order;
        let slowed = |s: Side| self.fighter(s).effects.has(EffectKind::Slowed);
        if slowed(first) && !slowed(second) {
            [second, first]
        } else {
            self.order
        }
    }

    /// Play one full turn. Starts the match if needed.
    pub fn step(&mut self, dice: &mut dyn Dice) -> MatchState {
        if self.state == MatchState::NotStarted {
            self.start();
        }
        if self.state == MatchState::Decided {
            return self.state;
        }

        self.turn += 1;
        let order = self.turn_order();

        for side in order {
            self.act(side, dice);
            if let Some(loser) = [side.other(), side]
                .into_iter()
                .find(|s| self.fighter(*s).is_defeated())
            {
                self.decide(loser.other(), Decision::Knockout);
                return self.state;
            }
        }

        if self.config.rules == MatchRules::Submission {
            for side in order {
                if self.fighter(side).health_fraction() < self.config.submission_threshold
                    && dice.probability(self.config.submission_chance)
                {
                    self.decide(side.other(), Decision::Submission);
                    return self.state;
                }
            }
        }

        for side in order {
            tick_combatant(&mut self.fighters[side.index()], self.turn, &mut self.log);
        }
        if let Some(loser) = order.into_iter().find(|s| self.fighter(*s).is_defeated()) {
            self.decide(loser.other(), Decision::Knockout);
            return self.state;
        }

        tracing::debug!(
            turn = self.turn,
            a_hp = %self.fighters[0].hp,
            b_hp = %self.fighters[1].hp,
            "turn complete"
        );

        if self.turn >= self.config.max_rounds {
            let [a, b] = &self.fighters;
            let winner = if b.health_fraction() > a.health_fraction() {
                Side::B
            } else {
                Side::A
            };
            self.decide(winner, Decision::JudgeDecision);
        }
        self.state
    }

    /// Play turns until the match is decided.
    pub fn run(mut self, dice: &mut dyn Dice) -> MatchReport {
        loop {
            if let Some((winner, decision)) = self.result {
                return self.into_report(winner, decision);
            }
            self.step(dice);
        }
    }

    fn act(&mut self, side: Side, dice: &mut dyn Dice) {
        let turn = self.turn;
        let catalog = self.catalog;
        let [a, b] = &mut self.fighters;
        let (me, opponent) = match side {
            Side::A => (a, b),
            Side::B => (b, a),
        };

        let stunned = me.effects.is_stunned();
        me.effects.settle();
        let mut action = if stunned {
            ActionRequest::Idle
        } else {
            self.controllers[side.index()].choose(me, opponent, catalog, dice)
        };
        if let Err(e) = validate_action(me, &action, catalog) {
            tracing::warn!(fighter = %me.name, %action, error = %e, "rejected action, idling");
            action = ActionRequest::Idle;
        }

        let outcome = resolve_action(me, opponent, &action, catalog, dice);
        record(&mut self.log, turn, me.id, &action, &outcome, stunned, catalog);
    }

    fn decide(&mut self, winner: Side, decision: Decision) {
        let loser = winner.other();
        let loser_id = self.fighter(loser).id;
        let winner_id = self.fighter(winner).id;
        let (actor, kind) = match decision {
            Decision::Knockout => (loser_id, LogKind::KnockedOut),
            Decision::Submission => (loser_id, LogKind::Submitted),
            Decision::JudgeDecision => (winner_id, LogKind::JudgeDecision),
        };
        self.log.push(LogEntry {
            turn: self.turn,
            actor,
            action: None,
            damage: None,
            kind,
        });
        if self.loser_dies(loser) {
            self.log.push(LogEntry {
                turn: self.turn,
                actor: loser_id,
                action: None,
                damage: None,
                kind: LogKind::Died,
            });
        }

        tracing::info!(
            winner = %self.fighter(winner).name,
            loser = %self.fighter(loser).name,
            %decision,
            turns = self.turn,
            "match decided"
        );
        self.state = MatchState::Decided;
        self.result = Some((winner, decision));
    }

    fn loser_dies(&self, loser: Side) -> bool {
        self.config.rules == MatchRules::Death && self.fighter(loser).is_defeated()
    }

    fn into_report(self, winner: Side, decision: Decision) -> MatchReport {
        let loser = winner.other();
        let loser_died = self.loser_dies(loser);
        MatchReport {
            winner,
            loser,
            winner_id: self.fighter(winner).id,
            loser_id: self.fighter(loser).id,
            decision,
            turns: self.turn,
            loser_died,
            fighters: self.fighters,
            log: self.log,
        }
    }
}

/// Translate an outcome into log entries.
fn record(
    log: &mut CombatLog,
    turn: u32,
    actor: CombatantId,
    action: &ActionRequest,
    outcome: &Outcome,
    stunned: bool,
    catalog: &Catalog,
) {
    let skill_kind = match action {
        ActionRequest::UseSkill(id) => catalog.skill(id).ok().map(|s| s.kind),
        _ => None,
    };
    let strike = action.is_attack() || skill_kind == Some(SkillKind::Offensive);

    let (kind, damage) = if stunned {
        (LogKind::Stunned, None)
    } else if strike {
        if outcome.hit {
            (
                LogKind::Hit {
                    critical: outcome.is_critical,
                    blocked: outcome.blocked,
                },
                Some(outcome.damage),
            )
        } else if outcome.dodged {
            (LogKind::Dodged, None)
        } else {
            (LogKind::Missed, None)
        }
    } else {
        let kind = match (action, skill_kind) {
            (ActionRequest::Defend, _) => LogKind::Defending,
            (ActionRequest::Dodge, _) => LogKind::Evading,
            (ActionRequest::Rest, _) => LogKind::Rested {
                recovered: outcome.stamina_delta,
            },
            (ActionRequest::Taunt, _) => LogKind::Taunted,
            (_, Some(SkillKind::Healing)) => LogKind::Healed {
                amount: outcome.healed,
            },
            (_, Some(_)) => LogKind::Buffed,
            _ => LogKind::Idle,
        };
        (kind, None)
    };

    log.push(LogEntry {
        turn,
        actor,
        action: Some(action.clone()),
        damage,
        kind,
    });

    if outcome.exhausted {
        log.push(LogEntry {
            turn,
            actor,
            action: None,
            damage: None,
            kind: LogKind::Exhausted,
        });
    }
    for applied in &outcome.applied_effects {
        if applied.effect.kind == EffectKind::Exhausted || applied.effect.kind == EffectKind::Defended {
            continue;
        }
        log.push(LogEntry {
            turn,
            actor,
            action: None,
            damage: None,
            kind: LogKind::EffectApplied {
                target: applied.target,
                effect: applied.effect.kind,
                stacks: applied.effect.stacks,
            },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::Stats;
    use crate::dice::{ScriptedDice, SeededDice};
    use proptest::prelude::*;

    fn fighter(name: &str, agility: u32) -> Combatant {
        let stats = Stats {
            strength: 60,
            agility,
            dexterity: 50,
            ..Stats::uniform(40)
        };
        Combatant::new(name, "murmillo", 0, stats)
            .with_hp(100)
            .with_weapon_damage(10)
    }

    fn scripted<'a>(
        catalog: &'a Catalog,
        config: MatchConfig,
        a: Combatant,
        b: Combatant,
        a_action: ActionRequest,
        b_action: ActionRequest,
    ) -> Match<'a> {
        Match::new(catalog, config, a, b)
            .with_controller(Side::A, ScriptedController::repeat(a_action))
            .with_controller(Side::B, ScriptedController::repeat(b_action))
    }

    #[test]
    fn parse_rules() {
        assert_eq!(MatchRules::parse("Death"), Some(MatchRules::Death));
        assert_eq!(MatchRules::parse("to the pain"), None);
    }

    #[test]
    fn config_builders() {
        let config = MatchConfig::default()
            .with_rules(MatchRules::Submission)
            .with_max_rounds(0)
            .with_submission(0.3, 2.0);
        assert_eq!(config.max_rounds, 1);
        assert!((config.submission_chance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn knockout_ends_match_immediately() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 50);
        let mut b = fighter("Verus", 30);
        b.hp.set(30);
        let mut m = scripted(
            &catalog,
            MatchConfig::default(),
            a,
            b,
            ActionRequest::Attack,
            ActionRequest::Attack,
        );
        // hit, no dodge, no crit, no bleed
        let mut dice = ScriptedDice::new([0.0, 99.0, 99.0, 99.0]);
        assert_eq!(m.step(&mut dice), MatchState::Decided);
        let report = m.run(&mut dice);
        assert_eq!(report.winner, Side::A);
        assert_eq!(report.decision, Decision::Knockout);
        assert_eq!(report.turns, 1);
        assert!(!report.loser_died);
        assert_eq!(report.fighter(Side::B).hp.current(), 0);
        // B never got to act
        assert_eq!(report.log.for_actor(report.loser_id).count(), 1);
    }

    #[test]
    fn death_rules_kill_the_loser() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 50);
        let mut b = fighter("Verus", 30);
        b.hp.set(30);
        let config = MatchConfig::default().with_rules(MatchRules::Death);
        let m = scripted(&catalog, config, a, b, ActionRequest::Attack, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([0.0, 99.0, 99.0]));
        assert!(report.loser_died);
        assert!(report.log.entries().iter().any(|e| e.kind == LogKind::Died));
    }

    #[test]
    fn judge_tie_goes_to_side_a() {
        let catalog = Catalog::standard();
        let config = MatchConfig::default().with_max_rounds(3);
        let m = scripted(
            &catalog,
            config,
            fighter("Priscus", 40),
            fighter("Verus", 40),
            ActionRequest::Rest,
            ActionRequest::Rest,
        );
        let report = m.run(&mut ScriptedDice::new([]));
        assert_eq!(report.decision, Decision::JudgeDecision);
        assert_eq!(report.winner, Side::A);
        assert_eq!(report.turns, 3);
    }

    #[test]
    fn judge_prefers_higher_health_fraction() {
        let catalog = Catalog::standard();
        let mut a = fighter("Priscus", 40);
        a.hp.adjust(-10);
        let config = MatchConfig::default().with_max_rounds(2);
        let m = scripted(&catalog, config, a, fighter("Verus", 40), ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([]));
        assert_eq!(report.winner, Side::B);
        assert!(!report.loser_died);
    }

    #[test]
    fn badly_hurt_fighter_may_submit() {
        let catalog = Catalog::standard();
        let mut b = fighter("Verus", 30);
        b.hp.set(10);
        let config = MatchConfig::default().with_rules(MatchRules::Submission);
        let m = scripted(&catalog, config, fighter("Priscus", 50), b, ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([0.0]));
        assert_eq!(report.decision, Decision::Submission);
        assert_eq!(report.winner, Side::A);
        assert_eq!(report.turns, 1);
    }

    #[test]
    fn exhibition_never_submits() {
        let catalog = Catalog::standard();
        let mut b = fighter("Verus", 30);
        b.hp.set(10);
        let config = MatchConfig::default().with_max_rounds(2);
        let m = scripted(&catalog, config, fighter("Priscus", 50), b, ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([0.0, 0.0, 0.0]).otherwise(0.0));
        assert_eq!(report.decision, Decision::JudgeDecision);
        assert_eq!(report.winner, Side::A);
    }

    #[test]
    fn bleeding_can_knock_out() {
        let catalog = Catalog::standard();
        let mut b = fighter("Verus", 30);
        b.hp.set(3);
        b.effects.apply(EffectKind::Bleeding, 3);
        let m = scripted(&catalog, MatchConfig::default(), fighter("Priscus", 50), b, ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([]));
        assert_eq!(report.decision, Decision::Knockout);
        assert_eq!(report.winner, Side::A);
        assert_eq!(report.turns, 1);
        assert!(
            report
                .log
                .entries()
                .iter()
                .any(|e| matches!(e.kind, LogKind::Bled { stacks: 1 }))
        );
    }

    #[test]
    fn defeated_entrant_loses_before_turn_one() {
        let catalog = Catalog::standard();
        let mut a = fighter("Priscus", 50);
        a.hp.set(0);
        let m = Match::new(&catalog, MatchConfig::default(), a, fighter("Verus", 30));
        let report = m.run(&mut SeededDice::new(1));
        assert_eq!(report.winner, Side::B);
        assert_eq!(report.turns, 0);
    }

    #[test]
    fn stunned_fighter_idles_for_two_turns() {
        let catalog = Catalog::standard();
        let mut b = fighter("Verus", 30);
        b.effects.apply(EffectKind::Stunned, 2);
        let b_id = b.id;
        let config = MatchConfig::default().with_max_rounds(3);
        let m = scripted(&catalog, config, fighter("Priscus", 50), b, ActionRequest::Rest, ActionRequest::Defend);
        let report = m.run(&mut ScriptedDice::new([]));

        let actions: Vec<_> = report
            .log
            .for_actor(b_id)
            .filter(|e| e.action.is_some())
            .map(|e| (e.turn, e.kind.clone()))
            .collect();
        assert_eq!(
            actions,
            vec![
                (1, LogKind::Stunned),
                (2, LogKind::Stunned),
                (3, LogKind::Defending),
            ]
        );
    }

    /// Turn-by-turn kinds of the entries where `id` took an action.
    fn actions_of(report: &MatchReport, id: CombatantId) -> Vec<(u32, LogKind)> {
        report
            .log
            .for_actor(id)
            .filter(|e| e.action.is_some())
            .map(|e| (e.turn, e.kind.clone()))
            .collect()
    }

    #[test]
    fn stun_from_slower_fighter_costs_the_next_turn() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 50);
        let a_id = a.id;
        let config = MatchConfig::default().with_max_rounds(3);
        let m = scripted(&catalog, config, a, fighter("Verus", 30), ActionRequest::Defend, ActionRequest::HeavyAttack);
        // hit, no dodge, no crit, stun lands
        let report = m.run(&mut ScriptedDice::new([0.0, 99.0, 99.0, 0.0]));

        assert_eq!(
            actions_of(&report, a_id),
            vec![
                (1, LogKind::Defending),
                (2, LogKind::Stunned),
                (3, LogKind::Defending),
            ]
        );
    }

    #[test]
    fn stun_from_faster_fighter_costs_the_current_turn_only() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 30);
        let a_id = a.id;
        let config = MatchConfig::default().with_max_rounds(2);
        let m = scripted(&catalog, config, a, fighter("Verus", 50), ActionRequest::Defend, ActionRequest::HeavyAttack);
        let report = m.run(&mut ScriptedDice::new([0.0, 99.0, 99.0, 0.0]));

        assert_eq!(
            actions_of(&report, a_id),
            vec![(1, LogKind::Stunned), (2, LogKind::Defending)]
        );
    }

    #[test]
    fn two_turn_stun_from_slower_fighter_costs_two_turns() {
        let mut catalog = Catalog::standard();
        catalog.actions.heavy_attack.effects[0].duration = 2;
        let a = fighter("Priscus", 50);
        let a_id = a.id;
        let config = MatchConfig::default().with_max_rounds(4);
        let m = scripted(&catalog, config, a, fighter("Verus", 30), ActionRequest::Defend, ActionRequest::HeavyAttack);
        let report = m.run(&mut ScriptedDice::new([0.0, 99.0, 99.0, 0.0]));

        assert_eq!(
            actions_of(&report, a_id),
            vec![
                (1, LogKind::Defending),
                (2, LogKind::Stunned),
                (3, LogKind::Stunned),
                (4, LogKind::Defending),
            ]
        );
    }

    #[test]
    fn faster_fighter_acts_first_unless_slowed() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 30);
        let b = fighter("Verus", 50);
        let b_id = b.id;
        let config = MatchConfig::default().with_max_rounds(1);
        let m = scripted(&catalog, config, a, b, ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([]));
        assert_eq!(report.log.entries()[0].actor, b_id);

        let a = fighter("Priscus", 30);
        let a_id = a.id;
        let mut b = fighter("Verus", 50);
        b.effects.apply(EffectKind::Slowed, 2);
        let m = scripted(&catalog, config, a, b, ActionRequest::Rest, ActionRequest::Rest);
        let report = m.run(&mut ScriptedDice::new([]));
        assert_eq!(report.log.entries()[0].actor, a_id);
    }

    #[test]
    fn invalid_scripted_skill_becomes_idle() {
        let catalog = Catalog::standard();
        let a = fighter("Priscus", 50);
        let a_id = a.id;
        let config = MatchConfig::default().with_max_rounds(1);
        let m = scripted(
            &catalog,
            config,
            a,
            fighter("Verus", 30),
            ActionRequest::UseSkill("fireball".into()),
            ActionRequest::Rest,
        );
        let report = m.run(&mut ScriptedDice::new([]));
        let first = report.log.for_actor(a_id).next().unwrap();
        assert_eq!(first.kind, LogKind::Idle);
    }

    #[test]
    fn ai_match_is_deterministic() {
        let catalog = Catalog::standard();
        let a = catalog.spawn("retiarius", "Secundus", 3).unwrap();
        let b = catalog.spawn("secutor", "Flamma", 3).unwrap();
        let run = |seed| {
            Match::new(&catalog, MatchConfig::default(), a.clone(), b.clone())
                .with_controller(Side::A, AiController::new(Difficulty::Hard))
                .run(&mut SeededDice::new(seed))
        };
        let first = run(42);
        let second = run(42);
        assert_eq!(first.winner, second.winner);
        assert_eq!(first.turns, second.turns);
        assert_eq!(first.log, second.log);
    }

    #[test]
    fn delta_copies_back() {
        let catalog = Catalog::standard();
        let a = catalog.spawn("thraex", "Spiculus", 2).unwrap();
        let b = catalog.spawn("murmillo", "Priscus", 2).unwrap();
        let mut roster_a = a.clone();
        let report = Match::new(&catalog, MatchConfig::default(), a, b).run(&mut SeededDice::new(9));
        roster_a.apply_delta(&report.delta(Side::A));
        assert_eq!(roster_a.hp.current(), report.fighter(Side::A).hp.current());
    }

    proptest! {
        #[test]
        fn matches_terminate_within_limit(
            seed in any::<u64>(),
            classes in (0usize..4, 0usize..4),
            levels in (1u32..10, 1u32..10),
            rules in 0usize..3,
            max_rounds in 1u32..40,
        ) {
            let catalog = Catalog::standard();
            let a = catalog.spawn(&catalog.classes[classes.0].id, "A", levels.0).unwrap();
            let b = catalog.spawn(&catalog.classes[classes.1].id, "B", levels.1).unwrap();
            let config = MatchConfig::default()
                .with_rules(MatchRules::ALL[rules])
                .with_max_rounds(max_rounds);
            let report = Match::new(&catalog, config, a, b)
                .with_controller(Side::B, AiController::new(Difficulty::Nightmare))
                .run(&mut SeededDice::new(seed));

            prop_assert!(report.turns <= max_rounds);
            prop_assert_ne!(report.winner, report.loser);
            for f in &report.fighters {
                prop_assert!(f.hp.current() >= 0 && f.hp.current() <= f.hp.max());
                prop_assert!(f.stamina.current() >= 0 && f.stamina.current() <= f.stamina.max());
                prop_assert!(f.mana.current() >= 0 && f.mana.current() <= f.mana.max());
                for effect in f.effects.iter() {
                    prop_assert!(effect.remaining > 0);
                    prop_assert!(effect.stacks >= 1 && effect.stacks <= effect.kind.max_stacks());
                }
            }
            if report.loser_died {
                prop_assert_eq!(config.rules, MatchRules::Death);
                prop_assert!(report.fighter(report.loser).is_defeated());
            }
            if report.decision == Decision::Knockout {
                prop_assert!(report.fighter(report.loser).is_defeated());
            }
        }
    }
}
