//! Tournament orchestration: entrant bookkeeping, match play, and rewards.
//!
//! A [`Tournament`] drives its [`Bracket`] to completion. Each ready match is
//! fought on copies of the two entrants, and the result is folded back into
//! the roster. Stage and placement rewards are granted exactly once per
//! completion. Matches of one round can run in parallel on rayon; the
//! outcome is the same as playing them in order.

use ludus_combat::{
    AiController, Catalog, Combatant, CombatantId, Decision, Dice, Difficulty, Match, MatchConfig, MatchReport,
    SeededDice, Side,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, MatchCompletion, Standing};
use crate::config::TournamentConfig;
use crate::error::{TournamentError, TournamentResult};
use crate::participant::Participant;
use crate::reward::{RewardGrant, RewardReason, RewardTable, stage_key};

/// Lifecycle of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentStatus {
    /// Matches remain to be played.
    InProgress,
    /// A champion has been crowned.
    Finished,
    /// Stopped early; no further results are accepted.
    Abandoned,
}

/// Something that happened during the tournament, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TournamentEvent {
    /// A match was fought.
    MatchPlayed {
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
        /// Winner.
        winner: CombatantId,
        /// Loser.
        loser: CombatantId,
        /// How it ended.
        decision: Decision,
        /// Turns fought.
        turns: u32,
    },
    /// A match was awarded without a fight.
    Walkover {
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
        /// The side that advanced.
        winner: CombatantId,
    },
    /// A participant died in the arena.
    Died {
        /// Who died.
        participant: CombatantId,
        /// Round index.
        round: usize,
    },
    /// Every match of a round is complete.
    RoundCompleted {
        /// Round index.
        round: usize,
    },
    /// A reward was paid out.
    RewardGranted(RewardGrant),
    /// The tournament has a champion.
    Finished {
        /// The champion.
        champion: CombatantId,
    },
    /// The tournament was stopped early.
    Abandoned {
        /// Round in progress when it stopped.
        round: usize,
    },
}

/// The once-only outcome of recording a match result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// What the result did to the bracket.
    pub completion: MatchCompletion,
    /// Rewards paid because of it (stage, and placement if it was the last).
    pub rewards: Vec<RewardGrant>,
}

/// A match played by the tournament.
#[derive(Debug, Clone)]
pub struct PlayedMatch {
    /// The recorded result.
    pub record: ResultRecord,
    /// The full match report; `None` for walkovers.
    pub report: Option<MatchReport>,
}

/// Everything a worker needs to fight one match on its own.
#[derive(Debug)]
struct Job {
    position: usize,
    fighters: [Combatant; 2],
    difficulties: [Difficulty; 2],
    seed: u64,
}

impl Job {
    fn run(self, catalog: &Catalog, config: MatchConfig) -> MatchReport {
        let [a, b] = self.fighters;
        Match::new(catalog, config, a, b)
            .with_controller(Side::A, AiController::new(self.difficulties[0]))
            .with_controller(Side::B, AiController::new(self.difficulties[1]))
            .run(&mut SeededDice::new(self.seed))
    }
}

/// A running tournament: participants, bracket, rewards and history.
#[derive(Debug)]
pub struct Tournament {
    config: TournamentConfig,
    catalog: Catalog,
    rewards: RewardTable,
    participants: Vec<Participant>,
    bracket: Bracket,
    dice: SeededDice,
    status: TournamentStatus,
    events: Vec<TournamentEvent>,
}

impl Tournament {
    /// Seed the bracket and get ready to play.
    pub fn new(
        config: TournamentConfig,
        catalog: Catalog,
        rewards: RewardTable,
        mut participants: Vec<Participant>,
    ) -> TournamentResult<Self> {
        let mut dice = SeededDice::new(config.seed);
        let ids: Vec<CombatantId> = participants.iter().map(Participant::id).collect();
        let bracket = Bracket::new(config.format, &ids, config.size, &mut dice)?;
        for (seed, p) in participants.iter_mut().enumerate() {
            p.seed = seed;
        }

        tracing::info!(
            format = %config.format,
            entrants = participants.len(),
            rules = %config.rules,
            seed = config.seed,
            "tournament created"
        );
        Ok(Self {
            config,
            catalog,
            rewards,
            participants,
            bracket,
            dice,
            status: TournamentStatus::InProgress,
            events: Vec::new(),
        })
    }

    /// Tournament configuration.
    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    /// The combat catalog matches are fought with.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The reward table.
    pub fn rewards(&self) -> &RewardTable {
        &self.rewards
    }

    /// All participants in seed order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Look up a participant.
    pub fn participant(&self, id: CombatantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id() == id)
    }

    fn participant_mut(&mut self, id: CombatantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id() == id)
    }

    /// The bracket.
    pub fn bracket(&self) -> &Bracket {
        &self.bracket
    }

    /// Event history.
    pub fn events(&self) -> &[TournamentEvent] {
        &self.events
    }

    /// Current status.
    pub fn status(&self) -> TournamentStatus {
        self.status
    }

    /// The champion, once finished.
    pub fn champion(&self) -> Option<CombatantId> {
        self.bracket.champion()
    }

    /// Win/loss standings, best first.
    pub fn standings(&self) -> Vec<Standing> {
        self.bracket.standings()
    }

    fn ensure_running(&self) -> TournamentResult<()> {
        match self.status {
            TournamentStatus::InProgress => Ok(()),
            TournamentStatus::Finished | TournamentStatus::Abandoned => Err(TournamentError::TournamentFinished),
        }
    }

    /// Stop the tournament. Rewards already granted stay granted.
    pub fn abandon(&mut self) -> TournamentResult<()> {
        self.ensure_running()?;
        let round = self.bracket.current_round();
        self.status = TournamentStatus::Abandoned;
        self.events.push(TournamentEvent::Abandoned { round });
        tracing::info!(round, "tournament abandoned");
        Ok(())
    }

    /// Record the winner of a match decided outside the simulator.
    ///
    /// The returned record is the only place the match's rewards are
    /// reported; recording the same match again is an error.
    pub fn record_result(
        &mut self,
        round: usize,
        position: usize,
        winner: CombatantId,
    ) -> TournamentResult<ResultRecord> {
        self.ensure_running()?;
        let completion = self.bracket.record_result(round, position, winner)?;
        Ok(self.after_completion(completion))
    }

    fn walkover(&mut self, round: usize, position: usize, winner: CombatantId) -> TournamentResult<PlayedMatch> {
        let completion = self.bracket.record_walkover(round, position, winner)?;
        self.events.push(TournamentEvent::Walkover {
            round,
            position,
            winner,
        });
        tracing::debug!(round, position, %winner, "walkover");
        Ok(PlayedMatch {
            record: self.after_completion(completion),
            report: None,
        })
    }

    fn after_completion(&mut self, completion: MatchCompletion) -> ResultRecord {
        let round = completion.round;
        let mut rewards = Vec::new();
        if !completion.walkover {
            let stage = stage_key(self.bracket.format(), self.bracket.size(), round);
            rewards.push(self.grant(completion.winner, RewardReason::Stage(stage)));
        }
        if self.bracket.knocks_out(completion.loser) {
            if let Some(loser) = self.participant_mut(completion.loser) {
                loser.eliminate(round);
            }
        }
        if completion.round_completed {
            self.events.push(TournamentEvent::RoundCompleted { round });
            tracing::info!(round = round + 1, "round complete");
        }
        if completion.finished {
            self.finish(&mut rewards);
        }
        ResultRecord { completion, rewards }
    }

    fn finish(&mut self, rewards: &mut Vec<RewardGrant>) {
        self.status = TournamentStatus::Finished;
        if let Some(champion) = self.bracket.champion() {
            rewards.push(self.grant(champion, RewardReason::Champion));
            if let Some(runner_up) = self.bracket.runner_up() {
                rewards.push(self.grant(runner_up, RewardReason::RunnerUp));
            }
            self.events.push(TournamentEvent::Finished { champion });
            tracing::info!(
                champion = self.participant(champion).map_or("?", Participant::name),
                "tournament finished"
            );
        }
    }

    fn grant(&mut self, recipient: CombatantId, reason: RewardReason) -> RewardGrant {
        let grant = RewardGrant {
            recipient,
            reason,
            reward: self.rewards.lookup(reason),
        };
        if let Some(p) = self.participant_mut(recipient) {
            p.earned += grant.reward;
        }
        self.events.push(TournamentEvent::RewardGranted(grant));
        grant
    }

    /// The side that advances without a fight, if either side is dead.
    fn walkover_winner(&self, a: CombatantId, b: CombatantId) -> Option<CombatantId> {
        let dead = |id| self.participant(id).is_some_and(|p| p.died);
        match (dead(a), dead(b)) {
            (false, false) => None,
            (true, false) => Some(b),
            (false, true) | (true, true) => Some(a),
        }
    }

    fn job(&mut self, position: usize, a: CombatantId, b: CombatantId) -> TournamentResult<Job> {
        let pa = self.participant(a).ok_or(TournamentError::UnknownParticipant(a))?;
        let pb = self.participant(b).ok_or(TournamentError::UnknownParticipant(b))?;
        let fighters = [pa.combatant.clone(), pb.combatant.clone()];
        let difficulties = [pa.difficulty, pb.difficulty];
        Ok(Job {
            position,
            fighters,
            difficulties,
            seed: self.dice.seed(),
        })
    }

    /// Fold a finished match back into the tournament.
    fn apply_report(&mut self, round: usize, position: usize, report: MatchReport) -> TournamentResult<PlayedMatch> {
        let completion = self.bracket.record_result(round, position, report.winner_id)?;
        self.events.push(TournamentEvent::MatchPlayed {
            round,
            position,
            winner: report.winner_id,
            loser: report.loser_id,
            decision: report.decision,
            turns: report.turns,
        });

        let recovery = self.config.recovery;
        for side in [Side::A, Side::B] {
            let delta = report.delta(side);
            let died = side == report.loser && report.loser_died;
            if let Some(p) = self.participant_mut(delta.id) {
                p.combatant.apply_delta(&delta);
                if died {
                    p.died = true;
                    p.eliminate(round);
                } else {
                    p.combatant.recover(recovery);
                }
            }
        }
        if report.loser_died {
            self.events.push(TournamentEvent::Died {
                participant: report.loser_id,
                round,
            });
            tracing::info!(round = round + 1, fighter = %report.fighter(report.loser).name, "died in the arena");
        }

        Ok(PlayedMatch {
            record: self.after_completion(completion),
            report: Some(report),
        })
    }

    /// The next match waiting to be fought.
    pub fn next_match(&self) -> Option<(usize, usize, CombatantId, CombatantId)> {
        if self.status != TournamentStatus::InProgress {
            return None;
        }
        let m = self.bracket.next_ready()?;
        let (a, b) = m.entrants()?;
        Some((m.round, m.position, a, b))
    }

    /// Fight the next match. Returns `None` when nothing is ready.
    pub fn play_next(&mut self) -> TournamentResult<Option<PlayedMatch>> {
        self.ensure_running()?;
        let Some((round, position, a, b)) = self.next_match() else {
            return Ok(None);
        };
        if let Some(winner) = self.walkover_winner(a, b) {
            return self.walkover(round, position, winner).map(Some);
        }
        let job = self.job(position, a, b)?;
        let report = job.run(&self.catalog, self.config.match_config());
        self.apply_report(round, position, report).map(Some)
    }

    /// Fight every match of the current round, one after another.
    pub fn play_round(&mut self) -> TournamentResult<Vec<PlayedMatch>> {
        self.ensure_running()?;
        let round = self.bracket.current_round();
        let mut played = Vec::new();
        while self.status == TournamentStatus::InProgress && self.bracket.current_round() == round {
            match self.play_next()? {
                Some(m) => played.push(m),
                None => break,
            }
        }
        Ok(played)
    }

    /// Fight every match of the current round, simulating independent
    /// matches on worker threads.
    ///
    /// Matches are split into consecutive waves in which no participant
    /// appears twice. Seeds are drawn in match order before each wave is
    /// simulated and results are recorded in match order, so the bracket,
    /// rewards and fighters end up exactly as [`Self::play_round`] leaves them.
    pub fn play_round_parallel(&mut self) -> TournamentResult<Vec<PlayedMatch>> {
        self.ensure_running()?;
        let round = self.bracket.current_round();
        let pending: Vec<(usize, CombatantId, CombatantId)> = self
            .bracket
            .ready_matches()
            .iter()
            .filter_map(|m| {
                let (a, b) = m.entrants()?;
                Some((m.position, a, b))
            })
            .collect();

        let mut played = Vec::new();
        let mut rest = pending.as_slice();
        while !rest.is_empty() {
            let mut seen = Vec::new();
            let wave_len = rest
                .iter()
                .take_while(|(_, a, b)| {
                    let free = !seen.contains(a) && !seen.contains(b);
                    seen.extend([*a, *b]);
                    free
                })
                .count();
            let (wave, tail) = rest.split_at(wave_len);
            rest = tail;

            let mut jobs = Vec::with_capacity(wave.len());
            for &(position, a, b) in wave {
                match self.walkover_winner(a, b) {
                    Some(winner) => played.push(self.walkover(round, position, winner)?),
                    None => jobs.push(self.job(position, a, b)?),
                }
            }

            let catalog = &self.catalog;
            let config = self.config.match_config();
            let reports: Vec<(usize, MatchReport)> = jobs
                .into_par_iter()
                .map(|job| (job.position, job.run(catalog, config)))
                .collect();
            tracing::debug!(round = round + 1, matches = reports.len(), "wave simulated");

            for (position, report) in reports {
                played.push(self.apply_report(round, position, report)?);
            }
        }
        Ok(played)
    }

    /// Play rounds until a champion is crowned.
    pub fn run(&mut self, parallel: bool) -> TournamentResult<Option<CombatantId>> {
        while self.status == TournamentStatus::InProgress {
            let played = if parallel {
                self.play_round_parallel()?
            } else {
                self.play_round()?
            };
            if played.is_empty() {
                break;
            }
        }
        Ok(self.champion())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketFormat;
    use crate::reward::{Reward, StageKey};
    use ludus_combat::MatchRules;

    const NAMES: [&str; 8] = ["Spartacus", "Crixus", "Oenomaus", "Gannicus", "Flamma", "Priscus", "Verus", "Carpophorus"];

    fn roster(n: usize) -> Vec<Participant> {
        let catalog = Catalog::standard();
        (0..n)
            .map(|i| {
                let class = &catalog.classes[i % catalog.classes.len()].id;
                let combatant = catalog.spawn(class, NAMES[i % NAMES.len()], 1 + (i as u32 % 3)).unwrap();
                Participant::new(combatant, Difficulty::ALL[i % 4])
            })
            .collect()
    }

    fn tournament(config: TournamentConfig, entrants: Vec<Participant>) -> Tournament {
        Tournament::new(config, Catalog::standard(), RewardTable::standard(), entrants).unwrap()
    }

    #[test]
    fn needs_two_entrants() {
        let err = Tournament::new(
            TournamentConfig::default(),
            Catalog::standard(),
            RewardTable::standard(),
            roster(1),
        )
        .unwrap_err();
        assert!(matches!(err, TournamentError::InsufficientParticipants(1)));
    }

    #[test]
    fn eight_entrant_single_elimination_crowns_champion() {
        let mut t = tournament(TournamentConfig::default().with_seed(11), roster(8));
        let champion = t.run(false).unwrap().unwrap();
        assert_eq!(t.status(), TournamentStatus::Finished);

        let played = t
            .events()
            .iter()
            .filter(|e| matches!(e, TournamentEvent::MatchPlayed { .. }))
            .count();
        assert_eq!(played, 7);

        let winner = t.participant(champion).unwrap();
        assert!(!winner.eliminated);
        let table = t.rewards();
        let mut expected = Reward::default();
        for reward in [table.quarterfinal, table.semifinal, table.final_match, table.champion] {
            expected += reward;
        }
        assert_eq!(winner.earned, expected);
        assert_eq!(t.participants().iter().filter(|p| p.eliminated).count(), 7);
    }

    #[test]
    fn parallel_round_matches_sequential() {
        for format in BracketFormat::ALL {
            let entrants = roster(7);
            let config = TournamentConfig::default().with_format(format).with_seed(99);
            let mut seq = tournament(config, entrants.clone());
            let mut par = tournament(config, entrants);
            seq.run(false).unwrap();
            par.run(true).unwrap();
            assert_eq!(seq.champion(), par.champion());
            assert_eq!(seq.bracket(), par.bracket());
            for (a, b) in seq.participants().iter().zip(par.participants()) {
                assert_eq!(a.combatant.hp, b.combatant.hp);
                assert_eq!(a.earned, b.earned);
            }
        }
    }

    #[test]
    fn same_seed_same_tournament() {
        let entrants = roster(6);
        let config = TournamentConfig::default().with_seed(5);
        let mut first = tournament(config, entrants.clone());
        let mut second = tournament(config, entrants);
        assert_eq!(first.run(false).unwrap(), second.run(false).unwrap());
        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn dead_fighters_give_walkovers() {
        let mut entrants = roster(3);
        // the third seed opens round one against the second
        entrants[2].combatant.hp.set(0);
        let doomed = entrants[2].id();
        let config = TournamentConfig::default()
            .with_format(BracketFormat::RoundRobin)
            .with_rules(MatchRules::Death);
        let mut t = tournament(config, entrants);
        t.run(false).unwrap();

        let p = t.participant(doomed).unwrap();
        assert!(p.died);
        assert_eq!(p.earned, Reward::default());
        let walkovers: Vec<_> = t
            .events()
            .iter()
            .filter_map(|e| match e {
                TournamentEvent::Walkover { winner, .. } => Some(*winner),
                _ => None,
            })
            .collect();
        assert_eq!(walkovers.len(), 1);
        assert_ne!(walkovers[0], doomed);
        let stage_grants = t
            .events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    TournamentEvent::RewardGranted(RewardGrant {
                        reason: RewardReason::Stage(_),
                        ..
                    })
                )
            })
            .count();
        assert_eq!(stage_grants, 2);
    }

    #[test]
    fn record_result_pays_once() {
        let entrants = roster(2);
        let (a, b) = (entrants[0].id(), entrants[1].id());
        let config = TournamentConfig::default().with_format(BracketFormat::Gauntlet);
        let mut t = tournament(config, entrants);

        let record = t.record_result(0, 0, b).unwrap();
        assert!(record.completion.finished);
        let reasons: Vec<_> = record.rewards.iter().map(|g| (g.recipient, g.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                (b, RewardReason::Stage(StageKey::Bout)),
                (b, RewardReason::Champion),
                (a, RewardReason::RunnerUp),
            ]
        );
        assert!(matches!(
            t.record_result(0, 0, b),
            Err(TournamentError::TournamentFinished)
        ));
        assert_eq!(t.participant(a).unwrap().earned, t.rewards().runner_up);
    }

    #[test]
    fn huge_payouts_saturate_earnings() {
        let entrants = roster(2);
        let b = entrants[1].id();
        let huge = Reward::new(u32::MAX, u32::MAX);
        let rewards = RewardTable {
            bout: huge,
            champion: huge,
            ..RewardTable::standard()
        };
        let config = TournamentConfig::default().with_format(BracketFormat::Gauntlet);
        let mut t = Tournament::new(config, Catalog::standard(), rewards, entrants).unwrap();

        t.record_result(0, 0, b).unwrap();
        assert_eq!(t.participant(b).unwrap().earned, huge);
    }

    #[test]
    fn record_result_rejects_strangers() {
        let mut t = tournament(TournamentConfig::default(), roster(4));
        let stranger = CombatantId::new();
        assert!(matches!(
            t.record_result(0, 0, stranger),
            Err(TournamentError::InvalidWinner { .. })
        ));
    }

    #[test]
    fn abandon_keeps_rewards_and_stops_play() {
        let mut t = tournament(TournamentConfig::default(), roster(4));
        let played = t.play_next().unwrap().unwrap();
        let winner = played.record.completion.winner;
        let earned = t.participant(winner).unwrap().earned;
        assert_eq!(earned, t.rewards().semifinal);

        t.abandon().unwrap();
        assert_eq!(t.status(), TournamentStatus::Abandoned);
        assert!(t.next_match().is_none());
        assert!(matches!(t.play_next(), Err(TournamentError::TournamentFinished)));
        assert!(matches!(t.abandon(), Err(TournamentError::TournamentFinished)));
        assert_eq!(t.participant(winner).unwrap().earned, earned);
    }

    #[test]
    fn survivors_recover_between_matches() {
        let mut t = tournament(TournamentConfig::default().with_recovery(1.0), roster(4));
        let played = t.play_next().unwrap().unwrap();
        let report = played.report.unwrap();
        for id in [report.winner_id, report.loser_id] {
            let c = &t.participant(id).unwrap().combatant;
            assert!(c.hp.is_full());
            assert!(c.stamina.is_full());
            assert!(c.effects.is_empty());
        }
    }

    #[test]
    fn gauntlet_runs_entrant_count_minus_one_rounds() {
        let entrants = roster(5);
        let runner = entrants[0].id();
        let mut t = tournament(TournamentConfig::default().with_format(BracketFormat::Gauntlet), entrants);
        let champion = t.run(true).unwrap();
        let bouts: Vec<_> = t
            .events()
            .iter()
            .filter_map(|e| match e {
                TournamentEvent::MatchPlayed { round, winner, loser, .. } => Some((*round, *winner, *loser)),
                _ => None,
            })
            .collect();
        assert_eq!(bouts.len(), 4);
        for (i, (round, winner, loser)) in bouts.iter().enumerate() {
            assert_eq!(*round, i);
            assert!(*winner == runner || *loser == runner);
        }
        assert!(t.participant(runner).unwrap().round_eliminated.is_none());
        assert!(champion.is_some());
        assert_eq!(t.bracket().rounds().len(), 4);
        let rounds_completed = t
            .events()
            .iter()
            .filter(|e| matches!(e, TournamentEvent::RoundCompleted { .. }))
            .count();
        assert_eq!(rounds_completed, 4);
    }
}
