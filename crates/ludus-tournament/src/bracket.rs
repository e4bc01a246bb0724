//! Bracket generation and advancement for the three tournament formats.
//!
//! A [`Bracket`] only knows combatant IDs. It decides who meets whom and
//! moves winners forward; fighting the matches is the tournament's job.

use std::fmt;

use ludus_combat::{CombatantId, Dice, shuffle};
use serde::{Deserialize, Serialize};

use crate::error::{TournamentError, TournamentResult};

/// Tournament format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BracketFormat {
    /// Knockout tree; losers are out.
    #[default]
    SingleElimination,
    /// Everyone fights everyone once.
    RoundRobin,
    /// King of the hill: the reigning winner faces each entrant in turn.
    Gauntlet,
}

impl BracketFormat {
    /// Every format.
    pub const ALL: [BracketFormat; 3] = [Self::SingleElimination, Self::RoundRobin, Self::Gauntlet];

    /// Parse a format name. Accepts dashes or underscores, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|f| f.to_string().eq_ignore_ascii_case(&s))
    }

}

impl fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleElimination => write!(f, "single-elimination"),
            Self::RoundRobin => write!(f, "round-robin"),
            Self::Gauntlet => write!(f, "gauntlet"),
        }
    }
}

/// One side of a bracket match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// A real participant.
    Entrant(CombatantId),
    /// Nobody: the other side advances automatically.
    Bye,
    /// To be decided by an earlier match.
    Pending,
}

impl Slot {
    /// The participant in this slot, if any.
    pub fn entrant(self) -> Option<CombatantId> {
        match self {
            Self::Entrant(id) => Some(id),
            Self::Bye | Self::Pending => None,
        }
    }
}

/// A single match in the bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    /// Round index, from 0.
    pub round: usize,
    /// Position within the round, from 0.
    pub position: usize,
    /// The two sides.
    pub slots: [Slot; 2],
    /// Winner, set exactly once.
    pub winner: Option<CombatantId>,
    /// True once a winner is set.
    pub completed: bool,
    /// Awarded without a fight.
    pub walkover: bool,
}

impl BracketMatch {
    fn new(round: usize, position: usize, slots: [Slot; 2]) -> Self {
        Self {
            round,
            position,
            slots,
            winner: None,
            completed: false,
            walkover: false,
        }
    }

    /// Both participants, if both slots hold real entrants.
    pub fn entrants(&self) -> Option<(CombatantId, CombatantId)> {
        Some((self.slots[0].entrant()?, self.slots[1].entrant()?))
    }

    /// Returns true if the match can be fought now (ignoring the round cursor).
    pub fn is_ready(&self) -> bool {
        !self.completed && self.entrants().is_some()
    }

    /// Returns true if one side is a bye.
    pub fn is_bye(&self) -> bool {
        self.slots.contains(&Slot::Bye)
    }

    /// Returns true if `id` occupies either slot.
    pub fn involves(&self, id: CombatantId) -> bool {
        self.slots.contains(&Slot::Entrant(id))
    }

    /// The losing participant of a fought match.
    pub fn loser(&self) -> Option<CombatantId> {
        let winner = self.winner?;
        let (a, b) = self.entrants()?;
        Some(if winner == a { b } else { a })
    }

    fn complete_bye(&mut self) {
        if self.completed {
            return;
        }
        let advancing = match self.slots {
            [Slot::Entrant(id), Slot::Bye] | [Slot::Bye, Slot::Entrant(id)] => id,
            _ => return,
        };
        self.winner = Some(advancing);
        self.completed = true;
    }
}

/// What recording a result did to the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCompletion {
    /// Round of the recorded match.
    pub round: usize,
    /// Position of the recorded match.
    pub position: usize,
    /// Winner.
    pub winner: CombatantId,
    /// Loser.
    pub loser: CombatantId,
    /// Awarded without a fight.
    pub walkover: bool,
    /// The result closed its round.
    pub round_completed: bool,
    /// The result closed the whole bracket.
    pub finished: bool,
}

/// A row of the standings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Participant.
    pub id: CombatantId,
    /// Matches won, walkovers included.
    pub wins: u32,
    /// Matches lost.
    pub losses: u32,
    /// Wins against participants level on wins.
    pub head_to_head: u32,
    /// Entry order.
    pub seed: usize,
}

/// Rounds of matches plus the cursor that tracks progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    format: BracketFormat,
    size: usize,
    entrants: Vec<CombatantId>,
    rounds: Vec<Vec<BracketMatch>>,
    current_round: usize,
}

impl Bracket {
    /// Build a bracket for `entrants` in seed order.
    ///
    /// `size` only applies to single elimination, where it must be a power
    /// of two that seats everyone without a round made of byes alone; it
    /// defaults to the next power of two. Other formats accept `None` or the
    /// entrant count. The dice shuffle single-elimination seeding.
    pub fn new(
        format: BracketFormat,
        entrants: &[CombatantId],
        size: Option<usize>,
        dice: &mut dyn Dice,
    ) -> TournamentResult<Self> {
        let n = entrants.len();
        if n < 2 {
            return Err(TournamentError::InsufficientParticipants(n));
        }
        for (i, id) in entrants.iter().enumerate() {
            if entrants[..i].contains(id) {
                return Err(TournamentError::DuplicateParticipant(*id));
            }
        }

        let mut bracket = match format {
            BracketFormat::SingleElimination => Self::single_elimination(entrants, size, dice)?,
            BracketFormat::RoundRobin | BracketFormat::Gauntlet => {
                if let Some(size) = size.filter(|s| *s != n) {
                    return Err(TournamentError::InvalidBracketSize { size, entrants: n });
                }
                if format == BracketFormat::RoundRobin {
                    Self::round_robin(entrants)
                } else {
                    Self::gauntlet(entrants)
                }
            }
        };
        bracket.settle();
        tracing::debug!(
            %format,
            entrants = n,
            size = bracket.size,
            rounds = bracket.rounds.len(),
            "bracket generated"
        );
        Ok(bracket)
    }

    fn single_elimination(
        entrants: &[CombatantId],
        size: Option<usize>,
        dice: &mut dyn Dice,
    ) -> TournamentResult<Self> {
        let n = entrants.len();
        let size = size.unwrap_or_else(|| n.next_power_of_two());
        if !size.is_power_of_two() || size < n || size >= 2 * n {
            return Err(TournamentError::InvalidBracketSize { size, entrants: n });
        }

        let mut order = entrants.to_vec();
        shuffle(&mut order, dice);
        let byes = size - n;
        let mut queue = order.into_iter();
        let mut next_slot = || queue.next().map_or(Slot::Bye, Slot::Entrant);

        let mut rounds = Vec::new();
        let first: Vec<BracketMatch> = (0..size / 2)
            .map(|position| {
                let a = next_slot();
                let b = if position < byes { Slot::Bye } else { next_slot() };
                BracketMatch::new(0, position, [a, b])
            })
            .collect();
        rounds.push(first);

        let total_rounds = size.trailing_zeros() as usize;
        for round in 1..total_rounds {
            let matches = (0..size >> (round + 1))
                .map(|position| BracketMatch::new(round, position, [Slot::Pending, Slot::Pending]))
                .collect();
            rounds.push(matches);
        }

        Ok(Self {
            format: BracketFormat::SingleElimination,
            size,
            entrants: entrants.to_vec(),
            rounds,
            current_round: 0,
        })
    }

    /// Every pair once, in circle-method order, chunked into rounds.
    fn round_robin(entrants: &[CombatantId]) -> Self {
        let n = entrants.len();
        let mut circle: Vec<Option<CombatantId>> = entrants.iter().copied().map(Some).collect();
        if n % 2 == 1 {
            circle.push(None);
        }
        let m = circle.len();

        let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
        for _ in 0..m - 1 {
            for i in 0..m / 2 {
                if let (Some(a), Some(b)) = (circle[i], circle[m - 1 - i]) {
                    pairs.push([a, b]);
                }
            }
            circle[1..].rotate_right(1);
        }

        let rounds = pairs
            .chunks(n.div_ceil(2))
            .enumerate()
            .map(|(round, chunk)| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(position, &[a, b])| {
                        BracketMatch::new(round, position, [Slot::Entrant(a), Slot::Entrant(b)])
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            format: BracketFormat::RoundRobin,
            size: n,
            entrants: entrants.to_vec(),
            rounds,
            current_round: 0,
        }
    }

    /// Entrant 0 against each other entrant in seed order, one bout per
    /// round. Every slot is known up front.
    fn gauntlet(entrants: &[CombatantId]) -> Self {
        let runner = entrants[0];
        let rounds = entrants[1..]
            .iter()
            .enumerate()
            .map(|(round, &challenger)| {
                vec![BracketMatch::new(
                    round,
                    0,
                    [Slot::Entrant(runner), Slot::Entrant(challenger)],
                )]
            })
            .collect();
        Self {
            format: BracketFormat::Gauntlet,
            size: entrants.len(),
            entrants: entrants.to_vec(),
            rounds,
            current_round: 0,
        }
    }

    /// Complete byes in the current round and, while it is complete, move
    /// the cursor on. Single elimination also carries the winners into the
    /// next round's placeholders; the other formats are fully seeded.
    fn settle(&mut self) {
        loop {
            let current = self.current_round;
            for m in &mut self.rounds[current] {
                m.complete_bye();
            }
            if !self.round_complete(current) || current + 1 >= self.rounds.len() {
                return;
            }

            let next = current + 1;
            if self.format == BracketFormat::SingleElimination {
                let winners: Vec<CombatantId> = self.rounds[current].iter().filter_map(|m| m.winner).collect();
                for (position, pair) in winners.chunks(2).enumerate() {
                    if let Some(m) = self.rounds[next].get_mut(position) {
                        let second = pair.get(1).map_or(Slot::Bye, |id| Slot::Entrant(*id));
                        m.slots = [Slot::Entrant(pair[0]), second];
                    }
                }
            }
            self.current_round = next;
            tracing::debug!(round = next, "bracket advanced");
        }
    }

    /// Record the winner of a fought match.
    pub fn record_result(
        &mut self,
        round: usize,
        position: usize,
        winner: CombatantId,
    ) -> TournamentResult<MatchCompletion> {
        self.complete(round, position, winner, false)
    }

    /// Award a match without a fight.
    pub fn record_walkover(
        &mut self,
        round: usize,
        position: usize,
        winner: CombatantId,
    ) -> TournamentResult<MatchCompletion> {
        self.complete(round, position, winner, true)
    }

    fn complete(
        &mut self,
        round: usize,
        position: usize,
        winner: CombatantId,
        walkover: bool,
    ) -> TournamentResult<MatchCompletion> {
        if self.is_finished() {
            return Err(TournamentError::TournamentFinished);
        }
        let current = self.current_round;
        let m = self
            .rounds
            .get_mut(round)
            .and_then(|r| r.get_mut(position))
            .ok_or(TournamentError::MatchNotFound { round, position })?;
        if m.completed {
            return Err(TournamentError::MatchAlreadyCompleted { round, position });
        }
        let Some((a, b)) = m.entrants().filter(|_| round <= current) else {
            return Err(TournamentError::MatchNotReady { round, position });
        };
        let loser = if winner == a {
            b
        } else if winner == b {
            a
        } else {
            return Err(TournamentError::InvalidWinner {
                winner,
                round,
                position,
            });
        };

        m.winner = Some(winner);
        m.completed = true;
        m.walkover = walkover;
        self.settle();

        Ok(MatchCompletion {
            round,
            position,
            winner,
            loser,
            walkover,
            round_completed: self.round_complete(round),
            finished: self.is_finished(),
        })
    }

    /// Tournament format.
    pub fn format(&self) -> BracketFormat {
        self.format
    }

    /// Bracket size (slots in round one for single elimination, entrant count otherwise).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entrants in seed order.
    pub fn entrants(&self) -> &[CombatantId] {
        &self.entrants
    }

    /// All rounds.
    pub fn rounds(&self) -> &[Vec<BracketMatch>] {
        &self.rounds
    }

    /// Index of the round being played.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    /// Look up a match.
    pub fn get(&self, round: usize, position: usize) -> Option<&BracketMatch> {
        self.rounds.get(round)?.get(position)
    }

    /// Total number of matches, byes included.
    pub fn match_count(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }

    /// Returns true if every match in `round` is completed.
    pub fn round_complete(&self, round: usize) -> bool {
        self.rounds
            .get(round)
            .is_some_and(|r| r.iter().all(|m| m.completed))
    }

    /// Returns true once the final round is complete.
    pub fn is_finished(&self) -> bool {
        self.round_complete(self.rounds.len().saturating_sub(1))
    }

    /// Matches in the current round that can be fought now, in position order.
    pub fn ready_matches(&self) -> Vec<&BracketMatch> {
        if self.is_finished() {
            return Vec::new();
        }
        self.rounds[self.current_round]
            .iter()
            .filter(|m| m.is_ready())
            .collect()
    }

    /// The next match to fight.
    pub fn next_ready(&self) -> Option<&BracketMatch> {
        self.ready_matches().into_iter().next()
    }

    /// Win/loss table, best first: wins, then head-to-head among entrants
    /// level on wins, then seed.
    pub fn standings(&self) -> Vec<Standing> {
        let mut table: Vec<Standing> = self
            .entrants
            .iter()
            .enumerate()
            .map(|(seed, &id)| Standing {
                id,
                wins: 0,
                losses: 0,
                head_to_head: 0,
                seed,
            })
            .collect();
        let index = |id: CombatantId| self.entrants.iter().position(|e| *e == id);

        let results: Vec<(usize, usize)> = self
            .rounds
            .iter()
            .flatten()
            .filter_map(|m| Some((index(m.winner?)?, index(m.loser()?)?)))
            .collect();
        for &(w, l) in &results {
            table[w].wins += 1;
            table[l].losses += 1;
        }
        for &(w, l) in &results {
            if table[w].wins == table[l].wins {
                table[w].head_to_head += 1;
            }
        }

        table.sort_by(|x, y| {
            y.wins
                .cmp(&x.wins)
                .then(y.head_to_head.cmp(&x.head_to_head))
                .then(x.seed.cmp(&y.seed))
        });
        table
    }

    /// Returns true if losing a bout ends `loser`'s run in this bracket.
    ///
    /// Every single-elimination loss does. In a gauntlet only challengers
    /// go out; entrant 0 fights every round whatever the score. Round-robin
    /// entrants are never knocked out.
    pub fn knocks_out(&self, loser: CombatantId) -> bool {
        match self.format {
            BracketFormat::SingleElimination => true,
            BracketFormat::Gauntlet => self.entrants.first() != Some(&loser),
            BracketFormat::RoundRobin => false,
        }
    }

    /// The overall winner, once the bracket is finished.
    pub fn champion(&self) -> Option<CombatantId> {
        if !self.is_finished() {
            return None;
        }
        match self.format {
            BracketFormat::RoundRobin => self.standings().first().map(|s| s.id),
            _ => self.rounds.last()?.first()?.winner,
        }
    }

    /// Second place, once the bracket is finished.
    pub fn runner_up(&self) -> Option<CombatantId> {
        if !self.is_finished() {
            return None;
        }
        match self.format {
            BracketFormat::RoundRobin => self.standings().get(1).map(|s| s.id),
            _ => self.rounds.last()?.first()?.loser(),
        }
    }
}
