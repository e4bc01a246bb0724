//! Tournament entrants.

use ludus_combat::{Combatant, CombatantId, Difficulty};
use serde::{Deserialize, Serialize};

use crate::reward::Reward;

/// A combatant entered in a tournament, with its standing in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// The fighter. Updated from match deltas as the tournament runs.
    pub combatant: Combatant,
    /// Difficulty the AI plays this fighter at.
    pub difficulty: Difficulty,
    /// Entry order, from 0.
    pub seed: usize,
    /// Knocked out of the tournament.
    pub eliminated: bool,
    /// Died in the arena.
    pub died: bool,
    /// Round in which the participant was knocked out.
    pub round_eliminated: Option<usize>,
    /// Rewards collected so far.
    pub earned: Reward,
}

impl Participant {
    /// Enter a combatant.
    pub fn new(combatant: Combatant, difficulty: Difficulty) -> Self {
        Self {
            combatant,
            difficulty,
            seed: 0,
            eliminated: false,
            died: false,
            round_eliminated: None,
            earned: Reward::default(),
        }
    }

    /// The combatant's ID.
    pub fn id(&self) -> CombatantId {
        self.combatant.id
    }

    /// The combatant's name.
    pub fn name(&self) -> &str {
        &self.combatant.name
    }

    /// Returns true while the participant is still in contention.
    pub fn is_active(&self) -> bool {
        !self.eliminated && !self.died
    }

    pub(crate) fn eliminate(&mut self, round: usize) {
        if !self.eliminated {
            self.eliminated = true;
            self.round_eliminated = Some(round);
        }
    }
}
