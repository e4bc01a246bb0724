//! Error types for brackets and tournaments.

use ludus_combat::{CombatError, CombatantId};

/// Errors raised while building or advancing a tournament.
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    /// Fewer than two entrants.
    #[error("a tournament needs at least 2 participants, got {0}")]
    InsufficientParticipants(usize),

    /// The requested bracket size cannot seat the entrants.
    #[error("invalid bracket size {size} for {entrants} entrants")]
    InvalidBracketSize {
        /// Requested size.
        size: usize,
        /// Number of entrants.
        entrants: usize,
    },

    /// The same combatant was entered twice.
    #[error("participant {0} entered more than once")]
    DuplicateParticipant(CombatantId),

    /// The bracket names a combatant the tournament does not know.
    #[error("unknown participant {0}")]
    UnknownParticipant(CombatantId),

    /// No match exists at the given coordinates.
    #[error("no match at round {round}, position {position}")]
    MatchNotFound {
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
    },

    /// The match already has a winner.
    #[error("match at round {round}, position {position} is already completed")]
    MatchAlreadyCompleted {
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
    },

    /// The match is waiting on earlier results.
    #[error("match at round {round}, position {position} is not ready")]
    MatchNotReady {
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
    },

    /// The named winner is not in the match.
    #[error("{winner} is not a participant of round {round}, position {position}")]
    InvalidWinner {
        /// The rejected winner.
        winner: CombatantId,
        /// Round index.
        round: usize,
        /// Position within the round.
        position: usize,
    },

    /// No further results can be recorded.
    #[error("tournament is already finished")]
    TournamentFinished,

    /// A combat-layer error (catalog or class lookup).
    #[error(transparent)]
    Combat(#[from] CombatError),

    /// A reward table could not be parsed.
    #[error("reward table parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience result type for tournament operations.
pub type TournamentResult<T> = Result<T, TournamentError>;
