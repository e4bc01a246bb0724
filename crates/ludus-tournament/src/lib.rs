//! Tournament brackets and rewards for Ludus.
//!
//! Builds single-elimination, round-robin and gauntlet brackets over a roster
//! of [`ludus_combat::Combatant`]s, fights their matches with the combat
//! engine (optionally simulating independent matches in parallel), and pays
//! stage and placement rewards from a [`RewardTable`]. Seeding and every
//! match derive from one seed, so a tournament replays exactly.

/// Bracket formats, match slots and standings.
pub mod bracket;
/// Configuration types for tournament runs.
pub mod config;
/// Error types for the tournament crate.
pub mod error;
/// Tournament entrants.
pub mod participant;
/// Reward tables and grants.
pub mod reward;
/// Top-level tournament orchestrator.
pub mod tournament;

/// Re-exports of [`bracket::Bracket`], [`bracket::BracketFormat`], [`bracket::BracketMatch`],
/// [`bracket::MatchCompletion`], [`bracket::Slot`], and [`bracket::Standing`].
pub use bracket::{Bracket, BracketFormat, BracketMatch, MatchCompletion, Slot, Standing};
/// Re-export of [`config::TournamentConfig`].
pub use config::TournamentConfig;
/// Re-exports of [`error::TournamentError`] and [`error::TournamentResult`].
pub use error::{TournamentError, TournamentResult};
/// Re-export of [`participant::Participant`].
pub use participant::Participant;
/// Re-exports of the reward types.
pub use reward::{Reward, RewardGrant, RewardReason, RewardTable, StageKey, stage_key};
/// Re-exports of [`tournament::Tournament`] and its event and result types.
pub use tournament::{PlayedMatch, ResultRecord, Tournament, TournamentEvent, TournamentStatus};
