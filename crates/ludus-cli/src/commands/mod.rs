pub mod catalog;
pub mod duel;
pub mod tournament;

use std::fs;
use std::path::Path;

use colored::Colorize;
use ludus_combat::{Catalog, Combatant, Difficulty, LogEntry, LogKind, MatchRules};
use ludus_tournament::{BracketFormat, RewardTable};

/// Names handed to generated fighters, in order.
const NAMES: [&str; 16] = [
    "Spartacus",
    "Crixus",
    "Flamma",
    "Gannicus",
    "Oenomaus",
    "Priscus",
    "Verus",
    "Carpophorus",
    "Spiculus",
    "Tetraites",
    "Marcus Attilius",
    "Hermes",
    "Triumphus",
    "Celadus",
    "Commodus",
    "Varro",
];

/// Load a catalog from a JSON file, or the built-in one.
fn load_catalog(path: Option<&Path>) -> Result<Catalog, String> {
    let Some(path) = path else {
        return Ok(Catalog::standard());
    };
    let json = read_file(path)?;
    Catalog::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a reward table from a JSON file, or the built-in one.
fn load_rewards(path: Option<&Path>) -> Result<RewardTable, String> {
    let Some(path) = path else {
        return Ok(RewardTable::standard());
    };
    let json = read_file(path)?;
    RewardTable::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::parse(s)
        .ok_or_else(|| format!("unknown difficulty: \"{s}\". Use: easy, normal, hard, nightmare"))
}

fn parse_rules(s: &str) -> Result<MatchRules, String> {
    MatchRules::parse(s)
        .ok_or_else(|| format!("unknown rules: \"{s}\". Use: exhibition, submission, death"))
}

fn parse_format(s: &str) -> Result<BracketFormat, String> {
    BracketFormat::parse(s).ok_or_else(|| {
        format!("unknown format: \"{s}\". Use: single-elimination, round-robin, gauntlet")
    })
}

/// Colour a one-line description of a combat log entry.
fn describe_entry(entry: &LogEntry, actor: &str, other: &str) -> colored::ColoredString {
    let action = entry.action.as_ref().map(|a| a.to_string()).unwrap_or_default();
    let damage = entry.damage.unwrap_or(0);
    match &entry.kind {
        LogKind::Hit { critical, blocked } => {
            let mut line = format!("{actor} lands {action} on {other} for {damage}");
            if *critical {
                line.push_str(" (critical!)");
            }
            if *blocked {
                line.push_str(" (blocked)");
            }
            if *critical { line.red().bold() } else { line.normal() }
        }
        LogKind::Missed => format!("{actor} misses with {action}").dimmed(),
        LogKind::Dodged => format!("{other} dodges {actor}'s {action}").cyan(),
        LogKind::Defending => format!("{actor} braces behind the shield").blue(),
        LogKind::Evading => format!("{actor} circles, ready to dodge").blue(),
        LogKind::Rested { recovered } => format!("{actor} rests (+{recovered} stamina)").green(),
        LogKind::Taunted => format!("{actor} taunts {other}").yellow(),
        LogKind::Buffed => format!("{actor} uses {action}").blue(),
        LogKind::Healed { amount } => format!("{actor} heals {amount} HP").green(),
        LogKind::EffectApplied { target, effect, stacks } => {
            let who = if *target == entry.actor { actor } else { other };
            if *stacks > 1 {
                format!("{who} is {effect} (x{stacks})").magenta()
            } else {
                format!("{who} is {effect}").magenta()
            }
        }
        LogKind::EffectExpired { effect } => format!("{actor} is no longer {effect}").dimmed(),
        LogKind::Bled { stacks } => format!("{actor} bleeds for {damage} ({stacks} stacks)").red(),
        LogKind::Stunned => format!("{actor} is stunned and loses the turn").yellow(),
        LogKind::Idle => format!("{actor} does nothing").dimmed(),
        LogKind::Exhausted => format!("{actor} is exhausted").yellow(),
        LogKind::Submitted => format!("{actor} submits").yellow().bold(),
        LogKind::KnockedOut => format!("{actor} is knocked out").red().bold(),
        LogKind::JudgeDecision => format!("the judges award the match to {actor}").bold(),
        LogKind::Died => format!("{actor} dies in the arena").red().bold(),
    }
}

/// A fixed-width HP bar, coloured by how much is left.
fn hp_bar(c: &Combatant) -> String {
    let frac = c.health_fraction().clamp(0.0, 1.0);
    let filled = (frac * 10.0).round() as usize;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(10 - filled));
    let bar = if frac <= 0.2 {
        bar.red()
    } else if frac <= 0.5 {
        bar.yellow()
    } else {
        bar.green()
    };
    format!("[{bar}] {}", c.hp)
}
