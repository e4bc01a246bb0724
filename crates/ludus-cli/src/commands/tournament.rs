use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ludus_combat::{Catalog, Difficulty};
use ludus_tournament::{Participant, Tournament, TournamentConfig, TournamentEvent, TournamentStatus};

use super::{NAMES, load_catalog, load_rewards, parse_difficulty, parse_format, parse_rules};

/// Options for `ludus tournament`.
pub struct TournamentArgs<'a> {
    pub entrants: usize,
    pub format: &'a str,
    pub size: Option<usize>,
    pub rules: &'a str,
    pub max_turns: u32,
    pub seed: u64,
    pub recovery: f64,
    pub difficulty: Option<&'a str>,
    pub parallel: bool,
    pub events: bool,
    pub catalog: Option<&'a Path>,
    pub rewards: Option<&'a Path>,
}

pub fn run(args: &TournamentArgs<'_>) -> Result<(), String> {
    let catalog = load_catalog(args.catalog)?;
    let rewards = load_rewards(args.rewards)?;
    let format = parse_format(args.format)?;
    let rules = parse_rules(args.rules)?;
    let difficulty = args.difficulty.map(parse_difficulty).transpose()?;

    let mut config = TournamentConfig::default()
        .with_format(format)
        .with_rules(rules)
        .with_max_turns(args.max_turns)
        .with_seed(args.seed)
        .with_recovery(args.recovery);
    if let Some(size) = args.size {
        config = config.with_size(size);
    }

    let roster = roster(&catalog, args.entrants, difficulty)?;
    tracing::debug!(entrants = roster.len(), "roster generated");
    let mut tournament = Tournament::new(config, catalog, rewards, roster).map_err(|e| e.to_string())?;
    tournament.run(args.parallel).map_err(|e| e.to_string())?;

    println!(
        "  {} {} {}",
        "Tournament".bold(),
        format,
        format!(
            "({} entrants, rules={rules}, seed={}{})",
            args.entrants,
            args.seed,
            if args.parallel { ", parallel" } else { "" }
        )
        .dimmed()
    );
    println!();

    print_events(&tournament, args.events);
    print_standings(&tournament);

    match (tournament.status(), tournament.champion()) {
        (TournamentStatus::Finished, Some(id)) => {
            let name = tournament.participant(id).map_or("?", Participant::name);
            println!("  {} {name}", "CHAMPION".yellow().bold());
        }
        _ => println!("  {}", "No champion was crowned.".dimmed()),
    }

    Ok(())
}

/// Generate entrants, cycling through the catalog's classes.
fn roster(catalog: &Catalog, count: usize, difficulty: Option<Difficulty>) -> Result<Vec<Participant>, String> {
    if catalog.classes.is_empty() {
        return Err("catalog defines no classes".into());
    }
    (0..count)
        .map(|i| {
            let class = &catalog.classes[i % catalog.classes.len()];
            let base = NAMES[i % NAMES.len()];
            let name = match i / NAMES.len() {
                0 => base.to_string(),
                n => format!("{base} {}", n + 1),
            };
            let level = 1 + (i % 3) as u32;
            let combatant = catalog.spawn(&class.id, name, level).map_err(|e| e.to_string())?;
            let difficulty = difficulty.unwrap_or(Difficulty::ALL[i % Difficulty::ALL.len()]);
            Ok(Participant::new(combatant, difficulty))
        })
        .collect()
}

fn print_events(tournament: &Tournament, all: bool) {
    let name = |id| tournament.participant(id).map_or("?", Participant::name);
    println!("  {}", "Results".bold().underline());
    println!();
    for event in tournament.events() {
        match event {
            TournamentEvent::MatchPlayed {
                round,
                winner,
                loser,
                decision,
                turns,
                ..
            } => println!(
                "  {} {} def. {} {}",
                format!("[round {:>2}]", round + 1).dimmed(),
                name(*winner).green(),
                name(*loser),
                format!("({decision}, {turns} turns)").dimmed()
            ),
            TournamentEvent::Walkover { round, winner, .. } => println!(
                "  {} {} advances by walkover",
                format!("[round {:>2}]", round + 1).dimmed(),
                name(*winner).green()
            ),
            TournamentEvent::Died { participant, round } => println!(
                "  {} {} {}",
                format!("[round {:>2}]", round + 1).dimmed(),
                "DEATH".red().bold(),
                name(*participant)
            ),
            TournamentEvent::RewardGranted(grant) if all => println!(
                "             {} earns {} ({})",
                name(grant.recipient),
                grant.reward.to_string().yellow(),
                grant.reason
            ),
            TournamentEvent::RoundCompleted { round } if all => {
                println!("  {}", format!("round {} complete", round + 1).dimmed());
            }
            TournamentEvent::Abandoned { round } => {
                println!("  {}", format!("abandoned during round {}", round + 1).yellow());
            }
            _ => {}
        }
    }
    println!();
}

fn print_standings(tournament: &Tournament) {
    println!("  {}", "Standings".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#", "Gladiator", "Class", "AI", "W", "L", "Status", "Gold", "Fame",
    ]);
    let champion = tournament.champion();
    for (rank, standing) in tournament.standings().iter().enumerate() {
        let Some(p) = tournament.participant(standing.id) else {
            continue;
        };
        let status = if p.died {
            "dead".red().to_string()
        } else if champion == Some(p.id()) {
            "champion".yellow().bold().to_string()
        } else if let Some(round) = p.round_eliminated {
            format!("out in round {}", round + 1)
        } else {
            "standing".green().to_string()
        };
        table.add_row(vec![
            (rank + 1).to_string(),
            p.name().to_string(),
            p.combatant.class.clone(),
            p.difficulty.to_string(),
            standing.wins.to_string(),
            standing.losses.to_string(),
            status,
            p.earned.gold.to_string(),
            p.earned.fame.to_string(),
        ]);
    }
    println!("{table}");
    println!();
}
