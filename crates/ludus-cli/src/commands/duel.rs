use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ludus_combat::{AiController, Decision, Match, MatchConfig, SeededDice, Side};

use super::{describe_entry, hp_bar, load_catalog, parse_difficulty, parse_rules};

/// Options for `ludus duel`.
pub struct DuelArgs<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub level: u32,
    pub difficulty: &'a str,
    pub rules: &'a str,
    pub max_turns: u32,
    pub seed: u64,
    pub log: bool,
    pub json: bool,
    pub catalog: Option<&'a Path>,
}

pub fn run(args: &DuelArgs<'_>) -> Result<(), String> {
    let catalog = load_catalog(args.catalog)?;
    let difficulty = parse_difficulty(args.difficulty)?;
    let rules = parse_rules(args.rules)?;

    let a = catalog
        .spawn(args.first, super::NAMES[0], args.level)
        .map_err(|e| e.to_string())?;
    let b = catalog
        .spawn(args.second, super::NAMES[1], args.level)
        .map_err(|e| e.to_string())?;

    let config = MatchConfig::default()
        .with_rules(rules)
        .with_max_rounds(args.max_turns);
    let report = Match::new(&catalog, config, a, b)
        .with_controller(Side::A, AiController::new(difficulty))
        .with_controller(Side::B, AiController::new(difficulty))
        .run(&mut SeededDice::new(args.seed));

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let [a, b] = &report.fighters;
    println!(
        "  {} {} the {} vs {} the {} {}",
        "Duel".bold(),
        a.name,
        a.class,
        b.name,
        b.class,
        format!("(rules={rules}, difficulty={difficulty}, seed={})", args.seed).dimmed()
    );
    println!();

    if args.log {
        println!("  {}", "Combat Log".bold().underline());
        println!();
        for entry in report.log.entries() {
            let (actor, other) = if entry.actor == a.id {
                (a.name.as_str(), b.name.as_str())
            } else {
                (b.name.as_str(), a.name.as_str())
            };
            let turn = format!("[turn {:>2}]", entry.turn).dimmed();
            println!("  {turn} {}", describe_entry(entry, actor, other));
        }
        println!();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Fighter", "Class", "HP", "Stamina", "Mana", "Damage dealt"]);
    for c in [a, b] {
        table.add_row(vec![
            c.name.clone(),
            c.class.clone(),
            hp_bar(c),
            c.stamina.to_string(),
            c.mana.to_string(),
            report.log.damage_by(c.id).to_string(),
        ]);
    }
    println!("{table}");
    println!();

    let winner = &report.fighter(report.winner).name;
    let loser = &report.fighter(report.loser).name;
    let how = match report.decision {
        Decision::Knockout => "by knockout",
        Decision::Submission => "by submission",
        Decision::JudgeDecision => "on the judges' decision",
    };
    println!(
        "  {} {winner} defeats {loser} {how} after {} turns",
        "WIN".green().bold(),
        report.turns
    );
    if report.loser_died {
        println!("  {} {loser}", "DEAD".red().bold());
    }

    Ok(())
}
