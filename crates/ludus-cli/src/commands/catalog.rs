use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use ludus_combat::{SkillDef, SkillKind};

use super::load_catalog;

pub fn run(path: Option<&Path>, json: bool) -> Result<(), String> {
    let catalog = load_catalog(path)?;

    if json {
        let out = serde_json::to_string_pretty(&catalog)
            .map_err(|e| format!("JSON serialization error: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    println!("  {}", "Classes".bold().underline());
    println!();
    let mut classes = Table::new();
    classes.set_content_arrangement(ContentArrangement::Dynamic);
    classes.set_header(vec!["Class", "STR", "AGI", "DEX", "END", "CON", "Weapon", "Mana", "Skills"]);
    for class in &catalog.classes {
        let skills: Vec<String> = class.skills.iter().map(ToString::to_string).collect();
        classes.add_row(vec![
            format!("{} ({})", class.name, class.id),
            class.stats.strength.to_string(),
            class.stats.agility.to_string(),
            class.stats.dexterity.to_string(),
            class.stats.endurance.to_string(),
            class.stats.constitution.to_string(),
            class.weapon_damage.to_string(),
            class.mana.to_string(),
            skills.join(", "),
        ]);
    }
    println!("{classes}");
    println!();

    println!("  {}", "Skills".bold().underline());
    println!();
    let mut skills = Table::new();
    skills.set_content_arrangement(ContentArrangement::Dynamic);
    skills.set_header(vec!["Skill", "Kind", "Mana", "Stamina", "Cooldown", "Effect"]);
    for skill in &catalog.skills {
        skills.add_row(vec![
            format!("{} ({})", skill.name, skill.id),
            kind_label(skill.kind),
            skill.mana_cost.to_string(),
            skill.stamina_cost.to_string(),
            skill.cooldown.to_string(),
            summary(skill),
        ]);
    }
    println!("{skills}");
    println!();
    println!(
        "  {} classes, {} skills",
        catalog.classes.len(),
        catalog.skills.len()
    );

    Ok(())
}

fn kind_label(kind: SkillKind) -> String {
    match kind {
        SkillKind::Offensive => "offensive".red().to_string(),
        SkillKind::Healing => "healing".green().to_string(),
        SkillKind::Buff => "buff".blue().to_string(),
    }
}

fn summary(skill: &SkillDef) -> String {
    let mut parts = Vec::new();
    match skill.kind {
        SkillKind::Offensive => parts.push(format!("x{:.2} damage", skill.damage_multiplier)),
        SkillKind::Healing => parts.push(format!("+{} HP", skill.heal)),
        SkillKind::Buff => {}
    }
    for effect in &skill.effects {
        parts.push(format!(
            "{:.0}% {} ({}t)",
            effect.chance,
            effect.kind,
            effect.duration
        ));
    }
    if parts.is_empty() {
        "—".to_string()
    } else {
        parts.join(", ")
    }
}
