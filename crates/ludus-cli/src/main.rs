//! CLI frontend for the Ludus gladiator combat engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ludus",
    about = "Ludus: gladiator duels and tournaments",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine decisions to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fight a single match between two classes
    Duel {
        /// Class of the first fighter (e.g. murmillo)
        first: String,

        /// Class of the second fighter
        second: String,

        /// Level of both fighters
        #[arg(short, long, default_value = "1")]
        level: u32,

        /// AI difficulty: easy, normal, hard, nightmare
        #[arg(short, long, default_value = "normal")]
        difficulty: String,

        /// Match rules: exhibition, submission, death
        #[arg(short, long, default_value = "exhibition")]
        rules: String,

        /// Turn limit before the judges decide
        #[arg(long, default_value = "30")]
        max_turns: u32,

        /// RNG seed for a reproducible match
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Print the turn-by-turn combat log
        #[arg(long)]
        log: bool,

        /// Print the match report as JSON instead of tables
        #[arg(long)]
        json: bool,

        /// Catalog JSON file (default: built-in catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// Run a full tournament with generated entrants
    Tournament {
        /// Number of entrants
        #[arg(short, long, default_value = "8")]
        entrants: usize,

        /// Bracket format: single-elimination, round-robin, gauntlet
        #[arg(short, long, default_value = "single-elimination")]
        format: String,

        /// Single-elimination bracket size (default: next power of two)
        #[arg(long)]
        size: Option<usize>,

        /// Match rules: exhibition, submission, death
        #[arg(short, long, default_value = "exhibition")]
        rules: String,

        /// Turn limit per match
        #[arg(long, default_value = "30")]
        max_turns: u32,

        /// RNG seed for seeding and every match
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Share of missing HP restored between matches
        #[arg(long, default_value = "0.5")]
        recovery: f64,

        /// AI difficulty for every entrant (default: mixed)
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Simulate independent matches on worker threads
        #[arg(short, long)]
        parallel: bool,

        /// Print the full event history
        #[arg(long)]
        events: bool,

        /// Catalog JSON file (default: built-in catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Reward table JSON file (default: built-in table)
        #[arg(long)]
        rewards: Option<PathBuf>,
    },

    /// Show the classes and skills of a catalog
    Catalog {
        /// Catalog JSON file (default: built-in catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Dump the catalog as JSON (a starting point for custom catalogs)
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Duel {
            first,
            second,
            level,
            difficulty,
            rules,
            max_turns,
            seed,
            log,
            json,
            catalog,
        } => commands::duel::run(&commands::duel::DuelArgs {
            first: &first,
            second: &second,
            level,
            difficulty: &difficulty,
            rules: &rules,
            max_turns,
            seed,
            log,
            json,
            catalog: catalog.as_deref(),
        }),
        Commands::Tournament {
            entrants,
            format,
            size,
            rules,
            max_turns,
            seed,
            recovery,
            difficulty,
            parallel,
            events,
            catalog,
            rewards,
        } => commands::tournament::run(&commands::tournament::TournamentArgs {
            entrants,
            format: &format,
            size,
            rules: &rules,
            max_turns,
            seed,
            recovery,
            difficulty: difficulty.as_deref(),
            parallel,
            events,
            catalog: catalog.as_deref(),
            rewards: rewards.as_deref(),
        }),
        Commands::Catalog { catalog, json } => commands::catalog::run(catalog.as_deref(), json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
