//! Relational source commands.

use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;

use crate::config::AppConfig;
use crate::output;

#[derive(Subcommand)]
pub enum DbCommands {
    /// Create the SQLite database and applications table
    Init,

    /// Fill the applications table with generated sample data
    Seed {
        /// Number of applications to generate
        #[arg(long, default_value = "100")]
        count: usize,

        /// Random seed; the same seed produces the same inventory
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Delete existing applications first
        #[arg(long)]
        replace: bool,
    },

    /// Summarize the applications table
    Explore,

    /// Run a SQL statement against the database
    Sql {
        /// SQL statement
        statement: String,
    },
}

pub async fn execute(cmd: DbCommands, config: &AppConfig) -> Result<()> {
    let pool = super::open_db(config)?;

    match cmd {
        DbCommands::Init => cmd_init(&pool, config),
        DbCommands::Seed { count, seed, replace } => cmd_seed(&pool, count, seed, replace),
        DbCommands::Explore => cmd_explore(&pool),
        DbCommands::Sql { statement } => cmd_sql(&pool, &statement),
    }
}

fn cmd_init(pool: &appgraph_db::DbPool, config: &AppConfig) -> Result<()> {
    let count = appgraph_db::queries::applications::count_applications(pool)?;
    println!(
        "{} {} ({} applications)",
        "✓ Database ready:".green().bold(),
        config.sqlite_path.display(),
        count
    );
    Ok(())
}

fn cmd_seed(pool: &appgraph_db::DbPool, count: usize, seed: u64, replace: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let inserted = appgraph_core::generate::seed_database(pool, count, seed, today, replace)?;
    let total = appgraph_db::queries::applications::count_applications(pool)?;

    println!("{} {} applications (seed {})", "✓ Inserted".green().bold(), inserted, seed);
    println!("  Table now holds {} applications", total.to_string().cyan());
    Ok(())
}

fn cmd_explore(pool: &appgraph_db::DbPool) -> Result<()> {
    let summary = appgraph_db::queries::explore::summarize(pool)?;
    output::print_explore_summary(&summary);
    Ok(())
}

fn cmd_sql(pool: &appgraph_db::DbPool, statement: &str) -> Result<()> {
    let table = appgraph_db::queries::raw::raw_query(pool, statement)?;
    output::print_query_table(&table);
    Ok(())
}
