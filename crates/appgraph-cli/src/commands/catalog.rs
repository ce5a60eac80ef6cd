//! Query catalog commands.

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use appgraph_graph::queries::{self, CatalogQuery};

use crate::config::AppConfig;
use crate::output;

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List catalog queries
    List {
        /// Only this section
        #[arg(long)]
        section: Option<String>,
    },

    /// Show a query's Cypher and SQL
    Show {
        /// Query id
        id: String,
    },

    /// Run catalog queries against the graph
    Run {
        /// Query id
        id: Option<String>,

        /// Run every query in a section
        #[arg(long, conflicts_with = "id")]
        section: Option<String>,

        /// Run the whole catalog
        #[arg(long, conflicts_with_all = ["id", "section"])]
        all: bool,
    },

    /// Run a query's SQL equivalent against the relational source
    Sql {
        /// Query id
        id: String,
    },
}

pub async fn execute(cmd: CatalogCommands, config: &AppConfig) -> Result<()> {
    match cmd {
        CatalogCommands::List { section } => cmd_list(section.as_deref()),
        CatalogCommands::Show { id } => cmd_show(&id),
        CatalogCommands::Run { id, section, all } => {
            let selected = select(id.as_deref(), section.as_deref(), all)?;
            cmd_run(config, &selected).await
        }
        CatalogCommands::Sql { id } => cmd_sql(config, &id),
    }
}

fn lookup(id: &str) -> Result<&'static CatalogQuery> {
    match queries::find(id) {
        Some(query) => Ok(query),
        None => bail!("Unknown catalog query '{}'. Run 'appgraph catalog list'.", id),
    }
}

fn select(id: Option<&str>, section: Option<&str>, all: bool) -> Result<Vec<&'static CatalogQuery>> {
    if all {
        return Ok(queries::catalog().iter().collect());
    }
    if let Some(section) = section {
        let selected = queries::in_section(section);
        if selected.is_empty() {
            bail!(
                "Unknown section '{}'. Sections: {}",
                section,
                queries::sections().join(", ")
            );
        }
        return Ok(selected);
    }
    match id {
        Some(id) => Ok(vec![lookup(id)?]),
        None => bail!("Give a query id, --section or --all"),
    }
}

fn cmd_list(section: Option<&str>) -> Result<()> {
    for name in queries::sections() {
        if section.is_some_and(|s| s != name) {
            continue;
        }
        println!("{}", name.to_uppercase().bold());
        for query in queries::in_section(name) {
            let sql = if query.sql.is_some() { "sql".green() } else { "   ".normal() };
            println!("  {:<28} {} {}", query.id.cyan(), sql, query.title);
        }
        println!();
    }
    Ok(())
}

fn cmd_show(id: &str) -> Result<()> {
    output::print_catalog_query(lookup(id)?);
    Ok(())
}

async fn cmd_run(config: &AppConfig, selected: &[&'static CatalogQuery]) -> Result<()> {
    let client = super::connect_graph(config).await?;

    for query in selected {
        println!("{} {}", "===".dimmed(), query.title.bold());
        let rows = queries::run_catalog_query(&client, query).await?;
        output::print_json_rows(&rows);
        println!();
    }
    Ok(())
}

fn cmd_sql(config: &AppConfig, id: &str) -> Result<()> {
    let query = lookup(id)?;
    let pool = super::open_db(config)?;

    match queries::run_catalog_sql(&pool, query)? {
        Some(table) => {
            println!("{} {}", "===".dimmed(), query.title.bold());
            output::print_query_table(&table);
        }
        None => println!("{}", format!("'{}' has no SQL equivalent.", id).dimmed()),
    }
    Ok(())
}
