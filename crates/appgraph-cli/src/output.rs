//! Terminal output formatting.

use colored::Colorize;
use serde_json::Value;

use appgraph_db::queries::explore::ExploreSummary;
use appgraph_db::QueryTable;
use appgraph_graph::queries::{CatalogQuery, GraphStatistics};
use appgraph_graph::LoadReport;

const MAX_CELL_WIDTH: usize = 40;

/// Print a load report.
pub fn print_load_report(report: &LoadReport) {
    println!("\n{}", "Load complete:".green().bold());
    println!("  Run:                   {}", report.run_id.to_string().dimmed());
    println!("  Rows read:             {}", report.rows_read);
    println!("  Rows loaded:           {}", report.rows_loaded.to_string().green());
    if report.rows_skipped > 0 {
        println!("  Rows skipped:          {}", report.rows_skipped.to_string().yellow());
        for skipped in &report.skipped {
            println!(
                "    {} row {} (app_id {}): {}",
                "•".dimmed(),
                skipped.index,
                skipped.app_id.as_deref().unwrap_or("-"),
                skipped.reason
            );
        }
    }
    if report.field_issues > 0 {
        println!(
            "  Cells loaded as null:  {} {}",
            report.field_issues.to_string().yellow(),
            "(see warnings above)".dimmed()
        );
    }
    println!("  Node upserts:          {}", report.nodes_merged);
    println!("  Relationship upserts:  {}", report.relationships_merged);
}

/// Print totals and per-label/per-type counts.
pub fn print_graph_statistics(stats: &GraphStatistics) {
    println!("{}", "─".repeat(40));
    println!("  Nodes:         {}", stats.nodes.to_string().cyan());
    for (label, count) in &stats.labels {
        println!("    {:<20} {}", label, count);
    }
    println!("  Relationships: {}", stats.relationships.to_string().cyan());
    for (rel, count) in &stats.relationship_types {
        println!("    {:<20} {}", rel, count);
    }
    println!("{}", "─".repeat(40));
}

/// Print the relational summary.
pub fn print_explore_summary(summary: &ExploreSummary) {
    println!("{}", "Applications Inventory".bold());
    println!("{}", "─".repeat(40));
    println!("  Total:             {}", summary.total.to_string().cyan());
    println!("  In use:            {}", summary.active.to_string().green());
    println!("  Not in use:        {}", summary.inactive.to_string().dimmed());
    println!("  Total annual cost: {:.2}", summary.total_annual_cost);
    println!("  Avg annual cost:   {:.2}", summary.average_annual_cost);
    println!("  With dependencies: {}", summary.with_dependencies);
    println!("  With integrations: {}", summary.with_integrations);

    let sections = [
        ("By category", &summary.by_category),
        ("Top vendors", &summary.top_vendors),
        ("By department", &summary.by_department),
        ("By criticality", &summary.by_criticality),
        ("By license type", &summary.by_license_type),
    ];
    for (title, counts) in sections {
        if counts.is_empty() {
            continue;
        }
        println!("\n{}", title.bold());
        for (value, count) in counts {
            println!("  {:<32} {}", truncate(value, 30), count);
        }
    }
}

/// Print a catalog entry.
pub fn print_catalog_query(query: &CatalogQuery) {
    println!("{} {}", query.title.cyan().bold(), format!("({})", query.id).dimmed());
    println!("{}: {}", "Section".bold(), query.section);
    println!("\n{}", "Cypher".bold());
    println!("{}", dedent(query.cypher));
    if let Some(sql) = query.sql {
        println!("\n{}", "SQL".bold());
        println!("{}", dedent(sql));
    }
}

/// Print SQL results as a table.
pub fn print_query_table(table: &QueryTable) {
    if table.columns.is_empty() {
        println!("{}", "Statement executed.".dimmed());
        return;
    }
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    print_table(&table.columns, &rows);
}

/// Print JSON objects (one per result row) as a table keyed by the first
/// row's fields.
pub fn print_json_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            println!("{}", "No results.".dimmed());
        } else {
            for (i, row) in rows.iter().enumerate() {
                println!("{}: {}", (i + 1).to_string().dimmed(), row);
            }
        }
        return;
    };

    let columns: Vec<String> = first.keys().cloned().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(json_cell).unwrap_or_default())
                .collect()
        })
        .collect();
    print_table(&columns, &cells);
}

fn json_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(json_cell).collect::<Vec<_>>().join(", "),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.2}", f),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

fn print_table(columns: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", truncate(c, *w), w = *w))
        .collect();
    println!("{}", header.join("  ").bold());
    println!("{}", "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", truncate(c, *w), w = *w))
            .collect();
        println!("{}", line.join("  "));
    }

    println!("\n{} row(s)", rows.len());
}

/// Remove the common leading indentation of a multi-line literal.
fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| if i == 0 { l.trim() } else { l.get(indent..).unwrap_or(l.trim()) })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate a string to `max` characters.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max <= 3 {
        ".".repeat(max)
    } else {
        let head: String = s.chars().take(max - 3).collect();
        format!("{}...", head)
    }
}
