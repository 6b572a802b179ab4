//! Evaluation listing command.

use console::style;

use nps_dashboard::metrics::classify;
use nps_dashboard::{Category, HttpScoringClient, Record, ScoringService};

use crate::cli::helpers::{category_label, truncate};

const TEXT_WIDTH: usize = 70;

/// List scored evaluations (best first) or pending ones.
pub async fn cmd_records(
    client: &HttpScoringClient,
    pending: bool,
    categories: &[Category],
    limit: usize,
) -> anyhow::Result<()> {
    let records = client.fetch_all_records().await?;

    if pending {
        let rows: Vec<&Record> = records.iter().filter(|r| r.is_pending()).collect();
        if rows.is_empty() {
            println!("{} All evaluations are scored", style("✓").green());
            return Ok(());
        }
        println!(
            "{} {} evaluations awaiting sentiment analysis",
            style("!").yellow(),
            rows.len()
        );
        println!("{:>6}  {}", style("ID").bold(), style("Evaluation").bold());
        for record in rows.iter().take(limit) {
            println!("{:>6}  {}", record.id, truncate(&record.text, TEXT_WIDTH));
        }
        return Ok(());
    }

    let rows = scored_rows(&records, categories)?;
    if rows.is_empty() {
        println!("{} No scored evaluations match", style("!").yellow());
        println!("  Run `nps score` to analyze pending evaluations");
        return Ok(());
    }

    println!(
        "{:>6}  {:<11} {:>5}  {}",
        style("ID").bold(),
        style("Category").bold(),
        style("Score").bold(),
        style("Evaluation").bold()
    );
    for (record, category, score) in rows.iter().take(limit) {
        println!(
            "{:>6}  {:<11} {:>5.1}  {}",
            record.id,
            category_label(*category),
            score,
            truncate(&record.text, TEXT_WIDTH)
        );
    }
    if rows.len() > limit {
        println!(
            "  {} {} more (use --limit to show more)",
            style("→").dim(),
            rows.len() - limit
        );
    }
    Ok(())
}

/// Scored records in the requested categories, highest score first.
/// An empty filter keeps every category.
fn scored_rows<'a>(
    records: &'a [Record],
    categories: &[Category],
) -> anyhow::Result<Vec<(&'a Record, Category, f64)>> {
    let mut rows = Vec::new();
    for record in records {
        let (Some(category), Some(score)) = (classify(record)?, record.score) else {
            continue;
        };
        if categories.is_empty() || categories.contains(&category) {
            rows.push((record, category, score));
        }
    }
    rows.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.id.cmp(&b.0.id)));
    Ok(rows)
}
