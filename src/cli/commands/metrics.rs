//! NPS metrics command.

use console::style;
use serde_json::json;

use nps_dashboard::metrics::{compute_metrics, pending_count, summarize_scores};
use nps_dashboard::{HttpScoringClient, ScoringService};

use crate::cli::helpers::print_metrics;

/// Fetch all evaluations and print the NPS breakdown.
pub async fn cmd_metrics(client: &HttpScoringClient, json: bool) -> anyhow::Result<()> {
    let records = client.fetch_all_records().await?;
    let metrics = compute_metrics(&records)?;
    let summary = summarize_scores(&records)?;

    if json {
        let output = json!({
            "total_records": records.len(),
            "pending": pending_count(&records),
            "metrics": metrics,
            "rating": metrics.rating(),
            "scores": summary,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("{} No evaluations found", style("!").yellow());
        return Ok(());
    }

    print_metrics(&metrics, summary.as_ref());

    let pending = pending_count(&records);
    if pending > 0 {
        println!(
            "  {} {} evaluations awaiting sentiment analysis",
            style("→").dim(),
            pending
        );
    }
    Ok(())
}
