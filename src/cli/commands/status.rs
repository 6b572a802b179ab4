//! Record status command.

use console::style;

use nps_dashboard::metrics::pending_count;
use nps_dashboard::{HttpScoringClient, ScoringService};

pub async fn cmd_status(client: &HttpScoringClient) -> anyhow::Result<()> {
    let records = client.fetch_all_records().await?;
    let total = records.len() as u64;
    let pending = pending_count(&records);

    println!("{} {}", style("Service:").bold(), client.config().endpoint);
    println!("  {:<10} {:>6}", "Total", total);
    println!("  {:<10} {:>6}", "Scored", total - pending);
    println!("  {:<10} {:>6}", "Pending", pending);

    if pending == 0 && total > 0 {
        println!("{} All evaluations are scored", style("✓").green());
    }
    Ok(())
}
