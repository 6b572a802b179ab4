//! Sentiment scoring command.

use std::num::NonZeroU32;
use std::sync::Arc;

use console::style;
use indicatif::ProgressBar;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};

use nps_dashboard::metrics::{
    compute_metrics, summarize_scores, SatisfactionMetrics, ScoreSummary,
};
use nps_dashboard::{
    cancel_pair, BatchOrchestrator, HttpScoringClient, ProgressUpdate, RunOutcome, RunStatus,
    ScoringService,
};

use crate::cli::helpers::{bar_style, print_metrics};

/// JSON shape of a finished run.
#[derive(Serialize)]
struct ScoreReport {
    status: &'static str,
    processed_so_far: u64,
    total_pending_at_start: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<SatisfactionMetrics>,
}

/// Score pending evaluations until done, interrupted, or failed.
pub async fn cmd_score(
    client: HttpScoringClient,
    batch_size: NonZeroU32,
    json: bool,
) -> anyhow::Result<()> {
    let endpoint = client.config().endpoint.clone();
    let orchestrator = BatchOrchestrator::new(client);
    let (cancel, signal) = cancel_pair();

    if !json {
        println!(
            "{} Scoring pending evaluations at {} (batch size {})",
            style("→").cyan(),
            endpoint,
            batch_size
        );
        println!("  {} Press Ctrl-C to stop after the current batch", style("→").dim());
    }

    let pb = Arc::new(Mutex::new(None::<ProgressBar>));

    // First Ctrl-C only raises the flag and the in-flight call still completes.
    // A second one quits immediately.
    let pb_signal = pb.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        cancel.cancel();
        let message = format!(
            "{} Stop requested, finishing current batch (Ctrl-C again to quit)...",
            style("!").yellow()
        );
        match *pb_signal.lock().await {
            Some(ref progress) => progress.println(message),
            None => eprintln!("{}", message),
        }

        if tokio::signal::ctrl_c().await.is_ok() {
            if let Some(progress) = pb_signal.lock().await.take() {
                progress.abandon();
            }
            eprintln!("{} Aborted", style("✗").red());
            std::process::exit(130);
        }
    });

    // Render progress snapshots as they arrive
    let (progress_tx, mut progress_rx) = mpsc::channel::<ProgressUpdate>(64);
    let pb_events = pb.clone();
    let show_bar = !json;
    let event_handler = tokio::spawn(async move {
        while let Some(update) = progress_rx.recv().await {
            if !show_bar {
                continue;
            }
            let mut guard = pb_events.lock().await;
            let progress = guard.get_or_insert_with(|| {
                let bar = ProgressBar::new(update.total_pending_at_start);
                bar.set_style(bar_style());
                bar
            });
            progress.set_position(update.processed_so_far.min(update.total_pending_at_start));
            progress.set_message(format!("{} remaining", update.remaining));
        }
        if let Some(progress) = pb_events.lock().await.take() {
            progress.finish_and_clear();
        }
    });

    let outcome = orchestrator.run(batch_size, &signal, &progress_tx).await;

    drop(progress_tx);
    let _ = event_handler.await;

    // Explicit refresh: re-read the records and recompute the metrics.
    // A refresh problem is reported but never replaces the run outcome.
    let refreshed = refresh_metrics(orchestrator.service()).await;
    ctrl_c.abort();

    if json {
        let report = ScoreReport {
            status: outcome.status.as_str(),
            processed_so_far: outcome.processed_so_far,
            total_pending_at_start: outcome.total_pending_at_start,
            error: match &outcome.status {
                RunStatus::Failed(err) => Some(err.to_string()),
                _ => None,
            },
            metrics: refreshed.as_ref().ok().map(|(metrics, _)| *metrics),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_outcome(&outcome);
        match &refreshed {
            Ok((metrics, summary)) => {
                println!();
                print_metrics(metrics, summary.as_ref());
            }
            Err(err) => println!(
                "{} Could not refresh metrics: {}",
                style("!").yellow(),
                err
            ),
        }
    }

    match outcome.status {
        RunStatus::Failed(err) => Err(err.into()),
        _ => Ok(()),
    }
}

async fn refresh_metrics(
    client: &HttpScoringClient,
) -> anyhow::Result<(SatisfactionMetrics, Option<ScoreSummary>)> {
    let records = client.fetch_all_records().await?;
    Ok((compute_metrics(&records)?, summarize_scores(&records)?))
}

fn print_outcome(outcome: &RunOutcome) {
    let done = outcome.processed_so_far;
    let total = outcome.total_pending_at_start;
    match &outcome.status {
        RunStatus::NoWorkNeeded => {
            println!("{} All evaluations are already scored", style("✓").green());
        }
        RunStatus::Completed => {
            println!(
                "{} Sentiment analysis complete: {} evaluations scored",
                style("✓").green(),
                done
            );
        }
        RunStatus::Interrupted => {
            println!(
                "{} Scoring interrupted: {}/{} evaluations scored",
                style("!").yellow(),
                done,
                total
            );
            println!(
                "  {} {} evaluations still pending",
                style("→").dim(),
                total.saturating_sub(done)
            );
        }
        RunStatus::Failed(err) => {
            println!(
                "{} Scoring failed after {}/{} evaluations: {}",
                style("✗").red(),
                done,
                total,
                err
            );
            if err.is_transient() {
                println!(
                    "  {} Make sure the scoring service is running, then run `nps score` again",
                    style("→").dim()
                );
            }
        }
    }
}
