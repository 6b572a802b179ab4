//! Shared helper functions for CLI commands.

use console::{style, StyledObject};
use indicatif::ProgressStyle;

use nps_dashboard::metrics::{NpsRating, SatisfactionMetrics, ScoreSummary};
use nps_dashboard::Category;

/// Truncate a string for single-line display (char-boundary safe).
pub fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace(['\n', '\r'], " ");
    if s.chars().count() <= max_chars {
        return s;
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Bar style shared by long-running commands.
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        .map(|s| s.progress_chars("█▓░"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

pub fn category_label(category: Category) -> StyledObject<&'static str> {
    match category {
        Category::Promoter => style("Promoter").green(),
        Category::Neutral => style("Neutral").yellow(),
        Category::Detractor => style("Detractor").red(),
    }
}

fn rating_label(rating: NpsRating) -> StyledObject<&'static str> {
    match rating {
        NpsRating::Excellent => style(rating.label()).green().bold(),
        NpsRating::Good => style(rating.label()).cyan(),
        NpsRating::NeedsAttention => style(rating.label()).red(),
    }
}

/// Print the NPS block used by `metrics` and after `score`.
pub fn print_metrics(metrics: &SatisfactionMetrics, summary: Option<&ScoreSummary>) {
    let Some(rating) = metrics.rating() else {
        println!("{} No scored evaluations yet", style("!").yellow());
        println!("  Run `nps score` to analyze pending evaluations");
        return;
    };

    println!(
        "{} {:.1}  ({})",
        style("NPS").bold(),
        metrics.nps_score,
        rating_label(rating)
    );
    for category in [Category::Promoter, Category::Neutral, Category::Detractor] {
        println!(
            "  {:<11} {:>6}  {:>5.1}%",
            category_label(category),
            metrics.count(category),
            metrics.percentage(category)
        );
    }
    println!("  {:<11} {:>6}", "Scored", metrics.total_scored);

    if let Some(summary) = summary {
        println!(
            "  {} mean {:.2}, min {:.0}, max {:.0}",
            style("Scores:").dim(),
            summary.mean,
            summary.min,
            summary.max
        );
    }
}
