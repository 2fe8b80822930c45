//! `deskroute stats`

use deskroute_router::DeskConfig;
use deskroute_telemetry::QueryJournal;
use std::collections::BTreeMap;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    /// Rated requests per category
    pub categories: BTreeMap<String, usize>,
    pub total_queries: usize,
    pub escalated_queries: usize,
}

impl StatsReport {
    pub fn escalation_rate(&self) -> f64 {
        if self.total_queries == 0 {
            0.0
        } else {
            self.escalated_queries as f64 / self.total_queries as f64
        }
    }
}

pub fn run(config: &DeskConfig) -> anyhow::Result<StatsReport> {
    let journal = QueryJournal::open(config.journal.clone())?;
    let queries = journal.read_queries()?;

    Ok(StatsReport {
        categories: journal.category_counts()?,
        total_queries: queries.len(),
        escalated_queries: queries.iter().filter(|q| q.escalated).count(),
    })
}

/// Horizontal bar per category, scaled to the most frequent one
pub fn render_chart(counts: &BTreeMap<String, usize>) -> Vec<String> {
    let max = counts.values().copied().max().unwrap_or(0);
    let width = counts.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    counts
        .iter()
        .map(|(category, &count)| {
            let bar = if max == 0 { 0 } else { (count * BAR_WIDTH).div_ceil(max) };
            format!("{:<width$}  {:>5}  {}", category, count, "█".repeat(bar), width = width)
        })
        .collect()
}

pub fn print(report: &StatsReport) {
    if report.categories.is_empty() {
        println!("No feedback recorded yet.");
    } else {
        println!("Requests per category:");
        for line in render_chart(&report.categories) {
            println!("  {}", line);
        }
    }

    println!();
    println!(
        "Queries routed: {}, escalated: {} ({:.1}%)",
        report.total_queries,
        report.escalated_queries,
        report.escalation_rate() * 100.0
    );
}
