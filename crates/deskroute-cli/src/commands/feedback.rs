//! `deskroute feedback`

use super::validate_query;
use anyhow::bail;
use deskroute_classifiers::{EscalationPolicy, TextClassifier};
use deskroute_router::DeskConfig;
use deskroute_telemetry::{FeedbackRecord, QueryJournal};

/// Classify `query` and journal the user's rating of its answer.
///
/// Only automatically answered requests can be rated; an escalated request
/// is refused and nothing is journaled.
pub fn run(config: &DeskConfig, query: &str, useful: bool) -> anyhow::Result<FeedbackRecord> {
    let query = validate_query(query)?;
    let classifier = TextClassifier::load(&config.model_path)?;
    let result = classifier.predict(query)?;

    let policy = EscalationPolicy::new(config.escalation.threshold);
    if policy.decide(result.score) {
        bail!(
            "request was escalated to an operator (confidence {:.3} below threshold {}); \
             only automatic answers can be rated",
            result.score,
            policy.threshold()
        );
    }

    let journal = QueryJournal::open(config.journal.clone())?;
    Ok(journal.record_feedback(query, &result.label, result.score, useful)?)
}

pub fn print(record: &FeedbackRecord) {
    let verdict = if record.useful { "useful" } else { "not useful" };
    println!(
        "Recorded '{}' answer for category {} ({:.1}%)",
        verdict,
        record.category,
        record.confidence * 100.0
    );
}
