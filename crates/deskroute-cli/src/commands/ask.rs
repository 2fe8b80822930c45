//! `deskroute ask`

use super::validate_query;
use deskroute_retrieval::RetrievalOutcome;
use deskroute_router::{global, DeskConfig, Route};
use deskroute_telemetry::QueryJournal;

/// Route one request and journal it
pub fn run(config: &DeskConfig, query: &str) -> anyhow::Result<Route> {
    let query = validate_query(query)?;
    let desk = global::init(config)?;
    let route = desk.route(query)?;

    let journal = QueryJournal::open(config.journal.clone())?;
    let classification = route.classification();
    journal.record_query(
        query,
        &classification.label,
        classification.score,
        route.is_escalated(),
    )?;

    Ok(route)
}

pub fn print(route: &Route, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(route)?);
        return Ok(());
    }

    let classification = route.classification();
    println!("Category:   {}", classification.label);
    println!("Confidence: {:.1}%", classification.score * 100.0);

    match route {
        Route::Escalated { .. } => {
            println!();
            println!("Escalated: the request was handed to an operator.");
        }
        Route::Answered { answers, .. } => match answers {
            RetrievalOutcome::KnowledgeBaseEmpty => {
                println!();
                println!("The knowledge base is empty.");
            }
            RetrievalOutcome::Answers(docs) => {
                for (rank, doc) in docs.iter().enumerate() {
                    println!();
                    println!("#{} ({:.3}) {}", rank + 1, doc.score, doc.path.display());
                    println!("{}", doc.text);
                }
            }
        },
    }
    Ok(())
}
