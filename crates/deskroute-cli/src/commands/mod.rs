pub mod ask;
pub mod eval;
pub mod feedback;
pub mod stats;
pub mod train;

use anyhow::bail;

/// Reject blank requests before they reach the core
pub fn validate_query(query: &str) -> anyhow::Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        bail!("query must not be empty");
    }
    Ok(trimmed)
}
