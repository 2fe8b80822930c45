//! deskroute Telemetry
//!
//! Journal and metrics for routed support requests:
//! - [`QueryJournal`]: JSON Lines log of queries, feedback and learned queries
//! - [`RouterMetrics`]: lock-free counters with rate snapshots

pub mod journal;
pub mod metrics;

pub use journal::{FeedbackRecord, JournalConfig, QueryJournal, QueryRecord};
pub use metrics::{MetricsSnapshot, RouterMetrics};
