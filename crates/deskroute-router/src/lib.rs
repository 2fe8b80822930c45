//! deskroute Router
//!
//! The support desk facade. A request is classified into a category; when
//! the classifier's confidence is below the escalation threshold the
//! request goes to a human operator, otherwise the most similar
//! knowledge-base articles are returned.
//!
//! ```no_run
//! use deskroute_router::{ConfigOverrides, DeskConfig, Route, global};
//!
//! let config = DeskConfig::load("deskroute.yaml", &ConfigOverrides::default())?;
//! let desk = global::init(&config)?;
//! match desk.route("Не могу войти в систему")? {
//!     Route::Escalated { classification } => println!("operator: {}", classification.label),
//!     Route::Answered { answers, .. } => println!("{} answers", answers.documents().len()),
//! }
//! # Ok::<(), deskroute_core::Error>(())
//! ```

pub mod config;
pub mod desk;
pub mod global;

pub use config::{ConfigOverrides, DeskConfig, EscalationConfig, RetrievalConfig};
pub use desk::{Route, SupportDesk};
