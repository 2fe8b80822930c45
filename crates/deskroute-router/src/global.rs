//! Process-wide desk instance
//!
//! [`init`] loads the desk once; every later call to [`desk`] returns the
//! same shared instance.

use crate::config::DeskConfig;
use crate::desk::SupportDesk;
use deskroute_core::{Error, Result};
use std::sync::{Arc, Mutex, OnceLock};

/// Global singleton.
static DESK: OnceLock<Arc<SupportDesk>> = OnceLock::new();

/// Serializes loading so concurrent `init` calls load only once.
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Load the desk from `config` unless it is already loaded.
///
/// A failed load leaves nothing behind, so `init` may be retried. Once
/// loaded, later calls return the existing desk and ignore `config`.
pub fn init(config: &DeskConfig) -> Result<Arc<SupportDesk>> {
    install(|| SupportDesk::from_config(config))
}

/// Install a desk built by `build` unless one is already installed
pub fn install<F>(build: F) -> Result<Arc<SupportDesk>>
where
    F: FnOnce() -> Result<SupportDesk>,
{
    if let Some(desk) = DESK.get() {
        return Ok(Arc::clone(desk));
    }

    let _guard = INIT_LOCK
        .lock()
        .map_err(|_| Error::internal("desk initialization lock poisoned"))?;
    if let Some(desk) = DESK.get() {
        return Ok(Arc::clone(desk));
    }

    let desk = Arc::new(build()?);
    Ok(Arc::clone(DESK.get_or_init(|| desk)))
}

/// Get the global desk.
///
/// Returns an error if not yet initialized.
pub fn desk() -> Result<Arc<SupportDesk>> {
    DESK.get()
        .cloned()
        .ok_or_else(|| Error::internal("support desk is not initialized; call init first"))
}

/// Check if the desk has been initialized.
pub fn is_initialized() -> bool {
    DESK.get().is_some()
}
