//! Browser warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the DOM and bindings crates to surface conditions that are not
//! errors of the current call but would otherwise go unnoticed, such as a
//! second listener failing during one dispatch.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;
use strum_macros::Display;

/// The subsystem a warning originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Component {
    /// Node tree and document factory.
    #[strum(serialize = "DOM")]
    Dom,
    /// Event dispatch.
    #[strum(serialize = "Events")]
    Events,
    /// Reflection protocol.
    #[strum(serialize = "Bindings")]
    Bindings,
}

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn first_occurrence(key: String) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key)
}

fn emit(component: Component, message: &str) {
    eprintln!("{}", format!("[Koala {component}] ⚠ {message}").yellow());
}

/// Warn about a condition (prints once per unique message)
///
/// # Example
/// ```ignore
/// warn_once(Component::Dom, "unknown element <blink>");
/// ```
pub fn warn_once(component: Component, message: &str) {
    if first_occurrence(format!("[{component}] {message}")) {
        emit(component, message);
    }
}

/// Warn about a condition every time it happens.
///
/// Used where each occurrence carries distinct information, e.g. the error
/// text of a failing listener.
pub fn warn(component: Component, message: &str) {
    emit(component, message);
}

/// Clear all recorded warnings (call when loading a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_occurrence_deduplicates() {
        let key = "[DOM] dedupe-probe".to_string();
        assert!(first_occurrence(key.clone()));
        assert!(!first_occurrence(key));
    }

    #[test]
    fn test_component_display() {
        assert_eq!(Component::Dom.to_string(), "DOM");
        assert_eq!(Component::Events.to_string(), "Events");
        assert_eq!(Component::Bindings.to_string(), "Bindings");
    }
}
