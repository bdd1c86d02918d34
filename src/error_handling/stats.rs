//! Processing statistics tracking.
//!
//! Thread-safe counters for completed analyses, surfaced errors and upstream
//! fallbacks. Exposed by the `/metrics` and `/status` endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{ErrorType, FallbackType};

/// Thread-safe processing statistics tracker.
///
/// Every counter is created up front in `new()`, so increments never allocate
/// and the maps are read-only after construction. Share it with `Arc`.
pub struct ProcessingStats {
    completed: AtomicUsize,
    unsaved: AtomicUsize,
    errors: HashMap<ErrorType, AtomicUsize>,
    fallbacks: HashMap<FallbackType, AtomicUsize>,
}

impl Default for ProcessingStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for error in ErrorType::iter() {
            errors.insert(error, AtomicUsize::new(0));
        }

        let mut fallbacks = HashMap::new();
        for fallback in FallbackType::iter() {
            fallbacks.insert(fallback, AtomicUsize::new(0));
        }

        ProcessingStats {
            completed: AtomicUsize::new(0),
            unsaved: AtomicUsize::new(0),
            errors,
            fallbacks,
        }
    }

    /// Records an analysis that returned a result to its caller.
    pub fn record_completed(&self, saved: bool) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if !saved {
            self.unsaved.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, error: ErrorType) {
        if let Some(counter) = self.errors.get(&error) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                error
            );
        }
    }

    /// Increment a fallback counter.
    pub fn increment_fallback(&self, fallback: FallbackType) {
        if let Some(counter) = self.fallbacks.get(&fallback) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment fallback counter for {:?} which is not in the map. \
                 This indicates a bug in ProcessingStats initialization.",
                fallback
            );
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Completed analyses whose record could not be written.
    pub fn unsaved(&self) -> usize {
        self.unsaved.load(Ordering::SeqCst)
    }

    /// Get the count for an error type.
    pub fn get_error_count(&self, error: ErrorType) -> usize {
        self.errors
            .get(&error)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get the count for a fallback type.
    pub fn get_fallback_count(&self, fallback: FallbackType) -> usize {
        self.fallbacks
            .get(&fallback)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total error count across all error types.
    pub fn total_errors(&self) -> usize {
        ErrorType::iter().map(|e| self.get_error_count(e)).sum()
    }

    /// Get total fallback count across all upstreams.
    pub fn total_fallbacks(&self) -> usize {
        FallbackType::iter()
            .map(|f| self.get_fallback_count(f))
            .sum()
    }
}
