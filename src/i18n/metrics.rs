//! Translation metrics and observability.
//!
//! Counts translation file loads and key lookups so degraded pages (missing
//! files, fallback text) show up in the logs.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Translation load and lookup counters.
pub struct TranslationMetrics {
    /// Translation files fetched and parsed successfully
    files_loaded: AtomicUsize,

    /// Translation file fetches that failed (status, transport or parse)
    load_failures: AtomicUsize,

    /// Languages whose mapping was replaced by the default language's file
    default_substitutions: AtomicUsize,

    /// Keys resolved from the requested language
    keys_resolved: AtomicUsize,

    /// Keys resolved from the default language
    keys_fallback: AtomicUsize,

    /// Keys found in no mapping (authored text kept)
    keys_missing: AtomicUsize,
}

static METRICS: OnceLock<TranslationMetrics> = OnceLock::new();

impl Default for TranslationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self {
            files_loaded: AtomicUsize::new(0),
            load_failures: AtomicUsize::new(0),
            default_substitutions: AtomicUsize::new(0),
            keys_resolved: AtomicUsize::new(0),
            keys_fallback: AtomicUsize::new(0),
            keys_missing: AtomicUsize::new(0),
        }
    }

    /// Process-wide counters shared by the loader and translator.
    pub fn global() -> &'static TranslationMetrics {
        METRICS.get_or_init(TranslationMetrics::new)
    }

    pub fn record_file_loaded(&self) {
        self.files_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_load_failure(&self) {
        self.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_default_substitution(&self) {
        self.default_substitutions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_key_resolved(&self) {
        self.keys_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_key_fallback(&self) {
        self.keys_fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_key_missing(&self) {
        self.keys_missing.fetch_add(1, Ordering::Relaxed);
    }

    pub fn report(&self) -> MetricsReport {
        let files_loaded = self.files_loaded.load(Ordering::Relaxed);
        let load_failures = self.load_failures.load(Ordering::Relaxed);
        let keys_resolved = self.keys_resolved.load(Ordering::Relaxed);
        let keys_fallback = self.keys_fallback.load(Ordering::Relaxed);
        let keys_missing = self.keys_missing.load(Ordering::Relaxed);

        let total_lookups = keys_resolved + keys_fallback + keys_missing;
        let coverage = if total_lookups > 0 {
            (keys_resolved as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            files_loaded,
            load_failures,
            default_substitutions: self.default_substitutions.load(Ordering::Relaxed),
            keys_resolved,
            keys_fallback,
            keys_missing,
            coverage,
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub files_loaded: usize,
    pub load_failures: usize,
    pub default_substitutions: usize,
    pub keys_resolved: usize,
    pub keys_fallback: usize,
    pub keys_missing: usize,

    /// Share of lookups served by the requested language, as a percentage (0-100)
    pub coverage: f64,
}
