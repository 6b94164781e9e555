//! Configuration for loading the ICU database.

use std::path::{Path, PathBuf};

/// Default directory used by snapshot save/restore when none is given
pub const DEFAULT_SNAPSHOT_DIR: &str = "icu_db_snapshot";

/// Default number of rows between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Scope in which hospital admission ids must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitIdScope {
    /// An admission id may appear only once in the whole database
    #[default]
    Global,
    /// An admission id may appear only once per patient
    PerPatient,
}

/// Configuration for the ICU database loader
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Directory holding PATIENTS.csv, ADMISSIONS.csv, ICUSTAYS.csv and CHARTEVENTS.csv
    pub data_dir: PathBuf,
    /// Field delimiter of the source tables
    pub delimiter: u8,
    /// Log a progress line every this many rows (0 disables progress lines)
    pub progress_interval: usize,
    /// Uniqueness scope for admission ids
    pub visit_id_scope: VisitIdScope,
    /// Load chart events through the sharded parallel path
    pub parallel_events: bool,
    /// Worker count for the parallel path, defaults to the number of CPUs
    pub num_threads: Option<usize>,
    /// Show a spinner while a table is being read
    pub show_progress: bool,
    /// Where snapshots are written to and restored from
    pub snapshot_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            delimiter: b',',
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            visit_id_scope: VisitIdScope::default(),
            parallel_events: false,
            num_threads: None,
            show_progress: false,
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
        }
    }
}

impl LoaderConfig {
    /// Create a configuration reading tables from `data_dir`
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    #[must_use]
    pub fn with_visit_id_scope(mut self, scope: VisitIdScope) -> Self {
        self.visit_id_scope = scope;
        self
    }

    /// Enable the parallel chart-event path with an optional worker count
    #[must_use]
    pub fn with_parallel_events(mut self, num_threads: Option<usize>) -> Self {
        self.parallel_events = true;
        self.num_threads = num_threads;
        self
    }

    #[must_use]
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.snapshot_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Number of workers the parallel path will use
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Whether row `index` should produce a progress line
    #[must_use]
    pub fn is_progress_row(&self, index: usize) -> bool {
        self.progress_interval != 0 && index % self.progress_interval == 0
    }
}
