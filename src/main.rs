use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use icu_db::config::DEFAULT_SNAPSHOT_DIR;
use icu_db::{Database, LoaderConfig, VisitIdScope};
use log::info;

/// Load ICU tables into a validated patient graph
#[derive(Debug, Parser)]
#[command(name = "icu-db", version, about)]
struct Cli {
    /// Directory holding PATIENTS.csv, ADMISSIONS.csv, ICUSTAYS.csv and CHARTEVENTS.csv
    #[arg(required_unless_present = "from_snapshot", value_hint = clap::ValueHint::DirPath)]
    data_dir: Option<PathBuf>,

    /// Load chart events on several threads
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (defaults to the number of CPUs)
    #[arg(long, value_name = "N", requires = "parallel")]
    threads: Option<usize>,

    /// Log a progress line every N rows (0 disables)
    #[arg(long, value_name = "N")]
    progress_interval: Option<usize>,

    /// Require admission ids to be unique per patient only
    #[arg(long)]
    per_patient_visit_ids: bool,

    /// Write a snapshot after loading
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = DEFAULT_SNAPSHOT_DIR)]
    save_snapshot: Option<PathBuf>,

    /// Restore from a snapshot instead of reading the tables
    #[arg(long, value_name = "DIR", conflicts_with = "data_dir")]
    from_snapshot: Option<PathBuf>,

    /// Show a spinner while each table is read
    #[arg(long)]
    progress: bool,
}

impl Cli {
    fn loader_config(&self) -> LoaderConfig {
        let mut config = LoaderConfig::new(self.data_dir.clone().unwrap_or_default())
            .with_progress_bar(self.progress);
        if self.parallel {
            config = config.with_parallel_events(self.threads);
        }
        if let Some(interval) = self.progress_interval {
            config = config.with_progress_interval(interval);
        }
        if self.per_patient_visit_ids {
            config = config.with_visit_id_scope(VisitIdScope::PerPatient);
        }
        config
    }
}

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.loader_config();
    let start = Instant::now();

    let db = match &cli.from_snapshot {
        Some(dir) => Database::restore_snapshot_from(dir, config)
            .with_context(|| format!("restoring snapshot from {}", dir.display()))?,
        None => {
            info!("Loading ICU tables from: {}", config.data_dir.display());
            Database::load(config.clone())
                .with_context(|| format!("loading tables from {}", config.data_dir.display()))?
        }
    };
    info!("Database ready in {:?}", start.elapsed());

    if let Some(dir) = &cli.save_snapshot {
        db.save_snapshot_to(dir)
            .with_context(|| format!("saving snapshot to {}", dir.display()))?;
    }

    let summary = db.summary();
    println!("patients:        {}", summary.patients);
    println!("hospital visits: {}", summary.hospital_visits);
    println!("icu stays:       {}", summary.icu_stays);
    println!("events:          {}", summary.events);
    println!("invalid rows:    {}", summary.invalid_rows);
    println!("readmitted patients:                 {}", db.readmitted_patients().len());
    println!(
        "patients with several stays per visit: {}",
        db.patients_with_multiple_icu_stays_per_visit().len()
    );

    Ok(())
}
