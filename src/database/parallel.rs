//! Sharded parallel loading of chart events
//!
//! Rows are buffered, then parsed into events on a rayon pool. Patient checks
//! and invalid-row diversion run afterwards in row order, exactly as in the
//! streaming pass, and stop at the first row that fails them. The events before
//! that row are partitioned by patient: each worker receives exclusive `&mut`
//! access to a disjoint set of patients and attaches that shard's events in row
//! order, so no locking is needed and per-stay replacement behaves as in the
//! streaming pass. The failing row reported is the lowest one over both phases.
//!
//! Unlike the streaming pass, memory grows with the size of the table.

use std::io::Read;
use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::database::{Database, LinkedEvent};
use crate::error::{IcuDbError, Result};
use crate::models::Patient;
use crate::reader::{Record, Table, TableReader};
use crate::utils::logging::log_operation_complete;

/// Outcome of one shard: events attached, or the failing row and its error
type ShardResult = std::result::Result<usize, RowFailure>;

/// A row index and the error raised for it
type RowFailure = (usize, IcuDbError);

impl Database {
    /// Load chart events on `config.worker_count()` threads
    ///
    /// Produces the same graph as [`Database::load_chart_events`]. When several
    /// rows are invalid, the error of the lowest row index is returned.
    pub fn load_chart_events_parallel<R: Read>(&mut self, table: TableReader<R>) -> Result<usize> {
        let start = Instant::now();
        let workers = self.config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;

        let records: Vec<(usize, Record)> = table.rows().collect::<Result<_>>()?;
        let num_rows = records.len();
        log::info!("Parsing {num_rows} chart event rows on {workers} workers");

        let parsed: Vec<std::result::Result<LinkedEvent, RowFailure>> = pool.install(|| {
            records
                .par_iter()
                .map(|(index, record)| parse_chart_event(*index, record).map_err(|e| (*index, e)))
                .collect()
        });
        drop(records);

        // Rows after the first failure are never attached
        let mut first_failure: Option<RowFailure> = None;
        let mut shards: FxHashMap<i64, Vec<LinkedEvent>> = FxHashMap::default();
        for result in parsed {
            let linked = match result {
                Ok(linked) => linked,
                Err(failure) => {
                    first_failure = Some(failure);
                    break;
                }
            };
            if let Err(err) = self.require_patient(linked.subject_id) {
                first_failure = Some((linked.row, err));
                break;
            }
            if linked.is_linked() {
                shards.entry(linked.subject_id).or_default().push(linked);
            } else {
                self.divert_invalid_row(linked);
            }
        }

        let work: Vec<(&mut Patient, Vec<LinkedEvent>)> = self
            .patients
            .iter_mut()
            .filter_map(|(subject_id, patient)| {
                shards.remove(subject_id).map(|events| (patient, events))
            })
            .collect();
        log::debug!("Attaching events for {} patients", work.len());

        let outcomes: Vec<ShardResult> = pool.install(|| {
            work.into_par_iter()
                .map(|(patient, events)| attach_shard(patient, events))
                .collect()
        });

        let mut attached = 0;
        for outcome in outcomes {
            match outcome {
                Ok(count) => attached += count,
                Err((row, err)) => {
                    if first_failure.as_ref().is_none_or(|(first, _)| row < *first) {
                        first_failure = Some((row, err));
                    }
                }
            }
        }
        self.num_events += attached;

        if let Some((row, err)) = first_failure {
            return Err(err.at_row(Table::ChartEvents, row));
        }

        log_operation_complete(
            "reading",
            Table::ChartEvents,
            num_rows,
            attached,
            Some(start.elapsed()),
        );
        Ok(attached)
    }
}

fn parse_chart_event(index: usize, record: &Record) -> Result<LinkedEvent> {
    let subject_id = record.require_i64("SUBJECT_ID")?;
    LinkedEvent::from_chart_record(index, subject_id, record)
}

/// Attach one patient's events in row order
fn attach_shard(patient: &mut Patient, events: Vec<LinkedEvent>) -> ShardResult {
    let mut attached = 0;
    for linked in events {
        let (Some(hadm_id), Some(icustay_id)) = (linked.hadm_id, linked.icustay_id) else {
            continue;
        };
        match patient.add_event(hadm_id, icustay_id, linked.event) {
            Ok(None) => attached += 1,
            Ok(Some(_)) => {}
            Err(err) => return Err((linked.row, err)),
        }
    }
    Ok(attached)
}
