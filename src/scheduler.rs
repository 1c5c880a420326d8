//! Fan-out / barrier-join over locations.
//!
//! One named thread per location, all started together inside a thread scope
//! so they can borrow the catalog and options. Each worker sends its
//! `RegionResult` over a channel; after every handle has been joined the
//! results are merged into the `GlobalReport` on the calling thread, so the
//! report itself is never shared.
//!
//! A worker that panics is reported as a failed location; the other locations
//! are unaffected. There is no timeout: a hung provider call holds the run.

use crate::catalog::Catalog;
use crate::config::RunOptions;
use crate::error::{OptimizerError, Result};
use crate::provider::CloudProvider;
use crate::region::{RegionResult, RegionWorker, RunContext};
use crate::report::GlobalReport;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::thread;

/// Run the optimizer over every location `provider` knows about.
pub fn run(provider: &dyn CloudProvider, catalog: &Catalog, options: &RunOptions) -> Result<GlobalReport> {
    let context = RunContext::new(catalog, options)?;
    let locations = provider.list_locations()?;
    tracing::info!("Processing {} locations", locations.len());

    let results = run_locations(provider, &context, &locations);

    let mut report = GlobalReport::default();
    for result in results {
        report.merge(result);
    }
    report.log_totals();
    Ok(report)
}

/// Run one worker per location and collect every result, in location order.
pub fn run_locations(
    provider: &dyn CloudProvider,
    context: &RunContext<'_>,
    locations: &[String],
) -> Vec<RegionResult> {
    let (tx, rx) = mpsc::channel::<RegionResult>();

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(locations.len());

        for location in locations {
            let worker_tx = tx.clone();
            let spawned = thread::Builder::new()
                .name(format!("region-{}", location))
                .spawn_scoped(scope, move || {
                    let result = RegionWorker::new(location.as_str(), context).run(provider);
                    // the receiver outlives the scope
                    let _ = worker_tx.send(result);
                });

            match spawned {
                Ok(handle) => handles.push((location, handle)),
                Err(e) => {
                    let _ = tx.send(RegionResult::failed(
                        location.as_str(),
                        OptimizerError::from(e).to_string(),
                    ));
                }
            }
        }

        for (location, handle) in handles {
            if handle.join().is_err() {
                tracing::error!("Worker for {} panicked", location);
                let _ = tx.send(RegionResult::failed(location.as_str(), "worker panicked"));
            }
        }
    });
    drop(tx);

    let mut by_location: BTreeMap<String, RegionResult> = rx
        .into_iter()
        .map(|result| (result.location.clone(), result))
        .collect();

    locations
        .iter()
        .filter_map(|location| by_location.remove(location))
        .collect()
}
