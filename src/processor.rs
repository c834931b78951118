//! Batch execution engine with parallel and sequential strategies.
//!
//! Applies per-record enrichment across a dataset in one of two ways:
//! row by row on the calling thread, or statically partitioned into
//! contiguous chunks dispatched to a fixed pool of blocking worker threads
//! and reassembled by partition index. Both strategies time only the
//! enrichment pass; pool start-up and shutdown sit outside the measured
//! interval.

use crate::config::SigactConfig;
use crate::constants::POOL_SHUTDOWN_TIMEOUT_SECS;
use crate::enrichment::Enrich;
use crate::error::{Result, SigactError};
use crate::models::{BatchOutcome, EnrichedIncident, LocatedIncident, Strategy};

use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::{Builder, Runtime};
use tokio::task::{self, JoinError};
use tracing::{debug, error, info};

/// Split `len` rows into at most `partitions` contiguous, non-empty ranges
/// whose sizes differ by at most one
pub fn partition_bounds(len: usize, partitions: usize) -> Vec<Range<usize>> {
    let count = partitions.min(len);
    if count == 0 {
        return Vec::new();
    }

    let base = len / count;
    let extra = len % count;
    let mut bounds = Vec::with_capacity(count);
    let mut start = 0;
    for index in 0..count {
        let size = base + usize::from(index < extra);
        bounds.push(start..start + size);
        start += size;
    }
    bounds
}

/// Fixed-size pool of blocking worker threads
struct WorkerPool {
    runtime: Runtime,
    workers: usize,
}

impl WorkerPool {
    fn start(workers: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(workers)
            .thread_name("sigact-worker")
            .build()
            .map_err(|e| SigactError::PoolStartup {
                workers,
                reason: e.to_string(),
            })?;
        debug!("Worker pool started with {} workers", workers);
        Ok(Self { runtime, workers })
    }

    /// Enrich every partition on the pool and reassemble results by partition index
    fn run_partitions<E: Enrich>(
        &self,
        incidents: Arc<[LocatedIncident]>,
        bounds: &[Range<usize>],
        enricher: Arc<E>,
        progress: &ProgressBar,
    ) -> Result<Vec<EnrichedIncident>> {
        self.runtime.block_on(async {
            let handles = bounds.iter().cloned().enumerate().map(|(partition, rows)| {
                let incidents = Arc::clone(&incidents);
                let enricher = Arc::clone(&enricher);
                let progress = progress.clone();
                let chunk = rows.clone();
                let handle = task::spawn_blocking(move || {
                    let enriched: Vec<EnrichedIncident> = incidents[chunk]
                        .iter()
                        .map(|incident| enricher.enrich(incident))
                        .collect();
                    progress.inc(1);
                    enriched
                });
                async move { (partition, rows, handle.await) }
            });

            let mut slots: Vec<Option<Vec<EnrichedIncident>>> = vec![None; bounds.len()];
            for (partition, rows, joined) in join_all(handles).await {
                match joined {
                    Ok(enriched) => slots[partition] = Some(enriched),
                    Err(e) => {
                        let reason = join_failure_reason(e);
                        error!(
                            "Partition {} (rows {}..{}) failed: {}",
                            partition, rows.start, rows.end, reason
                        );
                        return Err(SigactError::PartitionFailed {
                            partition,
                            rows,
                            reason,
                        });
                    }
                }
            }

            let mut assembled = Vec::with_capacity(incidents.len());
            for (partition, slot) in slots.into_iter().enumerate() {
                let enriched = slot.ok_or_else(|| SigactError::PartitionFailed {
                    partition,
                    rows: bounds[partition].clone(),
                    reason: "partition produced no result".to_string(),
                })?;
                assembled.extend(enriched);
            }
            Ok(assembled)
        })
    }

    fn shutdown(self) {
        self.runtime
            .shutdown_timeout(Duration::from_secs(POOL_SHUTDOWN_TIMEOUT_SECS));
        debug!("Worker pool with {} workers shut down", self.workers);
    }
}

fn join_failure_reason(error: JoinError) -> String {
    if error.is_panic() {
        let payload = error.into_panic();
        if let Some(message) = payload.downcast_ref::<&str>() {
            format!("worker panicked: {}", message)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            format!("worker panicked: {}", message)
        } else {
            "worker panicked".to_string()
        }
    } else {
        error.to_string()
    }
}

/// Progress bar for a pass, hidden when progress display is disabled
fn create_progress_bar(total: u64, message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} ETA: {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Results of running both strategies over the same records
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub parallel: BatchOutcome,
    pub sequential: BatchOutcome,
}

impl BenchmarkRun {
    pub fn speedup(&self) -> f64 {
        let parallel = self.parallel.elapsed.as_secs_f64();
        if parallel > 0.0 {
            self.sequential.elapsed.as_secs_f64() / parallel
        } else {
            f64::INFINITY
        }
    }
}

/// Applies an enrichment across a dataset with a chosen strategy
pub struct BatchExecutor<E> {
    enricher: Arc<E>,
    workers: usize,
    partitions: usize,
    show_progress: bool,
}

impl<E: Enrich> BatchExecutor<E> {
    pub fn new(enricher: Arc<E>, config: &SigactConfig) -> Self {
        Self {
            enricher,
            workers: config.workers,
            partitions: config.partitions,
            show_progress: config.show_progress,
        }
    }

    /// Override the parallel layout
    pub fn with_layout(mut self, workers: usize, partitions: usize) -> Self {
        self.workers = workers;
        self.partitions = partitions;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Enrich all records with the given strategy
    pub fn run(&self, incidents: &[LocatedIncident], strategy: Strategy) -> Result<BatchOutcome> {
        match strategy {
            Strategy::Parallel => self.run_parallel(incidents),
            Strategy::Sequential => Ok(self.run_sequential(incidents)),
        }
    }

    /// Enrich records one after another on the calling thread
    pub fn run_sequential(&self, incidents: &[LocatedIncident]) -> BatchOutcome {
        info!("Sequential enrichment of {} records", incidents.len());
        let progress = create_progress_bar(
            incidents.len() as u64,
            "Sequential enrichment",
            self.show_progress,
        );

        let started = Instant::now();
        let enriched: Vec<EnrichedIncident> = incidents
            .iter()
            .map(|incident| {
                let enriched = self.enricher.enrich(incident);
                progress.inc(1);
                enriched
            })
            .collect();
        let elapsed = started.elapsed();

        progress.finish_with_message(format!("Sequential pass done in {:.2?}", elapsed));
        info!("Sequential enrichment finished in {:.2?}", elapsed);

        BatchOutcome {
            strategy: Strategy::Sequential,
            enriched,
            elapsed,
            partitions: 1,
        }
    }

    /// Enrich statically partitioned records on a fixed worker pool
    pub fn run_parallel(&self, incidents: &[LocatedIncident]) -> Result<BatchOutcome> {
        if self.workers == 0 || self.partitions == 0 {
            return Err(SigactError::configuration(
                "parallel execution needs at least one worker and one partition",
            ));
        }

        let bounds = partition_bounds(incidents.len(), self.partitions);
        info!(
            "Parallel enrichment of {} records in {} partitions on {} workers",
            incidents.len(),
            bounds.len(),
            self.workers
        );

        let shared: Arc<[LocatedIncident]> = Arc::from(incidents);
        let progress = create_progress_bar(
            bounds.len() as u64,
            "Parallel enrichment (partitions)",
            self.show_progress,
        );

        let pool = WorkerPool::start(self.workers)?;
        let started = Instant::now();
        let result = pool.run_partitions(shared, &bounds, Arc::clone(&self.enricher), &progress);
        let elapsed = started.elapsed();
        pool.shutdown();

        let enriched = match result {
            Ok(enriched) => enriched,
            Err(e) => {
                progress.abandon_with_message("Parallel pass failed");
                return Err(e);
            }
        };

        progress.finish_with_message(format!("Parallel pass done in {:.2?}", elapsed));
        info!("Parallel enrichment finished in {:.2?}", elapsed);

        Ok(BatchOutcome {
            strategy: Strategy::Parallel,
            enriched,
            elapsed,
            partitions: bounds.len(),
        })
    }

    /// Run the parallel pass, then the sequential pass, and require identical output
    pub fn benchmark(&self, incidents: &[LocatedIncident]) -> Result<BenchmarkRun> {
        let parallel = self.run_parallel(incidents)?;
        let sequential = self.run_sequential(incidents);
        verify_identical(&parallel.enriched, &sequential.enriched)?;

        Ok(BenchmarkRun {
            parallel,
            sequential,
        })
    }
}

/// First index at which two strategy outputs disagree becomes an error
pub fn verify_identical(left: &[EnrichedIncident], right: &[EnrichedIncident]) -> Result<()> {
    if let Some(index) = left.iter().zip(right).position(|(a, b)| a != b) {
        return Err(SigactError::StrategyMismatch { index });
    }
    if left.len() != right.len() {
        return Err(SigactError::StrategyMismatch {
            index: left.len().min(right.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
