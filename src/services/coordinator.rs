//! Year Fan-out / Fan-in
//!
//! Runs one aggregation task per year partition on the blocking pool and merges
//! the owned results into `YearlyStats`. Tasks share nothing mutable; the year
//! order is imposed only by the merge.

use crate::error::{Error, Result};
use crate::models::{ExecutionMode, VacancyRecord, YearlyStats};
use crate::services::year_aggregator::{aggregate_partition, AggregationContext, YearOutcome};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// One unit of work: a year and its partition file
#[derive(Debug, Clone)]
pub struct YearJob {
    pub year: i32,
    pub path: PathBuf,
}

impl YearJob {
    pub fn from_partitions(partitions: &BTreeMap<i32, PathBuf>) -> Vec<YearJob> {
        partitions
            .iter()
            .map(|(year, path)| YearJob {
                year: *year,
                path: path.clone(),
            })
            .collect()
    }
}

/// Merged statistics and every record the tasks aggregated
#[derive(Debug, Clone, Default)]
pub struct FanInResult {
    pub yearly: YearlyStats,
    pub records: Vec<VacancyRecord>,
}

/// Run every year job and merge the results
///
/// The first failing task fails the whole run; results of the other tasks are
/// discarded.
pub async fn run_year_jobs(
    jobs: Vec<YearJob>,
    ctx: Arc<AggregationContext>,
    mode: ExecutionMode,
    max_workers: usize,
) -> Result<FanInResult> {
    let start = Instant::now();
    let job_count = jobs.len();
    info!(jobs = job_count, ?mode, max_workers, "Starting year tasks");

    let outcomes = match mode {
        ExecutionMode::Parallel => run_parallel(jobs, ctx, max_workers).await?,
        ExecutionMode::Sequential => run_sequential(jobs, ctx).await?,
    };

    let result = merge_outcomes(outcomes);
    info!(
        jobs = job_count,
        duration_s = start.elapsed().as_secs_f64(),
        "Year tasks completed"
    );
    Ok(result)
}

async fn run_parallel(
    jobs: Vec<YearJob>,
    ctx: Arc<AggregationContext>,
    max_workers: usize,
) -> Result<Vec<YearOutcome>> {
    let max_workers = max_workers.max(1);
    let mut outcomes = Vec::with_capacity(jobs.len());

    // Process jobs in groups of max_workers
    for (group_idx, group) in jobs.chunks(max_workers).enumerate() {
        let tasks: Vec<_> = group
            .iter()
            .cloned()
            .map(|job| spawn_job(job, Arc::clone(&ctx)))
            .collect();

        let results = futures::future::join_all(tasks).await;
        debug!(group = group_idx, tasks = results.len(), "Task group finished");

        for task_result in results {
            outcomes.push(task_result??);
        }
    }

    Ok(outcomes)
}

async fn run_sequential(jobs: Vec<YearJob>, ctx: Arc<AggregationContext>) -> Result<Vec<YearOutcome>> {
    let mut outcomes = Vec::with_capacity(jobs.len());
    for job in jobs {
        outcomes.push(spawn_job(job, Arc::clone(&ctx)).await??);
    }
    Ok(outcomes)
}

fn spawn_job(job: YearJob, ctx: Arc<AggregationContext>) -> tokio::task::JoinHandle<Result<YearOutcome>> {
    tokio::task::spawn_blocking(move || {
        let task_start = Instant::now();
        let outcome = aggregate_partition(job.year, &job.path, &ctx).map_err(|e| match e {
            Error::EmptyGroup(_) => Error::EmptyGroup(format!("partition {}", job.path.display())),
            other => other,
        })?;
        debug!(
            year = job.year,
            vacancies = outcome.stats.vacancy_count,
            duration_s = task_start.elapsed().as_secs_f64(),
            "Year task finished"
        );
        Ok(outcome)
    })
}

fn merge_outcomes(outcomes: Vec<YearOutcome>) -> FanInResult {
    outcomes
        .into_iter()
        .fold(FanInResult::default(), |mut acc, outcome| {
            acc.yearly = acc.yearly.merge(outcome.stats);
            acc.records.extend(outcome.records);
            acc
        })
}
