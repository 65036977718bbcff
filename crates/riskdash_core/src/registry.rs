use indexmap::IndexMap;
use riskdash_logging::{rd_debug, rd_info, rd_warn};

use crate::{AnalysisJob, CompanySymbol, FiscalYear, JobId, JobStatus, JobStatusUpdate};

/// Bounded retry for failing status fetches.
///
/// After the n-th consecutive failure a job sits out `2^(n-1) - 1` ticks, capped at
/// `max_backoff_ticks`. Once `max_consecutive_failures` is reached the job is parked in
/// [`JobStatus::Unreachable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_consecutive_failures: Option<u32>,
    pub max_backoff_ticks: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: Some(10),
            max_backoff_ticks: 8,
        }
    }
}

impl RetryPolicy {
    /// Retry forever on every tick.
    pub fn unbounded() -> Self {
        Self {
            max_consecutive_failures: None,
            max_backoff_ticks: 0,
        }
    }

    pub fn backoff_ticks(&self, failures: u32) -> u32 {
        if failures == 0 || self.max_backoff_ticks == 0 {
            return 0;
        }
        let exponent = (failures - 1).min(31);
        let ticks = (1u64 << exponent) - 1;
        ticks.min(u64::from(self.max_backoff_ticks)) as u32
    }

    fn gives_up_after(&self, failures: u32) -> bool {
        self.max_consecutive_failures
            .is_some_and(|limit| failures >= limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollFailureOutcome {
    UnknownJob,
    /// Job was already terminal; the failure is ignored.
    AlreadyTerminal,
    Retrying { failures: u32, wait_ticks: u32 },
    GaveUp { failures: u32 },
}

/// Submitted jobs in submission order together with their last known status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobRegistry {
    jobs: IndexMap<JobId, AnalysisJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job. Returns `false` and leaves the existing entry alone on duplicate ids.
    pub fn insert(
        &mut self,
        job_id: JobId,
        company: CompanySymbol,
        fiscal_year: FiscalYear,
        initial_status: JobStatus,
    ) -> bool {
        if self.jobs.contains_key(&job_id) {
            rd_warn!("Job {} already registered; ignoring duplicate insert", job_id);
            return false;
        }
        rd_info!(
            "Registered job {} company={} fiscal_year={} status={}",
            job_id,
            company,
            fiscal_year,
            initial_status
        );
        let job = AnalysisJob::new(job_id.clone(), company, fiscal_year, initial_status);
        self.jobs.insert(job_id, job);
        true
    }

    /// Applies a polled status. Returns `true` only on the edge into `Completed`.
    ///
    /// Terminal jobs never change status again; a repeated observation of the same terminal
    /// status refreshes progress and message but does not report the edge a second time.
    pub fn apply_update(&mut self, job_id: &JobId, update: &JobStatusUpdate) -> bool {
        let Some(job) = self.jobs.get_mut(job_id) else {
            rd_warn!("Status update for unknown job {}; dropping stale response", job_id);
            return false;
        };

        if job.status.is_terminal() {
            if update.status == job.status {
                job.progress = update.progress.min(100);
                job.message.clone_from(&update.message);
            } else {
                rd_warn!(
                    "Job {} is {}; ignoring late {} update",
                    job_id,
                    job.status,
                    update.status
                );
            }
            return false;
        }

        job.progress = update.progress.min(100);
        job.message.clone_from(&update.message);
        job.consecutive_failures = 0;
        job.wait_ticks = 0;

        if update.status == job.status {
            return false;
        }
        rd_info!("Job {} {} -> {}", job_id, job.status, update.status);
        job.status = update.status;
        job.status == JobStatus::Completed
    }

    /// Counts a failed status fetch against the job and schedules its next attempt.
    pub fn record_poll_failure(
        &mut self,
        job_id: &JobId,
        error: &str,
        policy: &RetryPolicy,
    ) -> PollFailureOutcome {
        let Some(job) = self.jobs.get_mut(job_id) else {
            rd_warn!("Poll failure for unknown job {}: {}", job_id, error);
            return PollFailureOutcome::UnknownJob;
        };
        if job.status.is_terminal() {
            return PollFailureOutcome::AlreadyTerminal;
        }

        job.consecutive_failures = job.consecutive_failures.saturating_add(1);
        let failures = job.consecutive_failures;
        if policy.gives_up_after(failures) {
            rd_warn!(
                "Job {} unreachable after {} consecutive poll failures: {}",
                job_id,
                failures,
                error
            );
            job.status = JobStatus::Unreachable;
            job.message = error.to_string();
            job.wait_ticks = 0;
            return PollFailureOutcome::GaveUp { failures };
        }

        job.wait_ticks = policy.backoff_ticks(failures);
        rd_warn!(
            "Poll for job {} failed ({} in a row, waiting {} ticks): {}",
            job_id,
            failures,
            job.wait_ticks,
            error
        );
        PollFailureOutcome::Retrying {
            failures,
            wait_ticks: job.wait_ticks,
        }
    }

    /// Ids of every job still in `Pending` or `Processing`.
    pub fn active_jobs(&self) -> Vec<JobId> {
        self.jobs
            .values()
            .filter(|job| !job.status.is_terminal())
            .map(|job| job.id.clone())
            .collect()
    }

    pub fn has_active(&self) -> bool {
        self.jobs.values().any(|job| !job.status.is_terminal())
    }

    /// Active jobs whose backoff has elapsed. Jobs still backing off lose one tick of wait.
    pub fn take_due_jobs(&mut self) -> Vec<JobId> {
        let mut due = Vec::new();
        for job in self.jobs.values_mut() {
            if job.status.is_terminal() {
                continue;
            }
            if job.wait_ticks > 0 {
                job.wait_ticks -= 1;
                rd_debug!("Job {} backing off, {} ticks left", job.id, job.wait_ticks);
                continue;
            }
            due.push(job.id.clone());
        }
        due
    }

    pub fn get(&self, job_id: &JobId) -> Option<&AnalysisJob> {
        self.jobs.get(job_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalysisJob> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
