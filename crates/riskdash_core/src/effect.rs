use crate::{CompanySymbol, JobId, ScopeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start the polling timer for the given mounted scope.
    StartPolling { scope: ScopeId },
    /// Cancel the polling timer.
    StopPolling,
    /// Fetch the current status of one job.
    FetchStatus { job_id: JobId },
    /// A job for `company` just completed; refresh its risk history.
    ReloadHistory { company: CompanySymbol },
    /// Initial history load after a company was selected.
    LoadHistory { company: CompanySymbol },
    LoadDocuments { company: CompanySymbol },
}
