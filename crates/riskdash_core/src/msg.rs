use crate::{
    Company, CompanySymbol, Document, FiscalYear, JobId, JobStatusUpdate, RiskResult, ScopeId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Company list fetched from the backend.
    CompaniesLoaded(Vec<Company>),
    /// User created a company and the backend accepted it.
    CompanyCreated(Company),
    /// User switched the dashboard to another company.
    CompanySelected(CompanySymbol),
    /// Backend accepted an analysis request.
    JobSubmitted {
        job_id: JobId,
        company: CompanySymbol,
        fiscal_year: FiscalYear,
    },
    /// Polling timer fired for the given scope.
    PollTick { scope: ScopeId },
    /// A status fetch for a job succeeded.
    JobStatusPolled {
        job_id: JobId,
        update: JobStatusUpdate,
    },
    /// A status fetch for a job failed.
    JobPollFailed { job_id: JobId, error: String },
    /// Risk history fetched for a company.
    HistoryLoaded {
        company: CompanySymbol,
        results: Vec<RiskResult>,
    },
    /// Document list fetched for a company.
    DocumentsLoaded {
        company: CompanySymbol,
        documents: Vec<Document>,
    },
    /// Backend stored an uploaded document.
    DocumentUploaded(Document),
    /// Dashboard view is going away.
    TornDown,
}
