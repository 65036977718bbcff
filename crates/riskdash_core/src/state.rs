use std::fmt;

use crate::analytics::AnalyticsView;
use crate::view_model::{DashboardViewModel, JobRowView, LatestResultView};
use crate::{
    AnalysisJob, Company, CompanySymbol, Document, FiscalYear, JobId, JobRegistry, JobStatus,
    RetryPolicy, RiskResult,
};

/// Generation of the mounted dashboard view. Bumped on every company selection and teardown,
/// so timers and responses started under an older generation can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScopeId(u64);

impl ScopeId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Owned, injectable dashboard store. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    companies: Vec<Company>,
    selected: Option<CompanySymbol>,
    scope: ScopeId,
    torn_down: bool,
    registry: JobRegistry,
    documents: Vec<Document>,
    history: Vec<RiskResult>,
    retry: RetryPolicy,
    polling: bool,
    dirty: bool,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..Self::default()
        }
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn selected_company(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_selected(&self, company: &str) -> bool {
        self.selected.as_deref() == Some(company)
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    pub fn job(&self, job_id: &JobId) -> Option<&AnalysisJob> {
        self.registry.get(job_id)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn history(&self) -> &[RiskResult] {
        &self.history
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether the state has asked for a polling timer that has not been stopped since.
    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn analytics(&self) -> AnalyticsView<'_> {
        AnalyticsView::new(&self.history)
    }

    pub fn view(&self) -> DashboardViewModel {
        let analytics = self.analytics();
        DashboardViewModel {
            selected_company: self.selected.clone(),
            companies: self.companies.clone(),
            documents: self.documents.clone(),
            jobs: self.registry.iter().map(JobRowView::from).collect(),
            latest: analytics.latest().map(LatestResultView::from),
            trend: analytics.trend_series(),
            radar: analytics.latest_radar(),
            polling: self.polling,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_polling(&mut self, polling: bool) {
        self.polling = polling;
    }

    pub(crate) fn registry_mut(&mut self) -> &mut JobRegistry {
        &mut self.registry
    }

    pub(crate) fn set_companies(&mut self, companies: Vec<Company>) {
        self.companies = companies;
        self.dirty = true;
    }

    pub(crate) fn upsert_company(&mut self, company: Company) {
        match self
            .companies
            .iter_mut()
            .find(|existing| existing.symbol == company.symbol)
        {
            Some(existing) => *existing = company,
            None => self.companies.push(company),
        }
        self.dirty = true;
    }

    /// Mounts a fresh view for `company`, discarding the previous history and documents.
    pub(crate) fn mount(&mut self, company: CompanySymbol) {
        self.scope = self.scope.next();
        self.selected = Some(company);
        self.torn_down = false;
        self.history.clear();
        self.documents.clear();
        self.polling = false;
        self.dirty = true;
    }

    pub(crate) fn tear_down(&mut self) {
        self.scope = self.scope.next();
        self.torn_down = true;
        self.polling = false;
        self.dirty = true;
    }

    pub(crate) fn register_job(
        &mut self,
        job_id: JobId,
        company: CompanySymbol,
        fiscal_year: FiscalYear,
    ) -> bool {
        let inserted = self
            .registry
            .insert(job_id, company, fiscal_year, JobStatus::Pending);
        self.dirty |= inserted;
        inserted
    }

    pub(crate) fn set_history(&mut self, mut history: Vec<RiskResult>) {
        history.sort_by_key(|result| result.fiscal_year);
        self.history = history;
        self.dirty = true;
    }

    pub(crate) fn set_documents(&mut self, mut documents: Vec<Document>) {
        documents.sort_by_key(|document| document.fiscal_year);
        self.documents = documents;
        self.dirty = true;
    }

    pub(crate) fn upsert_document(&mut self, document: Document) {
        match self
            .documents
            .iter_mut()
            .find(|existing| existing.fiscal_year == document.fiscal_year)
        {
            Some(existing) => *existing = document,
            None => {
                self.documents.push(document);
                self.documents.sort_by_key(|document| document.fiscal_year);
            }
        }
        self.dirty = true;
    }
}
