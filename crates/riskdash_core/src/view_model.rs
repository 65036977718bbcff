use crate::{
    AnalysisJob, Company, CompanySymbol, Document, FiscalYear, JobId, JobStatus, RadarPoint,
    RiskResult, TrendPoint,
};

/// Everything the presentation layer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardViewModel {
    pub selected_company: Option<CompanySymbol>,
    pub companies: Vec<Company>,
    pub documents: Vec<Document>,
    pub jobs: Vec<JobRowView>,
    pub latest: Option<LatestResultView>,
    pub trend: Vec<TrendPoint>,
    pub radar: Vec<RadarPoint>,
    pub polling: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub company: CompanySymbol,
    pub fiscal_year: FiscalYear,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
}

impl From<&AnalysisJob> for JobRowView {
    fn from(job: &AnalysisJob) -> Self {
        Self {
            job_id: job.id.clone(),
            company: job.company.clone(),
            fiscal_year: job.fiscal_year,
            status: job.status,
            progress: job.progress,
            message: job.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatestResultView {
    pub fiscal_year: FiscalYear,
    pub urgency_score: f64,
    pub sentiment_delta: Option<f64>,
    pub key_phrases: Vec<String>,
    pub new_risks: Vec<String>,
    pub summary: String,
}

impl From<&RiskResult> for LatestResultView {
    fn from(result: &RiskResult) -> Self {
        Self {
            fiscal_year: result.fiscal_year,
            urgency_score: result.urgency_score,
            sentiment_delta: result.sentiment_delta,
            key_phrases: result.key_phrases.clone(),
            new_risks: result.new_risks.clone(),
            summary: result.summary.clone(),
        }
    }
}
