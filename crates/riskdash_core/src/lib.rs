//! Riskdash core: pure dashboard state machine and view-model helpers.
mod analytics;
mod effect;
mod model;
mod msg;
mod registry;
mod state;
mod update;
mod view_model;

pub use analytics::{normalize_category, radar_series, AnalyticsView, RadarPoint, TrendPoint};
pub use effect::Effect;
pub use model::{
    validate_fiscal_year, AnalysisJob, Company, CompanySymbol, Document, FiscalYear, JobId,
    JobStatus, JobStatusUpdate, RiskResult, ValidationError,
};
pub use msg::Msg;
pub use registry::{JobRegistry, PollFailureOutcome, RetryPolicy};
pub use state::{DashboardState, ScopeId};
pub use update::update;
pub use view_model::{DashboardViewModel, JobRowView, LatestResultView};
