use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type CompanySymbol = String;
pub type FiscalYear = i32;

const FISCAL_YEAR_RANGE: std::ops::RangeInclusive<FiscalYear> = 1900..=2100;

/// Opaque identifier handed out by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Bad user input, rejected before anything is sent or stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("company symbol is required")]
    MissingSymbol,
    #[error("company name is required")]
    MissingName,
    #[error("fiscal year {0} is out of range")]
    FiscalYear(FiscalYear),
    #[error("document file is empty")]
    EmptyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub symbol: CompanySymbol,
    pub name: String,
    #[serde(default)]
    pub sector: Option<String>,
}

impl Company {
    /// Builds a company with whitespace trimmed and the symbol upper-cased.
    pub fn new(symbol: &str, name: &str, sector: Option<&str>) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            name: name.trim().to_string(),
            sector: sector
                .map(str::trim)
                .filter(|sector| !sector.is_empty())
                .map(ToOwned::to_owned),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::MissingSymbol);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(())
    }
}

pub fn validate_fiscal_year(fiscal_year: FiscalYear) -> Result<(), ValidationError> {
    if FISCAL_YEAR_RANGE.contains(&fiscal_year) {
        Ok(())
    } else {
        Err(ValidationError::FiscalYear(fiscal_year))
    }
}

/// An uploaded yearly filing. At most one per `(company_symbol, fiscal_year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub company_symbol: CompanySymbol,
    pub fiscal_year: FiscalYear,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub word_count: u64,
    pub upload_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Local terminal state: the status endpoint kept failing past the retry limit.
    #[serde(skip_deserializing)]
    Unreachable,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            JobStatus::Pending | JobStatus::Processing => false,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Unreachable => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Unreachable => "unreachable",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One decoded response of the job-status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusUpdate {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub message: String,
}

impl JobStatusUpdate {
    pub fn new(status: JobStatus, progress: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            progress: progress.min(100),
            message: message.into(),
        }
    }
}

/// Last known snapshot of a submitted analysis job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJob {
    pub id: JobId,
    /// Company the job was started for; compared against the selection on completion.
    pub company: CompanySymbol,
    pub fiscal_year: FiscalYear,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub consecutive_failures: u32,
    pub(crate) wait_ticks: u32,
}

impl AnalysisJob {
    pub fn new(
        id: JobId,
        company: CompanySymbol,
        fiscal_year: FiscalYear,
        status: JobStatus,
    ) -> Self {
        Self {
            id,
            company,
            fiscal_year,
            status,
            progress: 0,
            message: String::new(),
            consecutive_failures: 0,
            wait_ticks: 0,
        }
    }

    /// Ticks this job sits out before its next status fetch.
    pub fn wait_ticks(&self) -> u32 {
        self.wait_ticks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub fiscal_year: FiscalYear,
    pub urgency_score: f64,
    #[serde(default)]
    pub sentiment_delta: Option<f64>,
    #[serde(default)]
    pub risk_categories: IndexMap<String, f64>,
    #[serde(default)]
    pub key_phrases: Vec<String>,
    #[serde(default)]
    pub new_risks: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub analyzed_at: DateTime<Utc>,
}
