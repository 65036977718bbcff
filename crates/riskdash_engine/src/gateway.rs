use std::time::Duration;

use reqwest::RequestBuilder;
use riskdash_core::{
    validate_fiscal_year, Company, Document, FiscalYear, JobId, JobStatus, JobStatusUpdate,
    RiskResult, ValidationError,
};
use riskdash_logging::rd_debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{DocumentUpload, FailureKind, GatewayError, RequestFailure};

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Typed request/response boundary to the analysis backend.
#[async_trait::async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>, GatewayError>;

    async fn create_company(&self, company: &Company) -> Result<Company, GatewayError>;

    async fn upload_document(
        &self,
        upload: &DocumentUpload,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Document, GatewayError>;

    async fn list_documents(&self, company: &str) -> Result<Vec<Document>, GatewayError>;

    async fn submit_analysis(
        &self,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<JobId, GatewayError>;

    async fn fetch_job_status(&self, job_id: &JobId) -> Result<JobStatusUpdate, GatewayError>;

    /// Risk results for `company`, ascending by fiscal year.
    async fn fetch_risk_history(&self, company: &str) -> Result<Vec<RiskResult>, GatewayError>;
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    company_symbol: &'a str,
    fiscal_year: FiscalYear,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: JobId,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: JobStatus,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl From<StatusResponse> for JobStatusUpdate {
    fn from(raw: StatusResponse) -> Self {
        let progress = match raw.progress {
            Some(value) if value.is_finite() => value.clamp(0.0, 100.0).round() as u8,
            _ => 0,
        };
        JobStatusUpdate::new(raw.status, progress, raw.message.unwrap_or_default())
    }
}

/// JSON-over-HTTP gateway.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    settings: GatewaySettings,
    client: reqwest::Client,
}

impl ReqwestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, RequestFailure> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestFailure::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RequestFailure> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|err| RequestFailure::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| RequestFailure::new(FailureKind::InvalidUrl, "base url cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, RequestFailure> {
        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match body.trim() {
                "" => status.canonical_reason().unwrap_or_default().to_string(),
                text => text.chars().take(200).collect(),
            };
            return Err(RequestFailure::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        response.json::<T>().await.map_err(map_reqwest_error)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RequestFailure> {
        let url = self.endpoint(segments)?;
        rd_debug!("GET {}", url);
        self.execute(self.client.get(url)).await
    }
}

#[async_trait::async_trait]
impl RemoteGateway for ReqwestGateway {
    async fn list_companies(&self) -> Result<Vec<Company>, GatewayError> {
        self.get(&["api", "companies"])
            .await
            .map_err(GatewayError::Request)
    }

    async fn create_company(&self, company: &Company) -> Result<Company, GatewayError> {
        company.validate()?;
        let url = self
            .endpoint(&["api", "companies"])
            .map_err(GatewayError::Request)?;
        rd_debug!("POST {} symbol={}", url, company.symbol);
        self.execute(self.client.post(url).json(company))
            .await
            .map_err(GatewayError::Request)
    }

    async fn upload_document(
        &self,
        upload: &DocumentUpload,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Document, GatewayError> {
        if company.trim().is_empty() {
            return Err(ValidationError::MissingSymbol.into());
        }
        validate_fiscal_year(fiscal_year)?;
        if upload.bytes.is_empty() {
            return Err(ValidationError::EmptyDocument.into());
        }

        let url = self
            .endpoint(&["api", "documents"])
            .map_err(GatewayError::Upload)?;
        rd_debug!(
            "POST {} file={} bytes={} company={} fiscal_year={}",
            url,
            upload.file_name,
            upload.bytes.len(),
            company,
            fiscal_year
        );
        let part =
            reqwest::multipart::Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        let form = reqwest::multipart::Form::new()
            .text("company_symbol", company.to_string())
            .text("fiscal_year", fiscal_year.to_string())
            .part("file", part);
        self.execute(self.client.post(url).multipart(form))
            .await
            .map_err(GatewayError::Upload)
    }

    async fn list_documents(&self, company: &str) -> Result<Vec<Document>, GatewayError> {
        self.get(&["api", "companies", company, "documents"])
            .await
            .map_err(GatewayError::Request)
    }

    async fn submit_analysis(
        &self,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<JobId, GatewayError> {
        if company.trim().is_empty() {
            return Err(ValidationError::MissingSymbol.into());
        }
        validate_fiscal_year(fiscal_year)?;

        let url = self
            .endpoint(&["api", "analysis"])
            .map_err(GatewayError::Submission)?;
        rd_debug!("POST {} company={} fiscal_year={}", url, company, fiscal_year);
        let body = SubmitRequest {
            company_symbol: company,
            fiscal_year,
        };
        let response: SubmitResponse = self
            .execute(self.client.post(url).json(&body))
            .await
            .map_err(GatewayError::Submission)?;
        Ok(response.job_id)
    }

    async fn fetch_job_status(&self, job_id: &JobId) -> Result<JobStatusUpdate, GatewayError> {
        let raw: StatusResponse = self
            .get(&["api", "jobs", job_id.as_str()])
            .await
            .map_err(GatewayError::Poll)?;
        Ok(raw.into())
    }

    async fn fetch_risk_history(&self, company: &str) -> Result<Vec<RiskResult>, GatewayError> {
        let mut history: Vec<RiskResult> = self
            .get(&["api", "companies", company, "risks"])
            .await
            .map_err(GatewayError::Request)?;
        history.sort_by_key(|result| result.fiscal_year);
        Ok(history)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> RequestFailure {
    if err.is_timeout() {
        return RequestFailure::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return RequestFailure::new(FailureKind::Decode, err.to_string());
    }
    RequestFailure::new(FailureKind::Network, err.to_string())
}
