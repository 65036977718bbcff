use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use riskdash_core::{
    update, validate_fiscal_year, Company, DashboardState, DashboardViewModel, Document, Effect,
    FiscalYear, JobId, Msg, RetryPolicy, ValidationError,
};
use riskdash_logging::{rd_debug, rd_info, rd_warn};

use crate::scheduler::{PollingScheduler, TickReceiver, DEFAULT_POLL_INTERVAL};
use crate::{DocumentUpload, GatewayError, RemoteGateway};

#[derive(Debug, Clone, Copy)]
pub struct ControllerSettings {
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

/// Drives the dashboard: runs user actions and timer ticks through [`update`] and executes
/// the resulting effects against the gateway and the polling timer.
///
/// All state changes happen on the task that owns the controller. The only suspension points
/// are gateway calls; each job's poll result is applied before the next job is fetched.
pub struct ReconciliationController<G: RemoteGateway> {
    gateway: Arc<G>,
    state: DashboardState,
    scheduler: PollingScheduler,
    ticks: TickReceiver,
}

impl<G: RemoteGateway> ReconciliationController<G> {
    pub fn new(gateway: Arc<G>, settings: ControllerSettings) -> Self {
        Self::with_state(
            gateway,
            DashboardState::with_retry_policy(settings.retry),
            settings.poll_interval,
        )
    }

    /// Builds a controller around an existing store.
    pub fn with_state(gateway: Arc<G>, state: DashboardState, poll_interval: Duration) -> Self {
        let (scheduler, ticks) = PollingScheduler::new(poll_interval);
        Self {
            gateway,
            state,
            scheduler,
            ticks,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn view(&self) -> DashboardViewModel {
        self.state.view()
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }

    pub fn scheduler(&self) -> &PollingScheduler {
        &self.scheduler
    }

    pub async fn list_companies(&mut self) -> Result<&[Company], GatewayError> {
        let companies = self.gateway.list_companies().await?;
        self.dispatch(Msg::CompaniesLoaded(companies)).await?;
        Ok(self.state.companies())
    }

    pub async fn create_company(&mut self, company: Company) -> Result<Company, GatewayError> {
        company.validate()?;
        let created = self.gateway.create_company(&company).await?;
        rd_info!("Created company {}", created.symbol);
        self.dispatch(Msg::CompanyCreated(created.clone())).await?;
        Ok(created)
    }

    /// Mounts the dashboard for `company` and loads its history and documents.
    ///
    /// The previous scope's timer is cancelled before anything is fetched.
    pub async fn select_company(&mut self, company: &str) -> Result<(), GatewayError> {
        self.dispatch(Msg::CompanySelected(company.to_string()))
            .await
    }

    pub async fn upload_document(
        &mut self,
        upload: &DocumentUpload,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<Document, GatewayError> {
        let document = self
            .gateway
            .upload_document(upload, company, fiscal_year)
            .await?;
        rd_info!(
            "Uploaded {} for {} FY{}",
            upload.file_name,
            document.company_symbol,
            document.fiscal_year
        );
        self.dispatch(Msg::DocumentUploaded(document.clone()))
            .await?;
        Ok(document)
    }

    /// Submits an analysis job and makes sure polling is running.
    ///
    /// Nothing is registered when the submission fails.
    pub async fn start_job(
        &mut self,
        company: &str,
        fiscal_year: FiscalYear,
    ) -> Result<JobId, GatewayError> {
        if company.trim().is_empty() {
            return Err(ValidationError::MissingSymbol.into());
        }
        validate_fiscal_year(fiscal_year)?;
        let job_id = self.gateway.submit_analysis(company, fiscal_year).await?;
        rd_info!("Submitted job {} for {} FY{}", job_id, company, fiscal_year);
        self.dispatch(Msg::JobSubmitted {
            job_id: job_id.clone(),
            company: company.to_string(),
            fiscal_year,
        })
        .await?;
        Ok(job_id)
    }

    /// Polls every due job once. Poll errors are recorded per job and never abort the tick.
    pub async fn on_tick(&mut self) {
        let scope = self.state.scope();
        if let Err(err) = self.dispatch(Msg::PollTick { scope }).await {
            rd_warn!("History reload after tick failed: {}", err);
        }
    }

    /// Waits for the next tick of the current scope and handles it.
    ///
    /// Ticks left in the channel by an earlier scope's timer are discarded. Returns `false`
    /// once no timer is running.
    pub async fn next_tick(&mut self) -> bool {
        loop {
            if !self.scheduler.is_running() {
                return false;
            }
            let Some(tick) = self.ticks.recv().await else {
                return false;
            };
            if tick.scope != self.state.scope() {
                rd_debug!("Dropping stale tick for {}", tick.scope);
                continue;
            }
            self.on_tick().await;
            self.drain_ticks();
            return true;
        }
    }

    /// Handles ticks until no job is active, reporting every changed view.
    pub async fn watch_until_idle<F>(&mut self, mut on_change: F) -> DashboardViewModel
    where
        F: FnMut(&DashboardViewModel),
    {
        while self.next_tick().await {
            if self.state.consume_dirty() {
                on_change(&self.state.view());
            }
        }
        self.state.view()
    }

    /// Stops polling. Job snapshots stay readable until the controller is dropped.
    pub async fn tear_down(&mut self) {
        if let Err(err) = self.dispatch(Msg::TornDown).await {
            rd_warn!("Teardown failed: {}", err);
        }
    }

    /// Discards ticks that fired while a poll round was running or before a timer restart.
    fn drain_ticks(&mut self) {
        let mut dropped = 0;
        while self.ticks.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            rd_debug!("Discarded {} pending tick(s)", dropped);
        }
    }

    /// Applies `msg` and executes effects in order, feeding their results back in.
    ///
    /// All effects run even if one fails; the first failure is returned.
    async fn dispatch(&mut self, msg: Msg) -> Result<(), GatewayError> {
        let mut pending: VecDeque<Effect> = VecDeque::new();
        let mut first_error = None;
        self.apply(msg, &mut pending);

        while let Some(effect) = pending.pop_front() {
            match self.run_effect(effect).await {
                Ok(Some(msg)) => self.apply(msg, &mut pending),
                Ok(None) => {}
                Err(err) => {
                    rd_warn!("Effect failed: {}", err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn apply(&mut self, msg: Msg, pending: &mut VecDeque<Effect>) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        pending.extend(effects);
    }

    async fn run_effect(&mut self, effect: Effect) -> Result<Option<Msg>, GatewayError> {
        match effect {
            Effect::StartPolling { scope } => {
                if self.scheduler.ensure_running(scope) {
                    self.drain_ticks();
                }
                Ok(None)
            }
            Effect::StopPolling => {
                self.scheduler.stop();
                self.drain_ticks();
                Ok(None)
            }
            Effect::FetchStatus { job_id } => {
                let msg = match self.gateway.fetch_job_status(&job_id).await {
                    Ok(update) => Msg::JobStatusPolled { job_id, update },
                    Err(err) => Msg::JobPollFailed {
                        job_id,
                        error: err.to_string(),
                    },
                };
                Ok(Some(msg))
            }
            Effect::ReloadHistory { company } | Effect::LoadHistory { company } => {
                let results = self.gateway.fetch_risk_history(&company).await?;
                Ok(Some(Msg::HistoryLoaded { company, results }))
            }
            Effect::LoadDocuments { company } => {
                let documents = self.gateway.list_documents(&company).await?;
                Ok(Some(Msg::DocumentsLoaded { company, documents }))
            }
        }
    }
}
