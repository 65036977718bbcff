use riskdash_logging::{rd_debug, rd_info, rd_warn};

use crate::{DashboardState, Effect, JobId, Msg, PollFailureOutcome};

/// Pure update function: applies a message to state and returns any effects.
///
/// Effects are ordered: they are only emitted after the state change they depend on has been
/// applied, and the polling timer is reconciled last so it is running exactly while there are
/// active jobs in a mounted view.
pub fn update(mut state: DashboardState, msg: Msg) -> (DashboardState, Vec<Effect>) {
    let mut effects = match msg {
        Msg::CompaniesLoaded(companies) => {
            state.set_companies(companies);
            Vec::new()
        }
        Msg::CompanyCreated(company) => {
            state.upsert_company(company);
            Vec::new()
        }
        Msg::CompanySelected(company) => {
            let was_polling = state.is_polling();
            state.mount(company.clone());
            rd_info!("Selected company {} ({})", company, state.scope());
            let mut effects = Vec::with_capacity(3);
            if was_polling {
                effects.push(Effect::StopPolling);
            }
            effects.push(Effect::LoadHistory {
                company: company.clone(),
            });
            effects.push(Effect::LoadDocuments { company });
            effects
        }
        Msg::JobSubmitted {
            job_id,
            company,
            fiscal_year,
        } => {
            state.register_job(job_id, company, fiscal_year);
            Vec::new()
        }
        Msg::PollTick { scope } => {
            if state.is_torn_down() || scope != state.scope() {
                rd_debug!("Ignoring tick for stale {} (current {})", scope, state.scope());
                return (state, Vec::new());
            }
            state
                .registry_mut()
                .take_due_jobs()
                .into_iter()
                .map(|job_id| Effect::FetchStatus { job_id })
                .collect()
        }
        Msg::JobStatusPolled { job_id, update } => {
            let completed_now = state.registry_mut().apply_update(&job_id, &update);
            state.mark_dirty();
            if completed_now {
                reload_after_completion(&state, &job_id)
            } else {
                Vec::new()
            }
        }
        Msg::JobPollFailed { job_id, error } => {
            let policy = *state.retry_policy();
            match state
                .registry_mut()
                .record_poll_failure(&job_id, &error, &policy)
            {
                PollFailureOutcome::GaveUp { .. } | PollFailureOutcome::Retrying { .. } => {
                    state.mark_dirty();
                }
                PollFailureOutcome::UnknownJob | PollFailureOutcome::AlreadyTerminal => {}
            }
            Vec::new()
        }
        Msg::HistoryLoaded { company, results } => {
            if state.is_selected(&company) {
                rd_debug!("Loaded {} risk results for {}", results.len(), company);
                state.set_history(results);
            } else {
                rd_warn!("Discarding risk history for {}; no longer selected", company);
            }
            Vec::new()
        }
        Msg::DocumentsLoaded { company, documents } => {
            if state.is_selected(&company) {
                state.set_documents(documents);
            } else {
                rd_warn!("Discarding documents for {}; no longer selected", company);
            }
            Vec::new()
        }
        Msg::DocumentUploaded(document) => {
            if state.is_selected(&document.company_symbol) {
                state.upsert_document(document);
            }
            Vec::new()
        }
        Msg::TornDown => {
            let was_polling = state.is_polling();
            state.tear_down();
            if was_polling {
                vec![Effect::StopPolling]
            } else {
                Vec::new()
            }
        }
    };

    reconcile_polling(&mut state, &mut effects);
    (state, effects)
}

fn reload_after_completion(state: &DashboardState, job_id: &JobId) -> Vec<Effect> {
    let Some(job) = state.job(job_id) else {
        return Vec::new();
    };
    if state.is_torn_down() || !state.is_selected(&job.company) {
        rd_warn!(
            "Job {} completed for {} but the dashboard shows {:?}; skipping history reload",
            job_id,
            job.company,
            state.selected_company()
        );
        return Vec::new();
    }
    vec![Effect::ReloadHistory {
        company: job.company.clone(),
    }]
}

fn reconcile_polling(state: &mut DashboardState, effects: &mut Vec<Effect>) {
    if state.is_torn_down() {
        return;
    }
    match (state.registry().has_active(), state.is_polling()) {
        (true, false) => {
            state.set_polling(true);
            effects.push(Effect::StartPolling {
                scope: state.scope(),
            });
        }
        (false, true) => {
            state.set_polling(false);
            effects.push(Effect::StopPolling);
        }
        _ => {}
    }
}
