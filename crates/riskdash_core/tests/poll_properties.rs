use proptest::prelude::*;
use riskdash_core::{
    update, DashboardState, Effect, JobId, JobRegistry, JobStatus, JobStatusUpdate, Msg,
};

fn backend_status() -> impl Strategy<Value = JobStatus> {
    prop_oneof![
        Just(JobStatus::Pending),
        Just(JobStatus::Processing),
        Just(JobStatus::Completed),
        Just(JobStatus::Failed),
    ]
}

fn poll_response() -> impl Strategy<Value = JobStatusUpdate> {
    (backend_status(), 0u8..=120)
        .prop_map(|(status, progress)| JobStatusUpdate::new(status, progress, "polled"))
}

proptest! {
    #[test]
    fn terminal_status_is_never_left(responses in prop::collection::vec(poll_response(), 0..40)) {
        let id = JobId::from("job-1");
        let mut registry = JobRegistry::new();
        registry.insert(id.clone(), "ACME".to_string(), 2023, JobStatus::Pending);

        let mut terminal = None;
        let mut completed_edges = 0;
        for response in &responses {
            if registry.apply_update(&id, response) {
                completed_edges += 1;
            }
            let status = registry.get(&id).unwrap().status;
            if let Some(frozen) = terminal {
                prop_assert_eq!(status, frozen);
            }
            if status.is_terminal() {
                terminal = Some(status);
            }
        }

        prop_assert!(completed_edges <= 1);
        prop_assert_eq!(completed_edges == 1, terminal == Some(JobStatus::Completed));
    }

    /// `None` stands for a failed status fetch.
    #[test]
    fn history_reloads_at_most_once_per_job(
        polls in prop::collection::vec(prop::option::of(poll_response()), 0..40)
    ) {
        let id = JobId::from("job-1");
        let (mut state, _) = update(DashboardState::new(), Msg::CompanySelected("ACME".to_string()));
        state = update(
            state,
            Msg::JobSubmitted {
                job_id: id.clone(),
                company: "ACME".to_string(),
                fiscal_year: 2023,
            },
        )
        .0;

        let mut reloads = 0;
        for poll in polls {
            let msg = match poll {
                Some(update) => Msg::JobStatusPolled { job_id: id.clone(), update },
                None => Msg::JobPollFailed {
                    job_id: id.clone(),
                    error: "connection refused".to_string(),
                },
            };
            let (next, effects) = update(state, msg);
            state = next;
            reloads += effects
                .iter()
                .filter(|effect| matches!(effect, Effect::ReloadHistory { .. }))
                .count();
        }

        prop_assert!(reloads <= 1);
        let completed = state.job(&id).map(|job| job.status) == Some(JobStatus::Completed);
        prop_assert_eq!(reloads == 1, completed);
        prop_assert_eq!(state.is_polling(), state.registry().has_active());
    }
}
