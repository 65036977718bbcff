use riskdash_core::{
    JobId, JobRegistry, JobStatus, JobStatusUpdate, PollFailureOutcome, RetryPolicy,
};

fn init_logging() {
    riskdash_logging::initialize_for_tests();
}

fn registry_with(ids: &[&str]) -> JobRegistry {
    let mut registry = JobRegistry::new();
    for id in ids {
        assert!(registry.insert(JobId::from(*id), "ACME".to_string(), 2023, JobStatus::Pending));
    }
    registry
}

fn status(status: JobStatus, progress: u8) -> JobStatusUpdate {
    JobStatusUpdate::new(status, progress, format!("{status} {progress}%"))
}

#[test]
fn completed_edge_is_reported_once() {
    init_logging();
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");

    assert!(!registry.apply_update(&id, &status(JobStatus::Processing, 30)));
    assert!(registry.apply_update(&id, &status(JobStatus::Completed, 100)));
    assert!(!registry.apply_update(&id, &status(JobStatus::Completed, 100)));

    let job = registry.get(&id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert!(registry.active_jobs().is_empty());
}

#[test]
fn terminal_jobs_never_move_back() {
    init_logging();
    let mut registry = registry_with(&["done", "broken"]);
    let done = JobId::from("done");
    let broken = JobId::from("broken");
    registry.apply_update(&done, &status(JobStatus::Completed, 100));
    registry.apply_update(&broken, &status(JobStatus::Failed, 40));

    let responses = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Failed,
        JobStatus::Completed,
    ];
    for response in responses {
        assert!(!registry.apply_update(&done, &status(response, 10)));
        assert!(!registry.apply_update(&broken, &status(response, 10)));
    }

    let done_job = registry.get(&done).unwrap();
    assert_eq!(done_job.status, JobStatus::Completed);
    assert_eq!(done_job.progress, 10, "same-status repeat refreshes progress");
    assert_eq!(registry.get(&broken).unwrap().status, JobStatus::Failed);
}

#[test]
fn same_status_update_overwrites_progress_and_message() {
    init_logging();
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");

    registry.apply_update(&id, &JobStatusUpdate::new(JobStatus::Processing, 10, "parsing"));
    let changed =
        registry.apply_update(&id, &JobStatusUpdate::new(JobStatus::Processing, 70, "scoring"));

    assert!(!changed);
    let job = registry.get(&id).unwrap();
    assert_eq!(job.progress, 70);
    assert_eq!(job.message, "scoring");
}

#[test]
fn progress_is_clamped() {
    let update = JobStatusUpdate::new(JobStatus::Processing, 250, "");
    assert_eq!(update.progress, 100);
}

#[test]
fn unknown_job_update_is_a_noop() {
    init_logging();
    let mut registry = registry_with(&["job-1"]);
    let before = registry.clone();

    let changed = registry.apply_update(&JobId::from("ghost"), &status(JobStatus::Completed, 100));

    assert!(!changed);
    assert_eq!(registry, before);
    assert!(registry.get(&JobId::from("ghost")).is_none());
}

#[test]
fn duplicate_insert_keeps_existing_job() {
    init_logging();
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");
    registry.apply_update(&id, &status(JobStatus::Processing, 50));

    assert!(!registry.insert(id.clone(), "OTHER".to_string(), 1999, JobStatus::Pending));
    let job = registry.get(&id).unwrap();
    assert_eq!(job.company, "ACME");
    assert_eq!(job.status, JobStatus::Processing);
}

#[test]
fn active_jobs_follow_submission_order() {
    let mut registry = registry_with(&["b", "a", "c"]);
    registry.apply_update(&JobId::from("a"), &status(JobStatus::Failed, 0));

    assert_eq!(
        registry.active_jobs(),
        vec![JobId::from("b"), JobId::from("c")]
    );
    assert!(registry.has_active());
}

#[test]
fn poll_failures_back_off_then_give_up() {
    init_logging();
    let policy = RetryPolicy {
        max_consecutive_failures: Some(3),
        max_backoff_ticks: 8,
    };
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");

    assert_eq!(
        registry.record_poll_failure(&id, "timeout", &policy),
        PollFailureOutcome::Retrying {
            failures: 1,
            wait_ticks: 0
        }
    );
    assert_eq!(registry.take_due_jobs(), vec![id.clone()]);

    assert_eq!(
        registry.record_poll_failure(&id, "timeout", &policy),
        PollFailureOutcome::Retrying {
            failures: 2,
            wait_ticks: 1
        }
    );
    assert!(registry.take_due_jobs().is_empty(), "sits out one tick");
    assert_eq!(registry.take_due_jobs(), vec![id.clone()]);

    assert_eq!(
        registry.record_poll_failure(&id, "connection refused", &policy),
        PollFailureOutcome::GaveUp { failures: 3 }
    );
    let job = registry.get(&id).unwrap();
    assert_eq!(job.status, JobStatus::Unreachable);
    assert_eq!(job.message, "connection refused");
    assert!(registry.active_jobs().is_empty());
    assert_eq!(
        registry.record_poll_failure(&id, "again", &policy),
        PollFailureOutcome::AlreadyTerminal
    );
}

#[test]
fn successful_poll_resets_failure_count() {
    init_logging();
    let policy = RetryPolicy::default();
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");

    registry.record_poll_failure(&id, "timeout", &policy);
    registry.record_poll_failure(&id, "timeout", &policy);
    assert_eq!(registry.get(&id).unwrap().consecutive_failures, 2);

    registry.apply_update(&id, &status(JobStatus::Processing, 20));
    let job = registry.get(&id).unwrap();
    assert_eq!(job.consecutive_failures, 0);
    assert_eq!(job.wait_ticks(), 0);
    assert_eq!(registry.take_due_jobs(), vec![id]);
}

#[test]
fn unbounded_policy_keeps_retrying_every_tick() {
    init_logging();
    let policy = RetryPolicy::unbounded();
    let mut registry = registry_with(&["job-1"]);
    let id = JobId::from("job-1");

    for _ in 0..50 {
        registry.record_poll_failure(&id, "down", &policy);
        assert_eq!(registry.take_due_jobs(), vec![id.clone()]);
    }
    assert_eq!(registry.get(&id).unwrap().status, JobStatus::Pending);
}
