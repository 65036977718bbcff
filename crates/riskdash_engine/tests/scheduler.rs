use std::time::Duration;

use riskdash_core::{update, DashboardState, Msg};
use riskdash_engine::{PollingScheduler, ScopeTick};
use tokio::sync::mpsc::error::TryRecvError;

fn scopes() -> (riskdash_core::ScopeId, riskdash_core::ScopeId) {
    let (state, _) = update(DashboardState::new(), Msg::CompanySelected("ACME".into()));
    let first = state.scope();
    let (state, _) = update(state, Msg::CompanySelected("GLOBEX".into()));
    (first, state.scope())
}

#[tokio::test(start_paused = true)]
async fn ticks_arrive_once_per_period() {
    let (scope, _) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(2000));

    assert!(scheduler.ensure_running(scope));
    let start = tokio::time::Instant::now();

    assert_eq!(ticks.recv().await, Some(ScopeTick { scope }));
    assert!(start.elapsed() >= Duration::from_millis(2000));
    assert_eq!(ticks.recv().await, Some(ScopeTick { scope }));
    assert!(start.elapsed() >= Duration::from_millis(4000));
}

#[tokio::test(start_paused = true)]
async fn starting_twice_keeps_a_single_timer() {
    let (scope, _) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(100));

    assert!(scheduler.ensure_running(scope));
    assert!(!scheduler.ensure_running(scope));
    let start = tokio::time::Instant::now();

    for period in 1..=3 {
        assert_eq!(ticks.recv().await, Some(ScopeTick { scope }));
        assert!(start.elapsed() >= Duration::from_millis(100 * period));
    }
    assert_eq!(scheduler.running_scope(), Some(scope));
}

#[tokio::test(start_paused = true)]
async fn unread_ticks_do_not_pile_up() {
    let (scope, _) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(100));
    scheduler.ensure_running(scope);

    tokio::time::sleep(Duration::from_millis(550)).await;

    assert_eq!(ticks.try_recv(), Ok(ScopeTick { scope }));
    assert_eq!(ticks.try_recv(), Err(TryRecvError::Empty));
    let start = tokio::time::Instant::now();
    assert_eq!(ticks.recv().await, Some(ScopeTick { scope }));
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_timer() {
    let (scope, _) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(100));

    scheduler.ensure_running(scope);
    assert!(scheduler.stop());
    assert!(!scheduler.is_running());
    assert!(!scheduler.stop());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(ticks.try_recv(), Err(TryRecvError::Empty));
}

#[tokio::test(start_paused = true)]
async fn new_scope_replaces_old_timer() {
    let (first, second) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(100));

    scheduler.ensure_running(first);
    assert!(scheduler.ensure_running(second));
    assert_eq!(scheduler.running_scope(), Some(second));

    for _ in 0..2 {
        assert_eq!(ticks.recv().await, Some(ScopeTick { scope: second }));
    }
}

#[tokio::test(start_paused = true)]
async fn dropping_scheduler_stops_ticks() {
    let (scope, _) = scopes();
    let (mut scheduler, mut ticks) = PollingScheduler::new(Duration::from_millis(100));
    scheduler.ensure_running(scope);

    drop(scheduler);

    assert_eq!(ticks.recv().await, None);
}
