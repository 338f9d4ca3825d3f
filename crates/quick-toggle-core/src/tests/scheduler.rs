use crate::{
    BridgeError, PermissionRequest, Tone,
    tests::fakes::{Fakes, StatusReply, ids},
};

use std::{sync::atomic::Ordering, time::Duration};

use tokio::time::Instant;

/// WHAT: A running profile is rendered as running with its name
/// WHY: The widget must mirror the control service's reported state
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_running_profile_when_requesting_update_then_running_rendered() {
    // Given: Service running with profile "Work"
    let fakes = Fakes::new(&[1]);
    fakes.status.set_profile(Some("Work"));
    let scheduler = fakes.scheduler();

    // When: Requesting an update of instance 1
    scheduler.request_update(Some(ids(&[1]))).await.unwrap();

    // Then: The first render shows running with the profile name
    let first = fakes.host.rendered().into_iter().next().unwrap();
    assert_eq!(first.tone, Tone::Active);
    assert_eq!(first.status_text, "Work");
}

/// WHAT: A failed load degrades to the fallback and still succeeds
/// WHY: Refresh is best-effort; callers must not see refresh errors
#[tokio::test]
async fn given_failing_status_when_requesting_update_then_fallback_and_success() {
    // Given: A status path that answers with a failure
    let fakes = Fakes::new(&[1]);
    fakes.status.set(StatusReply::Broken);
    let scheduler = fakes.scheduler();

    // When: Requesting an update
    let result = scheduler.request_update(Some(ids(&[1]))).await;

    // Then: Success, with the error presentation on screen
    assert!(result.is_ok());
    assert!(fakes.host.has_tone(Tone::Error));
}

/// WHAT: A refresh whose render fails falls back and still succeeds
/// WHY: Host failures are display problems, not caller problems
#[tokio::test]
async fn given_failing_host_when_requesting_update_then_success() {
    // Given: A host rejecting renders
    let fakes = Fakes::new(&[1]);
    fakes.host.fail_renders.store(true, Ordering::SeqCst);
    let scheduler = fakes.scheduler();

    // When: Requesting an update
    let result = scheduler.request_update(Some(ids(&[1]))).await;

    // Then: Success reported; normal and fallback passes were both attempted
    assert!(result.is_ok());
    assert!(fakes.host.attempts.load(Ordering::SeqCst) >= 2);
}

/// WHAT: Zero live instances stops periodic refresh without rendering
/// WHY: The timer must not outlive the last placement
#[tokio::test]
async fn given_no_instances_when_requesting_empty_update_then_periodic_stopped_without_render() {
    // Given: No placements at all
    let fakes = Fakes::new(&[]);
    let scheduler = fakes.scheduler();

    // When: Requesting an update for an empty set
    let result = scheduler.request_update(Some(ids(&[]))).await;

    // Then: Success, no render, periodic refresher gone, worker alive
    assert!(result.is_ok());
    assert_eq!(fakes.host.attempts.load(Ordering::SeqCst), 0);
    assert!(!scheduler.is_periodic_active());
    assert!(scheduler.is_worker_active());
}

/// WHAT: 100 concurrent updates all succeed with one pass each, never overlapping
/// WHY: Requests are serialized and not coalesced
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_hundred_concurrent_updates_when_awaited_then_all_succeed_with_one_pass_each() {
    // Given: No registered placements, so periodic passes render nothing;
    // requests name instance 2 explicitly
    let fakes = Fakes::new(&[]);
    let scheduler = fakes.scheduler();

    // When: 100 callers request an update concurrently
    let callers: Vec<_> = (0..100)
        .map(|_| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.request_update(Some(ids(&[2]))).await })
        })
        .collect();

    // Then: Every completion succeeds
    for caller in callers {
        assert!(caller.await.unwrap().is_ok());
    }

    // And: Exactly 100 passes hit instance 2, never two at once
    assert_eq!(fakes.host.renders_for(2), 100);
    assert_eq!(fakes.host.max_in_flight.load(Ordering::SeqCst), 1);
}

/// WHAT: Interleaved toggles and updates never render concurrently
/// WHY: Only the single worker may touch the surface
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_interleaved_toggles_and_updates_when_awaited_then_renders_never_overlap() {
    // Given: One placement
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();

    // When: Toggles and updates are fired from many callers
    let callers: Vec<_> = (0..30)
        .map(|i| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                if i % 6 == 0 {
                    scheduler.toggle().await
                } else {
                    scheduler.request_update(None).await
                }
            })
        })
        .collect();

    // Then: All complete and renders were strictly sequential
    for caller in callers {
        assert!(caller.await.unwrap().is_ok());
    }
    assert_eq!(fakes.host.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        fakes.launcher.starts.load(Ordering::SeqCst) + fakes.launcher.stops.load(Ordering::SeqCst),
        5
    );
}

/// WHAT: A toggle's redraw waits out the grace period and sees the new state
/// WHY: The control service needs time to reflect a start
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_slow_start_when_toggling_then_render_after_grace_shows_running() {
    // Given: Stopped service whose start only shows up after 400ms
    let fakes = Fakes::new(&[1]);
    *fakes.launcher.flip_after.lock().unwrap() = Some(Duration::from_millis(400));
    let scheduler = fakes.scheduler();
    let started = Instant::now();

    // When: Toggling
    scheduler.toggle().await.unwrap();

    // Then: The toggle's render came at least 500ms later and shows running
    let (rendered_at, command) = fakes.host.commands.lock().unwrap()[0].clone();
    assert!(rendered_at - started >= Duration::from_millis(500));
    assert_eq!(command.tone, Tone::Active);
    assert_eq!(command.status_text, "flipped");
    assert_eq!(fakes.launcher.starts.load(Ordering::SeqCst), 1);
}

/// WHAT: A running service is stopped by a toggle
/// WHY: Toggle must pick the opposite of the current state
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_running_service_when_toggling_then_stopped() {
    // Given: Service running
    let fakes = Fakes::new(&[1]);
    fakes.status.set_profile(Some("Home"));
    let scheduler = fakes.scheduler();

    // When: Toggling
    scheduler.toggle().await.unwrap();

    // Then: Stop was requested, start was not, render shows stopped
    assert_eq!(fakes.launcher.stops.load(Ordering::SeqCst), 1);
    assert_eq!(fakes.launcher.starts.load(Ordering::SeqCst), 0);
    let (_, command) = fakes.host.commands.lock().unwrap()[0].clone();
    assert_eq!(command.tone, Tone::Inactive);
}

/// WHAT: A toggle failing before start/stop fails and shows the fallback
/// WHY: The user must learn the tap did nothing, and see no stale state
#[tokio::test]
async fn given_failing_status_when_toggling_then_failure_and_fallback_render() {
    // Given: A status path that answers with a failure
    let fakes = Fakes::new(&[1]);
    fakes.status.set(StatusReply::Broken);
    let scheduler = fakes.scheduler();

    // When: Toggling
    let result = scheduler.toggle().await;

    // Then: Failure carried back, fallback drawn, launcher untouched
    assert!(matches!(result, Err(BridgeError::OperationFailure { .. })));
    assert!(fakes.host.has_tone(Tone::Error));
    assert_eq!(fakes.launcher.starts.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.launcher.stops.load(Ordering::SeqCst), 0);
}

/// WHAT: A failed start fails the toggle and shows the fallback
/// WHY: Start failures are user-visible outcomes
#[tokio::test]
async fn given_failing_start_when_toggling_then_failure_and_fallback_render() {
    // Given: A launcher that refuses to start
    let fakes = Fakes::new(&[1]);
    fakes.launcher.fail.store(true, Ordering::SeqCst);
    let scheduler = fakes.scheduler();

    // When: Toggling
    let result = scheduler.toggle().await;

    // Then: Failure and fallback
    assert!(result.is_err());
    assert!(fakes.host.has_tone(Tone::Error));
}

/// WHAT: A permission request from start is handed to the host
/// WHY: The user has to grant it in the foreground; the toggle goes on
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_start_needing_permission_when_toggling_then_host_asked_and_toggle_succeeds() {
    // Given: A start that needs a grant
    let fakes = Fakes::new(&[1]);
    let request = PermissionRequest {
        description: "Allow VPN".to_string(),
        target: None,
    };
    *fakes.launcher.permission.lock().unwrap() = Some(request.clone());
    let scheduler = fakes.scheduler();

    // When: Toggling
    let result = scheduler.toggle().await;

    // Then: The host got the request and the toggle still succeeded
    assert!(result.is_ok());
    assert_eq!(*fakes.host.permissions.lock().unwrap(), vec![request]);
}

/// WHAT: Aborting the worker resolves the in-flight item as cancelled
/// WHY: No caller may be left waiting forever
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_in_flight_toggle_when_worker_aborted_then_cancelled_and_worker_rearmed() {
    // Given: A running service whose stop never returns
    let fakes = Fakes::new(&[1]);
    fakes.status.set_profile(Some("Home"));
    fakes.launcher.hang_on_stop.store(true, Ordering::SeqCst);
    let scheduler = fakes.scheduler();
    let handle = scheduler.toggle();
    fakes.launcher.stop_called.notified().await;

    // When: The worker is aborted mid-toggle
    scheduler.abort_worker();

    // Then: The toggle resolves as cancelled and the worker is gone
    assert!(matches!(handle.await, Err(BridgeError::Cancelled { .. })));
    assert!(!scheduler.is_worker_active());

    // And: The next call re-arms a worker that serves it
    fakes.launcher.hang_on_stop.store(false, Ordering::SeqCst);
    scheduler.request_update(Some(ids(&[1]))).await.unwrap();
    assert!(scheduler.is_worker_active());
}

/// WHAT: Dropping a caller's handle does not cancel its work
/// WHY: Callers may give up waiting; the display must still be refreshed
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_dropped_handle_when_queue_drains_then_work_still_runs() {
    // Given: No registered placements, so only explicit requests render
    let fakes = Fakes::new(&[]);
    let scheduler = fakes.scheduler();

    // When: One caller drops its handle and another waits
    drop(scheduler.request_update(Some(ids(&[2]))));
    scheduler.request_update(Some(ids(&[2]))).await.unwrap();

    // Then: Both requests produced a pass
    assert_eq!(fakes.host.renders_for(2), 2);
}

/// WHAT: start is idempotent and stop only ends periodic refresh
/// WHY: The worker must keep draining in-flight work after stop
#[tokio::test]
async fn given_started_scheduler_when_stopping_then_only_periodic_cancelled() {
    // Given: A started scheduler, started twice
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();
    scheduler.start();
    scheduler.start();
    assert!(scheduler.is_worker_active());
    assert!(scheduler.is_periodic_active());

    // When: Stopping
    scheduler.stop();

    // Then: Periodic gone, worker still there and still serving
    assert!(!scheduler.is_periodic_active());
    assert!(scheduler.is_worker_active());
    assert!(scheduler.request_update(Some(ids(&[1]))).await.is_ok());
}

/// WHAT: After shutdown, requests resolve with QueueClosed
/// WHY: Late callers must get an answer rather than hang
#[tokio::test]
async fn given_shut_down_scheduler_when_requesting_update_then_queue_closed() {
    // Given: A scheduler that has been shut down
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();
    scheduler.start();
    scheduler.shutdown();

    // When: Requesting an update
    let result = scheduler.request_update(None).await;

    // Then: Rejected, and no task was re-armed
    assert!(matches!(result, Err(BridgeError::QueueClosed { .. })));
    assert!(!scheduler.is_worker_active());
    assert!(!scheduler.is_periodic_active());
}

/// WHAT: Repeated failures leave the scheduler usable
/// WHY: No failure may be fatal to the process
#[tokio::test(start_paused = true)]
async fn given_repeated_toggle_failures_when_service_recovers_then_toggle_succeeds() {
    // Given: Several failed toggles
    let fakes = Fakes::new(&[1]);
    fakes.status.set(StatusReply::Broken);
    let scheduler = fakes.scheduler();
    for _ in 0..3 {
        assert!(scheduler.toggle().await.is_err());
    }

    // When: The service recovers
    fakes.status.set_profile(None);
    let result = scheduler.toggle().await;

    // Then: The toggle goes through
    assert!(result.is_ok());
    assert_eq!(fakes.launcher.starts.load(Ordering::SeqCst), 1);
}

/// WHAT: Periodic refresh redraws every 8 seconds after the previous pass
/// WHY: The widget's traffic figures go stale without a steady cadence
#[tokio::test(start_paused = true)]
async fn given_started_scheduler_when_time_passes_then_refreshed_every_interval() {
    // Given: One placement and a started scheduler
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();
    scheduler.start();

    // When/Then: The first pass runs at once
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.host.renders_for(1), 1);

    // And: Nothing more until the interval has elapsed
    tokio::time::sleep(Duration::from_millis(7_800)).await;
    assert_eq!(fakes.host.renders_for(1), 1);

    // And: One pass per interval from then on
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fakes.host.renders_for(1), 2);

    tokio::time::sleep(Duration::from_millis(16_000)).await;
    assert_eq!(fakes.host.renders_for(1), 4);
    assert!(scheduler.is_periodic_active());
}

/// WHAT: A dead worker is re-armed by the next periodic pass
/// WHY: Without an outside event the timer is the only thing that can revive it
#[tokio::test(start_paused = true)]
async fn given_aborted_idle_worker_when_interval_elapses_then_worker_rearmed_and_rendered() {
    // Given: A started scheduler that has drawn once
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.host.renders_for(1), 1);

    // When: The worker dies while idle and the interval elapses
    scheduler.abort_worker();
    assert!(!scheduler.is_worker_active());
    tokio::time::sleep(Duration::from_millis(9_000)).await;

    // Then: The periodic pass brought a worker back and it drew
    assert!(scheduler.is_worker_active());
    assert!(scheduler.is_periodic_active());
    assert_eq!(fakes.host.renders_for(1), 2);
}

/// WHAT: A periodic pass that fails does not end periodic refresh
/// WHY: One bad pass must not leave the widget frozen
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_periodic_pass_cancelled_mid_load_when_interval_elapses_then_next_pass_renders() {
    // Given: A traffic query slow enough to be interrupted
    let fakes = Fakes::new(&[1]);
    *fakes.remote.delay.lock().unwrap() = Some(Duration::from_millis(1_000));
    let scheduler = fakes.scheduler();
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(500)).await;

    // When: The worker is aborted mid-pass, failing it as cancelled
    scheduler.abort_worker();
    *fakes.remote.delay.lock().unwrap() = None;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.host.renders_for(1), 0);
    assert!(scheduler.is_periodic_active());

    // Then: The next interval still produces a pass
    tokio::time::sleep(Duration::from_millis(8_500)).await;
    assert_eq!(fakes.host.renders_for(1), 1);
    assert!(scheduler.is_periodic_active());
}

/// WHAT: A periodic pass finding no placements ends periodic refresh
/// WHY: The timer must not outlive the last placement
#[tokio::test(start_paused = true)]
async fn given_last_placement_removed_when_periodic_pass_runs_then_periodic_stops() {
    // Given: A started scheduler with one placement, drawn once
    let fakes = Fakes::new(&[1]);
    let scheduler = fakes.scheduler();
    scheduler.start();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(fakes.host.renders_for(1), 1);

    // When: The placement goes away and the next pass runs
    fakes.host.set_instances(&[]);
    tokio::time::sleep(Duration::from_millis(8_500)).await;

    // Then: Periodic refresh stopped itself, nothing more drawn, worker alive
    assert!(!scheduler.is_periodic_active());
    assert!(scheduler.is_worker_active());
    assert_eq!(fakes.host.renders_for(1), 1);

    // And: It stays stopped
    tokio::time::sleep(Duration::from_millis(20_000)).await;
    assert_eq!(fakes.host.attempts.load(Ordering::SeqCst), 1);
}
