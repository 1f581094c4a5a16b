//! Integration tests for the tracker actor.
//!
//! These drive `spawn_tracker()` through `TrackerHandle` on a paused tokio
//! clock, so thresholds of minutes elapse instantly. Thresholds are scaled
//! down to 1/3/6 minutes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

use screentime_core::{AgeBracket, BreakPolicy, BreakThresholds, SessionKey, UserProfile};
use screentime_tracker::{
    spawn_tracker, MemoryStore, MonotonicClock, SessionStore, TrackerEvent, TrackerHandle,
    TrackerOptions,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

fn test_policy() -> BreakPolicy {
    BreakPolicy::new(
        BreakThresholds::new(
            Duration::from_secs(60),
            Duration::from_secs(180),
            Duration::from_secs(360),
        )
        .unwrap(),
    )
}

fn spawn_test_tracker() -> (TrackerHandle, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let options = TrackerOptions::new(test_policy(), store.clone())
        .with_clock(Arc::new(MonotonicClock::starting_at(t0())));
    (spawn_tracker(options), store)
}

fn profile(id: &str, dob: Option<(i32, u32, u32)>) -> UserProfile {
    let profile = UserProfile::new(id);
    match dob {
        Some((y, m, d)) => profile.with_date_of_birth(NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        None => profile,
    }
}

/// Waits for the first event matching `pred`, skipping others.
async fn wait_for(
    events: &mut broadcast::Receiver<TrackerEvent>,
    pred: impl Fn(&TrackerEvent) -> bool,
) -> TrackerEvent {
    loop {
        match events.recv().await {
            Ok(event) if pred(&event) => return event,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
        }
    }
}

/// Timers resolve to the millisecond; allow them to land within a second.
fn assert_elapsed_near(actual_ms: u64, expected_ms: u64) {
    assert!(
        (expected_ms..expected_ms + 1_000).contains(&actual_ms),
        "elapsed {actual_ms} ms, expected about {expected_ms} ms"
    );
}

fn is_reminder_shown(event: &TrackerEvent) -> bool {
    matches!(event, TrackerEvent::ReminderShown { .. })
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_adult_reminder_then_break() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();

    assert!(handle.login(profile("pat", Some((1980, 6, 15)))).await.unwrap());

    let shown = timeout(Duration::from_secs(400), wait_for(&mut events, is_reminder_shown))
        .await
        .expect("reminder should appear at the adult threshold");
    let view = shown.view().unwrap();
    assert_eq!(view.bracket, AgeBracket::Adult);
    assert!(view.reminder_visible);
    assert_elapsed_near(view.elapsed_ms, 360_000);
    assert_eq!(view.message, test_policy().reminder_message(AgeBracket::Adult));

    sleep(Duration::from_secs(5)).await;
    assert!(handle.acknowledge_break().await.unwrap());

    let view = handle.view().await.unwrap();
    assert!(!view.reminder_visible);
    assert_eq!(view.elapsed_ms, 0);
    assert!(view.last_break_at.is_some());
    assert_eq!(view.last_break_at, view.started_at);
    assert!(view.last_break_at.unwrap() >= t0() + chrono::Duration::seconds(365));
    assert!(view.active);
}

#[tokio::test(start_paused = true)]
async fn test_child_defer_keeps_counting_without_reprompt() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();

    handle.login(profile("kid", Some((2016, 2, 1)))).await.unwrap();
    timeout(Duration::from_secs(90), wait_for(&mut events, is_reminder_shown))
        .await
        .expect("reminder should appear at the children threshold");

    assert!(handle.defer_reminder().await.unwrap());
    assert!(!handle.view().await.unwrap().reminder_visible);

    let reprompt = timeout(
        Duration::from_secs(600),
        wait_for(&mut events, is_reminder_shown),
    )
    .await;
    assert!(reprompt.is_err(), "deferred reminder must not reappear");

    let view = handle.view().await.unwrap();
    assert!(view.elapsed_ms >= 660_000);
    assert!(!view.reminder_visible);
    assert!(view.active);
}

#[tokio::test(start_paused = true)]
async fn test_missing_dob_uses_adult_bracket() {
    let (handle, _store) = spawn_test_tracker();
    handle.login(profile("nobody", None)).await.unwrap();

    let view = handle.view().await.unwrap();
    assert_eq!(view.bracket, AgeBracket::Adult);
    assert_eq!(view.threshold_ms, 360_000);
    assert_eq!(view.message, test_policy().reminder_message(AgeBracket::Adult));
}

#[tokio::test(start_paused = true)]
async fn test_teenager_threshold() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();

    handle.login(profile("teen", Some((2009, 1, 1)))).await.unwrap();
    let shown = timeout(Duration::from_secs(200), wait_for(&mut events, is_reminder_shown))
        .await
        .unwrap();
    let view = shown.view().unwrap();
    assert_eq!(view.bracket, AgeBracket::Teenage);
    assert_elapsed_near(view.elapsed_ms, 180_000);
}

#[tokio::test(start_paused = true)]
async fn test_logout_before_threshold_cancels_reminder() {
    let (handle, store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();

    handle.login(profile("kid", Some((2016, 2, 1)))).await.unwrap();
    sleep(Duration::from_secs(30)).await;
    assert!(handle.logout().await.unwrap());

    let late = timeout(Duration::from_secs(300), wait_for(&mut events, is_reminder_shown)).await;
    assert!(late.is_err(), "no reminder after logout");

    let view = handle.view().await.unwrap();
    assert!(!view.active);
    assert_eq!(view.elapsed_ms, 0);
    assert!(!view.reminder_visible);
    assert!(store.load(&SessionKey::for_user("kid")).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_logout_is_idempotent() {
    let (handle, _store) = spawn_test_tracker();
    assert!(!handle.logout().await.unwrap());

    handle.login(profile("pat", None)).await.unwrap();
    assert!(handle.logout().await.unwrap());
    assert!(!handle.logout().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_login_twice_keeps_original_start() {
    let (handle, _store) = spawn_test_tracker();

    assert!(handle.login(profile("pat", None)).await.unwrap());
    sleep(Duration::from_secs(20)).await;
    assert!(!handle.login(profile("pat", None)).await.unwrap());

    let view = handle.view().await.unwrap();
    assert_eq!(view.started_at, Some(t0()));
    assert_elapsed_near(view.elapsed_ms, 20_000);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_refresh_counter() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();
    handle.login(profile("pat", None)).await.unwrap();

    let ticked = timeout(
        Duration::from_secs(5),
        wait_for(&mut events, |e| {
            matches!(e, TrackerEvent::Ticked { view } if view.elapsed_ms >= 3_000)
        }),
    )
    .await
    .unwrap();
    assert!(ticked.view().unwrap().elapsed_display.starts_with("00:00:0"));
}

#[tokio::test(start_paused = true)]
async fn test_reminder_fires_once_per_period() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();
    handle.login(profile("kid", Some((2016, 2, 1)))).await.unwrap();

    timeout(Duration::from_secs(90), wait_for(&mut events, is_reminder_shown))
        .await
        .unwrap();

    // Left visible: no second ReminderShown while the dialog is up
    let again = timeout(Duration::from_secs(300), wait_for(&mut events, is_reminder_shown)).await;
    assert!(again.is_err());
    assert!(handle.view().await.unwrap().reminder_visible);

    // A break starts a new period that fires again
    handle.acknowledge_break().await.unwrap();
    timeout(Duration::from_secs(90), wait_for(&mut events, is_reminder_shown))
        .await
        .expect("new period should remind again");
}

#[tokio::test(start_paused = true)]
async fn test_manual_break_restarts_period() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();
    handle.login(profile("kid", Some((2016, 2, 1)))).await.unwrap();

    sleep(Duration::from_secs(45)).await;
    assert!(handle.acknowledge_break().await.unwrap());

    // Original deadline (60 s) passes without a reminder
    let early = timeout(Duration::from_secs(30), wait_for(&mut events, is_reminder_shown)).await;
    assert!(early.is_err());

    let shown = timeout(Duration::from_secs(60), wait_for(&mut events, is_reminder_shown))
        .await
        .unwrap();
    assert_elapsed_near(shown.view().unwrap().elapsed_ms, 60_000);
}

#[tokio::test(start_paused = true)]
async fn test_user_switch() {
    let (handle, store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();

    handle.login(profile("alice", None)).await.unwrap();
    sleep(Duration::from_secs(10)).await;
    assert!(handle.login(profile("bob", Some((2016, 2, 1)))).await.unwrap());

    let ended = wait_for(&mut events, |e| matches!(e, TrackerEvent::Ended { .. })).await;
    match ended {
        TrackerEvent::Ended { key } => assert_eq!(key, SessionKey::for_user("alice")),
        other => panic!("unexpected event {other:?}"),
    }

    let view = handle.view().await.unwrap();
    assert_eq!(view.bracket, AgeBracket::Children);
    assert_eq!(view.elapsed_ms, 0);
    assert!(store.load(&SessionKey::for_user("alice")).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_disconnects_handle() {
    let (handle, _store) = spawn_test_tracker();
    handle.login(profile("pat", None)).await.unwrap();

    handle.shutdown().await.unwrap();
    sleep(Duration::from_millis(10)).await;

    assert!(!handle.is_connected());
    assert!(handle.view().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_close_after_shutdown() {
    let (handle, _store) = spawn_test_tracker();
    let mut events = handle.subscribe().await.unwrap();
    handle.login(profile("pat", None)).await.unwrap();

    handle.shutdown().await.unwrap();

    // The handle is still alive, yet the event stream ends with the actor
    let closed = timeout(Duration::from_secs(1), async {
        loop {
            match events.recv().await {
                Err(broadcast::error::RecvError::Closed) => return,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "subscriber never saw the tracker close");
    assert!(handle.subscribe().await.is_err());
}
