//! Integration tests for the tokio interval scheduler driving a timer.
//!
//! Time is paused, so every second is virtual and the tests run instantly.

use std::time::Duration;

use focuscycle_core::{
    Event, FocusCycleTimer, IntervalScheduler, MemoryLedger, Tick, TickScheduler,
    TimerConfiguration, TimerMode,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;

fn one_minute_focus() -> TimerConfiguration {
    TimerConfiguration {
        focus_minutes: 1,
        ..Default::default()
    }
}

async fn feed(
    timer: &mut FocusCycleTimer<IntervalScheduler>,
    ticks: &mut UnboundedReceiver<Tick>,
    n: usize,
) -> Option<Event> {
    for _ in 0..n {
        let tick = ticks.recv().await.expect("tick channel closed");
        if let Some(event) = timer.on_tick(tick) {
            return Some(event);
        }
    }
    None
}

#[tokio::test(start_paused = true)]
async fn focus_phase_completes_after_its_duration() {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let ledger = MemoryLedger::new();
    let mut timer =
        FocusCycleTimer::new(one_minute_focus(), scheduler, Box::new(ledger.clone())).unwrap();

    let started = Instant::now();
    timer.start();
    let event = feed(&mut timer, &mut ticks, 60).await;

    assert!(matches!(
        event,
        Some(Event::PhaseCompleted {
            completed: TimerMode::Focus,
            next: TimerMode::ShortBreak,
            ..
        })
    ));
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert!(!timer.scheduler().is_armed());
    assert_eq!(timer.remaining_seconds(), 300);
    assert_eq!(ledger.entries(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn paused_timer_loses_no_time() {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut timer =
        FocusCycleTimer::new(one_minute_focus(), scheduler, Box::new(MemoryLedger::new())).unwrap();

    timer.start();
    feed(&mut timer, &mut ticks, 10).await;
    timer.pause();
    assert_eq!(timer.remaining_seconds(), 50);

    tokio::time::sleep(Duration::from_secs(30)).await;
    while let Ok(tick) = ticks.try_recv() {
        assert!(timer.on_tick(tick).is_none());
    }
    assert_eq!(timer.remaining_seconds(), 50);

    timer.resume();
    feed(&mut timer, &mut ticks, 5).await;
    assert_eq!(timer.remaining_seconds(), 45);
}

#[tokio::test(start_paused = true)]
async fn double_start_does_not_double_decrement() {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut timer =
        FocusCycleTimer::new(one_minute_focus(), scheduler, Box::new(MemoryLedger::new())).unwrap();

    timer.start();
    timer.start();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    while let Ok(tick) = ticks.try_recv() {
        timer.on_tick(tick);
    }
    assert_eq!(timer.remaining_seconds(), 50);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_ticks() {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut timer =
        FocusCycleTimer::new(one_minute_focus(), scheduler, Box::new(MemoryLedger::new())).unwrap();

    timer.start();
    feed(&mut timer, &mut ticks, 3).await;
    timer.reset();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(ticks.try_recv().is_err());
    assert_eq!(timer.remaining_seconds(), 60);
}

#[tokio::test(start_paused = true)]
async fn dropping_timer_stops_its_task() {
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let mut timer =
        FocusCycleTimer::new(one_minute_focus(), scheduler, Box::new(MemoryLedger::new())).unwrap();
    timer.start();
    feed(&mut timer, &mut ticks, 1).await;
    drop(timer);

    let drained = tokio::time::timeout(Duration::from_secs(10), async {
        while ticks.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "tick task outlived the timer");
}
