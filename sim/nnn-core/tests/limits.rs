use nnn_core::{
    limits::{RateLimits, WindowLimits},
    scheduler::{EventQueue, TokioScheduler},
    FaceId, Limits, LimitsConfig,
};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

fn config(rate: f64, delay: Duration) -> LimitsConfig {
    LimitsConfig::default()
        .with_max_rate(rate)
        .with_max_delay(delay)
}

/// Registers a callback that counts how often it was called.
fn count_slots(limits: &dyn Limits) -> Arc<AtomicUsize> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    limits.register_available_slot_callback(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    calls
}

#[test]
fn rate_gate_exhausts_and_recovers() {
    let queue = Arc::new(EventQueue::new());
    let limits = RateLimits::new(
        FaceId(1),
        config(10.0, Duration::from_secs(1)),
        queue.clone(),
    );
    let calls = count_slots(&limits);

    for _ in 0..9 {
        assert!(limits.is_below_limit());
        limits.borrow_limit();
    }
    assert!(limits.is_below_limit());
    limits.borrow_limit();
    assert!(!limits.is_below_limit());

    // Returning does not free anything, only leaking does
    limits.return_limit();
    assert!(!limits.is_below_limit());

    queue.run_until(Duration::from_millis(250));
    assert!(limits.is_below_limit());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(limits.bucket() < 9.0);
}

#[test]
fn rate_gate_drains_completely() {
    let queue = Arc::new(EventQueue::new());
    let limits = RateLimits::new(
        FaceId(3),
        config(4.0, Duration::from_secs(1)),
        queue.clone(),
    );
    for _ in 0..4 {
        limits.borrow_limit();
    }
    queue.run_until(Duration::from_secs(5));
    assert_eq!(limits.bucket(), 0.0);
    // The leak timer keeps going while the gate lives
    assert_eq!(queue.len(), 1);
}

#[test]
fn lowered_rate_leaks_slower() {
    let queue = Arc::new(EventQueue::new());
    let limits = RateLimits::new(
        FaceId(4),
        config(10.0, Duration::from_secs(1)),
        queue.clone(),
    );
    limits.update_current_limit(1.0);
    for _ in 0..10 {
        limits.borrow_limit();
    }
    // The timer armed at the old rate fires first, then the slower rate takes over
    queue.run_until(Duration::from_millis(100));
    let after_first = limits.bucket();
    assert!(after_first >= 9.8);
    queue.run_until(Duration::from_millis(1100));
    assert!(limits.bucket() <= after_first - 0.9);
}

#[test]
fn window_gate_reopens_on_return() {
    let limits = WindowLimits::new(FaceId(2), config(2.0, Duration::from_millis(1500)));
    let calls = count_slots(&limits);
    assert_eq!(limits.max_limit(), 3.0);

    for _ in 0..3 {
        limits.borrow_limit();
    }
    assert!(!limits.is_below_limit());
    limits.return_limit();
    assert!(limits.is_below_limit());
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    limits.set_limits(1.0, Duration::from_secs(1));
    assert_eq!(limits.current_limit(), 1.0);
    assert!(!limits.is_below_limit());
}

#[test]
fn gates_work_behind_the_trait() {
    let queue = Arc::new(EventQueue::new());
    let gates: Vec<Box<dyn Limits>> = vec![
        Box::new(RateLimits::new(
            FaceId(5),
            config(0.0, Duration::from_secs(1)),
            queue.clone(),
        )),
        Box::new(WindowLimits::new(FaceId(6), LimitsConfig::default())),
    ];
    for gate in &gates {
        assert!(!gate.is_enabled());
        for _ in 0..50 {
            assert!(gate.is_below_limit());
            gate.borrow_limit();
        }
    }
}

#[tokio::test(start_paused = true)]
#[ntest::timeout(1000)]
async fn rate_gate_on_tokio_time() {
    let scheduler = Arc::new(TokioScheduler::current());
    let limits = RateLimits::new(FaceId(8), config(2.0, Duration::from_secs(1)), scheduler);
    let calls = count_slots(&limits);

    limits.borrow_limit();
    limits.borrow_limit();
    assert!(!limits.is_below_limit());

    tokio::time::sleep(Duration::from_millis(750)).await;
    assert!(limits.is_below_limit());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
