use super::{Limits, SlotCallback};
use crate::{config::LimitsConfig, face::FaceId, logging::limit_event, scheduler::Scheduler};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

/// The longest a bucket goes between leaks.
const MAX_LEAK_INTERVAL: Duration = Duration::from_secs(1);

/// A leaky token bucket.
///
/// Each borrow adds a token. Tokens leak out at the current rate, checked by
/// a timer that reschedules itself through the [`Scheduler`] for as long as
/// the gate exists. A slot is free while the bucket has room for one more
/// whole token. Returning a slot does nothing, since only leaking empties the
/// bucket.
pub struct RateLimits {
    face: FaceId,
    scheduler: Arc<dyn Scheduler>,
    state: Arc<Mutex<RateState>>,
}

struct RateState {
    config: LimitsConfig,
    /// Tokens currently in the bucket
    bucket: f64,
    /// The bucket's capacity
    bucket_max: f64,
    /// Tokens leaked per second
    current_rate: f64,
    last_leak: Duration,
    leak_scheduled: bool,
    callback: Option<Arc<dyn Fn() + Send + Sync>>,
    rng: SmallRng,
}

impl RateState {
    fn has_room(&self) -> bool {
        self.bucket_max - self.bucket >= 1.0
    }

    fn leak_interval(&mut self) -> Duration {
        let interval = if self.current_rate > 0.0 {
            Duration::try_from_secs_f64(1.0 / self.current_rate)
                .map_or(MAX_LEAK_INTERVAL, |interval| interval.min(MAX_LEAK_INTERVAL))
        } else {
            MAX_LEAK_INTERVAL
        };
        let jitter = self.config.leak_jitter;
        if jitter.is_zero() {
            interval
        } else {
            interval + self.rng.gen_range(Duration::ZERO..=jitter)
        }
    }
}

impl RateLimits {
    /// Creates the gate for `face`. An enabled gate starts leaking right away.
    pub fn new(face: FaceId, config: LimitsConfig, scheduler: Arc<dyn Scheduler>) -> Self {
        let state = RateState {
            config,
            bucket: 0.0,
            bucket_max: config.max_limit(),
            current_rate: config.max_rate.max(0.0),
            last_leak: scheduler.now(),
            leak_scheduled: false,
            callback: None,
            rng: SmallRng::seed_from_u64(face.0.into()),
        };
        let limits = Self {
            face,
            scheduler,
            state: Arc::new(Mutex::new(state)),
        };
        limits.start_leaking();
        limits
    }

    pub fn face(&self) -> FaceId {
        self.face
    }

    /// The tokens currently in the bucket.
    pub fn bucket(&self) -> f64 {
        self.state.lock().unwrap().bucket
    }

    fn start_leaking(&self) {
        let delay = {
            let mut state = self.state.lock().unwrap();
            if !state.config.is_enabled() || state.leak_scheduled {
                return;
            }
            state.leak_scheduled = true;
            state.last_leak = self.scheduler.now();
            state.leak_interval()
        };
        schedule_leak(
            Arc::downgrade(&self.state),
            self.scheduler.clone(),
            self.face,
            delay,
        );
    }
}

fn schedule_leak(
    state: Weak<Mutex<RateState>>,
    scheduler: Arc<dyn Scheduler>,
    face: FaceId,
    delay: Duration,
) {
    let next = scheduler.clone();
    scheduler.schedule_after(
        delay,
        Box::new(move || {
            // The gate is gone, so the chain ends here
            let Some(state) = state.upgrade() else {
                return;
            };
            let (callback, delay) = {
                let mut state = state.lock().unwrap();
                let now = next.now();
                let elapsed = now.saturating_sub(state.last_leak);
                state.last_leak = now;

                let was_exhausted = !state.has_room();
                state.bucket = (state.bucket - state.current_rate * elapsed.as_secs_f64()).max(0.0);
                let opened = was_exhausted && state.has_room();
                if opened {
                    limit_event(face, "available", state.bucket, state.bucket_max);
                }

                if state.config.is_enabled() {
                    (opened.then(|| state.callback.clone()).flatten(), Some(state.leak_interval()))
                } else {
                    state.leak_scheduled = false;
                    (opened.then(|| state.callback.clone()).flatten(), None)
                }
            };
            if let Some(delay) = delay {
                schedule_leak(Arc::downgrade(&state), next, face, delay);
            }
            if let Some(callback) = callback {
                callback();
            }
        }),
    );
}

impl Limits for RateLimits {
    fn is_enabled(&self) -> bool {
        self.state.lock().unwrap().config.is_enabled()
    }

    fn is_below_limit(&self) -> bool {
        let state = self.state.lock().unwrap();
        !state.config.is_enabled() || state.has_room()
    }

    fn borrow_limit(&self) {
        let mut state = self.state.lock().unwrap();
        if !state.config.is_enabled() {
            return;
        }
        assert!(
            state.has_room(),
            "Borrowed from the exhausted rate limit of {}",
            self.face
        );
        state.bucket += 1.0;
        if !state.has_room() {
            limit_event(self.face, "exhausted", state.bucket, state.bucket_max);
        }
    }

    fn return_limit(&self) {}

    fn update_current_limit(&self, limit: f64) {
        let mut state = self.state.lock().unwrap();
        state.current_rate = limit.clamp(0.0, state.config.max_rate.max(0.0));
    }

    fn current_limit(&self) -> f64 {
        self.state.lock().unwrap().current_rate
    }

    fn max_limit(&self) -> f64 {
        self.state.lock().unwrap().config.max_rate
    }

    fn set_limits(&self, max_rate: f64, max_delay: Duration) {
        {
            let mut state = self.state.lock().unwrap();
            state.config = state
                .config
                .with_max_rate(max_rate)
                .with_max_delay(max_delay);
            state.bucket_max = state.config.max_limit();
            state.current_rate = max_rate.max(0.0);
        }
        self.start_leaking();
    }

    fn register_available_slot_callback(&self, callback: SlotCallback) {
        self.state.lock().unwrap().callback = Some(Arc::from(callback));
    }
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("RateLimits")
            .field("face", &self.face)
            .field("bucket", &state.bucket)
            .field("bucket_max", &state.bucket_max)
            .field("current_rate", &state.current_rate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::EventQueue;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gate(rate: f64, queue: &Arc<EventQueue>) -> RateLimits {
        let config = LimitsConfig::default()
            .with_max_rate(rate)
            .with_max_delay(Duration::from_secs(1));
        RateLimits::new(FaceId(1), config, queue.clone())
    }

    #[test]
    fn disabled_gate_lets_everything_through() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(0.0, &queue);
        assert!(!limits.is_enabled());
        for _ in 0..100 {
            assert!(limits.is_below_limit());
            limits.borrow_limit();
        }
        assert_eq!(limits.bucket(), 0.0);
        assert!(queue.is_empty());
    }

    #[test]
    #[should_panic]
    fn borrowing_past_the_limit_panics() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(2.0, &queue);
        limits.borrow_limit();
        limits.borrow_limit();
        limits.borrow_limit();
    }

    #[test]
    fn current_limit_is_clamped() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(10.0, &queue);
        limits.update_current_limit(50.0);
        assert_eq!(limits.current_limit(), 10.0);
        limits.update_current_limit(-1.0);
        assert_eq!(limits.current_limit(), 0.0);
        limits.update_current_limit(4.0);
        assert_eq!(limits.current_limit(), 4.0);
        assert_eq!(limits.max_limit(), 10.0);
    }

    #[test]
    fn leak_interval_is_capped() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(0.5, &queue);
        queue.step();
        assert_eq!(queue.now(), Duration::from_secs(1));
        limits.update_current_limit(0.0);
        queue.step();
        assert_eq!(queue.now(), Duration::from_secs(2));
    }

    #[test]
    fn tiny_rates_leak_once_a_second() {
        let queue = Arc::new(EventQueue::new());
        let tiny = gate(1e-20, &queue);
        queue.step();
        assert_eq!(queue.now(), Duration::from_secs(1));
        drop(tiny);

        // Lowered after the leak chain started
        let slowed = gate(10.0, &queue);
        slowed.update_current_limit(1e-20);
        queue.run_until(Duration::from_secs(3));
        assert_eq!(slowed.current_limit(), 1e-20);
    }

    #[test]
    fn dropping_the_gate_ends_the_leak_chain() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(10.0, &queue);
        queue.run_until(Duration::from_millis(350));
        drop(limits);
        queue.run();
        assert!(queue.is_empty());
    }

    #[test]
    fn jitter_delays_leaks() {
        let queue = Arc::new(EventQueue::new());
        let config = LimitsConfig::default()
            .with_max_rate(10.0)
            .with_max_delay(Duration::from_secs(1))
            .with_leak_jitter(Duration::from_millis(50));
        let _limits = RateLimits::new(FaceId(7), config, queue.clone());
        queue.step();
        let first = queue.now();
        assert!(first >= Duration::from_millis(100));
        assert!(first <= Duration::from_millis(150));
    }

    #[test]
    fn set_limits_restarts_a_disabled_gate() {
        let queue = Arc::new(EventQueue::new());
        let limits = gate(0.0, &queue);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        limits.register_available_slot_callback(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        limits.set_limits(1.0, Duration::from_secs(1));
        assert!(limits.is_enabled());
        limits.borrow_limit();
        assert!(!limits.is_below_limit());
        queue.run_until(Duration::from_secs(1));
        assert!(limits.is_below_limit());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
