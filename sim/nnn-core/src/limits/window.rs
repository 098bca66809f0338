use super::{Limits, SlotCallback};
use crate::{config::LimitsConfig, face::FaceId, logging::limit_event};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

/// A ceiling on the number of requests outstanding at once.
///
/// The ceiling starts at `max_rate * max_delay` and can be lowered with
/// [`update_current_limit`](Limits::update_current_limit). Every returned slot
/// fires the callback.
pub struct WindowLimits {
    face: FaceId,
    state: Mutex<WindowState>,
}

struct WindowState {
    config: LimitsConfig,
    outstanding: u64,
    current_window: f64,
    callback: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl WindowState {
    /// Whether a whole slot is left. A window of 2.5 holds two requests.
    fn has_room(&self) -> bool {
        self.current_window - self.outstanding as f64 >= 1.0
    }
}

impl WindowLimits {
    pub fn new(face: FaceId, config: LimitsConfig) -> Self {
        Self {
            face,
            state: Mutex::new(WindowState {
                config,
                outstanding: 0,
                current_window: config.max_limit(),
                callback: None,
            }),
        }
    }

    pub fn face(&self) -> FaceId {
        self.face
    }

    /// The number of slots borrowed and not yet returned.
    pub fn outstanding(&self) -> u64 {
        self.state.lock().unwrap().outstanding
    }
}

impl Limits for WindowLimits {
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
            "Borrowed from the full window of {}",
            self.face
        );
        state.outstanding += 1;
        if !state.has_room() {
            limit_event(
                self.face,
                "exhausted",
                state.outstanding as f64,
                state.current_window,
            );
        }
    }

    fn return_limit(&self) {
        let callback = {
            let mut state = self.state.lock().unwrap();
            if !state.config.is_enabled() {
                return;
            }
            assert!(
                state.outstanding > 0,
                "Returned more slots than were borrowed on {}",
                self.face
            );
            state.outstanding -= 1;
            limit_event(
                self.face,
                "returned",
                state.outstanding as f64,
                state.current_window,
            );
            state.callback.clone()
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    fn update_current_limit(&self, limit: f64) {
        let mut state = self.state.lock().unwrap();
        state.current_window = limit.clamp(0.0, state.config.max_limit().max(0.0));
    }

    fn current_limit(&self) -> f64 {
        self.state.lock().unwrap().current_window
    }

    fn max_limit(&self) -> f64 {
        self.state.lock().unwrap().config.max_limit()
    }

    fn set_limits(&self, max_rate: f64, max_delay: Duration) {
        let mut state = self.state.lock().unwrap();
        state.config = state
            .config
            .with_max_rate(max_rate)
            .with_max_delay(max_delay);
        state.current_window = state.config.max_limit();
    }

    fn register_available_slot_callback(&self, callback: SlotCallback) {
        self.state.lock().unwrap().callback = Some(Arc::from(callback));
    }
}

impl std::fmt::Debug for WindowLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("WindowLimits")
            .field("face", &self.face)
            .field("outstanding", &state.outstanding)
            .field("current_window", &state.current_window)
            .finish()
    }
}
