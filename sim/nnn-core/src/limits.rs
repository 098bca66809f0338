//! Admission control for faces.
//!
//! Before sending a request on a face, a node borrows a slot from the face's
//! gate, and does not send if none is free. [`RateLimits`] caps the sustained
//! request rate with a leaky token bucket. [`WindowLimits`] caps the number of
//! requests outstanding at once. Either gate calls the registered callback
//! when a slot frees up, so queued requests can be retried.
//!
//! A gate whose maximum rate is zero or less is disabled. Everything passes
//! through a disabled gate and borrowing or returning does nothing.

use std::time::Duration;

mod rate;
pub use rate::RateLimits;

mod window;
pub use window::WindowLimits;

/// Called when a slot becomes available.
pub type SlotCallback = Box<dyn Fn() + Send + Sync>;

/// The admission gate of a face.
///
/// All methods take `&self`, since timers fire into the gate while the face
/// also uses it.
pub trait Limits: Send + Sync {
    /// Whether the gate limits anything.
    fn is_enabled(&self) -> bool;

    /// Whether a slot can be borrowed right now.
    fn is_below_limit(&self) -> bool;

    /// Takes a slot.
    ///
    /// # Panics
    ///
    /// Panics if the gate is enabled and no slot is free.
    fn borrow_limit(&self);

    /// Gives back a slot taken with [`borrow_limit`](Self::borrow_limit).
    fn return_limit(&self);

    /// Lowers or raises the current limit, within zero and the maximum.
    fn update_current_limit(&self, limit: f64);

    fn current_limit(&self) -> f64;

    fn max_limit(&self) -> f64;

    /// Reconfigures the gate from the rate a face sustains and how long a
    /// request may be held up.
    fn set_limits(&self, max_rate: f64, max_delay: Duration);

    /// Sets what to call when a slot becomes available. Replaces any earlier
    /// callback.
    fn register_available_slot_callback(&self, callback: SlotCallback);
}
