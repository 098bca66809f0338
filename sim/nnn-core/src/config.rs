//! Tunables for PDUs, forwarding tables and admission control.
//!
//! Every config has sensible defaults and builder-style setters, so a
//! simulation only spells out what it changes:
//!
//! ```
//! # use nnn_core::LimitsConfig;
//! # use std::time::Duration;
//! let config = LimitsConfig::default()
//!     .with_max_rate(10.0)
//!     .with_max_delay(Duration::from_secs(1));
//! assert_eq!(config.max_limit(), 10.0);
//! ```

use std::time::Duration;

/// Values newly created PDUs start out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduDefaults {
    /// The lifetime carried in the header TTL field.
    pub lifetime: Duration,
    /// The protocol version carried in the header.
    pub version: u16,
}

impl PduDefaults {
    /// The protocol version this crate speaks.
    pub const VERSION: u16 = 1;

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }
}

impl Default for PduDefaults {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(2),
            version: Self::VERSION,
        }
    }
}

/// Configuration for a face's admission gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitsConfig {
    /// The highest sustained request rate, in requests per second. A rate of
    /// zero or less disables the gate.
    pub max_rate: f64,
    /// How long a request may wait in the gate. Together with `max_rate` this
    /// sets the gate's capacity.
    pub max_delay: Duration,
    /// Adds up to this much random delay to each leak of a rate gate so that
    /// many gates started together do not leak in lockstep.
    pub leak_jitter: Duration,
}

impl LimitsConfig {
    pub fn with_max_rate(mut self, max_rate: f64) -> Self {
        self.max_rate = max_rate;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_leak_jitter(mut self, leak_jitter: Duration) -> Self {
        self.leak_jitter = leak_jitter;
        self
    }

    /// Whether the gate limits anything at all.
    pub fn is_enabled(&self) -> bool {
        self.max_rate > 0.0
    }

    /// The gate's capacity: `max_rate * max_delay`.
    pub fn max_limit(&self) -> f64 {
        self.max_rate * self.max_delay.as_secs_f64()
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_rate: 0.0,
            max_delay: Duration::ZERO,
            leak_jitter: Duration::ZERO,
        }
    }
}

/// How a forwarding table bounds the number of entries it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Only count entries.
    #[default]
    Unbounded,
    /// Evict the oldest entry when an insertion would exceed `max_entries`.
    Fifo { max_entries: usize },
}

/// Configuration for an [`Nnst`](crate::Nnst).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NnstConfig {
    pub policy: Policy,
}

impl NnstConfig {
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }
}
