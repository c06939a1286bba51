//! Heartbeat Monitor
//!
//! Per-connection liveness enforcement. A monitor owns two timers:
//!
//! - a recurring **ping** timer firing every TTL,
//! - a one-shot **timeout** timer firing TTL + margin after arming or after
//!   the last liveness signal.
//!
//! ```text
//!            on_liveness_signal (timeout re-armed)
//!              +-----+
//!              |     v
//!   arm() --> Armed --------- disarm() ---------> Disarmed
//!              |
//!              +-- timeout fires --> Terminated --(disarm releases timers)
//! ```
//!
//! The monitor never touches the socket itself. The connection task polls
//! [`HeartbeatMonitor::next_event`] alongside its socket and acts on the
//! returned [`HeartbeatEvent`].

use std::future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior, Sleep};

use crate::config::HeartbeatSettings;

/// Timing parameters for a heartbeat monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatPolicy {
    /// Ping period.
    pub ttl: Duration,
    /// Latency allowance added to the TTL before a connection is declared dead.
    pub margin: Duration,
}

impl HeartbeatPolicy {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10);
    pub const DEFAULT_MARGIN: Duration = Duration::from_secs(1);

    pub fn new(ttl: Duration, margin: Duration) -> Self {
        Self { ttl, margin }
    }

    /// Build from application settings.
    pub fn from_settings(settings: &HeartbeatSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.ttl_ms),
            Duration::from_millis(settings.margin_ms),
        )
    }

    /// Delay of every timeout action.
    pub fn timeout(&self) -> Duration {
        self.ttl + self.margin
    }
}

impl Default for HeartbeatPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TTL, Self::DEFAULT_MARGIN)
    }
}

/// Lifecycle state of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatState {
    /// Timers running.
    Armed,
    /// Stopped because the connection closed. Terminal.
    Disarmed,
    /// The timeout fired without a liveness signal. Terminal.
    Terminated,
}

/// What the connection task must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatEvent {
    /// Send a ping if the transport is still writable.
    Ping,
    /// No liveness signal within the timeout: terminate the connection.
    Expired,
}

/// The owned timer pair. Dropping it cancels both timers.
struct TimerPair {
    ping: Interval,
    timeout: Pin<Box<Sleep>>,
}

/// Liveness monitor for exactly one connection.
pub struct HeartbeatMonitor {
    policy: HeartbeatPolicy,
    state: HeartbeatState,
    timers: Option<TimerPair>,
}

impl HeartbeatMonitor {
    /// Start the ping timer (first ping one TTL from now) and the first
    /// timeout (TTL + margin from now).
    pub fn arm(policy: HeartbeatPolicy) -> Self {
        let now = Instant::now();

        let mut ping = interval_at(now + policy.ttl, policy.ttl);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            policy,
            state: HeartbeatState::Armed,
            timers: Some(TimerPair {
                ping,
                timeout: Box::pin(sleep(policy.timeout())),
            }),
        }
    }

    pub fn policy(&self) -> HeartbeatPolicy {
        self.policy
    }

    pub fn state(&self) -> HeartbeatState {
        self.state
    }

    /// Whether the timers are still held.
    pub fn is_armed(&self) -> bool {
        self.state == HeartbeatState::Armed
    }

    /// Instant at which the pending timeout fires, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match (self.state, &self.timers) {
            (HeartbeatState::Armed, Some(timers)) => Some(timers.timeout.deadline()),
            _ => None,
        }
    }

    /// Replace the pending timeout with a fresh one of the same delay.
    ///
    /// Returns `false` (and does nothing) once the monitor has left `Armed`.
    pub fn on_liveness_signal(&mut self) -> bool {
        if self.state != HeartbeatState::Armed {
            return false;
        }

        match self.timers.as_mut() {
            Some(timers) => {
                // Resetting reuses the single timeout slot, so there is never
                // more than one pending timeout.
                let deadline = Instant::now() + self.policy.timeout();
                timers.timeout.as_mut().reset(deadline);
                true
            }
            None => false,
        }
    }

    /// Wait for the next timer action.
    ///
    /// Cancel safe. Pends forever once the monitor is no longer armed, so it
    /// can sit in a `select!` after teardown started.
    pub async fn next_event(&mut self) -> HeartbeatEvent {
        let timers = match (self.state, self.timers.as_mut()) {
            (HeartbeatState::Armed, Some(timers)) => timers,
            _ => return future::pending().await,
        };

        let event = tokio::select! {
            biased;
            _ = timers.timeout.as_mut() => HeartbeatEvent::Expired,
            _ = timers.ping.tick() => HeartbeatEvent::Ping,
        };

        if event == HeartbeatEvent::Expired {
            self.state = HeartbeatState::Terminated;
        }

        event
    }

    /// Cancel both timers.
    ///
    /// Idempotent: returns `true` only for the call that actually released
    /// the timers, so callers can log and count teardown exactly once.
    pub fn disarm(&mut self) -> bool {
        if self.timers.take().is_none() {
            return false;
        }

        if self.state == HeartbeatState::Armed {
            self.state = HeartbeatState::Disarmed;
        }

        true
    }
}

impl std::fmt::Debug for HeartbeatMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartbeatMonitor")
            .field("policy", &self.policy)
            .field("state", &self.state)
            .field("deadline", &self.deadline())
            .finish()
    }
}
