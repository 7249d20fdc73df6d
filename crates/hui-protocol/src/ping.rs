//! Link liveness, layered above decoder output.
//!
//! The monitor owns no clock and no thread: a scheduler collaborator calls
//! [`PingMonitor::tick`] periodically and forwards decoded events through
//! [`PingMonitor::observe`]. Liveness failure is a state transition, never
//! an error; the owner decides whether to reset the connection.

use std::time::{Duration, Instant};

use crate::address::Role;
use crate::encode::Encoder;
use crate::event::ProtocolEvent;
use crate::message::HuiMessage;

/// Issues pings on an interval and derives link liveness from the time of
/// the last ping received from the peer.
#[derive(Debug, Clone)]
pub struct PingMonitor {
    role: Role,
    interval: Duration,
    timeout: Duration,
    /// Grace anchor before the first pong arrives.
    started: Instant,
    last_sent: Option<Instant>,
    last_received: Option<Instant>,
}

impl PingMonitor {
    pub fn new(role: Role, interval: Duration, timeout: Duration) -> Self {
        Self {
            role,
            interval,
            timeout,
            started: Instant::now(),
            last_sent: None,
            last_received: None,
        }
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Scheduling tick. Returns the ping message to send when the interval
    /// has elapsed since the last send (immediately on the first tick).
    pub fn tick(&mut self, now: Instant) -> Option<HuiMessage> {
        let due = match self.last_sent {
            None => true,
            Some(sent) => now.duration_since(sent) >= self.interval,
        };
        if due {
            self.last_sent = Some(now);
            Some(Encoder::new(self.role).ping())
        } else {
            None
        }
    }

    /// Record a ping received from the peer.
    pub fn record_pong(&mut self, now: Instant) {
        self.last_received = Some(now);
    }

    /// Forward a decoded event; ping events feed the liveness clock.
    pub fn observe(&mut self, event: &ProtocolEvent, now: Instant) {
        if let ProtocolEvent::Ping { .. } = event {
            self.record_pong(now);
        }
    }

    /// Whether the peer has been heard from within the timeout window.
    pub fn is_alive(&self, now: Instant) -> bool {
        let anchor = self.last_received.unwrap_or(self.started);
        now.duration_since(anchor) < self.timeout
    }

    /// Restart the monitor, e.g. after the owning connection is reset.
    pub fn reset(&mut self, now: Instant) {
        self.started = now;
        self.last_sent = None;
        self.last_received = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> PingMonitor {
        PingMonitor::new(
            Role::Surface,
            Duration::from_millis(100),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn test_first_tick_sends_immediately() {
        let mut monitor = monitor();
        let now = Instant::now();
        let ping = monitor.tick(now);
        assert_eq!(ping, Some(Encoder::new(Role::Surface).ping()));
        assert_eq!(monitor.tick(now), None);
    }

    #[test]
    fn test_ping_reissued_after_interval() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.tick(now);
        assert_eq!(monitor.tick(now + Duration::from_millis(50)), None);
        assert!(monitor.tick(now + Duration::from_millis(100)).is_some());
    }

    #[test]
    fn test_alive_until_timeout_then_stale() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.record_pong(now);
        assert!(monitor.is_alive(now + Duration::from_millis(499)));
        // The transition lands exactly at last_received + timeout.
        assert!(!monitor.is_alive(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_pong_restores_liveness() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.record_pong(now);
        let late = now + Duration::from_secs(2);
        assert!(!monitor.is_alive(late));
        monitor.record_pong(late);
        assert!(monitor.is_alive(late));
    }

    #[test]
    fn test_startup_grace_period() {
        let monitor = monitor();
        let soon = Instant::now() + Duration::from_millis(100);
        assert!(monitor.is_alive(soon));
        assert!(!monitor.is_alive(soon + Duration::from_secs(10)));
    }

    #[test]
    fn test_observe_only_counts_ping_events() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.observe(
            &ProtocolEvent::FaderLevel {
                channel: 0,
                level: 0,
            },
            now,
        );
        assert!(!monitor.is_alive(now + Duration::from_secs(10)));

        monitor.observe(&ProtocolEvent::Ping { from: Role::Host }, now + Duration::from_secs(10));
        assert!(monitor.is_alive(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_reset_restarts_grace() {
        let mut monitor = monitor();
        let now = Instant::now();
        monitor.record_pong(now);
        let later = now + Duration::from_secs(60);
        monitor.reset(later);
        assert!(monitor.is_alive(later + Duration::from_millis(100)));
        assert!(monitor.tick(later).is_some());
    }
}
