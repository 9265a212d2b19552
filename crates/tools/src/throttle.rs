//! Outbound notification throttle.
//!
//! A sliding-window limiter with an injected [`Clock`], constructed once
//! per process and shared by reference with every component that emits
//! notifications. Critical notifications always go through.

use async_trait::async_trait;
use concierge_config::NotificationConfig;
use concierge_core::{Notification, NotificationChannel, NotificationReceipt, NotificationUrgency};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;

/// Channel name reported when a notification was held back.
pub const THROTTLE_CHANNEL: &str = "throttle";

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// At most `max_per_window` sends in any `window`.
pub struct NotificationThrottle {
    clock: Arc<dyn Clock>,
    window: Duration,
    max_per_window: usize,
    // Held briefly, never across an await
    sent: Mutex<VecDeque<Instant>>,
}

impl NotificationThrottle {
    pub fn new(clock: Arc<dyn Clock>, window: Duration, max_per_window: usize) -> Self {
        Self {
            clock,
            window,
            max_per_window,
            sent: Mutex::new(VecDeque::new()),
        }
    }

    pub fn from_config(config: &NotificationConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Duration::from_secs(config.window_secs), config.max_per_window)
    }

    /// Take a slot if one is free. Returns `true` if the send may proceed.
    pub fn try_acquire(&self) -> bool {
        let now = self.clock.now();
        let mut sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        while sent
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            sent.pop_front();
        }
        if sent.len() >= self.max_per_window {
            return false;
        }
        sent.push_back(now);
        true
    }

    /// Sends counted in the current window.
    pub fn in_window(&self) -> usize {
        let now = self.clock.now();
        let sent = self.sent.lock().unwrap_or_else(|e| e.into_inner());
        sent.iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}

/// Wraps a channel so non-critical notifications respect the throttle.
pub struct ThrottledChannel<C> {
    inner: C,
    throttle: Arc<NotificationThrottle>,
}

impl<C: NotificationChannel> ThrottledChannel<C> {
    pub fn new(inner: C, throttle: Arc<NotificationThrottle>) -> Self {
        Self { inner, throttle }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: NotificationChannel> NotificationChannel for ThrottledChannel<C> {
    async fn notify(&self, notification: &Notification) -> NotificationReceipt {
        let critical = notification.urgency == NotificationUrgency::Critical;
        if !critical && !self.throttle.try_acquire() {
            warn!(
                member_id = %notification.member.member_id,
                category = %notification.category,
                "Notification throttled"
            );
            return NotificationReceipt {
                sent: false,
                channels_attempted: vec![THROTTLE_CHANNEL.into()],
            };
        }
        self.inner.notify(notification).await
    }
}
