// host.rs - Capabilities the reveal controller borrows from its host
//
// The controller never owns a clock or a timer. It asks the host for the
// next tick and for one-shot delays, and the host answers by calling
// `on_tick` / `on_timer` with the token it handed out.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickToken(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Signals emitted toward the presentation layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealEvent {
    /// Start the text fade-in, lasting `reveal_duration_ms`
    Started { reveal_duration_ms: f64 },
    /// All particles are gone; surfaces can be removed
    Finished,
}

impl fmt::Display for RevealEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealEvent::Started { .. } => f.write_str("revealing"),
            RevealEvent::Finished => f.write_str("revealed"),
        }
    }
}

pub trait Host {
    /// Ask for one display-synchronized tick
    fn request_tick(&mut self) -> TickToken;

    fn cancel_tick(&mut self, token: TickToken);

    /// One-shot deferred call after `delay_ms`
    fn after(&mut self, delay_ms: f64) -> TimerToken;

    fn reveal_started(&mut self, _reveal_duration_ms: f64) {}

    fn reveal_finished(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingTimer {
    pub token: TimerToken,
    pub delay_ms: f64,
}

/// Host that queues requests for a polling driver
#[derive(Debug, Default)]
pub struct QueuedHost {
    next_id: u64,
    tick: Option<TickToken>,
    timers: Vec<PendingTimer>,
    events: Vec<RevealEvent>,
    cancelled: u64,
}

impl QueuedHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outstanding tick request, if any
    pub fn pending_tick(&self) -> Option<TickToken> {
        self.tick
    }

    /// Take the outstanding tick request so it can be delivered
    pub fn take_tick(&mut self) -> Option<TickToken> {
        self.tick.take()
    }

    pub fn take_timers(&mut self) -> Vec<PendingTimer> {
        std::mem::take(&mut self.timers)
    }

    pub fn pending_timers(&self) -> &[PendingTimer] {
        &self.timers
    }

    pub fn drain_events(&mut self) -> Vec<RevealEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[RevealEvent] {
        &self.events
    }

    /// How many tick requests were cancelled
    pub fn cancelled_ticks(&self) -> u64 {
        self.cancelled
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Host for QueuedHost {
    fn request_tick(&mut self) -> TickToken {
        let token = TickToken(self.next());
        self.tick = Some(token);
        token
    }

    fn cancel_tick(&mut self, token: TickToken) {
        if self.tick == Some(token) {
            self.tick = None;
            self.cancelled += 1;
        }
    }

    fn after(&mut self, delay_ms: f64) -> TimerToken {
        let token = TimerToken(self.next());
        self.timers.push(PendingTimer { token, delay_ms });
        token
    }

    fn reveal_started(&mut self, reveal_duration_ms: f64) {
        self.events.push(RevealEvent::Started { reveal_duration_ms });
    }

    fn reveal_finished(&mut self) {
        self.events.push(RevealEvent::Finished);
    }
}
