#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning schedule that converts elapsed session time into
//! spawn boundaries.
//!
//! Boundaries sit at whole multiples of the spawn interval, starting one
//! interval after the session begins. A boundary spawns a wave only while it
//! lies strictly before the end of the session and, under
//! [`ClosingGrace::HalfInterval`], no later than half an interval before it.

use std::time::Duration;

use memorize_core::{ClosingGrace, Event, SessionConfig};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    spawn_interval: Duration,
    duration: Duration,
    closing_grace: ClosingGrace,
}

impl Config {
    /// Creates a new configuration from an explicit cadence and session length.
    #[must_use]
    pub const fn new(
        spawn_interval: Duration,
        duration: Duration,
        closing_grace: ClosingGrace,
    ) -> Self {
        Self {
            spawn_interval,
            duration,
            closing_grace,
        }
    }

    /// Derives the schedule of a session from its configuration.
    #[must_use]
    pub fn for_session(config: &SessionConfig) -> Self {
        Self::new(
            config.spawn_interval(),
            config.duration(),
            config.tuning.closing_grace,
        )
    }

    /// Interval between successive boundaries.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Latest boundary time that may still spawn a wave, `None` when no
    /// boundary can.
    #[must_use]
    pub fn last_admissible(&self) -> Option<Duration> {
        if self.spawn_interval.is_zero() {
            return None;
        }
        let latest = match self.closing_grace {
            ClosingGrace::None => self.duration.checked_sub(Duration::from_nanos(1))?,
            ClosingGrace::HalfInterval => self.duration.checked_sub(self.spawn_interval / 2)?,
        };
        (latest >= self.spawn_interval).then_some(latest)
    }
}

/// Pure system that reports the spawn boundaries crossed as time advances.
#[derive(Clone, Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    last_admissible: Option<Duration>,
    elapsed: Duration,
    next_boundary: Duration,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            last_admissible: config.last_admissible(),
            elapsed: Duration::ZERO,
            next_boundary: config.spawn_interval,
        }
    }

    /// Consumes time events and appends the time of every boundary crossed.
    ///
    /// A single large step may cross several boundaries; each is reported in
    /// ascending order.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Duration>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(accumulated);
        self.resolve_boundaries(out);
    }

    /// Time of the next boundary that will spawn a wave, if any remain.
    #[must_use]
    pub fn next_boundary(&self) -> Option<Duration> {
        self.admits(self.next_boundary).then_some(self.next_boundary)
    }

    /// Total number of boundaries that spawn a wave over the whole session.
    #[must_use]
    pub fn planned_waves(&self) -> u32 {
        let (Some(latest), false) = (self.last_admissible, self.spawn_interval.is_zero()) else {
            return 0;
        };
        let waves = latest.as_nanos() / self.spawn_interval.as_nanos();
        u32::try_from(waves).unwrap_or(u32::MAX)
    }

    fn resolve_boundaries(&mut self, out: &mut Vec<Duration>) {
        while self.next_boundary <= self.elapsed && self.admits(self.next_boundary) {
            out.push(self.next_boundary);
            self.next_boundary = self.next_boundary.saturating_add(self.spawn_interval);
        }
    }

    fn admits(&self, boundary: Duration) -> bool {
        !self.spawn_interval.is_zero()
            && self
                .last_admissible
                .is_some_and(|latest| boundary <= latest)
    }
}
