#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for a memorize run.
//!
//! A [`Session`] is built from an immutable [`SessionConfig`], started once,
//! and then ticked by an external driver with the frame delta. Every tick
//! spawns the waves whose boundaries were crossed, moves the figures that
//! were already on screen, draws every live figure and, once the configured
//! duration has elapsed, hands the final counts to the scoring collaborator.

use std::{fmt, time::Duration};

use memorize_core::{
    ConfigurationError, ElementCatalog, Event, FigureCanvas, PlayMode, SessionConfig, SoundCue,
    Tally, WELCOME_BANNER,
};
use memorize_system_spawning::{Config as SpawnConfig, Spawning};
use memorize_system_wave_generation::{Wave, WaveGeneration};
use thiserror::Error;
use tracing::{debug, info};

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Constructed but not yet started.
    Idle,
    /// Spawning waves and accumulating counts.
    Running,
    /// Terminal; counts are final.
    Finished,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

/// Failures reported when starting a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// The configuration was rejected before the session could run.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// `start` was called on a session that already left the idle phase.
    #[error("session cannot start while {phase}")]
    NotIdle {
        /// Phase the session was in.
        phase: SessionPhase,
    },
}

#[derive(Debug)]
struct Run {
    generation: WaveGeneration,
    spawning: Spawning,
}

/// One complete timed run from start to scoring handoff.
#[derive(Debug)]
pub struct Session {
    banner: &'static str,
    config: SessionConfig,
    phase: SessionPhase,
    elapsed: Duration,
    counts: Tally,
    waves: Vec<Wave>,
    figures_spawned: u64,
    run: Option<Run>,
    final_counts: Option<Tally>,
}

impl Session {
    /// Creates an idle session. The configuration is validated by
    /// [`Session::start`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            config,
            phase: SessionPhase::Idle,
            elapsed: Duration::ZERO,
            counts: Tally::default(),
            waves: Vec::new(),
            figures_spawned: 0,
            run: None,
            final_counts: None,
        }
    }

    /// Validates the configuration and enters [`SessionPhase::Running`].
    ///
    /// Counts are reset to zero for every configured type. On failure the
    /// session stays idle.
    pub fn start(&mut self, out_events: &mut Vec<Event>) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::NotIdle { phase: self.phase });
        }

        let generation = WaveGeneration::new(&self.config)?;
        let schedule = SpawnConfig::for_session(&self.config);
        let interval = schedule.spawn_interval();

        self.run = Some(Run {
            generation,
            spawning: Spawning::new(schedule),
        });
        self.counts = Tally::zeroed(self.config.type_count);
        self.elapsed = Duration::ZERO;
        self.figures_spawned = 0;
        self.phase = SessionPhase::Running;

        info!(
            type_count = self.config.type_count,
            duration_seconds = self.config.duration_seconds,
            speed_level = self.config.speed_level.get(),
            color_policy = ?self.config.color_policy,
            mode = ?self.config.mode,
            variant = ?self.config.variant,
            seed = self.config.seed,
            "session started"
        );
        out_events.push(Event::SessionStarted {
            type_count: self.config.type_count,
            duration: self.config.duration(),
            interval,
        });
        Ok(())
    }

    /// Advances the session clock by `dt`.
    ///
    /// Within a tick, crossed spawn boundaries are resolved first, then
    /// figures that were on screen before this tick move, then every live
    /// figure is drawn. Waves spawned during the tick appear at their spawn
    /// position and start moving on the next tick. Idle and finished
    /// sessions ignore ticks.
    pub fn tick<C, S>(
        &mut self,
        dt: Duration,
        canvas: &mut C,
        sound: &mut S,
        out_events: &mut Vec<Event>,
    ) where
        C: FigureCanvas + ?Sized,
        S: SoundCue + ?Sized,
    {
        if self.phase != SessionPhase::Running {
            return;
        }
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let duration = self.config.duration();
        let motion_dt = dt.min(duration.saturating_sub(self.elapsed));
        self.elapsed = self.elapsed.saturating_add(dt);
        let time_event = Event::TimeAdvanced { dt };

        let mut boundaries = Vec::new();
        run.spawning
            .handle(std::slice::from_ref(&time_event), &mut boundaries);
        out_events.push(time_event);

        let settled = self.waves.len();
        for spawned_at in boundaries {
            let wave = run
                .generation
                .spawn(&self.config, &mut self.counts, spawned_at);
            let figures = u32::try_from(wave.len()).unwrap_or(u32::MAX);
            self.figures_spawned = self.figures_spawned.saturating_add(u64::from(figures));

            debug!(
                wave = wave.id().get(),
                figures,
                spawned_at = ?wave.spawned_at(),
                color = ?wave.shared_color(),
                "wave spawned"
            );
            out_events.push(Event::WaveSpawned {
                wave: wave.id(),
                figures,
                spawned_at: wave.spawned_at(),
            });
            if self.config.sound_enabled {
                sound.wave_spawned(wave.id());
            }
            self.waves.push(wave);
        }

        if self.config.mode == PlayMode::Normal && !motion_dt.is_zero() {
            for wave in &mut self.waves[..settled] {
                wave.advance(motion_dt, self.config.bounds);
            }
        }

        canvas.begin_frame();
        for wave in &self.waves {
            wave.render(canvas);
        }
        canvas.end_frame();

        if self.elapsed >= duration {
            self.finish(out_events);
        }
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        self.phase = SessionPhase::Finished;
        self.waves.clear();
        self.final_counts = Some(self.counts.clone());

        info!(
            waves = self.waves_spawned(),
            figures = self.figures_spawned,
            "session finished"
        );
        out_events.push(Event::SessionFinished {
            counts: self.counts.clone(),
        });
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Session time accumulated since start.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Ground-truth counts accumulated so far.
    #[must_use]
    pub const fn counts(&self) -> &Tally {
        &self.counts
    }

    /// Final counts, available once the session has finished.
    #[must_use]
    pub const fn final_counts(&self) -> Option<&Tally> {
        self.final_counts.as_ref()
    }

    /// Elements shown for each figure type, available once started.
    #[must_use]
    pub fn catalog(&self) -> Option<&ElementCatalog> {
        self.run.as_ref().map(|run| run.generation.catalog())
    }

    /// Number of waves spawned since start.
    #[must_use]
    pub fn waves_spawned(&self) -> u32 {
        self.run
            .as_ref()
            .map_or(0, |run| run.generation.waves_spawned())
    }

    /// Number of figures spawned since start.
    #[must_use]
    pub const fn figures_spawned(&self) -> u64 {
        self.figures_spawned
    }
}

/// Read-only views over a session for adapters.
pub mod query {
    use std::time::Duration;

    use memorize_core::FigurePresentation;
    use memorize_system_wave_generation::Wave;

    use super::Session;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(session: &Session) -> &'static str {
        session.banner
    }

    /// Waves currently on screen in spawn order.
    #[must_use]
    pub fn waves(session: &Session) -> &[Wave] {
        &session.waves
    }

    /// Presentation of every live figure as it would be drawn this frame.
    #[must_use]
    pub fn frame(session: &Session) -> Vec<FigurePresentation> {
        session
            .waves
            .iter()
            .flat_map(Wave::figures)
            .map(|figure| figure.presentation())
            .collect()
    }

    /// Session time left before the run finishes.
    #[must_use]
    pub fn remaining(session: &Session) -> Duration {
        session.config.duration().saturating_sub(session.elapsed)
    }

    /// Time of the next wave, `None` when no further wave will spawn.
    #[must_use]
    pub fn next_wave_at(session: &Session) -> Option<Duration> {
        session
            .run
            .as_ref()
            .filter(|_| session.phase == super::SessionPhase::Running)
            .and_then(|run| run.spawning.next_boundary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memorize_core::{NullCanvas, Silence};

    #[test]
    fn start_twice_is_rejected() {
        let mut session = Session::new(SessionConfig::default());
        let mut events = Vec::new();
        session.start(&mut events).expect("valid configuration");

        assert_eq!(
            session.start(&mut events),
            Err(SessionError::NotIdle {
                phase: SessionPhase::Running
            })
        );
    }

    #[test]
    fn ticks_before_start_are_ignored() {
        let mut session = Session::new(SessionConfig::default());
        let mut events = Vec::new();
        session.tick(
            Duration::from_secs(100),
            &mut NullCanvas,
            &mut Silence,
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.elapsed(), Duration::ZERO);
    }

    #[test]
    fn phase_display_is_lowercase() {
        assert_eq!(SessionPhase::Finished.to_string(), "finished");
    }
}
