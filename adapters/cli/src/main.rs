#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a memorize session headlessly.

mod settings;
mod summary;

use std::{
    io::{self, Write},
    ops::ControlFlow,
    path::PathBuf,
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use memorize_core::{Event, FigureCanvas, NullCanvas, SoundCue, WaveId};
use memorize_rendering::{Color, FrameCounter, Presentation, RenderingBackend, TextCanvas};
use memorize_session::{query, Session, SessionPhase};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use settings::{Overrides, Settings};
use summary::{Guess, Summary};

const PREVIEW_COLUMNS: usize = 64;
const PREVIEW_ROWS: usize = 18;

/// Run a timed memorize session and score the recalled counts.
#[derive(Debug, Parser)]
#[command(name = "memorize", version, about)]
struct CliArgs {
    /// TOML settings file; command-line values take precedence.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Number of figure types (1-4).
    #[arg(long)]
    figures: Option<u32>,
    /// Session length in seconds.
    #[arg(long)]
    time: Option<u32>,
    /// Speed level from 1 (slowest) to 4 (fastest).
    #[arg(long)]
    speed: Option<u8>,
    /// Color difficulty: easy, medium or hard.
    #[arg(long)]
    colors: Option<String>,
    /// Ring the terminal bell for every wave.
    #[arg(long)]
    sound: Option<bool>,
    /// Static or normal (moving) figures.
    #[arg(long)]
    mode: Option<String>,
    /// Flat or 3d figures.
    #[arg(long)]
    variant: Option<String>,
    /// Seed for a reproducible session.
    #[arg(long)]
    seed: Option<u64>,
    /// Screen width in pixels.
    #[arg(long)]
    width: Option<f32>,
    /// Screen height in pixels.
    #[arg(long)]
    height: Option<f32>,
    /// Simulated frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
    /// Pace frames in wall-clock time instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,
    /// Print a text preview of the screen once per simulated second.
    #[arg(long)]
    preview: bool,
    /// Recalled count for an element, e.g. `--guess square=4`.
    #[arg(long = "guess", value_name = "ELEMENT=N")]
    guesses: Vec<Guess>,
}

impl CliArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            figures: self.figures,
            time: self.time,
            speed: self.speed,
            colors: self.colors.clone(),
            sound: self.sound,
            mode: self.mode.clone(),
            variant: self.variant.clone(),
            seed: self.seed,
            width: self.width,
            height: self.height,
        }
    }
}

/// Entry point for the memorize command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.apply(args.overrides());
    let config = settings
        .to_config(fresh_seed())
        .context("failed to build session configuration")?;

    let mut session = Session::new(config);
    let mut events = Vec::new();
    session
        .start(&mut events)
        .context("failed to start session")?;
    println!("{}", query::welcome_banner(&session));
    if let Some(catalog) = session.catalog() {
        let names: Vec<&str> = catalog.iter().map(|(_, form)| form.name()).collect();
        println!("Count the {}.", names.join(", "));
    }

    let backend = HeadlessBackend {
        fps: args.fps,
        realtime: args.realtime,
        preview: args.preview,
    };
    let presentation = Presentation::new(
        "Memorize It",
        Color::from_rgb_u8(0, 0, 0),
        session.config().bounds,
    );
    let mut bell = Bell;
    backend.run(presentation, |dt, canvas| {
        session.tick(dt, canvas, &mut bell, &mut events);
        for event in events.drain(..) {
            if let Event::WaveSpawned {
                wave,
                figures,
                spawned_at,
            } = event
            {
                debug!(wave = wave.get(), figures, ?spawned_at, "wave on screen");
            }
        }
        if session.phase() == SessionPhase::Finished {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })?;

    let counts = session
        .final_counts()
        .context("session ended without final counts")?;
    let catalog = session
        .catalog()
        .context("session ended without an element catalog")?;
    let summary = Summary::new(catalog, counts, &args.guesses).context("invalid guess")?;
    println!("{summary}");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fresh_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos() as u64)
}

/// Backend that drives frames at a fixed step without opening a window.
#[derive(Debug)]
struct HeadlessBackend {
    fps: u32,
    realtime: bool,
    preview: bool,
}

impl HeadlessBackend {
    fn drive<C, F, P>(&self, mut canvas: FrameCounter<C>, mut update_frame: F, mut show: P)
    where
        C: FigureCanvas,
        F: FnMut(Duration, &mut dyn FigureCanvas) -> ControlFlow<()>,
        P: FnMut(&C),
    {
        let dt = Duration::from_secs(1) / self.fps.max(1);
        let show_every = u64::from(self.fps.max(1));

        let mut ticks: u64 = 0;
        loop {
            ticks = ticks.saturating_add(1);
            let flow = update_frame(dt, &mut canvas);
            if ticks % show_every == 0 || flow.is_break() {
                show(canvas.inner());
            }
            if flow.is_break() {
                debug!(
                    ticks,
                    frames = canvas.frames(),
                    peak_figures = canvas.peak_figures(),
                    "headless run complete"
                );
                return;
            }
            if self.realtime {
                thread::sleep(dt);
            }
        }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, update_frame: F) -> Result<()>
    where
        F: FnMut(Duration, &mut dyn FigureCanvas) -> ControlFlow<()>,
    {
        info!(title = %presentation.window_title, fps = self.fps, "running headless");
        if self.preview {
            let raster = TextCanvas::new(PREVIEW_COLUMNS, PREVIEW_ROWS, presentation.bounds)
                .context("failed to create preview raster")?;
            self.drive(FrameCounter::new(raster), update_frame, |raster| {
                println!("{}\n{}", "-".repeat(PREVIEW_COLUMNS), raster.to_text());
            });
        } else {
            self.drive(FrameCounter::new(NullCanvas), update_frame, |_| {});
        }
        Ok(())
    }
}

/// Sound cue that rings the terminal bell.
#[derive(Clone, Copy, Debug)]
struct Bell;

impl SoundCue for Bell {
    fn wave_spawned(&mut self, _wave: WaveId) {
        let mut stderr = io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}
