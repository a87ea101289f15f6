//! Immutable session configuration and its validation rules.

use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Bounds, FigureVariant, ImageElement, PlayMode, MAX_FIGURE_TYPES};

/// Difficulty rule governing how figure colors are chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorPolicy {
    /// One fixed color per figure type for the whole session.
    Easy,
    /// One color per wave, shared by every figure in it.
    #[default]
    Medium,
    /// An independent color per figure.
    Hard,
}

impl FromStr for ColorPolicy {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ConfigurationError::UnknownColorPolicy(value.to_owned())),
        }
    }
}

/// Pace at which waves are spawned, from slowest to fastest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpeedLevel {
    /// Level 1.
    Slowest,
    /// Level 2.
    #[default]
    Slow,
    /// Level 3.
    Fast,
    /// Level 4.
    Fastest,
}

impl SpeedLevel {
    /// Every level from slowest to fastest.
    pub const ALL: [SpeedLevel; 4] = [Self::Slowest, Self::Slow, Self::Fast, Self::Fastest];

    /// One-based numeric level as shown in settings.
    #[must_use]
    pub const fn get(self) -> u8 {
        match self {
            Self::Slowest => 1,
            Self::Slow => 2,
            Self::Fast => 3,
            Self::Fastest => 4,
        }
    }

    const fn slot(self) -> usize {
        self.get() as usize - 1
    }
}

impl TryFrom<u8> for SpeedLevel {
    type Error = ConfigurationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Slowest),
            2 => Ok(Self::Slow),
            3 => Ok(Self::Fast),
            4 => Ok(Self::Fastest),
            other => Err(ConfigurationError::UnknownSpeedLevel(other.to_string())),
        }
    }
}

impl From<SpeedLevel> for u8 {
    fn from(level: SpeedLevel) -> Self {
        level.get()
    }
}

impl FromStr for SpeedLevel {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return Self::try_from(number);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "slowest" => Ok(Self::Slowest),
            "slow" => Ok(Self::Slow),
            "fast" => Ok(Self::Fast),
            "fastest" => Ok(Self::Fastest),
            _ => Err(ConfigurationError::UnknownSpeedLevel(value.to_owned())),
        }
    }
}

/// Lookup table translating a [`SpeedLevel`] into a spawn interval.
///
/// The mapping was tuned by hand for a particular display and is therefore
/// exposed as data rather than derived. Intervals must be positive and must
/// not grow as the level increases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedTable {
    intervals: [Duration; 4],
}

impl SpeedTable {
    /// Creates a table from intervals ordered slowest to fastest.
    pub fn new(intervals: [Duration; 4]) -> Result<Self, ConfigurationError> {
        for level in SpeedLevel::ALL {
            if intervals[level.slot()].is_zero() {
                return Err(ConfigurationError::ZeroSpawnInterval { level });
            }
        }
        for pair in SpeedLevel::ALL.windows(2) {
            let (slower, faster) = (pair[0], pair[1]);
            if intervals[faster.slot()] > intervals[slower.slot()] {
                return Err(ConfigurationError::NonMonotonicSpeedTable { slower, faster });
            }
        }
        Ok(Self { intervals })
    }

    /// Interval between spawn boundaries at the provided level.
    #[must_use]
    pub const fn interval(&self, level: SpeedLevel) -> Duration {
        self.intervals[level.slot()]
    }
}

impl Default for SpeedTable {
    /// Fourteen seconds divided by the numeric level.
    fn default() -> Self {
        Self {
            intervals: [
                Duration::from_millis(14_000),
                Duration::from_millis(7_000),
                Duration::from_millis(4_667),
                Duration::from_millis(3_500),
            ],
        }
    }
}

/// Rule deciding how many figures a wave contains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WaveSizePolicy {
    /// Every wave holds exactly this many figures.
    Fixed(u32),
    /// Uniformly drawn from `min..=max`.
    Uniform {
        /// Smallest wave size.
        min: u32,
        /// Largest wave size.
        max: u32,
    },
    /// Size `n + 1` is drawn with relative weight `weights[n]`.
    Weighted(Vec<u32>),
}

impl WaveSizePolicy {
    /// Distribution used by flat sessions: mostly three to five figures, rarely eight or nine.
    #[must_use]
    pub fn flat_default() -> Self {
        Self::Weighted(vec![3, 10, 20, 20, 20, 15, 10, 1, 1])
    }

    /// Distribution used by three-dimensional sessions.
    #[must_use]
    pub const fn solid_default() -> Self {
        Self::Uniform { min: 2, max: 6 }
    }

    /// Default policy for the provided variant.
    #[must_use]
    pub fn for_variant(variant: FigureVariant) -> Self {
        match variant {
            FigureVariant::Flat => Self::flat_default(),
            FigureVariant::ThreeDimensional => Self::solid_default(),
        }
    }

    /// Checks that the policy always yields at least one figure.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            Self::Fixed(0) => Err(ConfigurationError::InvalidWaveSize(
                "fixed wave size must be positive",
            )),
            Self::Fixed(_) => Ok(()),
            Self::Uniform { min, max } if *min == 0 || min > max => Err(
                ConfigurationError::InvalidWaveSize("uniform range must satisfy 1 <= min <= max"),
            ),
            Self::Uniform { .. } => Ok(()),
            Self::Weighted(weights) if weights.iter().all(|weight| *weight == 0) => Err(
                ConfigurationError::InvalidWaveSize("weighted sizes need a positive weight"),
            ),
            Self::Weighted(weights) if u32::try_from(weights.len()).is_err() => Err(
                ConfigurationError::InvalidWaveSize("too many weighted sizes"),
            ),
            Self::Weighted(_) => Ok(()),
        }
    }
}

/// Decides how figure types are distributed inside a single wave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Composition {
    /// Every figure draws its own type.
    #[default]
    Mixed,
    /// One type is drawn per wave and shared by all of its figures.
    Single,
}

/// Controls whether spawning stops shortly before the session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosingGrace {
    /// Boundaries up to the end of the session may spawn.
    None,
    /// No boundary later than `duration - interval / 2` spawns, leaving the
    /// final wave on screen long enough to be counted.
    #[default]
    HalfInterval,
}

/// Speeds applied to figures in [`PlayMode::Normal`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionTuning {
    /// Lowest linear speed in screen units per second.
    pub min_speed: f32,
    /// Highest linear speed in screen units per second.
    pub max_speed: f32,
    /// Rotation rate of solids in radians per second.
    pub spin_rate: f32,
}

impl MotionTuning {
    /// Checks that the speed range is finite and ordered.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let finite =
            self.min_speed.is_finite() && self.max_speed.is_finite() && self.spin_rate.is_finite();
        if !finite {
            return Err(ConfigurationError::InvalidMotion("speeds must be finite"));
        }
        if self.min_speed < 0.0 || self.min_speed > self.max_speed {
            return Err(ConfigurationError::InvalidMotion(
                "speed range must satisfy 0 <= min <= max",
            ));
        }
        Ok(())
    }
}

impl Default for MotionTuning {
    fn default() -> Self {
        Self {
            min_speed: 80.0,
            max_speed: 220.0,
            spin_rate: 1.5,
        }
    }
}

/// Knobs that shape generation and pacing beyond the player-facing settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tuning {
    /// Spawn interval per speed level.
    pub speed_table: SpeedTable,
    /// Wave size rule; `None` selects the variant's default.
    pub wave_size: Option<WaveSizePolicy>,
    /// How types are distributed within a wave.
    pub composition: Composition,
    /// Whether spawning pauses before the session ends.
    pub closing_grace: ClosingGrace,
    /// Motion parameters for normal mode.
    pub motion: MotionTuning,
}

impl Tuning {
    /// Wave size rule in effect for the provided variant.
    #[must_use]
    pub fn wave_size(&self, variant: FigureVariant) -> WaveSizePolicy {
        self.wave_size
            .clone()
            .unwrap_or_else(|| WaveSizePolicy::for_variant(variant))
    }
}

/// Immutable configuration a session is constructed from.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Number of figure types in play, `1..=MAX_FIGURE_TYPES`.
    pub type_count: u32,
    /// Length of the session in whole seconds.
    pub duration_seconds: u32,
    /// Pace of wave spawning.
    pub speed_level: SpeedLevel,
    /// Color difficulty.
    pub color_policy: ColorPolicy,
    /// Whether the sound collaborator is signalled on each wave.
    pub sound_enabled: bool,
    /// Whether figures move.
    pub mode: PlayMode,
    /// Flat or three-dimensional figures.
    pub variant: FigureVariant,
    /// Visible area figures are placed in.
    pub bounds: Bounds,
    /// Seed for every random decision made during the session.
    pub seed: u64,
    /// Images offered as flat elements before shapes are used.
    pub images: Vec<ImageElement>,
    /// Generation and pacing knobs.
    pub tuning: Tuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            type_count: 3,
            duration_seconds: 60,
            speed_level: SpeedLevel::Slow,
            color_policy: ColorPolicy::Medium,
            sound_enabled: false,
            mode: PlayMode::Static,
            variant: FigureVariant::Flat,
            bounds: Bounds::new(1920.0, 1080.0),
            seed: 0,
            images: Vec::new(),
            tuning: Tuning::default(),
        }
    }
}

impl SessionConfig {
    /// Checks every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.type_count == 0 || self.type_count > MAX_FIGURE_TYPES {
            return Err(ConfigurationError::TypeCountOutOfRange {
                requested: self.type_count,
                max: MAX_FIGURE_TYPES,
            });
        }
        if self.duration_seconds == 0 {
            return Err(ConfigurationError::NonPositiveDuration);
        }
        if !self.bounds.is_valid() {
            return Err(ConfigurationError::InvalidBounds {
                width: self.bounds.width(),
                height: self.bounds.height(),
            });
        }
        for image in &self.images {
            let sized = image.width.is_finite()
                && image.height.is_finite()
                && image.width > 0.0
                && image.height > 0.0;
            if image.name.trim().is_empty() || !sized {
                return Err(ConfigurationError::InvalidImage {
                    name: image.name.clone(),
                });
            }
        }
        self.tuning.wave_size(self.variant).validate()?;
        self.tuning.motion.validate()
    }

    /// Total session length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_seconds))
    }

    /// Interval between spawn boundaries at the configured speed.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        self.tuning.speed_table.interval(self.speed_level)
    }

    /// Upper bound on the number of waves a session can spawn.
    #[must_use]
    pub fn wave_limit(&self) -> u32 {
        let interval = self.spawn_interval().as_nanos();
        if interval == 0 {
            return 0;
        }
        let waves = self.duration().as_nanos() / interval;
        u32::try_from(waves).unwrap_or(u32::MAX)
    }
}

/// Reasons a configuration is rejected before a session may run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigurationError {
    /// The number of figure types is zero or exceeds the available shapes.
    #[error("figure type count {requested} is outside 1..={max}")]
    TypeCountOutOfRange {
        /// Requested number of types.
        requested: u32,
        /// Largest supported number of types.
        max: u32,
    },
    /// The session would not last any time at all.
    #[error("session duration must be positive")]
    NonPositiveDuration,
    /// The visible area is empty or not finite.
    #[error("screen bounds {width}x{height} must be finite and positive")]
    InvalidBounds {
        /// Configured width.
        width: f32,
        /// Configured height.
        height: f32,
    },
    /// A speed level outside `1..=4` was supplied.
    #[error("unknown speed level `{0}`")]
    UnknownSpeedLevel(String),
    /// The color policy name was not recognised.
    #[error("unknown color policy `{0}`")]
    UnknownColorPolicy(String),
    /// The play mode name was not recognised.
    #[error("unknown play mode `{0}`")]
    UnknownPlayMode(String),
    /// The figure variant name was not recognised.
    #[error("unknown figure variant `{0}`")]
    UnknownVariant(String),
    /// A speed table entry was zero.
    #[error("spawn interval for {level:?} must be positive")]
    ZeroSpawnInterval {
        /// Level with the zero interval.
        level: SpeedLevel,
    },
    /// A faster level was given a longer interval than a slower one.
    #[error("spawn interval for {faster:?} is longer than for {slower:?}")]
    NonMonotonicSpeedTable {
        /// The slower of the two offending levels.
        slower: SpeedLevel,
        /// The faster of the two offending levels.
        faster: SpeedLevel,
    },
    /// The wave size rule could yield empty waves.
    #[error("invalid wave size policy: {0}")]
    InvalidWaveSize(&'static str),
    /// The motion parameters are unusable.
    #[error("invalid motion tuning: {0}")]
    InvalidMotion(&'static str),
    /// An image element has no name or a degenerate size.
    #[error("image element `{name}` needs a name and a positive size")]
    InvalidImage {
        /// Name of the offending image.
        name: String,
    },
}
