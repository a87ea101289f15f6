#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave generation system.
//!
//! [`WaveGeneration`] decides, from the session seed alone, which element each
//! figure type is shown as, how many figures every wave holds, which types
//! they are and which colors they wear. [`WaveGeneration::spawn`] is the only
//! place where ground-truth counts are incremented.

use std::time::Duration;

use memorize_core::{
    Bounds, ColorPolicy, Composition, ConfigurationError, ElementCatalog, ElementForm,
    FigureCanvas, FigureColor, FigureId, FigureType, FigureVariant, FlatShape, PlayMode,
    SessionConfig, Solid, Tally, WaveId, WaveSizePolicy,
};
use memorize_figures::{Blueprint, Figure};
use rand::{
    distributions::{Distribution, WeightedIndex},
    seq::SliceRandom,
    Rng, SeedableRng,
};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::trace;

const RNG_STREAM_CATALOG: &str = "catalog";
const RNG_STREAM_WAVE: &str = "wave";

/// Palette for per-wave and per-figure draws. Grey only appears under the
/// easy policy.
const VIVID_COLORS: [FigureColor; 6] = [
    FigureColor::Green,
    FigureColor::Orange,
    FigureColor::Red,
    FigureColor::Blue,
    FigureColor::Yellow,
    FigureColor::Violet,
];

/// A batch of figures spawned together at one spawn boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Wave {
    id: WaveId,
    spawned_at: Duration,
    color: Option<FigureColor>,
    figures: Vec<Figure>,
}

impl Wave {
    /// Identifier of the wave.
    #[must_use]
    pub const fn id(&self) -> WaveId {
        self.id
    }

    /// Session time of the boundary that spawned the wave.
    #[must_use]
    pub const fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    /// Color shared by every figure when the medium policy is active.
    #[must_use]
    pub const fn shared_color(&self) -> Option<FigureColor> {
        self.color
    }

    /// Figures owned by the wave in creation order.
    #[must_use]
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    /// Number of figures in the wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.figures.len()
    }

    /// Reports whether the wave holds no figures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    /// Moves every figure of the wave.
    pub fn advance(&mut self, dt: Duration, bounds: Bounds) {
        for figure in &mut self.figures {
            figure.advance(dt, bounds);
        }
    }

    /// Draws every figure of the wave.
    pub fn render<C: FigureCanvas + ?Sized>(&self, canvas: &mut C) {
        for figure in &self.figures {
            figure.render(canvas);
        }
    }
}

#[derive(Clone, Debug)]
enum ColorAssignment {
    PerType(Vec<FigureColor>),
    PerWave,
    PerFigure,
}

#[derive(Clone, Debug)]
enum SizeSampler {
    Fixed(u32),
    Uniform { min: u32, max: u32 },
    Weighted(WeightedIndex<u32>),
}

impl SizeSampler {
    fn new(policy: WaveSizePolicy) -> Result<Self, ConfigurationError> {
        policy.validate()?;
        Ok(match policy {
            WaveSizePolicy::Fixed(size) => Self::Fixed(size),
            WaveSizePolicy::Uniform { min, max } => Self::Uniform { min, max },
            WaveSizePolicy::Weighted(weights) => Self::Weighted(
                WeightedIndex::new(weights).map_err(|_| {
                    ConfigurationError::InvalidWaveSize("weights cannot form a distribution")
                })?,
            ),
        })
    }

    fn sample(&self, rng: &mut ChaCha8Rng) -> u32 {
        match self {
            Self::Fixed(size) => *size,
            Self::Uniform { min, max } => rng.gen_range(*min..=*max),
            Self::Weighted(index) => index.sample(rng) as u32 + 1,
        }
    }
}

/// Pure system that turns spawn boundaries into [`Wave`] values.
#[derive(Clone, Debug)]
pub struct WaveGeneration {
    base_seed: u64,
    catalog: ElementCatalog,
    colors: ColorAssignment,
    sizes: SizeSampler,
    last_wave_color: FigureColor,
    next_wave: u32,
    next_figure: u32,
}

impl WaveGeneration {
    /// Prepares generation for a session.
    ///
    /// Fails when the configuration is invalid, in particular when no figure
    /// types or more types than available shapes are requested. Chooses the
    /// element catalog and, for the easy policy, the color of every type.
    pub fn new(config: &SessionConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let sizes = SizeSampler::new(config.tuning.wave_size(config.variant))?;
        let mut rng = ChaCha8Rng::seed_from_u64(derive_labeled_seed(config.seed, RNG_STREAM_CATALOG));
        let catalog = select_catalog(config, &mut rng);
        let colors = match config.color_policy {
            ColorPolicy::Easy => ColorAssignment::PerType(
                FigureColor::ALL
                    .choose_multiple(&mut rng, catalog.len())
                    .copied()
                    .collect(),
            ),
            ColorPolicy::Medium => ColorAssignment::PerWave,
            ColorPolicy::Hard => ColorAssignment::PerFigure,
        };

        Ok(Self {
            base_seed: config.seed,
            catalog,
            colors,
            sizes,
            last_wave_color: FigureColor::Grey,
            next_wave: 0,
            next_figure: 0,
        })
    }

    /// Elements chosen for this session, indexed by figure type.
    #[must_use]
    pub fn catalog(&self) -> &ElementCatalog {
        &self.catalog
    }

    /// Fixed color of `figure_type` under the easy policy, `None` otherwise.
    #[must_use]
    pub fn type_color(&self, figure_type: FigureType) -> Option<FigureColor> {
        match &self.colors {
            ColorAssignment::PerType(colors) => colors.get(usize::from(figure_type.index())).copied(),
            ColorAssignment::PerWave | ColorAssignment::PerFigure => None,
        }
    }

    /// Number of waves spawned so far.
    #[must_use]
    pub const fn waves_spawned(&self) -> u32 {
        self.next_wave
    }

    /// Spawns the next wave and records every new figure in `counts`.
    ///
    /// The wave's contents depend only on the session seed, the wave's index
    /// and the color of the previous wave, so replays with the same
    /// configuration produce identical waves.
    pub fn spawn(&mut self, config: &SessionConfig, counts: &mut Tally, spawned_at: Duration) -> Wave {
        let id = WaveId::new(self.next_wave);
        self.next_wave = self.next_wave.saturating_add(1);

        let mut rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(self.base_seed, id));
        let size = self.sizes.sample(&mut rng);
        let wave_color = if matches!(self.colors, ColorAssignment::PerWave) {
            Some(self.next_wave_color(&mut rng))
        } else {
            None
        };
        let forms = self.catalog.forms();
        let single_type = match config.tuning.composition {
            Composition::Single => Some(rng.gen_range(0..forms.len())),
            Composition::Mixed => None,
        };
        let motion = match config.mode {
            PlayMode::Normal => Some(config.tuning.motion),
            PlayMode::Static => None,
        };

        let mut figures = Vec::with_capacity(size as usize);
        for _ in 0..size {
            let index = single_type.unwrap_or_else(|| rng.gen_range(0..forms.len()));
            let figure_type = FigureType::new(index as u8);
            let color = match (&self.colors, wave_color) {
                (ColorAssignment::PerType(colors), _) => colors[index],
                (_, Some(shared)) => shared,
                _ => *VIVID_COLORS.choose(&mut rng).unwrap_or(&FigureColor::Green),
            };
            let figure_id = FigureId::new(self.next_figure);
            self.next_figure = self.next_figure.wrapping_add(1);

            let figure = Figure::create(
                Blueprint {
                    id: figure_id,
                    figure_type,
                    color,
                    form: &forms[index],
                    motion,
                },
                config.bounds,
                &mut rng,
            );
            counts.record(figure_type);
            trace!(
                wave = id.get(),
                figure = figure_id.get(),
                %figure_type,
                %color,
                "figure created"
            );
            figures.push(figure);
        }

        Wave {
            id,
            spawned_at,
            color: wave_color,
            figures,
        }
    }

    fn next_wave_color(&mut self, rng: &mut ChaCha8Rng) -> FigureColor {
        let previous = self.last_wave_color;
        let candidates: Vec<FigureColor> = FigureColor::ALL
            .iter()
            .copied()
            .filter(|color| *color != previous)
            .collect();
        let color = candidates.choose(rng).copied().unwrap_or(FigureColor::Green);
        self.last_wave_color = color;
        color
    }
}

fn select_catalog(config: &SessionConfig, rng: &mut ChaCha8Rng) -> ElementCatalog {
    let wanted = config.type_count as usize;
    let forms: Vec<ElementForm> = match config.variant {
        FigureVariant::ThreeDimensional => Solid::ALL
            .choose_multiple(rng, wanted)
            .map(|solid| ElementForm::Solid(*solid))
            .collect(),
        FigureVariant::Flat if config.images.len() >= wanted => config
            .images
            .choose_multiple(rng, wanted)
            .map(|image| ElementForm::Image(image.clone()))
            .collect(),
        FigureVariant::Flat => {
            let mut forms: Vec<ElementForm> = config
                .images
                .iter()
                .cloned()
                .map(ElementForm::Image)
                .collect();
            forms.extend(
                FlatShape::ALL
                    .choose_multiple(rng, wanted - config.images.len())
                    .map(|shape| ElementForm::Flat(*shape)),
            );
            forms
        }
    };
    ElementCatalog::new(forms)
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn derive_wave_seed(base: u64, wave: WaveId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(RNG_STREAM_WAVE.as_bytes());
    hasher.update(wave.get().to_le_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
