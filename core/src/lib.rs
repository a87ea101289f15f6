#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the memorize simulation.
//!
//! This crate defines the vocabulary that connects the session driver, the
//! pure systems and the adapters. The session is constructed from an
//! immutable [`SessionConfig`], the wave generation system produces figures
//! whose appearance is described by [`FigureType`], [`FigureColor`] and
//! [`ElementForm`], and the session broadcasts [`Event`] values that adapters
//! react to. Display and audio collaborators plug in through the
//! [`FigureCanvas`] and [`SoundCue`] traits.

mod config;
mod presentation;

pub use config::{
    ClosingGrace, ColorPolicy, Composition, ConfigurationError, MotionTuning, SessionConfig,
    SpeedLevel, SpeedTable, Tuning, WaveSizePolicy,
};
pub use presentation::{
    FigureCanvas, FigureOutline, FigurePresentation, NullCanvas, Silence, SoundCue,
};

use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Memorize It.";

/// Largest number of distinct figure types a single session may track.
///
/// Each variant offers exactly this many shapes, so a session can always be
/// populated without images.
pub const MAX_FIGURE_TYPES: u32 = 4;

/// Describes whether live figures move between frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Figures stay where they were spawned.
    #[default]
    Static,
    /// Figures drift across the screen and bounce off its edges.
    Normal,
}

impl FromStr for PlayMode {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "normal" | "motion" => Ok(Self::Normal),
            _ => Err(ConfigurationError::UnknownPlayMode(value.to_owned())),
        }
    }
}

/// Selects which family of figures a session presents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureVariant {
    /// Flat polygons or images drawn on a 2D surface.
    #[default]
    Flat,
    /// Rotating solids drawn with depth.
    ThreeDimensional,
}

impl FromStr for FigureVariant {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" | "2d" => Ok(Self::Flat),
            "three-dimensional" | "threedimensional" | "3d" => Ok(Self::ThreeDimensional),
            _ => Err(ConfigurationError::UnknownVariant(value.to_owned())),
        }
    }
}

/// Category a figure is counted under.
///
/// The value indexes the session's [`ElementCatalog`]; types are numbered
/// from zero up to the configured type count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FigureType(u8);

impl FigureType {
    /// Creates a figure type from its catalog index.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Retrieves the catalog index of the figure type.
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type{}", self.0)
    }
}

/// Unique identifier assigned to a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaveId(u32);

impl WaveId {
    /// Creates a new wave identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a figure within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(u32);

impl FigureId {
    /// Creates a new figure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Byte RGB triple used when presenting a figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Palette a figure's color is drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FigureColor {
    /// Pure green.
    Green,
    /// Orange.
    Orange,
    /// Dark red.
    Red,
    /// Pure blue.
    Blue,
    /// Yellow.
    Yellow,
    /// Violet.
    Violet,
    /// Neutral grey.
    Grey,
}

impl FigureColor {
    /// Every palette entry in a stable order.
    pub const ALL: [FigureColor; 7] = [
        Self::Green,
        Self::Orange,
        Self::Red,
        Self::Blue,
        Self::Yellow,
        Self::Violet,
        Self::Grey,
    ];

    /// Byte RGB value used to draw the color.
    #[must_use]
    pub const fn rgb(self) -> Rgb {
        match self {
            Self::Green => Rgb::from_rgb(0, 255, 0),
            Self::Orange => Rgb::from_rgb(255, 127, 0),
            Self::Red => Rgb::from_rgb(204, 0, 0),
            Self::Blue => Rgb::from_rgb(0, 0, 255),
            Self::Yellow => Rgb::from_rgb(255, 255, 0),
            Self::Violet => Rgb::from_rgb(255, 0, 255),
            Self::Grey => Rgb::from_rgb(127, 127, 127),
        }
    }

    /// Human readable name of the color.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Orange => "Orange",
            Self::Red => "Red",
            Self::Blue => "Blue",
            Self::Yellow => "Yellow",
            Self::Violet => "Violet",
            Self::Grey => "Grey",
        }
    }
}

impl fmt::Display for FigureColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Polygons available to the flat variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlatShape {
    /// Axis-aligned square.
    Square,
    /// Upward pointing isosceles triangle.
    Triangle,
    /// Regular-looking octagon.
    Octagon,
    /// Square rotated by 45 degrees.
    Diamond,
}

impl FlatShape {
    /// Every flat shape in a stable order.
    pub const ALL: [FlatShape; 4] = [Self::Square, Self::Triangle, Self::Octagon, Self::Diamond];

    /// Human readable name of the shape.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Octagon => "octagon",
            Self::Diamond => "diamond",
        }
    }
}

/// Solids available to the three-dimensional variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Solid {
    /// Six square faces.
    Cube,
    /// Square base with four triangular faces.
    Pyramid,
    /// Eight triangular faces.
    Octahedron,
    /// Octagonal prism.
    Octagon,
}

impl Solid {
    /// Every solid in a stable order.
    pub const ALL: [Solid; 4] = [Self::Cube, Self::Pyramid, Self::Octahedron, Self::Octagon];

    /// Human readable name of the solid.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cube => "cube",
            Self::Pyramid => "pyramid",
            Self::Octahedron => "octahedron",
            Self::Octagon => "octagon prism",
        }
    }
}

/// Externally supplied picture used in place of a drawn shape.
///
/// Only the name and the already-scaled pixel size are known to the core;
/// decoding and scaling belong to the asset collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    /// Name the element is announced under.
    pub name: String,
    /// Width of the scaled image in screen units.
    pub width: f32,
    /// Height of the scaled image in screen units.
    pub height: f32,
}

/// Concrete visual a figure type is presented as.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementForm {
    /// A flat polygon.
    Flat(FlatShape),
    /// A rotating solid.
    Solid(Solid),
    /// An externally supplied image.
    Image(ImageElement),
}

impl ElementForm {
    /// Name used when reporting counts for this element.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Flat(shape) => shape.name(),
            Self::Solid(solid) => solid.name(),
            Self::Image(image) => &image.name,
        }
    }
}

/// Mapping from figure types to the element each one is presented as.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementCatalog {
    forms: Vec<ElementForm>,
}

impl ElementCatalog {
    /// Creates a catalog where the form at index `n` backs `FigureType::new(n)`.
    #[must_use]
    pub fn new(forms: Vec<ElementForm>) -> Self {
        Self { forms }
    }

    /// Number of figure types the catalog covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Reports whether the catalog covers no figure types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Forms ordered by figure type index.
    #[must_use]
    pub fn forms(&self) -> &[ElementForm] {
        &self.forms
    }

    /// Retrieves the form presented for the provided figure type.
    #[must_use]
    pub fn form(&self, figure_type: FigureType) -> Option<&ElementForm> {
        self.forms.get(usize::from(figure_type.index()))
    }

    /// Retrieves the display name of the provided figure type.
    #[must_use]
    pub fn name(&self, figure_type: FigureType) -> Option<&str> {
        self.form(figure_type).map(ElementForm::name)
    }

    /// Finds the figure type announced under `name`, ignoring ASCII case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<FigureType> {
        self.iter()
            .find(|(_, form)| form.name().eq_ignore_ascii_case(name.trim()))
            .map(|(figure_type, _)| figure_type)
    }

    /// Iterates over every figure type together with its form.
    pub fn iter(&self) -> impl Iterator<Item = (FigureType, &ElementForm)> {
        self.forms
            .iter()
            .enumerate()
            .map(|(index, form)| (FigureType::new(index as u8), form))
    }
}

/// Visible screen area that figures must stay within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    width: f32,
    height: f32,
}

impl Bounds {
    /// Creates bounds spanning `0..width` horizontally and `0..height` vertically.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent of the visible area.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent of the visible area.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Size of the visible area as a vector.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Reports whether the bounds describe a usable, non-empty area.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Reports whether a figure centered at `position` with half size `extent`
    /// lies entirely inside the bounds.
    ///
    /// Figures larger than the bounds on an axis are considered contained when
    /// they are centered on that axis.
    #[must_use]
    pub fn contains(&self, position: Vec2, extent: Vec2) -> bool {
        axis_contains(position.x, extent.x, self.width)
            && axis_contains(position.y, extent.y, self.height)
    }
}

fn axis_contains(center: f32, half: f32, length: f32) -> bool {
    const TOLERANCE: f32 = 1e-3;
    if half * 2.0 >= length {
        return (center - length / 2.0).abs() <= TOLERANCE;
    }
    center - half >= -TOLERANCE && center + half <= length + TOLERANCE
}

/// Ground-truth number of figures spawned per figure type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: BTreeMap<FigureType, u32>,
}

impl Tally {
    /// Creates a tally holding a zero count for each of the first `type_count` types.
    #[must_use]
    pub fn zeroed(type_count: u32) -> Self {
        let limit = type_count.min(u32::from(u8::MAX) + 1);
        let counts = (0..limit)
            .map(|index| (FigureType::new(index as u8), 0))
            .collect();
        Self { counts }
    }

    /// Records one more figure of the provided type.
    pub fn record(&mut self, figure_type: FigureType) {
        let count = self.counts.entry(figure_type).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Count recorded for the provided type.
    #[must_use]
    pub fn get(&self, figure_type: FigureType) -> u32 {
        self.counts.get(&figure_type).copied().unwrap_or(0)
    }

    /// Sum of all recorded counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().map(|count| u64::from(*count)).sum()
    }

    /// Number of figure types tracked by the tally.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Reports whether the tally tracks no figure types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over the counts in figure type order.
    pub fn iter(&self) -> impl Iterator<Item = (FigureType, u32)> + '_ {
        self.counts.iter().map(|(figure_type, count)| (*figure_type, *count))
    }
}

/// Events broadcast by the session while it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the session left the idle phase.
    SessionStarted {
        /// Number of figure types being tracked.
        type_count: u32,
        /// Total length of the session.
        duration: Duration,
        /// Spacing between successive spawn boundaries.
        interval: Duration,
    },
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a wave of figures was spawned.
    WaveSpawned {
        /// Identifier assigned to the wave.
        wave: WaveId,
        /// Number of figures the wave contains.
        figures: u32,
        /// Session time of the spawn boundary that produced the wave.
        spawned_at: Duration,
    },
    /// Hands the final ground truth to the scoring collaborator.
    SessionFinished {
        /// Per-type counts accumulated over the whole session.
        counts: Tally,
    },
}
