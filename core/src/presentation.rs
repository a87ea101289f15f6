//! Contracts between the simulation and its display and audio collaborators.

use glam::Vec2;

use crate::{FigureColor, FigureId, FigureType, Solid, WaveId};

/// Geometry a display collaborator needs to draw one figure.
#[derive(Clone, Debug, PartialEq)]
pub enum FigureOutline {
    /// Closed polygon expressed in absolute screen coordinates.
    Polygon(Vec<Vec2>),
    /// Solid centered on the figure position.
    Solid {
        /// Kind of solid to draw.
        solid: Solid,
        /// Half size of the solid's bounding square.
        extent: f32,
        /// Rotation around the vertical axis in radians.
        rotation: f32,
        /// Distance from the viewer, used for ordering and perspective.
        depth: f32,
    },
    /// Externally supplied image blitted at a rectangle.
    Image {
        /// Name of the image element.
        name: String,
        /// Upper-left corner of the image.
        top_left: Vec2,
        /// Width and height of the image.
        size: Vec2,
    },
}

/// Immutable description of a live figure for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FigurePresentation {
    /// Identifier of the presented figure.
    pub id: FigureId,
    /// Type the figure is counted under.
    pub figure_type: FigureType,
    /// Color the figure is drawn in.
    pub color: FigureColor,
    /// Center of the figure.
    pub position: Vec2,
    /// Geometry to draw.
    pub outline: FigureOutline,
}

/// Display collaborator receiving every live figure once per tick.
pub trait FigureCanvas {
    /// Called before the first figure of a frame is drawn.
    fn begin_frame(&mut self) {}

    /// Draws a single figure.
    fn draw(&mut self, figure: &FigurePresentation);

    /// Called after the last figure of a frame is drawn.
    fn end_frame(&mut self) {}
}

/// Audio collaborator signalled once per spawned wave.
///
/// Implementations must not block and must swallow their own playback
/// failures; the simulation never waits for or inspects the outcome.
pub trait SoundCue {
    /// Announces that `wave` has just appeared.
    fn wave_spawned(&mut self, wave: WaveId);
}

/// Canvas that discards everything drawn on it.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullCanvas;

impl FigureCanvas for NullCanvas {
    fn draw(&mut self, _figure: &FigurePresentation) {}
}

/// Sound cue that never plays anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl SoundCue for Silence {
    fn wave_spawned(&mut self, _wave: WaveId) {}
}
