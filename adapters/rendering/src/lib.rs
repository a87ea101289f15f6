#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for memorize adapters.
//!
//! The session draws figures through [`FigureCanvas`]; this crate provides
//! canvases adapters can reuse and the [`RenderingBackend`] seam a frontend
//! implements to own the frame loop.

use std::{error::Error, fmt, ops::ControlFlow, time::Duration};

use anyhow::Result as AnyResult;
use glam::Vec2;
use memorize_core::{Bounds, FigureCanvas, FigureColor, FigureOutline, FigurePresentation, Rgb};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

impl From<FigureColor> for Color {
    fn from(color: FigureColor) -> Self {
        color.rgb().into()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window or printed as a header.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Visible area figures are placed in.
    pub bounds: Bounds,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, bounds: Bounds) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            bounds,
        }
    }
}

/// Rendering backend capable of driving a memorize session.
pub trait RenderingBackend {
    /// Runs the backend until `update_frame` breaks or the backend is closed.
    ///
    /// The closure receives the frame delta and the canvas to draw the frame
    /// onto; the backend owns pacing and presentation.
    fn run<F>(self, presentation: Presentation, update_frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut dyn FigureCanvas) -> ControlFlow<()>;
}

/// Canvas that counts frames and figures before forwarding to another canvas.
#[derive(Clone, Debug, Default)]
pub struct FrameCounter<C> {
    inner: C,
    frames: u64,
    pending: usize,
    last_frame_figures: usize,
    peak_figures: usize,
}

impl<C: FigureCanvas> FrameCounter<C> {
    /// Wraps `inner`; every call is forwarded to it.
    #[must_use]
    pub const fn new(inner: C) -> Self {
        Self {
            inner,
            frames: 0,
            pending: 0,
            last_frame_figures: 0,
            peak_figures: 0,
        }
    }

    /// Canvas receiving the forwarded frames.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.inner
    }

    /// Number of frames completed so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Figures drawn in the most recently completed frame.
    #[must_use]
    pub const fn last_frame_figures(&self) -> usize {
        self.last_frame_figures
    }

    /// Most figures drawn in any completed frame.
    #[must_use]
    pub const fn peak_figures(&self) -> usize {
        self.peak_figures
    }
}

impl<C: FigureCanvas> FigureCanvas for FrameCounter<C> {
    fn begin_frame(&mut self) {
        self.pending = 0;
        self.inner.begin_frame();
    }

    fn draw(&mut self, figure: &FigurePresentation) {
        self.pending = self.pending.saturating_add(1);
        self.inner.draw(figure);
    }

    fn end_frame(&mut self) {
        self.inner.end_frame();
        self.last_frame_figures = self.pending;
        self.peak_figures = self.peak_figures.max(self.pending);
        self.frames = self.frames.saturating_add(1);
    }
}

/// Coarse character raster of the visible area.
///
/// Each cell shows the glyph of the last figure covering its center: `A` for
/// the first figure type, `B` for the second and so on. Empty cells are
/// blank.
#[derive(Clone, Debug, PartialEq)]
pub struct TextCanvas {
    columns: usize,
    rows: usize,
    bounds: Bounds,
    cells: Vec<char>,
}

impl TextCanvas {
    /// Glyph used for cells no figure covers.
    pub const EMPTY: char = ' ';

    /// Creates a raster of `columns` by `rows` cells covering `bounds`.
    pub fn new(columns: usize, rows: usize, bounds: Bounds) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyRaster { columns, rows });
        }
        if !bounds.is_valid() {
            return Err(RenderingError::InvalidBounds);
        }

        Ok(Self {
            columns,
            rows,
            bounds,
            cells: vec![Self::EMPTY; columns * rows],
        })
    }

    /// Glyph drawn at `column`, `row`, or `None` outside the raster.
    #[must_use]
    pub fn glyph(&self, column: usize, row: usize) -> Option<char> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + column).copied()
    }

    /// Rows of the raster joined by newlines.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.columns)
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cell_center(&self, column: usize, row: usize) -> Vec2 {
        let cell = self.bounds.size() / Vec2::new(self.columns as f32, self.rows as f32);
        Vec2::new(column as f32 + 0.5, row as f32 + 0.5) * cell
    }
}

impl FigureCanvas for TextCanvas {
    fn begin_frame(&mut self) {
        self.cells.fill(Self::EMPTY);
    }

    fn draw(&mut self, figure: &FigurePresentation) {
        let glyph = type_glyph(figure);
        for row in 0..self.rows {
            for column in 0..self.columns {
                if covers(&figure.outline, figure.position, self.cell_center(column, row)) {
                    self.cells[row * self.columns + column] = glyph;
                }
            }
        }
    }
}

fn type_glyph(figure: &FigurePresentation) -> char {
    char::from(b'A'.saturating_add(figure.figure_type.index()))
}

fn covers(outline: &FigureOutline, center: Vec2, point: Vec2) -> bool {
    match outline {
        FigureOutline::Polygon(points) => polygon_contains(points, point),
        FigureOutline::Solid { extent, .. } => {
            let offset = (point - center).abs();
            offset.x <= *extent && offset.y <= *extent
        }
        FigureOutline::Image { top_left, size, .. } => {
            let bottom_right = *top_left + *size;
            point.cmpge(*top_left).all() && point.cmple(bottom_right).all()
        }
    }
}

fn polygon_contains(points: &[Vec2], point: Vec2) -> bool {
    let mut inside = false;
    let mut previous = match points.last() {
        Some(last) => *last,
        None => return false,
    };
    for current in points {
        let crosses = (current.y > point.y) != (previous.y > point.y);
        if crosses {
            let t = (point.y - current.y) / (previous.y - current.y);
            if point.x < current.x + t * (previous.x - current.x) {
                inside = !inside;
            }
        }
        previous = *current;
    }
    inside
}

/// Errors that can occur when constructing rendering helpers.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A raster needs at least one column and one row.
    EmptyRaster {
        /// Requested number of columns.
        columns: usize,
        /// Requested number of rows.
        rows: usize,
    },
    /// The area covered by a raster must be finite and positive.
    InvalidBounds,
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRaster { columns, rows } => {
                write!(f, "raster must not be empty (received {columns}x{rows})")
            }
            Self::InvalidBounds => f.write_str("raster bounds must be finite and positive"),
        }
    }
}

impl Error for RenderingError {}
