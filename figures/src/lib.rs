#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Countable on-screen figures and their motion.
//!
//! A [`Figure`] is created once by the wave generator, optionally drifts
//! across the visible area while the session runs, and describes itself to
//! the display collaborator as a [`FigurePresentation`] every frame.

use std::{f32::consts::TAU, time::Duration};

use glam::Vec2;
use memorize_core::{
    Bounds, ElementForm, FigureCanvas, FigureColor, FigureId, FigureOutline, FigurePresentation,
    FigureType, FlatShape, ImageElement, MotionTuning, Solid,
};
use rand::Rng;

const SOLID_DEPTH_MIN: f32 = 60.0;
const SOLID_DEPTH_MAX: f32 = 90.0;

/// Everything the wave generator decides about a figure before it exists.
#[derive(Clone, Debug)]
pub struct Blueprint<'a> {
    /// Identifier to assign.
    pub id: FigureId,
    /// Type the figure is counted under.
    pub figure_type: FigureType,
    /// Color resolved from the session's color policy.
    pub color: FigureColor,
    /// Element the figure type is presented as.
    pub form: &'a ElementForm,
    /// Motion parameters, or `None` for a static figure.
    pub motion: Option<MotionTuning>,
}

/// Variant-specific state of a figure.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    /// Polygon drawn flat on the screen.
    Shape(FlatShape),
    /// Externally supplied image.
    Image(ImageElement),
    /// Solid rendered with depth and rotation.
    ThreeDimensional {
        /// Kind of solid.
        solid: Solid,
        /// Current rotation in radians.
        rotation: f32,
        /// Rotation speed in radians per second; zero for static figures.
        spin_rate: f32,
        /// Distance from the viewer.
        depth: f32,
    },
}

/// A single countable visual unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    id: FigureId,
    figure_type: FigureType,
    color: FigureColor,
    position: Vec2,
    velocity: Option<Vec2>,
    extent: Vec2,
    body: Body,
}

impl Figure {
    /// Creates a figure at a uniformly random position that keeps its whole
    /// extent inside `bounds`.
    ///
    /// Axes on which the figure is larger than the bounds are centered
    /// instead. A motion blueprint also draws a random heading and speed.
    pub fn create<R: Rng + ?Sized>(blueprint: Blueprint<'_>, bounds: Bounds, rng: &mut R) -> Self {
        let extent = extent_for(blueprint.form, bounds);
        let position = Vec2::new(
            sample_axis(rng, extent.x, bounds.width()),
            sample_axis(rng, extent.y, bounds.height()),
        );
        let velocity = blueprint.motion.map(|motion| sample_velocity(rng, motion));
        let body = match blueprint.form {
            ElementForm::Flat(shape) => Body::Shape(*shape),
            ElementForm::Image(image) => Body::Image(image.clone()),
            ElementForm::Solid(solid) => Body::ThreeDimensional {
                solid: *solid,
                rotation: rng.gen_range(0.0..TAU),
                spin_rate: blueprint.motion.map_or(0.0, |motion| motion.spin_rate),
                depth: rng.gen_range(SOLID_DEPTH_MIN..SOLID_DEPTH_MAX),
            },
        };

        Self {
            id: blueprint.id,
            figure_type: blueprint.figure_type,
            color: blueprint.color,
            position,
            velocity,
            extent,
            body,
        }
    }

    /// Creates a figure at an exact position and velocity.
    ///
    /// The position is not clamped; callers placing figures by hand are
    /// responsible for keeping them inside the bounds they advance against.
    #[must_use]
    pub fn placed(
        id: FigureId,
        figure_type: FigureType,
        color: FigureColor,
        body: Body,
        extent: Vec2,
        position: Vec2,
        velocity: Option<Vec2>,
    ) -> Self {
        Self {
            id,
            figure_type,
            color,
            position,
            velocity,
            extent,
            body,
        }
    }

    /// Identifier of the figure.
    #[must_use]
    pub const fn id(&self) -> FigureId {
        self.id
    }

    /// Type the figure is counted under.
    #[must_use]
    pub const fn figure_type(&self) -> FigureType {
        self.figure_type
    }

    /// Color the figure is drawn in.
    #[must_use]
    pub const fn color(&self) -> FigureColor {
        self.color
    }

    /// Center of the figure.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Velocity in screen units per second, `None` for static figures.
    #[must_use]
    pub const fn velocity(&self) -> Option<Vec2> {
        self.velocity
    }

    /// Half width and half height of the figure.
    #[must_use]
    pub const fn extent(&self) -> Vec2 {
        self.extent
    }

    /// Variant-specific state.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Moves the figure by `velocity * dt`, bouncing off the edges of `bounds`.
    ///
    /// A component that carries the figure past an edge is reflected to point
    /// back inside and the position is clamped to that edge. Static figures
    /// are left untouched.
    pub fn advance(&mut self, dt: Duration, bounds: Bounds) {
        let Some(velocity) = self.velocity.as_mut() else {
            return;
        };

        let seconds = dt.as_secs_f32();
        let mut position = self.position + *velocity * seconds;
        reflect_axis(&mut position.x, &mut velocity.x, self.extent.x, bounds.width());
        reflect_axis(&mut position.y, &mut velocity.y, self.extent.y, bounds.height());
        self.position = position;

        if let Body::ThreeDimensional {
            rotation,
            spin_rate,
            ..
        } = &mut self.body
        {
            *rotation = (*rotation + *spin_rate * seconds).rem_euclid(TAU);
        }
    }

    /// Draws the figure onto the provided canvas.
    pub fn render<C: FigureCanvas + ?Sized>(&self, canvas: &mut C) {
        canvas.draw(&self.presentation());
    }

    /// Describes the figure as it should appear this frame.
    #[must_use]
    pub fn presentation(&self) -> FigurePresentation {
        let outline = match &self.body {
            Body::Shape(shape) => {
                FigureOutline::Polygon(polygon(*shape, self.position, self.extent.x))
            }
            Body::Image(image) => FigureOutline::Image {
                name: image.name.clone(),
                top_left: self.position - self.extent,
                size: self.extent * 2.0,
            },
            Body::ThreeDimensional {
                solid,
                rotation,
                depth,
                ..
            } => FigureOutline::Solid {
                solid: *solid,
                extent: self.extent.x,
                rotation: *rotation,
                depth: *depth,
            },
        };

        FigurePresentation {
            id: self.id,
            figure_type: self.figure_type,
            color: self.color,
            position: self.position,
            outline,
        }
    }
}

/// Half size of a figure presented as `form` on a screen of size `bounds`.
///
/// Shapes and solids take a quarter of a third of the shorter screen side;
/// images keep their own size.
#[must_use]
pub fn extent_for(form: &ElementForm, bounds: Bounds) -> Vec2 {
    match form {
        ElementForm::Image(image) => Vec2::new(image.width, image.height) / 2.0,
        ElementForm::Flat(_) | ElementForm::Solid(_) => {
            let side = (bounds.width() / 3.0).min(bounds.height() / 3.0) / 4.0;
            Vec2::splat(side)
        }
    }
}

/// Outline of a flat shape centered at `center` with half size `size`.
#[must_use]
pub fn polygon(shape: FlatShape, center: Vec2, size: f32) -> Vec<Vec2> {
    let (x, y, s) = (center.x, center.y, size);
    let points: &[(f32, f32)] = match shape {
        FlatShape::Diamond => &[(x, y - s), (x - s, y), (x, y + s), (x + s, y)],
        FlatShape::Square => &[(x - s, y - s), (x - s, y + s), (x + s, y + s), (x + s, y - s)],
        FlatShape::Triangle => &[(x - s, y + s), (x + s, y + s), (x, y - s)],
        FlatShape::Octagon => &[
            (x - s, y + s / 2.0),
            (x - s, y - s / 2.0),
            (x - s / 2.0, y - s),
            (x + s / 2.0, y - s),
            (x + s, y - s / 2.0),
            (x + s, y + s / 2.0),
            (x + s / 2.0, y + s),
            (x - s / 2.0, y + s),
        ],
    };
    points.iter().map(|(px, py)| Vec2::new(*px, *py)).collect()
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, half: f32, length: f32) -> f32 {
    if half * 2.0 >= length {
        return length / 2.0;
    }
    rng.gen_range(half..=length - half)
}

fn sample_velocity<R: Rng + ?Sized>(rng: &mut R, motion: MotionTuning) -> Vec2 {
    let heading = rng.gen_range(0.0..TAU);
    let speed = if motion.max_speed > motion.min_speed {
        rng.gen_range(motion.min_speed..=motion.max_speed)
    } else {
        motion.min_speed
    };
    Vec2::from_angle(heading) * speed
}

fn reflect_axis(center: &mut f32, velocity: &mut f32, half: f32, length: f32) {
    if half * 2.0 >= length {
        *center = length / 2.0;
        *velocity = 0.0;
        return;
    }

    let (low, high) = (half, length - half);
    if *center <= low {
        *center = low;
        *velocity = velocity.abs();
    } else if *center >= high {
        *center = high;
        *velocity = -velocity.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_axis_bounces_off_low_edge() {
        let (mut center, mut velocity) = (-3.0, -10.0);
        reflect_axis(&mut center, &mut velocity, 5.0, 100.0);
        assert_eq!(center, 5.0);
        assert_eq!(velocity, 10.0);
    }

    #[test]
    fn reflect_axis_bounces_off_high_edge() {
        let (mut center, mut velocity) = (120.0, 4.0);
        reflect_axis(&mut center, &mut velocity, 5.0, 100.0);
        assert_eq!(center, 95.0);
        assert_eq!(velocity, -4.0);
    }

    #[test]
    fn reflect_axis_pins_oversized_figures() {
        let (mut center, mut velocity) = (2.0, 4.0);
        reflect_axis(&mut center, &mut velocity, 60.0, 100.0);
        assert_eq!(center, 50.0);
        assert_eq!(velocity, 0.0);
    }

    #[test]
    fn triangle_outline_matches_reference_points() {
        let points = polygon(FlatShape::Triangle, Vec2::new(10.0, 10.0), 2.0);
        assert_eq!(
            points,
            vec![Vec2::new(8.0, 12.0), Vec2::new(12.0, 12.0), Vec2::new(10.0, 8.0)]
        );
    }

    #[test]
    fn octagon_has_eight_vertices() {
        assert_eq!(polygon(FlatShape::Octagon, Vec2::ZERO, 1.0).len(), 8);
    }
}
