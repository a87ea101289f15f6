use std::time::Duration;

use glam::Vec2;
use memorize_core::{
    Bounds, ElementForm, FigureCanvas, FigureColor, FigureId, FigureOutline, FigurePresentation,
    FigureType, FlatShape, ImageElement, MotionTuning, Solid,
};
use memorize_figures::{extent_for, Blueprint, Body, Figure};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const FRAME: Duration = Duration::from_millis(16);

fn blueprint(form: &ElementForm, motion: Option<MotionTuning>) -> Blueprint<'_> {
    Blueprint {
        id: FigureId::new(7),
        figure_type: FigureType::new(1),
        color: FigureColor::Blue,
        form,
        motion,
    }
}

#[derive(Default)]
struct Recorder {
    drawn: Vec<FigurePresentation>,
}

impl FigureCanvas for Recorder {
    fn draw(&mut self, figure: &FigurePresentation) {
        self.drawn.push(figure.clone());
    }
}

#[test]
fn figure_at_edge_moving_outward_bounces_back() {
    let bounds = Bounds::new(200.0, 100.0);
    let extent = Vec2::splat(10.0);
    let mut figure = Figure::placed(
        FigureId::new(0),
        FigureType::new(0),
        FigureColor::Red,
        Body::Shape(FlatShape::Square),
        extent,
        Vec2::new(190.0, 10.0),
        Some(Vec2::new(300.0, -300.0)),
    );

    figure.advance(Duration::from_millis(100), bounds);

    assert!(bounds.contains(figure.position(), extent));
    assert_eq!(figure.position(), Vec2::new(190.0, 10.0));
    assert_eq!(figure.velocity(), Some(Vec2::new(-300.0, 300.0)));

    figure.advance(Duration::from_millis(100), bounds);
    let expected = Vec2::new(160.0, 40.0);
    assert!(
        figure.position().abs_diff_eq(expected, 1e-3),
        "moved to {:?}",
        figure.position()
    );
}

#[test]
fn static_figures_never_move() {
    let bounds = Bounds::new(640.0, 480.0);
    let form = ElementForm::Flat(FlatShape::Diamond);
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut figure = Figure::create(blueprint(&form, None), bounds, &mut rng);
    let before = figure.clone();

    for _ in 0..100 {
        figure.advance(FRAME, bounds);
    }

    assert_eq!(figure, before);
    assert_eq!(figure.velocity(), None);
}

#[test]
fn created_figures_fit_inside_bounds() {
    let bounds = Bounds::new(300.0, 120.0);
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let forms = [
        ElementForm::Flat(FlatShape::Octagon),
        ElementForm::Solid(Solid::Cube),
        ElementForm::Image(ImageElement {
            name: "lantern".to_owned(),
            width: 80.0,
            height: 60.0,
        }),
    ];

    for form in &forms {
        for _ in 0..200 {
            let figure = Figure::create(blueprint(form, None), bounds, &mut rng);
            assert!(
                bounds.contains(figure.position(), figure.extent()),
                "{form:?} spawned outside at {:?}",
                figure.position()
            );
        }
    }
}

#[test]
fn oversized_image_is_centered() {
    let bounds = Bounds::new(100.0, 100.0);
    let form = ElementForm::Image(ImageElement {
        name: "poster".to_owned(),
        width: 150.0,
        height: 40.0,
    });
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let figure = Figure::create(blueprint(&form, None), bounds, &mut rng);

    assert_eq!(figure.position().x, 50.0);
    assert!(bounds.contains(figure.position(), figure.extent()));
}

#[test]
fn render_is_idempotent() {
    let bounds = Bounds::new(800.0, 600.0);
    let form = ElementForm::Flat(FlatShape::Triangle);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let figure = Figure::create(blueprint(&form, None), bounds, &mut rng);
    let mut canvas = Recorder::default();

    figure.render(&mut canvas);
    figure.render(&mut canvas);

    assert_eq!(canvas.drawn.len(), 2);
    assert_eq!(canvas.drawn[0], canvas.drawn[1]);
    assert_eq!(canvas.drawn[0].figure_type, FigureType::new(1));
    assert_eq!(canvas.drawn[0].color, FigureColor::Blue);
    match &canvas.drawn[0].outline {
        FigureOutline::Polygon(points) => assert_eq!(points.len(), 3),
        other => panic!("unexpected outline: {other:?}"),
    }
}

#[test]
fn solids_spin_only_in_motion() {
    let bounds = Bounds::new(800.0, 600.0);
    let form = ElementForm::Solid(Solid::Pyramid);
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let motion = MotionTuning {
        min_speed: 0.0,
        max_speed: 0.0,
        spin_rate: 2.0,
    };
    let mut figure = Figure::create(blueprint(&form, Some(motion)), bounds, &mut rng);
    let rotation_of = |figure: &Figure| match figure.body() {
        Body::ThreeDimensional { rotation, .. } => *rotation,
        other => panic!("unexpected body: {other:?}"),
    };
    let before = rotation_of(&figure);

    figure.advance(Duration::from_millis(250), bounds);

    let turned = (rotation_of(&figure) - before).rem_euclid(std::f32::consts::TAU);
    assert!((turned - 0.5).abs() < 1e-4, "rotated by {turned}");
}

#[test]
fn extent_scales_with_shorter_side() {
    let extent = extent_for(
        &ElementForm::Flat(FlatShape::Square),
        Bounds::new(1920.0, 1080.0),
    );
    assert_eq!(extent, Vec2::splat(90.0));
}

proptest! {
    #[test]
    fn moving_figures_stay_inside_bounds(
        seed in any::<u64>(),
        width in 50.0f32..2_000.0,
        height in 50.0f32..2_000.0,
        frames in 1usize..400,
        frame_ms in 1u64..250,
    ) {
        let bounds = Bounds::new(width, height);
        let form = ElementForm::Flat(FlatShape::Square);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let motion = MotionTuning { min_speed: 50.0, max_speed: 2_000.0, spin_rate: 0.0 };
        let mut figure = Figure::create(blueprint(&form, Some(motion)), bounds, &mut rng);

        for _ in 0..frames {
            figure.advance(Duration::from_millis(frame_ms), bounds);
            prop_assert!(
                bounds.contains(figure.position(), figure.extent()),
                "escaped to {:?}",
                figure.position()
            );
        }
    }
}
