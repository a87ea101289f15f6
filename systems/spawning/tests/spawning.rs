use std::time::Duration;

use memorize_core::{ClosingGrace, Event, SessionConfig, SpeedLevel};
use memorize_system_spawning::{Config, Spawning};

fn advance(spawning: &mut Spawning, dt: Duration) -> Vec<Duration> {
    let mut boundaries = Vec::new();
    spawning.handle(&[Event::TimeAdvanced { dt }], &mut boundaries);
    boundaries
}

#[test]
fn emits_multiple_boundaries_for_large_dt() {
    let mut spawning = Spawning::new(Config::new(
        Duration::from_millis(500),
        Duration::from_secs(10),
        ClosingGrace::None,
    ));

    let boundaries = advance(&mut spawning, Duration::from_secs(2));

    assert_eq!(
        boundaries,
        vec![
            Duration::from_millis(500),
            Duration::from_millis(1_000),
            Duration::from_millis(1_500),
            Duration::from_millis(2_000),
        ]
    );
    assert_eq!(spawning.next_boundary(), Some(Duration::from_millis(2_500)));
}

#[test]
fn no_boundary_before_first_interval() {
    let mut spawning = Spawning::new(Config::new(
        Duration::from_secs(1),
        Duration::from_secs(10),
        ClosingGrace::None,
    ));

    assert!(advance(&mut spawning, Duration::from_millis(999)).is_empty());
    assert_eq!(
        advance(&mut spawning, Duration::from_millis(1)),
        vec![Duration::from_secs(1)]
    );
}

#[test]
fn accumulates_every_time_event_in_a_batch() {
    let mut spawning = Spawning::new(Config::new(
        Duration::from_secs(1),
        Duration::from_secs(10),
        ClosingGrace::None,
    ));
    let mut boundaries = Vec::new();

    spawning.handle(
        &[
            Event::TimeAdvanced {
                dt: Duration::from_millis(600),
            },
            Event::WaveSpawned {
                wave: memorize_core::WaveId::new(0),
                figures: 2,
                spawned_at: Duration::ZERO,
            },
            Event::TimeAdvanced {
                dt: Duration::from_millis(600),
            },
        ],
        &mut boundaries,
    );

    assert_eq!(boundaries, vec![Duration::from_secs(1)]);
    assert_eq!(spawning.next_boundary(), Some(Duration::from_secs(2)));
}

#[test]
fn stops_at_session_end() {
    let mut spawning = Spawning::new(Config::new(
        Duration::from_secs(2),
        Duration::from_secs(6),
        ClosingGrace::None,
    ));

    let boundaries = advance(&mut spawning, Duration::from_secs(60));

    assert_eq!(
        boundaries,
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
    assert_eq!(spawning.next_boundary(), None);
    assert!(advance(&mut spawning, Duration::from_secs(60)).is_empty());
}

#[test]
fn closing_grace_skips_late_boundaries() {
    let config = Config::new(
        Duration::from_secs(4),
        Duration::from_secs(10),
        ClosingGrace::HalfInterval,
    );
    let mut spawning = Spawning::new(config);

    let boundaries = advance(&mut spawning, Duration::from_secs(10));

    assert_eq!(
        boundaries,
        vec![Duration::from_secs(4), Duration::from_secs(8)]
    );
    assert_eq!(spawning.planned_waves(), 2);

    let tight = Config::new(
        Duration::from_secs(4),
        Duration::from_secs(9),
        ClosingGrace::HalfInterval,
    );
    assert_eq!(Spawning::new(tight).planned_waves(), 1);
}

#[test]
fn interval_longer_than_session_never_spawns() {
    let config = SessionConfig {
        type_count: 1,
        duration_seconds: 1,
        speed_level: SpeedLevel::Slowest,
        ..SessionConfig::default()
    };
    let mut spawning = Spawning::new(Config::for_session(&config));

    assert_eq!(spawning.planned_waves(), 0);
    assert_eq!(spawning.next_boundary(), None);
    assert!(advance(&mut spawning, Duration::from_secs(5)).is_empty());
}

#[test]
fn planned_waves_respect_wave_limit() {
    for speed_level in SpeedLevel::ALL {
        for duration_seconds in [1, 5, 10, 14, 30, 60, 120] {
            for closing_grace in [ClosingGrace::None, ClosingGrace::HalfInterval] {
                let mut config = SessionConfig {
                    duration_seconds,
                    speed_level,
                    ..SessionConfig::default()
                };
                config.tuning.closing_grace = closing_grace;

                let mut spawning = Spawning::new(Config::for_session(&config));
                let mut crossed = 0;
                for _ in 0..(duration_seconds * 60) {
                    crossed += advance(&mut spawning, Duration::from_micros(16_667)).len();
                }
                crossed += advance(&mut spawning, Duration::from_secs(1)).len();

                assert!(spawning.planned_waves() <= config.wave_limit());
                assert_eq!(crossed, spawning.planned_waves() as usize);
            }
        }
    }
}

#[test]
fn fastest_speed_spawns_within_ten_seconds() {
    let config = SessionConfig {
        duration_seconds: 10,
        speed_level: SpeedLevel::Fastest,
        ..SessionConfig::default()
    };
    let mut spawning = Spawning::new(Config::for_session(&config));

    let boundaries = advance(&mut spawning, Duration::from_secs(10));

    assert_eq!(
        boundaries,
        vec![Duration::from_millis(3_500), Duration::from_millis(7_000)]
    );
}

#[test]
fn identical_schedules_replay_identically() {
    let config = Config::new(
        Duration::from_millis(4_667),
        Duration::from_secs(60),
        ClosingGrace::HalfInterval,
    );
    let steps = [16, 33, 250, 1_000, 7, 4_667, 12_000, 3];

    let run = || {
        let mut spawning = Spawning::new(config);
        let mut boundaries = Vec::new();
        for step in steps.iter().cycle().take(200) {
            spawning.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_millis(*step),
                }],
                &mut boundaries,
            );
        }
        boundaries
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
    assert!(first.windows(2).all(|pair| pair[0] < pair[1]));
}
