use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use memorize_core::{
    Bounds, ClosingGrace, ColorPolicy, Composition, FigureVariant, ImageElement, PlayMode,
    SessionConfig, SpeedLevel, SpeedTable, Tuning,
};
use serde::Deserialize;

/// Player settings as stored in the settings file.
///
/// Missing keys fall back to the defaults of a fresh installation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Number of figure types.
    pub figures: u32,
    /// Session length in seconds.
    pub time: u32,
    /// Speed level, 1 (slowest) to 4 (fastest).
    pub speed: u8,
    /// Color difficulty: easy, medium or hard.
    pub colors: String,
    /// Whether a cue sounds for every wave.
    pub sound: bool,
    /// Static or normal (moving) figures.
    pub mode: String,
    /// Flat or 3d figures.
    pub variant: String,
    /// Seed for the session; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    /// Screen width in pixels.
    pub width: f32,
    /// Screen height in pixels.
    pub height: f32,
    /// Images used as flat elements before shapes.
    pub images: Vec<ImageElement>,
    /// Optional pacing and generation knobs.
    pub tuning: TuningSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            figures: 3,
            time: 60,
            speed: 2,
            colors: "medium".to_owned(),
            sound: false,
            mode: "static".to_owned(),
            variant: "flat".to_owned(),
            seed: None,
            width: 1920.0,
            height: 1080.0,
            images: Vec::new(),
            tuning: TuningSettings::default(),
        }
    }
}

/// Advanced knobs that are rarely changed by players.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TuningSettings {
    /// Spawn interval per speed level in milliseconds, slowest first.
    pub speed_table_ms: Option<[u64; 4]>,
    /// Whether spawning pauses half an interval before the end.
    pub closing_grace: Option<bool>,
    /// Whether every wave shows a single figure type.
    pub single_type_waves: Option<bool>,
}

/// Command-line values that take precedence over the settings file.
#[derive(Clone, Debug, Default)]
pub(crate) struct Overrides {
    pub figures: Option<u32>,
    pub time: Option<u32>,
    pub speed: Option<u8>,
    pub colors: Option<String>,
    pub sound: Option<bool>,
    pub mode: Option<String>,
    pub variant: Option<String>,
    pub seed: Option<u64>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl Settings {
    /// Reads settings from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid settings toml")
    }

    /// Replaces every value for which an override was supplied.
    pub(crate) fn apply(&mut self, overrides: Overrides) {
        let Overrides {
            figures,
            time,
            speed,
            colors,
            sound,
            mode,
            variant,
            seed,
            width,
            height,
        } = overrides;

        replace(&mut self.figures, figures);
        replace(&mut self.time, time);
        replace(&mut self.speed, speed);
        replace(&mut self.colors, colors);
        replace(&mut self.sound, sound);
        replace(&mut self.mode, mode);
        replace(&mut self.variant, variant);
        replace(&mut self.width, width);
        replace(&mut self.height, height);
        if seed.is_some() {
            self.seed = seed;
        }
    }

    /// Converts the settings into a session configuration.
    ///
    /// `fallback_seed` is used when the settings carry no seed.
    pub(crate) fn to_config(&self, fallback_seed: u64) -> Result<SessionConfig> {
        let speed_level =
            SpeedLevel::try_from(self.speed).context("invalid `speed` setting")?;
        let color_policy: ColorPolicy = self.colors.parse().context("invalid `colors` setting")?;
        let mode: PlayMode = self.mode.parse().context("invalid `mode` setting")?;
        let variant: FigureVariant = self.variant.parse().context("invalid `variant` setting")?;

        let mut tuning = Tuning::default();
        if let Some(table) = self.tuning.speed_table_ms {
            tuning.speed_table = SpeedTable::new(table.map(Duration::from_millis))
                .context("invalid `tuning.speed_table_ms` setting")?;
        }
        if let Some(grace) = self.tuning.closing_grace {
            tuning.closing_grace = if grace {
                ClosingGrace::HalfInterval
            } else {
                ClosingGrace::None
            };
        }
        if let Some(single) = self.tuning.single_type_waves {
            tuning.composition = if single {
                Composition::Single
            } else {
                Composition::Mixed
            };
        }

        Ok(SessionConfig {
            type_count: self.figures,
            duration_seconds: self.time,
            speed_level,
            color_policy,
            sound_enabled: self.sound,
            mode,
            variant,
            bounds: Bounds::new(self.width, self.height),
            seed: self.seed.unwrap_or(fallback_seed),
            images: self.images.clone(),
            tuning,
        })
    }
}

fn replace<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memorize_core::ConfigurationError;

    #[test]
    fn empty_file_yields_defaults() {
        let settings = Settings::parse("").expect("empty settings parse");
        assert_eq!(settings, Settings::default());

        let config = settings.to_config(9).expect("defaults are valid");
        assert_eq!(config.type_count, 3);
        assert_eq!(config.duration_seconds, 60);
        assert_eq!(config.speed_level, SpeedLevel::Slow);
        assert_eq!(config.color_policy, ColorPolicy::Medium);
        assert!(!config.sound_enabled);
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn file_values_and_tuning_are_applied() {
        let settings = Settings::parse(
            r#"
            figures = 4
            time = 45
            speed = 4
            colors = "Hard"
            sound = true
            mode = "normal"
            variant = "3d"
            seed = 12

            [[images]]
            name = "owl"
            width = 64.0
            height = 48.0

            [tuning]
            speed_table_ms = [10000, 8000, 6000, 4000]
            closing_grace = false
            single_type_waves = true
            "#,
        )
        .expect("valid settings");

        let config = settings.to_config(0).expect("valid config");
        assert_eq!(config.type_count, 4);
        assert_eq!(config.speed_level, SpeedLevel::Fastest);
        assert_eq!(config.color_policy, ColorPolicy::Hard);
        assert_eq!(config.mode, PlayMode::Normal);
        assert_eq!(config.variant, FigureVariant::ThreeDimensional);
        assert_eq!(config.seed, 12);
        assert_eq!(config.images.len(), 1);
        assert_eq!(config.spawn_interval(), Duration::from_secs(4));
        assert_eq!(config.tuning.closing_grace, ClosingGrace::None);
        assert_eq!(config.tuning.composition, Composition::Single);
    }

    #[test]
    fn overrides_take_precedence() {
        let mut settings = Settings::default();
        settings.apply(Overrides {
            figures: Some(2),
            colors: Some("easy".to_owned()),
            seed: Some(5),
            ..Overrides::default()
        });

        assert_eq!(settings.figures, 2);
        assert_eq!(settings.colors, "easy");
        assert_eq!(settings.seed, Some(5));
        assert_eq!(settings.time, 60);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::parse("fgures = 3").is_err());
    }

    #[test]
    fn invalid_enum_values_surface_configuration_errors() {
        let settings = Settings {
            colors: "impossible".to_owned(),
            ..Settings::default()
        };
        let error = settings.to_config(0).expect_err("unknown policy");
        assert_eq!(
            error.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::UnknownColorPolicy("impossible".to_owned()))
        );

        let settings = Settings {
            speed: 9,
            ..Settings::default()
        };
        assert!(settings.to_config(0).is_err());
    }
}
