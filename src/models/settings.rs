use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::models::view::Vec2;
use crate::utils::errors::SettingsError;
use crate::utils::logger::LogLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    None,
    #[default]
    Log,
    Json,
}

/// Runtime configuration, read from `settings.toml` and `FANHAND_*` variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub image_host: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_count: usize,
    pub fetch_retries: u32,
    pub fetch_backoff_ms: u64,

    pub deck_size: usize,
    pub hand_min: usize,
    pub hand_max: usize,

    pub card_spacing: f32,
    pub arch_margin: f32,
    pub baseline_x: f32,
    pub baseline_y: f32,
    pub pivot_drop: f32,
    pub rotation_adjustment: f32,
    pub deck_x: f32,
    pub deck_y: f32,

    pub arrival_ms: u64,
    pub settle_ms: u64,
    pub stat_step_ms: u64,
    pub stat_min: i32,
    pub stat_max: i32,

    pub frame_ms: u64,
    pub seed: Option<u64>,
    pub log_level: LogLevel,
    pub sink: SinkKind,
    pub sink_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            image_host: "https://picsum.photos".to_string(),
            image_width: 100,
            image_height: 100,
            image_count: 50,
            fetch_retries: 2,
            fetch_backoff_ms: 250,

            deck_size: 40,
            hand_min: 6,
            hand_max: 6,

            card_spacing: 50.0,
            arch_margin: 10.0,
            baseline_x: 0.0,
            baseline_y: -300.0,
            pivot_drop: 300.0,
            rotation_adjustment: 270.0,
            deck_x: 0.0,
            deck_y: 0.0,

            arrival_ms: 1000,
            settle_ms: 250,
            stat_step_ms: 250,
            stat_min: -2,
            stat_max: 9,

            frame_ms: 16,
            seed: None,
            log_level: LogLevel::Info,
            sink: SinkKind::Log,
            sink_path: PathBuf::from("frames.jsonl"),
        }
    }
}

impl Settings {
    /// Loads `settings.toml` (optional) and then `FANHAND_*` environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("settings").required(false))
            .add_source(config::Environment::with_prefix("FANHAND").try_parsing(true))
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.hand_max == 0 {
            return Err(SettingsError::Invalid("hand_max must be at least 1".to_string()));
        }
        if self.hand_min > self.hand_max {
            return Err(SettingsError::Invalid(format!(
                "hand_min ({}) is greater than hand_max ({})",
                self.hand_min, self.hand_max
            )));
        }
        if self.hand_max > self.deck_size {
            return Err(SettingsError::Invalid(format!(
                "hand_max ({}) is greater than deck_size ({})",
                self.hand_max, self.deck_size
            )));
        }
        if self.stat_min > self.stat_max {
            return Err(SettingsError::Invalid(format!(
                "stat_min ({}) is greater than stat_max ({})",
                self.stat_min, self.stat_max
            )));
        }
        if self.frame_ms == 0 {
            return Err(SettingsError::Invalid("frame_ms must be positive".to_string()));
        }
        for (name, value) in [
            ("arrival_ms", self.arrival_ms),
            ("settle_ms", self.settle_ms),
            ("stat_step_ms", self.stat_step_ms),
        ] {
            if value == 0 {
                return Err(SettingsError::Invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    pub fn image_url(&self) -> String {
        format!("{}/{}/{}", self.image_host, self.image_width, self.image_height)
    }

    pub fn baseline(&self) -> Vec2 {
        Vec2::new(self.baseline_x, self.baseline_y)
    }

    pub fn deck_position(&self) -> Vec2 {
        Vec2::new(self.deck_x, self.deck_y)
    }

    pub fn arrival_duration(&self) -> Duration {
        Duration::from_millis(self.arrival_ms)
    }

    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn stat_step(&self) -> Duration {
        Duration::from_millis(self.stat_step_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_hand_range() {
        let settings = Settings {
            hand_min: 7,
            hand_max: 5,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn rejects_hand_larger_than_deck() {
        let settings = Settings {
            deck_size: 4,
            hand_min: 2,
            hand_max: 6,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zero_hand_max() {
        let settings = Settings {
            hand_min: 0,
            hand_max: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn rejects_inverted_stat_range() {
        let settings = Settings {
            stat_min: 5,
            stat_max: 4,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn accepts_single_value_stat_range() {
        let settings = Settings {
            stat_min: 3,
            stat_max: 3,
            ..Settings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn rejects_zero_frame() {
        let settings = Settings {
            frame_ms: 0,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_animation_durations() {
        for settings in [
            Settings {
                arrival_ms: 0,
                ..Settings::default()
            },
            Settings {
                settle_ms: 0,
                ..Settings::default()
            },
            Settings {
                stat_step_ms: 0,
                ..Settings::default()
            },
        ] {
            let Err(SettingsError::Invalid(message)) = settings.validate() else {
                panic!("zero duration accepted: {settings:?}");
            };
            assert!(message.ends_with("must be positive"));
        }
    }

    #[test]
    fn image_url_joins_host_and_size() {
        let settings = Settings {
            image_host: "http://localhost:8080".to_string(),
            image_width: 64,
            image_height: 32,
            ..Settings::default()
        };
        assert_eq!(settings.image_url(), "http://localhost:8080/64/32");
    }

    #[test]
    fn partial_source_keeps_remaining_defaults() {
        let settings = config::Config::builder()
            .set_override("deck_size", 12)
            .unwrap()
            .set_override("sink", "json")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.deck_size, 12);
        assert_eq!(settings.sink, SinkKind::Json);
        assert_eq!(settings.image_count, 50);
        assert_eq!(settings.stat_step(), Duration::from_millis(250));
    }
}
