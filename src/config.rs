use crate::error::EffectError;
use crate::telemetry::{LogLevel, Logger};
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_TYPEWRITER_WORDS: [&str; 3] = [
    "Machine Learning Engineer",
    "Data Scientist",
    "Full Stack Developer",
];
pub const DEFAULT_TYPEWRITER_WAIT_MS: u32 = 2_000;
pub const DEFAULT_TYPE_DELAY_MS: u32 = 200;
pub const DEFAULT_SLIDER_AUTOPLAY_MS: u32 = 5_000;
pub const DEFAULT_HEADER_SCROLL_THRESHOLD: f64 = 50.0;
pub const DEFAULT_SCROLL_TOP_THRESHOLD: f64 = 500.0;
pub const DEFAULT_SECTION_OFFSET: f64 = 100.0;
pub const DEFAULT_REVEAL_THRESHOLD: f64 = 0.15;
pub const DEFAULT_SKILL_COUNTER_DURATION_MS: u32 = 1_500;
pub const DEFAULT_RIPPLE_LIFETIME_MS: u32 = 600;
pub const DEFAULT_SUBMIT_SENDING_MS: u32 = 1_000;
pub const DEFAULT_SUBMIT_SENT_MS: u32 = 2_000;
pub const DEFAULT_PARTICLE_AREA_PER_PARTICLE: f64 = 15_000.0;
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const TYPEWRITER_WAIT_MS_BOUNDS: (u32, u32) = (100, 60_000);
const TYPE_DELAY_MS_BOUNDS: (u32, u32) = (10, 5_000);
const SLIDER_AUTOPLAY_MS_BOUNDS: (u32, u32) = (500, 120_000);
const SCROLL_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const SECTION_OFFSET_BOUNDS: (f64, f64) = (0.0, 2_000.0);
const REVEAL_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);
const SKILL_COUNTER_DURATION_MS_BOUNDS: (u32, u32) = (1, 60_000);
const RIPPLE_LIFETIME_MS_BOUNDS: (u32, u32) = (50, 10_000);
const SUBMIT_STAGE_MS_BOUNDS: (u32, u32) = (0, 60_000);
const PARTICLE_AREA_BOUNDS: (f64, f64) = (1_000.0, 1_000_000.0);

#[derive(Clone, Debug, PartialEq)]
pub struct EffectsConfig {
    pub typewriter_words: Vec<String>,
    pub typewriter_wait_ms: u32,
    pub type_delay_ms: u32,
    pub slider_autoplay_ms: u32,
    pub header_scroll_threshold: f64,
    pub scroll_top_threshold: f64,
    pub section_offset: f64,
    pub reveal_threshold: f64,
    pub skill_counter_duration_ms: u32,
    pub ripple_lifetime_ms: u32,
    pub submit_sending_ms: u32,
    pub submit_sent_ms: u32,
    pub particle_area_per_particle: f64,
    pub log_level: LogLevel,
}

/// A parsed config together with the fields that were present but rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedConfig {
    pub config: EffectsConfig,
    pub rejected: Vec<&'static str>,
}

/// Untyped field values; each one is converted and bounds-checked on its own.
#[derive(Default, Deserialize)]
struct RawEffectsConfig {
    typewriter_words: Option<Value>,
    typewriter_wait_ms: Option<Value>,
    type_delay_ms: Option<Value>,
    slider_autoplay_ms: Option<Value>,
    header_scroll_threshold: Option<Value>,
    scroll_top_threshold: Option<Value>,
    section_offset: Option<Value>,
    reveal_threshold: Option<Value>,
    skill_counter_duration_ms: Option<Value>,
    ripple_lifetime_ms: Option<Value>,
    submit_sending_ms: Option<Value>,
    submit_sent_ms: Option<Value>,
    particle_area_per_particle: Option<Value>,
    log_level: Option<Value>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            typewriter_words: DEFAULT_TYPEWRITER_WORDS
                .iter()
                .map(|word| word.to_string())
                .collect(),
            typewriter_wait_ms: DEFAULT_TYPEWRITER_WAIT_MS,
            type_delay_ms: DEFAULT_TYPE_DELAY_MS,
            slider_autoplay_ms: DEFAULT_SLIDER_AUTOPLAY_MS,
            header_scroll_threshold: DEFAULT_HEADER_SCROLL_THRESHOLD,
            scroll_top_threshold: DEFAULT_SCROLL_TOP_THRESHOLD,
            section_offset: DEFAULT_SECTION_OFFSET,
            reveal_threshold: DEFAULT_REVEAL_THRESHOLD,
            skill_counter_duration_ms: DEFAULT_SKILL_COUNTER_DURATION_MS,
            ripple_lifetime_ms: DEFAULT_RIPPLE_LIFETIME_MS,
            submit_sending_ms: DEFAULT_SUBMIT_SENDING_MS,
            submit_sent_ms: DEFAULT_SUBMIT_SENT_MS,
            particle_area_per_particle: DEFAULT_PARTICLE_AREA_PER_PARTICLE,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl EffectsConfig {
    /// Parses the page's embedded JSON config. Unknown keys are ignored and
    /// out-of-bounds values fall back to their defaults.
    pub fn from_json(raw: &str) -> Result<LoadedConfig, EffectError> {
        if raw.trim().is_empty() {
            return Ok(LoadedConfig {
                config: Self::default(),
                rejected: Vec::new(),
            });
        }

        let parsed: RawEffectsConfig = serde_json::from_str(raw)
            .map_err(|error| EffectError::InvalidConfig(error.to_string()))?;
        Ok(Self::resolve(parsed))
    }

    fn resolve(raw: RawEffectsConfig) -> LoadedConfig {
        let defaults = Self::default();
        let mut rejected = Vec::new();

        let typewriter_words = match raw.typewriter_words {
            Some(value) => {
                let words: Vec<String> = value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(|word| word.trim().to_string())
                            .filter(|word| !word.is_empty())
                            .collect()
                    })
                    .unwrap_or_default();
                if words.is_empty() {
                    rejected.push("typewriter_words");
                    defaults.typewriter_words
                } else {
                    words
                }
            }
            None => defaults.typewriter_words,
        };

        let log_level = match raw.log_level {
            Some(value) => value.as_str().and_then(LogLevel::parse).unwrap_or_else(|| {
                rejected.push("log_level");
                DEFAULT_LOG_LEVEL
            }),
            None => DEFAULT_LOG_LEVEL,
        };

        let config = Self {
            typewriter_words,
            typewriter_wait_ms: value_with_bounds(
                "typewriter_wait_ms",
                raw.typewriter_wait_ms,
                DEFAULT_TYPEWRITER_WAIT_MS,
                TYPEWRITER_WAIT_MS_BOUNDS,
                &mut rejected,
            ),
            type_delay_ms: value_with_bounds(
                "type_delay_ms",
                raw.type_delay_ms,
                DEFAULT_TYPE_DELAY_MS,
                TYPE_DELAY_MS_BOUNDS,
                &mut rejected,
            ),
            slider_autoplay_ms: value_with_bounds(
                "slider_autoplay_ms",
                raw.slider_autoplay_ms,
                DEFAULT_SLIDER_AUTOPLAY_MS,
                SLIDER_AUTOPLAY_MS_BOUNDS,
                &mut rejected,
            ),
            header_scroll_threshold: value_with_bounds(
                "header_scroll_threshold",
                raw.header_scroll_threshold,
                DEFAULT_HEADER_SCROLL_THRESHOLD,
                SCROLL_THRESHOLD_BOUNDS,
                &mut rejected,
            ),
            scroll_top_threshold: value_with_bounds(
                "scroll_top_threshold",
                raw.scroll_top_threshold,
                DEFAULT_SCROLL_TOP_THRESHOLD,
                SCROLL_THRESHOLD_BOUNDS,
                &mut rejected,
            ),
            section_offset: value_with_bounds(
                "section_offset",
                raw.section_offset,
                DEFAULT_SECTION_OFFSET,
                SECTION_OFFSET_BOUNDS,
                &mut rejected,
            ),
            reveal_threshold: value_with_bounds(
                "reveal_threshold",
                raw.reveal_threshold,
                DEFAULT_REVEAL_THRESHOLD,
                REVEAL_THRESHOLD_BOUNDS,
                &mut rejected,
            ),
            skill_counter_duration_ms: value_with_bounds(
                "skill_counter_duration_ms",
                raw.skill_counter_duration_ms,
                DEFAULT_SKILL_COUNTER_DURATION_MS,
                SKILL_COUNTER_DURATION_MS_BOUNDS,
                &mut rejected,
            ),
            ripple_lifetime_ms: value_with_bounds(
                "ripple_lifetime_ms",
                raw.ripple_lifetime_ms,
                DEFAULT_RIPPLE_LIFETIME_MS,
                RIPPLE_LIFETIME_MS_BOUNDS,
                &mut rejected,
            ),
            submit_sending_ms: value_with_bounds(
                "submit_sending_ms",
                raw.submit_sending_ms,
                DEFAULT_SUBMIT_SENDING_MS,
                SUBMIT_STAGE_MS_BOUNDS,
                &mut rejected,
            ),
            submit_sent_ms: value_with_bounds(
                "submit_sent_ms",
                raw.submit_sent_ms,
                DEFAULT_SUBMIT_SENT_MS,
                SUBMIT_STAGE_MS_BOUNDS,
                &mut rejected,
            ),
            particle_area_per_particle: value_with_bounds(
                "particle_area_per_particle",
                raw.particle_area_per_particle,
                DEFAULT_PARTICLE_AREA_PER_PARTICLE,
                PARTICLE_AREA_BOUNDS,
                &mut rejected,
            ),
            log_level,
        };

        LoadedConfig { config, rejected }
    }

    pub fn logger(&self) -> Logger {
        Logger::new(self.log_level)
    }
}

trait ConfigNumber: PartialOrd + Copy {
    fn from_json_value(value: &Value) -> Option<Self>;
}

impl ConfigNumber for u32 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|value| u32::try_from(value).ok())
    }
}

impl ConfigNumber for f64 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_f64().filter(|value| value.is_finite())
    }
}

fn value_with_bounds<T: ConfigNumber>(
    name: &'static str,
    value: Option<Value>,
    default: T,
    bounds: (T, T),
    rejected: &mut Vec<&'static str>,
) -> T {
    let Some(value) = value else {
        return default;
    };

    match T::from_json_value(&value) {
        Some(value) if value >= bounds.0 && value <= bounds.1 => value,
        _ => {
            rejected.push(name);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_defaults() {
        let loaded = EffectsConfig::from_json("   ").expect("blank config is accepted");

        assert_eq!(loaded.config, EffectsConfig::default());
        assert!(loaded.rejected.is_empty());
    }

    #[test]
    fn in_bounds_values_are_kept() {
        let loaded = EffectsConfig::from_json(
            r#"{"slider_autoplay_ms": 8000, "reveal_threshold": 0.3, "log_level": "debug"}"#,
        )
        .expect("valid config");

        assert_eq!(loaded.config.slider_autoplay_ms, 8_000);
        assert_eq!(loaded.config.reveal_threshold, 0.3);
        assert_eq!(loaded.config.log_level, LogLevel::Debug);
        assert!(loaded.rejected.is_empty());
    }

    #[test]
    fn out_of_bounds_values_fall_back_to_defaults() {
        let loaded = EffectsConfig::from_json(
            r#"{"slider_autoplay_ms": 10, "reveal_threshold": 1.5, "log_level": "loud"}"#,
        )
        .expect("valid json");

        assert_eq!(loaded.config.slider_autoplay_ms, DEFAULT_SLIDER_AUTOPLAY_MS);
        assert_eq!(loaded.config.reveal_threshold, DEFAULT_REVEAL_THRESHOLD);
        assert_eq!(loaded.config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(
            loaded.rejected,
            vec!["log_level", "slider_autoplay_ms", "reveal_threshold"]
        );
    }

    #[test]
    fn blank_word_list_is_rejected() {
        let loaded = EffectsConfig::from_json(r#"{"typewriter_words": ["  ", ""]}"#)
            .expect("valid json");

        assert_eq!(loaded.config.typewriter_words.len(), DEFAULT_TYPEWRITER_WORDS.len());
        assert_eq!(loaded.rejected, vec!["typewriter_words"]);
    }

    #[test]
    fn mistyped_numbers_fall_back_without_losing_valid_fields() {
        let loaded = EffectsConfig::from_json(
            r#"{"slider_autoplay_ms": 8000, "typewriter_wait_ms": -5, "type_delay_ms": 150.5, "section_offset": "far"}"#,
        )
        .expect("valid json");

        assert_eq!(loaded.config.slider_autoplay_ms, 8_000);
        assert_eq!(loaded.config.typewriter_wait_ms, DEFAULT_TYPEWRITER_WAIT_MS);
        assert_eq!(loaded.config.type_delay_ms, DEFAULT_TYPE_DELAY_MS);
        assert_eq!(loaded.config.section_offset, DEFAULT_SECTION_OFFSET);
        assert_eq!(
            loaded.rejected,
            vec!["typewriter_wait_ms", "type_delay_ms", "section_offset"]
        );
    }

    #[test]
    fn mistyped_words_and_level_fall_back() {
        let loaded = EffectsConfig::from_json(
            r#"{"typewriter_words": "Engineer", "log_level": 3, "reveal_threshold": 0.5}"#,
        )
        .expect("valid json");

        assert_eq!(loaded.config.typewriter_words.len(), DEFAULT_TYPEWRITER_WORDS.len());
        assert_eq!(loaded.config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(loaded.config.reveal_threshold, 0.5);
        assert_eq!(loaded.rejected, vec!["typewriter_words", "log_level"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let result = EffectsConfig::from_json("{not json");

        assert!(matches!(result, Err(EffectError::InvalidConfig(_))));
    }
}
