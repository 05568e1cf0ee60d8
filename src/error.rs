use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    #[error("typewriter needs at least one word")]
    EmptyWordList,

    #[error("slider needs at least one slide")]
    EmptySlider,

    #[error("slide {index} is out of range for {count} slides")]
    SlideOutOfRange { index: usize, count: usize },

    #[error("invalid skill percentage: {0:?}")]
    InvalidPercentage(String),

    #[error("invalid effects config: {0}")]
    InvalidConfig(String),

    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("dom call failed: {0}")]
    Dom(String),
}
