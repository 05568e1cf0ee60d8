use crate::error::EffectError;
use crate::scheduler::{FrameLoop, Scheduler};
use std::rc::Rc;

pub const REVEAL_BASE_CLASS: &str = "section-reveal";
pub const REVEALED_CLASS: &str = "active";
pub const SKILLS_SECTION_ID: &str = "skills";

/// One-shot visibility latch for a watched element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealGate {
    threshold: f64,
    revealed: bool,
}

impl RevealGate {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            revealed: false,
        }
    }

    /// Returns `true` only for the observation that reveals the element.
    /// Once revealed the caller stops watching; later observations are
    /// ignored.
    pub fn observe(&mut self, intersecting: bool, ratio: f64) -> bool {
        if self.revealed || !intersecting || ratio < self.threshold {
            return false;
        }

        self.revealed = true;
        true
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn class(&self) -> Option<&'static str> {
        self.revealed.then_some(REVEALED_CLASS)
    }
}

/// Reads a skill bar's `data-percentage` value.
pub fn parse_percentage(raw: &str) -> Result<u32, EffectError> {
    let trimmed = raw.trim().trim_end_matches('%').trim();

    match trimmed.parse::<u32>() {
        Ok(value) if value <= 100 => Ok(value),
        _ => Err(EffectError::InvalidPercentage(raw.to_string())),
    }
}

pub fn percent_label(value: u32) -> String {
    format!("{value}%")
}

/// Frame-timestamp driven counter from 0 to `target` over `duration_ms`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillCounter {
    target: u32,
    duration_ms: f64,
    started_at: Option<f64>,
}

impl SkillCounter {
    pub fn new(target: u32, duration_ms: f64) -> Self {
        Self {
            target,
            duration_ms: duration_ms.max(1.0),
            started_at: None,
        }
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    /// Value to display at `timestamp`; the first sample fixes the start.
    /// The second field is `false` once the counter has reached its end.
    pub fn sample(&mut self, timestamp: f64) -> (u32, bool) {
        let started_at = *self.started_at.get_or_insert(timestamp);
        let elapsed = (timestamp - started_at).max(0.0);

        let scaled = (elapsed / self.duration_ms * f64::from(self.target)).floor();
        let value = if scaled >= f64::from(self.target) {
            self.target
        } else {
            scaled as u32
        };

        (value, elapsed < self.duration_ms)
    }
}

/// Runs a counter to completion on the frame queue. Not cancellable once
/// started.
pub fn animate_counter(
    scheduler: Rc<dyn Scheduler>,
    mut counter: SkillCounter,
    mut on_value: impl FnMut(u32) + 'static,
) {
    FrameLoop::start(scheduler, move |timestamp| {
        let (value, running) = counter.sample(timestamp);
        on_value(value);
        running
    })
    .detach();
}
