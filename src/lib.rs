//! Presentational effects for a portfolio page: loader, cursor glow,
//! typewriter, scroll-spy navigation, scroll reveal with skill counters,
//! project slider, ripple buttons with a mock contact form, and a particle
//! background.
//!
//! Every effect's state machine lives in a target-independent module and is
//! driven through the [`scheduler::Scheduler`] trait, so it runs the same
//! against the browser's timer/frame queues and against
//! [`scheduler::ManualScheduler`] in tests.

pub mod config;
pub mod error;
pub mod feedback;
pub mod navigation;
pub mod particles;
pub mod pointer;
pub mod reveal;
pub mod scheduler;
pub mod slider;
pub mod telemetry;
pub mod typewriter;

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
pub mod frontend;

pub use error::EffectError;
