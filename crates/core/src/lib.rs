//! Batch step driver for the animated root tracer.
//!
//! Each step reassembles the working polynomial from its curve-driven
//! coefficient sources, refines every root with the warm-started
//! Ehrlich-Aberth solver, reorders the fresh roots against their
//! predecessors so trajectories keep their identity, and projects each
//! root to a colored pixel. The host owns all buffers in a [`Memory`]
//! region bound once per animation; a bound [`Engine`] then runs
//! contiguous step spans over it without allocating.

pub mod config;
pub mod curve;
pub mod matcher;
pub mod memory;
pub mod morph;
pub mod prelude;
pub mod rng;
pub mod stepper;

pub use config::{ConfigError, MatchStrategy, MorphPath, MorphSettings, Settings};
pub use memory::{BindError, Memory};
pub use stepper::{Engine, InitError, StepError, PROGRESS_INTERVAL};
