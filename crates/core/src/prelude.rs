pub use crate::config::{ConfigError, MatchStrategy, MorphPath, MorphSettings, Settings};
pub use crate::curve::{Curve, CurveEntry};
pub use crate::memory::{BindError, Memory};
pub use crate::rng::{DitherKind, RngState};
pub use crate::stepper::{Engine, InitError, StepError};

pub use rootflow_color::{ColorMode, PaletteSet, Ramp, Rgb, Viewport};
pub use rootflow_common::prelude::*;
