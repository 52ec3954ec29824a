pub use crate::math::{fract, PhaseRotor};
pub use crate::types::{Cplx, Real};
