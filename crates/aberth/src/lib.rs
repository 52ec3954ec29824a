//! Simultaneous refinement of all roots of a complex polynomial.
//!
//! The Ehrlich-Aberth iteration couples a Newton step for each root with a
//! deflation sum over the current estimates of the other roots, so the
//! whole root set converges together from a warm start. Coefficients and
//! roots are passed as parallel re/im slices and refined in place; slots
//! that fail to produce a finite value keep their warm-start contents.

pub mod horner;
pub mod solve;

pub use solve::{solve, solve_tracked, MAX_COEFFS, MAX_DEGREE, MAX_ITERS, TOL_SQR};
