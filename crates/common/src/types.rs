use num_complex::Complex64;

/// Scalar type used throughout the pipeline.
pub type Real = f64;

/// Complex scalar. Shared buffers store these as parallel re/im arrays;
/// this alias is for scalar temporaries inside the loops.
pub type Cplx = Complex64;
