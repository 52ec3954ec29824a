use num_complex::Complex64;
use num_traits::Zero;

/// Evaluate p(z) and p'(z) in a single pass over descending-power
/// coefficients, interleaving the derivative recurrence `d <- d*z + p`
/// before the value recurrence `p <- p*z + c[k]`.
///
/// The coefficient slices must be non-empty and of equal length.
#[must_use]
pub fn eval_with_derivative(c_re: &[f64], c_im: &[f64], z: Complex64) -> (Complex64, Complex64)
{
    let mut p = Complex64::new(c_re[0], c_im[0]);
    let mut dp = Complex64::zero();
    for k in 1..c_re.len() {
        dp = dp * z + p;
        p = p * z + Complex64::new(c_re[k], c_im[k]);
    }
    (p, dp)
}
