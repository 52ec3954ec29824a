use aberth_solve::horner::eval_with_derivative;
use aberth_solve::MAX_COEFFS;
use rootflow_common::prelude::*;

use crate::rank::SCORE_INF;

const DERIV_EPS_SQR: f64 = 1e-60;

/// Per-root sensitivity to perturbations of a selected coefficient
/// subset: (sum over selected k of |z|^(degree - k)) / |p'(z)|.
///
/// The coefficients are descending-power; `selected` holds coefficient
/// indices into that layout. A vanishing derivative yields the
/// [`SCORE_INF`] sentinel so the rank pass treats the root as maximally
/// sensitive.
pub fn compute_sensitivity(
    c_re: &[f64],
    c_im: &[f64],
    root_re: &[f64],
    root_im: &[f64],
    selected: &[usize],
    out: &mut [f64],
)
{
    let n_coeffs = c_re.len().min(c_im.len());
    if n_coeffs == 0 || n_coeffs > MAX_COEFFS {
        return;
    }
    let degree = n_coeffs - 1;
    let n_roots = root_re.len().min(root_im.len()).min(out.len());

    for j in 0..n_roots {
        let z = Cplx::new(root_re[j], root_im[j]);
        let (_, dp) = eval_with_derivative(&c_re[..n_coeffs], &c_im[..n_coeffs], z);
        let dp_sqr = dp.norm_sqr();
        if dp_sqr < DERIV_EPS_SQR {
            out[j] = SCORE_INF;
            continue;
        }

        // Power ladder: one O(degree) pass instead of a powi per selected
        // index.
        let r = z.norm();
        let mut pows = [0.0; MAX_COEFFS];
        pows[0] = 1.0;
        for k in 1..=degree {
            pows[k] = pows[k - 1] * r;
        }

        let sum: f64 = selected
            .iter()
            .filter(|&&k| k <= degree)
            .map(|&k| pows[degree - k])
            .sum();
        out[j] = sum / dp_sqr.sqrt();
    }
}
