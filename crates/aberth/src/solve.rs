use num_complex::Complex64;
use num_traits::Zero;

use crate::horner::eval_with_derivative;

/// Hard cap on the polynomial degree; one byte must fit a per-root
/// iteration count.
pub const MAX_DEGREE: usize = 255;

/// Maximum number of coefficients, leading term included.
pub const MAX_COEFFS: usize = MAX_DEGREE + 1;

/// Sweep cap for a single solve.
pub const MAX_ITERS: usize = 64;

/// Squared-magnitude tolerance on the largest per-sweep correction.
pub const TOL_SQR: f64 = 1e-16;

/// Leading coefficients below this squared magnitude are stripped.
const LEADING_EPS_SQR: f64 = 1e-30;

/// Denominators below this squared magnitude abort the affected term.
const DENOM_EPS_SQR: f64 = 1e-60;

/// Refine the warm-start roots of the polynomial given by descending-power
/// coefficient slices, in place.
///
/// Leading near-zero coefficients are skipped internally; the caller's
/// buffers keep their declared degree and the first `effective degree`
/// root slots are the ones refined. A root slot is only written when the
/// refined value has no NaN component, so a lost root keeps its previous
/// trajectory. Inputs beyond [`MAX_COEFFS`] coefficients are left
/// untouched.
pub fn solve(c_re: &[f64], c_im: &[f64], root_re: &mut [f64], root_im: &mut [f64])
{
    solve_impl(c_re, c_im, root_re, root_im, None);
}

/// Same refinement, additionally recording per root the sweep at which its
/// correction first fell below tolerance. A converged root is frozen for
/// the remaining sweeps; roots still live when the global tolerance is met
/// inherit that sweep's count, and roots that never converge report
/// [`MAX_ITERS`].
pub fn solve_tracked(
    c_re: &[f64],
    c_im: &[f64],
    root_re: &mut [f64],
    root_im: &mut [f64],
    iter_counts: &mut [u8],
)
{
    solve_impl(c_re, c_im, root_re, root_im, Some(iter_counts));
}

fn sqr_mag(re: f64, im: f64) -> f64
{
    re * re + im * im
}

fn solve_impl(
    c_re: &[f64],
    c_im: &[f64],
    warm_re: &mut [f64],
    warm_im: &mut [f64],
    mut iter_counts: Option<&mut [u8]>,
)
{
    let n_coeffs = c_re.len().min(c_im.len());
    if n_coeffs == 0 || n_coeffs > MAX_COEFFS {
        return;
    }

    let mut start = 0;
    while start < n_coeffs - 1 && sqr_mag(c_re[start], c_im[start]) < LEADING_EPS_SQR {
        start += 1;
    }
    let degree = n_coeffs - 1 - start;
    if degree == 0 || warm_re.len() < degree || warm_im.len() < degree {
        return;
    }
    if let Some(counts) = &iter_counts {
        if counts.len() < degree {
            return;
        }
    }

    // Linear case: a*z + b = 0.
    if degree == 1 {
        let a = Complex64::new(c_re[start], c_im[start]);
        let b = Complex64::new(c_re[start + 1], c_im[start + 1]);
        let denom = a.norm_sqr();
        if denom < LEADING_EPS_SQR {
            return;
        }
        let z = -(b * a.conj()) / denom;
        warm_re[0] = z.re;
        warm_im[0] = z.im;
        if let Some(counts) = iter_counts.as_deref_mut() {
            counts[0] = 1;
        }
        return;
    }

    let n = n_coeffs - start;
    let mut cr = [0.0; MAX_COEFFS];
    let mut ci = [0.0; MAX_COEFFS];
    cr[..n].copy_from_slice(&c_re[start..start + n]);
    ci[..n].copy_from_slice(&c_im[start..start + n]);

    let mut z_re = [0.0; MAX_DEGREE];
    let mut z_im = [0.0; MAX_DEGREE];
    z_re[..degree].copy_from_slice(&warm_re[..degree]);
    z_im[..degree].copy_from_slice(&warm_im[..degree]);

    // Consulted only when iteration tracking is on.
    let mut frozen = [false; MAX_DEGREE];

    for iter in 0..MAX_ITERS {
        let mut max_corr_sqr = 0.0;

        for i in 0..degree {
            if iter_counts.is_some() && frozen[i] {
                continue;
            }
            let z = Complex64::new(z_re[i], z_im[i]);
            let (p, dp) = eval_with_derivative(&cr[..n], &ci[..n], z);

            if dp.norm_sqr() < DENOM_EPS_SQR {
                continue;
            }
            let w = p / dp;

            // Deflation sum over the other root estimates.
            let mut s = Complex64::zero();
            for j in 0..degree {
                if j == i {
                    continue;
                }
                let d = z - Complex64::new(z_re[j], z_im[j]);
                let d_sqr = d.norm_sqr();
                if d_sqr < DENOM_EPS_SQR {
                    continue;
                }
                s += d.conj() / d_sqr;
            }

            let denom = Complex64::new(1.0, 0.0) - w * s;
            if denom.norm_sqr() < DENOM_EPS_SQR {
                continue;
            }
            let corr = w / denom;

            z_re[i] -= corr.re;
            z_im[i] -= corr.im;

            let corr_sqr = corr.norm_sqr();
            if corr_sqr > max_corr_sqr {
                max_corr_sqr = corr_sqr;
            }

            if corr_sqr < TOL_SQR {
                if let Some(counts) = iter_counts.as_deref_mut() {
                    frozen[i] = true;
                    counts[i] = (iter + 1) as u8;
                }
            }
        }

        if max_corr_sqr < TOL_SQR {
            if let Some(counts) = iter_counts.as_deref_mut() {
                for i in 0..degree {
                    if !frozen[i] {
                        frozen[i] = true;
                        counts[i] = (iter + 1) as u8;
                    }
                }
            }
            break;
        }
    }

    if let Some(counts) = iter_counts.as_deref_mut() {
        for i in 0..degree {
            if !frozen[i] {
                counts[i] = MAX_ITERS as u8;
            }
        }
    }

    for i in 0..degree {
        if !z_re[i].is_nan() && !z_im[i].is_nan() {
            warm_re[i] = z_re[i];
            warm_im[i] = z_im[i];
        }
    }
}
