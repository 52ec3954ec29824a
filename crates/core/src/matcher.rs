use aberth_solve::MAX_DEGREE;
use log::debug;

/// Above this size the Hungarian strategy degrades to greedy; the O(n^3)
/// pass keeps its cost matrix on the stack.
pub const HUNGARIAN_MAX: usize = 32;

/// Reorder the freshly solved roots so entry `i` is the one nearest, by
/// squared distance, to predecessor `i`. Each predecessor claims the
/// closest unused root in index order; the result is a permutation of the
/// input.
pub fn match_greedy(new_re: &mut [f64], new_im: &mut [f64], prev_re: &[f64], prev_im: &[f64])
{
    let n = new_re
        .len()
        .min(new_im.len())
        .min(prev_re.len())
        .min(prev_im.len());
    if n == 0 || n > MAX_DEGREE {
        return;
    }

    let mut used = [false; MAX_DEGREE];
    let mut out_re = [0.0; MAX_DEGREE];
    let mut out_im = [0.0; MAX_DEGREE];

    for i in 0..n {
        let mut best_j = 0;
        let mut best_d = f64::INFINITY;
        for j in 0..n {
            if used[j] {
                continue;
            }
            let dx = new_re[j] - prev_re[i];
            let dy = new_im[j] - prev_im[i];
            let d = dx * dx + dy * dy;
            if d < best_d {
                best_d = d;
                best_j = j;
            }
        }
        out_re[i] = new_re[best_j];
        out_im[i] = new_im[best_j];
        used[best_j] = true;
    }

    new_re[..n].copy_from_slice(&out_re[..n]);
    new_im[..n].copy_from_slice(&out_im[..n]);
}

/// Kuhn-Munkres minimum-cost assignment on the predecessor/root
/// squared-distance matrix, applied in place. Sizes above
/// [`HUNGARIAN_MAX`] silently degrade to [`match_greedy`].
pub fn match_hungarian(new_re: &mut [f64], new_im: &mut [f64], prev_re: &[f64], prev_im: &[f64])
{
    let n = new_re
        .len()
        .min(new_im.len())
        .min(prev_re.len())
        .min(prev_im.len());
    if n == 0 {
        return;
    }
    if n > HUNGARIAN_MAX {
        debug!("assignment of {n} roots exceeds the Hungarian cap, using greedy");
        match_greedy(new_re, new_im, prev_re, prev_im);
        return;
    }

    let mut cost = [[0.0; HUNGARIAN_MAX]; HUNGARIAN_MAX];
    for i in 0..n {
        for j in 0..n {
            let dx = new_re[j] - prev_re[i];
            let dy = new_im[j] - prev_im[i];
            cost[i][j] = dx * dx + dy * dy;
        }
    }

    // Potentials-based formulation; rows and columns are 1-indexed with
    // slot 0 as the virtual source.
    const INF: f64 = 1e18;
    let mut u = [0.0; HUNGARIAN_MAX + 1];
    let mut v = [0.0; HUNGARIAN_MAX + 1];
    let mut p = [0usize; HUNGARIAN_MAX + 1];
    let mut way = [0usize; HUNGARIAN_MAX + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = [INF; HUNGARIAN_MAX + 1];
        let mut used = [false; HUNGARIAN_MAX + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut j1 = 0;
            let mut delta = INF;
            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut out_re = [0.0; HUNGARIAN_MAX];
    let mut out_im = [0.0; HUNGARIAN_MAX];
    for j in 1..=n {
        out_re[p[j] - 1] = new_re[j - 1];
        out_im[p[j] - 1] = new_im[j - 1];
    }
    new_re[..n].copy_from_slice(&out_re[..n]);
    new_im[..n].copy_from_slice(&out_im[..n]);
}
