//! One-dimensional interpolation on monotone tables.
//!
//! All lookups clamp to the table endpoints instead of extrapolating;
//! callers that must know about out-of-range queries use `bracket`.

use ndarray::Array1;

/// Index `i` such that `xs[i] <= x < xs[i + 1]`, clamped to `[0, n − 2]`.
///
/// Returns `None` when `x` lies outside `[xs[0], xs[n − 1]]`.
pub fn bracket(xs: &[f64], x: f64) -> Option<usize> {
    let n = xs.len();
    if n < 2 || !(x >= xs[0] && x <= xs[n - 1]) {
        return None;
    }
    let upper = xs.partition_point(|&v| v <= x);
    Some(upper.saturating_sub(1).min(n - 2))
}

fn segment_index(xs: &[f64], x: f64) -> usize {
    let n = xs.len();
    let upper = xs.partition_point(|&v| v <= x);
    upper.saturating_sub(1).min(n - 2)
}

/// Piecewise-linear interpolation, clamped to the end values outside the table.
///
/// `xs` must be strictly increasing and `xs.len() == ys.len() >= 1`.
pub fn interp_clamped(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    let n = xs.len();
    if n == 1 || x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let i = segment_index(xs, x);
    let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
    ys[i] + t * (ys[i + 1] - ys[i])
}

/// Piecewise-linear interpolation returning `outside` beyond the table span.
pub fn interp_or(xs: &[f64], ys: &[f64], x: f64, outside: f64) -> f64 {
    match bracket(xs, x) {
        Some(i) => {
            let t = (x - xs[i]) / (xs[i + 1] - xs[i]);
            ys[i] + t * (ys[i + 1] - ys[i])
        }
        None => outside,
    }
}

/// Log-log interpolation of a positive tabulated function, clamped at the ends.
pub fn interp_loglog(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    let lx: Vec<f64> = xs.iter().map(|v| v.ln()).collect();
    let ly: Vec<f64> = ys.iter().map(|v| v.ln()).collect();
    interp_clamped(&lx, &ly, x.ln()).exp()
}

/// Derivative dy/dx on a non-uniform grid.
///
/// Interior points use the second-order three-point stencil
///   f'_i = −h₊/(h₋(h₋+h₊)) f_{i−1} + (h₊−h₋)/(h₋h₊) f_i + h₋/(h₊(h₋+h₊)) f_{i+1},
/// which reduces to the central difference on uniform spacing. The end
/// points use the matching one-sided second-order stencils.
pub fn gradient_nonuniform(x: &Array1<f64>, y: &Array1<f64>) -> Array1<f64> {
    let n = x.len();
    debug_assert_eq!(n, y.len());
    let mut dy = Array1::zeros(n);
    if n < 2 {
        return dy;
    }
    if n == 2 {
        let slope = (y[1] - y[0]) / (x[1] - x[0]);
        dy.fill(slope);
        return dy;
    }

    for i in 1..n - 1 {
        let hm = x[i] - x[i - 1];
        let hp = x[i + 1] - x[i];
        dy[i] = -hp / (hm * (hm + hp)) * y[i - 1]
            + (hp - hm) / (hm * hp) * y[i]
            + hm / (hp * (hm + hp)) * y[i + 1];
    }

    // Forward, second order.
    let h1 = x[1] - x[0];
    let h2 = x[2] - x[1];
    dy[0] = -(2.0 * h1 + h2) / (h1 * (h1 + h2)) * y[0] + (h1 + h2) / (h1 * h2) * y[1]
        - h1 / (h2 * (h1 + h2)) * y[2];

    // Backward, second order.
    let h1 = x[n - 1] - x[n - 2];
    let h2 = x[n - 2] - x[n - 3];
    dy[n - 1] = (2.0 * h1 + h2) / (h1 * (h1 + h2)) * y[n - 1] - (h1 + h2) / (h1 * h2) * y[n - 2]
        + h1 / (h2 * (h1 + h2)) * y[n - 3];

    dy
}
