//! Geometric (log-spaced) sequences.

/// `n` points from `start` to `end` inclusive with a constant ratio.
///
/// Both bounds must be positive. `n == 1` yields `[start]`.
pub fn logspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let l0 = start.ln();
            let step = (end.ln() - l0) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| (l0 + step * i as f64).exp()).collect();
            out[0] = start;
            out[n - 1] = end;
            out
        }
    }
}

/// Points of `logspace(start, end, n + 1)` with the first one dropped.
pub fn logspace_exclusive_start(start: f64, end: f64, n: usize) -> Vec<f64> {
    let mut pts = logspace(start, end, n + 1);
    if !pts.is_empty() {
        pts.remove(0);
    }
    pts
}
