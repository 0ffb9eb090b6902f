// ─────────────────────────────────────────────────────────────────────
// JetFB — Adaptive Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Globally adaptive Gauss–Kronrod (7/15) quadrature.
//!
//! The interval with the largest error estimate is bisected until the
//! summed estimate meets `max(abs_tol, rel_tol·|I|)`. Semi-infinite ranges
//! are mapped onto (0, 1] with t = a + (1 − x)/x; the 15-point rule never
//! samples the endpoints, so the singular end of the map is never evaluated.

use jetfb_types::error::{FeedbackError, FeedbackResult};

/// Kronrod abscissae on [0, 1), symmetric about 0. Last entry is the centre.
const XGK: [f64; 8] = [
    0.991_455_371_120_812_6,
    0.949_107_912_342_758_5,
    0.864_864_423_359_769_1,
    0.741_531_185_599_394_4,
    0.586_087_235_467_691_1,
    0.405_845_151_377_397_2,
    0.207_784_955_007_898_5,
    0.0,
];

const WGK: [f64; 8] = [
    0.022_935_322_010_529_22,
    0.063_092_092_629_978_55,
    0.104_790_010_322_250_18,
    0.140_653_259_715_525_92,
    0.169_004_726_639_267_9,
    0.190_350_578_064_785_4,
    0.204_432_940_075_298_9,
    0.209_482_141_084_727_83,
];

/// Gauss weights for the odd Kronrod nodes XGK[1], XGK[3], XGK[5] and the centre.
const WG: [f64; 4] = [
    0.129_484_966_168_869_7,
    0.279_705_391_489_276_7,
    0.381_830_050_505_118_94,
    0.417_959_183_673_469_4,
];

#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    pub rel_tol: f64,
    pub abs_tol: f64,
    pub max_subdivisions: usize,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            rel_tol: 1e-9,
            abs_tol: 0.0,
            max_subdivisions: 500,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QuadResult {
    pub value: f64,
    pub error: f64,
    pub intervals: usize,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

fn kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> Segment {
    let centre = 0.5 * (a + b);
    let half = 0.5 * (b - a);

    let fc = f(centre);
    let mut kronrod = WGK[7] * fc;
    let mut gauss = WG[3] * fc;

    for (j, (&x, &w)) in XGK.iter().zip(WGK.iter()).take(7).enumerate() {
        let dx = half * x;
        let pair = f(centre - dx) + f(centre + dx);
        kronrod += w * pair;
        if j % 2 == 1 {
            gauss += WG[j / 2] * pair;
        }
    }

    let value = kronrod * half;
    let error = ((kronrod - gauss) * half).abs();
    Segment { a, b, value, error }
}

/// Integrate `f` over the finite interval [a, b].
///
/// `kernel` names the integrand in error messages.
pub fn integrate<F: Fn(f64) -> f64>(
    kernel: &str,
    f: F,
    a: f64,
    b: f64,
    config: &QuadConfig,
) -> FeedbackResult<QuadResult> {
    let fail = |message: String| FeedbackError::Integration {
        kernel: kernel.to_string(),
        lower: a,
        upper: b,
        message,
    };

    if !a.is_finite() || !b.is_finite() {
        return Err(fail("finite bounds required".to_string()));
    }
    if a == b {
        return Ok(QuadResult {
            value: 0.0,
            error: 0.0,
            intervals: 0,
        });
    }
    if b < a {
        let flipped = integrate(kernel, f, b, a, config)?;
        return Ok(QuadResult {
            value: -flipped.value,
            ..flipped
        });
    }

    let mut segments = vec![kronrod_15(&f, a, b)];
    loop {
        let total: f64 = segments.iter().map(|s| s.value).sum();
        let error: f64 = segments.iter().map(|s| s.error).sum();
        if !total.is_finite() || !error.is_finite() {
            return Err(fail(format!(
                "non-finite estimate after {} intervals",
                segments.len()
            )));
        }
        if error <= config.abs_tol.max(config.rel_tol * total.abs()) {
            return Ok(QuadResult {
                value: total,
                error,
                intervals: segments.len(),
            });
        }
        if segments.len() >= config.max_subdivisions {
            return Err(fail(format!(
                "no convergence in {} intervals: estimate {total:e}, error {error:e}",
                segments.len()
            )));
        }

        let worst = segments
            .iter()
            .enumerate()
            .max_by(|x, y| x.1.error.total_cmp(&y.1.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        if mid <= seg.a || mid >= seg.b {
            return Err(fail(format!(
                "interval [{:e}, {:e}] cannot be bisected further",
                seg.a, seg.b
            )));
        }
        segments.push(kronrod_15(&f, seg.a, mid));
        segments.push(kronrod_15(&f, mid, seg.b));
    }
}

/// Integrate `f` over [a, ∞) through the map t = a + (1 − x)/x, x ∈ (0, 1].
pub fn integrate_to_infinity<F: Fn(f64) -> f64>(
    kernel: &str,
    f: F,
    a: f64,
    config: &QuadConfig,
) -> FeedbackResult<QuadResult> {
    if !a.is_finite() {
        return Err(FeedbackError::Integration {
            kernel: kernel.to_string(),
            lower: a,
            upper: f64::INFINITY,
            message: "finite lower bound required".to_string(),
        });
    }
    let mapped = |x: f64| {
        let t = a + (1.0 - x) / x;
        f(t) / (x * x)
    };
    integrate(kernel, mapped, 0.0, 1.0, config).map_err(|err| match err {
        FeedbackError::Integration {
            kernel, message, ..
        } => FeedbackError::Integration {
            kernel,
            lower: a,
            upper: f64::INFINITY,
            message,
        },
        other => other,
    })
}
