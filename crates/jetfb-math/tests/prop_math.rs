// ─────────────────────────────────────────────────────────────────────
// JetFB — Property-Based Tests (proptest) for jetfb-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for jetfb-math using proptest.
//!
//! Covers: Gauss–Kronrod quadrature, semi-infinite mapping, clamped
//! interpolation, non-uniform gradient, geometric sequences.

use jetfb_math::grid::logspace;
use jetfb_math::interp::{gradient_nonuniform, interp_clamped, interp_or};
use jetfb_math::quadrature::{integrate, integrate_to_infinity, QuadConfig};
use ndarray::Array1;
use proptest::prelude::*;

// ── Quadrature Properties ────────────────────────────────────────────

proptest! {
    /// ∫_a^b x^p dx matches the closed form for smooth powers.
    #[test]
    fn power_integral_matches_closed_form(
        p in 0.0f64..6.0,
        a in 0.1f64..2.0,
        span in 0.1f64..5.0,
    ) {
        let b = a + span;
        let res = integrate("x^p", |x: f64| x.powf(p), a, b, &QuadConfig::default()).unwrap();
        let exact = (b.powf(p + 1.0) - a.powf(p + 1.0)) / (p + 1.0);
        prop_assert!((res.value - exact).abs() <= 1e-8 * exact.abs(),
            "p={}, [{}, {}]: {} vs {}", p, a, b, res.value, exact);
    }

    /// Splitting the interval does not change the integral.
    #[test]
    fn additivity_over_subintervals(a in -3.0f64..0.0, m in 0.0f64..1.0, b in 1.0f64..4.0) {
        let cfg = QuadConfig::default();
        let f = |x: f64| (x * 1.7).cos() + 0.3 * x * x;
        let whole = integrate("f", f, a, b, &cfg).unwrap().value;
        let left = integrate("f", f, a, m, &cfg).unwrap().value;
        let right = integrate("f", f, m, b, &cfg).unwrap().value;
        prop_assert!((whole - left - right).abs() < 1e-9 * whole.abs().max(1.0));
    }

    /// ∫_a^∞ t^-k dt = a^{1−k}/(k−1).
    #[test]
    fn semi_infinite_power_tail(k in 2.0f64..6.0, a in 0.5f64..20.0) {
        let res = integrate_to_infinity("t^-k", |t: f64| t.powf(-k), a, &QuadConfig::default())
            .unwrap();
        let exact = a.powf(1.0 - k) / (k - 1.0);
        prop_assert!((res.value / exact - 1.0).abs() < 1e-7,
            "k={}, a={}: {} vs {}", k, a, res.value, exact);
    }
}

// ── Interpolation Properties ─────────────────────────────────────────

proptest! {
    /// Clamped interpolation stays within the range of tabulated values.
    #[test]
    fn clamped_interp_bounded(
        ys in proptest::collection::vec(-100.0f64..100.0, 2..30),
        x in -10.0f64..50.0,
    ) {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
        let v = interp_clamped(&xs, &ys, x);
        let lo = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }

    /// Linear data is reproduced exactly inside the table.
    #[test]
    fn linear_data_reproduced(slope in -5.0f64..5.0, icept in -5.0f64..5.0, x in 0.0f64..9.0) {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|v| slope * v + icept).collect();
        prop_assert!((interp_clamped(&xs, &ys, x) - (slope * x + icept)).abs() < 1e-10);
    }

    /// Outside the table span the fallback is returned.
    #[test]
    fn interp_or_fallback_outside(x in 10.001f64..100.0, fallback in -1.0f64..1.0) {
        let xs: Vec<f64> = (0..=10).map(|i| i as f64).collect();
        let ys = vec![3.0; 11];
        prop_assert_eq!(interp_or(&xs, &ys, x, fallback), fallback);
        prop_assert_eq!(interp_or(&xs, &ys, -x, fallback), fallback);
    }
}

// ── Gradient and Grid Properties ─────────────────────────────────────

proptest! {
    /// The three-point stencils are exact for any quadratic on a log grid.
    #[test]
    fn gradient_exact_for_quadratics(
        n in 3usize..200,
        c2 in -3.0f64..3.0,
        c1 in -3.0f64..3.0,
    ) {
        let x = Array1::from(logspace(0.01, 3.0, n));
        let y = x.mapv(|v| c2 * v * v + c1 * v + 1.0);
        let dy = gradient_nonuniform(&x, &y);
        for i in 0..n {
            let exact = 2.0 * c2 * x[i] + c1;
            prop_assert!((dy[i] - exact).abs() < 1e-7 * (1.0 + exact.abs()),
                "i={}: {} vs {}", i, dy[i], exact);
        }
    }

    /// logspace is strictly increasing with constant ratio.
    #[test]
    fn logspace_constant_ratio(n in 3usize..300, lo in 0.001f64..1.0, decades in 0.1f64..5.0) {
        let hi = lo * 10f64.powf(decades);
        let pts = logspace(lo, hi, n);
        let ratio = pts[1] / pts[0];
        for i in 1..n {
            prop_assert!(pts[i] > pts[i - 1]);
            prop_assert!((pts[i] / pts[i - 1] / ratio - 1.0).abs() < 1e-9);
        }
    }
}
