// ─────────────────────────────────────────────────────────────────────
// JetFB — Jet Evolution
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Per-source jet growth: ballistic expansion, pressure equilibrium and
//! flaring, plus the radial trace of half-angle and filling factor.
//!
//! The cluster atmosphere seen by a jet is the power law
//! ρ(r) = ρ₀ (r/r₀)^{-e}, p(r) = p₀ (r/r₀)^{-e} anchored on the gas profile.
//! A collimated jet of half-angle θ_j advances as
//!   L(t) = [(4−e)/2 · √K · t]^{2/(4−e)},  K = Q / (c π θ_j² ρ₀ r₀^e),
//! until its ram pressure drops to the ambient pressure at R_eq. After
//! that it flares and grows as L ∝ (t − t_fj)^{1/(3−e)}, with the offset
//! t_fj chosen so that length and head speed are continuous at t_eq.

use crate::cluster::ClusterModel;
use jetfb_math::grid::{logspace, logspace_exclusive_start};
use jetfb_math::quadrature::{integrate, QuadConfig};
use jetfb_types::config::JetGeometry;
use jetfb_types::constants::{C_LIGHT, KPC};
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{Equilibrium, EvolvedJet, JetPhase, JetSource, TracePoint};
use rayon::prelude::*;
use std::f64::consts::PI;

/// Power-law atmosphere anchored at r₀.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetEnvironment {
    pub r0_m: f64,
    pub density0: f64,
    pub pressure0: f64,
    pub gas_slope: f64,
}

impl JetEnvironment {
    /// Anchor at r₀ = x₀ r_vir, reading ρ₀ and p₀ from the gas profile.
    pub fn from_cluster(model: &ClusterModel, x0: f64) -> FeedbackResult<Self> {
        if !(x0 > 0.0) || !x0.is_finite() {
            return Err(FeedbackError::invalid(
                "jet.normalization_radius_fraction",
                format!("must be finite and > 0, got {x0}"),
            ));
        }
        let (density0, pressure0) = model.environment_at(x0);
        Ok(JetEnvironment {
            r0_m: x0 * model.virial().radius_m,
            density0,
            pressure0,
            gas_slope: model.params().gas_slope,
        })
    }

    pub fn pressure(&self, r_m: f64) -> f64 {
        self.pressure0 * (r_m / self.r0_m).powf(-self.gas_slope)
    }
}

/// Closed-form growth laws and trace construction for one environment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetEvolution {
    env: JetEnvironment,
    theta_jet: f64,
    theta_fr1: f64,
    trace_points: usize,
    trace_floor_m: f64,
}

impl JetEvolution {
    pub fn new(env: JetEnvironment, geometry: &JetGeometry) -> FeedbackResult<Self> {
        let e = env.gas_slope;
        if !(0.0..2.0).contains(&e) {
            return Err(FeedbackError::invalid(
                "cluster.gas_slope",
                format!("e = {e} outside [0, 2)"),
            ));
        }
        if !(env.density0 > 0.0 && env.pressure0 > 0.0 && env.r0_m > 0.0) {
            return Err(FeedbackError::invalid(
                "jet environment",
                "ρ₀, p₀ and r₀ must be > 0",
            ));
        }
        let theta_jet = geometry.narrow_half_angle_deg.to_radians();
        let theta_fr1 = geometry.fr1_half_angle_deg.to_radians();
        for (name, theta) in [
            ("jet.narrow_half_angle_deg", theta_jet),
            ("jet.fr1_half_angle_deg", theta_fr1),
        ] {
            if !(theta > 0.0 && theta < 0.5 * PI) {
                return Err(FeedbackError::invalid(name, "must lie in (0, 90)"));
            }
        }
        if geometry.trace_points < 2 {
            return Err(FeedbackError::invalid("jet.trace_points", "need at least 2"));
        }
        if !(geometry.trace_floor_kpc > 0.0) {
            return Err(FeedbackError::invalid("jet.trace_floor_kpc", "must be > 0"));
        }
        Ok(JetEvolution {
            env,
            theta_jet,
            theta_fr1,
            trace_points: geometry.trace_points,
            trace_floor_m: geometry.trace_floor_kpc * KPC,
        })
    }

    pub fn environment(&self) -> &JetEnvironment {
        &self.env
    }

    fn thrust_area(&self) -> f64 {
        C_LIGHT * PI * self.theta_jet * self.theta_jet
    }

    fn ballistic_constant(&self, power_w: f64) -> f64 {
        power_w / (self.thrust_area() * self.env.density0 * self.env.r0_m.powf(self.env.gas_slope))
    }

    /// Ballistic head radius [m] after `t_s` seconds.
    pub fn ballistic_length(&self, power_w: f64, t_s: f64) -> f64 {
        let e = self.env.gas_slope;
        let k = self.ballistic_constant(power_w);
        (0.5 * (4.0 - e) * k.sqrt() * t_s.max(0.0)).powf(2.0 / (4.0 - e))
    }

    /// Time [s] for the ballistic head to reach `length_m`.
    pub fn ballistic_time(&self, power_w: f64, length_m: f64) -> f64 {
        let e = self.env.gas_slope;
        let k = self.ballistic_constant(power_w);
        2.0 / ((4.0 - e) * k.sqrt()) * length_m.powf(0.5 * (4.0 - e))
    }

    /// Where the ram pressure Q / (c π θ_j² L²) meets the ambient pressure.
    pub fn equilibrium(&self, power_w: f64) -> Equilibrium {
        let e = self.env.gas_slope;
        let length_m = (power_w
            / (self.thrust_area() * self.env.pressure0 * self.env.r0_m.powf(e)))
        .powf(1.0 / (2.0 - e));
        let time_s = self.ballistic_time(power_w, length_m);
        Equilibrium {
            time_s,
            length_m,
            flare_offset_s: time_s * (2.0 - e) / (2.0 * (3.0 - e)),
        }
    }

    /// Head radius [m] after `t_s` seconds of growth in the cluster.
    pub fn length_at(&self, power_w: f64, t_s: f64) -> f64 {
        let eq = self.equilibrium(power_w);
        if t_s <= eq.time_s {
            self.ballistic_length(power_w, t_s)
        } else {
            self.flared_length(&eq, t_s)
        }
    }

    fn flared_length(&self, eq: &Equilibrium, t_s: f64) -> f64 {
        let e = self.env.gas_slope;
        eq.length_m
            * ((t_s - eq.flare_offset_s) / (eq.time_s - eq.flare_offset_s)).powf(1.0 / (3.0 - e))
    }

    /// Half-opening angle of the jet at radius `r_m`.
    pub fn half_angle_at(&self, r_m: f64, phase: &JetPhase) -> f64 {
        match phase {
            JetPhase::Flared(eq) if r_m > eq.length_m => {
                (self.flared_width(eq, r_m) / r_m).atan()
            }
            _ => self.theta_jet,
        }
    }

    /// Cross-section radius w(r) = R_eq tan θ_j + (r − R_eq) tan θ_FR beyond R_eq.
    fn flared_width(&self, eq: &Equilibrium, r_m: f64) -> f64 {
        eq.length_m * self.theta_jet.tan() + (r_m - eq.length_m) * self.theta_fr1.tan()
    }

    /// Volume [m³] occupied by both lobes out to head radius `r_m`.
    pub fn occupied_volume(&self, r_m: f64, phase: &JetPhase) -> FeedbackResult<f64> {
        let tan_j = self.theta_jet.tan();
        let cone = |r: f64| 2.0 * PI / 3.0 * r.powi(3) * tan_j * tan_j;
        match phase {
            JetPhase::Flared(eq) if r_m > eq.length_m => {
                let flared = integrate(
                    "flared_volume",
                    |x: f64| {
                        let w = self.flared_width(eq, x);
                        w * w
                    },
                    eq.length_m,
                    r_m,
                    &QuadConfig::default(),
                )?;
                Ok(cone(eq.length_m) + 2.0 * PI * flared.value)
            }
            _ => Ok(cone(r_m)),
        }
    }

    /// Ballistic/flared point counts for a flared trace from `r_lo` to `length_m`.
    ///
    /// The ballistic share follows ln(R_eq/r_lo) / ln(L/r_lo); at least one
    /// point is left for the flared segment so the trace ends at the head.
    /// A non-empty ballistic segment has at least two points, so it always
    /// spans r_lo..R_eq.
    pub fn split_counts(&self, r_lo: f64, r_eq: f64, length_m: f64) -> (usize, usize) {
        let n = self.trace_points;
        let frac = ((r_eq / r_lo).ln() / (length_m / r_lo).ln()).clamp(0.0, 1.0);
        let mut n_ballistic = ((n as f64 * frac).round() as usize).min(n - 1);
        if n_ballistic == 1 && n > 2 {
            n_ballistic = 2;
        }
        (n_ballistic, n - n_ballistic)
    }

    /// Innermost traced radius: the floor, but at least a decade below the head.
    pub fn trace_start(&self, length_m: f64) -> f64 {
        self.trace_floor_m.min(0.1 * length_m)
    }

    fn trace_radii(&self, length_m: f64, phase: &JetPhase) -> Vec<f64> {
        let r_lo = self.trace_start(length_m);
        match phase {
            JetPhase::BallisticOnly => logspace(r_lo, length_m, self.trace_points),
            JetPhase::Flared(eq) => {
                let (n_b, n_f) = self.split_counts(r_lo, eq.length_m, length_m);
                let mut radii = Vec::with_capacity(self.trace_points);
                if n_b == 0 {
                    radii.extend(logspace(r_lo, length_m, n_f));
                } else {
                    radii.extend(logspace(r_lo, eq.length_m, n_b));
                    radii.extend(logspace_exclusive_start(eq.length_m, length_m, n_f));
                }
                radii
            }
        }
    }

    /// Phase, head radius and trace of one escaped source after its active time.
    pub fn evolve(&self, source: &JetSource) -> EvolvedJet {
        let eq = self.equilibrium(source.power_w);
        let t = source.active_time_s;
        let (phase, length_m) = if t > eq.time_s {
            (JetPhase::Flared(eq), self.flared_length(&eq, t))
        } else {
            (JetPhase::BallisticOnly, self.ballistic_length(source.power_w, t))
        };
        let trace = self
            .trace_radii(length_m, &phase)
            .into_iter()
            .map(|radius_m| {
                let half_angle_rad = self.half_angle_at(radius_m, &phase);
                TracePoint {
                    radius_m,
                    filling_factor: 1.0 - half_angle_rad.cos(),
                    half_angle_rad,
                }
            })
            .collect();
        EvolvedJet {
            source: *source,
            phase,
            length_m,
            trace,
        }
    }

    /// Evolve every source in parallel; the output keeps the input order.
    pub fn evolve_all(&self, sources: &[JetSource]) -> Vec<EvolvedJet> {
        let jets: Vec<EvolvedJet> = sources.par_iter().map(|s| self.evolve(s)).collect();
        let flared = jets.iter().filter(|j| j.phase.is_flared()).count();
        log::info!(
            "Evolved {} jets: {} flared, {} ballistic",
            jets.len(),
            flared,
            jets.len() - flared
        );
        jets
    }
}
