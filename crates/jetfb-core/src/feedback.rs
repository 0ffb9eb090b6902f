// ─────────────────────────────────────────────────────────────────────
// JetFB — Feedback Aggregation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Duty-cycle-weighted jet heating against radiative cooling.
//!
//! For a source of power Q and duty fraction δ the mean heating rate is
//! h = δQ / V(L). Heating and cooling are turned into outward velocities
//! through the pressure gradient, v = (γ−1) ε / |dP/dr|, and blended with
//! the local filling factor f:
//!   v_eff² = f v_h² + (1−f) v_c²,   ε_eff = f h + (1−f) ε_cool,
//!   NTP    = 1 / (1 + 3kT / (μ m_p v_eff²)).
//! Compact sources contribute the cooling-only profile (f = 0).

use crate::jet::JetEvolution;
use jetfb_math::interp::interp_or;
use jetfb_types::constants::{GAMMA_ADIABATIC, K_BOLTZMANN, MU_MEAN, M_PROTON};
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{
    AggregateResult, CoolingProfile, DutyCycleProfile, EvolvedJet, GasProfile, PopulationCounts,
    RadialGrid,
};
use ndarray::Array1;
use rayon::prelude::*;

/// Non-thermal pressure fraction for thermal term 3kT/(μ m_p) and v_eff².
///
/// Clamped to [`f64::MIN_POSITIVE`, 1] so a vanishing kick still yields a
/// value in (0, 1].
#[inline]
pub fn non_thermal_fraction(thermal: f64, v_eff_sq: f64) -> f64 {
    (1.0 / (1.0 + thermal / v_eff_sq)).clamp(f64::MIN_POSITIVE, 1.0)
}

/// Effective velocity² and injection rate at one radius.
#[inline]
fn blend(filling: f64, heating: f64, cooling: f64, per_power: f64) -> (f64, f64) {
    let v_c = per_power * cooling;
    let mut v_sq = (1.0 - filling) * v_c * v_c;
    let mut rate = (1.0 - filling) * cooling;
    if filling > 0.0 {
        let v_h = per_power * heating;
        v_sq += filling * v_h * v_h;
        rate += filling * heating;
    }
    (v_sq, rate)
}

/// Radial feedback of one source (or the cooling-only block) at one duty fraction.
#[derive(Debug, Clone)]
pub struct SourceFeedback {
    pub duty_fraction: f64,
    pub ntp: Array1<f64>,
    pub velocity: Array1<f64>,
    pub injection_rate: Array1<f64>,
}

/// Grid-aligned inputs shared by every source.
#[derive(Debug, Clone)]
pub struct FeedbackAggregator {
    s: Array1<f64>,
    ln_r: Vec<f64>,
    /// 3kT / (μ m_p) [m² s⁻²]
    thermal: Array1<f64>,
    /// (γ−1) / |dP/dr|
    per_power: Array1<f64>,
    cooling_power: Array1<f64>,
    evolution: JetEvolution,
    duty_cycles: Vec<f64>,
}

impl FeedbackAggregator {
    pub fn new(
        grid: &RadialGrid,
        r_vir_m: f64,
        gas: &GasProfile,
        cooling: &CoolingProfile,
        evolution: JetEvolution,
        duty_cycles: &[f64],
    ) -> FeedbackResult<Self> {
        if duty_cycles.is_empty() {
            return Err(FeedbackError::invalid("duty_cycles", "need at least one duty fraction"));
        }
        if let Some(&d) = duty_cycles.iter().find(|&&d| !(d > 0.0 && d <= 1.0)) {
            return Err(FeedbackError::invalid(
                "duty_cycles",
                format!("duty fraction {d} outside (0, 1]"),
            ));
        }
        let n = grid.len();
        if gas.temperature.len() != n || cooling.cooling_power.len() != n {
            return Err(FeedbackError::ConfigError(format!(
                "profile length mismatch: grid {n}, gas {}, cooling {}",
                gas.temperature.len(),
                cooling.cooling_power.len()
            )));
        }

        Ok(FeedbackAggregator {
            s: grid.s().clone(),
            ln_r: grid.radii_m(r_vir_m).iter().map(|r| r.ln()).collect(),
            thermal: gas
                .temperature
                .mapv(|t| 3.0 * K_BOLTZMANN * t / (MU_MEAN * M_PROTON)),
            per_power: gas
                .pressure_gradient
                .mapv(|g| (GAMMA_ADIABATIC - 1.0) / g.abs()),
            cooling_power: cooling.cooling_power.clone(),
            evolution,
            duty_cycles: duty_cycles.to_vec(),
        })
    }

    /// Trace filling factor on the grid: linear in ln r inside the trace, 0 outside.
    pub fn filling_on_grid(&self, jet: &EvolvedJet) -> Array1<f64> {
        let ln_tr: Vec<f64> = jet.trace.iter().map(|p| p.radius_m.ln()).collect();
        let f_tr: Vec<f64> = jet.trace.iter().map(|p| p.filling_factor).collect();
        self.ln_r
            .iter()
            .map(|&lr| interp_or(&ln_tr, &f_tr, lr, 0.0))
            .collect()
    }

    /// Mean heating rate δQ / V(L) [W m⁻³].
    pub fn heating_rate(&self, jet: &EvolvedJet, duty_fraction: f64) -> FeedbackResult<f64> {
        let volume = self.evolution.occupied_volume(jet.length_m, &jet.phase)?;
        if !(volume > 0.0) || !volume.is_finite() {
            return Err(FeedbackError::invalid(
                "jet volume",
                format!("V(L) = {volume:e} for L = {:e} m", jet.length_m),
            ));
        }
        Ok(duty_fraction * jet.source.power_w / volume)
    }

    fn profiles_for(&self, filling: &Array1<f64>, duty_fraction: f64, heating: f64) -> SourceFeedback {
        let n = self.s.len();
        let mut ntp = Array1::zeros(n);
        let mut velocity = Array1::zeros(n);
        let mut injection_rate = Array1::zeros(n);
        for i in 0..n {
            let (v_sq, rate) = blend(filling[i], heating, self.cooling_power[i], self.per_power[i]);
            ntp[i] = non_thermal_fraction(self.thermal[i], v_sq);
            velocity[i] = v_sq.sqrt();
            injection_rate[i] = rate;
        }
        SourceFeedback {
            duty_fraction,
            ntp,
            velocity,
            injection_rate,
        }
    }

    /// One profile set per configured duty fraction.
    pub fn source_feedback(&self, jet: &EvolvedJet) -> FeedbackResult<Vec<SourceFeedback>> {
        let filling = self.filling_on_grid(jet);
        self.duty_cycles
            .iter()
            .map(|&d| Ok(self.profiles_for(&filling, d, self.heating_rate(jet, d)?)))
            .collect()
    }

    /// The f = 0 profile used for compact sources; independent of δ.
    pub fn cooling_only(&self) -> SourceFeedback {
        self.profiles_for(&Array1::zeros(self.s.len()), 0.0, 0.0)
    }

    /// Population mean over escaped jets and `counts.compact` cooling-only entries.
    pub fn aggregate(
        &self,
        jets: &[EvolvedJet],
        counts: &PopulationCounts,
    ) -> FeedbackResult<AggregateResult> {
        if jets.is_empty() {
            return Err(FeedbackError::SamplingDegeneracy {
                sampled: counts.sampled,
                stuck: counts.stuck,
            });
        }

        let per_source: Vec<Vec<SourceFeedback>> = jets
            .par_iter()
            .map(|jet| self.source_feedback(jet))
            .collect::<FeedbackResult<Vec<_>>>()?;

        let n = self.s.len();
        let n_duty = self.duty_cycles.len();
        let mut sum_ntp = vec![Array1::<f64>::zeros(n); n_duty];
        let mut sum_vel = vec![Array1::<f64>::zeros(n); n_duty];
        let mut sum_rate = vec![Array1::<f64>::zeros(n); n_duty];

        // Sequential reduction in source order keeps the sums bit-reproducible.
        for profiles in &per_source {
            for (k, p) in profiles.iter().enumerate() {
                sum_ntp[k] += &p.ntp;
                sum_vel[k] += &p.velocity;
                sum_rate[k] += &p.injection_rate;
            }
        }

        let compact = self.cooling_only();
        let weight = counts.compact as f64;
        let entries = jets.len() + counts.compact;
        let norm = 1.0 / entries as f64;

        let profiles = self
            .duty_cycles
            .iter()
            .enumerate()
            .map(|(k, &duty_fraction)| {
                let mean = |sum: &Array1<f64>, block: &Array1<f64>| -> Vec<f64> {
                    sum.iter()
                        .zip(block.iter())
                        .map(|(&a, &b)| (a + weight * b) * norm)
                        .collect()
                };
                DutyCycleProfile {
                    duty_fraction,
                    mean_ntp: mean(&sum_ntp[k], &compact.ntp),
                    mean_velocity: mean(&sum_vel[k], &compact.velocity),
                    mean_injection_rate: mean(&sum_rate[k], &compact.injection_rate),
                }
            })
            .collect();

        log::info!(
            "Aggregated {} jets + {} compact entries over {} duty cycles",
            jets.len(),
            counts.compact,
            n_duty
        );

        Ok(AggregateResult {
            s: self.s.to_vec(),
            averaged_entries: entries,
            profiles,
        })
    }
}
