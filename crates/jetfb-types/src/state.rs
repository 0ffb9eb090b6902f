// ─────────────────────────────────────────────────────────────────────
// JetFB — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{FeedbackError, FeedbackResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Log-spaced halocentric radii s = r / r_vir. Immutable once built.
#[derive(Debug, Clone)]
pub struct RadialGrid {
    s: Array1<f64>,
}

impl RadialGrid {
    /// `n` points from `s_min` to `s_max` inclusive, equal spacing in ln s.
    pub fn log_spaced(n: usize, s_min: f64, s_max: f64) -> FeedbackResult<Self> {
        if n < 3 {
            return Err(FeedbackError::invalid("grid.n_points", "need at least 3 points"));
        }
        if !s_min.is_finite() || !s_max.is_finite() || s_min <= 0.0 || s_max <= s_min {
            return Err(FeedbackError::invalid(
                "grid.s_min/s_max",
                format!("need 0 < s_min < s_max, got [{s_min}, {s_max}]"),
            ));
        }
        let log_min = s_min.ln();
        let step = (s_max.ln() - log_min) / (n - 1) as f64;
        let mut s = Array1::from_shape_fn(n, |i| (log_min + step * i as f64).exp());
        // Pin the endpoints so they are exact.
        s[0] = s_min;
        s[n - 1] = s_max;
        Ok(RadialGrid { s })
    }

    pub fn s(&self) -> &Array1<f64> {
        &self.s
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Physical radii [m] for a halo of virial radius `r_vir_m`.
    pub fn radii_m(&self, r_vir_m: f64) -> Array1<f64> {
        self.s.mapv(|s| s * r_vir_m)
    }

    /// Index of the grid point closest to `s` in log space.
    pub fn nearest_index(&self, s: f64) -> usize {
        let target = s.max(f64::MIN_POSITIVE).ln();
        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, &si) in self.s.iter().enumerate() {
            let dist = (si.ln() - target).abs();
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best
    }
}

/// Scalars at the virial overdensity, computed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirialScale {
    pub mass_kg: f64,
    pub radius_m: f64,
    pub temperature_k: f64,
    pub pressure_pa: f64,
    pub velocity_m_s: f64,
    pub critical_density: f64,
    pub baryon_fraction: f64,
}

/// Hydrostatic gas profile on the radial grid (SI units).
#[derive(Debug, Clone)]
pub struct GasProfile {
    pub density: Array1<f64>,           // kg m⁻³
    pub temperature: Array1<f64>,       // K
    pub pressure: Array1<f64>,          // Pa
    pub sound_speed: Array1<f64>,       // m s⁻¹
    pub electron_density: Array1<f64>,  // m⁻³
    pub pressure_gradient: Array1<f64>, // Pa m⁻¹, dP/dr < 0
}

/// Radiative cooling derived from the gas profile.
#[derive(Debug, Clone)]
pub struct CoolingProfile {
    pub cooling_time: Array1<f64>,  // s
    pub cooling_power: Array1<f64>, // W m⁻³
}

/// A sampled jet that escaped its host galaxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JetSource {
    pub power_w: f64,
    pub age_s: f64,
    /// Minimum escape time τ_min(Q); the jet leaves the host at this age.
    pub escape_time_s: f64,
    /// Time spent growing in the cluster, age − τ_min.
    pub active_time_s: f64,
}

/// Pressure-equilibrium point of a jet that flared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equilibrium {
    pub time_s: f64,
    pub length_m: f64,
    /// Offset t_fj of the flared growth law L ∝ (t − t_fj)^{1/(3−e)}.
    pub flare_offset_s: f64,
}

/// Terminal growth phase of an evolved jet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JetPhase {
    BallisticOnly,
    Flared(Equilibrium),
}

impl JetPhase {
    pub fn equilibrium(&self) -> Option<&Equilibrium> {
        match self {
            JetPhase::BallisticOnly => None,
            JetPhase::Flared(eq) => Some(eq),
        }
    }

    pub fn is_flared(&self) -> bool {
        matches!(self, JetPhase::Flared(_))
    }
}

/// One sample of a jet's radial geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub radius_m: f64,
    pub filling_factor: f64,
    pub half_angle_rad: f64,
}

/// A jet after the growth stage. Read-only from here on.
#[derive(Debug, Clone)]
pub struct EvolvedJet {
    pub source: JetSource,
    pub phase: JetPhase,
    pub length_m: f64,
    pub trace: Vec<TracePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub sampled: usize,
    pub escaped: usize,
    pub stuck: usize,
    /// Synthetic multiplicity of cooling-only compact sources.
    pub compact: usize,
}

impl PopulationCounts {
    pub fn escaped_fraction(&self) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            self.escaped as f64 / self.sampled as f64
        }
    }

    pub fn stuck_fraction(&self) -> f64 {
        if self.sampled == 0 {
            0.0
        } else {
            self.stuck as f64 / self.sampled as f64
        }
    }
}

/// Escaped sources in draw order plus the population counts.
#[derive(Debug, Clone)]
pub struct Population {
    pub sources: Vec<JetSource>,
    pub counts: PopulationCounts,
}

/// Mean and median of the equilibrium point over flared sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumStats {
    pub flared: usize,
    pub mean_length_m: f64,
    pub median_length_m: f64,
    pub mean_time_s: f64,
    pub median_time_s: f64,
}

impl EquilibriumStats {
    /// `None` when no jet reached pressure equilibrium.
    pub fn from_jets(jets: &[EvolvedJet]) -> Option<Self> {
        let (mut lengths, mut times): (Vec<f64>, Vec<f64>) = jets
            .iter()
            .filter_map(|j| j.phase.equilibrium())
            .map(|eq| (eq.length_m, eq.time_s))
            .unzip();
        if lengths.is_empty() {
            return None;
        }
        Some(EquilibriumStats {
            flared: lengths.len(),
            mean_length_m: mean(&lengths),
            median_length_m: median(&mut lengths),
            mean_time_s: mean(&times),
            median_time_s: median(&mut times),
        })
    }
}

fn mean(v: &[f64]) -> f64 {
    v.iter().sum::<f64>() / v.len() as f64
}

fn median(v: &mut [f64]) -> f64 {
    v.sort_by(f64::total_cmp);
    let n = v.len();
    if n % 2 == 1 {
        v[n / 2]
    } else {
        0.5 * (v[n / 2 - 1] + v[n / 2])
    }
}

/// Counts, fractions and flared-only equilibrium statistics of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSummary {
    pub counts: PopulationCounts,
    pub escaped_fraction: f64,
    pub stuck_fraction: f64,
    pub equilibrium: Option<EquilibriumStats>,
}

impl Population {
    /// Summarise the population given the jets evolved from its sources.
    pub fn summary(&self, jets: &[EvolvedJet]) -> PopulationSummary {
        PopulationSummary {
            counts: self.counts,
            escaped_fraction: self.counts.escaped_fraction(),
            stuck_fraction: self.counts.stuck_fraction(),
            equilibrium: EquilibriumStats::from_jets(jets),
        }
    }
}

/// Mean profiles for one duty cycle, aligned with the radial grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyCycleProfile {
    pub duty_fraction: f64,
    pub mean_ntp: Vec<f64>,
    pub mean_velocity: Vec<f64>,
    pub mean_injection_rate: Vec<f64>,
}

/// Population-mean feedback profiles, one entry per configured duty cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub s: Vec<f64>,
    pub averaged_entries: usize,
    pub profiles: Vec<DutyCycleProfile>,
}

impl AggregateResult {
    pub fn profile(&self, duty_fraction: f64) -> Option<&DutyCycleProfile> {
        self.profiles
            .iter()
            .find(|p| (p.duty_fraction - duty_fraction).abs() < 1e-12)
    }
}
