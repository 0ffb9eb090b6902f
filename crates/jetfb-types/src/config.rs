// ─────────────────────────────────────────────────────────────────────
// JetFB — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{FeedbackError, FeedbackResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level run configuration.
/// Built once at start-up and passed by reference to every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub cosmology: CosmologyParams,
    pub halo: HaloParams,
    pub cluster: ClusterParameters,
    #[serde(default)]
    pub grid: GridParams,
    pub jet: JetGeometry,
    pub population: PopulationParams,
    pub duty_cycles: Vec<f64>,
    /// Path to a two-column (log T, log Λ) table, Λ in erg cm³ s⁻¹.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooling_table: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CosmologyParams {
    /// Dimensionless Hubble parameter h (H0 = 100 h km/s/Mpc).
    pub hubble: f64,
    pub omega_m: f64,
    pub omega_b: f64,
    /// Critical density override [kg m⁻³]. Derived from `hubble` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_density: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HaloParams {
    pub mass_msun: f64,
    /// Overdensity Δ relative to the critical density.
    pub overdensity: f64,
}

/// Cluster shape parameters {c, a, d, e, η}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterParameters {
    pub concentration: f64,
    pub dm_slope: f64,
    pub gas_dilution: f64,
    pub gas_slope: f64,
    pub baryon_retention: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridParams {
    #[serde(default = "default_grid_points")]
    pub n_points: usize,
    #[serde(default = "default_s_min")]
    pub s_min: f64,
    #[serde(default = "default_s_max")]
    pub s_max: f64,
}

fn default_grid_points() -> usize {
    500
}
fn default_s_min() -> f64 {
    1.0e-3
}
fn default_s_max() -> f64 {
    2.0
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            n_points: default_grid_points(),
            s_min: default_s_min(),
            s_max: default_s_max(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JetGeometry {
    /// Half-opening angle of the collimated (ballistic) jet [deg].
    pub narrow_half_angle_deg: f64,
    /// Asymptotic half-opening angle after flaring [deg].
    pub fr1_half_angle_deg: f64,
    /// Environment anchor r0 = x0 · r_vir for the power-law jet environment.
    pub normalization_radius_fraction: f64,
    /// Radius a jet must clear to escape its host galaxy [kpc].
    pub host_radius_kpc: f64,
    /// Host galaxy gas number density at `host_radius_kpc` [cm⁻³].
    pub host_density_cm3: f64,
    /// Smallest jet-head radius resolved by the radial trace [kpc].
    pub trace_floor_kpc: f64,
    #[serde(default = "default_trace_points")]
    pub trace_points: usize,
}

fn default_trace_points() -> usize {
    150
}

/// Probability law for a positive quantity drawn by inverse-CDF sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerLawSpec {
    /// p(x) ∝ x^slope on [min, max].
    Single { slope: f64, min: f64, max: f64 },
    /// p(x) ∝ x^slope_low on [min, cut], ∝ x^slope_high on [cut, max], continuous at cut.
    Broken {
        slope_low: f64,
        slope_high: f64,
        min: f64,
        cut: f64,
        max: f64,
    },
}

impl PowerLawSpec {
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            PowerLawSpec::Single { min, max, .. } => (min, max),
            PowerLawSpec::Broken { min, max, .. } => (min, max),
        }
    }

    pub fn validate(&self, name: &str) -> FeedbackResult<()> {
        let (min, max) = self.bounds();
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || max <= min {
            return Err(FeedbackError::invalid(
                format!("{name}.min/max"),
                format!("bounds must satisfy 0 < min < max, got [{min:e}, {max:e}]"),
            ));
        }
        match *self {
            PowerLawSpec::Single { slope, .. } => {
                if !slope.is_finite() {
                    return Err(FeedbackError::invalid(
                        format!("{name}.slope"),
                        "slope must be finite",
                    ));
                }
            }
            PowerLawSpec::Broken {
                slope_low,
                slope_high,
                cut,
                ..
            } => {
                if !slope_low.is_finite() || !slope_high.is_finite() {
                    return Err(FeedbackError::invalid(
                        format!("{name}.slope_low/slope_high"),
                        "slopes must be finite",
                    ));
                }
                if !(cut > min && cut < max) {
                    return Err(FeedbackError::invalid(
                        format!("{name}.cut"),
                        format!("break {cut:e} must lie strictly inside [{min:e}, {max:e}]"),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PopulationParams {
    pub n_sources: usize,
    pub seed: u64,
    /// Jet power law [W].
    pub power: PowerLawSpec,
    /// Source age law [Myr].
    pub age: PowerLawSpec,
    /// Fraction of all radio sources that are compact (unresolved).
    pub compact_fraction: f64,
}

impl RunConfig {
    /// Load from JSON file and validate.
    pub fn from_file(path: impl AsRef<Path>) -> FeedbackResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject every degenerate parameter combination up front.
    pub fn validate(&self) -> FeedbackResult<()> {
        let c = &self.cosmology;
        if !(c.hubble > 0.0) {
            return Err(FeedbackError::invalid("cosmology.hubble", "must be > 0"));
        }
        if !(c.omega_m > 0.0) || !(c.omega_b > 0.0) || c.omega_b > c.omega_m {
            return Err(FeedbackError::invalid(
                "cosmology.omega_b",
                format!(
                    "need 0 < omega_b <= omega_m, got omega_b={}, omega_m={}",
                    c.omega_b, c.omega_m
                ),
            ));
        }
        if let Some(rho) = c.critical_density {
            if !(rho > 0.0) || !rho.is_finite() {
                return Err(FeedbackError::invalid(
                    "cosmology.critical_density",
                    "must be finite and > 0",
                ));
            }
        }
        if !(self.halo.mass_msun > 0.0) || !(self.halo.overdensity > 0.0) {
            return Err(FeedbackError::invalid(
                "halo",
                "mass_msun and overdensity must be > 0",
            ));
        }

        self.cluster.validate()?;

        let g = &self.grid;
        if g.n_points < 3 {
            return Err(FeedbackError::invalid("grid.n_points", "need at least 3 points"));
        }
        if !(g.s_min > 0.0) || !(g.s_max > g.s_min) || !g.s_max.is_finite() {
            return Err(FeedbackError::invalid(
                "grid.s_min/s_max",
                format!("need 0 < s_min < s_max, got [{}, {}]", g.s_min, g.s_max),
            ));
        }

        let j = &self.jet;
        if !(j.narrow_half_angle_deg > 0.0 && j.narrow_half_angle_deg < 90.0) {
            return Err(FeedbackError::invalid(
                "jet.narrow_half_angle_deg",
                "must lie in (0, 90)",
            ));
        }
        if !(j.fr1_half_angle_deg >= j.narrow_half_angle_deg && j.fr1_half_angle_deg < 90.0) {
            return Err(FeedbackError::invalid(
                "jet.fr1_half_angle_deg",
                "must lie in [narrow_half_angle_deg, 90)",
            ));
        }
        if !(j.normalization_radius_fraction > 0.0) {
            return Err(FeedbackError::invalid(
                "jet.normalization_radius_fraction",
                "must be > 0",
            ));
        }
        if !(j.host_radius_kpc > 0.0) || !(j.host_density_cm3 > 0.0) {
            return Err(FeedbackError::invalid(
                "jet.host_radius_kpc/host_density_cm3",
                "must be > 0",
            ));
        }
        if !(j.trace_floor_kpc > 0.0) {
            return Err(FeedbackError::invalid("jet.trace_floor_kpc", "must be > 0"));
        }
        if j.trace_points < 2 {
            return Err(FeedbackError::invalid("jet.trace_points", "need at least 2 points"));
        }

        let p = &self.population;
        if p.n_sources == 0 {
            return Err(FeedbackError::invalid("population.n_sources", "must be >= 1"));
        }
        p.power.validate("population.power")?;
        p.age.validate("population.age")?;
        if !(0.0..1.0).contains(&p.compact_fraction) {
            return Err(FeedbackError::invalid(
                "population.compact_fraction",
                format!("must lie in [0, 1), got {}", p.compact_fraction),
            ));
        }

        if self.duty_cycles.is_empty() {
            return Err(FeedbackError::invalid("duty_cycles", "need at least one entry"));
        }
        for &delta in &self.duty_cycles {
            if !(delta > 0.0 && delta <= 1.0) {
                return Err(FeedbackError::invalid(
                    "duty_cycles",
                    format!("duty fraction {delta} outside (0, 1]"),
                ));
            }
        }
        Ok(())
    }
}

impl ClusterParameters {
    /// The profile closures divide by 3−a, 2−e, 3−e and 4−e; reject them all here.
    pub fn validate(&self) -> FeedbackResult<()> {
        if !(self.concentration > 0.0) || !self.concentration.is_finite() {
            return Err(FeedbackError::invalid("cluster.concentration", "must be finite and > 0"));
        }
        if !self.dm_slope.is_finite() || self.dm_slope >= 3.0 {
            return Err(FeedbackError::invalid(
                "cluster.dm_slope",
                format!("a = {} makes the 3−a kernel exponent vanish or flip sign", self.dm_slope),
            ));
        }
        if !(self.gas_dilution > 0.0) || !self.gas_dilution.is_finite() {
            return Err(FeedbackError::invalid("cluster.gas_dilution", "must be finite and > 0"));
        }
        if !self.gas_slope.is_finite() || !(0.0..2.0).contains(&self.gas_slope) {
            return Err(FeedbackError::invalid(
                "cluster.gas_slope",
                format!(
                    "e = {} must lie in [0, 2) so that 2−e, 3−e and 4−e stay positive",
                    self.gas_slope
                ),
            ));
        }
        if !(self.baryon_retention > 0.0 && self.baryon_retention <= 1.0) {
            return Err(FeedbackError::invalid(
                "cluster.baryon_retention",
                "must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for RunConfig {
    /// A massive cool-core cluster with a FR-I/FR-II jet population.
    fn default() -> Self {
        RunConfig {
            cosmology: CosmologyParams {
                hubble: 0.7,
                omega_m: 0.3,
                omega_b: 0.048,
                critical_density: None,
            },
            halo: HaloParams {
                mass_msun: 1.0e15,
                overdensity: 200.0,
            },
            cluster: ClusterParameters {
                concentration: 4.0,
                dm_slope: 1.0,
                gas_dilution: 1.5,
                gas_slope: 0.5,
                baryon_retention: 0.9,
            },
            grid: GridParams::default(),
            jet: JetGeometry {
                narrow_half_angle_deg: 5.0,
                fr1_half_angle_deg: 30.0,
                normalization_radius_fraction: 0.01,
                host_radius_kpc: 15.0,
                host_density_cm3: 0.1,
                trace_floor_kpc: 0.5,
                trace_points: default_trace_points(),
            },
            population: PopulationParams {
                n_sources: 1000,
                seed: 42,
                power: PowerLawSpec::Broken {
                    slope_low: -0.6,
                    slope_high: -1.8,
                    min: 1.0e35,
                    cut: 1.0e38,
                    max: 1.0e40,
                },
                age: PowerLawSpec::Single {
                    slope: -1.0,
                    min: 1.0,
                    max: 1000.0,
                },
                compact_fraction: 0.2,
            },
            duty_cycles: vec![0.1, 0.3],
            cooling_table: None,
        }
    }
}
