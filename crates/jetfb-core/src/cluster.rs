// ─────────────────────────────────────────────────────────────────────
// JetFB — Cluster Profile
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Hydrostatic intracluster gas in a generalised-NFW halo.
//!
//! Dark matter follows ρ̃(s) = (cs)^{-a}(1+cs)^{a-3}, the gas follows the
//! same family with slope e and concentration C. The enclosed mass m(s)
//! is normalised to 1 at the virial radius. Hydrostatic equilibrium gives
//!   P(s) = (GM/r_vir) η f_b U ρ_s ∫_s^∞ g(t) m(t) / t² dt.
//!
//! All integrals over the profile shapes are taken in ln t, where the
//! integrands are smooth for every admissible slope.

use jetfb_math::interp::{gradient_nonuniform, interp_loglog};
use jetfb_math::quadrature::{integrate, integrate_to_infinity, QuadConfig};
use jetfb_types::config::{ClusterParameters, CosmologyParams, HaloParams, RunConfig};
use jetfb_types::constants::{
    GAMMA_ADIABATIC, G_NEWTON, H100, K_BOLTZMANN, MU_ELECTRON, MU_MEAN, M_PROTON, M_SUN,
};
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{GasProfile, RadialGrid, VirialScale};
use ndarray::Array1;
use std::f64::consts::PI;

/// Lower end of the precomputed inner-integral table (units of r_vir).
const INNER_T_MIN: f64 = 1e-7;

/// Upper end of the inner-integral table; m(t) is held constant beyond it.
const INNER_T_MAX: f64 = 1e4;

/// Points in the inner-integral table.
const INNER_POINTS: usize = 4096;

/// Virial scalars of a halo of mass M at overdensity Δ.
pub fn virial_scale(cosmology: &CosmologyParams, halo: &HaloParams) -> FeedbackResult<VirialScale> {
    let rho_c = match cosmology.critical_density {
        Some(rho) => rho,
        None => {
            let h0 = cosmology.hubble * H100;
            3.0 * h0 * h0 / (8.0 * PI * G_NEWTON)
        }
    };
    if !(rho_c > 0.0) || !rho_c.is_finite() {
        return Err(FeedbackError::invalid(
            "cosmology.critical_density",
            format!("must be finite and > 0, got {rho_c:e}"),
        ));
    }

    let mass_kg = halo.mass_msun * M_SUN;
    let radius_m = (3.0 * mass_kg / (4.0 * PI * halo.overdensity * rho_c)).cbrt();
    let velocity_m_s = (G_NEWTON * mass_kg / radius_m).sqrt();
    let kt = 0.5 * MU_MEAN * M_PROTON * velocity_m_s * velocity_m_s;
    let baryon_fraction = cosmology.omega_b / cosmology.omega_m;
    let pressure_pa = baryon_fraction * halo.overdensity * rho_c / (MU_MEAN * M_PROTON) * kt;

    Ok(VirialScale {
        mass_kg,
        radius_m,
        temperature_k: kt / K_BOLTZMANN,
        pressure_pa,
        velocity_m_s,
        critical_density: rho_c,
        baryon_fraction,
    })
}

/// Generalised NFW shape (x s)^{-slope} (1 + x s)^{slope-3}.
#[inline]
pub fn gnfw_shape(scale: f64, slope: f64, s: f64) -> f64 {
    let x = scale * s;
    x.powf(-slope) * (1.0 + x).powf(slope - 3.0)
}

/// Gas concentration C = (c/d)·(3−e)/(3−a).
pub fn gas_concentration(params: &ClusterParameters) -> FeedbackResult<f64> {
    params.validate()?;
    Ok(params.concentration / params.gas_dilution * (3.0 - params.gas_slope)
        / (3.0 - params.dm_slope))
}

/// ∫₀ˢ t² (xt)^{-slope}(1+xt)^{slope-3} dt.
///
/// The piece below `INNER_T_MIN` uses the small-radius limit
/// x^{-slope} t^{3-slope}/(3−slope); the rest is integrated in ln t.
fn cumulative_shape(kernel: &str, scale: f64, slope: f64, s: f64) -> FeedbackResult<f64> {
    let t0 = INNER_T_MIN.min(s);
    let start = scale.powf(-slope) * t0.powf(3.0 - slope) / (3.0 - slope);
    if s <= t0 {
        return Ok(start);
    }
    let body = integrate(
        kernel,
        |y: f64| {
            let t = y.exp();
            t * t * t * gnfw_shape(scale, slope, t)
        },
        t0.ln(),
        s.ln(),
        &QuadConfig::default(),
    )?;
    Ok(start + body.value)
}

/// Dark-matter normalisation u(c, a) = 1 / ∫₀¹ s² ρ̃(s) ds.
pub fn dm_normalization(concentration: f64, dm_slope: f64) -> FeedbackResult<f64> {
    if !dm_slope.is_finite() || dm_slope >= 3.0 {
        return Err(FeedbackError::invalid(
            "cluster.dm_slope",
            format!("a = {dm_slope} makes the 3−a kernel exponent vanish or flip sign"),
        ));
    }
    Ok(1.0 / cumulative_shape("dm_normalization", concentration, dm_slope, 1.0)?)
}

/// Gas normalisation U(c, a, d, e) = 1 / ∫₀¹ s² g(s) ds.
pub fn gas_normalization(params: &ClusterParameters) -> FeedbackResult<f64> {
    let big_c = gas_concentration(params)?;
    Ok(1.0 / cumulative_shape("gas_normalization", big_c, params.gas_slope, 1.0)?)
}

/// One cumulative shape integral I(t) = ∫₀ᵗ τ² shape(τ) dτ tabulated on a
/// uniform ln t grid. Interpolated with cubic Hermite in (ln t, ln I) using
/// the exact slope d ln I / d ln t = t³ shape(t) / I, so the interpolant is
/// C¹ and adaptive quadrature over it sees no kinks.
#[derive(Debug, Clone)]
struct CumulativeTable {
    scale: f64,
    slope: f64,
    ln_i: Vec<f64>,
    dln_i: Vec<f64>,
}

impl CumulativeTable {
    fn build(kernel: &str, scale: f64, slope: f64, ln_t: &[f64]) -> FeedbackResult<Self> {
        let cfg = QuadConfig::default();
        let integrand = |y: f64| {
            let t = y.exp();
            t * t * t * gnfw_shape(scale, slope, t)
        };
        let mut acc = scale.powf(-slope) * INNER_T_MIN.powf(3.0 - slope) / (3.0 - slope);
        let mut ln_i = Vec::with_capacity(ln_t.len());
        let mut dln_i = Vec::with_capacity(ln_t.len());
        ln_i.push(acc.ln());
        dln_i.push(integrand(ln_t[0]) / acc);
        for w in ln_t.windows(2) {
            acc += integrate(kernel, &integrand, w[0], w[1], &cfg)?.value;
            ln_i.push(acc.ln());
            dln_i.push(integrand(w[1]) / acc);
        }
        Ok(CumulativeTable {
            scale,
            slope,
            ln_i,
            dln_i,
        })
    }

    fn eval(&self, s: f64, step: f64) -> f64 {
        let n = self.ln_i.len();
        let x = (s.ln() - INNER_T_MIN.ln()) / step;
        if x <= 0.0 {
            // Small-radius limit below the table.
            return self.scale.powf(-self.slope) * s.powf(3.0 - self.slope) / (3.0 - self.slope);
        }
        if x >= (n - 1) as f64 {
            return self.ln_i[n - 1].exp();
        }
        let k = (x.floor() as usize).min(n - 2);
        let tau = x - k as f64;
        let tau2 = tau * tau;
        let tau3 = tau2 * tau;
        let h00 = 2.0 * tau3 - 3.0 * tau2 + 1.0;
        let h10 = tau3 - 2.0 * tau2 + tau;
        let h01 = -2.0 * tau3 + 3.0 * tau2;
        let h11 = tau3 - tau2;
        (h00 * self.ln_i[k]
            + h10 * step * self.dln_i[k]
            + h01 * self.ln_i[k + 1]
            + h11 * step * self.dln_i[k + 1])
            .exp()
    }
}

/// Dark-matter and gas cumulative integrals sharing one ln t grid.
#[derive(Debug, Clone)]
struct InnerIntegrals {
    step: f64,
    dm: CumulativeTable,
    gas: CumulativeTable,
}

impl InnerIntegrals {
    fn build(c: f64, a: f64, big_c: f64, e: f64) -> FeedbackResult<Self> {
        let l0 = INNER_T_MIN.ln();
        let step = (INNER_T_MAX.ln() - l0) / (INNER_POINTS - 1) as f64;
        let ln_t: Vec<f64> = (0..INNER_POINTS).map(|i| l0 + step * i as f64).collect();
        Ok(InnerIntegrals {
            step,
            dm: CumulativeTable::build("dm_enclosed", c, a, &ln_t)?,
            gas: CumulativeTable::build("gas_enclosed", big_c, e, &ln_t)?,
        })
    }

    fn dm(&self, s: f64) -> f64 {
        self.dm.eval(s, self.step)
    }

    fn gas(&self, s: f64) -> f64 {
        self.gas.eval(s, self.step)
    }
}

/// Everything needed to evaluate the cluster at arbitrary radius, plus
/// the gas profile sampled on the run's radial grid.
#[derive(Debug, Clone)]
pub struct ClusterModel {
    params: ClusterParameters,
    virial: VirialScale,
    norm_dm: f64,
    norm_gas: f64,
    gas_concentration: f64,
    /// ρ_s = M / (4π r_vir³)
    scale_density: f64,
    inner: InnerIntegrals,
    grid: RadialGrid,
    profile: GasProfile,
}

impl ClusterModel {
    pub fn from_config(config: &RunConfig) -> FeedbackResult<Self> {
        let grid = RadialGrid::log_spaced(config.grid.n_points, config.grid.s_min, config.grid.s_max)?;
        let virial = virial_scale(&config.cosmology, &config.halo)?;
        Self::build(config.cluster, virial, grid)
    }

    /// Precompute normalisations and inner integrals, then the gas profile on `grid`.
    pub fn build(
        params: ClusterParameters,
        virial: VirialScale,
        grid: RadialGrid,
    ) -> FeedbackResult<Self> {
        let big_c = gas_concentration(&params)?;
        let norm_dm = dm_normalization(params.concentration, params.dm_slope)?;
        let norm_gas = gas_normalization(&params)?;
        let inner = InnerIntegrals::build(
            params.concentration,
            params.dm_slope,
            big_c,
            params.gas_slope,
        )?;
        let scale_density = virial.mass_kg / (4.0 * PI * virial.radius_m.powi(3));

        let mut model = ClusterModel {
            params,
            virial,
            norm_dm,
            norm_gas,
            gas_concentration: big_c,
            scale_density,
            inner,
            grid,
            profile: GasProfile {
                density: Array1::zeros(0),
                temperature: Array1::zeros(0),
                pressure: Array1::zeros(0),
                sound_speed: Array1::zeros(0),
                electron_density: Array1::zeros(0),
                pressure_gradient: Array1::zeros(0),
            },
        };
        model.profile = model.sample_profile()?;

        log::info!(
            "Cluster profile: r_vir = {:.3e} m, T_vir = {:.3e} K, u = {:.4}, U = {:.4}, C = {:.4}",
            virial.radius_m,
            virial.temperature_k,
            norm_dm,
            norm_gas,
            big_c
        );
        Ok(model)
    }

    pub fn params(&self) -> &ClusterParameters {
        &self.params
    }

    pub fn virial(&self) -> &VirialScale {
        &self.virial
    }

    pub fn grid(&self) -> &RadialGrid {
        &self.grid
    }

    pub fn profile(&self) -> &GasProfile {
        &self.profile
    }

    pub fn dm_normalization(&self) -> f64 {
        self.norm_dm
    }

    pub fn gas_normalization(&self) -> f64 {
        self.norm_gas
    }

    pub fn gas_concentration(&self) -> f64 {
        self.gas_concentration
    }

    fn gas_weight(&self) -> f64 {
        self.params.baryon_retention * self.virial.baryon_fraction
    }

    /// Gas shape g(s).
    pub fn gas_shape(&self, s: f64) -> f64 {
        gnfw_shape(self.gas_concentration, self.params.gas_slope, s)
    }

    /// Enclosed total mass in units of M; equals 1 at s = 1.
    pub fn enclosed_mass(&self, s: f64) -> f64 {
        let w = self.gas_weight();
        (1.0 - w) * self.norm_dm * self.inner.dm(s) + w * self.norm_gas * self.inner.gas(s)
    }

    /// Gas density [kg m⁻³] at s.
    pub fn density_at(&self, s: f64) -> f64 {
        self.gas_weight() * self.norm_gas * self.scale_density * self.gas_shape(s)
    }

    fn pressure_integrand(&self, t: f64) -> f64 {
        self.gas_shape(t) * self.enclosed_mass(t) / (t * t)
    }

    /// J(s) = ∫_s^∞ g m / t² dt on every grid point, accumulated inward.
    fn pressure_integral(&self) -> FeedbackResult<Array1<f64>> {
        let cfg = QuadConfig::default();
        let s = self.grid.s();
        let n = s.len();
        let mut j = Array1::zeros(n);

        j[n - 1] = integrate_to_infinity(
            "pressure_tail",
            |t: f64| self.pressure_integrand(t),
            s[n - 1],
            &cfg,
        )?
        .value;

        for i in (0..n - 1).rev() {
            let seg = integrate(
                "pressure_integral",
                |y: f64| {
                    let t = y.exp();
                    t * self.pressure_integrand(t)
                },
                s[i].ln(),
                s[i + 1].ln(),
                &cfg,
            )?;
            j[i] = j[i + 1] + seg.value;
        }
        Ok(j)
    }

    fn sample_profile(&self) -> FeedbackResult<GasProfile> {
        let s = self.grid.s();
        let j = self.pressure_integral()?;
        let pressure_scale = G_NEWTON * self.virial.mass_kg / self.virial.radius_m
            * self.gas_weight()
            * self.norm_gas
            * self.scale_density;

        let density = s.mapv(|v| self.density_at(v));
        let pressure = j.mapv(|v| pressure_scale * v);
        let temperature = ndarray::Zip::from(&pressure)
            .and(&density)
            .map_collect(|&p, &rho| MU_MEAN * M_PROTON * p / (rho * K_BOLTZMANN));
        let sound_speed = ndarray::Zip::from(&pressure)
            .and(&density)
            .map_collect(|&p, &rho| (GAMMA_ADIABATIC * p / rho).sqrt());
        let electron_density = density.mapv(|rho| rho / (MU_ELECTRON * M_PROTON));
        let radii = self.grid.radii_m(self.virial.radius_m);
        let pressure_gradient = gradient_nonuniform(&radii, &pressure);

        if let Some(i) = pressure.iter().position(|p| !(p.is_finite() && *p > 0.0)) {
            return Err(FeedbackError::Integration {
                kernel: "pressure_integral".to_string(),
                lower: s[i],
                upper: f64::INFINITY,
                message: format!("non-positive pressure {:e}", pressure[i]),
            });
        }

        log::debug!(
            "Gas profile: n_e(s_min) = {:.3e} m⁻³, T(s_min) = {:.3e} K, P(s_max) = {:.3e} Pa",
            electron_density[0],
            temperature[0],
            pressure[s.len() - 1]
        );

        Ok(GasProfile {
            density,
            temperature,
            pressure,
            sound_speed,
            electron_density,
            pressure_gradient,
        })
    }

    /// Gas density and pressure at s by log-log interpolation of the profile.
    pub fn environment_at(&self, s: f64) -> (f64, f64) {
        let s_grid = self.grid.s().to_vec();
        (
            interp_loglog(&s_grid, &self.profile.density.to_vec(), s),
            interp_loglog(&s_grid, &self.profile.pressure.to_vec(), s),
        )
    }
}
