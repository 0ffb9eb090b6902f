// ─────────────────────────────────────────────────────────────────────
// JetFB — Population Sampler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Monte Carlo draw of jet powers and ages, escape filtering and the
//! compact-source multiplicity.
//!
//! All power draws are taken before any age draw, so a fixed seed gives
//! the same (Q, age) pairs regardless of the escape model.

use jetfb_types::config::{JetGeometry, PopulationParams, PowerLawSpec};
use jetfb_types::constants::{C_LIGHT, KPC, MU_MEAN, MYR, M_PROTON, PER_CM3_TO_PER_M3};
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{JetSource, Population, PopulationCounts};
use rand::Rng;
use std::f64::consts::PI;

/// Slopes within this distance of −1 use the logarithmic closed form.
const LOG_SLOPE_TOL: f64 = 1e-9;

fn is_log_slope(slope: f64) -> bool {
    (slope + 1.0).abs() < LOG_SLOPE_TOL
}

/// ∫_lo^hi x^slope dx.
fn power_integral(slope: f64, lo: f64, hi: f64) -> f64 {
    if is_log_slope(slope) {
        (hi / lo).ln()
    } else {
        let k = slope + 1.0;
        (hi.powf(k) - lo.powf(k)) / k
    }
}

/// p(x) ∝ x^slope on [min, max].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleLaw {
    slope: f64,
    min: f64,
    max: f64,
}

impl SingleLaw {
    pub fn new(slope: f64, min: f64, max: f64) -> FeedbackResult<Self> {
        PowerLawSpec::Single { slope, min, max }.validate("power_law")?;
        Ok(SingleLaw { slope, min, max })
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let x = x.clamp(self.min, self.max);
        power_integral(self.slope, self.min, x) / power_integral(self.slope, self.min, self.max)
    }

    /// x(u) with u ∈ [0, 1].
    pub fn inverse_cdf(&self, u: f64) -> f64 {
        let x = if is_log_slope(self.slope) {
            self.min * (self.max / self.min).powf(u)
        } else {
            let k = self.slope + 1.0;
            let lo = self.min.powf(k);
            let hi = self.max.powf(k);
            (lo + u * (hi - lo)).powf(1.0 / k)
        };
        x.clamp(self.min, self.max)
    }
}

/// Two power-law segments joined continuously at `cut`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokenLaw {
    low: SingleLaw,
    high: SingleLaw,
    /// Probability mass below the break.
    mass_below_cut: f64,
}

impl BrokenLaw {
    pub fn new(slope_low: f64, slope_high: f64, min: f64, cut: f64, max: f64) -> FeedbackResult<Self> {
        PowerLawSpec::Broken {
            slope_low,
            slope_high,
            min,
            cut,
            max,
        }
        .validate("power_law")?;
        // Density A x^s₁ below the cut and A cut^{s₁−s₂} x^{s₂} above it.
        let below = power_integral(slope_low, min, cut);
        let above = cut.powf(slope_low - slope_high) * power_integral(slope_high, cut, max);
        Ok(BrokenLaw {
            low: SingleLaw::new(slope_low, min, cut)?,
            high: SingleLaw::new(slope_high, cut, max)?,
            mass_below_cut: below / (below + above),
        })
    }

    pub fn mass_below_cut(&self) -> f64 {
        self.mass_below_cut
    }

    pub fn cdf(&self, x: f64) -> f64 {
        if x <= self.low.max {
            self.mass_below_cut * self.low.cdf(x)
        } else {
            self.mass_below_cut + (1.0 - self.mass_below_cut) * self.high.cdf(x)
        }
    }

    pub fn inverse_cdf(&self, u: f64) -> f64 {
        let f = self.mass_below_cut;
        if u < f {
            self.low.inverse_cdf(u / f)
        } else if f < 1.0 {
            self.high.inverse_cdf((u - f) / (1.0 - f))
        } else {
            self.low.max
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerLaw {
    Single(SingleLaw),
    Broken(BrokenLaw),
}

impl PowerLaw {
    pub fn from_spec(spec: &PowerLawSpec) -> FeedbackResult<Self> {
        match *spec {
            PowerLawSpec::Single { slope, min, max } => {
                Ok(PowerLaw::Single(SingleLaw::new(slope, min, max)?))
            }
            PowerLawSpec::Broken {
                slope_low,
                slope_high,
                min,
                cut,
                max,
            } => Ok(PowerLaw::Broken(BrokenLaw::new(
                slope_low, slope_high, min, cut, max,
            )?)),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            PowerLaw::Single(law) => law.cdf(x),
            PowerLaw::Broken(law) => law.cdf(x),
        }
    }

    pub fn inverse_cdf(&self, u: f64) -> f64 {
        match self {
            PowerLaw::Single(law) => law.inverse_cdf(u),
            PowerLaw::Broken(law) => law.inverse_cdf(u),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.inverse_cdf(rng.gen::<f64>())
    }
}

/// Time for a jet to clear its host galaxy, whose gas falls off as
/// ρ_host (r / r_host)^{-e}:
///   τ_min(Q) = 2/(4−e) · r_host² · √(c π θ_j² ρ_host / Q).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeModel {
    gas_slope: f64,
    half_angle_rad: f64,
    host_radius_m: f64,
    /// Host gas mass density [kg m⁻³].
    host_density: f64,
}

impl EscapeModel {
    pub fn new(geometry: &JetGeometry, gas_slope: f64) -> FeedbackResult<Self> {
        if !(0.0..2.0).contains(&gas_slope) {
            return Err(FeedbackError::invalid(
                "cluster.gas_slope",
                format!("e = {gas_slope} outside [0, 2)"),
            ));
        }
        let theta = geometry.narrow_half_angle_deg.to_radians();
        if !(theta > 0.0 && theta < 0.5 * PI) {
            return Err(FeedbackError::invalid(
                "jet.narrow_half_angle_deg",
                "must lie in (0, 90)",
            ));
        }
        if !(geometry.host_radius_kpc > 0.0) || !(geometry.host_density_cm3 > 0.0) {
            return Err(FeedbackError::invalid(
                "jet.host_radius_kpc/host_density_cm3",
                "must be > 0",
            ));
        }
        Ok(EscapeModel {
            gas_slope,
            half_angle_rad: theta,
            host_radius_m: geometry.host_radius_kpc * KPC,
            host_density: geometry.host_density_cm3 * PER_CM3_TO_PER_M3 * MU_MEAN * M_PROTON,
        })
    }

    /// τ_min(Q) [s] for jet power Q [W].
    pub fn escape_time(&self, power_w: f64) -> f64 {
        let theta2 = self.half_angle_rad * self.half_angle_rad;
        2.0 / (4.0 - self.gas_slope)
            * self.host_radius_m
            * self.host_radius_m
            * (C_LIGHT * PI * theta2 * self.host_density / power_w).sqrt()
    }
}

/// Draws a population and splits it into escaped and stuck sources.
#[derive(Debug, Clone)]
pub struct PopulationSampler {
    n_sources: usize,
    power: PowerLaw,
    /// Age law in Myr.
    age: PowerLaw,
    compact_fraction: f64,
    escape: EscapeModel,
}

impl PopulationSampler {
    pub fn new(params: &PopulationParams, escape: EscapeModel) -> FeedbackResult<Self> {
        if params.n_sources == 0 {
            return Err(FeedbackError::invalid("population.n_sources", "must be > 0"));
        }
        if !(0.0..1.0).contains(&params.compact_fraction) {
            return Err(FeedbackError::invalid(
                "population.compact_fraction",
                format!("{} outside [0, 1)", params.compact_fraction),
            ));
        }
        Ok(PopulationSampler {
            n_sources: params.n_sources,
            power: PowerLaw::from_spec(&params.power)?,
            age: PowerLaw::from_spec(&params.age)?,
            compact_fraction: params.compact_fraction,
            escape,
        })
    }

    /// Number of cooling-only compact sources that accompany `escaped` jets.
    pub fn compact_count(&self, escaped: usize) -> usize {
        let f = self.compact_fraction;
        (f * escaped as f64 / (1.0 - f)).round() as usize
    }

    /// Draw `n_sources` (Q, age) pairs and keep those older than τ_min(Q),
    /// in draw order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Population {
        let powers: Vec<f64> = (0..self.n_sources).map(|_| self.power.sample(rng)).collect();
        let ages: Vec<f64> = (0..self.n_sources)
            .map(|_| self.age.sample(rng) * MYR)
            .collect();

        let mut sources = Vec::with_capacity(self.n_sources);
        for (&power_w, &age_s) in powers.iter().zip(&ages) {
            let escape_time_s = self.escape.escape_time(power_w);
            if age_s > escape_time_s {
                sources.push(JetSource {
                    power_w,
                    age_s,
                    escape_time_s,
                    active_time_s: age_s - escape_time_s,
                });
            }
        }

        let escaped = sources.len();
        let counts = PopulationCounts {
            sampled: self.n_sources,
            escaped,
            stuck: self.n_sources - escaped,
            compact: self.compact_count(escaped),
        };
        log::info!(
            "Sampled {} sources: {} escaped, {} stuck, {} compact",
            counts.sampled,
            counts.escaped,
            counts.stuck,
            counts.compact
        );
        Population { sources, counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jetfb_types::config::RunConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_log_slope_closed_form() {
        let law = SingleLaw::new(-1.0, 1.0, 1000.0).unwrap();
        assert!((law.inverse_cdf(0.5) - 1000f64.sqrt()).abs() < 1e-9);
        assert!((law.cdf(10.0) - 1.0 / 3.0).abs() < 1e-12);
        // Just outside the tolerance the general form must agree closely.
        let near = SingleLaw::new(-1.0 + 1e-6, 1.0, 1000.0).unwrap();
        assert!((near.inverse_cdf(0.5) / law.inverse_cdf(0.5) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_inverse_cdf_endpoints() {
        let law = SingleLaw::new(-1.8, 1e35, 1e40).unwrap();
        assert!((law.inverse_cdf(0.0) / 1e35 - 1.0).abs() < 1e-12);
        assert!((law.inverse_cdf(1.0) / 1e40 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_is_cdf_inverse() {
        let law = SingleLaw::new(0.7, 2.0, 9.0).unwrap();
        for &u in &[0.01, 0.3, 0.5, 0.77, 0.99] {
            assert!((law.cdf(law.inverse_cdf(u)) - u).abs() < 1e-12);
        }
    }

    #[test]
    fn test_broken_law_continuous_at_cut() {
        let law = BrokenLaw::new(-0.6, -1.8, 1e35, 1e38, 1e40).unwrap();
        let f = law.mass_below_cut();
        assert!(f > 0.0 && f < 1.0);
        assert!((law.cdf(1e38) - f).abs() < 1e-12);
        assert!((law.cdf(1e38 * (1.0 + 1e-12)) - f).abs() < 1e-9);
        assert!((law.inverse_cdf(f) / 1e38 - 1.0).abs() < 1e-9);
        // Density continuity: p(cut⁻) = p(cut⁺).
        let eps = 1e-6;
        let below = (law.cdf(1e38) - law.cdf(1e38 * (1.0 - eps))) / (1e38 * eps);
        let above = (law.cdf(1e38 * (1.0 + eps)) - law.cdf(1e38)) / (1e38 * eps);
        assert!((below / above - 1.0).abs() < 1e-4, "{below:e} vs {above:e}");
    }

    #[test]
    fn test_broken_law_rejects_cut_outside_bounds() {
        assert!(BrokenLaw::new(-1.0, -2.0, 1.0, 20.0, 10.0).is_err());
        assert!(SingleLaw::new(-1.0, 5.0, 5.0).is_err());
    }

    #[test]
    fn test_empirical_exponent_recovered() {
        // Least-squares slope of the log-binned density.
        let slope = -1.5;
        let law = PowerLaw::Single(SingleLaw::new(slope, 1.0, 1000.0).unwrap());
        let mut rng = StdRng::seed_from_u64(7);
        let n_bins = 15;
        let mut counts = vec![0usize; n_bins];
        for _ in 0..200_000 {
            let x = law.sample(&mut rng);
            let bin = ((x.log10() / 3.0) * n_bins as f64).floor() as usize;
            counts[bin.min(n_bins - 1)] += 1;
        }
        let mut pts = Vec::new();
        for (b, &c) in counts.iter().enumerate() {
            let lo = 10f64.powf(3.0 * b as f64 / n_bins as f64);
            let hi = 10f64.powf(3.0 * (b + 1) as f64 / n_bins as f64);
            let centre = (lo * hi).sqrt();
            pts.push((centre.ln(), (c as f64 / (hi - lo)).ln()));
        }
        let n = pts.len() as f64;
        let mx = pts.iter().map(|p| p.0).sum::<f64>() / n;
        let my = pts.iter().map(|p| p.1).sum::<f64>() / n;
        let sxy: f64 = pts.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
        let sxx: f64 = pts.iter().map(|p| (p.0 - mx).powi(2)).sum();
        let fitted = sxy / sxx;
        assert!((fitted - slope).abs() < 0.05, "fitted slope {fitted}");
    }

    #[test]
    fn test_escape_time_reference_value() {
        let geom = RunConfig::default().jet;
        let model = EscapeModel::new(&geom, 0.5).unwrap();
        // 5° jet, 15 kpc, 0.1 cm⁻³, Q = 1e37 W: τ_min ≈ 33 Myr.
        let tau_myr = model.escape_time(1e37) / MYR;
        assert!((tau_myr - 32.9).abs() < 0.5, "τ_min = {tau_myr} Myr");
        assert!((model.escape_time(1e39) / model.escape_time(1e37) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_escape_time_grows_with_gas_slope() {
        let geom = RunConfig::default().jet;
        let flat = EscapeModel::new(&geom, 0.0).unwrap().escape_time(1e38);
        let steep = EscapeModel::new(&geom, 1.5).unwrap().escape_time(1e38);
        assert!((steep / flat - 4.0 / 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_sample_counts_and_order() {
        let cfg = RunConfig::default();
        let escape = EscapeModel::new(&cfg.jet, cfg.cluster.gas_slope).unwrap();
        let sampler = PopulationSampler::new(&cfg.population, escape).unwrap();
        let pop = sampler.sample(&mut StdRng::seed_from_u64(cfg.population.seed));
        let c = pop.counts;
        assert_eq!(c.sampled, 1000);
        assert_eq!(c.escaped + c.stuck, c.sampled);
        assert_eq!(c.escaped, pop.sources.len());
        assert_eq!(c.compact, sampler.compact_count(c.escaped));
        for src in &pop.sources {
            assert!(src.age_s > src.escape_time_s);
            assert!((src.active_time_s - (src.age_s - src.escape_time_s)).abs() <= 1e-6 * src.age_s);
        }

        let again = sampler.sample(&mut StdRng::seed_from_u64(cfg.population.seed));
        assert_eq!(again.sources, pop.sources);
    }

    #[test]
    fn test_powers_drawn_before_ages_and_survivors_keep_order() {
        let cfg = RunConfig::default();
        let escape = EscapeModel::new(&cfg.jet, cfg.cluster.gas_slope).unwrap();
        let sampler = PopulationSampler::new(&cfg.population, escape).unwrap();
        let seed = 7_731;
        let pop = sampler.sample(&mut StdRng::seed_from_u64(seed));

        let power = PowerLaw::from_spec(&cfg.population.power).unwrap();
        let age = PowerLaw::from_spec(&cfg.population.age).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let n = cfg.population.n_sources;
        let powers: Vec<f64> = (0..n).map(|_| power.inverse_cdf(rng.gen())).collect();
        let ages: Vec<f64> = (0..n).map(|_| age.inverse_cdf(rng.gen()) * MYR).collect();
        let expected: Vec<JetSource> = powers
            .iter()
            .zip(&ages)
            .filter_map(|(&power_w, &age_s)| {
                let escape_time_s = escape.escape_time(power_w);
                (age_s > escape_time_s).then(|| JetSource {
                    power_w,
                    age_s,
                    escape_time_s,
                    active_time_s: age_s - escape_time_s,
                })
            })
            .collect();

        assert!(pop.counts.stuck > 0 && pop.counts.escaped > 0);
        assert_eq!(pop.sources, expected);
    }

    #[test]
    fn test_compact_count_rounding() {
        let cfg = RunConfig::default();
        let escape = EscapeModel::new(&cfg.jet, 0.5).unwrap();
        let mut params = cfg.population;
        params.compact_fraction = 0.2;
        let sampler = PopulationSampler::new(&params, escape).unwrap();
        // 0.2 · 10 / 0.8 = 2.5 → 3
        assert_eq!(sampler.compact_count(10), 3);
        assert_eq!(sampler.compact_count(0), 0);
        params.compact_fraction = 1.0;
        assert!(PopulationSampler::new(&params, escape).is_err());
    }
}
