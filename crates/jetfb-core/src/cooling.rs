// ─────────────────────────────────────────────────────────────────────
// JetFB — Radiative Cooling
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cooling function Λ(T) and the derived cooling time and power density.
//!
//! Tables are tabulated as (log₁₀ T [K], log₁₀ Λ [erg cm³ s⁻¹]) and
//! converted to SI on load. Lookups interpolate linearly in log-log and
//! hold the edge value outside the table.

use jetfb_math::interp::interp_clamped;
use jetfb_types::constants::{HYDROGEN_PER_ELECTRON, K_BOLTZMANN, LAMBDA_CGS_TO_SI};
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{CoolingProfile, GasProfile};
use std::path::Path;

/// Free-free emissivity coefficient Λ_ff ≈ 2.4e-27 √T erg cm³ s⁻¹.
const FREE_FREE_COEFF_CGS: f64 = 2.4e-27;

/// Tabulated cooling function, stored as log₁₀ T and log₁₀ Λ[W m³].
#[derive(Debug, Clone)]
pub struct CoolingTable {
    log_t: Vec<f64>,
    log_lambda: Vec<f64>,
}

impl CoolingTable {
    /// Build from (log₁₀ T, log₁₀ Λ_cgs) rows; log T must be strictly increasing.
    pub fn from_pairs(rows: &[(f64, f64)]) -> FeedbackResult<Self> {
        if rows.len() < 2 {
            return Err(FeedbackError::ConfigError(format!(
                "cooling table needs at least 2 rows, got {}",
                rows.len()
            )));
        }
        if let Some(i) = rows
            .iter()
            .position(|(t, l)| !t.is_finite() || !l.is_finite())
        {
            return Err(FeedbackError::ConfigError(format!(
                "cooling table row {i} is not finite: {:?}",
                rows[i]
            )));
        }
        if let Some(i) = rows.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(FeedbackError::ConfigError(format!(
                "cooling table log T not strictly increasing at row {}",
                i + 1
            )));
        }
        let offset = LAMBDA_CGS_TO_SI.log10();
        Ok(CoolingTable {
            log_t: rows.iter().map(|r| r.0).collect(),
            log_lambda: rows.iter().map(|r| r.1 + offset).collect(),
        })
    }

    /// Parse a whitespace-separated two-column table. Blank lines and
    /// `#` comments are skipped; extra columns are ignored.
    pub fn parse(text: &str) -> FeedbackResult<Self> {
        let mut rows = Vec::new();
        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut cols = line.split_whitespace();
            let mut next = |what: &str| -> FeedbackResult<f64> {
                let tok = cols.next().ok_or_else(|| {
                    FeedbackError::ConfigError(format!(
                        "cooling table line {}: missing {what}",
                        lineno + 1
                    ))
                })?;
                tok.parse::<f64>().map_err(|e| {
                    FeedbackError::ConfigError(format!(
                        "cooling table line {}: bad {what} `{tok}`: {e}",
                        lineno + 1
                    ))
                })
            };
            let log_t = next("log T")?;
            let log_lambda = next("log Λ")?;
            rows.push((log_t, log_lambda));
        }
        Self::from_pairs(&rows)
    }

    pub fn from_file(path: impl AsRef<Path>) -> FeedbackResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let table = Self::parse(&contents)?;
        log::info!(
            "Loaded cooling table {} ({} rows, log T ∈ [{:.2}, {:.2}])",
            path.as_ref().display(),
            table.len(),
            table.log_t[0],
            table.log_t[table.len() - 1]
        );
        Ok(table)
    }

    /// Pure bremsstrahlung Λ ∝ √T on log T ∈ [5, 9], for runs without a table.
    pub fn free_free() -> Self {
        let rows: Vec<(f64, f64)> = (0..=40)
            .map(|i| {
                let log_t = 5.0 + 0.1 * i as f64;
                (log_t, FREE_FREE_COEFF_CGS.log10() + 0.5 * log_t)
            })
            .collect();
        CoolingTable {
            log_t: rows.iter().map(|r| r.0).collect(),
            log_lambda: rows
                .iter()
                .map(|r| r.1 + LAMBDA_CGS_TO_SI.log10())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.log_t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_t.is_empty()
    }

    /// Temperature span [K] covered by the table.
    pub fn temperature_range(&self) -> (f64, f64) {
        (
            10f64.powf(self.log_t[0]),
            10f64.powf(self.log_t[self.len() - 1]),
        )
    }

    pub fn covers(&self, temperature_k: f64) -> bool {
        let lt = temperature_k.log10();
        lt >= self.log_t[0] && lt <= self.log_t[self.len() - 1]
    }

    /// Λ(T) [W m³], held at the edge value outside the table.
    pub fn lambda(&self, temperature_k: f64) -> f64 {
        10f64.powf(interp_clamped(&self.log_t, &self.log_lambda, temperature_k.log10()))
    }

    /// Λ(T) [W m³], failing outside the table.
    pub fn lambda_strict(&self, temperature_k: f64) -> FeedbackResult<f64> {
        if !self.covers(temperature_k) {
            let (min, max) = self.temperature_range();
            return Err(FeedbackError::InterpolationOutOfRange {
                table: "cooling".to_string(),
                value: temperature_k,
                min,
                max,
            });
        }
        Ok(self.lambda(temperature_k))
    }
}

/// Cooling time t_cool = (3/2) kT / (Λ n_e) and power n_H² Λ on every grid point.
pub fn cooling_profile(gas: &GasProfile, table: &CoolingTable) -> CoolingProfile {
    let n = gas.temperature.len();
    let mut cooling_time = ndarray::Array1::zeros(n);
    let mut cooling_power = ndarray::Array1::zeros(n);
    let mut clamped = 0usize;

    for i in 0..n {
        let t = gas.temperature[i];
        let n_e = gas.electron_density[i];
        if !table.covers(t) {
            clamped += 1;
        }
        let lambda = table.lambda(t);
        let n_h = HYDROGEN_PER_ELECTRON * n_e;
        cooling_time[i] = 1.5 * K_BOLTZMANN * t / (lambda * n_e);
        cooling_power[i] = n_h * n_h * lambda;
    }

    if clamped > 0 {
        log::debug!("Cooling lookup clamped at {clamped} of {n} grid points");
    }
    log::info!(
        "Cooling profile: t_cool(s_min) = {:.3e} s, t_cool(s_max) = {:.3e} s",
        cooling_time[0],
        cooling_time[n.saturating_sub(1)]
    );

    CoolingProfile {
        cooling_time,
        cooling_power,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn gas_at(temps: &[f64], n_e: f64) -> GasProfile {
        let n = temps.len();
        GasProfile {
            density: Array1::ones(n),
            temperature: Array1::from(temps.to_vec()),
            pressure: Array1::ones(n),
            sound_speed: Array1::ones(n),
            electron_density: Array1::from_elem(n, n_e),
            pressure_gradient: Array1::from_elem(n, -1.0),
        }
    }

    #[test]
    fn test_from_pairs_rejects_non_monotone() {
        assert!(CoolingTable::from_pairs(&[(6.0, -23.0), (6.0, -22.5)]).is_err());
        assert!(CoolingTable::from_pairs(&[(6.0, -23.0)]).is_err());
        assert!(CoolingTable::from_pairs(&[(6.0, -23.0), (7.0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_cgs_to_si_conversion() {
        let table = CoolingTable::from_pairs(&[(6.0, -23.0), (8.0, -22.0)]).unwrap();
        let lambda = table.lambda(1e6);
        assert!((lambda / 1e-36 - 1.0).abs() < 1e-12, "Λ = {lambda:e}");
        // Midpoint in log-log.
        assert!((table.lambda(1e7) / 10f64.powf(-35.5) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lookup_clamps_but_strict_fails() {
        let table = CoolingTable::from_pairs(&[(6.0, -23.0), (8.0, -22.0)]).unwrap();
        assert_eq!(table.lambda(1e3), table.lambda(1e6));
        assert_eq!(table.lambda(1e10), table.lambda(1e8));
        match table.lambda_strict(1e9) {
            Err(FeedbackError::InterpolationOutOfRange { table, value, .. }) => {
                assert_eq!(table, "cooling");
                assert_eq!(value, 1e9);
            }
            other => panic!("expected out-of-range, got {other:?}"),
        }
        assert!(table.lambda_strict(5e7).is_ok());
    }

    #[test]
    fn test_parse_with_comments() {
        let text = "# log T   log Λ\n\n5.0 -21.5  extra\n6.0 -22.0 # tail comment\n7.0 -22.6\n";
        let table = CoolingTable::parse(text).unwrap();
        assert_eq!(table.len(), 3);
        assert!(CoolingTable::parse("5.0\n6.0 -22\n").is_err());
        assert!(CoolingTable::parse("5.0 abc\n6.0 -22\n").is_err());
    }

    #[test]
    fn test_free_free_scaling() {
        let table = CoolingTable::free_free();
        let ratio = table.lambda(4e7) / table.lambda(1e7);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cooling_time_and_power() {
        let table = CoolingTable::from_pairs(&[(6.0, -23.0), (8.0, -23.0)]).unwrap();
        let n_e = 1e4;
        let prof = cooling_profile(&gas_at(&[1e7, 5e7], n_e), &table);
        let lambda = 1e-36;
        let expected = 1.5 * K_BOLTZMANN * 1e7 / (lambda * n_e);
        assert!((prof.cooling_time[0] / expected - 1.0).abs() < 1e-12);
        assert!((prof.cooling_time[1] / prof.cooling_time[0] - 5.0).abs() < 1e-12);
        let n_h = 4.0 / 9.0 * n_e;
        assert!((prof.cooling_power[0] / (n_h * n_h * lambda) - 1.0).abs() < 1e-12);
    }
}
