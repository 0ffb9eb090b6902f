// ─────────────────────────────────────────────────────────────────────
// JetFB — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
/// Newtonian gravitational constant (m³ kg⁻¹ s⁻²)
pub const G_NEWTON: f64 = 6.674_30e-11;

/// Proton mass (kg)
pub const M_PROTON: f64 = 1.672_621_923_69e-27;

/// Boltzmann constant (J/K)
pub const K_BOLTZMANN: f64 = 1.380649e-23;

/// Speed of light (m/s)
pub const C_LIGHT: f64 = 2.997_924_58e8;

/// Solar mass (kg)
pub const M_SUN: f64 = 1.988_47e30;

/// Kiloparsec (m)
pub const KPC: f64 = 3.085_677_581e19;

/// Megayear (s)
pub const MYR: f64 = 3.155_76e13;

/// H0 for h = 1, i.e. 100 km/s/Mpc expressed in s⁻¹.
pub const H100: f64 = 3.240_779_29e-18;

/// Mean molecular weight of fully ionised ICM gas.
pub const MU_MEAN: f64 = 0.6;

/// Mean molecular weight per free electron.
pub const MU_ELECTRON: f64 = 1.14;

/// Adiabatic index of a monatomic ideal gas.
pub const GAMMA_ADIABATIC: f64 = 5.0 / 3.0;

/// Hydrogen-to-electron number ratio used by the cooling power density.
pub const HYDROGEN_PER_ELECTRON: f64 = 4.0 / 9.0;

/// erg cm³ s⁻¹ → W m³
pub const LAMBDA_CGS_TO_SI: f64 = 1.0e-13;

/// cm⁻³ → m⁻³
pub const PER_CM3_TO_PER_M3: f64 = 1.0e6;
