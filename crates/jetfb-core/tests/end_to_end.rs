// ─────────────────────────────────────────────────────────────────────
// JetFB — End-to-End Scenario
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! 1000 sources with log-uniform power on [1e37, 1e40] W and log-uniform
//! age on [1, 1000] Myr, gas slope e = 0.5, duty cycles 0.1 and 0.3.

use jetfb_core::cooling::CoolingTable;
use jetfb_core::pipeline::{run, PipelineOutput};
use jetfb_core::sampler::EscapeModel;
use jetfb_types::config::{PowerLawSpec, RunConfig};
use jetfb_types::constants::MYR;
use jetfb_types::state::RadialGrid;

fn scenario() -> RunConfig {
    let mut cfg = RunConfig::default();
    cfg.cluster.gas_slope = 0.5;
    cfg.population.n_sources = 1000;
    cfg.population.seed = 20_240_611;
    cfg.population.power = PowerLawSpec::Single {
        slope: -1.0,
        min: 1e37,
        max: 1e40,
    };
    cfg.population.age = PowerLawSpec::Single {
        slope: -1.0,
        min: 1.0,
        max: 1000.0,
    };
    cfg.duty_cycles = vec![0.1, 0.3];
    cfg
}

fn run_scenario() -> (RunConfig, PipelineOutput) {
    let cfg = scenario();
    let out = run(&cfg, &CoolingTable::free_free()).expect("scenario run");
    (cfg, out)
}

#[test]
fn escaped_fraction_matches_escape_time_distribution() {
    let (cfg, out) = run_scenario();
    // With log-uniform Q and age, log τ_min is linear in log Q, so the
    // expected escaped fraction is 1 − log₁₀(τ_min(Q_median) / 1 Myr) / 3.
    let escape = EscapeModel::new(&cfg.jet, cfg.cluster.gas_slope).unwrap();
    let tau_med = escape.escape_time(10f64.powf(38.5)) / MYR;
    let expected = 1.0 - tau_med.log10() / 3.0;
    let got = out.summary.escaped_fraction;
    assert!(
        (got - expected).abs() < 0.06,
        "escaped fraction {got}, expected {expected}"
    );
    assert_eq!(out.summary.counts.sampled, 1000);
}

#[test]
fn duty_cycles_give_distinct_core_ntp() {
    let (cfg, out) = run_scenario();
    let grid = RadialGrid::log_spaced(cfg.grid.n_points, cfg.grid.s_min, cfg.grid.s_max).unwrap();
    let i = grid.nearest_index(0.01);
    let r = grid.s()[i] * out.virial.radius_m;

    let covered = out.jets.iter().any(|j| {
        j.trace.first().map_or(false, |p| p.radius_m <= r) && j.length_m >= r
    });
    assert!(covered, "no resolved jet reaches s = 0.01");

    let low = out.aggregate.profile(0.1).unwrap().mean_ntp[i];
    let high = out.aggregate.profile(0.3).unwrap().mean_ntp[i];
    assert!(low > 0.0 && high <= 1.0);
    // Heating scales with δ and only enters through the heating velocity.
    assert!(high > low, "NTP(0.3) = {high}, NTP(0.1) = {low}");
}

#[test]
fn profiles_are_grid_aligned_and_serializable() {
    let (cfg, out) = run_scenario();
    let agg = &out.aggregate;
    assert_eq!(agg.s.len(), cfg.grid.n_points);
    assert_eq!(
        agg.averaged_entries,
        out.summary.counts.escaped + out.summary.counts.compact
    );
    for p in &agg.profiles {
        assert_eq!(p.mean_ntp.len(), agg.s.len());
        assert_eq!(p.mean_velocity.len(), agg.s.len());
        assert_eq!(p.mean_injection_rate.len(), agg.s.len());
        assert!(p.mean_velocity.iter().all(|v| v.is_finite() && *v > 0.0));
    }
    let json = serde_json::to_string(agg).unwrap();
    assert!(json.contains("mean_ntp"));
}

#[test]
fn equilibrium_statistics_cover_flared_sources_only() {
    let (_, out) = run_scenario();
    let flared = out.jets.iter().filter(|j| j.phase.is_flared()).count();
    match out.summary.equilibrium {
        Some(stats) => {
            assert_eq!(stats.flared, flared);
            assert!(stats.mean_length_m > 0.0 && stats.median_time_s > 0.0);
        }
        None => assert_eq!(flared, 0),
    }
}
