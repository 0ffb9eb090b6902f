// ─────────────────────────────────────────────────────────────────────
// JetFB — Pipeline Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cluster profile construction, population evolution and the full run
//! on the default configuration.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use jetfb_core::cluster::ClusterModel;
use jetfb_core::cooling::CoolingTable;
use jetfb_core::jet::{JetEnvironment, JetEvolution};
use jetfb_core::pipeline::run;
use jetfb_core::sampler::{EscapeModel, PopulationSampler};
use jetfb_types::config::RunConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn bench_cluster_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_profile");
    group.sample_size(10);
    for &n in &[100usize, 500] {
        let mut cfg = RunConfig::default();
        cfg.grid.n_points = n;
        group.bench_with_input(BenchmarkId::from_parameter(n), &cfg, |b, cfg| {
            b.iter(|| ClusterModel::from_config(black_box(cfg)))
        });
    }
    group.finish();
}

fn bench_evolve_population(c: &mut Criterion) {
    let cfg = RunConfig::default();
    let cluster = ClusterModel::from_config(&cfg).expect("cluster");
    let escape = EscapeModel::new(&cfg.jet, cfg.cluster.gas_slope).expect("escape");
    let sampler = PopulationSampler::new(&cfg.population, escape).expect("sampler");
    let pop = sampler.sample(&mut StdRng::seed_from_u64(cfg.population.seed));
    let env = JetEnvironment::from_cluster(&cluster, cfg.jet.normalization_radius_fraction)
        .expect("environment");
    let evolution = JetEvolution::new(env, &cfg.jet).expect("evolution");

    c.bench_function("evolve_all_default_population", |b| {
        b.iter(|| black_box(evolution.evolve_all(&pop.sources)))
    });
}

fn bench_full_run(c: &mut Criterion) {
    let cfg = RunConfig::default();
    let table = CoolingTable::free_free();
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);
    group.bench_function("run_default", |b| b.iter(|| run(black_box(&cfg), &table)));
    group.finish();
}

criterion_group!(
    benches,
    bench_cluster_profile,
    bench_evolve_population,
    bench_full_run
);
criterion_main!(benches);
