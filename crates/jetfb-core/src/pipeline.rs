// ─────────────────────────────────────────────────────────────────────
// JetFB — Pipeline
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! End-to-end run: cluster → cooling → population → jets → feedback.

use crate::cluster::ClusterModel;
use crate::cooling::{cooling_profile, CoolingTable};
use crate::feedback::FeedbackAggregator;
use crate::jet::{JetEnvironment, JetEvolution};
use crate::sampler::{EscapeModel, PopulationSampler};
use jetfb_types::config::RunConfig;
use jetfb_types::error::{FeedbackError, FeedbackResult};
use jetfb_types::state::{
    AggregateResult, CoolingProfile, EvolvedJet, GasProfile, PopulationSummary, VirialScale,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub virial: VirialScale,
    pub gas: GasProfile,
    pub cooling: CoolingProfile,
    pub jets: Vec<EvolvedJet>,
    pub summary: PopulationSummary,
    pub aggregate: AggregateResult,
}

/// Run the full model for `config`, seeding the sampler from `config.population.seed`.
pub fn run(config: &RunConfig, table: &CoolingTable) -> FeedbackResult<PipelineOutput> {
    config.validate()?;

    let cluster = ClusterModel::from_config(config)?;
    let gas = cluster.profile().clone();
    let cooling = cooling_profile(&gas, table);

    let escape = EscapeModel::new(&config.jet, config.cluster.gas_slope)?;
    let sampler = PopulationSampler::new(&config.population, escape)?;
    let mut rng = StdRng::seed_from_u64(config.population.seed);
    let population = sampler.sample(&mut rng);
    if population.sources.is_empty() {
        return Err(FeedbackError::SamplingDegeneracy {
            sampled: population.counts.sampled,
            stuck: population.counts.stuck,
        });
    }

    let env = JetEnvironment::from_cluster(&cluster, config.jet.normalization_radius_fraction)?;
    log::debug!(
        "Jet environment: r0 = {:.3e} m, ρ0 = {:.3e} kg m⁻³, p0 = {:.3e} Pa",
        env.r0_m,
        env.density0,
        env.pressure0
    );
    let evolution = JetEvolution::new(env, &config.jet)?;
    let jets = evolution.evolve_all(&population.sources);

    let aggregator = FeedbackAggregator::new(
        cluster.grid(),
        cluster.virial().radius_m,
        &gas,
        &cooling,
        evolution,
        &config.duty_cycles,
    )?;
    let aggregate = aggregator.aggregate(&jets, &population.counts)?;
    let summary = population.summary(&jets);

    log::info!(
        "Run complete: escaped fraction {:.3}, {} averaged entries",
        summary.escaped_fraction,
        aggregate.averaged_entries
    );

    Ok(PipelineOutput {
        virial: *cluster.virial(),
        gas,
        cooling,
        jets,
        summary,
        aggregate,
    })
}
