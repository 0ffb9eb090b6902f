//! Radio-jet feedback on intracluster gas.
//!
//! Stage 1: hydrostatic cluster profile and radiative cooling
//! Stage 2: jet population sampling and escape filtering
//! Stage 3: per-source jet evolution and radial geometry
//! Stage 4: duty-cycle feedback aggregation

pub mod cluster;
pub mod cooling;
pub mod feedback;
pub mod jet;
pub mod pipeline;
pub mod sampler;
