//! Numerical primitives for the radio-jet feedback model.

pub mod grid;
pub mod interp;
pub mod quadrature;
