//! Integrators built on top of the sequential engine.
pub mod one_dimensional;
