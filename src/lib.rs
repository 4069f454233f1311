// src/lib.rs
//! Random Java program generator for fuzz-testing JIT compilers.
//!
//! [`generate_program`] is the entry point: it produces a well-typed,
//! terminating program tree from a seed and a set of [`ProductionParams`].

pub mod builder;
pub mod context;
pub mod error;
pub mod factories;
pub mod generator;
pub mod ir;
pub mod limiter;
pub mod params;
pub mod profile;
pub mod random;
pub mod rule;
pub mod symbols;
pub mod types;

pub use error::{ProductionError, ProductionResult};
pub use generator::{describe_hierarchy, generate_program};
pub use params::ProductionParams;
pub use profile::{available_profiles, get_profile, ProfileError};
