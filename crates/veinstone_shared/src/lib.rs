//! # Veinstone Shared
//!
//! Value types shared by the mining engine and the world layer that feeds it.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - the economy engine
//! - any world, storage or scheduler implementation
//!
//! If you need behavior, put it in `veinstone_economy`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod constants;
pub mod material;
pub mod math;

pub use constants::MAX_BOUNDARY_PROBE;
pub use material::Material;
pub use math::{Axis, BlockPos, Vec3};
