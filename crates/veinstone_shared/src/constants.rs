//! # Engine Constants
//!
//! Values that are fixed by the host game rather than by balance config.
//! Balance numbers (chances, multipliers, durations) live in the economy
//! crate's `EngineConfig`.

/// Hard ceiling on boundary probing, per axis direction.
///
/// A boundary predicate that never returns `false` still terminates after
/// this many steps.
pub const MAX_BOUNDARY_PROBE: i32 = 1000;
