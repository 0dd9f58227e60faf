//! Candidate cells of each effect family.
//!
//! Shapes only consult the mine boundary. Destructibility is checked when
//! the cells are actually broken.

use rand::Rng;
use veinstone_shared::{Axis, BlockPos, Vec3, MAX_BOUNDARY_PROBE};

use crate::collaborators::MineBoundary;

/// Orientation of a jackhammer plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JackhammerOrientation {
    /// Fixed Y; spans X and Z.
    Horizontal,
    /// Fixed X or Z; spans Y and the other horizontal axis.
    Vertical {
        /// The axis held fixed (X or Z).
        fixed: Axis,
    },
}

impl JackhammerOrientation {
    /// Picks horizontal or vertical with equal odds, then the fixed axis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::Horizontal
        } else if rng.gen_bool(0.5) {
            Self::Vertical { fixed: Axis::X }
        } else {
            Self::Vertical { fixed: Axis::Z }
        }
    }

    /// The two axes spanned by the plane.
    #[must_use]
    pub const fn spanned(self) -> (Axis, Axis) {
        match self {
            Self::Horizontal => (Axis::X, Axis::Z),
            Self::Vertical { fixed: Axis::X } => (Axis::Y, Axis::Z),
            Self::Vertical { .. } => (Axis::Y, Axis::X),
        }
    }
}

/// Cells along a ray, stopping at the first one outside the boundary.
///
/// The origin itself is not included.
#[must_use]
pub fn laser_path(
    boundary: &dyn MineBoundary,
    origin: BlockPos,
    direction: Vec3,
    range: u32,
) -> Vec<BlockPos> {
    let step = direction.normalized();
    if step == Vec3::ZERO {
        return Vec::new();
    }
    let start = origin.center();
    let mut cells = Vec::with_capacity(range as usize);
    for i in 1..=range {
        let pos = BlockPos::containing(start + step * f64::from(i));
        if !boundary.contains(pos) {
            break;
        }
        if cells.last() != Some(&pos) {
            cells.push(pos);
        }
    }
    cells
}

/// Cells of the cube of half-width `radius` around the origin that lie
/// inside the boundary.
#[must_use]
pub fn explosion_cube(boundary: &dyn MineBoundary, origin: BlockPos, radius: i32) -> Vec<BlockPos> {
    let radius = radius.max(0);
    let mut cells = Vec::new();
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                let pos = origin.offset(dx, dy, dz);
                if boundary.contains(pos) {
                    cells.push(pos);
                }
            }
        }
    }
    cells
}

/// Extent of the boundary along one axis through `origin`.
///
/// Each direction probes at most [`MAX_BOUNDARY_PROBE`] cells, so an
/// unbounded predicate still terminates.
#[must_use]
pub fn probe_extent(boundary: &dyn MineBoundary, origin: BlockPos, axis: Axis) -> (i32, i32) {
    let start = origin.get(axis);

    let mut low = start;
    for _ in 0..MAX_BOUNDARY_PROBE {
        let Some(next) = low.checked_sub(1) else { break };
        if !boundary.contains(origin.with(axis, next)) {
            break;
        }
        low = next;
    }

    let mut high = start;
    for _ in 0..MAX_BOUNDARY_PROBE {
        let Some(next) = high.checked_add(1) else { break };
        if !boundary.contains(origin.with(axis, next)) {
            break;
        }
        high = next;
    }

    (low, high)
}

/// Cells of the full plane through the origin.
///
/// The two spanned axes are probed once through the origin; every cell of
/// the resulting rectangle is returned, including cells a non-rectangular
/// boundary would exclude.
#[must_use]
pub fn jackhammer_plane(
    boundary: &dyn MineBoundary,
    origin: BlockPos,
    orientation: JackhammerOrientation,
) -> Vec<BlockPos> {
    let (first, second) = orientation.spanned();
    let (first_low, first_high) = probe_extent(boundary, origin, first);
    let (second_low, second_high) = probe_extent(boundary, origin, second);

    (first_low..=first_high)
        .flat_map(|a| (second_low..=second_high).map(move |b| origin.with(first, a).with(second, b)))
        .collect()
}

/// Uniformly distributed unit vector.
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let theta: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}
