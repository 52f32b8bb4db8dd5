//! Axis-aligned volumes that make up the static world and entity hitboxes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier attached to a static volume so it can be removed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VolumeId(u32);

impl VolumeId {
    /// Creates a new volume identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Immutable axis-aligned box used for collision and visibility queries.
///
/// Bounds are derived once at construction. Moving entities build a fresh
/// volume for every query instead of updating bounds in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    center: Vec3,
    half_extents: Vec3,
    min: Vec3,
    max: Vec3,
    solid: bool,
    id: Option<VolumeId>,
}

impl Volume {
    /// Creates a solid volume from its centre and full width, height and depth.
    #[must_use]
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self::from_half_extents(center, size * 0.5)
    }

    /// Creates a solid volume from its centre and half-extents.
    ///
    /// Negative extents are mirrored and non-finite extents collapse to zero,
    /// so `left <= right`, `bottom <= top` and `back <= front` always hold.
    #[must_use]
    pub fn from_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half_extents = sanitize_extents(half_extents);
        Self {
            center,
            half_extents,
            min: center - half_extents,
            max: center + half_extents,
            solid: true,
            id: None,
        }
    }

    /// Marks the volume as non-solid so collision queries ignore it.
    #[must_use]
    pub fn non_solid(mut self) -> Self {
        self.solid = false;
        self
    }

    /// Attaches an identifier used to remove the volume from the world.
    #[must_use]
    pub fn with_id(mut self, id: VolumeId) -> Self {
        self.id = Some(id);
        self
    }

    /// Centre of the volume.
    #[must_use]
    pub const fn center(&self) -> Vec3 {
        self.center
    }

    /// Half of the width, height and depth.
    #[must_use]
    pub const fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Corner with the smallest coordinates (left, bottom, back).
    #[must_use]
    pub const fn min(&self) -> Vec3 {
        self.min
    }

    /// Corner with the largest coordinates (right, top, front).
    #[must_use]
    pub const fn max(&self) -> Vec3 {
        self.max
    }

    /// Smallest x coordinate covered by the volume.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    /// Largest x coordinate covered by the volume.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    /// Smallest y coordinate covered by the volume.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.min.y
    }

    /// Largest y coordinate covered by the volume.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.max.y
    }

    /// Smallest z coordinate covered by the volume.
    #[must_use]
    pub fn back(&self) -> f32 {
        self.min.z
    }

    /// Largest z coordinate covered by the volume.
    #[must_use]
    pub fn front(&self) -> f32 {
        self.max.z
    }

    /// Reports whether the volume participates in collision queries.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }

    /// Identifier attached to the volume, if any.
    #[must_use]
    pub const fn id(&self) -> Option<VolumeId> {
        self.id
    }

    /// Reports whether the centre and bounds are all finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Separating-axis overlap test between two volumes.
    ///
    /// Touching faces count as overlapping. Solidity is not considered here;
    /// see [`crate::overlaps_any`] for the filtered world query. A volume with
    /// non-finite bounds never separates, so it reports an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Volume) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.min.y > other.max.y
            || self.max.y < other.min.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    /// Reports whether the point lies inside or on the surface of the volume.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

fn sanitize_extents(extents: Vec3) -> Vec3 {
    let axis = |value: f32| if value.is_finite() { value.abs() } else { 0.0 };
    Vec3::new(axis(extents.x), axis(extents.y), axis(extents.z))
}
