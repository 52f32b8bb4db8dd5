//! Brute-force collision and line-of-sight queries over static volumes.
//!
//! Every query is a linear scan over the provided slice. Volume counts stay in
//! the low hundreds, so no spatial index is maintained.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Volume;

/// Reports whether the candidate overlaps any solid volume.
#[must_use]
pub fn overlaps_any(candidate: &Volume, volumes: &[Volume]) -> bool {
    volumes
        .iter()
        .any(|volume| volume.is_solid() && candidate.overlaps(volume))
}

/// Box-shaped collision footprint carried by a moving entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    half_extents: Vec3,
}

impl Hitbox {
    /// Creates a hitbox from its half-extents.
    #[must_use]
    pub const fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// Half-extents of the hitbox.
    #[must_use]
    pub const fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    /// Builds the volume the hitbox occupies when centred at `center`.
    #[must_use]
    pub fn at(&self, center: Vec3) -> Volume {
        Volume::from_half_extents(center, self.half_extents)
    }

    /// Reports whether the hitbox centred at `center` touches solid geometry.
    #[must_use]
    pub fn collides_at(&self, center: Vec3, volumes: &[Volume]) -> bool {
        overlaps_any(&self.at(center), volumes)
    }
}

/// Distance along a ray to the point where it meets the volume.
///
/// `direction` must be normalised. Returns the entry distance, or the exit
/// distance when the origin already lies inside the volume, and `None` when
/// the ray misses or the volume lies entirely behind the origin.
#[must_use]
pub fn ray_box_distance(origin: Vec3, direction: Vec3, volume: &Volume) -> Option<f32> {
    let lower = volume.min();
    let upper = volume.max();
    let mut entry = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;

    for axis in 0..3 {
        let start = origin[axis];
        let step = direction[axis];
        if step.abs() <= f32::EPSILON {
            if start < lower[axis] || start > upper[axis] {
                return None;
            }
            continue;
        }

        let inverse = 1.0 / step;
        let mut near = (lower[axis] - start) * inverse;
        let mut far = (upper[axis] - start) * inverse;
        if near > far {
            std::mem::swap(&mut near, &mut far);
        }

        entry = entry.max(near);
        exit = exit.min(far);
        if entry > exit {
            return None;
        }
    }

    if exit < 0.0 {
        return None;
    }

    Some(if entry >= 0.0 { entry } else { exit })
}

/// Reports whether `target` is visible from `origin`.
///
/// Visibility is blocked as soon as one solid volume is met strictly closer
/// than the target. Coincident points are visible; non-finite points are not.
#[must_use]
pub fn line_of_sight(origin: Vec3, target: Vec3, volumes: &[Volume]) -> bool {
    if !origin.is_finite() || !target.is_finite() {
        return false;
    }

    let offset = target - origin;
    let distance = offset.length();
    let Some(direction) = offset.try_normalize() else {
        return true;
    };

    !volumes.iter().filter(|volume| volume.is_solid()).any(|volume| {
        ray_box_distance(origin, direction, volume).is_some_and(|hit| hit < distance)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Volume {
        Volume::new(Vec3::new(50.0, 0.0, 0.0), Vec3::new(10.0, 100.0, 100.0))
    }

    #[test]
    fn non_solid_volumes_are_ignored() {
        let ghost = wall().non_solid();
        let probe = Volume::new(Vec3::new(50.0, 0.0, 0.0), Vec3::splat(1.0));

        assert!(probe.overlaps(&ghost));
        assert!(!overlaps_any(&probe, &[ghost]));
        assert!(overlaps_any(&probe, &[ghost, wall()]));
    }

    #[test]
    fn hitbox_collides_against_solid_volumes() {
        let hitbox = Hitbox::new(Vec3::new(50.0, 100.0, 50.0));
        let volumes = [wall()];

        assert!(hitbox.collides_at(Vec3::ZERO, &volumes));
        assert!(!hitbox.collides_at(Vec3::new(-20.0, 0.0, 0.0), &volumes));
    }

    #[test]
    fn ray_reports_entry_distance() {
        let distance = ray_box_distance(Vec3::ZERO, Vec3::X, &wall()).expect("ray hits wall");

        assert!((distance - 45.0).abs() < 1e-4);
    }

    #[test]
    fn ray_from_inside_reports_exit_distance() {
        let distance =
            ray_box_distance(Vec3::new(50.0, 0.0, 0.0), Vec3::X, &wall()).expect("inside");

        assert!((distance - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ray_ignores_volumes_behind_origin() {
        assert!(ray_box_distance(Vec3::new(100.0, 0.0, 0.0), Vec3::X, &wall()).is_none());
        assert!(ray_box_distance(Vec3::ZERO, Vec3::Z, &wall()).is_none());
    }

    #[test]
    fn occluder_between_points_blocks_sight() {
        let volumes = [wall()];

        assert!(!line_of_sight(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), &volumes));
        assert!(line_of_sight(Vec3::ZERO, Vec3::new(30.0, 0.0, 0.0), &volumes));
        assert!(line_of_sight(
            Vec3::ZERO,
            Vec3::new(100.0, 0.0, 0.0),
            &[wall().non_solid()]
        ));
    }

    #[test]
    fn degenerate_rays_are_handled() {
        let volumes = [wall()];

        assert!(line_of_sight(Vec3::ONE, Vec3::ONE, &volumes));
        assert!(!line_of_sight(Vec3::splat(f32::NAN), Vec3::ZERO, &volumes));
    }
}
