//! Static geometry of the default headless arena.

use glam::Vec3;
use ufo_strike_core::{Volume, VolumeId};

const MAP_CENTER: Vec3 = Vec3::new(11.5, 0.0, -2121.0);
const MAP_WIDTH: f32 = 16_000.0;
const MAP_DEPTH: f32 = 13_000.0;
const BORDER_HEIGHT: f32 = 3_000.0;
const BORDER_THICKNESS: f32 = 100.0;

/// Footprints and heights of the arena buildings.
const BUILDINGS: [(f32, f32, f32, f32, f32); 6] = [
    (-2_500.0, -1_500.0, 800.0, 900.0, 1_200.0),
    (2_600.0, -900.0, 600.0, 1_400.0, 600.0),
    (-3_800.0, -4_600.0, 1_200.0, 700.0, 1_000.0),
    (3_400.0, -5_200.0, 900.0, 2_000.0, 900.0),
    (-5_200.0, 1_800.0, 700.0, 500.0, 700.0),
    (5_600.0, 2_400.0, 1_000.0, 1_100.0, 800.0),
];

/// Builds the ground slab, border walls and buildings of the default arena.
///
/// The ground's top face lies at height zero. Every volume carries an
/// identifier so scripted sessions can demolish geometry.
#[must_use]
pub fn default_arena() -> Vec<Volume> {
    let mut volumes = Vec::with_capacity(5 + BUILDINGS.len());
    let mut next_id = 0;
    let mut push = |volume: Volume| {
        volumes.push(volume.with_id(VolumeId::new(next_id)));
        next_id += 1;
    };

    push(Volume::new(
        MAP_CENTER - Vec3::Y * 10.0,
        Vec3::new(MAP_WIDTH, 20.0, MAP_DEPTH),
    ));

    let wall_y = BORDER_HEIGHT / 2.0;
    for side in [-1.0, 1.0] {
        push(Volume::new(
            Vec3::new(
                MAP_CENTER.x + side * MAP_WIDTH / 2.0,
                wall_y,
                MAP_CENTER.z,
            ),
            Vec3::new(BORDER_THICKNESS, BORDER_HEIGHT, MAP_DEPTH),
        ));
        push(Volume::new(
            Vec3::new(
                MAP_CENTER.x,
                wall_y,
                MAP_CENTER.z + side * MAP_DEPTH / 2.0,
            ),
            Vec3::new(MAP_WIDTH, BORDER_HEIGHT, BORDER_THICKNESS),
        ));
    }

    for (x, z, width, height, depth) in BUILDINGS {
        push(Volume::new(
            Vec3::new(x, height / 2.0, z),
            Vec3::new(width, height, depth),
        ));
    }

    volumes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_point_is_clear_and_above_ground() {
        let arena = default_arena();
        let spawn = Volume::from_half_extents(Vec3::new(0.0, 130.0, 20.0), Vec3::new(50.0, 100.0, 50.0));

        assert!(!ufo_strike_core::overlaps_any(&spawn, &arena));
        assert_eq!(arena[0].top(), 0.0);
    }

    #[test]
    fn every_volume_is_identified() {
        let arena = default_arena();
        let mut ids: Vec<u32> = arena
            .iter()
            .filter_map(|volume| volume.id().map(|id| id.get()))
            .collect();
        ids.dedup();

        assert_eq!(ids.len(), arena.len());
    }
}
