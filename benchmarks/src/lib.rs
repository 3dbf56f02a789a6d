//! Scene setup shared by the shadow benchmarks.

use glam::Vec3;
use umbra::{BoundingBox, Camera, MeshBounds};

/// Eye-height camera looking along +X.
pub fn default_camera() -> Camera {
    Camera::new_perspective(
        Vec3::new(0.0, 0.0, 2.0),
        Vec3::new(1.0, 0.0, 2.0),
        Vec3::Z,
        60.0,
        16.0 / 9.0,
        0.1,
        500.0,
    )
}

/// `n` boxes of varying height on a square grid around the camera, plus a ground slab.
pub fn setup_city(n: usize) -> Vec<MeshBounds> {
    let side = (n as f32).sqrt().ceil().max(1.0) as usize;
    let spacing = 8.0;
    let offset = side as f32 * spacing * 0.5;

    let mut meshes = Vec::with_capacity(n + 1);
    meshes.push(MeshBounds::new(BoundingBox::new(
        Vec3::new(-offset, -offset, -1.0),
        Vec3::new(offset, offset, 0.0),
    )));

    let mut seed = 0x2545_f491_u32;
    for i in 0..n {
        let x = (i % side) as f32 * spacing - offset;
        let y = (i / side) as f32 * spacing - offset;
        let height = 2.0 + next_unit(&mut seed) * 30.0;
        meshes.push(MeshBounds::new(BoundingBox::new(
            Vec3::new(x, y, 0.0),
            Vec3::new(x + 4.0, y + 4.0, height),
        )));
    }
    meshes
}

/// Deterministic xorshift in `[0, 1)`.
fn next_unit(seed: &mut u32) -> f32 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 17;
    *seed ^= *seed << 5;
    (*seed >> 8) as f32 / (1u32 << 24) as f32
}
