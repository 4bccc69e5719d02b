use std::f32::consts::TAU;

use crate::{
    color::ColorPolicy,
    surface::{Point, Surface},
};

/// Number of particles drawn per frame.
pub const PARTICLE_COUNT: usize = 100;
/// Radius of each particle in pixels.
pub const PARTICLE_RADIUS: f32 = 2.0;

/// Mean magnitude over all bins, normalised so that 128 maps to 1.0.
pub fn intensity_multiplier(samples: &[u8]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u64 = samples.iter().map(|&sample| u64::from(sample)).sum();
    (sum as f32 / samples.len() as f32) / 128.0
}

/// Particle centres on a `width` x `height` surface.
pub fn positions(samples: &[u8], width: f32, height: f32) -> impl Iterator<Item = Point> + '_ {
    let count = if samples.is_empty() { 0 } else { PARTICLE_COUNT };
    let multiplier = intensity_multiplier(samples);
    let center = Point::new(width / 2.0, height / 2.0);
    let reach = height / 3.0;

    (0..count).map(move |index| {
        let angle = index as f32 / PARTICLE_COUNT as f32 * TAU;
        let intensity = f32::from(samples[index % samples.len()]) / 255.0;
        let distance = reach * intensity * multiplier;
        Point::new(
            center.x + angle.cos() * distance,
            center.y + angle.sin() * distance,
        )
    })
}

pub fn draw<S: Surface + ?Sized>(surface: &mut S, samples: &[u8], colors: &ColorPolicy) {
    let width = surface.width() as f32;
    let height = surface.height() as f32;

    for (index, position) in positions(samples, width, height).enumerate() {
        surface.fill_circle(position, PARTICLE_RADIUS, &colors.paint(index, PARTICLE_COUNT));
    }
}
