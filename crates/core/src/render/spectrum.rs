//! Bottom-anchored frequency bars.
//!
//! Bars pick one bin each, every `ceil(bins / bars)` bins, rather than
//! averaging a range. When the bin count is not a multiple of the bar count
//! the lower bins are favoured.

use crate::{
    color::ColorPolicy,
    config::VisualOptions,
    surface::{Rect, Surface},
};

pub const MAX_MAGNITUDE: f32 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarLayout {
    pub bar_width: u32,
    pub bar_spacing: u32,
    pub min_height: u32,
}

impl BarLayout {
    /// Horizontal distance between the left edges of adjacent bars.
    /// Saturates instead of wrapping for oversized dimensions.
    pub fn stride(&self) -> u32 {
        self.bar_width.saturating_add(self.bar_spacing)
    }

    /// Number of whole bars that fit on a surface `surface_width` wide.
    pub fn bar_count(&self, surface_width: u32) -> usize {
        match self.stride() {
            0 => 0,
            stride => (surface_width / stride) as usize,
        }
    }
}

impl From<&VisualOptions> for BarLayout {
    fn from(options: &VisualOptions) -> Self {
        Self {
            bar_width: options.bar_width,
            bar_spacing: options.bar_spacing,
            min_height: options.bar_min_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub index: usize,
    pub sample_index: usize,
    pub rect: Rect,
}

/// Lays out one bar per slot on a `width` x `height` surface.
pub fn bars(
    samples: &[u8],
    width: u32,
    height: u32,
    layout: BarLayout,
) -> impl Iterator<Item = Bar> + '_ {
    let count = if samples.is_empty() {
        0
    } else {
        layout.bar_count(width)
    };
    let step = if count == 0 {
        0
    } else {
        samples.len().div_ceil(count)
    };
    let last = samples.len().saturating_sub(1);
    let height = height as f32;
    let stride = layout.stride() as f32;

    (0..count).map(move |index| {
        let sample_index = (index * step).min(last);
        let scaled = f32::from(samples[sample_index]) / MAX_MAGNITUDE * height;
        let bar_height = scaled.max(layout.min_height as f32);

        Bar {
            index,
            sample_index,
            rect: Rect::new(
                index as f32 * stride,
                height - bar_height,
                layout.bar_width as f32,
                bar_height,
            ),
        }
    })
}

pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    samples: &[u8],
    colors: &ColorPolicy,
    layout: BarLayout,
) {
    let width = surface.width();
    let height = surface.height();
    let total = layout.bar_count(width);

    for bar in bars(samples, width, height, layout) {
        surface.fill_rect(bar.rect, &colors.paint(bar.index, total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::{ColorScheme, Paint},
        surface::{DrawCommand, RecordingSurface},
    };

    const LAYOUT: BarLayout = BarLayout {
        bar_width: 4,
        bar_spacing: 1,
        min_height: 5,
    };

    #[test]
    fn too_narrow_surface_draws_nothing() {
        let samples = vec![255u8; 1024];
        assert_eq!(LAYOUT.bar_count(4), 0);
        assert_eq!(bars(&samples, 4, 100, LAYOUT).count(), 0);
        assert_eq!(bars(&samples, 0, 100, LAYOUT).count(), 0);

        let mut surface = RecordingSurface::new(3, 100);
        let colors = ColorPolicy::build(ColorScheme::Rainbow, 3).unwrap();
        draw(&mut surface, &samples, &colors, LAYOUT);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn oversized_bars_saturate_instead_of_overflowing() {
        let layout = BarLayout {
            bar_width: u32::MAX,
            bar_spacing: 1,
            min_height: 1,
        };
        assert_eq!(layout.stride(), u32::MAX);
        assert_eq!(layout.bar_count(1920), 0);

        let samples = vec![255u8; 64];
        assert_eq!(bars(&samples, 1920, 100, layout).count(), 0);

        let mut surface = RecordingSurface::new(1920, 100);
        let colors = ColorPolicy::build(ColorScheme::Rainbow, 1920).unwrap();
        draw(&mut surface, &samples, &colors, layout);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn heights_stay_between_minimum_and_surface_height() {
        let samples: Vec<u8> = (0..=255).collect();
        let height = 150;
        let layout = BarLayout {
            bar_width: 1,
            bar_spacing: 0,
            min_height: 5,
        };

        let drawn: Vec<Bar> = bars(&samples, 256, height, layout).collect();
        assert_eq!(drawn.len(), 256);
        for bar in drawn {
            assert!(bar.rect.height >= 5.0);
            assert!(bar.rect.height <= height as f32);
            assert!((bar.rect.y + bar.rect.height - height as f32).abs() < 1e-4);
        }
    }

    #[test]
    fn decimates_bins_with_ceiling_step() {
        let samples: Vec<u8> = (0..10).collect();
        let layout = BarLayout {
            bar_width: 1,
            bar_spacing: 0,
            min_height: 1,
        };

        let picked: Vec<usize> = bars(&samples, 4, 100, layout)
            .map(|bar| bar.sample_index)
            .collect();
        assert_eq!(picked, vec![0, 3, 6, 9]);

        let picked: Vec<usize> = bars(&samples, 7, 100, layout)
            .map(|bar| bar.sample_index)
            .collect();
        assert_eq!(picked, vec![0, 2, 4, 6, 8, 9, 9]);
    }

    #[test]
    fn bars_are_offset_by_stride_and_colored_per_index() {
        let mut surface = RecordingSurface::new(20, 50);
        let colors = ColorPolicy::build(ColorScheme::Rainbow, 20).unwrap();
        draw(&mut surface, &[255, 0, 255, 0], &colors, LAYOUT);

        let commands = surface.commands();
        assert_eq!(commands.len(), 4);
        for (index, command) in commands.iter().enumerate() {
            match command {
                DrawCommand::FillRect {
                    rect,
                    paint: Paint::Hsl(hsl),
                } => {
                    assert_eq!(rect.x, index as f32 * 5.0);
                    assert_eq!(rect.width, 4.0);
                    assert_eq!(hsl.hue, index as f32 * 90.0);
                }
                other => panic!("unexpected command {other:?}"),
            }
        }
    }
}
