use crate::{
    color::ColorPolicy,
    surface::{Point, Surface},
};

/// Value of a time-domain sample at rest.
pub const MIDPOINT: f32 = 128.0;

/// Fills `out` with the trace of `samples` across a `width` x `height`
/// surface, followed by a closing point on the right edge at mid height.
pub fn trace_points(samples: &[u8], width: f32, height: f32, out: &mut Vec<Point>) {
    out.clear();
    if samples.is_empty() {
        return;
    }

    let slice_width = if samples.len() > 1 {
        width / (samples.len() - 1) as f32
    } else {
        0.0
    };
    let half_height = height / 2.0;

    out.extend(samples.iter().enumerate().map(|(index, &sample)| {
        let v = f32::from(sample) / MIDPOINT;
        Point::new(index as f32 * slice_width, v * half_height)
    }));
    out.push(Point::new(width, half_height));
}

pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    samples: &[u8],
    colors: &ColorPolicy,
    line_width: f32,
    scratch: &mut Vec<Point>,
) {
    trace_points(
        samples,
        surface.width() as f32,
        surface.height() as f32,
        scratch,
    );
    if scratch.is_empty() {
        return;
    }
    surface.stroke_path(scratch, line_width, &colors.paint(0, 1));
}
