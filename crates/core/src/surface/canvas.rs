use super::{Container, Point, Rect, Surface};
use crate::color::{Color, Paint};

/// RGBA8 raster surface with source-over blending.
///
/// Pixels are row-major, four bytes per pixel. A pixel is covered by a shape
/// when its centre lies inside the shape.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    coverage: Vec<bool>,
    container: Option<Container>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        let len = pixel_count(width, height);
        Self {
            width,
            height,
            pixels: vec![0; len * 4],
            coverage: vec![false; len],
            container: None,
        }
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (y as usize * self.width as usize + x as usize) * 4;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[index..index + 4]);
        Some(rgba)
    }

    fn blend(&mut self, x: u32, y: u32, color: &Color) {
        let index = (y as usize * self.width as usize + x as usize) * 4;
        let [sr, sg, sb, sa] = color.to_rgba8();
        let src_alpha = f32::from(sa) / 255.0;
        if src_alpha <= 0.0 {
            return;
        }

        let dst = &mut self.pixels[index..index + 4];
        let dst_alpha = f32::from(dst[3]) / 255.0;
        let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);

        for (channel, source) in dst.iter_mut().take(3).zip([sr, sg, sb]) {
            let mixed = (f32::from(source) * src_alpha
                + f32::from(*channel) * dst_alpha * (1.0 - src_alpha))
                / out_alpha;
            *channel = mixed.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Blends every covered pixel once and clears the coverage mask.
    fn flush_coverage(&mut self, paint: &Paint) {
        for y in 0..self.height {
            for x in 0..self.width {
                let index = y as usize * self.width as usize + x as usize;
                if std::mem::take(&mut self.coverage[index]) {
                    let color = paint.color_at(x as f32 + 0.5);
                    self.blend(x, y, &color);
                }
            }
        }
    }

    fn cover_segment(&mut self, from: Point, to: Point, half_width: f32) {
        let x_range = pixel_span(
            from.x.min(to.x) - half_width,
            from.x.max(to.x) + half_width,
            self.width,
        );
        let y_range = pixel_span(
            from.y.min(to.y) - half_width,
            from.y.max(to.y) + half_width,
            self.height,
        );
        let (Some((x0, x1)), Some((y0, y1))) = (x_range, y_range) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if distance_to_segment(center, from, to) <= half_width {
                    self.coverage[y as usize * self.width as usize + x as usize] = true;
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        let len = pixel_count(width, height);
        self.width = width;
        self.height = height;
        self.pixels = vec![0; len * 4];
        self.coverage = vec![false; len];
    }

    fn container_width(&self) -> Option<u32> {
        self.container.as_ref().map(Container::width)
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let x_range = pixel_span(rect.x, rect.x + rect.width, self.width);
        let y_range = pixel_span(rect.y, rect.y + rect.height, self.height);
        let (Some((x0, x1)), Some((y0, y1))) = (x_range, y_range) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let color = paint.color_at(x as f32 + 0.5);
                self.blend(x, y, &color);
            }
        }
    }

    fn stroke_path(&mut self, points: &[Point], line_width: f32, paint: &Paint) {
        if points.len() < 2 || self.coverage.is_empty() {
            return;
        }
        let half_width = (line_width * 0.5).max(0.5);
        for segment in points.windows(2) {
            self.cover_segment(segment[0], segment[1], half_width);
        }
        self.flush_coverage(paint);
    }

    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        let x_range = pixel_span(center.x - radius, center.x + radius, self.width);
        let y_range = pixel_span(center.y - radius, center.y + radius, self.height);
        let (Some((x0, x1)), Some((y0, y1))) = (x_range, y_range) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center.x;
                let dy = y as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    let color = paint.color_at(x as f32 + 0.5);
                    self.blend(x, y, &color);
                }
            }
        }
    }
}

/// Pixel index range whose centres fall inside `[start, end]`.
fn pixel_span(start: f32, end: f32, limit: u32) -> Option<(u32, u32)> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let first = (start - 0.5).ceil().max(0.0);
    let last = (end - 0.5).floor().min(limit as f32 - 1.0);
    if last < first {
        return None;
    }
    Some((first as u32, last as u32 + 1))
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

fn distance_to_segment(point: Point, from: Point, to: Point) -> f32 {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq > f32::EPSILON {
        (((point.x - from.x) * dx + (point.y - from.y) * dy) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let nearest_x = from.x + t * dx;
    let nearest_y = from.y + t * dy;
    ((point.x - nearest_x).powi(2) + (point.y - nearest_y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_color;

    fn solid(css: &str) -> Paint {
        Paint::Solid(parse_color(css).unwrap())
    }

    #[test]
    fn fills_rectangles_within_bounds() {
        let mut canvas = Canvas::new(8, 4);
        canvas.fill_rect(Rect::new(2.0, 1.0, 3.0, 2.0), &solid("#ff0000"));

        assert_eq!(canvas.pixel(2, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(4, 2), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(5, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(2, 3), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(8, 0), None);

        canvas.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), &solid("#00ff00"));
        assert_eq!(canvas.pixel(7, 3), Some([0, 255, 0, 255]));
    }

    #[test]
    fn translucent_fill_fades_previous_content() {
        let mut canvas = Canvas::new(1, 1);
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &solid("#ffffff"));
        let fade = solid("rgba(0,0,0,0.5)");

        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &fade);
        let once = canvas.pixel(0, 0).unwrap();
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &fade);
        let twice = canvas.pixel(0, 0).unwrap();

        assert!(once[0] < 255 && once[0] > 100);
        assert!(twice[0] < once[0]);
        assert_eq!(twice[3], 255);
    }

    #[test]
    fn strokes_horizontal_line() {
        let mut canvas = Canvas::new(10, 10);
        canvas.stroke_path(
            &[Point::new(0.0, 5.0), Point::new(5.0, 5.0), Point::new(10.0, 5.0)],
            2.0,
            &solid("#0000ff"),
        );

        for x in 0..10 {
            assert_eq!(canvas.pixel(x, 4), Some([0, 0, 255, 255]));
            assert_eq!(canvas.pixel(x, 5), Some([0, 0, 255, 255]));
        }
        assert_eq!(canvas.pixel(3, 1), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(3, 8), Some([0, 0, 0, 0]));
    }

    #[test]
    fn fills_circles() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_circle(Point::new(5.0, 5.0), 2.0, &solid("#ffffff"));

        assert_eq!(canvas.pixel(5, 5), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(4, 4), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(8, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn resize_discards_content() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), &solid("#ffffff"));
        canvas.resize(3, 1);

        assert_eq!(canvas.pixels().len(), 12);
        assert!(canvas.pixels().iter().all(|&byte| byte == 0));

        canvas.resize(0, 0);
        canvas.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0), &solid("#ffffff"));
        canvas.stroke_path(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], 2.0, &solid("#ffffff"));
    }
}
