use super::{Container, Point, Rect, Surface};
use crate::color::Paint;

/// Primitive issued against a [`RecordingSurface`].
#[derive(Debug, Clone)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
    },
    StrokePath {
        points: Vec<Point>,
        line_width: f32,
        paint: Paint,
    },
    FillCircle {
        center: Point,
        radius: f32,
        paint: Paint,
    },
}

/// Surface that keeps a log of draw commands instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    container: Option<Container>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            container: None,
            commands: Vec::new(),
        }
    }

    pub fn with_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn container_width(&self) -> Option<u32> {
        self.container.as_ref().map(Container::width)
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            paint: paint.clone(),
        });
    }

    fn stroke_path(&mut self, points: &[Point], line_width: f32, paint: &Paint) {
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            line_width,
            paint: paint.clone(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            paint: paint.clone(),
        });
    }
}
